//! System info view: host facts from the latest sample.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::fmt::{FmtStyle, format_bytes, format_remaining};
use crate::tui::state::AppState;
use crate::tui::style::Styles;

use super::field;

/// Lines of the system info view.
fn sysinfo_lines(state: &AppState) -> (Vec<Line<'static>>, Vec<Line<'static>>) {
    let s = &state.sample;
    let host = vec![
        Line::from(Span::styled("Host", Styles::section_header())),
        field("Cores", s.cpu.per_core.len().to_string()),
        field(
            "Load",
            format!("{:.2} {:.2} {:.2}", s.cpu.load1, s.cpu.load5, s.cpu.load15),
        ),
        field("Memory", format_bytes(s.memory.total_bytes, FmtStyle::Detail)),
        field("  cached", format_bytes(s.memory.cached, FmtStyle::Detail)),
        field("  buffers", format_bytes(s.memory.buffers, FmtStyle::Detail)),
        field("Swap", format_bytes(s.memory.swap_total, FmtStyle::Detail)),
        Line::from(""),
        Line::from(Span::styled("Inotify", Styles::section_header())),
        field("Max watches", s.inotify.max_user_watches.to_string()),
        field("Max instances", s.inotify.max_user_instances.to_string()),
        field("Watches", s.inotify.nr_watches.to_string()),
        Line::from(""),
        Line::from(Span::styled("Session", Styles::section_header())),
        field("Interval", format!("{:?}", s.interval)),
        field("Samples", state.history.samples.to_string()),
        field("History", format!("{} samples", state.history.capacity())),
        field(
            "Export",
            match (&state.export_path, state.export_enabled) {
                (None, _) => "off".to_string(),
                (Some(p), true) => p.display().to_string(),
                (Some(p), false) => format!("paused ({})", p.display()),
            },
        ),
    ];

    let mut devices = vec![Line::from(Span::styled("GPUs", Styles::section_header()))];
    if !state.gpu_probe {
        devices.push(Line::from(Span::styled("probe disabled", Styles::dim())));
    } else if s.gpus.is_empty() {
        devices.push(Line::from(Span::styled("no GPU", Styles::dim())));
    } else {
        for gpu in &s.gpus {
            devices.push(field(
                "GPU",
                format!("{} ({:.0} MB)", gpu.name, gpu.mem_total_mb),
            ));
        }
    }

    devices.push(Line::from(""));
    devices.push(Line::from(Span::styled("Battery", Styles::section_header())));
    if !state.battery_probe {
        devices.push(Line::from(Span::styled("probe disabled", Styles::dim())));
    } else if !s.battery.is_present() {
        devices.push(Line::from(Span::styled("no battery", Styles::dim())));
    } else {
        devices.push(field("Charge", format!("{:.0}%", s.battery.percent)));
        devices.push(field("State", s.battery.state.clone()));
        devices.push(field("Remaining", format_remaining(s.battery.seconds_remaining)));
    }

    devices.push(Line::from(""));
    devices.push(Line::from(Span::styled("Thermal zones", Styles::section_header())));
    if s.temps.is_empty() {
        devices.push(Line::from(Span::styled("none", Styles::dim())));
    }
    for t in &s.temps {
        devices.push(field(&t.zone, format!("{:.1}°C", t.temp)));
    }

    devices.push(Line::from(""));
    devices.push(Line::from(Span::styled("Block devices", Styles::section_header())));
    if s.io.per_device.is_empty() {
        devices.push(Line::from(Span::styled("none", Styles::dim())));
    }
    for d in &s.io.per_device {
        devices.push(Line::from(d.name.clone()));
    }

    (host, devices)
}

pub fn render_sysinfo(frame: &mut Frame, area: Rect, state: &AppState) {
    let (host, devices) = sysinfo_lines(state);
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
    for (lines, rect, title) in [(host, left, " System "), (devices, right, " Devices ")] {
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::dim());
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            rect,
        );
    }
}
