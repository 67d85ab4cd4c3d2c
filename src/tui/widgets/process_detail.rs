//! Process detail popup.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::fmt::{FmtStyle, format_bytes, format_cpu_seconds, format_delta, format_kbs};
use crate::model::Process;
use crate::tui::state::{AppState, Popup};
use crate::tui::style::{Styles, gradient};

use super::{field, popup_area};

fn build_content(p: &Process, state: &AppState) -> Vec<Line<'static>> {
    let total_mem = state.sample.memory.total_bytes;
    let rss = (p.memory / 100.0 * total_mem as f64).max(0.0) as u64;
    let name = p.command_name().to_string();
    let cpu_secs = state.history.cpu_seconds.get(&name).copied().unwrap_or(0.0);
    let throttles = state
        .history
        .throttle_counts
        .get(&name)
        .copied()
        .unwrap_or(0);

    vec![
        Line::from(Span::styled("Identity", Styles::section_header())),
        field("PID", p.pid.to_string()),
        field("Name", name),
        field(
            "Nice",
            Span::styled(
                if p.is_throttled() {
                    format!("{} (throttled)", p.nice)
                } else {
                    p.nice.to_string()
                },
                if p.is_throttled() {
                    Styles::throttled()
                } else {
                    Style::default()
                },
            ),
        ),
        Line::from(""),
        Line::from(Span::styled("Usage", Styles::section_header())),
        field(
            "CPU",
            Span::styled(
                format!("{:.1}%", p.cpu),
                Style::default().fg(gradient(p.cpu.min(100.0))),
            ),
        ),
        field(
            "Memory",
            format!(
                "{:.2}% (~{})",
                p.memory,
                format_bytes(rss, FmtStyle::Detail)
            ),
        ),
        field("Read", format!("{} KB/s", format_kbs(p.read_kbs))),
        field("Write", format!("{} KB/s", format_kbs(p.write_kbs))),
        field(
            "Open FDs",
            format!("{} ({} since last tick)", p.fd_count, format_delta(p.fd_diff)),
        ),
        Line::from(""),
        Line::from(Span::styled("Session", Styles::section_header())),
        field("CPU time", format_cpu_seconds(cpu_secs)),
        field("Throttled", format!("{} of {} samples", throttles, state.history.samples)),
        Line::from(""),
        Line::from(Span::styled("Command", Styles::section_header())),
        Line::from(p.command.clone()),
    ]
}

/// Renders the process detail popup centered on screen.
pub fn render_process_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let Popup::ProcessDetail { pid } = state.popup else {
        return;
    };

    let popup = popup_area(area, 70, 70, (40, 100), (12, 30));
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" Process {} ", pid))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [body, footer] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let content = match state.detail_process() {
        Some(p) => build_content(p, state),
        // it left the top list (exited or fell below the cap)
        None => vec![Line::from(Span::styled(
            "process is no longer in the sample",
            Styles::dim(),
        ))],
    };
    frame.render_widget(Paragraph::new(content).wrap(Wrap { trim: false }), body);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Esc", Styles::help_key()),
            Span::styled("/", Styles::dim()),
            Span::styled("Enter", Styles::help_key()),
            Span::styled(" close", Styles::dim()),
        ])),
        footer,
    );
}
