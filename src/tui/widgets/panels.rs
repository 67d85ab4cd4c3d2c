//! Optional dashboard panels (GPU, battery, IO, temperature, inotify, cgroups).

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::fmt::{format_mbps, format_mbs, format_remaining, truncate};
use crate::model::Sample;
use crate::tui::history::History;
use crate::tui::state::{AppState, Panel};
use crate::tui::style::{Styles, gauge_bar, gradient, sparkline};

/// Height of a panel row in the stacked layout.
pub const PANEL_HEIGHT: u16 = 8;

const GAUGE_WIDTH: usize = 10;

fn pct_gauge(pct: f64) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            gauge_bar(pct, GAUGE_WIDTH),
            Style::default().fg(gradient(pct)),
        ),
        Span::raw(format!(" {:5.1}%", pct)),
    ]
}

fn empty(text: &'static str) -> Vec<Line<'static>> {
    vec![Line::from(Span::styled(text, Styles::dim()))]
}

/// Content lines of one panel.
pub fn panel_lines(
    panel: Panel,
    sample: &Sample,
    history: &History,
    width: usize,
) -> Vec<Line<'static>> {
    match panel {
        Panel::Gpu => gpu_lines(sample, width),
        Panel::Battery => battery_lines(sample),
        Panel::Io => io_lines(sample, history, width),
        Panel::Temp => temp_lines(sample, width),
        Panel::Inotify => inotify_lines(sample),
        Panel::Cgroups => cgroup_lines(sample, width),
    }
}

fn gpu_lines(sample: &Sample, width: usize) -> Vec<Line<'static>> {
    if sample.gpus.is_empty() {
        return empty("no GPU");
    }
    let mut lines = Vec::new();
    for gpu in &sample.gpus {
        lines.push(Line::from(Span::styled(truncate(&gpu.name, width), Styles::help_key())));
        let mut util = vec![Span::styled("util ", Styles::dim())];
        util.extend(pct_gauge(gpu.util));
        lines.push(Line::from(util));
        lines.push(Line::from(vec![
            Span::styled("vram ", Styles::dim()),
            Span::raw(format!("{:.0}/{:.0} MB", gpu.mem_used_mb, gpu.mem_total_mb)),
            Span::styled("  temp ", Styles::dim()),
            Span::styled(
                format!("{:.0}°C", gpu.temp_c),
                Style::default().fg(gradient(gpu.temp_c)),
            ),
        ]));
    }
    lines
}

fn battery_lines(sample: &Sample) -> Vec<Line<'static>> {
    let bat = &sample.battery;
    if !bat.is_present() {
        return empty("no battery");
    }
    // a low charge is the critical end, so invert for coloring
    let mut gauge = vec![Span::styled(
        gauge_bar(bat.percent, GAUGE_WIDTH),
        Style::default().fg(gradient(100.0 - bat.percent)),
    )];
    gauge.push(Span::raw(format!(" {:5.1}%", bat.percent)));
    vec![
        Line::from(gauge),
        Line::from(vec![
            Span::styled("state ", Styles::dim()),
            Span::raw(if bat.state.is_empty() {
                "Unknown".to_string()
            } else {
                bat.state.clone()
            }),
        ]),
        Line::from(vec![
            Span::styled("left  ", Styles::dim()),
            Span::raw(format_remaining(bat.seconds_remaining)),
        ]),
    ]
}

fn io_lines(sample: &Sample, history: &History, width: usize) -> Vec<Line<'static>> {
    let io = &sample.io;
    let spark_width = width.saturating_sub(22).max(4);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("disk R ", Styles::dim()),
            Span::styled(format!("{:>10} ", format_mbs(io.disk_read_mbs)), Styles::disk()),
            Span::styled(sparkline(&history.disk_read.to_vec(), spark_width, 0.0), Styles::disk()),
        ]),
        Line::from(vec![
            Span::styled("disk W ", Styles::dim()),
            Span::styled(format!("{:>10} ", format_mbs(io.disk_write_mbs)), Styles::disk()),
            Span::styled(sparkline(&history.disk_write.to_vec(), spark_width, 0.0), Styles::disk()),
        ]),
        Line::from(vec![
            Span::styled("net RX ", Styles::dim()),
            Span::styled(format!("{:>10} ", format_mbps(io.net_rx_mbps)), Styles::net()),
            Span::styled(sparkline(&history.net_rx.to_vec(), spark_width, 0.0), Styles::net()),
        ]),
        Line::from(vec![
            Span::styled("net TX ", Styles::dim()),
            Span::styled(format!("{:>10} ", format_mbps(io.net_tx_mbps)), Styles::net()),
            Span::styled(sparkline(&history.net_tx.to_vec(), spark_width, 0.0), Styles::net()),
        ]),
    ];

    let fds: u64 = sample.top.iter().map(|p| u64::from(p.fd_count)).sum();
    let mut fd_line = vec![
        Span::styled("fds    ", Styles::dim()),
        Span::raw(format!("{} open", fds)),
    ];
    let grower = sample
        .top
        .iter()
        .filter(|p| p.fd_diff > 0)
        .max_by_key(|p| p.fd_diff);
    if let Some(grower) = grower {
        fd_line.push(Span::styled(
            format!("  +{} {}", grower.fd_diff, grower.command_name()),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::from(fd_line));

    for dev in &io.per_device {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", truncate(&dev.name, 10)), Styles::dim()),
            Span::raw(format!(
                "R {} W {}",
                format_mbs(dev.read_mbs),
                format_mbs(dev.write_mbs)
            )),
        ]));
    }
    lines
}

fn temp_lines(sample: &Sample, width: usize) -> Vec<Line<'static>> {
    if sample.temps.is_empty() {
        return empty("no sensors");
    }
    let name_width = width.saturating_sub(9).clamp(4, 24);
    sample
        .temps
        .iter()
        .map(|t| {
            Line::from(vec![
                Span::styled(
                    format!("{:<w$}", truncate(&t.zone, name_width), w = name_width),
                    Styles::dim(),
                ),
                Span::styled(format!(" {:5.1}°C", t.temp), Style::default().fg(gradient(t.temp))),
            ])
        })
        .collect()
}

fn inotify_lines(sample: &Sample) -> Vec<Line<'static>> {
    let ino = &sample.inotify;
    if ino.max_user_watches == 0 {
        return empty("unavailable");
    }
    let mut gauge = vec![Span::styled("watches ", Styles::dim())];
    gauge.extend(pct_gauge(ino.watch_percent()));
    vec![
        Line::from(gauge),
        Line::from(vec![
            Span::styled("used    ", Styles::dim()),
            Span::raw(format!("{} / {}", ino.nr_watches, ino.max_user_watches)),
        ]),
        Line::from(vec![
            Span::styled("inst    ", Styles::dim()),
            Span::raw(format!("max {}", ino.max_user_instances)),
        ]),
    ]
}

fn cgroup_lines(sample: &Sample, width: usize) -> Vec<Line<'static>> {
    if sample.cgroups.is_empty() {
        return empty("no cgroup data");
    }
    let name_width = width.saturating_sub(8).clamp(4, 40);
    sample
        .cgroups
        .iter()
        .map(|cg| {
            Line::from(vec![
                Span::raw(format!("{:<w$}", truncate(&cg.name, name_width), w = name_width)),
                Span::styled(format!(" {:5.1}%", cg.cpu), Style::default().fg(gradient(cg.cpu))),
            ])
        })
        .collect()
}

/// Renders one bordered panel.
pub fn render_panel(frame: &mut Frame, area: Rect, panel: Panel, state: &AppState) {
    let block = Block::default()
        .title(format!(" {} ", panel.title()))
        .borders(Borders::ALL)
        .border_style(Styles::dim());
    let inner = block.inner(area);
    let lines = panel_lines(panel, &state.sample, &state.history, usize::from(inner.width));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders visible panels side by side in one row.
pub fn render_panel_row(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = state.panels.visible();
    if visible.is_empty() {
        return;
    }
    let chunks = Layout::horizontal(vec![Constraint::Fill(1); visible.len()]).split(area);
    for (panel, chunk) in visible.into_iter().zip(chunks.iter()) {
        render_panel(frame, *chunk, panel, state);
    }
}

/// Renders visible panels stacked in a side column, sized to their content.
pub fn render_panel_column(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = state.panels.visible();
    if visible.is_empty() {
        return;
    }
    let inner_width = usize::from(area.width.saturating_sub(2));
    let constraints: Vec<Constraint> = visible
        .iter()
        .map(|p| {
            let n = panel_lines(*p, &state.sample, &state.history, inner_width).len();
            Constraint::Length(u16::try_from(n).unwrap_or(u16::MAX).saturating_add(2))
        })
        .collect();
    let chunks = Layout::vertical(constraints).split(area);
    for (panel, chunk) in visible.into_iter().zip(chunks.iter()) {
        render_panel(frame, *chunk, panel, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Battery, Gpu};

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_states() {
        let sample = Sample::default();
        let history = History::new(10);
        assert_eq!(text(&panel_lines(Panel::Gpu, &sample, &history, 30)), "no GPU");
        assert_eq!(text(&panel_lines(Panel::Battery, &sample, &history, 30)), "no battery");
        assert_eq!(text(&panel_lines(Panel::Temp, &sample, &history, 30)), "no sensors");
        assert_eq!(text(&panel_lines(Panel::Cgroups, &sample, &history, 30)), "no cgroup data");
        assert_eq!(text(&panel_lines(Panel::Inotify, &sample, &history, 30)), "unavailable");
    }

    #[test]
    fn test_gpu_and_battery_content() {
        let sample = Sample {
            gpus: vec![Gpu {
                name: "RTX 4090".to_string(),
                util: 37.0,
                mem_used_mb: 1024.0,
                mem_total_mb: 24564.0,
                temp_c: 61.0,
            }],
            battery: Battery {
                percent: 87.0,
                state: "Discharging".to_string(),
                seconds_remaining: 14400,
            },
            ..Sample::default()
        };
        let history = History::new(10);
        let gpu = text(&panel_lines(Panel::Gpu, &sample, &history, 30));
        assert!(gpu.contains("RTX 4090"));
        assert!(gpu.contains("37.0%"));
        assert!(gpu.contains("1024/24564 MB"));
        let bat = text(&panel_lines(Panel::Battery, &sample, &history, 30));
        assert!(bat.contains("Discharging"));
        assert!(bat.contains("4h 0m"));
    }
}
