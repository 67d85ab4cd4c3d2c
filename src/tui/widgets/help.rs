//! Help popup widget with view-sensitive column descriptions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::state::View;
use crate::tui::style::Styles;

use super::popup_area;

const KEYS: &[(&str, &str)] = &[
    ("q / Ctrl+C", "quit"),
    ("Tab 1 2 3", "switch view"),
    ("s", "cycle sort (cpu, mem, io, fd)"),
    ("/", "filter processes, Enter keeps, Esc restores"),
    ("j k ↑ ↓", "move selection"),
    ("PgUp PgDn", "move by a page"),
    ("Home End", "first / last process"),
    ("Enter", "process detail"),
    ("Esc", "clear selection, then filter"),
    ("f", "freeze / resume sampling"),
    ("g b i t n c", "toggle GPU battery IO temp inotify cgroup panels"),
    ("o", "pause / resume JSON export"),
    ("m", "toggle mouse capture"),
    ("?", "toggle this help"),
];

fn key_line(key: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<14}", key), Styles::help_key()),
        Span::raw(what),
    ])
}

fn view_notes(view: View) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{} view:", view.name()),
        Style::default().fg(Color::Yellow),
    ))];
    match view {
        View::Dashboard => lines.extend([
            Line::from("PID     - process id"),
            Line::from("NI      - nice value, positive means throttled"),
            Line::from("CPU%    - lifetime average share of one core"),
            Line::from("MEM%    - resident memory over total"),
            Line::from("FD ΔFD  - open descriptors and change since last tick (wide)"),
            Line::from("R W     - disk read / write KB/s (wide)"),
            Line::from(""),
            Line::from(Span::styled(
                "Mouse: click a row to select, wheel to scroll",
                Styles::dim(),
            )),
        ]),
        View::Analysis => lines.extend([
            Line::from("CPU TIME - estimated CPU seconds accumulated this session"),
            Line::from("TICKS    - samples in which the command was throttled"),
            Line::from("SHARE    - TICKS over total samples"),
            Line::from("History  - min, average and max over the retained window"),
        ]),
        View::SystemInfo => lines.extend([
            Line::from("Static host facts, probe status and export target"),
            Line::from(Span::styled(
                "GPU and battery probes refresh every 2s",
                Styles::dim(),
            )),
        ]),
    }
    lines
}

fn help_lines(view: View) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Keys:",
        Style::default().fg(Color::Yellow),
    ))];
    lines.extend(KEYS.iter().map(|&(k, w)| key_line(k, w)));
    lines.push(Line::from(""));
    lines.extend(view_notes(view));
    lines
}

/// Renders the help popup centered on screen.
pub fn render_help(frame: &mut Frame, area: Rect, view: View) {
    let popup = popup_area(area, 60, 80, (40, 80), (10, 32));
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [body, footer] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    frame.render_widget(
        Paragraph::new(help_lines(view))
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::White)),
        body,
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Press ", Styles::dim()),
            Span::styled("?", Styles::help_key()),
            Span::styled(" or ", Styles::dim()),
            Span::styled("Esc", Styles::help_key()),
            Span::styled(" to close", Styles::dim()),
        ])),
        footer,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_mentions_every_view() {
        for view in View::all() {
            let text: String = help_lines(*view)
                .iter()
                .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
                .collect();
            assert!(text.contains(view.name()));
            assert!(text.contains("toggle this help"));
        }
    }
}
