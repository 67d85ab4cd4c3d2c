//! Header and footer bars.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::state::{AppState, InputMode, View};
use crate::tui::style::Styles;

/// Renders the header bar: time, mode, views, sort, filter and alert badge.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let time = state
        .sample
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let mode = if state.paused { " PAUSED " } else { " LIVE " };

    let mut spans = vec![
        Span::styled(format!(" {} ", time), Styles::header()),
        Span::styled(mode, Styles::header()),
    ];

    for (i, view) in View::all().iter().enumerate() {
        let style = if *view == state.view {
            Styles::tab_active()
        } else {
            Styles::tab_inactive()
        };
        spans.push(Span::styled(format!(" {}:", i + 1), Styles::dim()));
        spans.push(Span::styled(view.name(), style));
    }

    spans.push(Span::raw(format!("  sort:{}", state.sort.name())));
    if !state.filter.is_empty() {
        spans.push(Span::raw(format!("  filter:{}", state.filter)));
    }
    if state.export_enabled {
        spans.push(Span::raw("  REC"));
    }

    let alerts = state.alerts();
    if !alerts.is_empty() {
        let labels: Vec<&str> = alerts.iter().map(|a| a.label()).collect();
        let badge = format!(" ! {} ", labels.join(" "));
        spans.push(Span::raw("  "));
        if state.blink_on() {
            spans.push(Span::styled(badge, Styles::alert()));
        } else {
            // keep the width stable while the badge is off
            spans.push(Span::raw(" ".repeat(badge.chars().count())));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(Styles::header()), area);
}

/// Renders the bottom line: the filter editor while editing, key hints otherwise.
pub fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = match state.input_mode {
        InputMode::Filter => Line::from(vec![
            Span::styled(" Filter: ", Styles::help_key()),
            Span::styled(format!("{}_", state.filter), Styles::filter_input()),
            Span::styled("  Enter apply  Esc cancel", Styles::dim()),
        ]),
        InputMode::Normal => {
            let hints = [
                ("q", "quit"),
                ("Tab", "view"),
                ("s", "sort"),
                ("/", "filter"),
                ("f", if state.paused { "resume" } else { "pause" }),
                ("Enter", "detail"),
                ("?", "help"),
            ];
            let mut spans = Vec::with_capacity(hints.len() * 2);
            for (key, desc) in hints {
                spans.push(Span::styled(format!(" {}", key), Styles::help_key()));
                spans.push(Span::styled(format!(" {} ", desc), Styles::dim()));
            }
            if !state.mouse_enabled {
                spans.push(Span::styled(" mouse off", Styles::dim()));
            }
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
