//! Dashboard view: gauges, per-core sparklines, panels and process tables.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::fmt::{FmtStyle, format_bytes};
use crate::tui::state::AppState;
use crate::tui::style::{Styles, gauge_bar, gradient, sparkline};

use super::panels::{PANEL_HEIGHT, render_panel_column, render_panel_row};
use super::processes::{render_processes, render_throttled};

/// Terminal width from which panels move to a side column.
pub const SIDE_COLUMN_MIN_WIDTH: u16 = 160;
const SIDE_COLUMN_WIDTH: u16 = 48;
const CORE_CELL_WIDTH: usize = 26;
/// Label, percent and padding of a full cell.
const CORE_FIXED_WIDTH: usize = 15;
const MIN_CORE_SPARK: usize = 4;
const COMPACT_CELL_WIDTH: usize = 9;
const MAX_CORE_ROWS: usize = 4;
const THROTTLED_HEIGHT: u16 = 7;

pub fn render_dashboard(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let side =
        frame.area().width >= SIDE_COLUMN_MIN_WIDTH && !state.panels.visible().is_empty();
    let (main, column) = if side {
        let [main, column] = Layout::horizontal([
            Constraint::Min(40),
            Constraint::Length(SIDE_COLUMN_WIDTH),
        ])
        .areas(area);
        (main, Some(column))
    } else {
        (area, None)
    };

    let cores = state.sample.cpu.per_core.len();
    let core_rows = core_grid(main.width.saturating_sub(2), cores).rows;
    let mut constraints = vec![Constraint::Length(5)];
    if core_rows > 0 {
        constraints.push(Constraint::Length(core_rows as u16 + 2));
    }
    let stacked_panels = column.is_none() && !state.panels.visible().is_empty();
    if stacked_panels {
        constraints.push(Constraint::Length(PANEL_HEIGHT));
    }
    constraints.push(Constraint::Min(5));
    constraints.push(Constraint::Length(THROTTLED_HEIGHT));
    let chunks = Layout::vertical(constraints).split(main);

    let mut i = 0;
    render_gauges(frame, chunks[i], state);
    i += 1;
    if core_rows > 0 {
        render_cores(frame, chunks[i], state);
        i += 1;
    }
    if stacked_panels {
        render_panel_row(frame, chunks[i], state);
        i += 1;
    }
    render_processes(frame, chunks[i], state);
    render_throttled(frame, chunks[i + 1], state);

    if let Some(column) = column {
        render_panel_column(frame, column, state);
    }
}

fn gauge_line(
    label: &'static str,
    pct: f64,
    detail: String,
    history: &[f64],
    width: u16,
) -> Line<'static> {
    let bar_width = 20usize;
    let fixed = 6 + bar_width + 8 + detail.chars().count() + 2;
    let spark_width = usize::from(width).saturating_sub(fixed);
    let color = Style::default().fg(gradient(pct));
    Line::from(vec![
        Span::styled(format!("{:<5} ", label), Styles::help_key()),
        Span::styled(gauge_bar(pct, bar_width), color),
        Span::styled(format!(" {:5.1}% ", pct), color),
        Span::styled(detail, Styles::dim()),
        Span::raw("  "),
        Span::styled(sparkline(history, spark_width, 100.0), color),
    ])
}

fn render_gauges(frame: &mut Frame, area: Rect, state: &AppState) {
    let s = &state.sample;
    let h = &state.history;
    let width = area.width.saturating_sub(2);
    let lines = vec![
        gauge_line(
            "CPU",
            s.cpu.total,
            format!(
                "load {:.2} {:.2} {:.2}",
                s.cpu.load1, s.cpu.load5, s.cpu.load15
            ),
            &h.cpu.to_vec(),
            width,
        ),
        gauge_line(
            "MEM",
            s.memory.used_percent(),
            format!(
                "{} / {}",
                format_bytes(s.memory.used_bytes, FmtStyle::Compact),
                format_bytes(s.memory.total_bytes, FmtStyle::Compact)
            ),
            &h.mem.to_vec(),
            width,
        ),
        gauge_line(
            "SWAP",
            s.memory.swap_percent(),
            format!(
                "{} / {}",
                format_bytes(s.memory.swap_used, FmtStyle::Compact),
                format_bytes(s.memory.swap_total, FmtStyle::Compact)
            ),
            &h.swap.to_vec(),
            width,
        ),
    ];
    let block = Block::default()
        .title(" System ")
        .borders(Borders::ALL)
        .border_style(Styles::dim());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Placement of per-core cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CoreGrid {
    cols: usize,
    rows: usize,
    cell_width: usize,
    /// Cells with just index and percent, no sparkline.
    compact: bool,
    /// Cores drawn; the rest are summarized in the last cell.
    shown: usize,
}

impl CoreGrid {
    fn hidden(&self, cores: usize) -> usize {
        cores - self.shown
    }
}

/// Lays out `cores` cells in at most `MAX_CORE_ROWS` rows of `width` columns.
/// Cells shrink before any core is dropped; when even compact cells do not
/// fit, the last slot becomes a `+N more` marker.
fn core_grid(width: u16, cores: usize) -> CoreGrid {
    let width = usize::from(width);
    if cores == 0 {
        return CoreGrid {
            cols: 0,
            rows: 0,
            cell_width: 0,
            compact: false,
            shown: 0,
        };
    }

    let full_cols = (width / CORE_CELL_WIDTH).max(1);
    if cores <= full_cols * MAX_CORE_ROWS {
        return CoreGrid {
            cols: full_cols,
            rows: cores.div_ceil(full_cols),
            cell_width: CORE_CELL_WIDTH,
            compact: false,
            shown: cores,
        };
    }

    let cols = cores.div_ceil(MAX_CORE_ROWS);
    let cell_width = width / cols;
    if cell_width >= CORE_FIXED_WIDTH + MIN_CORE_SPARK {
        return CoreGrid {
            cols,
            rows: MAX_CORE_ROWS,
            cell_width,
            compact: false,
            shown: cores,
        };
    }

    let cols = cols.min((width / COMPACT_CELL_WIDTH).max(1));
    let slots = cols * MAX_CORE_ROWS;
    let shown = if cores > slots { slots - 1 } else { cores };
    CoreGrid {
        cols,
        rows: MAX_CORE_ROWS,
        cell_width: COMPACT_CELL_WIDTH,
        compact: true,
        shown,
    }
}

fn core_lines(state: &AppState, width: u16) -> Vec<Line<'static>> {
    let per_core = &state.sample.cpu.per_core;
    let grid = core_grid(width, per_core.len());
    let hidden = grid.hidden(per_core.len());
    let spark_width = grid.cell_width.saturating_sub(CORE_FIXED_WIDTH);

    // column-major, like top's per-core display
    let mut lines = Vec::with_capacity(grid.rows);
    for r in 0..grid.rows {
        let mut spans = Vec::new();
        for c in 0..grid.cols {
            let idx = c * grid.rows + r;
            if hidden > 0 && idx == grid.cols * grid.rows - 1 {
                spans.push(Span::styled(
                    format!("{:<w$}", format!("+{} more", hidden), w = grid.cell_width),
                    Styles::dim(),
                ));
                continue;
            }
            if idx >= grid.shown {
                continue;
            }
            let pct = per_core[idx];
            let color = Style::default().fg(gradient(pct));
            if grid.compact {
                spans.push(Span::styled(format!("c{:<3}", idx), Styles::dim()));
                spans.push(Span::styled(format!("{:>3.0}% ", pct), color));
                continue;
            }
            let history = state
                .history
                .per_core
                .get(idx)
                .map(|b| b.to_vec())
                .unwrap_or_default();
            spans.push(Span::styled(format!("cpu{:<3}", idx), Styles::dim()));
            spans.push(Span::styled(sparkline(&history, spark_width, 100.0), color));
            spans.push(Span::styled(format!(" {:5.1}%  ", pct), color));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn render_cores(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Cores ")
        .borders(Borders::ALL)
        .border_style(Styles::dim());
    let lines = core_lines(state, block.inner(area).width);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
