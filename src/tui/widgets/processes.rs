//! Process and throttled-process tables.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::fmt::{format_delta, format_kbs};
use crate::model::Process;
use crate::tui::state::AppState;
use crate::tui::style::{Styles, gradient};

/// Terminal width from which the FD and IO columns are shown.
pub const WIDE_COLUMNS_MIN_WIDTH: u16 = 120;

/// Column headers for the given width.
pub fn headers(wide: bool) -> Vec<&'static str> {
    let mut h = vec!["PID", "NI", "CPU%", "MEM%"];
    if wide {
        h.extend(["FD", "ΔFD", "R KB/s", "W KB/s"]);
    }
    h.push("COMMAND");
    h
}

fn widths(wide: bool) -> Vec<Constraint> {
    let mut w = vec![
        Constraint::Length(8),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(6),
    ];
    if wide {
        w.extend([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(8),
        ]);
    }
    w.push(Constraint::Fill(1));
    w
}

fn row_cells(p: &Process, wide: bool) -> Vec<Cell<'static>> {
    let nice_style = if p.is_throttled() {
        Styles::throttled()
    } else {
        Style::default()
    };
    let mut cells = vec![
        Cell::from(format!("{:>7}", p.pid)),
        Cell::from(Span::styled(format!("{:>3}", p.nice), nice_style)),
        Cell::from(Span::styled(
            format!("{:>5.1}", p.cpu),
            Style::default().fg(gradient(p.cpu.min(100.0))),
        )),
        Cell::from(Span::styled(
            format!("{:>5.1}", p.memory),
            Style::default().fg(gradient(p.memory)),
        )),
    ];
    if wide {
        cells.extend([
            Cell::from(format!("{:>5}", p.fd_count)),
            Cell::from(format!("{:>4}", format_delta(p.fd_diff))),
            Cell::from(format!("{:>7}", format_kbs(p.read_kbs))),
            Cell::from(format!("{:>7}", format_kbs(p.write_kbs))),
        ]);
    }
    cells.push(Cell::from(p.command.clone()));
    cells
}

/// Renders the main process table and records its geometry in `state` for
/// paging and mouse hit-testing.
pub fn render_processes(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let wide = frame.area().width >= WIDE_COLUMNS_MIN_WIDTH;
    let total = state.sample.top.len();
    let shown = state.rows().len();
    let title = if state.filter.is_empty() {
        format!(" Processes [{}] sort:{} ", total, state.sort.name())
    } else {
        format!(
            " Processes [{}/{}] sort:{} filter:{} ",
            shown,
            total,
            state.sort.name(),
            state.filter
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Styles::dim());
    let inner = block.inner(area);

    // one line for the header row
    let body_height = inner.height.saturating_sub(1);
    state.set_page_rows(usize::from(body_height).max(1));
    state.table_area = Some(Rect::new(inner.x, inner.y + 1, inner.width, body_height));

    if shown == 0 {
        let msg = if total == 0 {
            "waiting for data"
        } else {
            "no process matches the filter"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(msg, Styles::dim())).block(block),
            area,
        );
        return;
    }

    let header = Row::new(headers(wide)).style(Styles::table_header());
    let rows: Vec<Row> = state
        .rows()
        .iter()
        .enumerate()
        .skip(state.scroll)
        .take(usize::from(body_height))
        .map(|(idx, p)| {
            let row = Row::new(row_cells(p, wide));
            if state.selected == Some(idx) {
                row.style(Styles::selected())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(rows, widths(wide)).header(header).block(block);
    frame.render_widget(table, area);
}

/// Renders the throttled (positive niceness) table, filtered and sorted like
/// the process table.
pub fn render_throttled(frame: &mut Frame, area: Rect, state: &AppState) {
    let throttled = state.throttled_rows();
    let total = state.sample.throttled.len();
    let title = if state.filter.is_empty() {
        format!(" Throttled [{}] ", total)
    } else {
        format!(" Throttled [{}/{}] ", throttled.len(), total)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Styles::dim());
    if throttled.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("no throttled processes", Styles::dim())).block(block),
            area,
        );
        return;
    }
    let header = Row::new(["PID", "NI", "CPU%", "COMMAND"]).style(Styles::table_header());
    let rows: Vec<Row> = throttled
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(format!("{:>7}", p.pid)),
                Cell::from(format!("{:>3}", p.nice)),
                Cell::from(format!("{:>5.1}", p.cpu)),
                Cell::from(p.command.clone()),
            ])
            .style(Styles::throttled())
        })
        .collect();
    let widths = [
        Constraint::Length(8),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];
    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
