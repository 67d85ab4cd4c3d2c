//! Analysis view: cumulative consumers, throttle frequency and history summaries.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::fmt::{format_cpu_seconds, format_mbps, format_mbs, format_percent};
use crate::tui::history::{RANKING_LEN, RingBuffer};
use crate::tui::state::AppState;
use crate::tui::style::{Styles, sparkline};

pub fn render_analysis(frame: &mut Frame, area: Rect, state: &AppState) {
    let [rankings, summary] =
        Layout::vertical([Constraint::Min(8), Constraint::Length(10)]).areas(area);
    let [consumers, throttled] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
            .areas(rankings);

    render_consumers(frame, consumers, state);
    render_throttle_counts(frame, throttled, state);
    render_summary(frame, summary, state);
}

fn block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Styles::dim())
}

fn render_consumers(frame: &mut Frame, area: Rect, state: &AppState) {
    let top = state.history.top_consumers(RANKING_LEN);
    let title = " Heaviest cumulative consumers ".to_string();
    if top.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("collecting...", Styles::dim())).block(block(title)),
            area,
        );
        return;
    }
    let rows: Vec<Row> = top
        .iter()
        .enumerate()
        .map(|(i, (name, secs))| {
            Row::new(vec![
                Cell::from(format!("{:>2}", i + 1)),
                Cell::from(name.to_string()),
                Cell::from(format!("{:>10}", format_cpu_seconds(*secs))),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(11),
        ],
    )
    .header(Row::new(["#", "COMMAND", "CPU TIME"]).style(Styles::table_header()))
    .block(block(title));
    frame.render_widget(table, area);
}

fn render_throttle_counts(frame: &mut Frame, area: Rect, state: &AppState) {
    let top = state.history.top_throttled(RANKING_LEN);
    let title = " Most frequently throttled ".to_string();
    if top.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("nothing throttled yet", Styles::dim()))
                .block(block(title)),
            area,
        );
        return;
    }
    let samples = state.history.samples.max(1);
    let rows: Vec<Row> = top
        .iter()
        .map(|(name, count)| {
            Row::new(vec![
                Cell::from(name.to_string()),
                Cell::from(format!("{:>6}", count)),
                Cell::from(format!(
                    "{:>6}",
                    format_percent(*count as f64 * 100.0 / samples as f64)
                )),
            ])
            .style(Styles::throttled())
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(Row::new(["COMMAND", "TICKS", "SHARE"]).style(Styles::table_header()))
    .block(block(title));
    frame.render_widget(table, area);
}

fn summary_row(
    label: &'static str,
    buf: &RingBuffer<f64>,
    fmt: fn(f64) -> String,
    spark_width: usize,
) -> Row<'static> {
    let (min, avg, max) = match buf.summary() {
        Some(s) => (fmt(s.min), fmt(s.avg), fmt(s.max)),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };
    Row::new(vec![
        Cell::from(label),
        Cell::from(format!("{:>10}", min)),
        Cell::from(format!("{:>10}", avg)),
        Cell::from(format!("{:>10}", max)),
        Cell::from(Span::styled(
            sparkline(&buf.to_vec(), spark_width, 0.0),
            Styles::cpu(),
        )),
    ])
}

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let h = &state.history;
    let spark_width = usize::from(area.width.saturating_sub(2 + 10 + 3 * 11 + 5));
    let rows = vec![
        summary_row("CPU", &h.cpu, format_percent, spark_width),
        summary_row("Memory", &h.mem, format_percent, spark_width),
        summary_row("Net RX", &h.net_rx, format_mbps, spark_width),
        summary_row("Net TX", &h.net_tx, format_mbps, spark_width),
        summary_row("Disk read", &h.disk_read, format_mbs, spark_width),
        summary_row("Disk write", &h.disk_write, format_mbs, spark_width),
    ];
    let title = format!(
        " History (last {} of {} samples) ",
        h.cpu.len(),
        h.samples
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Fill(1),
        ],
    )
    .header(
        Row::new(["", "MIN", "AVG", "MAX", "TREND"]).style(Styles::table_header()),
    )
    .block(block(title));
    frame.render_widget(table, area);
}
