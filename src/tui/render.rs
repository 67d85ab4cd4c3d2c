//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use super::state::{AppState, Popup, View};
use super::widgets::{
    render_analysis, render_dashboard, render_footer, render_header, render_help,
    render_process_detail, render_sysinfo,
};

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let [header, content, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header, state);

    // only the dashboard has a clickable table; the others must not map clicks
    state.table_area = None;
    match state.view {
        View::Dashboard => render_dashboard(frame, content, state),
        View::Analysis => render_analysis(frame, content, state),
        View::SystemInfo => render_sysinfo(frame, content, state),
    }

    render_footer(frame, footer, state);

    // Popups are rendered last to overlay everything
    match state.popup {
        Popup::Help => render_help(frame, area, state.view),
        Popup::ProcessDetail { .. } => render_process_detail(frame, area, state),
        Popup::None => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::collector::{MockCommands, MockFs};
    use crate::config::Config;
    use crate::sampler::Sampler;

    fn state_with_samples() -> AppState {
        let config = Config::default();
        let mut sampler =
            Sampler::with_sources(MockFs::typical_host(), Arc::new(MockCommands::new()), &config);
        sampler.refresh_slow();
        let mut state = AppState::new(&config);
        state.apply_sample(sampler.sample());
        state.apply_sample(sampler.sample());
        state
    }

    fn draw(state: &mut AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_every_view_renders_at_common_sizes() {
        let mut state = state_with_samples();
        for (w, h) in [(80, 24), (130, 40), (170, 50), (20, 5)] {
            for view in View::all() {
                state.view = *view;
                let screen = draw(&mut state, w, h);
                assert!(!screen.trim().is_empty());
            }
        }
    }

    #[test]
    fn test_wide_columns_follow_terminal_width() {
        let mut state = state_with_samples();
        let narrow = draw(&mut state, 100, 40);
        assert!(!narrow.contains("ΔFD"));
        let wide = draw(&mut state, 130, 40);
        assert!(wide.contains("ΔFD"));
    }

    #[test]
    fn test_table_area_only_on_dashboard() {
        let mut state = state_with_samples();
        draw(&mut state, 130, 40);
        assert!(state.table_area.is_some());
        state.view = View::Analysis;
        draw(&mut state, 130, 40);
        assert!(state.table_area.is_none());
    }

    #[test]
    fn test_popups_overlay() {
        let mut state = state_with_samples();
        state.toggle_help();
        let screen = draw(&mut state, 100, 40);
        assert!(screen.contains("Help"));

        state.toggle_help();
        state.open_detail();
        let pid = match state.popup {
            Popup::ProcessDetail { pid } => pid,
            _ => panic!("detail popup not open"),
        };
        let screen = draw(&mut state, 100, 40);
        assert!(screen.contains(&format!("Process {}", pid)));
    }
}
