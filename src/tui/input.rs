//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::state::{AppState, InputMode, Panel, Popup, View, WHEEL_STEP};

/// Result of handling an input event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// Mouse capture was toggled; the terminal must follow `state.mouse_enabled`.
    MouseToggled,
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    if state.popup.is_open() {
        return handle_popup(state, key);
    }
    match state.input_mode {
        InputMode::Normal => handle_normal_mode(state, key),
        InputMode::Filter => handle_filter_mode(state, key),
    }
}

/// Popups are modal: only close keys get through.
fn handle_popup(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match (state.popup, key.code) {
        (_, KeyCode::Esc) | (_, KeyCode::Char('q')) => state.popup = Popup::None,
        (Popup::ProcessDetail { .. }, KeyCode::Enter) => state.popup = Popup::None,
        (Popup::Help, KeyCode::Char('?')) => state.popup = Popup::None,
        _ => {}
    }
    KeyAction::None
}

fn handle_filter_mode(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter => state.commit_filter(),
        KeyCode::Esc => state.cancel_filter(),
        KeyCode::Backspace => state.filter_pop(),
        KeyCode::Char(c) => state.filter_push(c),
        _ => {}
    }
    KeyAction::None
}

fn handle_normal_mode(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let page = state.page_rows.max(1);
    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,

        // Views
        KeyCode::Tab => state.view = state.view.next(),
        KeyCode::Char('1') => state.view = View::Dashboard,
        KeyCode::Char('2') => state.view = View::Analysis,
        KeyCode::Char('3') => state.view = View::SystemInfo,

        KeyCode::Char('s') => state.next_sort(),
        KeyCode::Char('/') => state.begin_filter(),

        // Panels
        KeyCode::Char('g') => state.panels.toggle(Panel::Gpu),
        KeyCode::Char('b') => state.panels.toggle(Panel::Battery),
        KeyCode::Char('i') => state.panels.toggle(Panel::Io),
        KeyCode::Char('t') => state.panels.toggle(Panel::Temp),
        KeyCode::Char('n') => state.panels.toggle(Panel::Inotify),
        KeyCode::Char('c') => state.panels.toggle(Panel::Cgroups),

        KeyCode::Char('f') => state.paused = !state.paused,
        KeyCode::Char('m') => {
            state.mouse_enabled = !state.mouse_enabled;
            return KeyAction::MouseToggled;
        }
        KeyCode::Char('o') => state.toggle_export(),
        KeyCode::Char('?') => state.toggle_help(),

        // Navigation
        KeyCode::Down | KeyCode::Char('j') => state.select_down(1),
        KeyCode::Up | KeyCode::Char('k') => state.select_up(1),
        KeyCode::PageDown => state.select_down(page),
        KeyCode::PageUp => state.select_up(page),
        KeyCode::Home => state.select_first(),
        KeyCode::End => state.select_last(),
        KeyCode::Enter => state.open_detail(),

        // Back out one level: selection, then filter, then view.
        KeyCode::Esc => {
            if state.selected.is_some() {
                state.clear_selection();
            } else if !state.filter.is_empty() {
                state.clear_filter();
            } else {
                state.view = View::Dashboard;
            }
        }
        _ => {}
    }
    KeyAction::None
}

/// Handles mouse input. Ignored while capture is off or a popup is open.
pub fn handle_mouse(state: &mut AppState, event: MouseEvent) {
    if !state.mouse_enabled || state.popup.is_open() || state.view != View::Dashboard {
        return;
    }
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            state.click(event.column, event.row);
        }
        MouseEventKind::ScrollDown => state.scroll_by(WHEEL_STEP as isize),
        MouseEventKind::ScrollUp => state.scroll_by(-(WHEEL_STEP as isize)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{Process, Sample, SortKey};
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(state: &mut AppState, code: KeyCode) -> KeyAction {
        handle_key(state, key(code))
    }

    fn state() -> AppState {
        let mut state = AppState::new(&Config::default());
        let top = (0..20u32)
            .map(|i| Process {
                pid: 10 + i,
                cpu: f64::from(20 - i),
                command: format!("proc-{}", i),
                ..Process::default()
            })
            .collect();
        state.apply_sample(Sample {
            top,
            ..Sample::default()
        });
        state
    }

    #[test]
    fn test_quit_keys() {
        let mut s = state();
        assert_eq!(press(&mut s, KeyCode::Char('q')), KeyAction::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut s, ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_view_switching() {
        let mut s = state();
        press(&mut s, KeyCode::Tab);
        assert_eq!(s.view, View::Analysis);
        press(&mut s, KeyCode::Char('3'));
        assert_eq!(s.view, View::SystemInfo);
        press(&mut s, KeyCode::Tab);
        assert_eq!(s.view, View::Dashboard);
        press(&mut s, KeyCode::Char('2'));
        assert_eq!(s.view, View::Analysis);
    }

    #[test]
    fn test_sort_cycles_through_all_keys() {
        let mut s = state();
        let mut seen = vec![s.sort];
        for _ in 0..4 {
            press(&mut s, KeyCode::Char('s'));
            seen.push(s.sort);
        }
        assert_eq!(
            seen,
            vec![
                SortKey::Cpu,
                SortKey::Memory,
                SortKey::Io,
                SortKey::Fd,
                SortKey::Cpu
            ]
        );
    }

    #[test]
    fn test_filter_line_edit() {
        let mut s = state();
        press(&mut s, KeyCode::Char('/'));
        assert_eq!(s.input_mode, InputMode::Filter);
        for c in "proc-19x".chars() {
            press(&mut s, KeyCode::Char(c));
        }
        // keys are captured, not interpreted as bindings
        assert_eq!(s.view, View::Dashboard);
        press(&mut s, KeyCode::Backspace);
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.filter, "proc-19");
        assert_eq!(s.rows().len(), 1);

        press(&mut s, KeyCode::Char('/'));
        press(&mut s, KeyCode::Char('z'));
        assert!(s.rows().is_empty());
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.filter, "proc-19");
        assert_eq!(s.rows().len(), 1);
    }

    #[test]
    fn test_panel_and_mode_toggles() {
        let mut s = state();
        for c in ['g', 'b', 'i', 't', 'n', 'c'] {
            press(&mut s, KeyCode::Char(c));
        }
        assert!(s.panels.visible().is_empty());
        press(&mut s, KeyCode::Char('f'));
        assert!(s.paused);
        assert_eq!(press(&mut s, KeyCode::Char('m')), KeyAction::MouseToggled);
        assert!(!s.mouse_enabled);
    }

    #[test]
    fn test_detail_modal_swallows_keys() {
        let mut s = state();
        press(&mut s, KeyCode::Down);
        press(&mut s, KeyCode::Down);
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.popup, Popup::ProcessDetail { pid: 11 });

        press(&mut s, KeyCode::Char('s'));
        press(&mut s, KeyCode::Char('2'));
        press(&mut s, KeyCode::Down);
        assert_eq!(s.sort, SortKey::Cpu);
        assert_eq!(s.view, View::Dashboard);
        assert_eq!(s.selected, Some(1));

        press(&mut s, KeyCode::Esc);
        assert_eq!(s.popup, Popup::None);
        press(&mut s, KeyCode::Enter);
        assert_eq!(
            press(&mut s, KeyCode::Char('q')),
            KeyAction::None,
            "q closes the modal first"
        );
        assert_eq!(s.popup, Popup::None);
    }

    #[test]
    fn test_paging_and_bounds() {
        let mut s = state();
        s.set_page_rows(5);
        press(&mut s, KeyCode::Home);
        press(&mut s, KeyCode::PageDown);
        assert_eq!(s.selected, Some(5));
        press(&mut s, KeyCode::End);
        assert_eq!(s.selected, Some(19));
        assert_eq!(s.scroll, 15);
        press(&mut s, KeyCode::PageUp);
        assert_eq!(s.selected, Some(14));
        press(&mut s, KeyCode::Home);
        assert_eq!(s.selected, Some(0));
        press(&mut s, KeyCode::Char('k'));
        assert_eq!(s.selected, Some(0));
    }

    #[test]
    fn test_escape_backs_out_one_level() {
        let mut s = state();
        s.filter = "proc".to_string();
        s.view = View::Analysis;
        s.selected = Some(2);
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.selected, None);
        press(&mut s, KeyCode::Esc);
        assert!(s.filter.is_empty());
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.view, View::Dashboard);
    }

    #[test]
    fn test_mouse_click_and_wheel() {
        let mut s = state();
        s.set_page_rows(5);
        s.table_area = Some(Rect::new(0, 8, 100, 5));
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut s, click);
        assert_eq!(s.selected, Some(2));

        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 4,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut s, wheel);
        assert_eq!(s.scroll, 3);

        s.mouse_enabled = false;
        handle_mouse(&mut s, wheel);
        assert_eq!(s.scroll, 3);
    }
}
