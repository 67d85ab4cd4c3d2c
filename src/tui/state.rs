//! Dashboard state: the current sample plus everything the session derives
//! from input and history.

use std::path::PathBuf;

use ratatui::layout::Rect;

use crate::config::Config;
use crate::model::{Process, Sample, SortKey, sort_processes};

use super::history::History;

/// Rows moved per mouse wheel notch.
pub const WHEEL_STEP: usize = 3;
/// Animation ticks per blink phase.
pub const BLINK_TICKS: u64 = 3;

pub const CPU_ALERT_PCT: f64 = 90.0;
pub const MEM_ALERT_PCT: f64 = 90.0;
pub const SWAP_ALERT_PCT: f64 = 50.0;
pub const TEMP_ALERT_C: f64 = 85.0;

/// Top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Dashboard,
    Analysis,
    SystemInfo,
}

impl View {
    pub fn all() -> &'static [View] {
        &[View::Dashboard, View::Analysis, View::SystemInfo]
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Analysis => "Analysis",
            View::SystemInfo => "System",
        }
    }

    pub fn next(&self) -> View {
        match self {
            View::Dashboard => View::Analysis,
            View::Analysis => View::SystemInfo,
            View::SystemInfo => View::Dashboard,
        }
    }
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Filter,
}

/// Active popup. Only one can be open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Popup {
    #[default]
    None,
    Help,
    /// Detail of the process with this PID, as of the latest sample.
    ProcessDetail { pid: u32 },
}

impl Popup {
    pub fn is_open(&self) -> bool {
        !matches!(self, Popup::None)
    }
}

/// Optional dashboard panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Gpu,
    Battery,
    Io,
    Temp,
    Inotify,
    Cgroups,
}

impl Panel {
    pub fn all() -> &'static [Panel] {
        &[
            Panel::Gpu,
            Panel::Battery,
            Panel::Io,
            Panel::Temp,
            Panel::Inotify,
            Panel::Cgroups,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Gpu => "GPU",
            Panel::Battery => "Battery",
            Panel::Io => "IO",
            Panel::Temp => "Temperature",
            Panel::Inotify => "Inotify",
            Panel::Cgroups => "Cgroups",
        }
    }
}

/// Independent visibility flags, all on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panels {
    pub gpu: bool,
    pub battery: bool,
    pub io: bool,
    pub temp: bool,
    pub inotify: bool,
    pub cgroups: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            gpu: true,
            battery: true,
            io: true,
            temp: true,
            inotify: true,
            cgroups: true,
        }
    }
}

impl Panels {
    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Gpu => self.gpu,
            Panel::Battery => self.battery,
            Panel::Io => self.io,
            Panel::Temp => self.temp,
            Panel::Inotify => self.inotify,
            Panel::Cgroups => self.cgroups,
        }
    }

    pub fn toggle(&mut self, panel: Panel) {
        let flag = match panel {
            Panel::Gpu => &mut self.gpu,
            Panel::Battery => &mut self.battery,
            Panel::Io => &mut self.io,
            Panel::Temp => &mut self.temp,
            Panel::Inotify => &mut self.inotify,
            Panel::Cgroups => &mut self.cgroups,
        };
        *flag = !*flag;
    }

    /// Visible panels in display order.
    pub fn visible(&self) -> Vec<Panel> {
        Panel::all()
            .iter()
            .copied()
            .filter(|p| self.is_visible(*p))
            .collect()
    }
}

/// A tracked threshold that is currently exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    Cpu,
    Memory,
    Swap,
    Temperature,
}

impl Alert {
    pub fn label(&self) -> &'static str {
        match self {
            Alert::Cpu => "CPU",
            Alert::Memory => "MEM",
            Alert::Swap => "SWAP",
            Alert::Temperature => "TEMP",
        }
    }
}

/// Thresholds exceeded by `sample`.
pub fn alerts(sample: &Sample) -> Vec<Alert> {
    let mut out = Vec::new();
    if sample.cpu.total >= CPU_ALERT_PCT {
        out.push(Alert::Cpu);
    }
    if sample.memory.used_percent() >= MEM_ALERT_PCT {
        out.push(Alert::Memory);
    }
    if sample.memory.swap_percent() >= SWAP_ALERT_PCT {
        out.push(Alert::Swap);
    }
    if sample.max_temp().is_some_and(|t| t >= TEMP_ALERT_C) {
        out.push(Alert::Temperature);
    }
    out
}

/// Case-insensitive substring filter on the command. An empty filter keeps
/// everything.
pub fn filter_processes(procs: &[Process], filter: &str) -> Vec<Process> {
    if filter.is_empty() {
        return procs.to_vec();
    }
    let needle = filter.to_lowercase();
    procs
        .iter()
        .filter(|p| p.command.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Main application state.
#[derive(Debug)]
pub struct AppState {
    pub view: View,
    pub input_mode: InputMode,
    pub popup: Popup,
    pub panels: Panels,
    pub sort: SortKey,
    /// Committed (or live-edited) filter.
    pub filter: String,
    /// Filter before the current edit, restored on Esc.
    filter_before_edit: String,
    /// Selected row in the filtered/sorted list.
    pub selected: Option<usize>,
    /// First visible row of the process table.
    pub scroll: usize,
    /// Process table rows that fit on screen, updated by render.
    pub page_rows: usize,
    /// Screen area of the process table rows, updated by render.
    pub table_area: Option<Rect>,
    pub paused: bool,
    pub mouse_enabled: bool,
    /// NDJSON export target, if configured.
    pub export_path: Option<PathBuf>,
    pub export_enabled: bool,
    /// Whether the sampler probes GPUs and batteries at all.
    pub gpu_probe: bool,
    pub battery_probe: bool,
    /// Animation tick counter, drives blinking.
    pub tick: u64,
    pub sample: Sample,
    pub history: History,
    /// Sorted and filtered view of `sample.top`.
    rows: Vec<Process>,
    /// Sorted and filtered view of `sample.throttled`.
    throttled_rows: Vec<Process>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            view: View::Dashboard,
            input_mode: InputMode::Normal,
            popup: Popup::None,
            panels: Panels::default(),
            sort: config.sort,
            filter: config.filter.clone(),
            filter_before_edit: String::new(),
            selected: None,
            scroll: 0,
            page_rows: 10,
            table_area: None,
            paused: false,
            mouse_enabled: true,
            export_path: config.json_file.clone(),
            export_enabled: config.json_file.is_some(),
            gpu_probe: config.gpu,
            battery_probe: config.battery,
            tick: 0,
            sample: Sample::zero(),
            history: History::new(config.history),
            rows: Vec::new(),
            throttled_rows: Vec::new(),
        }
    }

    /// Replaces the current sample and folds it into history.
    pub fn apply_sample(&mut self, sample: Sample) {
        self.history.record(&sample);
        self.sample = sample;
        self.refresh_rows();
    }

    /// Processes as shown in the table.
    pub fn rows(&self) -> &[Process] {
        &self.rows
    }

    /// Throttled processes as shown in the throttled table.
    pub fn throttled_rows(&self) -> &[Process] {
        &self.throttled_rows
    }

    fn refresh_rows(&mut self) {
        let mut throttled = filter_processes(&self.sample.throttled, &self.filter);
        sort_processes(&mut throttled, self.sort);
        self.throttled_rows = throttled;

        let mut rows = filter_processes(&self.sample.top, &self.filter);
        sort_processes(&mut rows, self.sort);
        self.rows = rows;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            self.selected = None;
            self.scroll = 0;
            return;
        }
        if let Some(sel) = self.selected {
            self.selected = Some(sel.min(len - 1));
        }
        self.scroll = self.scroll.min(self.max_scroll());
        self.ensure_visible();
    }

    fn max_scroll(&self) -> usize {
        self.rows.len().saturating_sub(self.page_rows.max(1))
    }

    /// Keeps the selection inside the visible window.
    fn ensure_visible(&mut self) {
        let Some(sel) = self.selected else {
            return;
        };
        let page = self.page_rows.max(1);
        if sel < self.scroll {
            self.scroll = sel;
        } else if sel >= self.scroll + page {
            self.scroll = sel + 1 - page;
        }
    }

    pub fn next_sort(&mut self) {
        self.sort = self.sort.next();
        self.refresh_rows();
    }

    pub fn set_page_rows(&mut self, rows: usize) {
        if self.page_rows != rows {
            self.page_rows = rows;
            self.clamp_selection();
        }
    }

    // Filter editing

    pub fn begin_filter(&mut self) {
        self.filter_before_edit = self.filter.clone();
        self.input_mode = InputMode::Filter;
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter.push(c);
        self.refresh_rows();
    }

    pub fn filter_pop(&mut self) {
        self.filter.pop();
        self.refresh_rows();
    }

    pub fn commit_filter(&mut self) {
        self.input_mode = InputMode::Normal;
        self.filter_before_edit.clear();
    }

    pub fn cancel_filter(&mut self) {
        self.filter = std::mem::take(&mut self.filter_before_edit);
        self.input_mode = InputMode::Normal;
        self.refresh_rows();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.refresh_rows();
    }

    // Selection

    pub fn select_down(&mut self, n: usize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.selected = Some(match self.selected {
            None => 0,
            Some(sel) => sel.saturating_add(n).min(last),
        });
        self.ensure_visible();
    }

    pub fn select_up(&mut self, n: usize) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            None => 0,
            Some(sel) => sel.saturating_sub(n),
        });
        self.ensure_visible();
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.selected = Some(0);
            self.scroll = 0;
        }
    }

    pub fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.selected = Some(self.rows.len() - 1);
            self.ensure_visible();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Moves the visible window without touching the selection.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll.saturating_add_signed(delta);
        self.scroll = target.min(self.max_scroll());
    }

    /// Selects the row under screen row `y` of the process table.
    /// Returns `true` when a row was hit.
    pub fn click(&mut self, x: u16, y: u16) -> bool {
        let Some(area) = self.table_area else {
            return false;
        };
        if x < area.x || x >= area.x + area.width || y < area.y || y >= area.y + area.height {
            return false;
        }
        let idx = self.scroll + usize::from(y - area.y);
        if idx >= self.rows.len() {
            return false;
        }
        self.selected = Some(idx);
        true
    }

    /// Opens the detail popup for the selected process, or the top row when
    /// nothing is selected.
    pub fn open_detail(&mut self) {
        let idx = self.selected.unwrap_or(0);
        if let Some(p) = self.rows.get(idx) {
            self.popup = Popup::ProcessDetail { pid: p.pid };
        }
    }

    /// Process shown by the detail popup, if it is still in the latest sample.
    pub fn detail_process(&self) -> Option<&Process> {
        match self.popup {
            Popup::ProcessDetail { pid } => self.sample.top.iter().find(|p| p.pid == pid),
            _ => None,
        }
    }

    pub fn toggle_help(&mut self) {
        self.popup = match self.popup {
            Popup::Help => Popup::None,
            _ => Popup::Help,
        };
    }

    pub fn toggle_export(&mut self) {
        if self.export_path.is_some() {
            self.export_enabled = !self.export_enabled;
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        alerts(&self.sample)
    }

    /// Blink phase derived from the tick counter alone.
    pub fn blink_on(&self) -> bool {
        (self.tick / BLINK_TICKS) % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cpu, Memory, Temp};

    fn proc(pid: u32, cpu: f64, mem: f64, command: &str) -> Process {
        Process {
            pid,
            cpu,
            memory: mem,
            command: command.to_string(),
            ..Process::default()
        }
    }

    fn state_with(n: u32) -> AppState {
        let mut state = AppState::new(&Config::default());
        let top = (0..n)
            .map(|i| proc(100 + i, f64::from(n - i), 0.0, &format!("worker-{}", i)))
            .collect();
        state.apply_sample(Sample {
            top,
            ..Sample::default()
        });
        state
    }

    #[test]
    fn test_filter_semantics() {
        let procs = vec![
            proc(1, 1.0, 0.0, "/usr/sbin/NGINX -g daemon"),
            proc(2, 2.0, 0.0, "rustc"),
        ];
        assert_eq!(filter_processes(&procs, ""), procs);
        assert_eq!(filter_processes(&procs, "nginx")[0].pid, 1);
        assert!(filter_processes(&procs, "postgres").is_empty());
    }

    #[test]
    fn test_throttled_rows_follow_sort_and_filter() {
        let mut alpha = proc(10, 50.0, 1.0, "alpha --serve");
        alpha.nice = 10;
        let mut beta = proc(11, 10.0, 9.0, "beta --index");
        beta.nice = 5;
        let mut state = AppState::new(&Config::default());
        state.apply_sample(Sample {
            top: vec![alpha.clone(), beta.clone()],
            throttled: vec![alpha, beta],
            ..Sample::default()
        });
        let pids = |s: &AppState| s.throttled_rows().iter().map(|p| p.pid).collect::<Vec<_>>();
        assert_eq!(pids(&state), vec![10, 11]);

        state.next_sort();
        assert_eq!(state.sort, SortKey::Memory);
        assert_eq!(pids(&state), vec![11, 10]);

        state.begin_filter();
        for c in "ALPHA".chars() {
            state.filter_push(c);
        }
        assert_eq!(pids(&state), vec![10]);
        state.cancel_filter();
        assert_eq!(pids(&state), vec![11, 10]);
    }

    #[test]
    fn test_filter_escape_restores_previous() {
        let mut state = state_with(5);
        state.filter = "worker".to_string();
        state.begin_filter();
        state.filter_push('-');
        state.filter_push('3');
        assert_eq!(state.rows().len(), 1);
        state.cancel_filter();
        assert_eq!(state.filter, "worker");
        assert_eq!(state.rows().len(), 5);
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_filter_commit_keeps_text() {
        let mut state = state_with(5);
        state.begin_filter();
        for c in "worker-1".chars() {
            state.filter_push(c);
        }
        state.filter_pop();
        state.filter_push('2');
        state.commit_filter();
        assert_eq!(state.filter, "worker-2");
        assert_eq!(state.rows()[0].pid, 102);
    }

    #[test]
    fn test_selection_autoscrolls() {
        let mut state = state_with(30);
        state.set_page_rows(10);
        state.select_down(1);
        assert_eq!(state.selected, Some(0));
        state.select_down(15);
        assert_eq!(state.selected, Some(15));
        assert_eq!(state.scroll, 6);
        state.select_up(12);
        assert_eq!(state.scroll, 3);
        state.select_last();
        assert_eq!(state.selected, Some(29));
        assert_eq!(state.scroll, 20);
        state.select_first();
        assert_eq!((state.selected, state.scroll), (Some(0), 0));
    }

    #[test]
    fn test_wheel_scroll_is_clamped() {
        let mut state = state_with(12);
        state.set_page_rows(10);
        state.scroll_by(WHEEL_STEP as isize);
        assert_eq!(state.scroll, 2);
        state.scroll_by(-(WHEEL_STEP as isize));
        assert_eq!(state.scroll, 0);
    }

    #[test]
    fn test_click_maps_row_to_index() {
        let mut state = state_with(20);
        state.set_page_rows(5);
        state.table_area = Some(Rect::new(0, 10, 80, 5));
        state.scroll = 4;
        assert!(state.click(3, 12));
        assert_eq!(state.selected, Some(6));
        assert!(!state.click(3, 9));
        assert!(!state.click(3, 15));
    }

    #[test]
    fn test_detail_defaults_to_top_row() {
        let mut state = state_with(3);
        state.open_detail();
        assert_eq!(state.popup, Popup::ProcessDetail { pid: 100 });
        assert_eq!(state.detail_process().map(|p| p.pid), Some(100));
    }

    #[test]
    fn test_selection_clamped_when_list_shrinks() {
        let mut state = state_with(10);
        state.select_last();
        state.apply_sample(Sample {
            top: vec![proc(1, 1.0, 0.0, "a"), proc(2, 0.5, 0.0, "b")],
            ..Sample::default()
        });
        assert_eq!(state.selected, Some(1));
        state.apply_sample(Sample::default());
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_sort_cycle_reorders_rows() {
        let mut state = AppState::new(&Config::default());
        state.apply_sample(Sample {
            top: vec![proc(1, 50.0, 1.0, "a"), proc(2, 10.0, 9.0, "b")],
            ..Sample::default()
        });
        assert_eq!(state.rows()[0].pid, 1);
        state.next_sort();
        assert_eq!(state.sort, SortKey::Memory);
        assert_eq!(state.rows()[0].pid, 2);
    }

    #[test]
    fn test_panel_toggles_are_independent() {
        let mut panels = Panels::default();
        panels.toggle(Panel::Gpu);
        panels.toggle(Panel::Cgroups);
        assert_eq!(
            panels.visible(),
            vec![Panel::Battery, Panel::Io, Panel::Temp, Panel::Inotify]
        );
        panels.toggle(Panel::Gpu);
        assert!(panels.gpu);
    }

    #[test]
    fn test_alert_thresholds() {
        let mut sample = Sample {
            cpu: Cpu {
                total: 90.0,
                ..Cpu::default()
            },
            memory: Memory {
                used_bytes: 50,
                total_bytes: 100,
                swap_used: 50,
                swap_total: 100,
                ..Memory::default()
            },
            ..Sample::default()
        };
        assert_eq!(alerts(&sample), vec![Alert::Cpu, Alert::Swap]);
        sample.temps.push(Temp {
            zone: "x86_pkg_temp".to_string(),
            temp: 85.0,
        });
        sample.cpu.total = 89.9;
        assert_eq!(alerts(&sample), vec![Alert::Swap, Alert::Temperature]);
    }

    #[test]
    fn test_blink_is_tick_driven() {
        let mut state = AppState::new(&Config::default());
        let phases: Vec<bool> = (0..7)
            .map(|t| {
                state.tick = t;
                state.blink_on()
            })
            .collect();
        assert_eq!(phases, vec![true, true, true, false, false, false, true]);
    }

    #[test]
    fn test_export_toggle_needs_path() {
        let mut state = AppState::new(&Config::default());
        state.toggle_export();
        assert!(!state.export_enabled);
        let config = Config {
            json_file: Some("/tmp/x.ndjson".into()),
            ..Config::default()
        };
        let mut state = AppState::new(&config);
        assert!(state.export_enabled);
        state.toggle_export();
        assert!(!state.export_enabled);
    }
}
