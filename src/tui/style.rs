//! Color scheme, gradients and block-character renderings.

use ratatui::style::{Color, Modifier, Style};

/// Dashboard palette.
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;
    pub const SELECTED_BG: Color = Color::DarkGray;

    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;

    pub const TAB_ACTIVE: Color = Color::Cyan;
    pub const TAB_INACTIVE: Color = Color::Gray;

    pub const CPU_COLOR: Color = Color::Cyan;
    pub const MEM_COLOR: Color = Color::Magenta;
    pub const DISK_COLOR: Color = Color::Yellow;
    pub const NET_COLOR: Color = Color::Green;

    // Gradient stops: nominal, warning, critical.
    pub const NOMINAL: (u8, u8, u8) = (80, 200, 80);
    pub const WARNING: (u8, u8, u8) = (230, 200, 40);
    pub const CRITICAL: (u8, u8, u8) = (220, 50, 50);
}

/// Percent at which values leave the nominal band.
pub const WARNING_PCT: f64 = 60.0;
/// Percent at which values are critical.
pub const CRITICAL_PCT: f64 = 85.0;

/// Sparkline block ramp, lowest to highest.
pub const BLOCK_RAMP: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
pub const GAUGE_FILLED: char = '█';
pub const GAUGE_EMPTY: char = '░';

/// Severity band of a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Nominal,
    Warning,
    Critical,
}

impl Level {
    pub fn of(pct: f64) -> Self {
        if pct >= CRITICAL_PCT {
            Level::Critical
        } else if pct >= WARNING_PCT {
            Level::Warning
        } else {
            Level::Nominal
        }
    }
}

fn lerp(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Color for a percentage: nominal up to 60, blending to warning at 85,
/// critical from 85 up.
pub fn gradient(pct: f64) -> Color {
    let pct = if pct.is_finite() { pct } else { 0.0 };
    match Level::of(pct) {
        Level::Nominal => lerp(Theme::NOMINAL, Theme::WARNING, (pct / WARNING_PCT) * 0.5),
        Level::Warning => lerp(
            Theme::WARNING,
            Theme::CRITICAL,
            (pct - WARNING_PCT) / (CRITICAL_PCT - WARNING_PCT) * 0.5,
        ),
        Level::Critical => {
            let (r, g, b) = Theme::CRITICAL;
            Color::Rgb(r, g, b)
        }
    }
}

/// Single-line sparkline of the newest `width` values.
///
/// Values are scaled against `max`; a non-positive `max` scales against the
/// largest value shown (or renders the lowest block when all are zero).
pub fn sparkline(values: &[f64], width: usize, max: f64) -> String {
    let start = values.len().saturating_sub(width);
    let shown = &values[start..];
    let scale = if max > 0.0 {
        max
    } else {
        shown.iter().copied().fold(0.0, f64::max)
    };
    let top = (BLOCK_RAMP.len() - 1) as f64;
    shown
        .iter()
        .map(|&v| {
            if scale <= 0.0 || !v.is_finite() {
                return BLOCK_RAMP[0];
            }
            let idx = ((v / scale).clamp(0.0, 1.0) * top).round() as usize;
            BLOCK_RAMP[idx.min(BLOCK_RAMP.len() - 1)]
        })
        .collect()
}

/// Horizontal gauge bar of exactly `width` cells.
pub fn gauge_bar(pct: f64, width: usize) -> String {
    let pct = if pct.is_finite() {
        pct.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut s = String::with_capacity(width * 3);
    s.extend(std::iter::repeat_n(GAUGE_FILLED, filled));
    s.extend(std::iter::repeat_n(GAUGE_EMPTY, width - filled));
    s
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    pub fn header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Theme::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(Theme::TAB_ACTIVE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive() -> Style {
        Style::default().fg(Theme::TAB_INACTIVE)
    }

    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    pub fn cpu() -> Style {
        Style::default().fg(Theme::CPU_COLOR)
    }

    pub fn mem() -> Style {
        Style::default().fg(Theme::MEM_COLOR)
    }

    pub fn disk() -> Style {
        Style::default().fg(Theme::DISK_COLOR)
    }

    pub fn net() -> Style {
        Style::default().fg(Theme::NET_COLOR)
    }

    /// Foreground colored by percentage.
    pub fn level(pct: f64) -> Style {
        Style::default().fg(gradient(pct))
    }

    /// Blinking alert badge.
    pub fn alert() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn throttled() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn filter_input() -> Style {
        Style::default()
            .fg(Theme::FG)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Section header style for popups.
    pub fn section_header() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn help_key() -> Style {
        Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Level::of(0.0), Level::Nominal);
        assert_eq!(Level::of(59.9), Level::Nominal);
        assert_eq!(Level::of(60.0), Level::Warning);
        assert_eq!(Level::of(84.9), Level::Warning);
        assert_eq!(Level::of(85.0), Level::Critical);
        assert_eq!(Level::of(250.0), Level::Critical);
    }

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient(0.0), Color::Rgb(80, 200, 80));
        assert_eq!(gradient(60.0), Color::Rgb(230, 200, 40));
        assert_eq!(gradient(85.0), Color::Rgb(220, 50, 50));
        assert_eq!(gradient(100.0), Color::Rgb(220, 50, 50));
        assert_eq!(gradient(f64::NAN), Color::Rgb(80, 200, 80));
    }

    #[test]
    fn test_sparkline_scaling() {
        assert_eq!(sparkline(&[0.0, 50.0, 100.0], 10, 100.0), "▁▅█");
        assert_eq!(sparkline(&[0.0, 0.0], 10, 0.0), "▁▁");
        // auto-scale to the largest shown value
        assert_eq!(sparkline(&[1.0, 2.0], 10, 0.0), "▅█");
    }

    #[test]
    fn test_sparkline_keeps_newest_values() {
        let values: Vec<f64> = (0..20).map(f64::from).collect();
        let line = sparkline(&values, 5, 19.0);
        assert_eq!(line.chars().count(), 5);
        assert!(line.ends_with('█'));
    }

    #[test]
    fn test_gauge_bar() {
        assert_eq!(gauge_bar(50.0, 10), "█████░░░░░");
        assert_eq!(gauge_bar(150.0, 4), "████");
        assert_eq!(gauge_bar(-3.0, 4), "░░░░");
        assert_eq!(gauge_bar(f64::NAN, 2), "░░");
    }
}
