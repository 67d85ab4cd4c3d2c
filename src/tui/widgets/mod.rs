//! Dashboard widgets.

mod analysis;
mod dashboard;
mod header;
mod help;
pub mod panels;
mod process_detail;
pub mod processes;
mod sysinfo;

pub use analysis::render_analysis;
pub use dashboard::render_dashboard;
pub use header::{render_footer, render_header};
pub use help::render_help;
pub use process_detail::render_process_detail;
pub use sysinfo::render_sysinfo;

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};

use super::style::Styles;

/// Centered popup rectangle sized as a share of `area`, clamped to the given
/// bounds and never larger than `area` itself.
pub(crate) fn popup_area(
    area: Rect,
    width_pct: u16,
    height_pct: u16,
    width_bounds: (u16, u16),
    height_bounds: (u16, u16),
) -> Rect {
    let width = (area.width * width_pct / 100)
        .clamp(width_bounds.0, width_bounds.1)
        .min(area.width);
    let height = (area.height * height_pct / 100)
        .clamp(height_bounds.0, height_bounds.1)
        .min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// `label: value` line with a dimmed, padded label.
pub(crate) fn field<'a>(label: &str, value: impl Into<Span<'a>>) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), Styles::dim()),
        value.into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_area_fits_inside() {
        let area = Rect::new(0, 0, 30, 8);
        let popup = popup_area(area, 70, 85, (60, 100), (20, 40));
        assert_eq!(popup, Rect::new(0, 0, 30, 8));

        let area = Rect::new(0, 0, 200, 60);
        let popup = popup_area(area, 50, 50, (40, 80), (10, 30));
        assert_eq!(popup, Rect::new(60, 15, 80, 30));
    }
}
