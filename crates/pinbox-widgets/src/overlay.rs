//! Placement and drawing helpers for popups.

use ratatui::layout::{Position, Rect};
use ratatui::widgets::{Block, Clear};
use ratatui::Frame;

/// A `width` x `height` rect centred in `area`, clamped to fit.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

/// A `width` x `height` rect with its top-left corner at `anchor`, shifted
/// left and up as needed to stay inside `area`.
pub fn anchored(width: u16, height: u16, anchor: Position, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = anchor.x.clamp(area.x, area.right().saturating_sub(w));
    let y = anchor.y.clamp(area.y, area.bottom().saturating_sub(h));
    Rect::new(x, y, w, h)
}

/// Clear `area`, draw `block` around it and return the inner rect.
pub fn render_overlay(frame: &mut Frame, area: Rect, block: Option<&Block>) -> Rect {
    frame.render_widget(Clear, area);
    match block {
        Some(block) => {
            let inner = block.inner(area);
            frame.render_widget(block.clone(), area);
            inner
        }
        None => area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fixed_basic() {
        let result = centered_fixed(40, 20, Rect::new(10, 5, 80, 40));
        assert_eq!(result, Rect::new(30, 15, 40, 20));
    }

    #[test]
    fn centered_fixed_clamps_to_area() {
        let result = centered_fixed(100, 50, Rect::new(0, 0, 20, 10));
        assert_eq!(result, Rect::new(0, 0, 20, 10));
    }

    #[test]
    fn anchored_stays_at_anchor_when_it_fits() {
        let area = Rect::new(0, 0, 80, 24);
        let result = anchored(16, 7, Position::new(10, 3), area);
        assert_eq!(result, Rect::new(10, 3, 16, 7));
    }

    #[test]
    fn anchored_shifts_back_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let result = anchored(16, 7, Position::new(35, 8), area);
        assert_eq!(result, Rect::new(24, 3, 16, 7));
    }
}
