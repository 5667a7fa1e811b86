//! Page-space geometry primitives.
//!
//! All coordinates are in PDF points with the origin at the page's top-left
//! corner. The PDF format itself measures from the bottom-left; the
//! conversion lives here and nowhere else, so every downstream consumer
//! (locator, renderer, verifier) sees one consistent space.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in top-left page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Axis-aligned intersection test. Rectangles that merely share an edge
    /// do not overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Grows the rectangle by `margin` on every side, clamped to the page.
    pub fn padded(&self, margin: f32, page_width: f32, page_height: f32) -> Rect {
        let x = (self.x - margin).max(0.0);
        let y = (self.y - margin).max(0.0);
        let right = (self.right() + margin).min(page_width);
        let bottom = (self.bottom() + margin).min(page_height);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Converts a native bottom-left-origin y coordinate to top-left space.
pub fn to_top_left_y(native_y: f32, page_height: f32) -> f32 {
    page_height - native_y
}

/// Converts a top-left y coordinate back to the native bottom-left origin.
pub fn to_bottom_left_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_union_spans_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 5.0);
        let b = Rect::new(20.0, 2.0, 10.0, 5.0);
        let u = a.union(&b);
        assert_eq!(u.x, 0.0);
        assert_eq!(u.right(), 30.0);
        assert_eq!(u.y, 0.0);
        assert_eq!(u.bottom(), 7.0);
    }

    #[test]
    fn test_padded_clamps_to_page() {
        let r = Rect::new(1.0, 1.0, 10.0, 10.0);
        let p = r.padded(5.0, 100.0, 100.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.right(), 16.0);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let page_height = 841.89_f32;
        let mut y = 0.0_f32;
        while y <= page_height {
            let converted = to_top_left_y(y, page_height);
            let back = to_bottom_left_y(converted, page_height);
            assert!((back - y).abs() < 1e-4, "round trip failed for y={}", y);
            y += 0.37;
        }
    }
}
