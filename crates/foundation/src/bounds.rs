use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Width/height in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn as_vec(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn clamp(self, min: Size, max: Size) -> Self {
        Self::new(
            self.width.max(min.width).min(max.width),
            self.height.max(min.height).min(max.height),
        )
    }
}

/// Axis-aligned rectangle in screen pixels, anchored at its top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Vec2, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size.as_vec()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.origin.x && p.y >= self.origin.y && p.x <= max.x && p.y <= max.y
    }

    /// True when `inner` lies entirely inside `self`.
    pub fn encloses(&self, inner: &Rect) -> bool {
        self.contains(inner.origin) && self.contains(inner.max())
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Size};
    use crate::math::Vec2;

    #[test]
    fn size_clamp_respects_both_bounds() {
        let min = Size::new(280.0, 300.0);
        let max = Size::new(500.0, 800.0);
        assert_eq!(Size::new(10.0, 900.0).clamp(min, max), Size::new(280.0, 800.0));
        assert_eq!(Size::new(320.0, 400.0).clamp(min, max), Size::new(320.0, 400.0));
    }

    #[test]
    fn rect_encloses() {
        let screen = Rect::new(Vec2::ZERO, Size::new(100.0, 100.0));
        let inside = Rect::new(Vec2::new(10.0, 10.0), Size::new(20.0, 20.0));
        let spill = Rect::new(Vec2::new(90.0, 10.0), Size::new(20.0, 20.0));
        assert!(screen.encloses(&inside));
        assert!(!screen.encloses(&spill));
    }
}
