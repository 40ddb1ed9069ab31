use foundation::bounds::Size;
use foundation::math::Vec2;
use runtime::viewport::ViewportSize;
use serde::{Deserialize, Serialize};

/// Height assumed for an auto-sized panel when a resize starts before the
/// host reported a rendered height.
pub const AUTO_HEIGHT_FALLBACK: f64 = 400.0;

/// Position/size bounds for one kind of panel.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLimits {
    pub min_size: Size,
    pub max_size: Size,
    /// Part of the panel that must stay on-screen vertically.
    pub header_height: f64,
    pub initial_position: Vec2,
    /// A height of 0 means "fit content".
    pub initial_size: Size,
}

impl Default for PanelLimits {
    fn default() -> Self {
        Self {
            min_size: Size::new(280.0, 300.0),
            max_size: Size::new(500.0, 800.0),
            header_height: 100.0,
            initial_position: Vec2::new(24.0, 80.0),
            initial_size: Size::new(320.0, 0.0),
        }
    }
}

impl PanelLimits {
    /// Allowed top-left range for a panel of `width` inside `viewport`.
    ///
    /// The upper bound is floored at 0 so a viewport narrower than the panel
    /// pins it to the left/top edge.
    pub fn position_bounds(&self, width: f64, viewport: ViewportSize) -> (Vec2, Vec2) {
        let max = Vec2::new(
            (viewport.width - width).max(0.0),
            (viewport.height - self.header_height).max(0.0),
        );
        (Vec2::ZERO, max)
    }

    pub fn clamp_position(&self, position: Vec2, width: f64, viewport: ViewportSize) -> Vec2 {
        let (min, max) = self.position_bounds(width, viewport);
        position.clamp_axes(min, max)
    }

    pub fn clamp_size(&self, size: Size) -> Size {
        size.clamp(self.min_size, self.max_size)
    }
}

/// Observable state of one floating panel.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelGeometry {
    pub position: Vec2,
    pub size: Size,
    pub expanded: bool,
}

impl PanelGeometry {
    pub fn auto_height(&self) -> bool {
        self.size.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::PanelLimits;
    use foundation::bounds::Size;
    use foundation::math::Vec2;
    use runtime::viewport::ViewportSize;

    #[test]
    fn position_bounds_keep_header_visible() {
        let limits = PanelLimits::default();
        let (min, max) = limits.position_bounds(320.0, ViewportSize::new(1000.0, 700.0));
        assert_eq!(min, Vec2::ZERO);
        assert_eq!(max, Vec2::new(680.0, 600.0));
    }

    #[test]
    fn tiny_viewport_pins_to_origin() {
        let limits = PanelLimits::default();
        let p = limits.clamp_position(Vec2::new(50.0, 50.0), 320.0, ViewportSize::new(200.0, 80.0));
        assert_eq!(p, Vec2::ZERO);
    }

    #[test]
    fn size_clamps_to_limits() {
        let limits = PanelLimits::default();
        assert_eq!(limits.clamp_size(Size::new(100.0, 1000.0)), Size::new(280.0, 800.0));
    }

    #[test]
    fn limits_read_partial_json() {
        let limits: PanelLimits =
            serde_json::from_str(r#"{"header_height": 60}"#).expect("limits");
        assert_eq!(limits.header_height, 60.0);
        assert_eq!(limits.min_size, PanelLimits::default().min_size);
    }
}
