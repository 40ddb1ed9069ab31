use foundation::bounds::{Rect, Size};
use foundation::geo::{wrap_degrees, MERCATOR_MAX_LAT_DEG};
use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 24.0;
pub const MAX_PITCH_DEG: f64 = 85.0;

/// Camera parameters reported by the map engine.
///
/// This is the single source of truth for zoom-driven level of detail; the
/// engine owns gesture handling and only pushes new states in.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for ViewportState {
    /// Downtown Montréal at city scale.
    fn default() -> Self {
        Self {
            longitude: -73.567_256,
            latitude: 45.508_888,
            zoom: 11.0,
            pitch: 0.0,
            bearing: 0.0,
        }
    }
}

impl ViewportState {
    pub fn with_zoom(self, zoom: f64) -> Self {
        Self { zoom, ..self }
    }

    /// Clamp every field into the range the engine can represent.
    ///
    /// Non-finite fields fall back to the corresponding field of `fallback`.
    pub fn normalized(self, fallback: &ViewportState) -> Self {
        let pick = |v: f64, fb: f64| if v.is_finite() { v } else { fb };
        Self {
            longitude: wrap_degrees(pick(self.longitude, fallback.longitude)),
            latitude: pick(self.latitude, fallback.latitude)
                .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG),
            zoom: pick(self.zoom, fallback.zoom).clamp(MIN_ZOOM, MAX_ZOOM),
            pitch: pick(self.pitch, fallback.pitch).clamp(0.0, MAX_PITCH_DEG),
            bearing: wrap_degrees(pick(self.bearing, fallback.bearing)),
        }
    }
}

/// Pixel size of the map viewport, shared with floating panels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(Vec2::ZERO, Size::new(self.width.max(0.0), self.height.max(0.0)))
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// What an engine notification changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ViewportChange {
    pub moved: bool,
    pub zoom_changed: bool,
}

impl ViewportChange {
    /// Only zoom feeds layer composition; pan/pitch/bearing are engine-side.
    pub fn requires_recompose(&self) -> bool {
        self.zoom_changed
    }
}

/// Holds the current camera and classifies incoming notifications.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    state: ViewportState,
    size: ViewportSize,
}

impl ViewportTracker {
    pub fn new(state: ViewportState, size: ViewportSize) -> Self {
        Self {
            state: state.normalized(&ViewportState::default()),
            size,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    /// Apply a camera notification from the engine.
    pub fn apply(&mut self, next: ViewportState) -> ViewportChange {
        let next = next.normalized(&self.state);
        let change = ViewportChange {
            moved: next != self.state,
            zoom_changed: next.zoom != self.state.zoom,
        };
        self.state = next;
        change
    }

    /// Returns `true` when the pixel size actually changed.
    pub fn resize(&mut self, size: ViewportSize) -> bool {
        let changed = size != self.size;
        self.size = size;
        changed
    }
}
