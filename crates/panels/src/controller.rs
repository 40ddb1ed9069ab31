use foundation::bounds::Size;
use foundation::math::Vec2;
use runtime::viewport::ViewportSize;

use crate::geometry::{AUTO_HEIGHT_FALLBACK, PanelGeometry, PanelLimits};
use crate::listeners::{ListenerGuard, ListenerKind, PanelId, PointerListeners};

/// Current pointer gesture of a panel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanelMode {
    Idle,
    Dragging,
    Resizing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// Another gesture is in progress.
    Busy { current: PanelMode },
    /// The press landed on an embedded control inside the header.
    OnControl,
}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelError::Busy { current } => write!(f, "panel is busy ({current:?})"),
            PanelError::OnControl => write!(f, "press started on a header control"),
        }
    }
}

impl std::error::Error for PanelError {}

#[derive(Debug)]
enum Interaction {
    Idle,
    Dragging {
        offset: Vec2,
        _listeners: ListenerGuard,
    },
    Resizing {
        origin: Vec2,
        initial_size: Size,
        _listeners: ListenerGuard,
    },
}

impl Interaction {
    fn mode(&self) -> PanelMode {
        match self {
            Interaction::Idle => PanelMode::Idle,
            Interaction::Dragging { .. } => PanelMode::Dragging,
            Interaction::Resizing { .. } => PanelMode::Resizing,
        }
    }
}

/// Drag/resize/expand state machine for one floating panel.
///
/// `Idle -> Dragging -> Idle` and `Idle -> Resizing -> Idle`; the two gestures
/// are mutually exclusive. Global pointer listeners are held only while a
/// gesture is active.
#[derive(Debug)]
pub struct PanelGeometryController {
    id: PanelId,
    listeners: PointerListeners,
    limits: PanelLimits,
    viewport: ViewportSize,
    geometry: PanelGeometry,
    rendered_height: Option<f64>,
    interaction: Interaction,
}

impl PanelGeometryController {
    pub fn new(listeners: &PointerListeners, limits: PanelLimits, viewport: ViewportSize) -> Self {
        let position = limits.clamp_position(limits.initial_position, limits.initial_size.width, viewport);
        Self {
            id: listeners.register_panel(),
            listeners: listeners.clone(),
            limits,
            viewport,
            geometry: PanelGeometry {
                position,
                size: limits.initial_size,
                expanded: true,
            },
            rendered_height: None,
            interaction: Interaction::Idle,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    pub fn limits(&self) -> &PanelLimits {
        &self.limits
    }

    pub fn mode(&self) -> PanelMode {
        self.interaction.mode()
    }

    fn ensure_idle(&self) -> Result<(), PanelError> {
        match self.interaction.mode() {
            PanelMode::Idle => Ok(()),
            current => Err(PanelError::Busy { current }),
        }
    }

    /// Width used for horizontal clamping; auto width never occurs but a zero
    /// width reads as the initial width.
    fn effective_width(&self) -> f64 {
        if self.geometry.size.width > 0.0 {
            self.geometry.size.width
        } else {
            self.limits.initial_size.width
        }
    }

    /// Height the host measured for an auto-sized panel.
    pub fn set_rendered_height(&mut self, height: f64) {
        self.rendered_height = (height.is_finite() && height > 0.0).then_some(height);
    }

    pub fn pointer_down_header(&mut self, pointer: Vec2, on_control: bool) -> Result<(), PanelError> {
        self.ensure_idle()?;
        if on_control {
            return Err(PanelError::OnControl);
        }
        self.interaction = Interaction::Dragging {
            offset: pointer - self.geometry.position,
            _listeners: self.listeners.attach(self.id, ListenerKind::Drag),
        };
        Ok(())
    }

    pub fn pointer_down_resize(&mut self, pointer: Vec2) -> Result<(), PanelError> {
        self.ensure_idle()?;
        let mut initial_size = self.geometry.size;
        if self.geometry.auto_height() {
            initial_size.height = self.rendered_height.unwrap_or(AUTO_HEIGHT_FALLBACK);
        }
        self.interaction = Interaction::Resizing {
            origin: pointer,
            initial_size,
            _listeners: self.listeners.attach(self.id, ListenerKind::Resize),
        };
        Ok(())
    }

    /// Returns `true` when the geometry changed.
    pub fn pointer_move(&mut self, pointer: Vec2) -> bool {
        let before = self.geometry;
        match &self.interaction {
            Interaction::Idle => return false,
            Interaction::Dragging { offset, .. } => {
                self.geometry.position =
                    self.limits
                        .clamp_position(pointer - *offset, self.effective_width(), self.viewport);
            }
            Interaction::Resizing {
                origin,
                initial_size,
                ..
            } => {
                let delta = pointer - *origin;
                let wanted = Size::new(initial_size.width + delta.x, initial_size.height + delta.y);
                self.geometry.size = self.limits.clamp_size(wanted);
                // A wider panel must still fit on-screen.
                self.geometry.position =
                    self.limits
                        .clamp_position(self.geometry.position, self.effective_width(), self.viewport);
            }
        }
        self.geometry != before
    }

    /// End any gesture and detach listeners. Returns the mode that ended.
    pub fn pointer_up(&mut self) -> PanelMode {
        let ended = self.interaction.mode();
        self.interaction = Interaction::Idle;
        ended
    }

    /// Flip expanded/collapsed; allowed mid-gesture.
    pub fn toggle_expanded(&mut self) -> bool {
        self.geometry.expanded = !self.geometry.expanded;
        self.geometry.expanded
    }

    /// Track a window resize and pull the panel back on-screen.
    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        self.geometry.position =
            self.limits
                .clamp_position(self.geometry.position, self.effective_width(), viewport);
    }
}
