use foundation::color::Rgba;
use serde::Serialize;

use crate::layer::LayerId;

pub const GRID_STROKE: Rgba = Rgba::new(80, 80, 80, 204);
pub const HOTSPOT_STROKE: Rgba = Rgba::new(255, 0, 0, 230);
pub const TREE_FILL: Rgba = Rgba::new(34, 139, 34, 153);
pub const PLANTING_FILL: Rgba = Rgba::new(46, 204, 113, 204);
pub const PLANTING_STROKE: Rgba = Rgba::new(39, 174, 96, 255);

/// How the engine should draw a layer's features.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerGeometry {
    /// Filled polygons with an outline.
    Fill,
    /// Polygon outlines only.
    Outline,
    Point,
}

/// What a pick on this layer reports back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickBehavior {
    None,
    CellId,
    Properties,
}

impl PickBehavior {
    pub fn is_pickable(self) -> bool {
        !matches!(self, PickBehavior::None)
    }
}

/// Fill colours for the features a layer draws.
///
/// `PerFeature` is aligned with selection positions, not source indices.
#[derive(Debug, Clone, PartialEq)]
pub enum FillColors {
    None,
    Uniform(Rgba),
    PerFeature(Vec<Rgba>),
}

impl FillColors {
    pub fn color_at(&self, position: usize) -> Option<Rgba> {
        match self {
            FillColors::None => None,
            FillColors::Uniform(c) => Some(*c),
            FillColors::PerFeature(colors) => colors.get(position).copied(),
        }
    }
}

/// Fixed per-layer styling; only the grid's fill varies per feature.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub geometry: LayerGeometry,
    pub fill: Option<Rgba>,
    pub stroke: Option<Rgba>,
    pub stroke_width_px: f32,
    pub point_radius_px: Option<f32>,
    pub pick: PickBehavior,
}

impl LayerStyle {
    pub const fn for_layer(id: LayerId) -> Self {
        match id {
            LayerId::CsiGrid => Self {
                geometry: LayerGeometry::Fill,
                fill: None,
                stroke: Some(GRID_STROKE),
                stroke_width_px: 1.0,
                point_radius_px: None,
                pick: PickBehavior::CellId,
            },
            LayerId::Hotspots => Self {
                geometry: LayerGeometry::Outline,
                fill: None,
                stroke: Some(HOTSPOT_STROKE),
                stroke_width_px: 3.0,
                point_radius_px: None,
                pick: PickBehavior::None,
            },
            LayerId::Trees => Self {
                geometry: LayerGeometry::Point,
                fill: Some(TREE_FILL),
                stroke: None,
                stroke_width_px: 0.0,
                point_radius_px: Some(2.0),
                pick: PickBehavior::None,
            },
            LayerId::PlantingSites => Self {
                geometry: LayerGeometry::Point,
                fill: Some(PLANTING_FILL),
                stroke: Some(PLANTING_STROKE),
                stroke_width_px: 1.0,
                point_radius_px: Some(3.0),
                pick: PickBehavior::Properties,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerGeometry, LayerStyle, PickBehavior};
    use crate::layer::LayerId;

    #[test]
    fn only_grid_and_sites_are_pickable() {
        let pickable: Vec<LayerId> = LayerId::DRAW_ORDER
            .into_iter()
            .filter(|id| LayerStyle::for_layer(*id).pick.is_pickable())
            .collect();
        assert_eq!(pickable, vec![LayerId::CsiGrid, LayerId::PlantingSites]);
        assert_eq!(LayerStyle::for_layer(LayerId::Trees).pick, PickBehavior::None);
    }

    #[test]
    fn hotspots_are_unfilled_outlines() {
        let s = LayerStyle::for_layer(LayerId::Hotspots);
        assert_eq!(s.geometry, LayerGeometry::Outline);
        assert_eq!(s.fill, None);
        assert_eq!(s.stroke_width_px, 3.0);
    }
}
