use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compositor::LayerStack;
use crate::layer::LayerId;
use crate::symbology::PickBehavior;

/// A click/tap reported by the engine: which layer, which drawn feature.
///
/// `index` is the position among the layer's drawn features, as handed to
/// the engine, not the index into the source collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickEvent {
    pub layer: LayerId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    Cell { id: String },
    PlantingSite { properties: Map<String, Value> },
    Ignored,
}

/// Map an engine pick back to what the host should do with it.
pub fn resolve_pick(stack: &LayerStack, event: PickEvent) -> PickOutcome {
    let Some(layer) = stack.get(event.layer) else {
        return PickOutcome::Ignored;
    };
    let Some(feature) = layer.feature(event.index) else {
        return PickOutcome::Ignored;
    };
    match layer.pick {
        PickBehavior::CellId => match feature.cell_id() {
            Some(id) => PickOutcome::Cell { id },
            None => PickOutcome::Ignored,
        },
        PickBehavior::Properties => PickOutcome::PlantingSite {
            properties: feature.properties.clone(),
        },
        PickBehavior::None => PickOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use formats::geojson::{FeatureCollection, GeoFeature, Geometry};
    use foundation::geo::LonLat;
    use serde_json::{Map, Value, json};

    use super::{PickEvent, PickOutcome, resolve_pick};
    use crate::compositor::{CompositionInputs, CompositorConfig, LayerStack, compose_layers};
    use crate::layer::{LayerId, LayerVisibility};

    fn feature(geometry: Geometry, value: Value) -> GeoFeature {
        let Value::Object(props) = value else {
            return GeoFeature::new(geometry, Map::new());
        };
        GeoFeature::new(geometry, props)
    }

    fn cell(x: f64, value: Value) -> GeoFeature {
        let ring = vec![
            LonLat::new(x, 45.5),
            LonLat::new(x + 0.01, 45.5),
            LonLat::new(x, 45.51),
            LonLat::new(x, 45.5),
        ];
        feature(Geometry::Polygon(vec![ring]), value)
    }

    fn point(value: Value) -> GeoFeature {
        feature(Geometry::Point(LonLat::new(-73.6, 45.5)), value)
    }

    fn stack() -> LayerStack {
        let mut unnamed = cell(0.02, json!({ "csi_current": 95.0 }));
        unnamed.id = Some("feature-7".into());
        let grid: FeatureCollection = vec![
            cell(0.0, json!({ "id": "cell_0001", "csi_current": 20.0 })),
            cell(0.01, json!({ "id": "cell_0002", "csi_current": 80.0 })),
            unnamed,
        ]
        .into_iter()
        .collect();
        let sites: FeatureCollection = vec![point(json!({ "priority_score": 0.91, "cell_id": "cell_0002" }))]
            .into_iter()
            .collect();
        let trees: FeatureCollection = vec![point(json!({})), point(json!({}))].into_iter().collect();

        let mut inputs = CompositionInputs {
            grid: Some(Arc::new(grid)),
            trees: Some(Arc::new(trees)),
            planting_sites: Some(Arc::new(sites)),
            visibility: LayerVisibility::ALL,
            ..Default::default()
        };
        inputs.viewport.zoom = 15.0;
        compose_layers(&inputs, &CompositorConfig::default())
    }

    #[test]
    fn grid_pick_reports_cell_id() {
        let stack = stack();
        let pick = |index| resolve_pick(&stack, PickEvent { layer: LayerId::CsiGrid, index });
        assert_eq!(pick(1), PickOutcome::Cell { id: "cell_0002".into() });
        // No `id` property: fall back to the feature id.
        assert_eq!(pick(2), PickOutcome::Cell { id: "feature-7".into() });
        assert_eq!(pick(3), PickOutcome::Ignored);
    }

    #[test]
    fn planting_pick_reports_properties() {
        let stack = stack();
        let outcome = resolve_pick(&stack, PickEvent { layer: LayerId::PlantingSites, index: 0 });
        let PickOutcome::PlantingSite { properties } = outcome else {
            panic!("expected site, got {outcome:?}");
        };
        assert_eq!(properties.get("priority_score"), Some(&json!(0.91)));
    }

    #[test]
    fn trees_and_hotspots_are_not_interactive() {
        let stack = stack();
        for layer in [LayerId::Trees, LayerId::Hotspots] {
            assert!(stack.get(layer).is_some());
            assert_eq!(resolve_pick(&stack, PickEvent { layer, index: 0 }), PickOutcome::Ignored);
        }
    }

    #[test]
    fn hidden_layer_picks_are_ignored() {
        let outcome = resolve_pick(
            &LayerStack::default(),
            PickEvent { layer: LayerId::CsiGrid, index: 0 },
        );
        assert_eq!(outcome, PickOutcome::Ignored);
    }
}
