use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geojson::GeoFeature;

/// Typed view of a grid cell's property record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellProperties {
    pub id: String,
    pub csi_current: f64,
    /// Absent on grids that were never scenario-adjusted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csi_scenario: Option<f64>,
    pub air_stress: f64,
    pub heat_stress: f64,
    pub noise_stress: f64,
    pub traffic_stress: f64,
    pub crowding_stress: f64,
    pub vulnerability_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hotspot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_limit_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_score: Option<f64>,
}

impl CellProperties {
    pub fn from_feature(feature: &GeoFeature) -> Result<Self, serde_json::Error> {
        from_properties(&feature.properties)
    }

    /// Scenario CSI, falling back to the current value when absent.
    pub fn effective_scenario_csi(&self) -> f64 {
        self.csi_scenario.unwrap_or(self.csi_current)
    }
}

/// Properties reported when a planting site is picked (tooltip payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingSiteProperties {
    pub priority_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub site_type: Option<String>,
}

impl PlantingSiteProperties {
    pub fn from_properties(properties: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        from_properties(properties)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellMetrics {
    pub csi_current: f64,
    pub csi_scenario: f64,
    pub air_stress: f64,
    pub heat_stress: f64,
    pub noise_stress: f64,
    pub traffic_stress: f64,
    pub crowding_stress: f64,
    pub vulnerability_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_count: Option<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub expected_delta_csi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interventions {
    pub trees: Intervention,
    pub car_limits: Intervention,
    pub transit: Intervention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSummary {
    pub short: String,
    pub source: String,
}

/// Detail record shown in the side panel after a cell is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDetails {
    pub id: String,
    pub metrics: CellMetrics,
    pub interventions: Interventions,
    pub summary: CellSummary,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotCentroid {
    pub lat: f64,
    pub lng: f64,
}

/// Server-side hotspot summary (`GET /api/hotspots`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: String,
    pub centroid: HotspotCentroid,
    pub avg_csi: f64,
    /// Dominant stress components, strongest first.
    #[serde(default)]
    pub top_drivers: Vec<String>,
    pub avg_vulnerability: f64,
    pub cell_ids: Vec<String>,
}

fn from_properties<T: serde::de::DeserializeOwned>(
    properties: &Map<String, Value>,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(properties.clone()))
}

#[cfg(test)]
mod tests {
    use super::{CellDetails, CellProperties, Hotspot, PlantingSiteProperties};
    use crate::geojson::FeatureCollection;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn typed_cell_from_sample_grid() {
        let grid = FeatureCollection::from_geojson_str(include_str!(
            "../assets/sample_grid.geojson"
        ))
        .expect("parse grid");
        let cell = CellProperties::from_feature(&grid.features[2]).expect("typed cell");
        assert_eq!(cell.id, "cell_0003");
        assert_eq!(cell.is_hotspot, Some(true));
        assert_eq!(cell.effective_scenario_csi(), 82.5);
    }

    #[test]
    fn scenario_csi_falls_back_to_current() {
        let props = json!({
            "id": "c", "csi_current": 55.0,
            "air_stress": 0.1, "heat_stress": 0.1, "noise_stress": 0.1,
            "traffic_stress": 0.1, "crowding_stress": 0.1, "vulnerability_factor": 0.1
        });
        let cell: CellProperties = serde_json::from_value(props).expect("cell");
        assert_eq!(cell.csi_scenario, None);
        assert_eq!(cell.effective_scenario_csi(), 55.0);
    }

    #[test]
    fn planting_site_requires_priority_score() {
        let ok = json!({"priority_score": 0.8, "cell_id": "cell_0002", "type": "street"});
        let site = PlantingSiteProperties::from_properties(ok.as_object().unwrap()).unwrap();
        assert_eq!(site.site_type.as_deref(), Some("street"));

        let missing = json!({"cell_id": "cell_0002"});
        assert!(PlantingSiteProperties::from_properties(missing.as_object().unwrap()).is_err());
    }

    #[test]
    fn parses_cell_details_payload() {
        let payload = json!({
            "id": "cell_0002",
            "metrics": {
                "csi_current": 75.0, "csi_scenario": 61.0,
                "air_stress": 0.7, "heat_stress": 0.6, "noise_stress": 0.7,
                "traffic_stress": 0.8, "crowding_stress": 0.5, "vulnerability_factor": 0.6
            },
            "interventions": {
                "trees": {"score": 0.8, "recommended_count": 12, "expected_delta_csi": -6.0},
                "car_limits": {"score": 0.6, "type": "low_traffic_zone", "expected_delta_csi": -4.0},
                "transit": {"score": 0.3, "expected_delta_csi": -1.5}
            },
            "summary": {"short": "High traffic stress.", "source": "rule_based"}
        });
        let details: CellDetails = serde_json::from_value(payload).expect("details");
        assert_eq!(details.interventions.trees.recommended_count, Some(12));
        assert_eq!(
            details.interventions.car_limits.kind.as_deref(),
            Some("low_traffic_zone")
        );
    }

    #[test]
    fn hotspot_list_from_api() {
        let list: Vec<Hotspot> = serde_json::from_value(json!([{
            "id": "hotspot_1",
            "centroid": { "lat": 45.51, "lng": -73.57 },
            "avg_csi": 88.0,
            "top_drivers": ["traffic", "noise"],
            "avg_vulnerability": 1.2,
            "cell_ids": ["cell_0003"]
        }]))
        .expect("hotspots");
        assert_eq!(list[0].cell_ids, vec!["cell_0003"]);
        assert_eq!(list[0].centroid.lng, -73.57);
        assert_eq!(list[0].top_drivers, vec!["traffic", "noise"]);
    }
}
