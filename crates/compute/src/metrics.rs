use std::collections::BTreeMap;

use formats::geojson::FeatureCollection;
use layers::color_scale::StressBand;
use layers::hotspots::HOTSPOT_THRESHOLD;
use serde::{Deserialize, Serialize};

use crate::analysis::statistics::Summary;

/// Citywide comparison of the current and projected stress index.
///
/// Field names match the `aggregate_metrics` object the narrative endpoint
/// expects.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub avg_csi_current: f64,
    pub avg_csi_scenario: f64,
    pub hotspot_count_current: usize,
    pub hotspot_count_scenario: usize,
}

impl ScenarioMetrics {
    /// `None` for an empty grid. Cells without a projected value count with
    /// their current value on the scenario side.
    pub fn from_grid(grid: &FeatureCollection) -> Option<Self> {
        if grid.is_empty() {
            return None;
        }
        let mut current = Summary::default();
        let mut scenario = Summary::default();
        let mut hot_current = 0;
        let mut hot_scenario = 0;
        for cell in grid.iter() {
            let now = cell.csi_current();
            let then = cell.csi_scenario().unwrap_or(now);
            current.push(now);
            scenario.push(then);
            hot_current += usize::from(now > HOTSPOT_THRESHOLD);
            hot_scenario += usize::from(then > HOTSPOT_THRESHOLD);
        }
        Some(Self {
            avg_csi_current: current.mean().unwrap_or(0.0),
            avg_csi_scenario: scenario.mean().unwrap_or(0.0),
            hotspot_count_current: hot_current,
            hotspot_count_scenario: hot_scenario,
        })
    }

    /// Drop in average CSI; negative when the scenario makes things worse.
    pub fn reduction(&self) -> f64 {
        self.avg_csi_current - self.avg_csi_scenario
    }

    pub fn hotspots_reduced(&self) -> i64 {
        self.hotspot_count_current as i64 - self.hotspot_count_scenario as i64
    }
}

/// Cells per legend band, keyed on `csi_current`.
pub fn band_distribution(grid: &FeatureCollection) -> BTreeMap<&'static str, usize> {
    let mut out = BTreeMap::new();
    for cell in grid.iter() {
        *out.entry(StressBand::of(cell.csi_current()).label()).or_insert(0) += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use formats::geojson::FeatureCollection;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{ScenarioMetrics, band_distribution};

    fn grid(cells: serde_json::Value) -> FeatureCollection {
        FeatureCollection::from_geojson_value(&cells).expect("grid")
    }

    fn cell(current: f64, scenario: Option<f64>) -> serde_json::Value {
        let mut props = json!({ "csi_current": current });
        if let Some(s) = scenario {
            props["csi_scenario"] = json!(s);
        }
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [-73.6, 45.5] },
            "properties": props,
        })
    }

    #[test]
    fn averages_and_hotspot_counts() {
        let g = grid(json!({
            "type": "FeatureCollection",
            "features": [cell(40.0, Some(40.0)), cell(75.0, Some(65.0)), cell(90.0, Some(82.0))],
        }));
        let m = ScenarioMetrics::from_grid(&g).expect("metrics");
        assert!((m.avg_csi_current - 68.333).abs() < 1e-3);
        assert!((m.avg_csi_scenario - 62.333).abs() < 1e-3);
        assert_eq!((m.hotspot_count_current, m.hotspot_count_scenario), (2, 1));
        assert!((m.reduction() - 6.0).abs() < 1e-9);
        assert_eq!(m.hotspots_reduced(), 1);
    }

    #[test]
    fn missing_scenario_uses_current() {
        let g = grid(json!({
            "type": "FeatureCollection",
            "features": [cell(80.0, None)],
        }));
        let m = ScenarioMetrics::from_grid(&g).expect("metrics");
        assert_eq!(m.avg_csi_scenario, 80.0);
        assert_eq!(m.hotspot_count_scenario, 1);
    }

    #[test]
    fn empty_grid_has_no_metrics() {
        assert_eq!(ScenarioMetrics::from_grid(&FeatureCollection::default()), None);
    }

    #[test]
    fn serializes_with_endpoint_field_names() {
        let m = ScenarioMetrics {
            avg_csi_current: 60.0,
            avg_csi_scenario: 40.0,
            hotspot_count_current: 20,
            hotspot_count_scenario: 8,
        };
        assert_eq!(
            serde_json::to_value(m).expect("json"),
            json!({
                "avg_csi_current": 60.0,
                "avg_csi_scenario": 40.0,
                "hotspot_count_current": 20,
                "hotspot_count_scenario": 8,
            })
        );
    }

    #[test]
    fn bands_count_cells() {
        let g = grid(json!({
            "type": "FeatureCollection",
            "features": [cell(10.0, None), cell(15.0, None), cell(85.0, None)],
        }));
        let d = band_distribution(&g);
        assert_eq!(d.get("Low stress"), Some(&2));
        assert_eq!(d.get("Critical"), Some(&1));
        assert_eq!(d.len(), 2);
    }
}
