use std::collections::HashMap;
use std::sync::Mutex;

use compute::ScenarioMetrics;
use formats::geojson::{FeatureCollection, GeoFeature, Geometry};
use formats::properties::{CellDetails, Hotspot};
use formats::scenario::ScenarioParams;
use foundation::geo::LonLat;
use serde_json::{Map, Value, json};

use crate::error::ProviderError;
use crate::provider::{
    BoxFuture, CellDetailProvider, DatasetProvider, HotspotProvider, NarrativeProvider,
};

/// In-process provider backed by fixed collections.
///
/// Used for tests and demos. A slot left empty answers with
/// [`ProviderError::Unavailable`], which is how fetch failures are simulated.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    grid: Option<FeatureCollection>,
    scenario_grid: Option<FeatureCollection>,
    trees: Option<FeatureCollection>,
    planting_sites: Option<FeatureCollection>,
    cells: HashMap<String, CellDetails>,
    hotspots: Option<Vec<Hotspot>>,
    narrative: Option<String>,
    calls: Mutex<Vec<String>>,
}

fn unavailable<T>(what: &str) -> Result<T, ProviderError> {
    Err(ProviderError::Unavailable(format!("{what} not available")))
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(mut self, grid: FeatureCollection) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Grid served for active scenarios; without it the base grid is used.
    pub fn with_scenario_grid(mut self, grid: FeatureCollection) -> Self {
        self.scenario_grid = Some(grid);
        self
    }

    pub fn with_trees(mut self, trees: FeatureCollection) -> Self {
        self.trees = Some(trees);
        self
    }

    pub fn with_planting_sites(mut self, sites: FeatureCollection) -> Self {
        self.planting_sites = Some(sites);
        self
    }

    pub fn with_cell(mut self, details: CellDetails) -> Self {
        self.cells.insert(details.id.clone(), details);
        self
    }

    pub fn with_hotspots(mut self, hotspots: Vec<Hotspot>) -> Self {
        self.hotspots = Some(hotspots);
        self
    }

    pub fn with_narrative(mut self, text: impl Into<String>) -> Self {
        self.narrative = Some(text.into());
        self
    }

    /// Requests served so far, e.g. `"grid:2035"` or `"cell:cell_0001"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// Three polygon cells with current CSI 40, 75 and 90.
    pub fn sample_grid() -> FeatureCollection {
        [("cell_0001", 40.0, 40.0), ("cell_0002", 75.0, 75.0), ("cell_0003", 90.0, 82.5)]
            .into_iter()
            .enumerate()
            .map(|(i, (id, current, scenario))| {
                let x = -73.60 + i as f64 * 0.01;
                let ring = vec![
                    LonLat::new(x, 45.50),
                    LonLat::new(x + 0.01, 45.50),
                    LonLat::new(x + 0.01, 45.51),
                    LonLat::new(x, 45.51),
                    LonLat::new(x, 45.50),
                ];
                GeoFeature::new(
                    Geometry::Polygon(vec![ring]),
                    object(json!({ "id": id, "csi_current": current, "csi_scenario": scenario })),
                )
            })
            .collect()
    }

    /// `n` points with descending priority scores.
    pub fn sample_points(n: usize) -> FeatureCollection {
        (0..n)
            .map(|i| {
                GeoFeature::new(
                    Geometry::Point(LonLat::new(-73.57 + i as f64 * 1e-3, 45.50)),
                    object(json!({ "priority_score": 1.0 - i as f64 / n.max(1) as f64 })),
                )
            })
            .collect()
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl DatasetProvider for MemoryProvider {
    fn grid<'a>(
        &'a self,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<FeatureCollection, ProviderError>> {
        let active = scenario.is_some_and(ScenarioParams::is_active);
        self.record(format!("grid:{}", if active { "2035" } else { "current" }));
        let grid = if active {
            self.scenario_grid.as_ref().or(self.grid.as_ref())
        } else {
            self.grid.as_ref()
        };
        let result = grid.cloned().map_or_else(|| unavailable("grid"), Ok);
        Box::pin(async move { result })
    }

    fn trees(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        self.record("trees".into());
        let result = self.trees.clone().map_or_else(|| unavailable("trees"), Ok);
        Box::pin(async move { result })
    }

    fn planting_sites(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        self.record("planting_sites".into());
        let result = self
            .planting_sites
            .clone()
            .map_or_else(|| unavailable("planting sites"), Ok);
        Box::pin(async move { result })
    }
}

impl CellDetailProvider for MemoryProvider {
    fn cell_details<'a>(
        &'a self,
        id: &'a str,
        _scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<CellDetails, ProviderError>> {
        self.record(format!("cell:{id}"));
        let result = match self.cells.get(id) {
            Some(d) => Ok(d.clone()),
            None => Err(ProviderError::Status {
                url: format!("memory://cell/{id}"),
                status: 404,
            }),
        };
        Box::pin(async move { result })
    }
}

impl HotspotProvider for MemoryProvider {
    fn hotspots(&self) -> BoxFuture<'_, Result<Vec<Hotspot>, ProviderError>> {
        self.record("hotspots".into());
        let result = self.hotspots.clone().map_or_else(|| unavailable("hotspots"), Ok);
        Box::pin(async move { result })
    }
}

impl NarrativeProvider for MemoryProvider {
    fn scenario_summary<'a>(
        &'a self,
        _params: &'a ScenarioParams,
        _metrics: &'a ScenarioMetrics,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        self.record("narrative".into());
        let result = self.narrative.clone().map_or_else(|| unavailable("narrative"), Ok);
        Box::pin(async move { result })
    }
}
