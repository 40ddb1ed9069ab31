use std::future::Future;
use std::pin::Pin;

use compute::ScenarioMetrics;
use formats::geojson::FeatureCollection;
use formats::properties::{CellDetails, Hotspot};
use formats::scenario::ScenarioParams;

use crate::error::ProviderError;

/// Boxed, sendable future; keeps the provider traits dyn-compatible.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of the three map collections.
pub trait DatasetProvider: Send + Sync {
    /// Stress grid; `Some(params)` asks for the scenario projection.
    fn grid<'a>(
        &'a self,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<FeatureCollection, ProviderError>>;

    fn trees(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>>;

    fn planting_sites(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>>;
}

pub trait CellDetailProvider: Send + Sync {
    fn cell_details<'a>(
        &'a self,
        id: &'a str,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<CellDetails, ProviderError>>;
}

/// Server-computed hotspot summaries. The outline layer filters the grid
/// locally and does not depend on this.
pub trait HotspotProvider: Send + Sync {
    fn hotspots(&self) -> BoxFuture<'_, Result<Vec<Hotspot>, ProviderError>>;
}

pub trait NarrativeProvider: Send + Sync {
    fn scenario_summary<'a>(
        &'a self,
        params: &'a ScenarioParams,
        metrics: &'a ScenarioMetrics,
    ) -> BoxFuture<'a, Result<String, ProviderError>>;
}
