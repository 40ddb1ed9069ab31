use compute::ScenarioMetrics;
use formats::geojson::FeatureCollection;
use formats::properties::{CellDetails, Hotspot};
use formats::scenario::ScenarioParams;
use streaming::config::ConfigError;
use streaming::error::ProviderError;
use streaming::file::FileProvider;
use streaming::http::HttpProvider;
use streaming::provider::{
    BoxFuture, CellDetailProvider, DatasetProvider, HotspotProvider, NarrativeProvider,
};

use crate::config::ViewerConfig;

/// The provider chosen from configuration.
pub enum Backend {
    Http(HttpProvider),
    /// Offline GeoJSON exports; no cell details or narratives.
    Files(FileProvider),
}

impl Backend {
    pub fn from_config(config: &ViewerConfig) -> Result<Self, ConfigError> {
        match &config.data_dir {
            Some(dir) => Ok(Backend::Files(FileProvider::new(dir))),
            None => Ok(Backend::Http(HttpProvider::new(config.api.clone())?)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Http(p) => p.config().base_url().to_string(),
            Backend::Files(p) => p.root().display().to_string(),
        }
    }

    fn offline<T: Send + 'static>(what: &str) -> BoxFuture<'static, Result<T, ProviderError>> {
        let err = ProviderError::Unavailable(format!("{what} requires the CityPulse API"));
        Box::pin(async move { Err(err) })
    }
}

impl DatasetProvider for Backend {
    fn grid<'a>(
        &'a self,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<FeatureCollection, ProviderError>> {
        match self {
            Backend::Http(p) => p.grid(scenario),
            Backend::Files(p) => p.grid(scenario),
        }
    }

    fn trees(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        match self {
            Backend::Http(p) => p.trees(),
            Backend::Files(p) => p.trees(),
        }
    }

    fn planting_sites(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        match self {
            Backend::Http(p) => p.planting_sites(),
            Backend::Files(p) => p.planting_sites(),
        }
    }
}

impl CellDetailProvider for Backend {
    fn cell_details<'a>(
        &'a self,
        id: &'a str,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<CellDetails, ProviderError>> {
        match self {
            Backend::Http(p) => p.cell_details(id, scenario),
            Backend::Files(_) => Self::offline("cell details"),
        }
    }
}

impl HotspotProvider for Backend {
    fn hotspots(&self) -> BoxFuture<'_, Result<Vec<Hotspot>, ProviderError>> {
        match self {
            Backend::Http(p) => p.hotspots(),
            Backend::Files(_) => Self::offline("hotspot summaries"),
        }
    }
}

impl NarrativeProvider for Backend {
    fn scenario_summary<'a>(
        &'a self,
        params: &'a ScenarioParams,
        metrics: &'a ScenarioMetrics,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        match self {
            Backend::Http(p) => p.scenario_summary(params, metrics),
            Backend::Files(_) => Self::offline("narrative generation"),
        }
    }
}
