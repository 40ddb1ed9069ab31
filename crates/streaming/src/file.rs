use std::path::{Path, PathBuf};

use formats::geojson::FeatureCollection;
use formats::scenario::ScenarioParams;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::provider::{BoxFuture, DatasetProvider};

pub const GRID_FILE: &str = "grid.geojson";
pub const TREES_FILE: &str = "trees.geojson";
pub const PLANTING_SITES_FILE: &str = "planting_sites.geojson";

/// Reads the three collections from a local directory of GeoJSON exports.
///
/// Offline only: there is no scenario engine here, so scenario requests are
/// answered with the base grid.
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_collection(&self, name: &str) -> Result<FeatureCollection, ProviderError> {
        let path = self.root.join(name);
        debug!(path = %path.display(), "reading collection");
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ProviderError::Io { path, source })?;
        FeatureCollection::from_geojson_str(&text)
            .map_err(|e| ProviderError::decode("feature collection", e))
    }
}

impl DatasetProvider for FileProvider {
    fn grid<'a>(
        &'a self,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<FeatureCollection, ProviderError>> {
        if scenario.is_some_and(ScenarioParams::is_active) {
            warn!("file provider cannot project scenarios; serving the base grid");
        }
        Box::pin(self.read_collection(GRID_FILE))
    }

    fn trees(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        Box::pin(self.read_collection(TREES_FILE))
    }

    fn planting_sites(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        Box::pin(self.read_collection(PLANTING_SITES_FILE))
    }
}
