use std::time::{Duration, Instant};

use formats::geojson::FeatureCollection;
use formats::scenario::ScenarioParams;
use tracing::info;

use crate::error::ProviderError;
use crate::provider::DatasetProvider;

/// Results of one full load, one slot per collection.
#[derive(Debug)]
pub struct DatasetBundle {
    pub grid: Result<FeatureCollection, ProviderError>,
    pub trees: Result<FeatureCollection, ProviderError>,
    pub planting_sites: Result<FeatureCollection, ProviderError>,
    pub elapsed: Duration,
}

/// Fetch grid, trees and planting sites concurrently.
///
/// Never fails as a whole; each collection carries its own result.
pub async fn fetch_all<P>(provider: &P, scenario: Option<&ScenarioParams>) -> DatasetBundle
where
    P: DatasetProvider + ?Sized,
{
    let started = Instant::now();
    let (grid, trees, planting_sites) = tokio::join!(
        provider.grid(scenario),
        provider.trees(),
        provider.planting_sites()
    );
    let elapsed = started.elapsed();
    info!(
        grid = grid.as_ref().map(FeatureCollection::len).ok(),
        trees = trees.as_ref().map(FeatureCollection::len).ok(),
        planting_sites = planting_sites.as_ref().map(FeatureCollection::len).ok(),
        elapsed_ms = elapsed.as_millis() as u64,
        "datasets fetched"
    );
    DatasetBundle {
        grid,
        trees,
        planting_sites,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use formats::scenario::ScenarioParams;

    use super::fetch_all;
    use crate::memory::MemoryProvider;

    #[tokio::test]
    async fn each_collection_has_its_own_result() {
        let provider = MemoryProvider::new()
            .with_grid(MemoryProvider::sample_grid())
            .with_planting_sites(MemoryProvider::sample_points(4));
        let bundle = fetch_all(&provider, None).await;
        assert_eq!(bundle.grid.as_ref().map(|g| g.len()).ok(), Some(3));
        assert!(bundle.trees.is_err());
        assert_eq!(bundle.planting_sites.as_ref().map(|g| g.len()).ok(), Some(4));
    }

    #[tokio::test]
    async fn scenario_is_forwarded_to_grid() {
        let provider = MemoryProvider::new()
            .with_grid(MemoryProvider::sample_grid())
            .with_scenario_grid(MemoryProvider::sample_points(1));
        let p = ScenarioParams::new(0.0, 0.5, 0.0);
        let bundle = fetch_all(&provider, Some(&p)).await;
        assert_eq!(bundle.grid.as_ref().map(|g| g.len()).ok(), Some(1));
    }
}
