use compute::ScenarioMetrics;
use formats::geojson::FeatureCollection;
use formats::properties::{CellDetails, Hotspot};
use formats::scenario::ScenarioParams;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ApiConfig, ConfigError};
use crate::error::ProviderError;
use crate::provider::{
    BoxFuture, CellDetailProvider, DatasetProvider, HotspotProvider, NarrativeProvider,
};

/// Body of `POST /api/scenario/summary`.
#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    car: f64,
    trees: f64,
    transit: f64,
    aggregate_metrics: &'a ScenarioMetrics,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    narrative: String,
}

/// Query string for scenario-parameterised requests.
///
/// Always carries `scenario=current|2035`; each slider is included only when
/// non-zero.
pub fn scenario_query(scenario: Option<&ScenarioParams>) -> String {
    let params = scenario.copied().unwrap_or_default();
    let mut query = format!("scenario={}", params.label());
    for (key, value) in [("car", params.car), ("trees", params.trees), ("transit", params.transit)] {
        if value != 0.0 {
            query.push_str(&format!("&{key}={value}"));
        }
    }
    query
}

/// Client for the CityPulse REST backend.
pub struct HttpProvider {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(config: ApiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn grid_url(&self, scenario: Option<&ScenarioParams>) -> String {
        format!("{}?{}", self.config.endpoint("api/grid"), scenario_query(scenario))
    }

    /// `id` is pushed as one path segment, so `/`, `?` and `#` are escaped.
    pub fn cell_url(
        &self,
        id: &str,
        scenario: Option<&ScenarioParams>,
    ) -> Result<reqwest::Url, ProviderError> {
        let endpoint = self.config.endpoint("api/cell");
        let invalid =
            |reason: String| ProviderError::Unavailable(format!("bad cell URL {endpoint}: {reason}"));
        let mut url = reqwest::Url::parse(&endpoint).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot have a path".to_string()))?
            .push(id);
        if let Some(p) = scenario.filter(|p| p.is_active()) {
            url.set_query(Some(&scenario_query(Some(p))));
        }
        Ok(url)
    }

    async fn get_text(&self, url: String) -> Result<String, ProviderError> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ProviderError::Http { url: url.clone(), source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url,
                status: status.as_u16(),
            });
        }
        resp.text()
            .await
            .map_err(|source| ProviderError::Http { url, source })
    }

    async fn get_collection(&self, url: String) -> Result<FeatureCollection, ProviderError> {
        let body = self.get_text(url).await?;
        FeatureCollection::from_geojson_str(&body)
            .map_err(|e| ProviderError::decode("feature collection", e))
    }
}

impl DatasetProvider for HttpProvider {
    fn grid<'a>(
        &'a self,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<FeatureCollection, ProviderError>> {
        let url = self.grid_url(scenario);
        Box::pin(self.get_collection(url))
    }

    fn trees(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        Box::pin(self.get_collection(self.config.endpoint("api/trees")))
    }

    fn planting_sites(&self) -> BoxFuture<'_, Result<FeatureCollection, ProviderError>> {
        Box::pin(self.get_collection(self.config.endpoint("api/planting-sites")))
    }
}

impl CellDetailProvider for HttpProvider {
    fn cell_details<'a>(
        &'a self,
        id: &'a str,
        scenario: Option<&'a ScenarioParams>,
    ) -> BoxFuture<'a, Result<CellDetails, ProviderError>> {
        Box::pin(async move {
            let url = self.cell_url(id, scenario)?;
            let body = self.get_text(url.to_string()).await?;
            serde_json::from_str(&body).map_err(|e| ProviderError::decode("cell details", e))
        })
    }
}

impl HotspotProvider for HttpProvider {
    fn hotspots(&self) -> BoxFuture<'_, Result<Vec<Hotspot>, ProviderError>> {
        let url = self.config.endpoint("api/hotspots");
        Box::pin(async move {
            let body = self.get_text(url).await?;
            serde_json::from_str(&body).map_err(|e| ProviderError::decode("hotspots", e))
        })
    }
}

impl NarrativeProvider for HttpProvider {
    fn scenario_summary<'a>(
        &'a self,
        params: &'a ScenarioParams,
        metrics: &'a ScenarioMetrics,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        let url = self.config.endpoint("api/scenario/summary");
        Box::pin(async move {
            let body = SummaryRequest {
                car: params.car,
                trees: params.trees,
                transit: params.transit,
                aggregate_metrics: metrics,
            };
            debug!(%url, "POST");
            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|source| ProviderError::Http { url: url.clone(), source })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ProviderError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            let text = resp
                .text()
                .await
                .map_err(|source| ProviderError::Http { url, source })?;
            let parsed: SummaryResponse =
                serde_json::from_str(&text).map_err(|e| ProviderError::decode("narrative", e))?;
            Ok(parsed.narrative)
        })
    }
}

#[cfg(test)]
mod tests {
    use compute::ScenarioMetrics;
    use formats::scenario::ScenarioParams;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{HttpProvider, SummaryRequest, scenario_query};
    use crate::config::ApiConfig;

    #[test]
    fn inactive_scenario_queries_current() {
        assert_eq!(scenario_query(None), "scenario=current");
        assert_eq!(scenario_query(Some(&ScenarioParams::default())), "scenario=current");
    }

    #[test]
    fn only_non_zero_sliders_are_sent() {
        let p = ScenarioParams::new(-0.25, 0.0, 0.5);
        assert_eq!(scenario_query(Some(&p)), "scenario=2035&car=-0.25&transit=0.5");
    }

    #[test]
    fn endpoint_urls() {
        let http = HttpProvider::new(ApiConfig::default()).expect("client");
        assert_eq!(
            http.grid_url(Some(&ScenarioParams::new(0.0, 0.5, 0.0))),
            "http://localhost:5001/api/grid?scenario=2035&trees=0.5"
        );
        let cell = |id: &str, scenario: Option<&ScenarioParams>| http.cell_url(id, scenario).expect("cell url").to_string();
        assert_eq!(cell("cell_0042", None), "http://localhost:5001/api/cell/cell_0042");
        assert_eq!(
            cell("cell_0042", Some(&ScenarioParams::default())),
            "http://localhost:5001/api/cell/cell_0042"
        );
        assert_eq!(
            cell("cell_0042", Some(&ScenarioParams::new(0.0, 0.0, 0.3))),
            "http://localhost:5001/api/cell/cell_0042?scenario=2035&transit=0.3"
        );
    }

    #[test]
    fn cell_id_is_a_single_escaped_segment() {
        let http = HttpProvider::new(ApiConfig::default()).expect("client");
        let url = http.cell_url("a/b?c#d", None).expect("cell url");
        assert_eq!(url.as_str(), "http://localhost:5001/api/cell/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn summary_body_shape() {
        let metrics = ScenarioMetrics {
            avg_csi_current: 60.0,
            avg_csi_scenario: 45.0,
            hotspot_count_current: 20,
            hotspot_count_scenario: 10,
        };
        let body = SummaryRequest {
            car: -0.5,
            trees: 0.2,
            transit: 0.0,
            aggregate_metrics: &metrics,
        };
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            json!({
                "car": -0.5,
                "trees": 0.2,
                "transit": 0.0,
                "aggregate_metrics": {
                    "avg_csi_current": 60.0,
                    "avg_csi_scenario": 45.0,
                    "hotspot_count_current": 20,
                    "hotspot_count_scenario": 10,
                },
            })
        );
    }
}
