use std::env;
use std::path::PathBuf;
use std::time::Duration;

use streaming::config::{ApiConfig, ConfigError, DEFAULT_API_URL};

pub const ENV_API_URL: &str = "CITYPULSE_API_URL";
pub const ENV_TIMEOUT_MS: &str = "CITYPULSE_TIMEOUT_MS";
pub const ENV_DATA_DIR: &str = "CITYPULSE_DATA_DIR";

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Runtime settings for the viewer; CLI flags override the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub api: ApiConfig,
    /// Read GeoJSON exports from here instead of calling the backend.
    pub data_dir: Option<PathBuf>,
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = env_var_string(&lookup, ENV_API_URL, DEFAULT_API_URL);
        let timeout_ms = env_var_u64(&lookup, ENV_TIMEOUT_MS, DEFAULT_TIMEOUT_MS);
        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            api: ApiConfig::new(&url, Duration::from_millis(timeout_ms))?,
            data_dir,
        })
    }

    pub fn with_overrides(
        self,
        api_url: Option<&str>,
        timeout_ms: Option<u64>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let url = api_url.unwrap_or(self.api.base_url());
        let timeout = timeout_ms.map(Duration::from_millis).unwrap_or(self.api.timeout);
        Ok(Self {
            api: ApiConfig::new(url, timeout)?,
            data_dir: data_dir.or(self.data_dir),
        })
    }
}

fn env_var_string(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_var_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use streaming::config::ConfigError;

    use super::ViewerConfig;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let c = ViewerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(c.api.base_url(), "http://localhost:5001");
        assert_eq!(c.api.timeout, Duration::from_secs(30));
        assert_eq!(c.data_dir, None);
    }

    #[test]
    fn reads_environment_and_ignores_unparsable_timeout() {
        let c = ViewerConfig::from_lookup(lookup(&[
            ("CITYPULSE_API_URL", "https://api.citypulse.test/"),
            ("CITYPULSE_TIMEOUT_MS", "soon"),
            ("CITYPULSE_DATA_DIR", "/srv/citypulse"),
        ]))
        .expect("config");
        assert_eq!(c.api.base_url(), "https://api.citypulse.test");
        assert_eq!(c.api.timeout, Duration::from_secs(30));
        assert_eq!(c.data_dir, Some(PathBuf::from("/srv/citypulse")));
    }

    #[test]
    fn invalid_url_is_an_error() {
        let err = ViewerConfig::from_lookup(lookup(&[("CITYPULSE_API_URL", "ftp://x")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidUrl("ftp://x".into()));
    }

    #[test]
    fn flags_override_environment() {
        let c = ViewerConfig::from_lookup(lookup(&[("CITYPULSE_TIMEOUT_MS", "500")]))
            .and_then(|c| c.with_overrides(Some("http://10.0.0.2:5001"), None, None))
            .expect("config");
        assert_eq!(c.api.base_url(), "http://10.0.0.2:5001");
        assert_eq!(c.api.timeout, Duration::from_millis(500));
    }
}
