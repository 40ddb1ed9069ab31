use std::path::PathBuf;

/// Failure reported by a dataset, cell-detail or narrative provider.
#[derive(Debug)]
pub enum ProviderError {
    /// Request could not be sent or the response body could not be read.
    Http { url: String, source: reqwest::Error },
    /// Backend answered with a non-success status.
    Status { url: String, status: u16 },
    /// Payload arrived but does not have the expected shape.
    Decode {
        what: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    Io { path: PathBuf, source: std::io::Error },
    /// The provider cannot serve this request at all.
    Unavailable(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Http { url, source } => write!(f, "request to {url} failed: {source}"),
            ProviderError::Status { url, status } => write!(f, "{url} returned HTTP {status}"),
            ProviderError::Decode { what, source } => write!(f, "invalid {what}: {source}"),
            ProviderError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            ProviderError::Unavailable(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http { source, .. } => Some(source),
            ProviderError::Decode { source, .. } => Some(source.as_ref()),
            ProviderError::Io { source, .. } => Some(source),
            ProviderError::Status { .. } | ProviderError::Unavailable(_) => None,
        }
    }
}

impl ProviderError {
    pub fn decode(what: &'static str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ProviderError::Decode {
            what,
            source: Box::new(source),
        }
    }

    /// True for responses that say "not found" rather than "broken".
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => *status == 404,
            ProviderError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::PathBuf;

    use super::ProviderError;

    #[test]
    fn messages_are_human_readable() {
        let e = ProviderError::Status {
            url: "http://localhost:5001/api/trees".into(),
            status: 503,
        };
        assert_eq!(e.to_string(), "http://localhost:5001/api/trees returned HTTP 503");
        assert!(!e.is_not_found());

        let io = ProviderError::Io {
            path: PathBuf::from("/data/grid.geojson"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(io.is_not_found());
        assert!(io.source().is_some());
    }
}
