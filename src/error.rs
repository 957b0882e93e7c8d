//! Error types for catalog access, the recommendation pipeline and configuration.

use thiserror::Error;

/// Errors raised by the catalog adapter and the credential providers.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog answered with a non-2xx status.
    #[error("catalog responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// No bearer credential could be obtained.
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    /// A batched lookup was called with more identifiers than the catalog accepts.
    #[error("batch of {requested} ids exceeds the limit of {max}")]
    BatchTooLarge { requested: usize, max: usize },
}

impl CatalogError {
    /// HTTP status code carried by the error, if the catalog produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` when the referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors that end a recommendation run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The seed was rejected before any network activity.
    #[error("malformed seed: {0}")]
    MalformedSeed(String),

    /// The seed playlist could not be resolved.
    #[error("cannot resolve seed: {0}")]
    SeedResolution(#[source] CatalogError),

    /// Every album referenced by the seed failed to load.
    #[error("all {albums} albums failed, last error: {last}")]
    AllAlbumsFailed {
        albums: usize,
        #[source]
        last: CatalogError,
    },

    /// The task driving the run ended without producing a result.
    #[error("run aborted: {0}")]
    Aborted(String),
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("cannot prepare configuration directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot load .env file: {0}")]
    Dotenv(#[from] dotenv::Error),
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_exposed_for_http_errors() {
        let err = CatalogError::Status {
            status: 404,
            message: "Resource not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "catalog responded with HTTP 404: Resource not found"
        );
    }

    #[test]
    fn non_http_errors_have_no_status() {
        let err = CatalogError::Credentials("no token".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }

    #[test]
    fn all_albums_failed_reports_last_error() {
        let err = PipelineError::AllAlbumsFailed {
            albums: 2,
            last: CatalogError::Status {
                status: 502,
                message: "Bad gateway".to_string(),
            },
        };
        assert!(err.to_string().contains("all 2 albums failed"));
        assert!(err.to_string().contains("HTTP 502"));
    }
}
