//! Configuration for the document storage backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default connect and server-selection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

/// Configuration for [`DocumentBackend`](crate::DocumentBackend).
///
/// ```no_run
/// use portcullis_storage_document::DocumentBackendConfig;
///
/// let config = DocumentBackendConfig::builder().uri("mongodb://localhost:27017").build();
/// assert_eq!(config.uri(), "mongodb://localhost:27017");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct DocumentBackendConfig {
    /// Connection string, `mongodb://` or `mongodb+srv://`.
    #[builder(into)]
    pub(crate) uri: String,

    /// Applied as both the driver's connect timeout and its server-selection
    /// timeout.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    pub(crate) connect_timeout: Duration,
}

impl DocumentBackendConfig {
    /// Returns the connection string.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
