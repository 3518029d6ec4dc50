//! Configuration for the cache storage backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::Result, uri::CacheUri};

/// Default time allowed for the initial connection and ping.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

/// Configuration for [`CacheBackend`](crate::CacheBackend).
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use portcullis_storage_cache::CacheBackendConfig;
///
/// let config = CacheBackendConfig::builder()
///     .uri("redis://cache.internal:6379/2")
///     .connect_timeout(Duration::from_secs(2))
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheBackendConfig {
    /// Server URI, `redis://[user[:password]@]host[:port][/db]`.
    pub(crate) uri: String,

    /// Time allowed for the initial connection and ping.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub(crate) connect_timeout: Duration,
}

#[bon::bon]
impl CacheBackendConfig {
    /// Creates a new configuration, validating the URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI does not parse.
    #[builder]
    pub fn new(
        #[builder(into)] uri: String,
        #[builder(default = DEFAULT_CONNECT_TIMEOUT)] connect_timeout: Duration,
    ) -> Result<Self> {
        CacheUri::parse(&uri)?;
        Ok(Self { uri, connect_timeout })
    }

    /// Returns the raw server URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Parses the configured URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is malformed (possible for deserialized configs).
    pub fn parsed_uri(&self) -> Result<CacheUri> {
        CacheUri::parse(&self.uri)
    }
}
