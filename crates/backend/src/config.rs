//! Backend selection configuration.
//!
//! The configuration loader hands over a [`BackendConfig`]; exactly one
//! backend is built from it at startup.
//!
//! ```
//! use portcullis_backend::{BackendConfig, BackendKind};
//!
//! let config: BackendConfig =
//!     serde_json::from_str(r#"{"type": "bolt", "path": "/var/lib/portcullis"}"#).unwrap();
//! assert_eq!(config.kind(), BackendKind::File);
//! ```

use std::{fmt, str::FromStr};

use portcullis_storage_cache::CacheBackendConfig;
use portcullis_storage_document::DocumentBackendConfig;
use portcullis_storage_file::FileBackendConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which storage backend to build, with its settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// In-process map; nothing persists.
    #[default]
    Memory,
    /// One embedded database file per namespace.
    #[serde(alias = "bolt", alias = "redb")]
    File(FileBackendConfig),
    /// Remote cache server.
    #[serde(alias = "redis")]
    Cache(CacheBackendConfig),
    /// Document database.
    #[serde(alias = "mongo", alias = "mongodb")]
    Document(DocumentBackendConfig),
}

impl BackendConfig {
    /// Returns the kind of backend this configuration selects.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Memory => BackendKind::Memory,
            Self::File(_) => BackendKind::File,
            Self::Cache(_) => BackendKind::Cache,
            Self::Document(_) => BackendKind::Document,
        }
    }
}

/// The available backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// [`MemoryBackend`](portcullis_storage::MemoryBackend).
    Memory,
    /// [`FileBackend`](portcullis_storage_file::FileBackend).
    File,
    /// [`CacheBackend`](portcullis_storage_cache::CacheBackend).
    Cache,
    /// [`DocumentBackend`](portcullis_storage_document::DocumentBackend).
    Document,
}

impl BackendKind {
    /// Canonical name, as written in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Cache => "cache",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a backend name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unknown storage backend {0:?} (expected one of: memory, file, bolt, redb, cache, redis, document, mongo, mongodb)"
)]
pub struct UnknownBackendKind(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackendKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" | "bolt" | "redb" => Ok(Self::File),
            "cache" | "redis" => Ok(Self::Cache),
            "document" | "mongo" | "mongodb" => Ok(Self::Document),
            _ => Err(UnknownBackendKind(s.to_owned())),
        }
    }
}
