//! Configuration for the file storage backend.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for [`FileBackend`](crate::FileBackend).
///
/// Every namespace is stored in its own file `<path>/<namespace>.redb`. The
/// directory is created on open if it does not already exist.
///
/// # Example
///
/// ```no_run
/// use portcullis_storage_file::FileBackendConfig;
///
/// let config = FileBackendConfig::builder().path("/var/lib/portcullis").build();
/// assert_eq!(config.path().to_str(), Some("/var/lib/portcullis"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct FileBackendConfig {
    /// Directory holding one database file per namespace.
    #[builder(into)]
    pub(crate) path: PathBuf,
}

impl FileBackendConfig {
    /// Shorthand for a configuration rooted at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
