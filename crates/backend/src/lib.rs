//! Storage backend selection for Portcullis.
//!
//! Deserialize a [`BackendConfig`] from the service configuration and call
//! [`Backend::connect`] once at startup. The resulting [`Backend`] implements
//! [`StorageBackend`](portcullis_storage::StorageBackend) and can be handed to
//! the access layer directly.

#![deny(unsafe_code)]

mod backend;
mod config;

pub use backend::Backend;
pub use config::{BackendConfig, BackendKind, UnknownBackendKind};
