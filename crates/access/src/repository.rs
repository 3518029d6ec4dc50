//! Card and device persistence.
//!
//! Records are stored as JSON documents through any [`StorageBackend`]:
//!
//! | Record | Collection | Key |
//! |--------|------------|-----|
//! | [`Card`] | [`CARDS_COLLECTION`] | canonical card number |
//! | [`Device`] | [`DEVICES_COLLECTION`] | device identifier |
//!
//! The namespace of a record is the namespace it is written into; an empty
//! namespace resolves to the default one. Every call runs under a
//! [`CallContext`] so deadlines and cancellation reach the backend.
//!
//! # Usage
//!
//! ```
//! use chrono::{Duration, Utc};
//! use portcullis_access::{Card, CardRepository, StoreRepository};
//! use portcullis_storage::{CallContext, MemoryBackend};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = StoreRepository::new(MemoryBackend::new());
//! let ctx = CallContext::new();
//!
//! let card = Card::builder()
//!     .number("12345")
//!     .namespace("acme")
//!     .effective_at(Utc::now())
//!     .invalid_at(Utc::now() + Duration::days(1))
//!     .build();
//! repo.put_card(&ctx, &card).await?;
//!
//! assert_eq!(repo.get_card(&ctx, "acme", "12345").await?, Some(card));
//! assert_eq!(repo.get_card(&ctx, "acme", "99999").await?, None);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use portcullis_storage::{CallContext, StorageBackend, StorageError};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    card::Card,
    device::Device,
    error::{AccessError, AccessResult},
};

/// Collection holding card records.
pub const CARDS_COLLECTION: &str = "cards";

/// Collection holding device records.
pub const DEVICES_COLLECTION: &str = "devices";

/// Read and write access to card records.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Fetches the card stored under `number`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Decode`] for a malformed record and
    /// [`AccessError::Storage`] for backend failures.
    async fn get_card(
        &self,
        ctx: &CallContext,
        namespace: &str,
        number: &str,
    ) -> AccessResult<Option<Card>>;

    /// Stores `card` under its number in its namespace, replacing any
    /// existing record.
    async fn put_card(&self, ctx: &CallContext, card: &Card) -> AccessResult<()>;

    /// Removes the card stored under `number`.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` storage error if no such card exists.
    async fn delete_card(&self, ctx: &CallContext, namespace: &str, number: &str)
    -> AccessResult<()>;
}

/// Read and write access to device records.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Fetches the device `id`, or `None` if there is none.
    async fn get_device(
        &self,
        ctx: &CallContext,
        namespace: &str,
        id: &str,
    ) -> AccessResult<Option<Device>>;

    /// Stores `device` in its namespace, replacing any existing record.
    async fn put_device(&self, ctx: &CallContext, device: &Device) -> AccessResult<()>;

    /// Removes the device `id`.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` storage error if no such device exists.
    async fn delete_device(&self, ctx: &CallContext, namespace: &str, id: &str)
    -> AccessResult<()>;
}

/// Repository backed by a [`StorageBackend`], storing records as JSON.
#[derive(Debug, Clone)]
pub struct StoreRepository<S> {
    store: S,
}

impl<S: StorageBackend> StoreRepository<S> {
    /// Creates a repository over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        namespace: &str,
        collection: &'static str,
        key: &str,
    ) -> AccessResult<Option<T>> {
        let bytes = match ctx.run(self.store.get(namespace, collection, key)).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| AccessError::Decode { collection, key: key.to_owned(), source })
    }

    async fn write<T: Serialize + Sync>(
        &self,
        ctx: &CallContext,
        namespace: &str,
        collection: &'static str,
        key: &str,
        record: &T,
    ) -> AccessResult<()> {
        let value = serde_json::to_vec(record)
            .map_err(|source| AccessError::Encode { collection, key: key.to_owned(), source })?;
        ctx.run(self.store.set(namespace, collection, key, value)).await?;
        Ok(())
    }

    async fn remove(
        &self,
        ctx: &CallContext,
        namespace: &str,
        collection: &'static str,
        key: &str,
    ) -> AccessResult<()> {
        ctx.run(self.store.delete(namespace, collection, key)).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: StorageBackend> CardRepository for StoreRepository<S> {
    #[tracing::instrument(skip(self, ctx))]
    async fn get_card(
        &self,
        ctx: &CallContext,
        namespace: &str,
        number: &str,
    ) -> AccessResult<Option<Card>> {
        self.read(ctx, namespace, CARDS_COLLECTION, number).await
    }

    #[tracing::instrument(skip(self, ctx, card), fields(namespace = %card.namespace, number = %card.number))]
    async fn put_card(&self, ctx: &CallContext, card: &Card) -> AccessResult<()> {
        self.write(ctx, &card.namespace, CARDS_COLLECTION, &card.number, card).await
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn delete_card(
        &self,
        ctx: &CallContext,
        namespace: &str,
        number: &str,
    ) -> AccessResult<()> {
        self.remove(ctx, namespace, CARDS_COLLECTION, number).await
    }
}

#[async_trait]
impl<S: StorageBackend> DeviceRepository for StoreRepository<S> {
    #[tracing::instrument(skip(self, ctx))]
    async fn get_device(
        &self,
        ctx: &CallContext,
        namespace: &str,
        id: &str,
    ) -> AccessResult<Option<Device>> {
        self.read(ctx, namespace, DEVICES_COLLECTION, id).await
    }

    #[tracing::instrument(skip(self, ctx, device), fields(namespace = %device.namespace, id = %device.id))]
    async fn put_device(&self, ctx: &CallContext, device: &Device) -> AccessResult<()> {
        self.write(ctx, &device.namespace, DEVICES_COLLECTION, &device.id, device).await
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn delete_device(&self, ctx: &CallContext, namespace: &str, id: &str) -> AccessResult<()> {
        self.remove(ctx, namespace, DEVICES_COLLECTION, id).await
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};
    use portcullis_storage::MemoryBackend;

    use super::*;

    fn card(number: &str, namespace: &str) -> Card {
        Card::builder()
            .number(number)
            .namespace(namespace)
            .devices(vec!["SN-001".into()])
            .effective_at(Utc::now())
            .invalid_at(Utc::now() + TimeDelta::hours(1))
            .build()
    }

    #[tokio::test]
    async fn test_card_lifecycle() {
        let repo = StoreRepository::new(MemoryBackend::new());
        let ctx = CallContext::new();
        let card = card("12345", "acme");

        repo.put_card(&ctx, &card).await.expect("put");
        assert_eq!(repo.get_card(&ctx, "acme", "12345").await.expect("get"), Some(card));

        repo.delete_card(&ctx, "acme", "12345").await.expect("delete");
        assert_eq!(repo.get_card(&ctx, "acme", "12345").await.expect("get"), None);

        let err = repo.delete_card(&ctx, "acme", "12345").await.expect_err("already gone");
        assert!(matches!(err, AccessError::Storage(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_cards_are_scoped_by_namespace() {
        let repo = StoreRepository::new(MemoryBackend::new());
        let ctx = CallContext::new();
        repo.put_card(&ctx, &card("12345", "acme")).await.expect("put");

        assert!(repo.get_card(&ctx, "globex", "12345").await.expect("get").is_none());
        assert!(repo.get_device(&ctx, "acme", "12345").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_empty_namespace_record_is_found_in_default() {
        let repo = StoreRepository::new(MemoryBackend::new());
        let ctx = CallContext::new();
        repo.put_card(&ctx, &card("777", "")).await.expect("put");

        assert!(repo.get_card(&ctx, "default", "777").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_device_lifecycle() {
        let repo = StoreRepository::new(MemoryBackend::new());
        let ctx = CallContext::new();
        let device = Device::builder().id("SN-001").namespace("acme").build();

        repo.put_device(&ctx, &device).await.expect("put");
        assert_eq!(repo.get_device(&ctx, "acme", "SN-001").await.expect("get"), Some(device));
        repo.delete_device(&ctx, "acme", "SN-001").await.expect("delete");
        assert!(repo.get_device(&ctx, "acme", "SN-001").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_malformed_record_is_decode_error() {
        let backend = MemoryBackend::new();
        backend.set("acme", CARDS_COLLECTION, "12345", b"not json".to_vec()).await.expect("set");
        let repo = StoreRepository::new(backend);

        let err = repo
            .get_card(&CallContext::new(), "acme", "12345")
            .await
            .expect_err("malformed");
        assert!(
            matches!(err, AccessError::Decode { collection: CARDS_COLLECTION, ref key, .. } if key == "12345")
        );
    }

    #[tokio::test]
    async fn test_cancelled_context_fails_before_reading() {
        let repo = StoreRepository::new(MemoryBackend::new());
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        ctx.cancel();

        let err = repo.get_device(&ctx, "acme", "SN-001").await.expect_err("cancelled");
        assert!(matches!(err, AccessError::Storage(StorageError::Cancelled)));
    }
}
