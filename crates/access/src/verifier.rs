//! Access verification.
//!
//! [`Verifier`] answers one question: may the card presented at a device
//! open it right now? The checks run in a fixed order and stop at the first
//! denial:
//!
//! ```text
//! raw input ──► card number ──► device ──► card ──► window ──► device list ──► Authorized
//!                  │ empty        │ unknown   │ unknown  │ not yet   │ not listed
//!                  ▼              │ inactive  ▼          │ expired   ▼
//!            InvalidCardNumber    ▼     CardUnknown      ▼     CardNotAuthorizedForDevice
//!                          DeviceUnknown /         CardNotYetValid /
//!                          DeviceInactive          CardExpired
//! ```
//!
//! Each call reads the device and card records afresh; nothing is cached and
//! nothing is written.

use chrono::{DateTime, Utc};
use portcullis_storage::CallContext;

use crate::{
    card_number::{self, CardNumberEncoding},
    error::{AccessError, AccessResult},
    outcome::VerificationOutcome,
    repository::{CardRepository, DeviceRepository},
    validity::{self, WindowStatus},
};

/// A card presentation to verify.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct VerificationRequest {
    /// Namespace (organization) the device belongs to. Empty means default.
    #[builder(into, default)]
    pub namespace: String,

    /// Identifier of the device the card was presented at.
    #[builder(into)]
    pub device_id: String,

    /// Raw bytes delivered by the reader.
    #[builder(into)]
    pub raw: Vec<u8>,
}

/// Makes access decisions from stored card and device records.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use portcullis_access::{
///     Card, CardRepository, Device, DeviceRepository, StoreRepository, VerificationOutcome,
///     VerificationRequest, Verifier,
/// };
/// use portcullis_storage::{CallContext, MemoryBackend};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = StoreRepository::new(MemoryBackend::new());
/// let ctx = CallContext::new();
/// let now = Utc::now();
///
/// repo.put_device(&ctx, &Device::builder().id("SN-001").namespace("acme").build()).await?;
/// repo.put_card(
///     &ctx,
///     &Card::builder()
///         .number("12345")
///         .namespace("acme")
///         .devices(vec!["SN-001".into()])
///         .effective_at(now - Duration::hours(1))
///         .invalid_at(now + Duration::hours(1))
///         .build(),
/// )
/// .await?;
///
/// let verifier = Verifier::new(repo);
/// let request =
///     VerificationRequest::builder().namespace("acme").device_id("SN-001").raw(b"12345".to_vec()).build();
/// assert_eq!(verifier.verify(&ctx, &request).await?, VerificationOutcome::Authorized);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Verifier<R> {
    repository: R,
}

impl<R> Verifier<R>
where
    R: CardRepository + DeviceRepository,
{
    /// Creates a verifier reading records from `repository`.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns the repository records are read from.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Verifies `request` against the current UTC time.
    ///
    /// # Errors
    ///
    /// See [`verify_at`](Self::verify_at).
    pub async fn verify(
        &self,
        ctx: &CallContext,
        request: &VerificationRequest,
    ) -> AccessResult<VerificationOutcome> {
        self.verify_at(ctx, request, Utc::now()).await
    }

    /// Verifies `request` as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::InvalidCardNumber`] if the raw input holds no
    /// card number (no storage call is made), [`AccessError::Decode`] for a
    /// malformed stored record, and [`AccessError::Storage`] if the backend
    /// fails, times out, or the context is cancelled.
    #[tracing::instrument(
        skip(self, ctx, request, now),
        fields(namespace = %request.namespace, device_id = %request.device_id)
    )]
    pub async fn verify_at(
        &self,
        ctx: &CallContext,
        request: &VerificationRequest,
        now: DateTime<Utc>,
    ) -> AccessResult<VerificationOutcome> {
        let (number, encoding) = card_number::derive_with_encoding(&request.raw);
        if encoding == CardNumberEncoding::Empty {
            tracing::debug!("rejected presentation without a card number");
            return Err(AccessError::InvalidCardNumber);
        }
        tracing::debug!(card_number = %number, ?encoding, "derived card number");

        let outcome = self.decide(ctx, request, number.as_str(), now).await?;
        tracing::debug!(card_number = %number, %outcome, "access decision");
        Ok(outcome)
    }

    async fn decide(
        &self,
        ctx: &CallContext,
        request: &VerificationRequest,
        number: &str,
        now: DateTime<Utc>,
    ) -> AccessResult<VerificationOutcome> {
        let namespace = request.namespace.as_str();

        let Some(device) = self.repository.get_device(ctx, namespace, &request.device_id).await?
        else {
            return Ok(VerificationOutcome::DeviceUnknown);
        };
        if !device.active {
            return Ok(VerificationOutcome::DeviceInactive);
        }

        let Some(card) = self.repository.get_card(ctx, namespace, number).await? else {
            return Ok(VerificationOutcome::CardUnknown);
        };

        match validity::classify_window(&card, now) {
            WindowStatus::NotYetValid => return Ok(VerificationOutcome::CardNotYetValid),
            WindowStatus::Expired => return Ok(VerificationOutcome::CardExpired),
            WindowStatus::Within => {},
        }

        if !card.has_device(&request.device_id) {
            return Ok(VerificationOutcome::CardNotAuthorizedForDevice);
        }
        Ok(VerificationOutcome::Authorized)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use chrono::TimeDelta;
    use portcullis_storage::MemoryBackend;

    use super::*;
    use crate::{Card, Device, StoreRepository};

    async fn setup(device_active: bool, card: Option<Card>) -> Verifier<StoreRepository<MemoryBackend>> {
        let repo = StoreRepository::new(MemoryBackend::new());
        let ctx = CallContext::new();
        let device = Device::builder().id("SN-001").namespace("acme").active(device_active).build();
        repo.put_device(&ctx, &device).await.expect("put device");
        if let Some(card) = card {
            repo.put_card(&ctx, &card).await.expect("put card");
        }
        Verifier::new(repo)
    }

    fn card(now: DateTime<Utc>) -> Card {
        Card::builder()
            .number("12345")
            .namespace("acme")
            .devices(vec!["SN-001".into()])
            .effective_at(now - TimeDelta::hours(1))
            .invalid_at(now + TimeDelta::hours(1))
            .build()
    }

    fn request(device_id: &str, raw: &[u8]) -> VerificationRequest {
        VerificationRequest::builder().namespace("acme").device_id(device_id).raw(raw.to_vec()).build()
    }

    #[tokio::test]
    async fn test_unknown_device_short_circuits() {
        let now = Utc::now();
        let verifier = setup(true, Some(card(now))).await;
        let outcome = verifier
            .verify_at(&CallContext::new(), &request("SN-404", b"12345"), now)
            .await
            .expect("verify");
        assert_eq!(outcome, VerificationOutcome::DeviceUnknown);
    }

    #[tokio::test]
    async fn test_inactive_device_wins_over_unknown_card() {
        let now = Utc::now();
        let verifier = setup(false, None).await;
        let outcome = verifier
            .verify_at(&CallContext::new(), &request("SN-001", b"12345"), now)
            .await
            .expect("verify");
        assert_eq!(outcome, VerificationOutcome::DeviceInactive);
    }

    #[tokio::test]
    async fn test_card_number_is_canonicalized_before_lookup() {
        let now = Utc::now();
        let mut card = card(now);
        card.number = "ABC-1".into();
        let verifier = setup(true, Some(card)).await;

        let outcome = verifier
            .verify_at(&CallContext::new(), &request("SN-001", b"  abc-1\n"), now)
            .await
            .expect("verify");
        assert_eq!(outcome, VerificationOutcome::Authorized);
    }

    #[tokio::test]
    async fn test_empty_card_number_is_rejected() {
        let verifier = setup(true, None).await;
        // A cancelled context proves no storage call is attempted.
        let ctx = CallContext::new();
        ctx.cancel();

        let err = verifier
            .verify_at(&ctx, &request("SN-001", b" \r\n"), Utc::now())
            .await
            .expect_err("empty card number");
        assert!(matches!(err, AccessError::InvalidCardNumber));
    }

    #[tokio::test]
    async fn test_not_yet_valid() {
        let now = Utc::now();
        let verifier = setup(true, Some(card(now))).await;
        let outcome = verifier
            .verify_at(&CallContext::new(), &request("SN-001", b"12345"), now - TimeDelta::hours(2))
            .await
            .expect("verify");
        assert_eq!(outcome, VerificationOutcome::CardNotYetValid);
    }

    #[tokio::test]
    async fn test_window_is_checked_before_device_list() {
        let now = Utc::now();
        let mut card = card(now);
        card.devices.clear();
        let verifier = setup(true, Some(card)).await;

        let outcome = verifier
            .verify_at(&CallContext::new(), &request("SN-001", b"12345"), now + TimeDelta::hours(3))
            .await
            .expect("verify");
        assert_eq!(outcome, VerificationOutcome::CardExpired);
    }
}
