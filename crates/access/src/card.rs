//! Card records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{authorization, validity};

/// An access card as stored by the management system.
///
/// Cards are written out-of-band by administrative tooling and are read-only
/// to verification. A card is keyed by its canonical number within its
/// namespace.
///
/// # Validity
///
/// A card opens a device only while the reference time falls inside
/// `[effective_at, invalid_at]` widened by
/// [`CLOCK_SKEW_TOLERANCE`](crate::validity::CLOCK_SKEW_TOLERANCE) on both
/// ends, and only for devices named in `devices`. An empty device list
/// authorizes nothing.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use portcullis_access::Card;
///
/// let now = Utc::now();
/// let card = Card::builder()
///     .number("12345")
///     .namespace("acme")
///     .devices(vec!["SN-001".into(), "SN-002".into()])
///     .effective_at(now - Duration::hours(1))
///     .invalid_at(now + Duration::days(30))
///     .holder("Ada Lovelace")
///     .build();
///
/// assert!(card.is_valid_at(now));
/// assert!(card.has_device("SN-001"));
/// assert!(!card.has_device("sn-001"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct Card {
    /// Canonical card number; the record's storage key.
    #[builder(into)]
    pub number: String,

    /// Namespace (organization) the card belongs to.
    #[builder(into, default)]
    #[serde(default)]
    pub namespace: String,

    /// Identifiers of the devices this card may open.
    #[builder(default)]
    #[serde(default)]
    pub devices: Vec<String>,

    /// Start of the validity window.
    pub effective_at: DateTime<Utc>,

    /// End of the validity window.
    pub invalid_at: DateTime<Utc>,

    /// Label shown in management tooling.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Person the card is issued to.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,

    /// Free-form administrative note.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// When the record was created.
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,

    /// When the record was last modified.
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Returns `true` if the card is inside its tolerant validity window at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        validity::is_valid(self, now)
    }

    /// Returns `true` if `device_id` is on the card's authorized-device list.
    #[must_use]
    pub fn has_device(&self, device_id: &str) -> bool {
        authorization::has_device(&self.devices, device_id)
    }
}
