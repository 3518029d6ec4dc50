//! Device (reader) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card reader installed at an access point.
///
/// Only active devices can authorize a card. Deactivation is reversible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct Device {
    /// Device identifier, usually the reader's serial number.
    #[builder(into)]
    pub id: String,

    /// Namespace (organization) the device belongs to.
    #[builder(into, default)]
    #[serde(default)]
    pub namespace: String,

    /// Human-readable location or label.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the device currently accepts cards.
    #[builder(default = true)]
    #[serde(default = "default_active")]
    pub active: bool,

    /// When the record was created.
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,

    /// When the record was last modified.
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_active() {
        let device = Device::builder().id("SN-001").build();
        assert!(device.active);
        assert!(device.name.is_none());
    }

    #[test]
    fn test_deserialize_without_active_defaults_true() {
        let device: Device = serde_json::from_str(
            r#"{"id": "SN-001", "created_at": "2024-03-01T12:00:00Z", "updated_at": "2024-03-01T12:00:00Z"}"#,
        )
        .expect("deserialize");
        assert!(device.active);
    }

    #[test]
    fn test_inactive_roundtrip() {
        let device = Device::builder().id("SN-002").namespace("acme").active(false).build();
        let json = serde_json::to_vec(&device).expect("serialize");
        let decoded: Device = serde_json::from_slice(&json).expect("deserialize");
        assert_eq!(decoded, device);
        assert!(!decoded.active);
    }
}
