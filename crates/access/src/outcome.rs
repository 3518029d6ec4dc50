//! Verification outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of verifying a presented card at a device.
///
/// Every variant other than [`Authorized`](Self::Authorized) is a denial.
/// Outcomes are produced per call and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// The card may open the device.
    Authorized,
    /// No device with the given identifier exists in the namespace.
    DeviceUnknown,
    /// The device exists but is deactivated.
    DeviceInactive,
    /// No card with the derived number exists in the namespace.
    CardUnknown,
    /// The card's validity window has not started yet.
    CardNotYetValid,
    /// The card's validity window has ended.
    CardExpired,
    /// The card is valid but not for this device.
    CardNotAuthorizedForDevice,
}

impl VerificationOutcome {
    /// Returns `true` only for [`Authorized`](Self::Authorized).
    #[must_use]
    pub fn is_authorized(self) -> bool {
        self == Self::Authorized
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::DeviceUnknown => "device_unknown",
            Self::DeviceInactive => "device_inactive",
            Self::CardUnknown => "card_unknown",
            Self::CardNotYetValid => "card_not_yet_valid",
            Self::CardExpired => "card_expired",
            Self::CardNotAuthorizedForDevice => "card_not_authorized_for_device",
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
