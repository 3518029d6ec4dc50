//! Card access verification for Portcullis.
//!
//! This crate decides whether a card presented at a reader may open it. It
//! reads [`Card`] and [`Device`] records through a repository over any
//! [`StorageBackend`](portcullis_storage::StorageBackend) and combines three
//! pure checks:
//!
//! - [`card_number`]: normalizes raw reader input into the canonical card number,
//!   including byte-reversed binary identifiers from legacy readers
//! - [`validity`]: the card's time window, tolerant to 60 seconds of clock skew
//! - [`authorization`]: membership of the device in the card's device list
//!
//! [`Verifier`] composes them and returns a [`VerificationOutcome`]. Denials are
//! outcomes; only failures to reach a decision are [`AccessError`]s.

#![deny(unsafe_code)]

pub mod authorization;
mod card;
pub mod card_number;
mod device;
mod error;
mod outcome;
pub mod repository;
pub mod validity;
mod verifier;

pub use card::Card;
pub use card_number::{CardNumber, CardNumberEncoding};
pub use device::Device;
pub use error::{AccessError, AccessResult};
pub use outcome::VerificationOutcome;
pub use repository::{CardRepository, DeviceRepository, StoreRepository};
pub use validity::{CLOCK_SKEW_TOLERANCE, WindowStatus};
pub use verifier::{VerificationRequest, Verifier};
