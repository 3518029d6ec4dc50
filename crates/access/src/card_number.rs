//! Canonical card numbers.
//!
//! Readers deliver the presented card as raw bytes. Most firmware sends the
//! printed card number as ASCII text; some legacy "vguang" readers instead
//! send the card's binary identifier least-significant byte first. The
//! management system stores cards under the printed form, or under the
//! big-endian hex of the binary identifier, so both shapes are normalized
//! here:
//!
//! | Raw input | Canonical number |
//! |-----------|------------------|
//! | `b"abc-123"` | `ABC-123` |
//! | `b"  0042\n"` | `0042` |
//! | `[0x01, 0x02, 0x03]` | `030201` |
//! | `b"   "` | (empty) |

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a canonical number was obtained from the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardNumberEncoding {
    /// Nothing but whitespace was presented.
    Empty,
    /// Printable card number, uppercased.
    Text,
    /// Byte-reversed binary identifier, hex-encoded.
    ReversedHex,
}

/// A normalized card number, the lookup key for [`Card`](crate::Card) records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardNumber(String);

impl CardNumber {
    /// Derives the canonical number from raw reader input.
    #[must_use]
    pub fn derive(raw: &[u8]) -> Self {
        derive_with_encoding(raw).0
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no card number was presented.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the number, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CardNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_card_number_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Derives the canonical number and reports which rule produced it.
///
/// Leading and trailing ASCII whitespace is ignored when deciding whether the
/// input is text. Binary input is reversed as received, whitespace included,
/// since those bytes are part of the identifier.
#[must_use]
pub fn derive_with_encoding(raw: &[u8]) -> (CardNumber, CardNumberEncoding) {
    let trimmed = raw.trim_ascii();
    if trimmed.is_empty() {
        return (CardNumber(String::new()), CardNumberEncoding::Empty);
    }

    if trimmed.iter().copied().all(is_card_number_byte) {
        let text: String = trimmed.iter().map(|b| char::from(b.to_ascii_uppercase())).collect();
        return (CardNumber(text), CardNumberEncoding::Text);
    }

    let reversed: Vec<u8> = raw.iter().rev().copied().collect();
    (CardNumber(hex::encode_upper(reversed)), CardNumberEncoding::ReversedHex)
}
