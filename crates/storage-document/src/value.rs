//! Encoding of stored values inside `{key, value}` documents.
//!
//! Values that are valid UTF-8 are stored as BSON strings so the documents stay
//! readable in the shell. Anything else is stored as generic BSON binary so
//! every byte sequence round-trips. Reads accept both.

use mongodb::bson::{Binary, Bson, Document, doc, spec::BinarySubtype};

use crate::error::{DocumentStorageError, Result};

/// Document field holding the key.
pub const KEY_FIELD: &str = "key";

/// Document field holding the value.
pub const VALUE_FIELD: &str = "value";

/// Encodes raw bytes as a BSON value.
#[must_use]
pub fn encode(value: Vec<u8>) -> Bson {
    match String::from_utf8(value) {
        Ok(text) => Bson::String(text),
        Err(err) => {
            Bson::Binary(Binary { subtype: BinarySubtype::Generic, bytes: err.into_bytes() })
        },
    }
}

/// Extracts the value bytes from a stored document.
///
/// # Errors
///
/// Returns [`DocumentStorageError::MalformedDocument`] if the `value` field is
/// missing or has any type other than string or binary.
pub fn decode(key: &str, document: &Document) -> Result<Vec<u8>> {
    let malformed = |reason: String| DocumentStorageError::MalformedDocument {
        key: key.to_owned(),
        reason,
    };
    match document.get(VALUE_FIELD) {
        Some(Bson::String(text)) => Ok(text.as_bytes().to_vec()),
        Some(Bson::Binary(binary)) => Ok(binary.bytes.clone()),
        Some(other) => Err(malformed(format!("unexpected BSON type {:?}", other.element_type()))),
        None => Err(malformed("missing value field".to_owned())),
    }
}

/// Filter selecting the document for `key`.
#[must_use]
pub fn key_filter(key: &str) -> Document {
    doc! { KEY_FIELD: key }
}

/// Update document that upserts `{key, value}`.
#[must_use]
pub fn upsert_update(key: &str, value: Vec<u8>) -> Document {
    doc! { "$set": { KEY_FIELD: key, VALUE_FIELD: encode(value) } }
}
