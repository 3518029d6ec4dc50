//! Namespace normalization.
//!
//! Callers may leave the namespace empty; every backend rewrites it to
//! [`DEFAULT_NAMESPACE`] before touching storage. Non-empty namespaces are
//! passed through untouched, so identifiers stay case-sensitive.

/// Partition used when the caller does not name a namespace.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Maps an empty namespace to [`DEFAULT_NAMESPACE`].
///
/// ```
/// use portcullis_storage::namespace::{DEFAULT_NAMESPACE, normalize};
///
/// assert_eq!(normalize(""), DEFAULT_NAMESPACE);
/// assert_eq!(normalize("Acme"), "Acme");
/// ```
#[must_use]
pub fn normalize(namespace: &str) -> &str {
    if namespace.is_empty() { DEFAULT_NAMESPACE } else { namespace }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_maps_to_default() {
        assert_eq!(normalize(""), normalize(DEFAULT_NAMESPACE));
    }

    #[test]
    fn test_case_is_preserved() {
        assert_eq!(normalize("Tenant-A"), "Tenant-A");
        assert_ne!(normalize("tenant-a"), normalize("Tenant-A"));
    }

    #[test]
    fn test_whitespace_is_not_trimmed() {
        assert_eq!(normalize(" "), " ");
    }

    proptest! {
        #[test]
        fn non_empty_namespaces_pass_through(ns in ".{1,32}") {
            prop_assert_eq!(normalize(&ns), ns.as_str());
        }
    }
}
