//! Device-authorization checks.

/// Returns `true` if `device_id` appears in `devices`.
///
/// Matching is exact and case-sensitive. An empty list authorizes no device.
#[must_use]
pub fn has_device(devices: &[String], device_id: &str) -> bool {
    devices.iter().any(|device| device == device_id)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_list_denies() {
        assert!(!has_device(&[], "SN-001"));
        assert!(!has_device(&[], ""));
    }

    #[test]
    fn test_exact_match() {
        let devices = vec!["SN-001".to_owned(), "SN-002".to_owned()];
        assert!(has_device(&devices, "SN-002"));
        assert!(!has_device(&devices, "sn-002"));
        assert!(!has_device(&devices, "SN-00"));
        assert!(!has_device(&devices, " SN-001"));
    }

    proptest! {
        #[test]
        fn membership_matches_contains(
            devices in proptest::collection::vec("[A-Za-z0-9-]{1,8}", 0..8),
            query in "[A-Za-z0-9-]{1,8}",
        ) {
            prop_assert_eq!(has_device(&devices, &query), devices.contains(&query));
        }
    }
}
