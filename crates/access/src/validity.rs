//! Time-window validity of cards.
//!
//! Card windows are set by the management system while readers run on their
//! own clocks. Both ends of the window are widened by
//! [`CLOCK_SKEW_TOLERANCE`] so modest drift between the two never flips a
//! decision:
//!
//! ```text
//!        effective_at                         invalid_at
//!   ──────────┬──────────────────────────────────┬──────────
//!     -60s ◄──┤            valid                 ├──► +60s
//! ```
//!
//! The widened bounds are exclusive: a reference time exactly 60s before
//! `effective_at` or exactly 60s after `invalid_at` is outside the window.

use chrono::{DateTime, TimeDelta, Utc};

use crate::card::Card;

/// Slack applied to both ends of a card's validity window.
pub const CLOCK_SKEW_TOLERANCE: TimeDelta = TimeDelta::seconds(60);

/// Where a reference time falls relative to a card's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowStatus {
    /// Inside the tolerant window.
    Within,
    /// Before the tolerant start of the window.
    NotYetValid,
    /// At or past the tolerant end of the window.
    Expired,
}

/// Classifies `now` against the card's tolerant window.
///
/// A card whose window is inverted (`invalid_at` before `effective_at`) can
/// never be `Within`; the not-yet-valid check runs first.
#[must_use]
pub fn classify_window(card: &Card, now: DateTime<Utc>) -> WindowStatus {
    if now <= card.effective_at - CLOCK_SKEW_TOLERANCE {
        WindowStatus::NotYetValid
    } else if now >= card.invalid_at + CLOCK_SKEW_TOLERANCE {
        WindowStatus::Expired
    } else {
        WindowStatus::Within
    }
}

/// Returns `true` if `now > effective_at - 60s` and `now < invalid_at + 60s`.
#[must_use]
pub fn is_valid(card: &Card, now: DateTime<Utc>) -> bool {
    classify_window(card, now) == WindowStatus::Within
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).single().expect("valid date")
    }

    /// Card valid from T to T+1h.
    fn card() -> Card {
        Card::builder()
            .number("12345")
            .effective_at(t0())
            .invalid_at(t0() + Duration::seconds(3600))
            .build()
    }

    #[test]
    fn test_lower_boundary_tolerance() {
        let card = card();
        assert!(is_valid(&card, t0() - Duration::seconds(59)));
        assert!(!is_valid(&card, t0() - Duration::seconds(60)));
        assert!(!is_valid(&card, t0() - Duration::seconds(61)));
    }

    #[test]
    fn test_upper_boundary_tolerance() {
        let card = card();
        assert!(is_valid(&card, t0() + Duration::seconds(3659)));
        assert!(!is_valid(&card, t0() + Duration::seconds(3660)));
        assert!(!is_valid(&card, t0() + Duration::seconds(3661)));
        assert!(!is_valid(&card, t0() + Duration::seconds(3660 + 61)));
    }

    #[test]
    fn test_exact_window_edges_are_valid() {
        let card = card();
        assert!(is_valid(&card, t0()));
        assert!(is_valid(&card, t0() + Duration::seconds(3600)));
    }

    #[test]
    fn test_classify() {
        let card = card();
        assert_eq!(classify_window(&card, t0() - Duration::hours(1)), WindowStatus::NotYetValid);
        assert_eq!(classify_window(&card, t0() + Duration::minutes(30)), WindowStatus::Within);
        assert_eq!(classify_window(&card, t0() + Duration::hours(2)), WindowStatus::Expired);
    }

    #[test]
    fn test_inverted_window_prefers_not_yet_valid() {
        let card = Card::builder()
            .number("x")
            .effective_at(t0() + Duration::hours(2))
            .invalid_at(t0())
            .build();
        assert_eq!(classify_window(&card, t0() + Duration::hours(1)), WindowStatus::NotYetValid);
        assert_eq!(classify_window(&card, t0() + Duration::hours(3)), WindowStatus::Expired);
    }

    proptest! {
        #[test]
        fn is_valid_matches_formula(offset in -10_000i64..10_000, length in 0i64..7_200) {
            let card = Card::builder()
                .number("p")
                .effective_at(t0())
                .invalid_at(t0() + Duration::seconds(length))
                .build();
            let now = t0() + Duration::seconds(offset);
            let expected = now > card.effective_at - Duration::seconds(60)
                && now < card.invalid_at + Duration::seconds(60);
            prop_assert_eq!(is_valid(&card, now), expected);
            // Repeated evaluation is stable.
            prop_assert_eq!(is_valid(&card, now), is_valid(&card, now));
        }
    }
}
