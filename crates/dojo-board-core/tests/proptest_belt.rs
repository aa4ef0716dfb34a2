// crates/dojo-board-core/tests/proptest_belt.rs
// ============================================================================
// Module: Belt Order Property-Based Tests
// Description: Property tests for belt ordering, parsing, and durations.
// Purpose: Detect ordering and parsing regressions across all rank pairs.
// ============================================================================

//! Property-based tests for belt rank and training duration invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::str::FromStr;

use dojo_board_core::BeltRank;
use dojo_board_core::Timestamp;
use dojo_board_core::elapsed_months;
use proptest::prelude::*;

fn rank_strategy() -> impl Strategy<Value = BeltRank> {
    prop::sample::select(BeltRank::ALL.to_vec())
}

proptest! {
    #[test]
    fn rank_order_matches_declaration_order(a in rank_strategy(), b in rank_strategy()) {
        let index_of = |rank: BeltRank| {
            BeltRank::ALL.iter().position(|candidate| *candidate == rank).unwrap()
        };
        prop_assert_eq!(a.cmp(&b), index_of(a).cmp(&index_of(b)));
    }

    #[test]
    fn rank_labels_round_trip(rank in rank_strategy()) {
        let parsed = BeltRank::from_str(rank.as_str()).unwrap();
        prop_assert_eq!(parsed, rank);
    }

    #[test]
    fn next_rank_is_the_immediate_successor(rank in rank_strategy()) {
        let index = BeltRank::ALL.iter().position(|candidate| *candidate == rank).unwrap();
        match rank.next() {
            Some(next) => prop_assert_eq!(next, BeltRank::ALL[index + 1]),
            None => prop_assert_eq!(rank, BeltRank::Black),
        }
    }

    #[test]
    fn unknown_labels_are_rejected(label in "[a-z]{1,12}") {
        let known = BeltRank::ALL.iter().any(|rank| rank.as_str() == label);
        prop_assert_eq!(BeltRank::from_str(&label).is_ok(), known);
    }

    #[test]
    fn logical_elapsed_months_is_the_tick_delta(start in 0_u64..1_000_000, delta in 0_u64..1_000_000) {
        let months = elapsed_months(
            Timestamp::Logical(start),
            Timestamp::Logical(start + delta),
        );
        prop_assert_eq!(months, Some(delta));
    }

    #[test]
    fn elapsed_months_is_none_backwards_or_across_kinds(start in 1_u64..1_000_000, back in 1_u64..1_000) {
        let earlier = start.saturating_sub(back);
        prop_assert_eq!(
            elapsed_months(Timestamp::Logical(start), Timestamp::Logical(earlier)),
            None
        );
        #[allow(
            clippy::cast_possible_wrap,
            reason = "Bounded test values never wrap."
        )]
        let unix = Timestamp::UnixMillis(start as i64);
        prop_assert_eq!(elapsed_months(unix, Timestamp::Logical(start)), None);
        prop_assert_eq!(elapsed_months(Timestamp::Logical(start), unix), None);
    }

    #[test]
    fn unix_elapsed_months_is_monotonic_in_now(start in 0_i64..1_000_000_000, a in 0_i64..10_000_000_000, b in 0_i64..10_000_000_000) {
        let first = elapsed_months(
            Timestamp::UnixMillis(start),
            Timestamp::UnixMillis(start + a.min(b)),
        )
        .unwrap();
        let second = elapsed_months(
            Timestamp::UnixMillis(start),
            Timestamp::UnixMillis(start + a.max(b)),
        )
        .unwrap();
        prop_assert!(first <= second);
    }
}

#[test]
fn thirty_days_is_one_training_month() {
    let month_millis = 30 * 24 * 60 * 60 * 1_000_i64;
    assert_eq!(
        elapsed_months(Timestamp::UnixMillis(0), Timestamp::UnixMillis(month_millis - 1)),
        Some(0)
    );
    assert_eq!(
        elapsed_months(Timestamp::UnixMillis(0), Timestamp::UnixMillis(month_millis)),
        Some(1)
    );
}
