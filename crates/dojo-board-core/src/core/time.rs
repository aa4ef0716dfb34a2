// crates/dojo-board-core/src/core/time.rs
// ============================================================================
// Module: Dojo Board Time Model
// Description: Canonical timestamp representations for exams and accounts.
// Purpose: Provide deterministic, replayable time values across exam records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Dojo Board uses explicit time values embedded in exam records and engine
//! calls to keep behavior deterministic. The core engine never reads
//! wall-clock time directly; hosts must supply timestamps with every
//! time-sensitive operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Milliseconds per 30-day training month used by [`elapsed_months`].
const MILLIS_PER_TRAINING_MONTH: i64 = 30 * 24 * 60 * 60 * 1_000;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in exam records and engine calls.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }
}

// ============================================================================
// SECTION: Training Duration
// ============================================================================

/// Computes whole training months elapsed between two timestamps.
///
/// Unix timestamps count 30-day months; logical timestamps treat the tick
/// delta itself as whole months so deterministic tests need no clock
/// arithmetic. Returns `None` when the kinds differ or `now` precedes
/// `start`.
#[must_use]
pub const fn elapsed_months(start: Timestamp, now: Timestamp) -> Option<u64> {
    match (start, now) {
        (Timestamp::UnixMillis(started), Timestamp::UnixMillis(current)) => {
            if current < started {
                None
            } else {
                #[allow(
                    clippy::cast_sign_loss,
                    reason = "The difference is non-negative on this branch."
                )]
                Some(((current - started) / MILLIS_PER_TRAINING_MONTH) as u64)
            }
        }
        (Timestamp::Logical(started), Timestamp::Logical(current)) => {
            if current < started {
                None
            } else {
                Some(current - started)
            }
        }
        (Timestamp::UnixMillis(_), Timestamp::Logical(_))
        | (Timestamp::Logical(_), Timestamp::UnixMillis(_)) => None,
    }
}
