// crates/dojo-board-core/src/core/exam.rs
// ============================================================================
// Module: Exam Records
// Description: Exam lifecycle state, eligibility requirements, and results.
// Purpose: Capture the belt-promotion exam record and its invariants.
// Dependencies: crate::core::{belt, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! An exam is created by an instructor, mutated by student registrations and
//! instructor grading, and becomes immutable once completed. Status
//! transitions are monotonic: `upcoming → ongoing → completed`. The record
//! itself only answers structural queries; all precondition enforcement
//! lives in the engine runtime so every mutation passes through the
//! optimistic-concurrency save path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::belt::BeltRank;
use crate::core::identifiers::ExamId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Exam Status
// ============================================================================

/// Exam lifecycle status.
///
/// # Invariants
/// - Variants are stable for serialization and filter matching.
/// - Transitions are monotonic; see [`ExamStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    /// Exam is scheduled and open for registration.
    Upcoming,
    /// Exam is in progress; grading may be submitted.
    Ongoing,
    /// Exam is finalized and immutable (terminal).
    Completed,
}

impl ExamStatus {
    /// Returns the stable lowercase label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }

    /// Reports whether the monotonic state machine permits `next`.
    ///
    /// Only `upcoming → ongoing` and `ongoing → completed` are legal; no-op
    /// transitions, stage skips, and reversals are all rejected.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Upcoming, Self::Ongoing) | (Self::Ongoing, Self::Completed)
        )
    }
}

impl std::fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Eligibility
// ============================================================================

/// Registration eligibility requirements for an exam.
///
/// # Invariants
/// - `minimum_training_months` is unsigned; negative durations are
///   unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Minimum belt rank required to register.
    pub minimum_belt: BeltRank,
    /// Minimum whole months of training required to register.
    pub minimum_training_months: u32,
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Recorded grading outcome for a single registrant.
///
/// # Invariants
/// - A `passed` result promotes the student to the exam's target belt; the
///   directory write is performed by the engine's caller, never the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResult {
    /// Whether the student passed the exam.
    pub passed: bool,
    /// Free-form instructor notes for the student.
    pub notes: String,
}

// ============================================================================
// SECTION: Exam Record
// ============================================================================

/// Belt-promotion exam record.
///
/// # Invariants
/// - `registrants` contains each student at most once.
/// - `registrants.len() <= max_registrants` at all times.
/// - `results` keys are a subset of `registrants`.
/// - Once `status` is `Completed`, registrants and results never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    /// Exam identifier.
    pub exam_id: ExamId,
    /// Display label for the exam.
    pub name: String,
    /// Owning instructor identifier (foreign reference; not owned).
    pub instructor_id: UserId,
    /// Scheduled exam date and time.
    pub exam_date: Timestamp,
    /// Belt awarded on a passing result.
    pub target_belt: BeltRank,
    /// Maximum number of registrants (always >= 1).
    pub max_registrants: u32,
    /// Registration eligibility requirements.
    pub eligibility: Eligibility,
    /// Lifecycle status.
    pub status: ExamStatus,
    /// Registered students in registration order.
    pub registrants: Vec<UserId>,
    /// Recorded results keyed by student identifier.
    pub results: BTreeMap<UserId, ExamResult>,
    /// Timestamp when the exam was created.
    pub created_at: Timestamp,
}

impl Exam {
    /// Reports whether the student is currently registered.
    #[must_use]
    pub fn is_registered(&self, student_id: &UserId) -> bool {
        self.registrants.contains(student_id)
    }

    /// Reports whether the exam has reached its registration capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.registrants.len() >= self.max_registrants as usize
    }

    /// Returns registrants with no recorded result, in registration order.
    ///
    /// Callers use this to warn before finalizing an exam; completion itself
    /// does not require full coverage.
    #[must_use]
    pub fn registrants_without_results(&self) -> Vec<UserId> {
        self.registrants
            .iter()
            .filter(|student| !self.results.contains_key(*student))
            .cloned()
            .collect()
    }
}

// ============================================================================
// SECTION: Exam Filter
// ============================================================================

/// Filter criteria for exam listings.
///
/// # Invariants
/// - Supplied criteria combine with logical AND; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamFilter {
    /// Match exams awarding this target belt.
    pub target_belt: Option<BeltRank>,
    /// Match exams in this lifecycle status.
    pub status: Option<ExamStatus>,
    /// Match exams owned by this instructor.
    pub instructor: Option<UserId>,
}

impl ExamFilter {
    /// Reports whether the exam matches all supplied criteria.
    #[must_use]
    pub fn matches(&self, exam: &Exam) -> bool {
        self.target_belt.is_none_or(|belt| exam.target_belt == belt)
            && self.status.is_none_or(|status| exam.status == status)
            && self.instructor.as_ref().is_none_or(|id| exam.instructor_id == *id)
    }
}
