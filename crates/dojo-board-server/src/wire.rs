// crates/dojo-board-server/src/wire.rs
// ============================================================================
// Module: Wire Types
// Description: Request payloads for the exam HTTP API.
// Purpose: Keep transport encodings separate from the core domain model.
// Dependencies: dojo-board-core, serde, time
// ============================================================================

//! ## Overview
//! Request bodies accept exam dates as RFC 3339 strings and are converted to
//! [`Timestamp::UnixMillis`] at the boundary. Responses serialize the core
//! [`dojo_board_core::Exam`] directly; its wire form is already stable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use dojo_board_core::BeltRank;
use dojo_board_core::Eligibility;
use dojo_board_core::EngineError;
use dojo_board_core::ExamStatus;
use dojo_board_core::Timestamp;
use dojo_board_core::UserId;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

/// Body for `POST /api/exams`.
///
/// # Invariants
/// - `exam_date` is an RFC 3339 timestamp string.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateExamBody {
    /// Display label for the exam.
    pub name: String,
    /// Scheduled exam date as RFC 3339.
    pub exam_date: String,
    /// Belt awarded on a passing result.
    pub target_belt: BeltRank,
    /// Maximum number of registrants.
    pub max_registrants: u32,
    /// Registration eligibility requirements.
    pub eligibility: Eligibility,
}

/// Body for `PATCH /api/exams/{id}/status`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusChangeBody {
    /// Requested lifecycle status.
    pub status: ExamStatus,
}

/// One grading entry in a `POST /api/exams/{id}/results` batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultEntryBody {
    /// Graded student identifier.
    pub student: UserId,
    /// Whether the student passed.
    pub passed: bool,
    /// Free-form instructor notes.
    #[serde(default)]
    pub notes: String,
}

/// Body for `POST /api/exams/{id}/results`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultsBody {
    /// Grading entries, validated as one batch.
    pub results: Vec<ResultEntryBody>,
}

/// Query parameters for `GET /api/exams`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListQuery {
    /// Match exams awarding this target belt.
    pub belt: Option<BeltRank>,
    /// Match exams in this lifecycle status.
    pub status: Option<ExamStatus>,
    /// Match exams owned by this instructor.
    pub instructor: Option<UserId>,
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Parses an RFC 3339 date string into a unix-millisecond timestamp.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when the string is not valid RFC 3339
/// or falls outside the representable millisecond range.
pub fn parse_exam_date(value: &str) -> Result<Timestamp, EngineError> {
    let parsed = OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|_| EngineError::Validation(format!("exam_date is not rfc3339: {value}")))?;
    let millis = parsed.unix_timestamp_nanos() / 1_000_000;
    let millis = i64::try_from(millis)
        .map_err(|_| EngineError::Validation(format!("exam_date out of range: {value}")))?;
    Ok(Timestamp::UnixMillis(millis))
}
