// crates/dojo-board-server/src/telemetry.rs
// ============================================================================
// Module: Telemetry
// Description: Request metrics hooks for the exam API.
// Purpose: Let deployments observe request outcomes without coupling the
//          server to a metrics backend.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The server records one observation per handled request through
//! [`ApiMetrics`]. The default [`NoopMetrics`] sink discards observations so
//! embedders without a metrics pipeline pay nothing. Labels are static route
//! and outcome names; metric values never include identifiers or tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Debug;
use std::time::Duration;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Route label for a handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiRoute {
    /// `POST /api/exams`
    CreateExam,
    /// `GET /api/exams`
    ListExams,
    /// `GET /api/exams/{id}`
    GetExam,
    /// `POST /api/exams/{id}/register`
    RegisterStudent,
    /// `PATCH /api/exams/{id}/status`
    ChangeStatus,
    /// `POST /api/exams/{id}/results`
    SubmitResults,
    /// `DELETE /api/exams/{id}`
    DeleteExam,
    /// `GET /api/exams/{id}/missing-results`
    MissingResults,
    /// `GET /api/exams/student/{id}/results`
    StudentResults,
}

impl ApiRoute {
    /// Returns the stable label for this route.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateExam => "create_exam",
            Self::ListExams => "list_exams",
            Self::GetExam => "get_exam",
            Self::RegisterStudent => "register_student",
            Self::ChangeStatus => "change_status",
            Self::SubmitResults => "submit_results",
            Self::DeleteExam => "delete_exam",
            Self::MissingResults => "missing_results",
            Self::StudentResults => "student_results",
        }
    }
}

/// Outcome label for a handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOutcome {
    /// The handler returned a success status.
    Ok,
    /// The handler returned an error status.
    Error,
}

impl ApiOutcome {
    /// Returns the stable label for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

// ============================================================================
// SECTION: Metrics Sink
// ============================================================================

/// Metrics sink for handled API requests.
///
/// Implementations must be cheap and non-blocking; they run on the request
/// path.
pub trait ApiMetrics: Debug + Send + Sync {
    /// Records one handled request with its route, outcome, and latency.
    fn record_request(&self, route: ApiRoute, outcome: ApiOutcome, latency: Duration);
}

/// Metrics sink that discards every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl ApiMetrics for NoopMetrics {
    fn record_request(&self, _route: ApiRoute, _outcome: ApiOutcome, _latency: Duration) {}
}
