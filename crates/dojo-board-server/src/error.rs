// crates/dojo-board-server/src/error.rs
// ============================================================================
// Module: API Errors
// Description: Transport-level error mapping for engine and auth failures.
// Purpose: Map typed engine errors onto stable HTTP statuses and bodies.
// Dependencies: axum, dojo-board-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every handler failure flows through [`ApiError`], which maps the engine's
//! typed errors onto HTTP statuses without string matching and renders a
//! stable JSON body of the form `{ "error": kind, "message": ... }`.
//! Messages never embed tokens or raw payloads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::IntoResponse;
use axum::response::Response;
use dojo_board_core::EngineError;
use serde::Serialize;

// ============================================================================
// SECTION: Wire Body
// ============================================================================

/// JSON error body returned for every failed request.
///
/// # Invariants
/// - `error` is a stable machine-readable kind label.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error kind label.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
}

// ============================================================================
// SECTION: API Error
// ============================================================================

/// Transport-level error for the exam API.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unknown bearer token.
    Unauthorized,
    /// Engine rejected the operation.
    Engine(EngineError),
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self::Engine(error)
    }
}

/// Returns the status and kind label for an engine error.
const fn classify_engine_error(error: &EngineError) -> (StatusCode, &'static str) {
    match error {
        EngineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        EngineError::Authorization(_) => (StatusCode::FORBIDDEN, "authorization"),
        EngineError::Eligibility {
            ..
        } => (StatusCode::FORBIDDEN, "eligibility"),
        EngineError::ExamNotFound(_) => (StatusCode::NOT_FOUND, "exam_not_found"),
        EngineError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "account_not_found"),
        EngineError::InvalidState {
            ..
        } => (StatusCode::CONFLICT, "invalid_state"),
        EngineError::InvalidTransition {
            ..
        } => (StatusCode::CONFLICT, "invalid_transition"),
        EngineError::Capacity {
            ..
        } => (StatusCode::CONFLICT, "capacity"),
        EngineError::AlreadyRegistered {
            ..
        } => (StatusCode::CONFLICT, "already_registered"),
        EngineError::Contention {
            ..
        } => (StatusCode::SERVICE_UNAVAILABLE, "contention"),
        EngineError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store"),
        EngineError::Directory(_) => (StatusCode::INTERNAL_SERVER_ERROR, "directory"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => {
                let body = Json(ErrorBody {
                    error: "unauthorized",
                    message: "missing or unknown bearer token".to_string(),
                });
                (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
            }
            Self::Engine(error) => {
                let (status, kind) = classify_engine_error(&error);
                let body = Json(ErrorBody {
                    error: kind,
                    message: error.to_string(),
                });
                (status, body).into_response()
            }
        }
    }
}
