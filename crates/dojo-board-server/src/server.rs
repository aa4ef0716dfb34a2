// crates/dojo-board-server/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: Axum router and handlers for the exam lifecycle API.
// Purpose: Expose the exam engine over HTTP with bearer-token auth.
// Dependencies: axum, dojo-board-config, dojo-board-core,
//               dojo-board-store-sqlite, serde, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! The server wires the configured store backend and account roster into an
//! [`ExamEngine`] and exposes it under `/api/exams`. Every API route
//! authenticates the bearer token first; `/health` and `/ready` are
//! unauthenticated probes. Handlers delegate all domain decisions to the
//! engine and map failures through [`ApiError`], so the HTTP layer holds no
//! business rules of its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use dojo_board_config::DojoBoardConfig;
use dojo_board_config::StoreBackend;
use dojo_board_core::AccountDirectory;
use dojo_board_core::CreateExamRequest;
use dojo_board_core::EngineConfig;
use dojo_board_core::EngineError;
use dojo_board_core::Exam;
use dojo_board_core::ExamEngine;
use dojo_board_core::ExamFilter;
use dojo_board_core::ExamId;
use dojo_board_core::ExamStore;
use dojo_board_core::InMemoryAccountDirectory;
use dojo_board_core::InMemoryExamStore;
use dojo_board_core::ResultEntry;
use dojo_board_core::SharedExamStore;
use dojo_board_core::StudentResult;
use dojo_board_core::Timestamp;
use dojo_board_core::UserAccount;
use dojo_board_core::UserId;
use dojo_board_store_sqlite::SqliteExamStore;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::TokenTable;
use crate::auth::authenticate;
use crate::error::ApiError;
use crate::telemetry::ApiMetrics;
use crate::telemetry::ApiOutcome;
use crate::telemetry::ApiRoute;
use crate::wire::CreateExamBody;
use crate::wire::ListQuery;
use crate::wire::ResultsBody;
use crate::wire::StatusChangeBody;
use crate::wire::parse_exam_date;

// ============================================================================
// SECTION: Server Errors
// ============================================================================

/// Startup-time server failure.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(#[from] dojo_board_config::ConfigError),
    /// The exam store could not be opened.
    #[error("store error: {0}")]
    Store(String),
    /// The engine rejected its runtime settings.
    #[error("engine error: {0}")]
    Engine(String),
    /// A network or filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// SECTION: Server State
// ============================================================================

/// Shared state behind every handler.
pub struct ServerState {
    /// Exam lifecycle engine over the configured store.
    engine: ExamEngine<SharedExamStore, InMemoryAccountDirectory>,
    /// Account directory, shared with the engine.
    directory: InMemoryAccountDirectory,
    /// Store handle for readiness probes.
    store: SharedExamStore,
    /// Bearer-token principal table.
    tokens: TokenTable,
    /// Request metrics sink.
    metrics: Arc<dyn ApiMetrics>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState").finish_non_exhaustive()
    }
}

/// Builds server state from validated configuration.
///
/// # Errors
///
/// Returns [`ServerError`] when the store cannot be opened or the engine
/// settings are out of range.
pub fn build_state(
    config: &DojoBoardConfig,
    metrics: Arc<dyn ApiMetrics>,
) -> Result<Arc<ServerState>, ServerError> {
    let directory = InMemoryAccountDirectory::with_accounts(config.accounts.iter().map(
        |account| UserAccount {
            user_id: UserId::new(account.user_id.clone()),
            full_name: account.full_name.clone(),
            role: account.role,
            belt_level: account.belt_level,
            training_start: Timestamp::UnixMillis(account.training_start_unix_millis),
        },
    ));
    let store: SharedExamStore = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryExamStore::new()),
        StoreBackend::Sqlite => {
            let sqlite = config
                .store
                .sqlite
                .clone()
                .ok_or_else(|| ServerError::Store("sqlite backend requires [store.sqlite]".to_string()))?;
            Arc::new(SqliteExamStore::new(sqlite).map_err(|err| ServerError::Store(err.to_string()))?)
        }
    };
    let engine = ExamEngine::new(
        Arc::clone(&store),
        directory.clone(),
        EngineConfig {
            max_save_retries: config.engine.max_save_retries,
        },
    )
    .map_err(|err| ServerError::Engine(err.to_string()))?;
    Ok(Arc::new(ServerState {
        engine,
        directory,
        store,
        tokens: TokenTable::from_config(config),
        metrics,
    }))
}

/// Builds the exam API router over shared server state.
#[must_use]
pub fn build_router(state: Arc<ServerState>, request_body_limit: usize) -> Router {
    Router::new()
        .route("/api/exams", post(handle_create_exam).get(handle_list_exams))
        .route("/api/exams/{id}", get(handle_get_exam).delete(handle_delete_exam))
        .route("/api/exams/{id}/register", post(handle_register_student))
        .route("/api/exams/{id}/status", patch(handle_change_status))
        .route("/api/exams/{id}/results", post(handle_submit_results))
        .route("/api/exams/{id}/missing-results", get(handle_missing_results))
        .route("/api/exams/student/{id}/results", get(handle_student_results))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .layer(DefaultBodyLimit::max(request_body_limit))
        .with_state(state)
}

// ============================================================================
// SECTION: Probe Bodies
// ============================================================================

/// Body returned by the health and readiness probes.
#[derive(Debug, Serialize)]
struct ProbeBody {
    /// Probe status label.
    status: &'static str,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall clock as a unix-millisecond timestamp.
fn now_timestamp() -> Timestamp {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    Timestamp::UnixMillis(i64::try_from(millis).unwrap_or(i64::MAX))
}

/// Returns the metrics outcome label for a handler result.
const fn outcome_of<T>(result: &Result<T, ApiError>) -> ApiOutcome {
    match result {
        Ok(_) => ApiOutcome::Ok,
        Err(_) => ApiOutcome::Error,
    }
}

/// Records one handled request against the metrics sink.
fn observe<T>(state: &ServerState, route: ApiRoute, started: Instant, result: &Result<T, ApiError>) {
    state.metrics.record_request(route, outcome_of(result), started.elapsed());
}

// ============================================================================
// SECTION: Exam Handlers
// ============================================================================

/// `POST /api/exams`
async fn handle_create_exam(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<CreateExamBody>,
) -> Response {
    let started = Instant::now();
    let result = create_exam(&state, &headers, &body);
    observe(&state, ApiRoute::CreateExam, started, &result);
    match result {
        Ok(exam) => (StatusCode::CREATED, Json(exam)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and creates an exam with a generated identifier.
fn create_exam(
    state: &ServerState,
    headers: &HeaderMap,
    body: &CreateExamBody,
) -> Result<Exam, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    let exam_date = parse_exam_date(&body.exam_date)?;
    let request = CreateExamRequest {
        exam_id: ExamId::new(Uuid::new_v4().to_string()),
        name: body.name.clone(),
        exam_date,
        target_belt: body.target_belt,
        max_registrants: body.max_registrants,
        eligibility: body.eligibility,
    };
    Ok(state.engine.create_exam(&ctx, &request, now_timestamp())?)
}

/// `GET /api/exams`
async fn handle_list_exams(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let started = Instant::now();
    let result = list_exams(&state, &headers, &query);
    observe(&state, ApiRoute::ListExams, started, &result);
    match result {
        Ok(exams) => Json(exams).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and lists exams matching the query filters.
fn list_exams(
    state: &ServerState,
    headers: &HeaderMap,
    query: &ListQuery,
) -> Result<Vec<Exam>, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    let filter = ExamFilter {
        target_belt: query.belt,
        status: query.status,
        instructor: query.instructor.clone(),
    };
    Ok(state.engine.list_exams(&ctx, &filter)?)
}

/// `GET /api/exams/{id}`
async fn handle_get_exam(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(exam_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let result = get_exam(&state, &headers, &exam_id);
    observe(&state, ApiRoute::GetExam, started, &result);
    match result {
        Ok(exam) => Json(exam).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and loads one exam.
fn get_exam(state: &ServerState, headers: &HeaderMap, exam_id: &str) -> Result<Exam, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    Ok(state.engine.get_exam(&ctx, &ExamId::new(exam_id))?)
}

/// `POST /api/exams/{id}/register`
async fn handle_register_student(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(exam_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let result = register_student(&state, &headers, &exam_id);
    observe(&state, ApiRoute::RegisterStudent, started, &result);
    match result {
        Ok(exam) => Json(exam).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and registers the caller for an exam.
fn register_student(
    state: &ServerState,
    headers: &HeaderMap,
    exam_id: &str,
) -> Result<Exam, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    Ok(state.engine.register_student(&ctx, &ExamId::new(exam_id), now_timestamp())?)
}

/// `PATCH /api/exams/{id}/status`
async fn handle_change_status(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(exam_id): Path<String>,
    Json(body): Json<StatusChangeBody>,
) -> Response {
    let started = Instant::now();
    let result = change_status(&state, &headers, &exam_id, body);
    observe(&state, ApiRoute::ChangeStatus, started, &result);
    match result {
        Ok(exam) => Json(exam).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and advances an exam's lifecycle status.
fn change_status(
    state: &ServerState,
    headers: &HeaderMap,
    exam_id: &str,
    body: StatusChangeBody,
) -> Result<Exam, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    Ok(state.engine.change_status(&ctx, &ExamId::new(exam_id), body.status)?)
}

/// `POST /api/exams/{id}/results`
async fn handle_submit_results(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(exam_id): Path<String>,
    Json(body): Json<ResultsBody>,
) -> Response {
    let started = Instant::now();
    let result = submit_results(&state, &headers, &exam_id, &body);
    observe(&state, ApiRoute::SubmitResults, started, &result);
    match result {
        Ok(exam) => Json(exam).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates, records a grading batch, and promotes passing students.
fn submit_results(
    state: &ServerState,
    headers: &HeaderMap,
    exam_id: &str,
    body: &ResultsBody,
) -> Result<Exam, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    let entries: Vec<ResultEntry> = body
        .results
        .iter()
        .map(|entry| ResultEntry {
            student_id: entry.student.clone(),
            passed: entry.passed,
            notes: entry.notes.clone(),
        })
        .collect();
    let exam = state.engine.submit_results(&ctx, &ExamId::new(exam_id), &entries)?;
    // The submission is committed; promotion failures surface without
    // rolling it back.
    for entry in &entries {
        if entry.passed {
            state
                .directory
                .promote_user(&entry.student_id, exam.target_belt)
                .map_err(EngineError::from)?;
        }
    }
    Ok(exam)
}

/// `DELETE /api/exams/{id}`
async fn handle_delete_exam(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(exam_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let result = delete_exam(&state, &headers, &exam_id);
    observe(&state, ApiRoute::DeleteExam, started, &result);
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and deletes an upcoming exam.
fn delete_exam(state: &ServerState, headers: &HeaderMap, exam_id: &str) -> Result<(), ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    Ok(state.engine.delete_exam(&ctx, &ExamId::new(exam_id))?)
}

/// `GET /api/exams/{id}/missing-results`
async fn handle_missing_results(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(exam_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let result = missing_results(&state, &headers, &exam_id);
    observe(&state, ApiRoute::MissingResults, started, &result);
    match result {
        Ok(students) => Json(students).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and lists registrants with no recorded result.
fn missing_results(
    state: &ServerState,
    headers: &HeaderMap,
    exam_id: &str,
) -> Result<Vec<UserId>, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    Ok(state.engine.missing_results(&ctx, &ExamId::new(exam_id))?)
}

/// `GET /api/exams/student/{id}/results`
async fn handle_student_results(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let result = student_results(&state, &headers, &student_id);
    observe(&state, ApiRoute::StudentResults, started, &result);
    match result {
        Ok(results) => Json(results).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Authenticates and lists a student's completed-exam results.
fn student_results(
    state: &ServerState,
    headers: &HeaderMap,
    student_id: &str,
) -> Result<Vec<StudentResult>, ApiError> {
    let ctx = authenticate(&state.tokens, &state.directory, headers)?;
    Ok(state.engine.results_for_student(&ctx, &UserId::new(student_id))?)
}

// ============================================================================
// SECTION: Probe Handlers
// ============================================================================

/// `GET /health`
async fn handle_health() -> Response {
    Json(ProbeBody {
        status: "ok",
    })
    .into_response()
}

/// `GET /ready`
async fn handle_ready(State(state): State<Arc<ServerState>>) -> Response {
    match state.store.readiness() {
        Ok(()) => Json(ProbeBody {
            status: "ready",
        })
        .into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeBody {
                status: "unavailable",
            }),
        )
            .into_response(),
    }
}
