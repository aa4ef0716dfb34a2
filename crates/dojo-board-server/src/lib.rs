// crates/dojo-board-server/src/lib.rs
// ============================================================================
// Module: Dojo Board Server
// Description: HTTP front end for the belt-promotion exam engine.
// Purpose: Expose exam lifecycle operations over an authenticated REST API.
// Dependencies: axum, dojo-board-config, dojo-board-core,
//               dojo-board-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! This crate serves the exam lifecycle engine over HTTP. Configuration
//! selects the store backend and seeds the account roster with bearer
//! tokens; the router in [`server`] maps each route onto one engine
//! operation and renders typed failures through [`error::ApiError`].

/// Bearer-token authentication against the configured roster.
pub mod auth;
/// HTTP error mapping for engine and auth failures.
pub mod error;
/// Router, handlers, and state construction.
pub mod server;
/// Request metrics hooks.
pub mod telemetry;
/// Request payload types and boundary conversions.
pub mod wire;

pub use self::auth::TokenTable;
pub use self::auth::authenticate;
pub use self::error::ApiError;
pub use self::error::ErrorBody;
pub use self::server::ServerError;
pub use self::server::ServerState;
pub use self::server::build_router;
pub use self::server::build_state;
pub use self::telemetry::ApiMetrics;
pub use self::telemetry::ApiOutcome;
pub use self::telemetry::ApiRoute;
pub use self::telemetry::NoopMetrics;
pub use self::wire::CreateExamBody;
pub use self::wire::ListQuery;
pub use self::wire::ResultEntryBody;
pub use self::wire::ResultsBody;
pub use self::wire::StatusChangeBody;
pub use self::wire::parse_exam_date;
