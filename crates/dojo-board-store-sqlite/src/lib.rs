// crates/dojo-board-store-sqlite/src/lib.rs
// ============================================================================
// Module: Dojo Board SQLite Store
// Description: Durable exam persistence backed by SQLite.
// Purpose: Provide the production ExamStore implementation.
// Dependencies: dojo-board-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Durable [`dojo_board_core::ExamStore`] implementation over `SQLite` with
//! WAL journaling, canonical JSON snapshots, hash-verified loads, and
//! compare-and-swap saves executed in a single write transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use store::ExamVersionSummary;
pub use store::MAX_EXAM_BYTES;
pub use store::SqliteExamStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
