// crates/dojo-board-core/src/lib.rs
// ============================================================================
// Module: Dojo Board Core
// Description: Belt-promotion exam model, engine, and backend contracts.
// Purpose: Provide the pure lifecycle logic shared by every deployment shape.
// Dependencies: serde, serde_jcs, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! `dojo-board-core` implements the belt-promotion exam lifecycle: exam
//! records with eligibility gates, a status state machine, registration and
//! grading rules, and the optimistic-concurrency store contract the engine
//! drives every mutation through. The crate stays free of I/O so the same
//! engine runs against the in-memory backends here or the SQLite store in
//! `dojo-board-store-sqlite`.
//!
//! ## Layout
//! - [`core`]: domain model (identifiers, belts, exams, timestamps, hashing).
//! - [`interfaces`]: store and account-directory contracts with typed errors.
//! - [`runtime`]: the [`ExamEngine`] and in-memory reference backends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use self::core::hashing;

pub use self::core::BeltRank;
pub use self::core::BeltRankParseError;
pub use self::core::Eligibility;
pub use self::core::Exam;
pub use self::core::ExamFilter;
pub use self::core::ExamId;
pub use self::core::ExamResult;
pub use self::core::ExamStatus;
pub use self::core::RequestContext;
pub use self::core::Role;
pub use self::core::Timestamp;
pub use self::core::UserId;
pub use self::core::elapsed_months;
pub use self::interfaces::AccountDirectory;
pub use self::interfaces::DirectoryError;
pub use self::interfaces::ExamStore;
pub use self::interfaces::SharedAccountDirectory;
pub use self::interfaces::SharedExamStore;
pub use self::interfaces::StoreError;
pub use self::interfaces::UserAccount;
pub use self::interfaces::VersionedExam;
pub use self::runtime::CreateExamRequest;
pub use self::runtime::EngineConfig;
pub use self::runtime::EngineError;
pub use self::runtime::ExamEngine;
pub use self::runtime::InMemoryAccountDirectory;
pub use self::runtime::InMemoryExamStore;
pub use self::runtime::ResultEntry;
pub use self::runtime::StudentResult;
