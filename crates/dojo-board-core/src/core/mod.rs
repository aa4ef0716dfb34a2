// crates/dojo-board-core/src/core/mod.rs
// ============================================================================
// Module: Dojo Board Core Model
// Description: Domain model for belt-promotion exams.
// Purpose: Group identifiers, ranks, records, and hashing under one namespace.
// Dependencies: crate::core submodules
// ============================================================================

//! ## Overview
//! The core model is pure data: exam records, belt ranks, timestamps, and
//! actor context. Behavior and precondition enforcement live in
//! [`crate::runtime`]; persistence contracts live in [`crate::interfaces`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod belt;
pub mod context;
pub mod exam;
pub mod hashing;
pub mod identifiers;
pub mod time;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use belt::BeltRank;
pub use belt::BeltRankParseError;
pub use context::RequestContext;
pub use context::Role;
pub use exam::Eligibility;
pub use exam::Exam;
pub use exam::ExamFilter;
pub use exam::ExamResult;
pub use exam::ExamStatus;
pub use identifiers::ExamId;
pub use identifiers::UserId;
pub use time::Timestamp;
pub use time::elapsed_months;
