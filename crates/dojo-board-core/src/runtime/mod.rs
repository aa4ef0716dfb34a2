// crates/dojo-board-core/src/runtime/mod.rs
// ============================================================================
// Module: Dojo Board Runtime
// Description: Exam engine runtime and in-memory reference backends.
// Purpose: Group the lifecycle engine with its test-friendly backends.
// Dependencies: crate::runtime submodules
// ============================================================================

//! ## Overview
//! The runtime hosts the [`ExamEngine`], which enforces every lifecycle
//! precondition and drives all mutations through the store's
//! compare-and-swap save path, plus in-memory store and directory
//! implementations used by tests and single-process deployments.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod memory;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use engine::CreateExamRequest;
pub use engine::EngineConfig;
pub use engine::EngineError;
pub use engine::ExamEngine;
pub use engine::ResultEntry;
pub use engine::StudentResult;
pub use memory::InMemoryAccountDirectory;
pub use memory::InMemoryExamStore;
