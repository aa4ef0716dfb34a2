// crates/dojo-board-core/src/core/context.rs
// ============================================================================
// Module: Request Context
// Description: Request-scoped actor identity and role for engine calls.
// Purpose: Replace ambient auth state with explicit per-call context.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Every engine operation receives an explicit [`RequestContext`] naming the
//! authenticated actor and their role. The engine performs no ambient
//! lookups; hosts resolve identity at the transport boundary and pass it in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Account role recognized by the exam engine.
///
/// # Invariants
/// - Variants are stable for serialization and authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A student who registers for and sits exams.
    Student,
    /// An instructor who creates, runs, and grades exams.
    Instructor,
}

impl Role {
    /// Returns the stable lowercase label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
        }
    }
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Request-scoped actor identity passed into every engine call.
///
/// # Invariants
/// - `role` reflects the directory record at authentication time, never a
///   client-supplied claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Authenticated actor identifier.
    pub actor: UserId,
    /// Actor role resolved by the host.
    pub role: Role,
}

impl RequestContext {
    /// Creates a student context.
    #[must_use]
    pub fn student(actor: impl Into<UserId>) -> Self {
        Self {
            actor: actor.into(),
            role: Role::Student,
        }
    }

    /// Creates an instructor context.
    #[must_use]
    pub fn instructor(actor: impl Into<UserId>) -> Self {
        Self {
            actor: actor.into(),
            role: Role::Instructor,
        }
    }
}
