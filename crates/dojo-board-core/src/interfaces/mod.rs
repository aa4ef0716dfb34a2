// crates/dojo-board-core/src/interfaces/mod.rs
// ============================================================================
// Module: Dojo Board Interfaces
// Description: Backend-agnostic interfaces for persistence and accounts.
// Purpose: Define the contract surfaces used by the exam engine runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the exam engine integrates with external systems
//! without embedding backend-specific details. The store contract carries
//! optimistic-concurrency semantics: every save and delete names the version
//! it read, and the store rejects the write when the record has moved on.
//! Implementations must fail closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::belt::BeltRank;
use crate::core::context::Role;
use crate::core::exam::Exam;
use crate::core::identifiers::ExamId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Account Directory
// ============================================================================

/// Account record resolved through the directory.
///
/// # Invariants
/// - `belt_level` and `training_start` are snapshots at lookup time; the
///   engine re-reads them for every eligibility decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Account identifier.
    pub user_id: UserId,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Current belt rank.
    pub belt_level: BeltRank,
    /// Timestamp when the student started training.
    pub training_start: Timestamp,
}

/// Account directory errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Directory lookup or write failed.
    #[error("account directory error: {0}")]
    Directory(String),
}

/// Backend-agnostic account directory.
///
/// The engine only reads accounts. Belt promotion writes
/// ([`AccountDirectory::promote_user`]) belong to the engine's caller after
/// a successful result submission.
pub trait AccountDirectory {
    /// Resolves an account by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the lookup fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<UserAccount>, DirectoryError>;

    /// Advances an account's belt rank after a passing exam result.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the write fails or the account is
    /// unknown.
    fn promote_user(&self, user_id: &UserId, new_belt: BeltRank) -> Result<(), DirectoryError>;
}

impl<T: AccountDirectory + ?Sized> AccountDirectory for Arc<T> {
    fn get_user(&self, user_id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        self.as_ref().get_user(user_id)
    }

    fn promote_user(&self, user_id: &UserId, new_belt: BeltRank) -> Result<(), DirectoryError> {
        self.as_ref().promote_user(user_id, new_belt)
    }
}

/// Shared, thread-safe account directory handle.
pub type SharedAccountDirectory = Arc<dyn AccountDirectory + Send + Sync>;

// ============================================================================
// SECTION: Exam Store
// ============================================================================

/// Exam snapshot paired with its store version.
///
/// # Invariants
/// - `version` is the value to pass back as `expected_version` for the next
///   compare-and-swap save of the same exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedExam {
    /// Store version of the snapshot (always >= 1).
    pub version: u64,
    /// Exam record.
    pub exam: Exam,
}

/// Exam store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never embed raw exam payloads.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("exam store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("exam store corruption: {0}")]
    Corrupt(String),
    /// Compare-and-swap failed: the stored version moved past the expected one.
    #[error("exam store version conflict for {exam_id}: expected {expected}")]
    VersionConflict {
        /// Exam identifier that was contended.
        exam_id: ExamId,
        /// Version the caller expected to replace.
        expected: u64,
    },
    /// Insert failed because the exam identifier already exists.
    #[error("exam store conflict: exam {0} already exists")]
    Conflict(ExamId),
    /// Store data is invalid.
    #[error("exam store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("exam store error: {0}")]
    Store(String),
}

/// Exam store with optimistic-concurrency saves.
///
/// The compare-and-swap discipline is what makes the engine's capacity check
/// and registrant insert a single atomic step: two racing writers load the
/// same version, and only one save lands.
pub trait ExamStore {
    /// Loads the latest snapshot of an exam.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, exam_id: &ExamId) -> Result<Option<VersionedExam>, StoreError>;

    /// Saves an exam snapshot with compare-and-swap semantics.
    ///
    /// `expected_version: None` inserts a new exam at version 1 and fails
    /// with [`StoreError::Conflict`] when the identifier already exists.
    /// `Some(version)` replaces the snapshot only when the stored version
    /// matches, failing with [`StoreError::VersionConflict`] otherwise.
    /// Returns the new stored version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the version check does
    /// not hold.
    fn save(&self, exam: &Exam, expected_version: Option<u64>) -> Result<u64, StoreError>;

    /// Deletes an exam, verifying the expected version first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] when the stored version moved,
    /// [`StoreError::Invalid`] when the exam does not exist, or another
    /// [`StoreError`] when the delete fails.
    fn delete(&self, exam_id: &ExamId, expected_version: u64) -> Result<(), StoreError>;

    /// Lists the latest snapshot of every stored exam.
    ///
    /// The listing is recomputed per call; no cursor state is retained.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list(&self) -> Result<Vec<Exam>, StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<T: ExamStore + ?Sized> ExamStore for Arc<T> {
    fn load(&self, exam_id: &ExamId) -> Result<Option<VersionedExam>, StoreError> {
        self.as_ref().load(exam_id)
    }

    fn save(&self, exam: &Exam, expected_version: Option<u64>) -> Result<u64, StoreError> {
        self.as_ref().save(exam, expected_version)
    }

    fn delete(&self, exam_id: &ExamId, expected_version: u64) -> Result<(), StoreError> {
        self.as_ref().delete(exam_id, expected_version)
    }

    fn list(&self) -> Result<Vec<Exam>, StoreError> {
        self.as_ref().list()
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.as_ref().readiness()
    }
}

/// Shared, thread-safe exam store handle.
pub type SharedExamStore = Arc<dyn ExamStore + Send + Sync>;
