// crates/dojo-board-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Backends
// Description: Mutex-guarded exam store and account directory.
// Purpose: Provide reference backends for tests and single-process hosts.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The in-memory store holds every exam behind one mutex, so the version
//! compare and the snapshot swap are trivially atomic. Clones share the
//! underlying map, which lets tests hand the same store to an engine and
//! inspect state through their own handle.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::core::belt::BeltRank;
use crate::core::exam::Exam;
use crate::core::identifiers::ExamId;
use crate::core::identifiers::UserId;
use crate::interfaces::AccountDirectory;
use crate::interfaces::DirectoryError;
use crate::interfaces::ExamStore;
use crate::interfaces::StoreError;
use crate::interfaces::UserAccount;
use crate::interfaces::VersionedExam;

// ============================================================================
// SECTION: In-Memory Exam Store
// ============================================================================

/// In-memory [`ExamStore`] with compare-and-swap saves.
///
/// # Invariants
/// - Versions start at 1 and increase by exactly 1 per successful save.
/// - Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExamStore {
    /// Exams keyed by identifier with their current version.
    exams: Arc<Mutex<HashMap<ExamId, VersionedExam>>>,
}

impl InMemoryExamStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExamStore for InMemoryExamStore {
    fn load(&self, exam_id: &ExamId) -> Result<Option<VersionedExam>, StoreError> {
        let guard = self.exams.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(exam_id).cloned())
    }

    fn save(&self, exam: &Exam, expected_version: Option<u64>) -> Result<u64, StoreError> {
        let mut guard = self.exams.lock().unwrap_or_else(PoisonError::into_inner);
        match (guard.get(&exam.exam_id), expected_version) {
            (Some(_), None) => Err(StoreError::Conflict(exam.exam_id.clone())),
            (Some(stored), Some(expected)) if stored.version != expected => {
                Err(StoreError::VersionConflict {
                    exam_id: exam.exam_id.clone(),
                    expected,
                })
            }
            (None, Some(expected)) => Err(StoreError::VersionConflict {
                exam_id: exam.exam_id.clone(),
                expected,
            }),
            (stored, _) => {
                let version = stored.map_or(1, |versioned| versioned.version + 1);
                guard.insert(
                    exam.exam_id.clone(),
                    VersionedExam {
                        version,
                        exam: exam.clone(),
                    },
                );
                Ok(version)
            }
        }
    }

    fn delete(&self, exam_id: &ExamId, expected_version: u64) -> Result<(), StoreError> {
        let mut guard = self.exams.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.get(exam_id) {
            None => Err(StoreError::Invalid(format!("exam not stored: {exam_id}"))),
            Some(stored) if stored.version != expected_version => {
                Err(StoreError::VersionConflict {
                    exam_id: exam_id.clone(),
                    expected: expected_version,
                })
            }
            Some(_) => {
                guard.remove(exam_id);
                Ok(())
            }
        }
    }

    fn list(&self) -> Result<Vec<Exam>, StoreError> {
        let guard = self.exams.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.values().map(|versioned| versioned.exam.clone()).collect())
    }
}

// ============================================================================
// SECTION: In-Memory Account Directory
// ============================================================================

/// In-memory [`AccountDirectory`] seeded with fixed accounts.
///
/// # Invariants
/// - Clones share the same underlying map.
/// - Promotions overwrite `belt_level` in place.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountDirectory {
    /// Accounts keyed by identifier.
    accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
}

impl InMemoryAccountDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with the provided accounts.
    #[must_use]
    pub fn with_accounts(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        let directory = Self::new();
        for account in accounts {
            directory.upsert(account);
        }
        directory
    }

    /// Inserts or replaces an account.
    pub fn upsert(&self, account: UserAccount) {
        let mut guard = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(account.user_id.clone(), account);
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn get_user(&self, user_id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(user_id).cloned())
    }

    fn promote_user(&self, user_id: &UserId, new_belt: BeltRank) -> Result<(), DirectoryError> {
        let mut guard = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.get_mut(user_id) {
            Some(account) => {
                account.belt_level = new_belt;
                Ok(())
            }
            None => Err(DirectoryError::Directory(format!("account not found: {user_id}"))),
        }
    }
}
