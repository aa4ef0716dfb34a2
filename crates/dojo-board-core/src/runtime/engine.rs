// crates/dojo-board-core/src/runtime/engine.rs
// ============================================================================
// Module: Exam Lifecycle Engine
// Description: Lifecycle operations, eligibility, capacity, and grading.
// Purpose: Enforce exam invariants over an optimistic-concurrency store.
// Dependencies: crate::core, crate::interfaces, serde, thiserror
// ============================================================================

//! ## Overview
//! The engine owns every exam mutation: creation, registration, status
//! transitions, grading, and deletion. Each mutation executes a bounded
//! load, apply, compare-and-swap save loop so the capacity check and the
//! registrant insert commit as one atomic step; racing writers on the same
//! exam are serialized by the store's version check while different exams
//! proceed fully in parallel. Domain failures are terminal for the call;
//! only a store version conflict re-runs the read-modify-write.
//!
//! The engine performs no ambient lookups and never reads wall-clock time:
//! actor identity arrives in a [`RequestContext`] and time-sensitive
//! operations take an explicit `now`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::belt::BeltRank;
use crate::core::context::RequestContext;
use crate::core::context::Role;
use crate::core::exam::Eligibility;
use crate::core::exam::Exam;
use crate::core::exam::ExamFilter;
use crate::core::exam::ExamResult;
use crate::core::exam::ExamStatus;
use crate::core::identifiers::ExamId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;
use crate::core::time::elapsed_months;
use crate::interfaces::AccountDirectory;
use crate::interfaces::DirectoryError;
use crate::interfaces::ExamStore;
use crate::interfaces::StoreError;
use crate::interfaces::UserAccount;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Engine runtime configuration.
///
/// # Invariants
/// - `max_save_retries` must be >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum compare-and-swap attempts per mutation before reporting
    /// contention.
    pub max_save_retries: u32,
}

/// Default compare-and-swap attempt budget per mutation.
const DEFAULT_MAX_SAVE_RETRIES: u32 = 8;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_save_retries: DEFAULT_MAX_SAVE_RETRIES,
        }
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Request payload for exam creation.
///
/// # Invariants
/// - `exam_id` is assigned by the caller and must be unique store-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExamRequest {
    /// Identifier for the new exam.
    pub exam_id: ExamId,
    /// Display label for the exam.
    pub name: String,
    /// Scheduled exam date and time.
    pub exam_date: Timestamp,
    /// Belt awarded on a passing result.
    pub target_belt: BeltRank,
    /// Maximum number of registrants (must be >= 1).
    pub max_registrants: u32,
    /// Registration eligibility requirements.
    pub eligibility: Eligibility,
}

/// One grading entry within a result submission batch.
///
/// # Invariants
/// - `student_id` must name a current registrant of the graded exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Graded student identifier.
    pub student_id: UserId,
    /// Whether the student passed.
    pub passed: bool,
    /// Free-form instructor notes.
    pub notes: String,
}

/// A student's recorded result joined with exam metadata.
///
/// # Invariants
/// - Only completed exams are surfaced; in-flight grading stays private to
///   the owning instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResult {
    /// Exam identifier.
    pub exam_id: ExamId,
    /// Exam display label.
    pub exam_name: String,
    /// Scheduled exam date.
    pub exam_date: Timestamp,
    /// Belt the exam awarded on a pass.
    pub target_belt: BeltRank,
    /// Owning instructor identifier.
    pub instructor_id: UserId,
    /// Recorded result for the student.
    pub result: ExamResult,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Exam engine errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling; hosts map them to
///   transport-level error codes without string matching.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),
    /// Actor lacks the required role or ownership.
    #[error("authorization error: {0}")]
    Authorization(String),
    /// Referenced exam does not exist.
    #[error("exam not found: {0}")]
    ExamNotFound(ExamId),
    /// Referenced account does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(UserId),
    /// Operation is not valid for the exam's current status.
    #[error("exam {exam_id} is {status}: operation not valid in this state")]
    InvalidState {
        /// Exam identifier.
        exam_id: ExamId,
        /// Status at the time of the call.
        status: ExamStatus,
    },
    /// Requested status change is not a legal transition.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status at the time of the call.
        from: ExamStatus,
        /// Requested status.
        to: ExamStatus,
    },
    /// Registration would exceed the exam's capacity.
    #[error("exam {exam_id} is full: capacity {max_registrants}")]
    Capacity {
        /// Exam identifier.
        exam_id: ExamId,
        /// Configured capacity.
        max_registrants: u32,
    },
    /// Student does not meet the exam's eligibility requirements.
    #[error("eligibility not met for exam {exam_id}: {reason}")]
    Eligibility {
        /// Exam identifier.
        exam_id: ExamId,
        /// Which requirement failed, with required and actual values.
        reason: String,
    },
    /// Student is already registered for the exam.
    #[error("student {student_id} already registered for exam {exam_id}")]
    AlreadyRegistered {
        /// Exam identifier.
        exam_id: ExamId,
        /// Student identifier.
        student_id: UserId,
    },
    /// Compare-and-swap budget exhausted under sustained contention.
    #[error("exam {exam_id} is contended: gave up after {attempts} attempts")]
    Contention {
        /// Exam identifier.
        exam_id: ExamId,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// Store reported an error.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Account directory reported an error.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Exam lifecycle engine over a store and an account directory.
///
/// # Invariants
/// - Every mutation commits through a compare-and-swap save; the engine
///   never writes without naming the version it read.
/// - The engine records grading outcomes but never writes belt promotions;
///   that directory write belongs to the caller.
#[derive(Debug, Clone)]
pub struct ExamEngine<S, D> {
    /// Exam persistence backend.
    store: S,
    /// Account directory collaborator.
    directory: D,
    /// Runtime configuration.
    config: EngineConfig,
}

impl<S, D> ExamEngine<S, D>
where
    S: ExamStore,
    D: AccountDirectory,
{
    /// Creates an engine over the provided backends.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when the configuration is out of
    /// range.
    pub fn new(store: S, directory: D, config: EngineConfig) -> Result<Self, EngineError> {
        if config.max_save_retries == 0 {
            return Err(EngineError::Validation(
                "max_save_retries must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            store,
            directory,
            config,
        })
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Creates a new exam owned by the requesting instructor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Authorization`] when the requester is not an
    /// instructor, [`EngineError::Validation`] for out-of-range input or a
    /// duplicate exam identifier, or a store error.
    pub fn create_exam(
        &self,
        ctx: &RequestContext,
        request: &CreateExamRequest,
        now: Timestamp,
    ) -> Result<Exam, EngineError> {
        if ctx.role != Role::Instructor {
            return Err(EngineError::Authorization(
                "only instructors may create exams".to_string(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(EngineError::Validation("exam name must not be empty".to_string()));
        }
        if request.max_registrants == 0 {
            return Err(EngineError::Validation(
                "max_registrants must be greater than zero".to_string(),
            ));
        }
        let exam = Exam {
            exam_id: request.exam_id.clone(),
            name: request.name.clone(),
            instructor_id: ctx.actor.clone(),
            exam_date: request.exam_date,
            target_belt: request.target_belt,
            max_registrants: request.max_registrants,
            eligibility: request.eligibility,
            status: ExamStatus::Upcoming,
            registrants: Vec::new(),
            results: std::collections::BTreeMap::new(),
            created_at: now,
        };
        match self.store.save(&exam, None) {
            Ok(_) => Ok(exam),
            Err(StoreError::Conflict(exam_id)) => Err(EngineError::Validation(format!(
                "exam id already exists: {exam_id}"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Registers the requesting student for an exam.
    ///
    /// Preconditions are checked in order: exam exists, status is upcoming,
    /// student not already registered, capacity available, belt rank and
    /// training duration meet the eligibility requirements. The capacity
    /// check and the insert commit as one compare-and-swap save.
    ///
    /// # Errors
    ///
    /// Returns the first failing precondition as a typed [`EngineError`].
    pub fn register_student(
        &self,
        ctx: &RequestContext,
        exam_id: &ExamId,
        now: Timestamp,
    ) -> Result<Exam, EngineError> {
        if ctx.role != Role::Student {
            return Err(EngineError::Authorization(
                "only students may register for exams".to_string(),
            ));
        }
        let account = self.lookup_account(&ctx.actor)?;
        let student_id = ctx.actor.clone();
        self.mutate(exam_id, |exam| {
            if exam.status != ExamStatus::Upcoming {
                return Err(EngineError::InvalidState {
                    exam_id: exam.exam_id.clone(),
                    status: exam.status,
                });
            }
            if exam.is_registered(&student_id) {
                return Err(EngineError::AlreadyRegistered {
                    exam_id: exam.exam_id.clone(),
                    student_id: student_id.clone(),
                });
            }
            if exam.is_full() {
                return Err(EngineError::Capacity {
                    exam_id: exam.exam_id.clone(),
                    max_registrants: exam.max_registrants,
                });
            }
            check_eligibility(exam, &account, now)?;
            let mut updated = exam.clone();
            updated.registrants.push(student_id.clone());
            Ok(updated)
        })
    }

    // ------------------------------------------------------------------
    // Status Transitions
    // ------------------------------------------------------------------

    /// Advances an exam's lifecycle status.
    ///
    /// Only `upcoming → ongoing` and `ongoing → completed` are legal, and
    /// only for the owning instructor. Completion does not require full
    /// results coverage; consult [`ExamEngine::missing_results`] to warn
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Authorization`] for non-owners,
    /// [`EngineError::InvalidTransition`] for illegal transitions, or a
    /// store error.
    pub fn change_status(
        &self,
        ctx: &RequestContext,
        exam_id: &ExamId,
        requested: ExamStatus,
    ) -> Result<Exam, EngineError> {
        self.mutate(exam_id, |exam| {
            ensure_owner(ctx, exam)?;
            if !exam.status.can_transition_to(requested) {
                return Err(EngineError::InvalidTransition {
                    from: exam.status,
                    to: requested,
                });
            }
            let mut updated = exam.clone();
            updated.status = requested;
            Ok(updated)
        })
    }

    // ------------------------------------------------------------------
    // Grading
    // ------------------------------------------------------------------

    /// Records grading results for an ongoing exam.
    ///
    /// The batch is validated as a whole: a duplicate or non-registrant
    /// entry rejects the entire submission with nothing applied. Valid
    /// entries upsert by student id (last write wins); the exam status is
    /// not advanced. Belt promotion for passing students is the caller's
    /// follow-up directory write.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] unless the exam is ongoing,
    /// [`EngineError::Validation`] for an invalid batch, or an
    /// authorization/store error.
    pub fn submit_results(
        &self,
        ctx: &RequestContext,
        exam_id: &ExamId,
        entries: &[ResultEntry],
    ) -> Result<Exam, EngineError> {
        self.mutate(exam_id, |exam| {
            ensure_owner(ctx, exam)?;
            if exam.status != ExamStatus::Ongoing {
                return Err(EngineError::InvalidState {
                    exam_id: exam.exam_id.clone(),
                    status: exam.status,
                });
            }
            let mut seen: Vec<&UserId> = Vec::with_capacity(entries.len());
            for entry in entries {
                if seen.contains(&&entry.student_id) {
                    return Err(EngineError::Validation(format!(
                        "duplicate result entry for student {}",
                        entry.student_id
                    )));
                }
                if !exam.is_registered(&entry.student_id) {
                    return Err(EngineError::Validation(format!(
                        "student {} is not a registrant of exam {}",
                        entry.student_id, exam.exam_id
                    )));
                }
                seen.push(&entry.student_id);
            }
            let mut updated = exam.clone();
            for entry in entries {
                updated.results.insert(
                    entry.student_id.clone(),
                    ExamResult {
                        passed: entry.passed,
                        notes: entry.notes.clone(),
                    },
                );
            }
            Ok(updated)
        })
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Deletes an upcoming exam owned by the requesting instructor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Authorization`] for non-owners,
    /// [`EngineError::InvalidState`] once the exam has started, or a store
    /// error.
    pub fn delete_exam(&self, ctx: &RequestContext, exam_id: &ExamId) -> Result<(), EngineError> {
        let mut attempts = 0_u32;
        while attempts < self.config.max_save_retries {
            attempts += 1;
            let Some(versioned) = self.store.load(exam_id)? else {
                return Err(EngineError::ExamNotFound(exam_id.clone()));
            };
            ensure_owner(ctx, &versioned.exam)?;
            if versioned.exam.status != ExamStatus::Upcoming {
                return Err(EngineError::InvalidState {
                    exam_id: exam_id.clone(),
                    status: versioned.exam.status,
                });
            }
            match self.store.delete(exam_id, versioned.version) {
                Ok(()) => return Ok(()),
                Err(StoreError::VersionConflict {
                    ..
                }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Err(EngineError::Contention {
            exam_id: exam_id.clone(),
            attempts,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Loads a single exam.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ExamNotFound`] when absent or a store error.
    pub fn get_exam(&self, _ctx: &RequestContext, exam_id: &ExamId) -> Result<Exam, EngineError> {
        match self.store.load(exam_id)? {
            Some(versioned) => Ok(versioned.exam),
            None => Err(EngineError::ExamNotFound(exam_id.clone())),
        }
    }

    /// Lists exams matching all supplied filter criteria.
    ///
    /// The listing is recomputed per call and ordered by exam date, then
    /// identifier, for deterministic output.
    ///
    /// # Errors
    ///
    /// Returns a store error when listing fails.
    pub fn list_exams(
        &self,
        _ctx: &RequestContext,
        filter: &ExamFilter,
    ) -> Result<Vec<Exam>, EngineError> {
        let mut exams: Vec<Exam> =
            self.store.list()?.into_iter().filter(|exam| filter.matches(exam)).collect();
        exams.sort_by(|a, b| {
            timestamp_sort_key(a.exam_date)
                .cmp(&timestamp_sort_key(b.exam_date))
                .then_with(|| a.exam_id.cmp(&b.exam_id))
        });
        Ok(exams)
    }

    /// Returns registrants of an exam with no recorded result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ExamNotFound`] when absent or a store error.
    pub fn missing_results(
        &self,
        _ctx: &RequestContext,
        exam_id: &ExamId,
    ) -> Result<Vec<UserId>, EngineError> {
        match self.store.load(exam_id)? {
            Some(versioned) => Ok(versioned.exam.registrants_without_results()),
            None => Err(EngineError::ExamNotFound(exam_id.clone())),
        }
    }

    /// Returns a student's recorded results across completed exams.
    ///
    /// Visible to that student or to any instructor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Authorization`] for other students or a store
    /// error.
    pub fn results_for_student(
        &self,
        ctx: &RequestContext,
        student_id: &UserId,
    ) -> Result<Vec<StudentResult>, EngineError> {
        if ctx.role != Role::Instructor && ctx.actor != *student_id {
            return Err(EngineError::Authorization(
                "students may only view their own results".to_string(),
            ));
        }
        let mut results: Vec<StudentResult> = self
            .store
            .list()?
            .into_iter()
            .filter(|exam| exam.status == ExamStatus::Completed)
            .filter_map(|exam| {
                exam.results.get(student_id).map(|result| StudentResult {
                    exam_id: exam.exam_id.clone(),
                    exam_name: exam.name.clone(),
                    exam_date: exam.exam_date,
                    target_belt: exam.target_belt,
                    instructor_id: exam.instructor_id.clone(),
                    result: result.clone(),
                })
            })
            .collect();
        results.sort_by(|a, b| {
            timestamp_sort_key(a.exam_date)
                .cmp(&timestamp_sort_key(b.exam_date))
                .then_with(|| a.exam_id.cmp(&b.exam_id))
        });
        Ok(results)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Resolves an account, mapping absence to a typed not-found error.
    fn lookup_account(&self, user_id: &UserId) -> Result<UserAccount, EngineError> {
        match self.directory.get_user(user_id)? {
            Some(account) => Ok(account),
            None => Err(EngineError::AccountNotFound(user_id.clone())),
        }
    }

    /// Runs a bounded load, apply, compare-and-swap save loop for one exam.
    ///
    /// Domain failures from `apply` are terminal; only a store version
    /// conflict re-runs the read-modify-write with fresh state.
    fn mutate<F>(&self, exam_id: &ExamId, mut apply: F) -> Result<Exam, EngineError>
    where
        F: FnMut(&Exam) -> Result<Exam, EngineError>,
    {
        let mut attempts = 0_u32;
        while attempts < self.config.max_save_retries {
            attempts += 1;
            let Some(versioned) = self.store.load(exam_id)? else {
                return Err(EngineError::ExamNotFound(exam_id.clone()));
            };
            let updated = apply(&versioned.exam)?;
            match self.store.save(&updated, Some(versioned.version)) {
                Ok(_) => return Ok(updated),
                Err(StoreError::VersionConflict {
                    ..
                }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Err(EngineError::Contention {
            exam_id: exam_id.clone(),
            attempts,
        })
    }
}

// ============================================================================
// SECTION: Precondition Helpers
// ============================================================================

/// Verifies the requester is the exam's owning instructor.
fn ensure_owner(ctx: &RequestContext, exam: &Exam) -> Result<(), EngineError> {
    if ctx.role != Role::Instructor {
        return Err(EngineError::Authorization(
            "operation requires the instructor role".to_string(),
        ));
    }
    if ctx.actor != exam.instructor_id {
        return Err(EngineError::Authorization(format!(
            "exam {} is owned by another instructor",
            exam.exam_id
        )));
    }
    Ok(())
}

/// Checks belt rank and training duration against the exam's requirements.
fn check_eligibility(
    exam: &Exam,
    account: &UserAccount,
    now: Timestamp,
) -> Result<(), EngineError> {
    if account.belt_level < exam.eligibility.minimum_belt {
        return Err(EngineError::Eligibility {
            exam_id: exam.exam_id.clone(),
            reason: format!(
                "belt rank {} is below required {}",
                account.belt_level, exam.eligibility.minimum_belt
            ),
        });
    }
    let Some(months) = elapsed_months(account.training_start, now) else {
        return Err(EngineError::Validation(
            "training start and current timestamps must share a kind".to_string(),
        ));
    };
    if months < u64::from(exam.eligibility.minimum_training_months) {
        return Err(EngineError::Eligibility {
            exam_id: exam.exam_id.clone(),
            reason: format!(
                "training duration {} months is below required {}",
                months, exam.eligibility.minimum_training_months
            ),
        });
    }
    Ok(())
}

/// Returns a totally ordered sort key for timestamps of mixed kinds.
///
/// Unix timestamps order before logical timestamps so listings stay stable
/// when a deployment mixes both.
const fn timestamp_sort_key(timestamp: Timestamp) -> (u8, i128) {
    match timestamp {
        Timestamp::UnixMillis(value) => (0, value as i128),
        Timestamp::Logical(value) => (1, value as i128),
    }
}
