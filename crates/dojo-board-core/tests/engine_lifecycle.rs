// crates/dojo-board-core/tests/engine_lifecycle.rs
// ============================================================================
// Module: Exam Lifecycle Tests
// Description: Creation, ownership, and status state machine coverage.
// ============================================================================
//! ## Overview
//! Validates exam creation rules and the monotonic status state machine.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use dojo_board_core::BeltRank;
use dojo_board_core::CreateExamRequest;
use dojo_board_core::Eligibility;
use dojo_board_core::EngineConfig;
use dojo_board_core::EngineError;
use dojo_board_core::ExamEngine;
use dojo_board_core::ExamId;
use dojo_board_core::ExamStatus;
use dojo_board_core::InMemoryAccountDirectory;
use dojo_board_core::InMemoryExamStore;
use dojo_board_core::RequestContext;
use dojo_board_core::Role;
use dojo_board_core::Timestamp;
use dojo_board_core::UserAccount;
use dojo_board_core::UserId;

fn account(id: &str, role: Role, belt: BeltRank, start_tick: u64) -> UserAccount {
    UserAccount {
        user_id: UserId::new(id),
        full_name: format!("{id} name"),
        role,
        belt_level: belt,
        training_start: Timestamp::Logical(start_tick),
    }
}

fn engine() -> ExamEngine<InMemoryExamStore, InMemoryAccountDirectory> {
    let directory = InMemoryAccountDirectory::with_accounts([
        account("sensei", Role::Instructor, BeltRank::Black, 0),
        account("rival", Role::Instructor, BeltRank::Black, 0),
        account("aiko", Role::Student, BeltRank::Green, 0),
    ]);
    ExamEngine::new(InMemoryExamStore::new(), directory, EngineConfig::default())
        .expect("engine config is valid")
}

fn request(exam_id: &str) -> CreateExamRequest {
    CreateExamRequest {
        exam_id: ExamId::new(exam_id),
        name: "Blue Belt Promotion".to_string(),
        exam_date: Timestamp::Logical(20),
        target_belt: BeltRank::Blue,
        max_registrants: 10,
        eligibility: Eligibility {
            minimum_belt: BeltRank::Green,
            minimum_training_months: 6,
        },
    }
}

#[test]
fn create_exam_starts_upcoming_and_owned_by_creator() {
    let engine = engine();
    let ctx = RequestContext::instructor("sensei");
    let exam = engine.create_exam(&ctx, &request("exam-1"), Timestamp::Logical(1)).unwrap();
    assert_eq!(exam.status, ExamStatus::Upcoming);
    assert_eq!(exam.instructor_id, UserId::new("sensei"));
    assert!(exam.registrants.is_empty());
    assert!(exam.results.is_empty());
    assert_eq!(exam.created_at, Timestamp::Logical(1));
}

#[test]
fn create_exam_rejects_students() {
    let engine = engine();
    let ctx = RequestContext::student("aiko");
    let err = engine.create_exam(&ctx, &request("exam-1"), Timestamp::Logical(1)).unwrap_err();
    assert!(matches!(err, EngineError::Authorization(_)));
}

#[test]
fn create_exam_rejects_blank_name_and_zero_capacity() {
    let engine = engine();
    let ctx = RequestContext::instructor("sensei");
    let mut blank = request("exam-1");
    blank.name = "   ".to_string();
    assert!(matches!(
        engine.create_exam(&ctx, &blank, Timestamp::Logical(1)),
        Err(EngineError::Validation(_))
    ));
    let mut empty = request("exam-2");
    empty.max_registrants = 0;
    assert!(matches!(
        engine.create_exam(&ctx, &empty, Timestamp::Logical(1)),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn create_exam_rejects_duplicate_identifier() {
    let engine = engine();
    let ctx = RequestContext::instructor("sensei");
    engine.create_exam(&ctx, &request("exam-1"), Timestamp::Logical(1)).unwrap();
    let err = engine.create_exam(&ctx, &request("exam-1"), Timestamp::Logical(2)).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn status_advances_through_legal_transitions() {
    let engine = engine();
    let ctx = RequestContext::instructor("sensei");
    let exam_id = ExamId::new("exam-1");
    engine.create_exam(&ctx, &request("exam-1"), Timestamp::Logical(1)).unwrap();

    let ongoing = engine.change_status(&ctx, &exam_id, ExamStatus::Ongoing).unwrap();
    assert_eq!(ongoing.status, ExamStatus::Ongoing);

    let completed = engine.change_status(&ctx, &exam_id, ExamStatus::Completed).unwrap();
    assert_eq!(completed.status, ExamStatus::Completed);
}

#[test]
fn status_rejects_skips_noops_and_reversals() {
    let engine = engine();
    let ctx = RequestContext::instructor("sensei");
    let exam_id = ExamId::new("exam-1");
    engine.create_exam(&ctx, &request("exam-1"), Timestamp::Logical(1)).unwrap();

    assert!(matches!(
        engine.change_status(&ctx, &exam_id, ExamStatus::Completed),
        Err(EngineError::InvalidTransition {
            from: ExamStatus::Upcoming,
            to: ExamStatus::Completed,
        })
    ));
    assert!(matches!(
        engine.change_status(&ctx, &exam_id, ExamStatus::Upcoming),
        Err(EngineError::InvalidTransition { .. })
    ));

    engine.change_status(&ctx, &exam_id, ExamStatus::Ongoing).unwrap();
    engine.change_status(&ctx, &exam_id, ExamStatus::Completed).unwrap();
    assert!(matches!(
        engine.change_status(&ctx, &exam_id, ExamStatus::Ongoing),
        Err(EngineError::InvalidTransition {
            from: ExamStatus::Completed,
            to: ExamStatus::Ongoing,
        })
    ));
}

#[test]
fn status_change_requires_the_owning_instructor() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let exam_id = ExamId::new("exam-1");
    engine.create_exam(&owner, &request("exam-1"), Timestamp::Logical(1)).unwrap();

    let other = RequestContext::instructor("rival");
    assert!(matches!(
        engine.change_status(&other, &exam_id, ExamStatus::Ongoing),
        Err(EngineError::Authorization(_))
    ));

    let student = RequestContext::student("aiko");
    assert!(matches!(
        engine.change_status(&student, &exam_id, ExamStatus::Ongoing),
        Err(EngineError::Authorization(_))
    ));
}

#[test]
fn get_exam_reports_not_found() {
    let engine = engine();
    let ctx = RequestContext::instructor("sensei");
    let err = engine.get_exam(&ctx, &ExamId::new("missing")).unwrap_err();
    assert!(matches!(err, EngineError::ExamNotFound(_)));
}

#[test]
fn engine_rejects_zero_retry_budget() {
    let directory = InMemoryAccountDirectory::new();
    let err = ExamEngine::new(
        InMemoryExamStore::new(),
        directory,
        EngineConfig {
            max_save_retries: 0,
        },
    )
    .err();
    assert!(matches!(err, Some(EngineError::Validation(_))));
}
