// crates/dojo-board-core/tests/results.rs
// ============================================================================
// Module: Grading and Deletion Tests
// Description: Result submission batches, missing results, and deletion rules.
// ============================================================================
//! ## Overview
//! Validates whole-batch grading semantics and the narrow deletion window.

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
use dojo_board_core::ResultEntry;
use dojo_board_core::Role;
use dojo_board_core::Timestamp;
use dojo_board_core::UserAccount;
use dojo_board_core::UserId;

fn account(id: &str, role: Role, belt: BeltRank) -> UserAccount {
    UserAccount {
        user_id: UserId::new(id),
        full_name: format!("{id} name"),
        role,
        belt_level: belt,
        training_start: Timestamp::Logical(0),
    }
}

fn engine() -> ExamEngine<InMemoryExamStore, InMemoryAccountDirectory> {
    let directory = InMemoryAccountDirectory::with_accounts([
        account("sensei", Role::Instructor, BeltRank::Black),
        account("rival", Role::Instructor, BeltRank::Black),
        account("aiko", Role::Student, BeltRank::Green),
        account("botan", Role::Student, BeltRank::Green),
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
            minimum_training_months: 0,
        },
    }
}

fn entry(student: &str, passed: bool, notes: &str) -> ResultEntry {
    ResultEntry {
        student_id: UserId::new(student),
        passed,
        notes: notes.to_string(),
    }
}

/// Creates an exam with "aiko" and "botan" registered, in the given status.
fn exam_in_status(
    engine: &ExamEngine<InMemoryExamStore, InMemoryAccountDirectory>,
    exam_id: &str,
    status: ExamStatus,
) -> ExamId {
    let owner = RequestContext::instructor("sensei");
    let id = ExamId::new(exam_id);
    engine.create_exam(&owner, &request(exam_id), Timestamp::Logical(1)).unwrap();
    engine.register_student(&RequestContext::student("aiko"), &id, Timestamp::Logical(2)).unwrap();
    engine
        .register_student(&RequestContext::student("botan"), &id, Timestamp::Logical(2))
        .unwrap();
    if status != ExamStatus::Upcoming {
        engine.change_status(&owner, &id, ExamStatus::Ongoing).unwrap();
    }
    if status == ExamStatus::Completed {
        engine.change_status(&owner, &id, ExamStatus::Completed).unwrap();
    }
    id
}

#[test]
fn submission_requires_an_ongoing_exam() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let batch = vec![entry("aiko", true, "solid form")];

    let upcoming = exam_in_status(&engine, "exam-up", ExamStatus::Upcoming);
    assert!(matches!(
        engine.submit_results(&owner, &upcoming, &batch),
        Err(EngineError::InvalidState {
            status: ExamStatus::Upcoming,
            ..
        })
    ));

    let completed = exam_in_status(&engine, "exam-done", ExamStatus::Completed);
    assert!(matches!(
        engine.submit_results(&owner, &completed, &batch),
        Err(EngineError::InvalidState {
            status: ExamStatus::Completed,
            ..
        })
    ));
}

#[test]
fn submission_records_results_and_upserts_on_resubmit() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Ongoing);

    let first = engine
        .submit_results(
            &owner,
            &exam_id,
            &[entry("aiko", false, "kata incomplete"), entry("botan", true, "clean break")],
        )
        .unwrap();
    assert_eq!(first.results.len(), 2);
    assert!(!first.results.get(&UserId::new("aiko")).unwrap().passed);

    // A later entry for the same student replaces the earlier result.
    let second =
        engine.submit_results(&owner, &exam_id, &[entry("aiko", true, "retest passed")]).unwrap();
    assert_eq!(second.results.len(), 2);
    let aiko = second.results.get(&UserId::new("aiko")).unwrap();
    assert!(aiko.passed);
    assert_eq!(aiko.notes, "retest passed");
    assert!(second.results.get(&UserId::new("botan")).unwrap().passed);
}

#[test]
fn non_registrant_entry_voids_the_whole_batch() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Ongoing);

    let err = engine
        .submit_results(&owner, &exam_id, &[entry("aiko", true, "ok"), entry("ghost", true, "")])
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Nothing from the rejected batch was applied.
    let exam = engine.get_exam(&owner, &exam_id).unwrap();
    assert!(exam.results.is_empty());
}

#[test]
fn duplicate_entry_voids_the_whole_batch() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Ongoing);

    let err = engine
        .submit_results(
            &owner,
            &exam_id,
            &[entry("aiko", true, "first"), entry("aiko", false, "second")],
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.get_exam(&owner, &exam_id).unwrap().results.is_empty());
}

#[test]
fn submission_requires_the_owning_instructor() {
    let engine = engine();
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Ongoing);

    let err = engine
        .submit_results(&RequestContext::instructor("rival"), &exam_id, &[entry(
            "aiko", true, "ok",
        )])
        .unwrap_err();
    assert!(matches!(err, EngineError::Authorization(_)));
}

#[test]
fn missing_results_lists_ungraded_registrants_in_order() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Ongoing);

    let missing = engine.missing_results(&owner, &exam_id).unwrap();
    assert_eq!(missing, vec![UserId::new("aiko"), UserId::new("botan")]);

    engine.submit_results(&owner, &exam_id, &[entry("aiko", true, "ok")]).unwrap();
    let missing = engine.missing_results(&owner, &exam_id).unwrap();
    assert_eq!(missing, vec![UserId::new("botan")]);

    engine.submit_results(&owner, &exam_id, &[entry("botan", false, "retry")]).unwrap();
    assert!(engine.missing_results(&owner, &exam_id).unwrap().is_empty());
}

#[test]
fn completion_is_permitted_with_results_outstanding() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Ongoing);

    engine.submit_results(&owner, &exam_id, &[entry("aiko", true, "ok")]).unwrap();
    let exam = engine.change_status(&owner, &exam_id, ExamStatus::Completed).unwrap();
    assert_eq!(exam.status, ExamStatus::Completed);
    assert_eq!(engine.missing_results(&owner, &exam_id).unwrap(), vec![UserId::new("botan")]);
}

#[test]
fn delete_removes_an_upcoming_exam() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Upcoming);

    engine.delete_exam(&owner, &exam_id).unwrap();
    assert!(matches!(
        engine.get_exam(&owner, &exam_id),
        Err(EngineError::ExamNotFound(_))
    ));
}

#[test]
fn delete_is_rejected_once_the_exam_starts() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");

    let ongoing = exam_in_status(&engine, "exam-on", ExamStatus::Ongoing);
    assert!(matches!(
        engine.delete_exam(&owner, &ongoing),
        Err(EngineError::InvalidState {
            status: ExamStatus::Ongoing,
            ..
        })
    ));

    let completed = exam_in_status(&engine, "exam-done", ExamStatus::Completed);
    assert!(matches!(
        engine.delete_exam(&owner, &completed),
        Err(EngineError::InvalidState {
            status: ExamStatus::Completed,
            ..
        })
    ));
}

#[test]
fn delete_requires_the_owning_instructor() {
    let engine = engine();
    let exam_id = exam_in_status(&engine, "exam-1", ExamStatus::Upcoming);

    assert!(matches!(
        engine.delete_exam(&RequestContext::instructor("rival"), &exam_id),
        Err(EngineError::Authorization(_))
    ));
    assert!(matches!(
        engine.delete_exam(&RequestContext::student("aiko"), &exam_id),
        Err(EngineError::Authorization(_))
    ));
}

#[test]
fn delete_reports_unknown_exam() {
    let engine = engine();
    let owner = RequestContext::instructor("sensei");
    assert!(matches!(
        engine.delete_exam(&owner, &ExamId::new("missing")),
        Err(EngineError::ExamNotFound(_))
    ));
}
