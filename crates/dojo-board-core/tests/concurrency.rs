// crates/dojo-board-core/tests/concurrency.rs
// ============================================================================
// Module: Concurrency Tests
// Description: Racing registrations against the compare-and-swap save path.
// ============================================================================
//! ## Overview
//! Validates that capacity enforcement holds under concurrent registration:
//! the version check serializes racing writers on one exam, so the capacity
//! check and the registrant insert always commit as one step.

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

use std::sync::Arc;
use std::thread;

use dojo_board_core::BeltRank;
use dojo_board_core::CreateExamRequest;
use dojo_board_core::Eligibility;
use dojo_board_core::EngineConfig;
use dojo_board_core::EngineError;
use dojo_board_core::ExamEngine;
use dojo_board_core::ExamId;
use dojo_board_core::InMemoryAccountDirectory;
use dojo_board_core::InMemoryExamStore;
use dojo_board_core::RequestContext;
use dojo_board_core::Role;
use dojo_board_core::Timestamp;
use dojo_board_core::UserAccount;
use dojo_board_core::UserId;

fn student(id: &str) -> UserAccount {
    UserAccount {
        user_id: UserId::new(id),
        full_name: format!("{id} name"),
        role: Role::Student,
        belt_level: BeltRank::Green,
        training_start: Timestamp::Logical(0),
    }
}

#[test]
fn racing_registrations_never_exceed_capacity() {
    const STUDENTS: usize = 8;
    const CAPACITY: u32 = 1;

    let mut accounts = vec![UserAccount {
        user_id: UserId::new("sensei"),
        full_name: "sensei name".to_string(),
        role: Role::Instructor,
        belt_level: BeltRank::Black,
        training_start: Timestamp::Logical(0),
    }];
    for index in 0 .. STUDENTS {
        accounts.push(student(&format!("student-{index}")));
    }
    let directory = InMemoryAccountDirectory::with_accounts(accounts);
    let engine = Arc::new(
        ExamEngine::new(
            InMemoryExamStore::new(),
            directory,
            EngineConfig {
                // Enough retries that every loser observes the winner's write.
                max_save_retries: STUDENTS as u32 + 1,
            },
        )
        .expect("engine config is valid"),
    );

    let owner = RequestContext::instructor("sensei");
    let exam_id = ExamId::new("exam-1");
    engine
        .create_exam(
            &owner,
            &CreateExamRequest {
                exam_id: exam_id.clone(),
                name: "Blue Belt Promotion".to_string(),
                exam_date: Timestamp::Logical(20),
                target_belt: BeltRank::Blue,
                max_registrants: CAPACITY,
                eligibility: Eligibility {
                    minimum_belt: BeltRank::White,
                    minimum_training_months: 0,
                },
            },
            Timestamp::Logical(1),
        )
        .unwrap();

    let handles: Vec<_> = (0 .. STUDENTS)
        .map(|index| {
            let engine = Arc::clone(&engine);
            let exam_id = exam_id.clone();
            thread::spawn(move || {
                let ctx = RequestContext::student(format!("student-{index}"));
                engine.register_student(&ctx, &exam_id, Timestamp::Logical(2))
            })
        })
        .collect();

    let mut successes = 0_u32;
    let mut capacity_errors = 0_u32;
    for handle in handles {
        match handle.join().expect("registration thread panicked") {
            Ok(_) => successes += 1,
            Err(EngineError::Capacity {
                max_registrants, ..
            }) => {
                assert_eq!(max_registrants, CAPACITY);
                capacity_errors += 1;
            }
            Err(other) => panic!("unexpected registration error: {other:?}"),
        }
    }
    assert_eq!(successes, CAPACITY);
    assert_eq!(capacity_errors, STUDENTS as u32 - CAPACITY);

    let exam = engine.get_exam(&owner, &exam_id).unwrap();
    assert_eq!(exam.registrants.len(), CAPACITY as usize);
}

#[test]
fn racing_registrations_all_land_when_capacity_allows() {
    const STUDENTS: usize = 6;

    let mut accounts = vec![UserAccount {
        user_id: UserId::new("sensei"),
        full_name: "sensei name".to_string(),
        role: Role::Instructor,
        belt_level: BeltRank::Black,
        training_start: Timestamp::Logical(0),
    }];
    for index in 0 .. STUDENTS {
        accounts.push(student(&format!("student-{index}")));
    }
    let directory = InMemoryAccountDirectory::with_accounts(accounts);
    let engine = Arc::new(
        ExamEngine::new(
            InMemoryExamStore::new(),
            directory,
            EngineConfig {
                max_save_retries: STUDENTS as u32 + 1,
            },
        )
        .expect("engine config is valid"),
    );

    let owner = RequestContext::instructor("sensei");
    let exam_id = ExamId::new("exam-1");
    engine
        .create_exam(
            &owner,
            &CreateExamRequest {
                exam_id: exam_id.clone(),
                name: "Blue Belt Promotion".to_string(),
                exam_date: Timestamp::Logical(20),
                target_belt: BeltRank::Blue,
                max_registrants: STUDENTS as u32,
                eligibility: Eligibility {
                    minimum_belt: BeltRank::White,
                    minimum_training_months: 0,
                },
            },
            Timestamp::Logical(1),
        )
        .unwrap();

    let handles: Vec<_> = (0 .. STUDENTS)
        .map(|index| {
            let engine = Arc::clone(&engine);
            let exam_id = exam_id.clone();
            thread::spawn(move || {
                let ctx = RequestContext::student(format!("student-{index}"));
                engine.register_student(&ctx, &exam_id, Timestamp::Logical(2))
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("registration thread panicked").unwrap();
    }

    let exam = engine.get_exam(&owner, &exam_id).unwrap();
    assert_eq!(exam.registrants.len(), STUDENTS);
    // Every registrant appears exactly once.
    let mut unique = exam.registrants.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), STUDENTS);
}
