//! Roster and server config validation tests for dojo-board-config.
// crates/dojo-board-config/tests/roster_validation.rs
// =============================================================================
// Module: Roster Config Validation Tests
// Description: Validate account roster, server, store, and engine constraints.
// Purpose: Ensure deployment settings fail closed before startup.
// =============================================================================

use dojo_board_config::AccountConfig;
use dojo_board_config::ConfigError;
use dojo_board_config::StoreBackend;
use dojo_board_core::BeltRank;
use dojo_board_core::Role;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn bind_addr_must_parse() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.bind_addr = "not-an-address".to_string();
    assert_invalid(config.validate(), "bind_addr must be a socket address")?;
    Ok(())
}

#[test]
fn request_body_limit_must_be_positive() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.request_body_limit = 0;
    assert_invalid(config.validate(), "request_body_limit must be greater than zero")?;
    Ok(())
}

#[test]
fn engine_retries_must_be_positive() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.engine.max_save_retries = 0;
    assert_invalid(config.validate(), "max_save_retries must be greater than zero")?;
    Ok(())
}

#[test]
fn sqlite_backend_requires_its_section() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.store.backend = StoreBackend::Sqlite;
    config.store.sqlite = None;
    assert_invalid(config.validate(), "sqlite backend requires the [store.sqlite] section")?;
    Ok(())
}

#[test]
fn roster_rejects_duplicate_user_ids() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.accounts.push(AccountConfig {
        user_id: "aiko".to_string(),
        full_name: "Second Aiko".to_string(),
        role: Role::Student,
        belt_level: BeltRank::White,
        training_start_unix_millis: 0,
        token: "token-other".to_string(),
    });
    assert_invalid(config.validate(), "duplicate account user_id")?;
    Ok(())
}

#[test]
fn roster_rejects_duplicate_tokens() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.accounts.push(AccountConfig {
        user_id: "botan".to_string(),
        full_name: "Botan Sato".to_string(),
        role: Role::Student,
        belt_level: BeltRank::White,
        training_start_unix_millis: 0,
        token: "token-aiko".to_string(),
    });
    assert_invalid(config.validate(), "duplicate account token")?;
    Ok(())
}

#[test]
fn roster_rejects_tokens_with_whitespace() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.accounts[0].token = "bad token".to_string();
    assert_invalid(config.validate(), "account token must be non-empty without whitespace")?;
    Ok(())
}

#[test]
fn roster_rejects_blank_names() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.accounts[0].full_name = "   ".to_string();
    assert_invalid(config.validate(), "account full_name must be non-empty")?;
    Ok(())
}

#[test]
fn roster_rejects_blank_user_ids() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.accounts[0].user_id = String::new();
    assert_invalid(config.validate(), "account user_id must be non-empty")?;
    Ok(())
}
