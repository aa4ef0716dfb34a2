//! Config load validation tests for dojo-board-config.
// crates/dojo-board-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use dojo_board_config::ConfigError;
use dojo_board_config::DojoBoardConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<DojoBoardConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(DojoBoardConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(DojoBoardConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(DojoBoardConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(DojoBoardConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[server]\nbind_addr = \"127.0.0.1:8080\"\nunknown_field = 1\n")
        .map_err(|err| err.to_string())?;
    match DojoBoardConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse failure for unknown field".to_string()),
    }
}

#[test]
fn load_accepts_a_minimal_roster() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(
        b"[[accounts]]\n\
          user_id = \"sensei\"\n\
          full_name = \"Sensei Ito\"\n\
          role = \"instructor\"\n\
          belt_level = \"black\"\n\
          training_start_unix_millis = 0\n\
          token = \"token-sensei\"\n",
    )
    .map_err(|err| err.to_string())?;
    let config = DojoBoardConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.accounts.len() == 1 && config.server.bind_addr == "127.0.0.1:8080" {
        Ok(())
    } else {
        Err("loaded config did not apply defaults".to_string())
    }
}
