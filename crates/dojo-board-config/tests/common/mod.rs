// crates/dojo-board-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for configuration validation tests.
// =============================================================================
//! Shared minimal configuration fixture for validation tests.

use dojo_board_config::AccountConfig;
use dojo_board_config::ConfigError;
use dojo_board_config::DojoBoardConfig;
use dojo_board_core::BeltRank;
use dojo_board_core::Role;

/// Returns a minimal valid configuration with one instructor and one student.
pub fn minimal_config() -> Result<DojoBoardConfig, ConfigError> {
    let config = DojoBoardConfig {
        accounts: vec![
            AccountConfig {
                user_id: "sensei".to_string(),
                full_name: "Sensei Ito".to_string(),
                role: Role::Instructor,
                belt_level: BeltRank::Black,
                training_start_unix_millis: 0,
                token: "token-sensei".to_string(),
            },
            AccountConfig {
                user_id: "aiko".to_string(),
                full_name: "Aiko Tanaka".to_string(),
                role: Role::Student,
                belt_level: BeltRank::Green,
                training_start_unix_millis: 0,
                token: "token-aiko".to_string(),
            },
        ],
        ..DojoBoardConfig::default()
    };
    config.validate()?;
    Ok(config)
}
