// crates/dojo-board-server/src/auth.rs
// ============================================================================
// Module: Bearer Token Authentication
// Description: Static bearer-token principal table from the config roster.
// Purpose: Resolve request credentials into an engine RequestContext.
// Dependencies: axum, dojo-board-config, dojo-board-core
// ============================================================================

//! ## Overview
//! Authentication resolves the `Authorization: Bearer <token>` header against
//! the static token table seeded from configuration. The resolved account
//! becomes the [`RequestContext`] for the engine call; the role always comes
//! from the directory record, never from the request. Tokens are lookup keys
//! only and are never logged or echoed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use dojo_board_config::DojoBoardConfig;
use dojo_board_core::AccountDirectory;
use dojo_board_core::InMemoryAccountDirectory;
use dojo_board_core::RequestContext;
use dojo_board_core::UserId;

use crate::error::ApiError;

// ============================================================================
// SECTION: Token Table
// ============================================================================

/// Static bearer-token principal table.
///
/// # Invariants
/// - Tokens map to exactly one account (uniqueness enforced by config
///   validation).
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    /// Token to account identifier mapping.
    tokens: HashMap<String, UserId>,
}

impl TokenTable {
    /// Builds the token table from the configured account roster.
    #[must_use]
    pub fn from_config(config: &DojoBoardConfig) -> Self {
        let tokens = config
            .accounts
            .iter()
            .map(|account| (account.token.clone(), UserId::new(account.user_id.clone())))
            .collect();
        Self {
            tokens,
        }
    }

    /// Resolves a bearer token to an account identifier.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&UserId> {
        self.tokens.get(token)
    }
}

// ============================================================================
// SECTION: Request Authentication
// ============================================================================

/// Extracts the bearer token from request headers.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim).filter(|token| !token.is_empty())
}

/// Authenticates a request against the token table and account directory.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a missing or unknown token, or an
/// engine-mapped error when the directory lookup fails.
pub fn authenticate(
    table: &TokenTable,
    directory: &InMemoryAccountDirectory,
    headers: &HeaderMap,
) -> Result<RequestContext, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    let user_id = table.resolve(token).ok_or(ApiError::Unauthorized)?;
    let account = directory
        .get_user(user_id)
        .map_err(dojo_board_core::EngineError::from)?
        .ok_or(ApiError::Unauthorized)?;
    Ok(RequestContext {
        actor: account.user_id,
        role: account.role,
    })
}
