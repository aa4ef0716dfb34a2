// crates/dojo-board-core/src/core/hashing.rs
// ============================================================================
// Module: Canonical Hashing
// Description: Canonical JSON serialization and digests for stored snapshots.
// Purpose: Give persistence layers a stable integrity check for exam records.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Stored exam snapshots are serialized as canonical JSON (RFC 8785 JCS) and
//! hashed before persistence. Loads recompute the digest and fail closed on
//! mismatch, so corrupted or hand-edited rows never deserialize silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Algorithms
// ============================================================================

/// Hash algorithm used for the digest value.
///
/// # Invariants
/// - Labels are stable for storage and must round-trip through
///   [`HashAlgorithm::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

/// Default hash algorithm for new snapshots.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

impl HashAlgorithm {
    /// Returns the stable storage label for the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Parses a stored algorithm label.
    ///
    /// # Errors
    ///
    /// Returns [`HashingError::UnknownAlgorithm`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, HashingError> {
        match label {
            "sha256" => Ok(Self::Sha256),
            other => Err(HashingError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Hashing and canonicalization errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HashingError {
    /// Canonical JSON serialization failed.
    #[error("canonical json serialization failed: {0}")]
    Canonicalize(String),
    /// Stored algorithm label is not recognized.
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

// ============================================================================
// SECTION: Digests
// ============================================================================

/// Digest value with its producing algorithm.
///
/// # Invariants
/// - `value` is lowercase hexadecimal for the configured algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced the digest.
    pub algorithm: HashAlgorithm,
    /// Lowercase hexadecimal digest value.
    pub value: String,
}

/// Serializes a value as canonical JSON (JCS) bytes.
///
/// # Errors
///
/// Returns [`HashingError::Canonicalize`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, HashingError> {
    serde_jcs::to_vec(value).map_err(|err| HashingError::Canonicalize(err.to_string()))
}

/// Hashes bytes with the given algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    let value = match algorithm {
        HashAlgorithm::Sha256 => hex_lower(&Sha256::digest(bytes)),
    };
    HashDigest {
        algorithm,
        value,
    }
}

/// Encodes bytes as lowercase hexadecimal.
fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}
