// crates/dojo-board-core/src/core/belt.rs
// ============================================================================
// Module: Belt Rank Model
// Description: Ordered belt ranks and parsing for eligibility and promotion.
// Purpose: Make rank comparisons exhaustive and type-checked.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Belt ranks form a fixed total order: white < yellow < orange < green <
//! blue < brown < black. Eligibility checks and promotion logic compare
//! ranks through [`Ord`] rather than string comparison, so an unknown rank
//! is rejected at the parse boundary instead of silently failing a lookup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Belt Ranks
// ============================================================================

/// Belt rank in ascending proficiency order.
///
/// # Invariants
/// - Variant declaration order is the canonical total order; `Ord` derives
///   from it and must never be reordered.
/// - Wire form is the lowercase rank name and is stable for serialization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BeltRank {
    /// White belt (entry rank).
    White,
    /// Yellow belt.
    Yellow,
    /// Orange belt.
    Orange,
    /// Green belt.
    Green,
    /// Blue belt.
    Blue,
    /// Brown belt.
    Brown,
    /// Black belt (terminal rank).
    Black,
}

impl BeltRank {
    /// All ranks in ascending order.
    pub const ALL: [Self; 7] = [
        Self::White,
        Self::Yellow,
        Self::Orange,
        Self::Green,
        Self::Blue,
        Self::Brown,
        Self::Black,
    ];

    /// Returns the stable lowercase label for the rank.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Brown => "brown",
            Self::Black => "black",
        }
    }

    /// Returns the next rank in the promotion order, or `None` at black belt.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::White => Some(Self::Yellow),
            Self::Yellow => Some(Self::Orange),
            Self::Orange => Some(Self::Green),
            Self::Green => Some(Self::Blue),
            Self::Blue => Some(Self::Brown),
            Self::Brown => Some(Self::Black),
            Self::Black => None,
        }
    }
}

impl fmt::Display for BeltRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Error returned when a belt rank label is not recognized.
///
/// # Invariants
/// - The embedded label is echoed verbatim for caller diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown belt rank: {0}")]
pub struct BeltRankParseError(pub String);

impl FromStr for BeltRank {
    type Err = BeltRankParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "white" => Ok(Self::White),
            "yellow" => Ok(Self::Yellow),
            "orange" => Ok(Self::Orange),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "brown" => Ok(Self::Brown),
            "black" => Ok(Self::Black),
            other => Err(BeltRankParseError(other.to_string())),
        }
    }
}
