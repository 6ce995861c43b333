//! Lexicographic sibling ranks.
//!
//! # Responsibility
//! - Define the validated `Rank` key used to order columns and tasks.
//! - Allocate a new rank strictly between two bounds by alphabet bisection.
//!
//! # Invariants
//! - Ranks only contain `a..=z` and never end in `a`.
//! - `allocate(lower, upper)` is pure: no I/O, no state.
//! - Ranks are never compacted once allocated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static RANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]*[b-z]$").expect("valid rank regex"));

const MIN_SYMBOL: u8 = b'a';
/// Virtual symbol one past `z`, used for an open or exhausted upper side.
const BEYOND_MAX: u8 = 26;

/// Sortable sibling key. Ascending string order equals display order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rank(String);

/// Rejected rank text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankError {
    value: String,
}

impl Display for RankError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid rank `{}`: expected a..z symbols not ending in `a`",
            self.value
        )
    }
}

impl Error for RankError {}

impl Rank {
    /// Parses persisted or client-provided rank text.
    pub fn parse(value: impl Into<String>) -> Result<Self, RankError> {
        let value = value.into();
        if RANK_RE.is_match(value.as_str()) {
            Ok(Self(value))
        } else {
            Err(RankError { value })
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn symbol(&self, position: usize) -> Option<u8> {
        let byte = self.0.as_bytes().get(position)?;
        Some(byte - MIN_SYMBOL)
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for Rank {
    type Error = RankError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Rank> for String {
    fn from(value: Rank) -> Self {
        value.0
    }
}

/// One side of an allocation interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound<'a> {
    /// No neighbour on this side: the start or end of the sequence.
    Unbounded,
    /// Rank of the existing neighbour on this side.
    Bounded(&'a Rank),
}

impl<'a> From<Option<&'a Rank>> for Bound<'a> {
    fn from(value: Option<&'a Rank>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

/// Returns a rank strictly between `lower` and `upper`.
///
/// Scans position by position. The lower side reads as `a` once unbounded or
/// exhausted; the upper side reads as the virtual symbol past `z` once
/// unbounded, exhausted, or already left behind by the emitted prefix. A gap
/// of two or more fixes the position to its midpoint and ends the scan;
/// otherwise the lower symbol is copied and the decision moves right.
///
/// # Contract
/// - Callers pass `lower < upper` when both are bounded.
/// - `allocate(Unbounded, Unbounded)` always returns `"n"`.
pub fn allocate(lower: Bound<'_>, upper: Bound<'_>) -> Rank {
    if let (Bound::Bounded(lower), Bound::Bounded(upper)) = (lower, upper) {
        debug_assert!(lower < upper, "allocate requires lower < upper");
    }

    let mut symbols: Vec<u8> = Vec::new();
    let mut below_upper = matches!(upper, Bound::Unbounded);
    let mut position = 0;
    loop {
        let low = match lower {
            Bound::Bounded(rank) => rank.symbol(position).unwrap_or(0),
            Bound::Unbounded => 0,
        };
        let high = match upper {
            Bound::Bounded(rank) if !below_upper => rank.symbol(position).unwrap_or(BEYOND_MAX),
            _ => BEYOND_MAX,
        };

        if high >= low + 2 {
            symbols.push(low + (high - low) / 2);
            break;
        }

        symbols.push(low);
        if high > low {
            below_upper = true;
        }
        position += 1;
    }

    Rank(
        symbols
            .into_iter()
            .map(|symbol| char::from(MIN_SYMBOL + symbol))
            .collect(),
    )
}
