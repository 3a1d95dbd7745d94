//! Vote weight arithmetic.
//!
//! Weights are fixed-point integers (u128) to avoid floating-point errors.
//! Thresholds (quorum, approval, creation) are expressed in basis points of a
//! total-supply-equivalent and computed with [`VoteWeight::scale_bps`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// One hundred percent, in basis points.
pub const MAX_BPS: u32 = 10_000;

/// A voting weight or tally accumulator.
///
/// Internally stored as raw units (u128) for precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoteWeight(u128);

impl VoteWeight {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `floor(raw * bps / 10_000)` without overflowing u128.
    ///
    /// Splitting into quotient and remainder keeps every intermediate product
    /// within u128 for any raw value, as long as `bps <= MAX_BPS`.
    pub fn scale_bps(self, bps: u32) -> Self {
        debug_assert!(bps <= MAX_BPS, "basis points above 100%");
        let bps = bps as u128;
        let base = MAX_BPS as u128;
        Self((self.0 / base) * bps + (self.0 % base) * bps / base)
    }
}

impl Add for VoteWeight {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for VoteWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
