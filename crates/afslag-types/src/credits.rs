//! Credit amounts
//!
//! Every price and budget in the market is a whole number of credits.
//! The newtype keeps prices from mixing with round counters and makes
//! underflow explicit through checked arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A whole-credit amount (no fractional units)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(pub u64);

impl Credits {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// A percentage of this amount, rounded down (0-100)
    pub fn percent(self, pct: u64) -> Self {
        Self(self.0 * pct / 100)
    }

    /// This amount repeated `n` times
    pub fn times(self, n: u64) -> Self {
        Self(self.0 * n)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Credits {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Credits {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Credits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, c| acc + c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_sub() {
        let a = Credits::new(100);
        let b = Credits::new(30);

        assert_eq!(a.checked_sub(b), Some(Credits::new(70)));
        assert_eq!(b.checked_sub(a), None);
    }

    #[test]
    fn test_saturating_sub() {
        let a = Credits::new(10);
        let b = Credits::new(25);

        assert_eq!(b.saturating_sub(a), Credits::new(15));
        assert_eq!(a.saturating_sub(b), Credits::zero());
    }

    #[test]
    fn test_percent() {
        let budget = Credits::new(100);

        assert_eq!(budget.percent(30), Credits::new(30));
        assert_eq!(Credits::new(15).percent(40), Credits::new(6));
        assert_eq!(budget.percent(0), Credits::zero());
    }

    #[test]
    fn test_sum() {
        let reserved: Credits = [Credits::new(20), Credits::new(15), Credits::new(5)]
            .into_iter()
            .sum();
        assert_eq!(reserved, Credits::new(40));
    }

    #[test]
    fn test_serde_transparent() {
        let c = Credits::new(42);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "42");
        let back: Credits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
