//! Arbitrary precision transfer amount

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must be a non-negative base-10 integer:: {0}")]
    NotDecimal(String),

    #[error("amount has {0} digits, at most {} are allowed", MAX_DIGITS)]
    TooLong(usize),
}

/// Digits in the largest uint256, the widest value a transaction can carry
pub const MAX_DIGITS: usize = 78;

/// Non-negative integer amount of native currency, in base units.
///
/// Values routinely exceed `u64` (wei), so the amount is kept as a big integer
/// and crosses the wire as a decimal string.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    /// Zero value
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(n: u64) -> Self {
        Self(BigUint::from(n))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a decimal string. Only ASCII digits are accepted: no sign, no
    /// exponent, no separators, no hex prefix. Input longer than
    /// [`MAX_DIGITS`] is rejected before any big integer work.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.len() > MAX_DIGITS {
            return Err(AmountError::TooLong(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::NotDecimal(s.to_string()));
        }
        BigUint::from_str(s)
            .map(Self)
            .map_err(|_| AmountError::NotDecimal(s.to_string()))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Self::from_u64(n)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(serde::de::Error::custom)
    }
}
