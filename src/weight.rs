//! Exact positive weights.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_integer::Integer;

use crate::error::{LotteryError, Result};

/// A strictly positive rational weight, always stored in lowest terms.
///
/// Used both for ratio-map entries (`79`, `0.5`) and for boost factors
/// (`2`, `1.5`). Zero, negative and non-finite values cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weight {
    numer: u64,
    denom: u64,
}

impl Weight {
    pub const ONE: Weight = Weight { numer: 1, denom: 1 };

    /// `numer / denom`, reduced.
    ///
    /// # Errors
    /// [`LotteryError::InvalidRatio`] if either part is zero.
    pub fn new(numer: u64, denom: u64) -> Result<Self> {
        if denom == 0 {
            return Err(LotteryError::invalid("weight denominator is zero"));
        }
        if numer == 0 {
            return Err(LotteryError::invalid("weight must be positive, got 0"));
        }
        let g = numer.gcd(&denom);
        Ok(Self {
            numer: numer / g,
            denom: denom / g,
        })
    }

    /// A whole-number weight.
    pub fn integer(n: u64) -> Result<Self> {
        Self::new(n, 1)
    }

    /// `mantissa / 10^places`, e.g. `decimal(25, 1)` is `2.5`.
    pub fn decimal(mantissa: u64, places: u32) -> Result<Self> {
        let denom = 10u64.checked_pow(places).ok_or(LotteryError::Overflow)?;
        Self::new(mantissa, denom)
    }

    pub fn numer(&self) -> u64 {
        self.numer
    }

    pub fn denom(&self) -> u64 {
        self.denom
    }

    pub fn is_integer(&self) -> bool {
        self.denom == 1
    }

    /// Number of fractional digits when written as a terminating decimal,
    /// `None` if the expansion repeats (e.g. `1/3`).
    fn decimal_places(&self) -> Option<u32> {
        let mut d = self.denom;
        let (mut twos, mut fives) = (0u32, 0u32);
        while d % 2 == 0 {
            d /= 2;
            twos += 1;
        }
        while d % 5 == 0 {
            d /= 5;
            fives += 1;
        }
        (d == 1).then_some(twos.max(fives))
    }

    /// Split into `(value, scale)` with `value / scale == self`, where `scale`
    /// is the smallest power of ten that makes `value` whole.
    ///
    /// Weights with a repeating decimal expansion use their denominator as
    /// the scale instead. Integers come back as `(n, 1)`.
    ///
    /// # Errors
    /// [`LotteryError::Overflow`] if the scaled value does not fit `u64`.
    pub fn to_integer(&self) -> Result<(u64, u64)> {
        let scale = match self.decimal_places() {
            Some(places) => 10u64.checked_pow(places).ok_or(LotteryError::Overflow)?,
            None => self.denom,
        };
        let value = self
            .numer
            .checked_mul(scale / self.denom)
            .ok_or(LotteryError::Overflow)?;
        Ok((value, scale))
    }
}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.numer as u128 * other.denom as u128;
        let rhs = other.numer as u128 * self.denom as u128;
        lhs.cmp(&rhs)
    }
}

/// Decimal when the expansion terminates (`2.5`), otherwise `n/d`.
impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.decimal_places(), self.to_integer()) {
            (Some(0), _) => write!(f, "{}", self.numer),
            (Some(places), Ok((value, scale))) => {
                let width = places as usize;
                write!(f, "{}.{:0width$}", value / scale, value % scale)
            }
            _ => write!(f, "{}/{}", self.numer, self.denom),
        }
    }
}

/// Parses `"79"`, `"0.25"` or `"1/3"`.
impl FromStr for Weight {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = |part: &str| -> Result<u64> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(LotteryError::invalid(format!("not a positive number: {s:?}")));
            }
            part.parse::<u64>().map_err(|_| LotteryError::Overflow)
        };

        if let Some((numer, denom)) = s.split_once('/') {
            return Self::new(digits(numer.trim())?, digits(denom.trim())?);
        }

        match s.split_once('.') {
            Some((whole, frac)) => {
                let places = u32::try_from(frac.len()).map_err(|_| LotteryError::Overflow)?;
                let scale = 10u64.checked_pow(places).ok_or(LotteryError::Overflow)?;
                let whole = if whole.is_empty() { 0 } else { digits(whole)? };
                let mantissa = whole
                    .checked_mul(scale)
                    .and_then(|w| w.checked_add(digits(frac).ok()?))
                    .ok_or_else(|| {
                        LotteryError::invalid(format!("not a positive number: {s:?}"))
                    })?;
                Self::decimal(mantissa, places)
            }
            None => Self::integer(digits(s)?),
        }
    }
}

impl TryFrom<u64> for Weight {
    type Error = LotteryError;

    fn try_from(n: u64) -> Result<Self> {
        Self::integer(n)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::Weight;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for Weight {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.is_integer() {
                serializer.serialize_u64(self.numer)
            } else {
                serializer.collect_str(self)
            }
        }
    }

    struct WeightVisitor;

    impl Visitor<'_> for WeightVisitor {
        type Value = Weight;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a positive integer or a string like \"0.5\" or \"1/3\"")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Weight, E> {
            Weight::integer(v).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Weight, E> {
            let v = u64::try_from(v).map_err(|_| E::custom("weight must be positive"))?;
            self.visit_u64(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Weight, E> {
            v.parse().map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for Weight {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(WeightVisitor)
        }
    }
}
