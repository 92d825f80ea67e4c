//! Ratio maps and their integer normalization.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use num_integer::Integer;

use crate::Category;
use crate::error::{LotteryError, Result};
use crate::weight::Weight;

/// Category → weight, ordered by category rank.
///
/// Never empty, and every weight is positive. Only the proportions matter:
/// `{N: 79, R: 20, SR: 1}` and `{N: 7.9, R: 2, SR: 0.1}` describe the same
/// lottery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioMap<C: Category> {
    weights: BTreeMap<C, Weight>,
    base: C,
}

impl<C: Category> RatioMap<C> {
    /// Build from any `(category, weight)` iterator.
    ///
    /// # Errors
    /// [`LotteryError::InvalidRatio`] if there are no pairs or a category is
    /// listed twice.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, Weight)>,
    {
        let mut weights = BTreeMap::new();
        for (category, weight) in pairs {
            if weights.insert(category, weight).is_some() {
                return Err(LotteryError::invalid(format!(
                    "category {} listed twice",
                    category.name()
                )));
            }
        }
        Self::from_map(weights)
    }

    /// Convenience for whole-number weights, e.g. percentages.
    pub fn from_integers<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, u64)>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(c, n)| Ok((c, Weight::integer(n)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_pairs(pairs)
    }

    /// Parse `"N=79, R=20, SR=1"` (`:` also works as the separator).
    /// Category names are matched with [`Category::from_name`].
    pub fn parse(s: &str) -> Result<Self> {
        let pairs = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, weight) = entry.split_once(['=', ':']).ok_or_else(|| {
                    LotteryError::invalid(format!("expected name=weight, got {entry:?}"))
                })?;
                let name = name.trim();
                let category = C::from_name(name)
                    .ok_or_else(|| LotteryError::invalid(format!("unknown category {name:?}")))?;
                Ok((category, weight.parse::<Weight>()?))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_pairs(pairs)
    }

    pub fn get(&self, category: C) -> Option<Weight> {
        self.weights.get(&category).copied()
    }

    pub fn contains(&self, category: C) -> bool {
        self.weights.contains_key(&category)
    }

    /// `(category, weight)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (C, Weight)> + '_ {
        self.weights.iter().map(|(&c, &w)| (c, w))
    }

    pub fn categories(&self) -> impl Iterator<Item = C> + '_ {
        self.weights.keys().copied()
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// The lowest-ranked category present: the base tier.
    pub fn lowest(&self) -> C {
        self.base
    }

    /// Every weight scaled by one common factor so all become integers,
    /// plus that factor.
    ///
    /// The factor is the LCM of the per-weight scales from
    /// [`Weight::to_integer`]; for decimal inputs that is the largest power of
    /// ten needed.
    fn scaled(&self) -> Result<(BTreeMap<C, u64>, u64)> {
        let parts = self
            .weights
            .iter()
            .map(|(&c, w)| Ok((c, w.to_integer()?)))
            .collect::<Result<Vec<_>>>()?;

        let scale = parts
            .iter()
            .try_fold(1u64, |acc, (_, (_, s))| checked_lcm(acc, *s))?;

        let ints = parts
            .into_iter()
            .map(|(c, (v, s))| {
                let v = v.checked_mul(scale / s).ok_or(LotteryError::Overflow)?;
                Ok((c, v))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok((ints, scale))
    }

    /// Integer weights with the same proportions, as plain numbers.
    ///
    /// Already-integer maps come back unchanged.
    pub fn integer_weights(&self) -> Result<BTreeMap<C, u64>> {
        Ok(self.scaled()?.0)
    }

    /// Same proportions, all weights whole numbers.
    pub fn normalize(&self) -> Result<Self> {
        Self::from_ints(self.integer_weights()?)
    }

    /// Normalize, then divide by the GCD of the weights.
    pub fn reduce(&self) -> Result<Self> {
        let ints = self.integer_weights()?;
        let g = gcd_all(ints.values().copied());
        Self::from_ints(ints.into_iter().map(|(c, v)| (c, v / g)).collect())
    }

    pub(crate) fn from_ints(ints: BTreeMap<C, u64>) -> Result<Self> {
        let weights = ints
            .into_iter()
            .map(|(c, v)| Ok((c, Weight::integer(v)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Self::from_map(weights)
    }

    fn from_map(weights: BTreeMap<C, Weight>) -> Result<Self> {
        let Some((&base, _)) = weights.first_key_value() else {
            return Err(LotteryError::invalid("ratio map is empty"));
        };
        debug_assert!(
            weights.keys().all(|c| base.rank() <= c.rank()),
            "Ord of {base:?} disagrees with Category::rank"
        );
        Ok(Self { weights, base })
    }

    /// Sum of all weights, exact.
    pub fn total(&self) -> Result<Weight> {
        let (ints, scale) = self.scaled()?;
        let sum = checked_sum(ints.values().copied())?;
        Weight::new(sum, scale)
    }

    /// Exact share of `category` in the whole, `None` if absent.
    pub fn share(&self, category: C) -> Result<Option<Weight>> {
        let (ints, _) = self.scaled()?;
        let sum = checked_sum(ints.values().copied())?;
        ints.get(&category)
            .map(|&v| Weight::new(v, sum))
            .transpose()
    }

    /// Check that the weights add up to `expected`, e.g. 100 for percentages.
    ///
    /// # Errors
    /// [`LotteryError::InvalidRatio`] naming the actual total.
    pub fn expect_total(&self, expected: Weight) -> Result<()> {
        let total = self.total()?;
        if total != expected {
            return Err(LotteryError::invalid(format!(
                "weights sum to {total}, expected {expected}"
            )));
        }
        Ok(())
    }
}

impl<C: Category> FromStr for RatioMap<C> {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Writes the form [`RatioMap::parse`] reads back.
impl<C: Category> fmt::Display for RatioMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (c, w)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", c.name(), w)?;
        }
        Ok(())
    }
}

pub(crate) fn checked_lcm(a: u64, b: u64) -> Result<u64> {
    (a / a.gcd(&b)).checked_mul(b).ok_or(LotteryError::Overflow)
}

pub(crate) fn checked_sum(values: impl IntoIterator<Item = u64>) -> Result<u64> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or(LotteryError::Overflow)
}

/// GCD of all values; `1` for an empty sequence.
pub(crate) fn gcd_all(values: impl IntoIterator<Item = u64>) -> u64 {
    match values.into_iter().reduce(|a, b| a.gcd(&b)) {
        Some(0) | None => 1,
        Some(g) => g,
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::RatioMap;
    use crate::{Category, Weight};
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    /// Serialized as a map keyed by [`Category::name`].
    impl<C: Category> Serialize for RatioMap<C> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (c, w) in self.iter() {
                map.serialize_entry(c.name(), &w)?;
            }
            map.end()
        }
    }

    struct RatioVisitor<C>(PhantomData<C>);

    impl<'de, C: Category> Visitor<'de> for RatioVisitor<C> {
        type Value = RatioMap<C>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of category names to weights")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::new();
            while let Some((name, weight)) = access.next_entry::<String, Weight>()? {
                let category = C::from_name(&name)
                    .ok_or_else(|| de::Error::custom(format!("unknown category {name:?}")))?;
                pairs.push((category, weight));
            }
            RatioMap::from_pairs(pairs).map_err(de::Error::custom)
        }
    }

    impl<'de, C: Category> Deserialize<'de> for RatioMap<C> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(RatioVisitor(PhantomData))
        }
    }
}
