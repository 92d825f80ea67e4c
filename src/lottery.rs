//! Exact lottery boxes.

use std::collections::BTreeMap;
use std::iter;

use log::debug;
use rand::Rng;

use crate::classify::classify;
use crate::error::{LotteryError, Result};
use crate::ratio::{RatioMap, checked_lcm, gcd_all};
use crate::sampler::UniformSampler;
use crate::{Category, IndexSampler};

/// A flat multiset of item references whose category proportions equal a
/// [`RatioMap`] exactly.
///
/// Stored as runs of `(item, multiplicity)` in box order; [`get`](Self::get),
/// [`iter`](Self::iter) and [`materialize`](Self::materialize) expose the flat
/// sequence, and [`sample`](Self::sample) draws uniformly from it.
#[derive(Debug, Clone)]
pub struct LotteryBox<'a, T> {
    runs: Vec<(&'a T, u64)>,
    // exclusive end position of each run
    ends: Vec<u64>,
    sampler: UniformSampler,
}

/// Box construction with options.
///
/// `key` picks the category of an item; [`max_len`](Self::max_len) caps the
/// box length.
#[derive(Debug, Clone)]
pub struct BoxBuilder<K> {
    key: K,
    max_len: Option<u64>,
}

impl<K> BoxBuilder<K> {
    pub fn new(key: K) -> Self {
        Self { key, max_len: None }
    }

    /// Refuse to build boxes longer than `limit` entries.
    pub fn max_len(mut self, limit: u64) -> Self {
        self.max_len = Some(limit);
        self
    }

    /// Expand `items` so that uniform draws follow `ratio` exactly.
    ///
    /// Each item of category `c` appears
    /// `(ratio[c] / ratio_gcd) * (counts_lcm / count[c])` times, where
    /// `counts_lcm` is the LCM of the item counts of the ratio's categories
    /// and `ratio_gcd` the GCD of the normalized weights. Categories missing
    /// from `ratio` are left out.
    ///
    /// # Errors
    /// * [`LotteryError::EmptyCategory`] if a ratio category has no items.
    /// * [`LotteryError::Overflow`] if a multiplicity or the length overflows.
    /// * [`LotteryError::BoxTooLarge`] if the length exceeds the configured cap.
    ///
    /// # Complexity
    /// O(n log n) in the number of items, independent of the box length.
    pub fn build<'a, T, C, I>(&self, items: I, ratio: &RatioMap<C>) -> Result<LotteryBox<'a, T>>
    where
        T: 'a,
        C: Category,
        I: IntoIterator<Item = &'a T>,
        K: Fn(&T) -> C,
    {
        let groups = classify(items, &self.key);

        let mut counts_lcm = 1u64;
        for category in ratio.categories() {
            let count = groups.get(&category).map_or(0, Vec::len) as u64;
            if count == 0 {
                return Err(LotteryError::EmptyCategory {
                    category: category.name(),
                });
            }
            counts_lcm = checked_lcm(counts_lcm, count)?;
        }

        let weights = ratio.integer_weights()?;
        let ratio_gcd = gcd_all(weights.values().copied());

        let mut runs = Vec::new();
        let mut ends = Vec::new();
        let mut len = 0u64;
        for (category, members) in &groups {
            let Some(&weight) = weights.get(category) else {
                continue;
            };
            let per_item = (weight / ratio_gcd)
                .checked_mul(counts_lcm / members.len() as u64)
                .ok_or(LotteryError::Overflow)?;
            for &item in members {
                len = len.checked_add(per_item).ok_or(LotteryError::Overflow)?;
                runs.push((item, per_item));
                ends.push(len);
            }
        }

        if let Some(limit) = self.max_len {
            if len > limit {
                return Err(LotteryError::BoxTooLarge { len, limit });
            }
        }

        debug!(
            "lottery box: {} categories, counts lcm {counts_lcm}, ratio gcd {ratio_gcd}, {} items, {len} entries",
            weights.len(),
            runs.len(),
        );
        // non-empty: every ratio category has items and a positive weight
        let sampler = UniformSampler::new(len)?;
        Ok(LotteryBox {
            runs,
            ends,
            sampler,
        })
    }
}

impl<'a, T> LotteryBox<'a, T> {
    /// Build with default options; see [`BoxBuilder::build`].
    pub fn build<C, I, K>(items: I, ratio: &RatioMap<C>, key: K) -> Result<Self>
    where
        C: Category,
        I: IntoIterator<Item = &'a T>,
        K: Fn(&T) -> C,
    {
        BoxBuilder::new(key).build(items, ratio)
    }

    /// Number of entries in the flat box.
    pub fn len(&self) -> u64 {
        self.ends.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of distinct entries (runs).
    pub fn distinct(&self) -> usize {
        self.runs.len()
    }

    /// The uniform sampler over `0..len()` that [`sample`](Self::sample) uses.
    pub fn sampler(&self) -> &UniformSampler {
        &self.sampler
    }

    /// `(item, multiplicity)` in box order.
    pub fn runs(&self) -> impl Iterator<Item = (&'a T, u64)> + '_ {
        self.runs.iter().copied()
    }

    /// The item at flat position `index`.
    pub fn get(&self, index: u64) -> Option<&'a T> {
        let run = self.ends.partition_point(|&end| end <= index);
        self.runs.get(run).map(|&(item, _)| item)
    }

    /// The flat sequence, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.runs
            .iter()
            .flat_map(|&(item, n)| iter::repeat_n(item, n as usize))
    }

    /// Collect the flat sequence. Check [`len`](Self::len) first for big boxes.
    pub fn materialize(&self) -> Vec<&'a T> {
        self.iter().collect()
    }

    /// Entries per category.
    pub fn counts<C, K>(&self, key: K) -> BTreeMap<C, u64>
    where
        C: Category,
        K: Fn(&T) -> C,
    {
        let mut counts = BTreeMap::new();
        for &(item, n) in &self.runs {
            *counts.entry(key(item)).or_default() += n;
        }
        counts
    }

    /// Draw one entry uniformly.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &'a T {
        let index = self.sampler.sample_index(rng);
        let run = self.ends.partition_point(|&end| end <= index);
        self.runs[run].0
    }

    /// Draw `n` entries uniformly, with replacement.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<&'a T> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}
