//! Rarity boosts: raise one tier's rate, pay for it from the base tier.

use log::debug;

use crate::Category;
use crate::error::{LotteryError, Result};
use crate::ratio::RatioMap;
use crate::weight::Weight;

impl<C: Category> RatioMap<C> {
    /// Multiply `target`'s share by `factor`, taking the difference out of
    /// the lowest-ranked category so the total stays the same.
    ///
    /// The map is normalized to integers, `factor` split into
    /// `(rate, scale)` by [`Weight::to_integer`], every other weight
    /// multiplied by `scale` and the target by `rate`. The result's total is
    /// the original integer total times `scale`; shares of categories other
    /// than the target and the base do not change.
    ///
    /// `factor` may be below one, in which case the base tier gains.
    ///
    /// # Errors
    /// * [`LotteryError::EmptyCategory`] if `target` is not in the map.
    /// * [`LotteryError::BaseCategoryBoost`] if `target` is the base tier.
    /// * [`LotteryError::RateOverflow`] if the base tier would drop to zero
    ///   or below.
    ///
    /// ```rust,ignore
    /// let rare = RatioMap::parse("R=79, SR=20, SSR=1")?;
    /// let up = rare.boost(Rarity::SSR, Weight::integer(2)?)?;
    /// assert_eq!(up.to_string(), "R=78, SR=20, SSR=2");
    /// ```
    pub fn boost(&self, target: C, factor: Weight) -> Result<Self> {
        let mut weights = self.integer_weights()?;
        let base = self.lowest();

        let Some(&current) = weights.get(&target) else {
            return Err(LotteryError::EmptyCategory {
                category: target.name(),
            });
        };
        if target == base {
            return Err(LotteryError::BaseCategoryBoost {
                category: base.name(),
            });
        }

        let (rate, scale) = factor.to_integer()?;
        let before = current.checked_mul(scale).ok_or(LotteryError::Overflow)?;
        let after = current.checked_mul(rate).ok_or(LotteryError::Overflow)?;

        for (&category, weight) in weights.iter_mut() {
            let by = if category == target { rate } else { scale };
            *weight = weight.checked_mul(by).ok_or(LotteryError::Overflow)?;
        }

        // base -= after - before
        let base_weight = weights
            .get_mut(&base)
            .ok_or(LotteryError::EmptyCategory {
                category: base.name(),
            })?;
        let adjusted = i128::from(*base_weight) - (i128::from(after) - i128::from(before));
        if adjusted <= 0 {
            return Err(LotteryError::RateOverflow {
                category: base.name(),
                factor,
            });
        }
        *base_weight = u64::try_from(adjusted).map_err(|_| LotteryError::Overflow)?;

        debug!(
            "boosted {} x{factor}: {} absorbs {}",
            target.name(),
            base.name(),
            i128::from(after) - i128::from(before)
        );
        Self::from_ints(weights)
    }
}
