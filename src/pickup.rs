//! Pickup boosts: raise the rate of chosen items inside their own category.

use std::collections::HashSet;
use std::hash::Hash;
use std::iter;

use log::trace;
use num_integer::Integer;

use crate::classify::classify;
use crate::error::{LotteryError, Result};
use crate::weight::Weight;
use crate::{Category, Item};

/// A pickup campaign: the items in `ids` become `factor` times as likely as
/// they were, at the expense of the other items of their category only.
#[derive(Debug, Clone)]
pub struct Pickup<Id> {
    ids: HashSet<Id>,
    factor: Weight,
    max_len: Option<u64>,
}

impl<Id: Eq + Hash> Pickup<Id> {
    pub fn new<I>(ids: I, factor: Weight) -> Self
    where
        I: IntoIterator<Item = Id>,
    {
        Self {
            ids: ids.into_iter().collect(),
            factor,
            max_len: None,
        }
    }

    /// Refuse to produce more than `limit` entries.
    pub fn max_len(mut self, limit: u64) -> Self {
        self.max_len = Some(limit);
        self
    }

    pub fn ids(&self) -> &HashSet<Id> {
        &self.ids
    }

    pub fn factor(&self) -> Weight {
        self.factor
    }

    /// See [`pickup`].
    ///
    /// # Errors
    /// As [`pickup`], plus [`LotteryError::BoxTooLarge`] if the output would
    /// exceed [`max_len`](Self::max_len). The check runs before anything is
    /// replicated.
    pub fn apply<'a, T, C, I, K>(&self, items: I, key: K) -> Result<Vec<&'a T>>
    where
        T: Item<Id = Id> + 'a,
        C: Category,
        I: IntoIterator<Item = &'a T>,
        K: Fn(&T) -> C,
    {
        replicate(items, &self.ids, self.factor, key, self.max_len)
    }
}

/// Replicate `items` so each item in `ids` is `factor` times as likely as
/// before within its category.
///
/// Categories without a picked item are copied through untouched. In a
/// category of `total` items with `picked` of them in `ids`, and `factor`
/// split into `(rate, scale)`:
///
/// * each picked item is repeated `x = rate * (total - picked)` times,
/// * every other item `y = scale * total - rate * picked` times,
///
/// with `(x, y)` reduced by their GCD. A picked item's chance inside the
/// category becomes `factor / total`; the rest is shared evenly by the others.
/// The category's own entry count changes, which the box builder cancels out,
/// so feed the result to [`LotteryBox::build`](crate::LotteryBox::build).
///
/// Output order: categories in rank order; inside a boosted category the
/// picked items' replicas first, then the others'.
///
/// # Errors
/// * [`LotteryError::RateOverflow`] if `x` or `y` would be zero or negative:
///   the factor is too large for the category (or every item is picked).
/// * [`LotteryError::Overflow`] if the output length does not fit in `u64`.
///
/// The output length is not capped; use [`Pickup::max_len`] for that.
pub fn pickup<'a, T, C, I, K>(
    items: I,
    ids: &HashSet<T::Id>,
    factor: Weight,
    key: K,
) -> Result<Vec<&'a T>>
where
    T: Item + 'a,
    C: Category,
    I: IntoIterator<Item = &'a T>,
    K: Fn(&T) -> C,
{
    replicate(items, ids, factor, key, None)
}

fn replicate<'a, T, C, I, K>(
    items: I,
    ids: &HashSet<T::Id>,
    factor: Weight,
    key: K,
    max_len: Option<u64>,
) -> Result<Vec<&'a T>>
where
    T: Item + 'a,
    C: Category,
    I: IntoIterator<Item = &'a T>,
    K: Fn(&T) -> C,
{
    let (rate, scale) = factor.to_integer()?;
    let mut out = Vec::new();
    let mut len = 0u64;
    let grow = |len: u64, by: u128| -> Result<u64> {
        let len = u64::try_from(by)
            .ok()
            .and_then(|by| len.checked_add(by))
            .ok_or(LotteryError::Overflow)?;
        match max_len {
            Some(limit) if len > limit => Err(LotteryError::BoxTooLarge { len, limit }),
            _ => Ok(len),
        }
    };

    for (category, members) in classify(items, key) {
        let (picked, others): (Vec<&T>, Vec<&T>) =
            members.iter().copied().partition(|item| ids.contains(&item.id()));
        if picked.is_empty() {
            len = grow(len, members.len() as u128)?;
            out.extend(members);
            continue;
        }

        let (x, y) = pickup_weights(members.len(), picked.len(), rate, scale).ok_or(
            LotteryError::RateOverflow {
                category: category.name(),
                factor,
            },
        )?;
        trace!(
            "pickup {}: {}/{} items, weights {x}:{y}",
            category.name(),
            picked.len(),
            members.len()
        );

        let added = x
            .checked_mul(picked.len() as u128)
            .zip(y.checked_mul(others.len() as u128))
            .and_then(|(a, b)| a.checked_add(b))
            .ok_or(LotteryError::Overflow)?;
        len = grow(len, added)?;

        let x = usize::try_from(x).map_err(|_| LotteryError::Overflow)?;
        let y = usize::try_from(y).map_err(|_| LotteryError::Overflow)?;
        out.extend(picked.into_iter().flat_map(|item| iter::repeat_n(item, x)));
        out.extend(others.into_iter().flat_map(|item| iter::repeat_n(item, y)));
    }
    Ok(out)
}

/// Reduced `(x, y)`, or `None` if either is not positive.
fn pickup_weights(total: usize, picked: usize, rate: u64, scale: u64) -> Option<(u128, u128)> {
    let (total, picked) = (total as u128, picked as u128);
    let (rate, scale) = (u128::from(rate), u128::from(scale));
    let x = rate * (total - picked);
    let y = (scale * total).checked_sub(rate * picked)?;
    if x == 0 || y == 0 {
        return None;
    }
    let g = x.gcd(&y);
    Some((x / g, y / g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Card, Rarity, Series, catalog, rarity, standard};
    use crate::{LotteryBox, RatioMap};

    fn w(s: &str) -> Weight {
        s.parse().unwrap()
    }

    fn series_ids(cards: &[Card], series: Series) -> HashSet<u32> {
        cards.iter().filter(|c| c.series == series).map(|c| c.id).collect()
    }

    /// Exact chance of drawing `id` from a box.
    fn chance(lottery: &LotteryBox<'_, Card>, id: u32) -> Weight {
        let n = lottery.runs().filter(|(c, _)| c.id == id).map(|(_, n)| n).sum::<u64>();
        Weight::new(n, lottery.len()).unwrap()
    }

    fn product(a: Weight, b: Weight) -> Weight {
        Weight::new(a.numer() * b.numer(), a.denom() * b.denom()).unwrap()
    }

    fn quotient(a: Weight, b: Weight) -> Weight {
        Weight::new(a.numer() * b.denom(), a.denom() * b.numer()).unwrap()
    }

    #[test]
    fn new_series_pickup() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        let picked = pickup(&cards, &grimm, w("5"), rarity).unwrap();

        // SSR: 30 items, 5 picked -> x = 125, y = 5 -> 25:1
        let ssr: Vec<&&Card> = picked.iter().filter(|c| c.rarity == Rarity::SSR).collect();
        assert_eq!(ssr.len(), 5 * 25 + 25);
        assert!(ssr[..125].iter().all(|c| c.series == Series::Grimm));
        assert!(ssr[125..].iter().all(|c| c.series != Series::Grimm));

        let rare = RatioMap::parse("R=79, SR=20, SSR=1").unwrap();
        let before = LotteryBox::build(&cards, &rare, rarity).unwrap();
        let after = LotteryBox::build(picked.iter().copied(), &rare, rarity).unwrap();
        for card in cards.iter().filter(|c| c.rarity != Rarity::N) {
            let expect = match (card.rarity, card.series) {
                (Rarity::SSR, Series::Grimm) => w("5"),
                (Rarity::SSR, _) => w("1/5"),
                _ => Weight::ONE,
            };
            let boost = quotient(chance(&after, card.id), chance(&before, card.id));
            assert_eq!(boost, expect, "card {}", card.id);
        }
    }

    #[test]
    fn category_shares_are_untouched() {
        let cards = catalog();
        let fes = series_ids(&cards, Series::Festival);
        let picked = pickup(&cards, &fes, w("5"), rarity).unwrap();
        let rare = RatioMap::parse("R=79, SR=20, SSR=1").unwrap();
        let lottery = LotteryBox::build(picked.iter().copied(), &rare, rarity).unwrap();
        for (category, count) in lottery.counts(rarity) {
            assert_eq!(
                Some(Weight::new(count, lottery.len()).unwrap()),
                rare.share(category).unwrap()
            );
        }
        // each festival card: factor / total of its tier, times the tier rate
        for &id in &fes {
            assert_eq!(chance(&lottery, id), product(w("5/35"), w("0.01")));
        }
    }

    #[test]
    fn untouched_categories_copied_in_order() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        let picked = pickup(&cards, &grimm, w("2"), rarity).unwrap();
        let n_ids = |cards: &[&Card]| -> Vec<u32> {
            cards.iter().filter(|c| c.rarity == Rarity::N).map(|c| c.id).collect()
        };
        let n_before = n_ids(&cards.iter().collect::<Vec<_>>());
        let n_after = n_ids(&picked);
        assert_eq!(n_before, n_after);
        assert_eq!(picked[0].rarity, Rarity::N);
        assert_eq!(picked.last().unwrap().rarity, Rarity::SSR);
    }

    #[test]
    fn factor_one_is_identity_in_distribution() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        let picked = pickup(&cards, &grimm, Weight::ONE, rarity).unwrap();
        assert_eq!(picked.len(), cards.len());
    }

    #[test]
    fn fractional_factor_lowers_rate() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        let picked = pickup(&cards, &grimm, w("0.5"), rarity).unwrap();
        // (5, 10): x = 125, y = 275 -> 5:11
        let of = |id: u32| picked.iter().filter(|c| c.id == id).count();
        let grimm_id = *grimm.iter().next().unwrap();
        let launch_ssr = cards
            .iter()
            .find(|c| c.rarity == Rarity::SSR && c.series == Series::Launch)
            .unwrap();
        assert_eq!(of(grimm_id), 5);
        assert_eq!(of(launch_ssr.id), 11);
    }

    #[test]
    fn infeasible_factor_is_rate_overflow() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        // 30 SSR, 5 picked: factor must stay below 6
        assert!(pickup(&cards, &grimm, w("5.9"), rarity).is_ok());
        for f in ["6", "7", "100"] {
            assert_eq!(
                pickup(&cards, &grimm, w(f), rarity).unwrap_err(),
                LotteryError::RateOverflow { category: "SSR", factor: w(f) }
            );
        }
    }

    #[test]
    fn whole_category_picked_is_rate_overflow() {
        let cards = standard();
        let all_sr: HashSet<u32> = cards
            .iter()
            .filter(|c| c.rarity == Rarity::SR)
            .map(|c| c.id)
            .collect();
        assert!(matches!(
            pickup(&cards, &all_sr, w("2"), rarity),
            Err(LotteryError::RateOverflow { category: "SR", .. })
        ));
    }

    #[test]
    fn spans_categories_independently() {
        let cards = standard();
        let sr = cards.iter().find(|c| c.rarity == Rarity::SR).unwrap().id;
        let ssr = cards.iter().find(|c| c.rarity == Rarity::SSR).unwrap().id;
        let plan = Pickup::new([sr, ssr, 9_999], w("3"));
        let picked = plan.apply(&cards, rarity).unwrap();
        let of = |id: u32| picked.iter().filter(|c| c.id == id).count();
        // SR: 20 items, x = 57, y = 17; SSR: 30 items, x = 87, y = 27 -> 29:9
        assert_eq!(of(sr), 57);
        assert_eq!(of(ssr), 29);
        assert_eq!(plan.ids().len(), 3);
        assert_eq!(plan.factor(), w("3"));
    }

    #[test]
    fn length_cap_is_checked_before_replicating() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        // (1001, 1000): x = 25025, y = 24995 -> 5005:4999
        // SSR: 5 * 5005 + 25 * 4999 = 150_000, plus 100 other cards
        let plan = Pickup::new(grimm, w("1.001"));
        assert_eq!(
            plan.clone().max_len(10_000).apply(&cards, rarity).unwrap_err(),
            LotteryError::BoxTooLarge { len: 150_100, limit: 10_000 }
        );
        let picked = plan.clone().max_len(150_100).apply(&cards, rarity).unwrap();
        assert_eq!(picked.len(), 150_100);
        assert_eq!(plan.apply(&cards, rarity).unwrap().len(), 150_100);
    }

    #[test]
    fn length_cap_counts_untouched_categories() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        // 5 * 25 + 25 = 150 SSR entries, 100 copied
        let plan = Pickup::new(grimm, w("5"));
        assert_eq!(
            plan.clone().max_len(249).apply(&cards, rarity).unwrap_err(),
            LotteryError::BoxTooLarge { len: 250, limit: 249 }
        );
        assert_eq!(plan.max_len(250).apply(&cards, rarity).unwrap().len(), 250);
    }

    #[test]
    fn composes_with_rarity_boost() {
        let cards = standard();
        let grimm = series_ids(&cards, Series::Grimm);
        let picked = Pickup::new(grimm.iter().copied(), w("5"))
            .apply(&cards, rarity)
            .unwrap();
        let rare = RatioMap::parse("R=79, SR=20, SSR=1").unwrap();
        let up = rare.boost(Rarity::SSR, w("2")).unwrap();
        let lottery = LotteryBox::build(picked.iter().copied(), &up, rarity).unwrap();

        let counts = lottery.counts(rarity);
        let share = |r: Rarity| Weight::new(counts[&r], lottery.len()).unwrap();
        assert_eq!(share(Rarity::R), w("0.78"));
        assert_eq!(share(Rarity::SR), w("0.2"));
        assert_eq!(share(Rarity::SSR), w("0.02"));

        for card in cards.iter().filter(|c| c.rarity == Rarity::SSR) {
            let expect = if grimm.contains(&card.id) {
                product(w("5/30"), w("0.02"))
            } else {
                product(w("1/150"), w("0.02"))
            };
            assert_eq!(chance(&lottery, card.id), expect, "card {}", card.id);
        }
        assert_eq!(product(w("5/30"), w("0.02")), w("1/300"));
    }

    #[test]
    fn no_ids_is_a_copy() {
        let cards = standard();
        let picked = pickup(&cards, &HashSet::new(), w("5"), rarity).unwrap();
        assert_eq!(picked.len(), cards.len());
    }
}
