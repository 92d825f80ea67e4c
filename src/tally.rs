//! Counting draws per category and per item.

use std::collections::BTreeMap;

use crate::lottery::LotteryBox;
use crate::weight::Weight;
use crate::{Category, Item};

/// Draw counts per category and per item id.
///
/// Tally a box itself to get the stated rates of a configuration, or a batch
/// of draws to get the observed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<C, Id> {
    total: u64,
    categories: BTreeMap<C, u64>,
    items: BTreeMap<Id, u64>,
}

impl<C: Category, Id: Ord> Default for Tally<C, Id> {
    fn default() -> Self {
        Self {
            total: 0,
            categories: BTreeMap::new(),
            items: BTreeMap::new(),
        }
    }
}

impl<C: Category, Id: Ord + Clone> Tally<C, Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `item` `n` times under `category`.
    pub fn record(&mut self, category: C, id: Id, n: u64) {
        self.total += n;
        *self.categories.entry(category).or_default() += n;
        *self.items.entry(id).or_default() += n;
    }

    /// Tally any sequence of items, e.g. the output of [`LotteryBox::draw`].
    pub fn from_items<'a, T, I, K>(items: I, key: K) -> Self
    where
        T: Item<Id = Id> + 'a,
        I: IntoIterator<Item = &'a T>,
        K: Fn(&T) -> C,
    {
        let mut tally = Self::new();
        for item in items {
            tally.record(key(item), item.id(), 1);
        }
        tally
    }

    /// The box's own multiplicities: its exact stated rates.
    pub fn from_box<T, K>(lottery: &LotteryBox<'_, T>, key: K) -> Self
    where
        T: Item<Id = Id>,
        K: Fn(&T) -> C,
    {
        let mut tally = Self::new();
        for (item, n) in lottery.runs() {
            tally.record(key(item), item.id(), n);
        }
        tally
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, category: C) -> u64 {
        self.categories.get(&category).copied().unwrap_or(0)
    }

    pub fn item_count(&self, id: &Id) -> u64 {
        self.items.get(id).copied().unwrap_or(0)
    }

    /// Exact share of `category`, `None` if it was never seen.
    pub fn share(&self, category: C) -> Option<Weight> {
        Weight::new(self.count(category), self.total).ok()
    }

    /// Exact share of one item, `None` if it was never seen.
    pub fn item_share(&self, id: &Id) -> Option<Weight> {
        Weight::new(self.item_count(id), self.total).ok()
    }

    /// Share of `category` in percent, for display.
    pub fn percent(&self, category: C) -> f64 {
        percent(self.count(category), self.total)
    }

    pub fn item_percent(&self, id: &Id) -> f64 {
        percent(self.item_count(id), self.total)
    }

    /// `(category, count)` in rank order.
    pub fn categories(&self) -> impl Iterator<Item = (C, u64)> + '_ {
        self.categories.iter().map(|(&c, &n)| (c, n))
    }

    /// `(id, count)` in id order.
    pub fn items(&self) -> impl Iterator<Item = (&Id, u64)> + '_ {
        self.items.iter().map(|(id, &n)| (id, n))
    }
}

impl<'a, T> LotteryBox<'a, T> {
    /// Shorthand for [`Tally::from_box`].
    pub fn tally<C, K>(&self, key: K) -> Tally<C, T::Id>
    where
        T: Item,
        C: Category,
        K: Fn(&T) -> C,
    {
        Tally::from_box(self, key)
    }
}

fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RatioMap;
    use crate::fixtures::{Rarity, rarity, standard};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn stated_rates_match_ratio() {
        let cards = standard();
        let free = RatioMap::parse("N=79, R=20, SR=1").unwrap();
        let lottery = LotteryBox::build(&cards, &free, rarity).unwrap();
        let tally = lottery.tally(rarity);
        assert_eq!(tally.total(), lottery.len());
        assert_eq!(tally.share(Rarity::SR), free.share(Rarity::SR).unwrap());
        assert_eq!(tally.share(Rarity::SSR), None);
        assert!((tally.percent(Rarity::N) - 79.0).abs() < 1e-9);

        // 40 N items share 79% evenly
        let first_n = cards.iter().find(|c| c.rarity == Rarity::N).unwrap();
        assert_eq!(tally.item_share(&first_n.id), Some(Weight::new(79, 4000).unwrap()));
        assert_eq!(tally.items().count(), 100);
    }

    #[test]
    fn observed_rates_converge() {
        let cards = standard();
        let rare = RatioMap::parse("R=79, SR=20, SSR=1").unwrap();
        let lottery = LotteryBox::build(&cards, &rare, rarity).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let draws = lottery.draw(&mut rng, 100_000);
        let tally = Tally::from_items(draws, rarity);
        assert_eq!(tally.total(), 100_000);
        assert!((tally.percent(Rarity::R) - 79.0).abs() < 0.5);
        assert!((tally.percent(Rarity::SSR) - 1.0).abs() < 0.15);
        assert_eq!(tally.count(Rarity::N), 0);
    }

    #[test]
    fn empty_tally() {
        let tally: Tally<Rarity, u32> = Tally::new();
        assert_eq!(tally.share(Rarity::N), None);
        assert_eq!(tally.percent(Rarity::N), 0.0);
        assert_eq!(tally.item_percent(&1), 0.0);
    }
}
