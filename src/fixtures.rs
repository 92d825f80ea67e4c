//! Card catalog shared by the unit tests.

use crate::{Category, Item};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Category)]
pub enum Rarity {
    N,
    R,
    SR,
    SSR,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Category)]
pub enum Element {
    Blaze,
    Water,
    Forest,
    Light,
    Dark,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Category)]
pub enum Series {
    Launch,
    Olympus,
    Japanese,
    Nordic,
    Grimm,
    #[label("Fes")]
    Festival,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub id: u32,
    pub rarity: Rarity,
    pub series: Series,
    pub element: Element,
}

impl Item for Card {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

pub fn rarity(card: &Card) -> Rarity {
    card.rarity
}

/// Hands out sequential ids starting at 1.
#[derive(Default)]
pub struct CardFactory {
    next_id: u32,
}

impl CardFactory {
    pub fn card(&mut self, rarity: Rarity, series: Series, element: Element) -> Card {
        self.next_id += 1;
        Card {
            id: self.next_id,
            rarity,
            series,
            element,
        }
    }

    /// `sets` copies of one card per element.
    pub fn sets(&mut self, sets: usize, rarity: Rarity, series: Series) -> Vec<Card> {
        (0..sets)
            .flat_map(|_| Element::ALL.iter())
            .map(|&e| self.card(rarity, series, e))
            .collect()
    }
}

/// 40 N, 40 R, 20 SR, 30 SSR, then 5 festival SSR at the end.
pub fn catalog() -> Vec<Card> {
    let mut f = CardFactory::default();
    let mut cards = Vec::new();
    cards.extend(f.sets(8, Rarity::N, Series::Launch));
    cards.extend(f.sets(8, Rarity::R, Series::Launch));
    cards.extend(f.sets(4, Rarity::SR, Series::Launch));
    cards.extend(f.sets(2, Rarity::SSR, Series::Launch));
    for series in [Series::Olympus, Series::Japanese, Series::Nordic, Series::Grimm, Series::Festival] {
        cards.extend(f.sets(1, Rarity::SSR, series));
    }
    cards
}

/// The catalog without festival cards.
pub fn standard() -> Vec<Card> {
    catalog()
        .into_iter()
        .filter(|c| c.series != Series::Festival)
        .collect()
}
