//! # gachabox
//!
//! Exact-ratio lottery boxes: turn rarity ratios and pickup rules into a
//! multiset of items whose uniform draws hit the configured rates *exactly*.
//!
//! Every weight is an exact rational ([`Weight`]), never a float, so a box
//! built for `N:79, R:20, SR:1` contains N, R and SR entries in precisely
//! that proportion no matter how many distinct items each tier holds.
//!
//! The engine has four parts:
//!
//! 1. **Normalization** with [`RatioMap::normalize`] / [`Weight::to_integer`]
//! 2. **Box building** with [`LotteryBox::build`] or [`BoxBuilder`]
//! 3. **Rarity boosts** with [`RatioMap::boost`]
//! 4. **Pickup boosts** with [`pickup`] or [`Pickup`]
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use gachabox::{Category, Item, LotteryBox, RatioMap};
//!
//! #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Category)]
//! enum Rarity { N, R, SR, SSR }
//!
//! struct Card { id: u32, rarity: Rarity }
//!
//! impl Item for Card {
//!     type Id = u32;
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! # fn main() -> gachabox::Result<()> {
//! # let cards: Vec<Card> = Vec::new();
//! let ratio = RatioMap::parse("R=79, SR=20, SSR=1")?;
//! let boosted = ratio.boost(Rarity::SSR, "2".parse()?)?;
//!
//! let lottery = LotteryBox::build(&cards, &boosted, |c: &Card| c.rarity)?;
//! let mut rng = rand::rng();
//! let card = lottery.sample(&mut rng);
//! # Ok(()) }
//! ```
//!
//! ## Composition
//! * [`RatioMap::boost`] returns a new ratio map; feed it to the box builder.
//! * [`pickup`] returns a replicated item list; feed it to the box builder.
//!   The builder counts the replicas, so categories the pickup did not touch
//!   keep their share.
//!
//! ## Gotchas
//! * Box length is the LCM of the per-category item counts times the reduced
//!   ratio sum. Coprime counts grow it quickly; [`LotteryBox`] stores runs
//!   rather than a flat vector and [`BoxBuilder::max_len`] can cap it.
//! * Category order matters: the lowest-ranked category of a ratio map absorbs
//!   rarity boosts. With `#[derive(Category)]` the first variant is lowest.

extern crate self as gachabox;

mod classify;
mod error;
mod lottery;
mod pickup;
mod rarity;
mod ratio;
mod sampler;
mod tally;
mod weight;

#[cfg(test)]
mod fixtures;

use std::fmt::Debug;
use std::hash::Hash;

/// A minimal interface for “index samplers”.
/// Implemented by [`UniformSampler`] and [`LotteryBox`], which delegates to
/// the sampler it builds over its flat positions.
#[allow(clippy::len_without_is_empty)]
pub trait IndexSampler {
    fn len(&self) -> u64;
    fn sample_index<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> u64;
}

/// One category dimension (rarity, series, element, ...).
///
/// `Ord` must agree with [`Category::rank`]: it is the rarity order, and the
/// least category present in a [`RatioMap`] is the base tier that absorbs
/// rarity boosts. The [`Category`](derive@Category) derive generates both from
/// declaration order.
pub trait Category: Copy + Ord + Hash + Debug + 'static {
    /// All variants, lowest rank first.
    const ALL: &'static [Self];

    /// Display name, also used when parsing ratio maps.
    fn name(&self) -> &'static str;

    /// Position in the rank order, `0` for the lowest.
    fn rank(&self) -> usize;

    /// Look a variant up by its [`name`](Category::name).
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// The lowest-ranked variant, if the type has any.
    fn lowest() -> Option<Self> {
        Self::ALL.iter().copied().min()
    }
}

/// Anything that can be put in a lottery box.
///
/// Items are only ever borrowed; boxes and pickup lists hold `&T`.
pub trait Item {
    type Id: Clone + Eq + Hash + Ord + Debug;

    /// Stable unique identifier.
    fn id(&self) -> Self::Id;
}

pub use classify::{classify, classify_counts, filter, ids};
pub use error::{LotteryError, Result};
pub use lottery::{BoxBuilder, LotteryBox};
pub use pickup::{Pickup, pickup};
pub use ratio::RatioMap;
pub use sampler::UniformSampler;
pub use tally::Tally;
pub use weight::Weight;

/// Derive macro imported from `gachabox_macros`.
/// See the crate-level example for usage.
pub use gachabox_macros::Category;
