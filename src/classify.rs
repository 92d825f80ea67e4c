//! Grouping and filtering item collections by a category key.

use std::collections::BTreeMap;

use crate::{Category, Item};

/// Group items by category. Categories come out in rank order; items keep
/// their encounter order within a category.
pub fn classify<'a, T, C, I, K>(items: I, key: K) -> BTreeMap<C, Vec<&'a T>>
where
    T: 'a,
    C: Category,
    I: IntoIterator<Item = &'a T>,
    K: Fn(&T) -> C,
{
    let mut groups: BTreeMap<C, Vec<&'a T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item);
    }
    groups
}

/// Number of items per category, in rank order.
pub fn classify_counts<'a, T, C, I, K>(items: I, key: K) -> BTreeMap<C, u64>
where
    T: 'a,
    C: Category,
    I: IntoIterator<Item = &'a T>,
    K: Fn(&T) -> C,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_default() += 1;
    }
    counts
}

/// Items whose category is one of `values`, in encounter order.
pub fn filter<'a, T, C, I, K>(items: I, key: K, values: &[C]) -> Vec<&'a T>
where
    T: 'a,
    C: Category,
    I: IntoIterator<Item = &'a T>,
    K: Fn(&T) -> C,
{
    items
        .into_iter()
        .filter(|item| values.contains(&key(item)))
        .collect()
}

/// Ids of all items, in encounter order.
pub fn ids<'a, T, I>(items: I) -> Vec<T::Id>
where
    T: Item + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().map(|item| item.id()).collect()
}
