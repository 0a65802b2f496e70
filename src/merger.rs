//! Merge fetched pages with the local favorite set.

use crate::types::{Item, ResultPage};
use std::collections::HashSet;

/// Annotate a fetched page with the favorite-id snapshot taken at merge time.
///
/// Pure and deterministic: the page is not mutated, items keep their server
/// order, and `liked` is recomputed from scratch so applying the same
/// snapshot twice yields the same result.
pub fn merge(page: &ResultPage, favorite_ids: &HashSet<u64>) -> Vec<Item> {
    page.items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            item.liked = favorite_ids.contains(&item.id);
            item
        })
        .collect()
}
