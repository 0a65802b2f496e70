//! Display ordering for accumulated results.

use crate::types::{Item, SortDirection};

/// Produce the display order for `items` without touching the input.
///
/// Comparison is case-insensitive lexicographic on the display name. The
/// sort is stable, so items with equal names keep their fetch-arrival order
/// under both directions. Safe to call on every render.
pub fn project(items: &[Item], direction: SortDirection) -> Vec<Item> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| {
        let ordering = a
            .display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase());
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, name: &str) -> Item {
        Item {
            id,
            display_name: name.to_string(),
            image_ref: String::new(),
            liked: false,
        }
    }

    #[test]
    fn test_ascending_is_case_insensitive() {
        let items = vec![item(1, "Zeta"), item(2, "alpha"), item(3, "Beta")];
        let sorted = project(&items, SortDirection::Ascending);

        let names: Vec<&str> = sorted.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn test_descending_reverses_names() {
        let items = vec![item(1, "alpha"), item(2, "Zeta"), item(3, "beta")];
        let sorted = project(&items, SortDirection::Descending);

        let names: Vec<&str> = sorted.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "beta", "alpha"]);
    }

    #[test]
    fn test_ties_keep_fetch_order_both_directions() {
        // Same name modulo case: ties must preserve arrival order
        let items = vec![item(10, "Ada"), item(20, "ada"), item(30, "ADA")];

        let ascending = project(&items, SortDirection::Ascending);
        let ids: Vec<u64> = ascending.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);

        let descending = project(&items, SortDirection::Descending);
        let ids: Vec<u64> = descending.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let items = vec![item(2, "b"), item(1, "a")];
        let _ = project(&items, SortDirection::Ascending);
        assert_eq!(items[0].id, 2);
    }
}
