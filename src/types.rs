use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single displayable search result.
///
/// `liked` is derived state: the authoritative favorite set lives in the
/// [`FavoritesStore`](crate::store::FavoritesStore). It is set when a fetched
/// page is merged against a favorites snapshot and flipped in place by
/// optimistic like toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Stable unique identifier assigned by the remote service
    pub id: u64,
    /// Human-readable name used for display and sorting
    pub display_name: String,
    /// Reference to the item's image (URL or similar)
    pub image_ref: String,
    /// Whether the item is in the local favorite set
    pub liked: bool,
}

/// One page of results as returned by a [`SearchClient`](crate::client::SearchClient).
///
/// Ephemeral: produced per fetch and consumed immediately by the merge step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    /// Items in server order
    pub items: Vec<Item>,
    /// Total number of matches on the server, across all pages
    pub total_count: u64,
}

/// Display ordering for the accumulated result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Tuning knobs for a [`QueryController`](crate::controller::QueryController).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Items requested per page
    pub page_size: u32,
    /// Quiet period before a typed query is turned into a search
    pub debounce: Duration,
    /// Whether a failed favorite persistence undoes the optimistic flip
    pub rollback_on_persist_failure: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: 30,
            debounce: Duration::from_millis(300),
            rollback_on_persist_failure: false,
        }
    }
}
