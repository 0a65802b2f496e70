pub mod client;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod github;
pub mod merger;
pub mod projection;
pub mod sqlite_store;
pub mod store;
pub mod types;

// 公開API
pub use client::SearchClient;
pub use controller::{ControllerState, QueryController};
pub use error::SearchError;
pub use github::GitHubSearchClient;
pub use sqlite_store::SqliteFavoritesStore;
pub use store::{FavoritesStore, MemoryFavoritesStore};
pub use types::{ControllerConfig, Item, ResultPage, SortDirection};
