//! Remote search capability.

use crate::error::SearchError;
use crate::types::ResultPage;
use async_trait::async_trait;

/// A remote, page-oriented search service.
///
/// One network call per invocation, no retry logic: callers own retries and
/// cancellation. Implementations must classify failures into the
/// [`SearchError`] taxonomy.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Fetch one page of results for `query`.
    ///
    /// `page` is 1-based, `page_size` is the requested item count per page.
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ResultPage, SearchError>;
}
