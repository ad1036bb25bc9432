//! Repository trait definition
//!
//! Abstract interface shared by every quote backend

use async_trait::async_trait;
use quotes_core::{Page, PageRequest, Quote, QuoteDraft, QuoteId, SearchCondition};
use std::sync::Arc;

use crate::error::Result;

/// Quote repository.
///
/// `update` and `delete` return `Ok(None)` when no quote has the given id.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Store a new quote under a freshly issued id
    async fn create(&self, draft: &QuoteDraft) -> Result<QuoteId>;

    /// Replace the quote with `id` wholesale
    async fn update(&self, id: QuoteId, draft: &QuoteDraft) -> Result<Option<QuoteId>>;

    async fn delete(&self, id: QuoteId) -> Result<Option<QuoteId>>;

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>>;

    /// Quotes in descending id order
    async fn find_all(&self) -> Result<Vec<Quote>>;

    /// Filter, then slice out one page.
    ///
    /// `Ok(None)` means the backend does not support paging.
    async fn find_page(
        &self,
        condition: &SearchCondition,
        request: PageRequest,
    ) -> Result<Option<Page<Quote>>>;

    /// Flush or compact persisted state
    async fn build(&self) -> Result<()>;
}

/// Shared repository reference
pub type SharedRepository = Arc<dyn QuoteRepository>;
