//! In-memory repository implementation
//!
//! Quotes live only as long as the process; the map is queried directly on
//! every listing.

use async_trait::async_trait;
use quotes_core::{Page, PageRequest, Quote, QuoteDraft, QuoteId, SearchCondition};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::id_gen::{IdGenerator, MemoryIdGenerator};
use crate::paging::{paginate, sort_newest_first};
use crate::trait_::{QuoteRepository, SharedRepository};

/// In-memory repository implementation
#[derive(Debug, Default)]
pub struct MemoryRepository {
    ids: MemoryIdGenerator,
    quotes: Mutex<HashMap<QuoteId, Quote>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn quotes(&self) -> Result<MutexGuard<'_, HashMap<QuoteId, Quote>>> {
        self.quotes
            .lock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))
    }

    fn newest_first(&self) -> Result<Vec<Quote>> {
        let mut all: Vec<Quote> = self.quotes()?.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }
}

#[async_trait]
impl QuoteRepository for MemoryRepository {
    async fn create(&self, draft: &QuoteDraft) -> Result<QuoteId> {
        let id = self.ids.next().await?;
        self.quotes()?.insert(id, draft.clone().into_quote(id));

        debug!("Created quote {} in memory", id);
        Ok(id)
    }

    async fn update(&self, id: QuoteId, draft: &QuoteDraft) -> Result<Option<QuoteId>> {
        let mut quotes = self.quotes()?;
        match quotes.get_mut(&id) {
            Some(existing) => {
                *existing = existing.replaced_by(draft);
                debug!("Updated quote {}", id);
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: QuoteId) -> Result<Option<QuoteId>> {
        let removed = self.quotes()?.remove(&id).map(|_| id);
        if removed.is_some() {
            debug!("Deleted quote {}", id);
        }
        Ok(removed)
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>> {
        Ok(self.quotes()?.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Quote>> {
        self.newest_first()
    }

    async fn find_page(
        &self,
        condition: &SearchCondition,
        request: PageRequest,
    ) -> Result<Option<Page<Quote>>> {
        Ok(Some(paginate(self.newest_first()?, condition, request)))
    }

    async fn build(&self) -> Result<()> {
        Ok(())
    }
}

/// Create a new shared in-memory repository
pub fn create_memory_repository() -> SharedRepository {
    Arc::new(MemoryRepository::new())
}
