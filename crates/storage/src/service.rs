//! Quote service
//!
//! Sits between a front end and the repository: validates input and turns
//! "not found" results into errors the caller can present.

use quotes_core::{KeywordType, Page, PageRequest, Quote, QuoteDraft, QuoteId, SearchCondition};

use crate::error::StorageError;
use crate::trait_::SharedRepository;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("{0}번 명언은 존재하지 않습니다.")]
    NotFound(QuoteId),

    #[error("paging is not supported by this storage backend")]
    PagingUnsupported,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Clone)]
pub struct QuoteService {
    repository: SharedRepository,
}

impl QuoteService {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &SharedRepository {
        &self.repository
    }

    /// Store a new quote; author and content must not be blank
    pub async fn create(&self, draft: &QuoteDraft) -> ServiceResult<QuoteId> {
        validate(draft)?;
        Ok(self.repository.create(draft).await?)
    }

    pub async fn find_by_id(&self, id: QuoteId) -> ServiceResult<Quote> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Whatever the backend's `find_all` returns
    pub async fn list_all(&self) -> ServiceResult<Vec<Quote>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn update(&self, id: QuoteId, draft: &QuoteDraft) -> ServiceResult<QuoteId> {
        validate(draft)?;
        self.repository
            .update(id, draft)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn delete(&self, id: QuoteId) -> ServiceResult<QuoteId> {
        self.repository
            .delete(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn build(&self) -> ServiceResult<()> {
        Ok(self.repository.build().await?)
    }

    /// Keyword search, one page at a time
    pub async fn page(
        &self,
        keyword_type: KeywordType,
        keyword: &str,
        request: PageRequest,
    ) -> ServiceResult<Page<Quote>> {
        let condition = SearchCondition::from_keyword(keyword_type, keyword);
        self.repository
            .find_page(&condition, request)
            .await?
            .ok_or(ServiceError::PagingUnsupported)
    }
}

fn validate(draft: &QuoteDraft) -> ServiceResult<()> {
    if draft.author.trim().is_empty() {
        return Err(ServiceError::InvalidInput("작가는 비어있을 수 없습니다."));
    }
    if draft.content.trim().is_empty() {
        return Err(ServiceError::InvalidInput("명언은 비어있을 수 없습니다."));
    }
    Ok(())
}
