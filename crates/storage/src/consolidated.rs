//! Single-file cached repository
//!
//! The whole collection lives in `data.json` as one array unit. It is read
//! once, on first access, into an in-memory cache. Every mutation rewrites the
//! whole unit and replaces the cache only once the write has succeeded.
//!
//! Two behaviours differ from the other backends:
//! - an empty or missing unit is seeded with placeholder quotes on first load
//! - `find_all` returns only the most recent `recent_limit` quotes

use async_trait::async_trait;
use quotes_core::{Page, PageRequest, Quote, QuoteDraft, QuoteId, SearchCondition, StorageConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{Result, StorageError};
use crate::fs_util::{read_optional, write_staged};
use crate::id_gen::{FileIdGenerator, IdGenerator};
use crate::paging::{paginate, sort_newest_first};
use crate::trait_::{QuoteRepository, SharedRepository};

/// File name of the consolidated unit inside the data directory
pub const DATA_FILE: &str = "data.json";

/// Single-file cached repository
#[derive(Debug)]
pub struct ConsolidatedRepository {
    dir: PathBuf,
    data_path: PathBuf,
    ids: FileIdGenerator,
    recent_limit: usize,
    seed_count: usize,
    /// `None` until first access
    cache: Mutex<Option<Vec<Quote>>>,
}

impl ConsolidatedRepository {
    /// Open the repository in `dir`, creating the directory, counter and an
    /// empty data unit if needed. Nothing is read until first access.
    pub async fn open(dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        let ids = FileIdGenerator::in_dir(&dir);
        ids.ensure().await?;

        let data_path = dir.join(DATA_FILE);
        if !tokio::fs::try_exists(&data_path).await? {
            tokio::fs::write(&data_path, "[]").await?;
        }

        info!("Consolidated repository opened at: {:?}", data_path);

        let defaults = StorageConfig::default();
        Ok(Self {
            dir,
            data_path,
            ids,
            recent_limit: defaults.recent_limit,
            seed_count: defaults.seed_count,
            cache: Mutex::new(None),
        })
    }

    pub fn with_recent_limit(mut self, recent_limit: usize) -> Self {
        self.recent_limit = recent_limit;
        self
    }

    pub fn with_seed_count(mut self, seed_count: usize) -> Self {
        self.seed_count = seed_count;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Cached collection, loading it on first access
    async fn loaded<'a>(&self, state: &'a mut Option<Vec<Quote>>) -> Result<&'a mut Vec<Quote>> {
        let quotes = match state.take() {
            Some(quotes) => quotes,
            None => self.load().await?,
        };
        Ok(state.insert(quotes))
    }

    async fn load(&self) -> Result<Vec<Quote>> {
        let text = read_optional(&self.data_path).await?.unwrap_or_default();
        if text.trim().is_empty() {
            return self.seed().await;
        }

        let segments = codec::split_segments(&text).ok_or_else(|| StorageError::Malformed {
            path: self.data_path.clone(),
            reason: "expected an array of quotes".to_string(),
        })?;
        if segments.is_empty() {
            return self.seed().await;
        }

        let mut quotes = Vec::with_capacity(segments.len());
        for segment in &segments {
            match codec::decode(segment.get()) {
                Some(quote) => quotes.push(quote),
                None => warn!("Skipping undecodable quote in {:?}: {}", self.data_path, segment.get()),
            }
        }

        info!("Loaded {} quotes from {:?}", quotes.len(), self.data_path);
        Ok(quotes)
    }

    /// Write placeholder quotes and move the counter past them
    async fn seed(&self) -> Result<Vec<Quote>> {
        let quotes: Vec<Quote> = (1..=self.seed_count)
            .map(|i| Quote::new(QuoteId(i as i64), format!("작자미상 {i}"), format!("명언{i}")))
            .collect();

        self.persist(&quotes).await?;
        if !quotes.is_empty() {
            self.ids.set_last(self.seed_count as i64).await?;
        }

        info!("Seeded {} placeholder quotes into {:?}", quotes.len(), self.data_path);
        Ok(quotes)
    }

    async fn persist(&self, quotes: &[Quote]) -> Result<()> {
        write_staged(&self.data_path, &codec::encode_collection(quotes)?).await
    }

    async fn newest_first(&self) -> Result<Vec<Quote>> {
        let mut state = self.cache.lock().await;
        let mut quotes = self.loaded(&mut state).await?.clone();
        sort_newest_first(&mut quotes);
        Ok(quotes)
    }
}

#[async_trait]
impl QuoteRepository for ConsolidatedRepository {
    async fn create(&self, draft: &QuoteDraft) -> Result<QuoteId> {
        let mut state = self.cache.lock().await;
        let quotes = self.loaded(&mut state).await?;

        let id = self.ids.next().await?;
        let mut next = quotes.clone();
        next.push(draft.clone().into_quote(id));
        self.persist(&next).await?;
        *quotes = next;

        debug!("Created quote {} in {:?}", id, self.data_path);
        Ok(id)
    }

    async fn update(&self, id: QuoteId, draft: &QuoteDraft) -> Result<Option<QuoteId>> {
        let mut state = self.cache.lock().await;
        let quotes = self.loaded(&mut state).await?;

        let Some(pos) = quotes.iter().position(|q| q.id == id) else {
            return Ok(None);
        };
        let mut next = quotes.clone();
        next[pos] = quotes[pos].replaced_by(draft);
        self.persist(&next).await?;
        *quotes = next;

        debug!("Updated quote {}", id);
        Ok(Some(id))
    }

    async fn delete(&self, id: QuoteId) -> Result<Option<QuoteId>> {
        let mut state = self.cache.lock().await;
        let quotes = self.loaded(&mut state).await?;

        if !quotes.iter().any(|q| q.id == id) {
            return Ok(None);
        }
        let next: Vec<Quote> = quotes.iter().filter(|q| q.id != id).cloned().collect();
        self.persist(&next).await?;
        *quotes = next;

        debug!("Deleted quote {}", id);
        Ok(Some(id))
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>> {
        let mut state = self.cache.lock().await;
        let quotes = self.loaded(&mut state).await?;
        Ok(quotes.iter().find(|q| q.id == id).cloned())
    }

    /// Only the `recent_limit` newest quotes
    async fn find_all(&self) -> Result<Vec<Quote>> {
        let mut quotes = self.newest_first().await?;
        quotes.truncate(self.recent_limit);
        Ok(quotes)
    }

    async fn find_page(
        &self,
        condition: &SearchCondition,
        request: PageRequest,
    ) -> Result<Option<Page<Quote>>> {
        Ok(Some(paginate(self.newest_first().await?, condition, request)))
    }

    /// Rewrite the whole unit from the cache
    async fn build(&self) -> Result<()> {
        let mut state = self.cache.lock().await;
        let quotes = self.loaded(&mut state).await?;
        self.persist(quotes).await?;

        info!("Rebuilt {:?} with {} quotes", self.data_path, quotes.len());
        Ok(())
    }
}

/// Create a new shared consolidated repository
pub async fn create_consolidated_repository(
    dir: impl Into<PathBuf>,
    recent_limit: usize,
    seed_count: usize,
) -> Result<SharedRepository> {
    let repo = ConsolidatedRepository::open(dir.into())
        .await?
        .with_recent_limit(recent_limit)
        .with_seed_count(seed_count);
    Ok(Arc::new(repo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_gen::LAST_ID_FILE;
    use tempfile::tempdir;

    async fn unseeded(dir: &Path) -> ConsolidatedRepository {
        ConsolidatedRepository::open(dir.to_path_buf())
            .await
            .unwrap()
            .with_seed_count(0)
    }

    #[tokio::test]
    async fn test_first_load_seeds_placeholders() {
        let dir = tempdir().unwrap();
        let repo = ConsolidatedRepository::open(dir.path().to_path_buf()).await.unwrap();

        let first = repo.find_by_id(QuoteId(1)).await.unwrap();
        assert_eq!(first, Some(Quote::new(QuoteId(1), "작자미상 1", "명언1")));
        assert_eq!(std::fs::read_to_string(dir.path().join(LAST_ID_FILE)).unwrap(), "10");

        let next = repo.create(&QuoteDraft::new("a", "c")).await.unwrap();
        assert_eq!(next, QuoteId(11));
    }

    #[tokio::test]
    async fn test_find_all_returns_recent_five() {
        let dir = tempdir().unwrap();
        let repo = ConsolidatedRepository::open(dir.path().to_path_buf()).await.unwrap();

        let ids: Vec<i64> = repo.find_all().await.unwrap().iter().map(|q| q.id.0).collect();
        assert_eq!(ids, vec![10, 9, 8, 7, 6]);
    }

    #[tokio::test]
    async fn test_mutation_rewrites_whole_unit() {
        let dir = tempdir().unwrap();
        let repo = unseeded(dir.path()).await;

        repo.create(&QuoteDraft::new("a1", "c1")).await.unwrap();
        repo.create(&QuoteDraft::new("a2", "c2")).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join(DATA_FILE)).unwrap();
        assert_eq!(
            codec::decode_collection(&text).unwrap(),
            vec![
                Quote::new(QuoteId(1), "a1", "c1"),
                Quote::new(QuoteId(2), "a2", "c2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_cache_loaded_once() {
        let dir = tempdir().unwrap();
        let repo = unseeded(dir.path()).await;
        let id = repo.create(&QuoteDraft::new("a", "c")).await.unwrap();

        // Out-of-band edits are not seen once the cache is loaded
        std::fs::write(dir.path().join(DATA_FILE), "[]").unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reopen_reads_persisted_unit() {
        let dir = tempdir().unwrap();
        {
            let repo = unseeded(dir.path()).await;
            repo.create(&QuoteDraft::new("a", "1")).await.unwrap();
            let id = repo.create(&QuoteDraft::new("b", "2")).await.unwrap();
            repo.update(id, &QuoteDraft::new("b", "two")).await.unwrap();
        }

        let repo = unseeded(dir.path()).await;
        assert_eq!(
            repo.find_by_id(QuoteId(2)).await.unwrap(),
            Some(Quote::new(QuoteId(2), "b", "two"))
        );
        assert_eq!(repo.create(&QuoteDraft::new("c", "3")).await.unwrap(), QuoteId(3));
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let dir = tempdir().unwrap();
        let repo = unseeded(dir.path()).await;
        let id = repo.create(&QuoteDraft::new("a", "c")).await.unwrap();

        assert_eq!(repo.delete(id).await.unwrap(), Some(id));
        assert_eq!(repo.delete(id).await.unwrap(), None);
        assert_eq!(repo.update(id, &QuoteDraft::new("a", "c")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_rewrite_leaves_cache_untouched() {
        let dir = tempdir().unwrap();
        let repo = unseeded(dir.path()).await;
        let id = repo.create(&QuoteDraft::new("a", "c")).await.unwrap();

        // A non-empty directory cannot be renamed over
        let data_path = dir.path().join(DATA_FILE);
        std::fs::remove_file(&data_path).unwrap();
        std::fs::create_dir(&data_path).unwrap();
        std::fs::write(data_path.join("blocker"), "x").unwrap();

        assert!(repo.create(&QuoteDraft::new("b", "d")).await.is_err());
        assert_eq!(repo.find_by_id(QuoteId(2)).await.unwrap(), None);

        assert!(repo.update(id, &QuoteDraft::new("a2", "c2")).await.is_err());
        assert_eq!(
            repo.find_by_id(id).await.unwrap(),
            Some(Quote::new(id, "a", "c"))
        );

        assert!(repo.delete(id).await.is_err());
        assert!(repo.find_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_not_an_array_is_malformed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DATA_FILE), "{\"id\": 1}").unwrap();
        let repo = ConsolidatedRepository::open(dir.path().to_path_buf()).await.unwrap();

        let err = repo.find_all().await.unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_segment_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(DATA_FILE),
            "[{\"id\": 1, \"content\": \"c\", \"author\": \"a\"}, {\"id\": 2}]",
        )
        .unwrap();
        let repo = ConsolidatedRepository::open(dir.path().to_path_buf()).await.unwrap();

        assert_eq!(repo.find_all().await.unwrap(), vec![Quote::new(QuoteId(1), "a", "c")]);
    }

    #[tokio::test]
    async fn test_build_rewrites_from_cache() {
        let dir = tempdir().unwrap();
        let repo = unseeded(dir.path()).await;
        repo.create(&QuoteDraft::new("a", "c")).await.unwrap();

        std::fs::remove_file(dir.path().join(DATA_FILE)).unwrap();
        repo.build().await.unwrap();

        let text = std::fs::read_to_string(dir.path().join(DATA_FILE)).unwrap();
        assert_eq!(codec::decode_collection(&text).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_defaults_follow_storage_config() {
        let dir = tempdir().unwrap();
        let repo = ConsolidatedRepository::open(dir.path().to_path_buf()).await.unwrap();
        let defaults = StorageConfig::default();

        assert_eq!(repo.find_all().await.unwrap().len(), defaults.recent_limit);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(LAST_ID_FILE)).unwrap(),
            defaults.seed_count.to_string()
        );
    }

    #[tokio::test]
    async fn test_custom_recent_limit() {
        let dir = tempdir().unwrap();
        let repo = ConsolidatedRepository::open(dir.path().to_path_buf())
            .await
            .unwrap()
            .with_recent_limit(2);

        assert_eq!(repo.find_all().await.unwrap().len(), 2);
    }
}
