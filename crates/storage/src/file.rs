//! One-file-per-record repository
//!
//! Each quote is a `<id>.json` unit in the data directory, next to the
//! `lastId.txt` counter. Paging is not available on this backend.

use async_trait::async_trait;
use quotes_core::{Page, PageRequest, Quote, QuoteDraft, QuoteId, SearchCondition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::Result;
use crate::fs_util::{read_optional, write_staged};
use crate::id_gen::{FileIdGenerator, IdGenerator};
use crate::paging::sort_newest_first;
use crate::trait_::{QuoteRepository, SharedRepository};

/// One-file-per-record repository
#[derive(Debug)]
pub struct FileRepository {
    /// 数据目录
    dir: PathBuf,

    ids: FileIdGenerator,

    /// Serializes mutations
    write_lock: Mutex<()>,
}

impl FileRepository {
    /// Open the repository in `dir`, creating the directory and counter if needed
    pub async fn open(dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        let ids = FileIdGenerator::in_dir(&dir);
        ids.ensure().await?;

        info!("File-per-record repository opened at: {:?}", dir);

        Ok(Self {
            dir,
            ids,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn unit_path(&self, id: QuoteId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Parse a quote id from a `<id>.json` file name
    fn parse_unit_id(path: &Path) -> Option<QuoteId> {
        if path.extension()? != "json" {
            return None;
        }
        path.file_stem()?.to_str()?.parse::<i64>().ok().map(QuoteId)
    }

    async fn exists(&self, id: QuoteId) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.unit_path(id)).await?)
    }

    async fn write_unit(&self, quote: &Quote) -> Result<()> {
        write_staged(&self.unit_path(quote.id), &codec::encode(quote)?).await
    }

    async fn load_unit(path: &Path) -> Result<Option<Quote>> {
        let Some(text) = read_optional(path).await? else {
            return Ok(None);
        };
        let quote = codec::decode(&text);
        if quote.is_none() {
            warn!("Failed to decode quote unit {:?}", path);
        }
        Ok(quote)
    }
}

#[async_trait]
impl QuoteRepository for FileRepository {
    async fn create(&self, draft: &QuoteDraft) -> Result<QuoteId> {
        let _guard = self.write_lock.lock().await;

        let id = self.ids.next().await?;
        self.write_unit(&draft.clone().into_quote(id)).await?;

        debug!("Created quote {} in {:?}", id, self.dir);
        Ok(id)
    }

    async fn update(&self, id: QuoteId, draft: &QuoteDraft) -> Result<Option<QuoteId>> {
        let _guard = self.write_lock.lock().await;

        if !self.exists(id).await? {
            return Ok(None);
        }
        self.write_unit(&draft.clone().into_quote(id)).await?;

        debug!("Updated quote {}", id);
        Ok(Some(id))
    }

    async fn delete(&self, id: QuoteId) -> Result<Option<QuoteId>> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(self.unit_path(id)).await {
            Ok(()) => {
                debug!("Deleted quote {}", id);
                Ok(Some(id))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>> {
        Self::load_unit(&self.unit_path(id)).await
    }

    async fn find_all(&self) -> Result<Vec<Quote>> {
        let mut quotes = Vec::new();

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if Self::parse_unit_id(&path).is_none() {
                continue;
            }
            if let Some(quote) = Self::load_unit(&path).await? {
                quotes.push(quote);
            }
        }

        sort_newest_first(&mut quotes);
        Ok(quotes)
    }

    async fn find_page(
        &self,
        _condition: &SearchCondition,
        _request: PageRequest,
    ) -> Result<Option<Page<Quote>>> {
        debug!("Paging requested from the file-per-record repository, which has none");
        Ok(None)
    }

    async fn build(&self) -> Result<()> {
        Ok(())
    }
}

/// Create a new shared file-per-record repository
pub async fn create_file_repository(dir: impl Into<PathBuf>) -> Result<SharedRepository> {
    Ok(Arc::new(FileRepository::open(dir.into()).await?))
}
