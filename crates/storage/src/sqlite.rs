//! SQLite Repository - relational quote storage
//!
//! One row per quote; ids come from the table's AUTOINCREMENT key.
//!
//! Features:
//! - Schema created on open
//! - Filtering and paging pushed down into SQL (`LIKE`, `COUNT(*)`, `LIMIT/OFFSET`)
//! - A fresh connection per operation, run on the blocking pool

use async_trait::async_trait;
use quotes_core::{Page, PageRequest, Quote, QuoteDraft, QuoteId, SearchCondition};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::trait_::{QuoteRepository, SharedRepository};

/// Column bounds enforced by the schema
pub const MAX_AUTHOR_LEN: usize = 100;
pub const MAX_CONTENT_LEN: usize = 1000;

/// SQLite repository implementation
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    /// Database file path
    path: PathBuf,

    /// Table name, checked to be a plain identifier
    table: String,
}

impl SqliteRepository {
    /// Open (creating if needed) the database at `path` and make sure `table` exists
    pub async fn new(path: PathBuf, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(StorageError::InvalidConfig(format!(
                "table name is not a plain identifier: {table:?}"
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let schema_table = table.clone();
        run_sqlite(path.clone(), move |conn| init_schema(conn, &schema_table)).await?;

        info!("SQLite repository initialized at: {:?} (table {})", path, table);

        Ok(Self { path, table })
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Initialize database schema
fn init_schema(conn: &rusqlite::Connection, table: &str) -> Result<()> {
    conn.execute(
        &format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL CHECK (length(content) <= {MAX_CONTENT_LEN}),
                author TEXT NOT NULL CHECK (length(author) <= {MAX_AUTHOR_LEN})
            )
            "#
        ),
        [],
    )?;
    Ok(())
}

/// Helper function to run blocking SQLite operations on a fresh connection.
///
/// `LIKE` is made case-sensitive so substring search agrees with the
/// in-process backends.
async fn run_sqlite<T, F>(path: PathBuf, f: F) -> Result<T>
where
    F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let conn = rusqlite::Connection::open(&path)?;
        conn.pragma_update(None, "case_sensitive_like", true)?;
        f(&conn)
    })
    .await?
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: QuoteId(row.get("id")?),
        content: row.get("content")?,
        author: row.get("author")?,
    })
}

/// `WHERE` clause and its bind values for a search condition
fn where_clause(condition: &SearchCondition) -> (String, Vec<Value>) {
    let like = |s: &str| Value::Text(format!("%{s}%"));

    match (condition.author_filter(), condition.content_filter()) {
        (None, None) => (String::new(), Vec::new()),
        (Some(author), None) => (" WHERE author LIKE ?".to_string(), vec![like(author)]),
        (None, Some(content)) => (" WHERE content LIKE ?".to_string(), vec![like(content)]),
        (Some(author), Some(content)) => (
            " WHERE (author LIKE ? OR content LIKE ?)".to_string(),
            vec![like(author), like(content)],
        ),
    }
}

#[async_trait]
impl QuoteRepository for SqliteRepository {
    async fn create(&self, draft: &QuoteDraft) -> Result<QuoteId> {
        let sql = format!("INSERT INTO {} (content, author) VALUES (?1, ?2)", self.table);
        let draft = draft.clone();

        let id = run_sqlite(self.path.clone(), move |conn| {
            let affected = conn.execute(&sql, params![draft.content, draft.author])?;
            if affected == 0 {
                return Err(StorageError::Database("INSERT affected no rows".to_string()));
            }
            Ok(QuoteId(conn.last_insert_rowid()))
        })
        .await?;

        debug!("Inserted quote {}", id);
        Ok(id)
    }

    async fn update(&self, id: QuoteId, draft: &QuoteDraft) -> Result<Option<QuoteId>> {
        let sql = format!("UPDATE {} SET content = ?1, author = ?2 WHERE id = ?3", self.table);
        let draft = draft.clone();

        let affected = run_sqlite(self.path.clone(), move |conn| {
            Ok(conn.execute(&sql, params![draft.content, draft.author, id.0])?)
        })
        .await?;

        debug!("Update of quote {} affected {} rows", id, affected);
        Ok((affected != 0).then_some(id))
    }

    async fn delete(&self, id: QuoteId) -> Result<Option<QuoteId>> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table);

        let affected = run_sqlite(self.path.clone(), move |conn| {
            Ok(conn.execute(&sql, params![id.0])?)
        })
        .await?;

        debug!("Delete of quote {} affected {} rows", id, affected);
        Ok((affected != 0).then_some(id))
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>> {
        let sql = format!("SELECT id, content, author FROM {} WHERE id = ?1", self.table);

        run_sqlite(self.path.clone(), move |conn| {
            Ok(conn.query_row(&sql, params![id.0], map_row).optional()?)
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Quote>> {
        let sql = format!("SELECT id, content, author FROM {} ORDER BY id DESC", self.table);

        run_sqlite(self.path.clone(), move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], map_row)?;

            let mut result = Vec::new();
            for quote in rows {
                result.push(quote?);
            }
            Ok(result)
        })
        .await
    }

    async fn find_page(
        &self,
        condition: &SearchCondition,
        request: PageRequest,
    ) -> Result<Option<Page<Quote>>> {
        let (filter, binds) = where_clause(condition);
        let count_sql = format!("SELECT COUNT(*) FROM {}{}", self.table, filter);
        let page_sql = format!(
            "SELECT id, content, author FROM {}{} ORDER BY id DESC LIMIT ? OFFSET ?",
            self.table, filter
        );
        let limit = i64::try_from(request.page_size()).unwrap_or(i64::MAX);
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);

        let (total_count, content) = run_sqlite(self.path.clone(), move |conn| {
            let total: i64 = conn.query_row(&count_sql, params_from_iter(binds.iter()), |row| {
                row.get(0)
            })?;

            let mut page_binds = binds;
            page_binds.push(Value::Integer(limit));
            page_binds.push(Value::Integer(offset));

            let mut stmt = conn.prepare(&page_sql)?;
            let rows = stmt.query_map(params_from_iter(page_binds.iter()), map_row)?;
            let mut content = Vec::new();
            for quote in rows {
                content.push(quote?);
            }
            Ok((total, content))
        })
        .await?;

        let total_count = usize::try_from(total_count).unwrap_or_default();
        Ok(Some(Page::new(content, request, total_count)))
    }

    async fn build(&self) -> Result<()> {
        Ok(())
    }
}

/// Create a new shared SQLite repository
pub async fn create_sqlite_repository(
    path: impl Into<PathBuf>,
    table: impl Into<String>,
) -> Result<SharedRepository> {
    Ok(Arc::new(SqliteRepository::new(path.into(), table).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn repo(dir: &Path) -> SqliteRepository {
        SqliteRepository::new(dir.join("quotes.db"), "say").await.unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_repository_new() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path()).await;
        assert!(repo.path().exists());
        assert_eq!(repo.table(), "say");
    }

    #[tokio::test]
    async fn test_rejects_unsafe_table_name() {
        let dir = tempdir().unwrap();
        let err = SqliteRepository::new(dir.path().join("q.db"), "say; DROP TABLE x")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(_)));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("say"));
        assert!(is_identifier("_quotes_2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2say"));
        assert!(!is_identifier("say-it"));
    }

    #[tokio::test]
    async fn test_insert_reads_back_generated_key() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path()).await;

        let first = repo.create(&QuoteDraft::new("a", "c")).await.unwrap();
        let second = repo.create(&QuoteDraft::new("b", "d")).await.unwrap();
        assert_eq!((first, second), (QuoteId(1), QuoteId(2)));

        // AUTOINCREMENT never hands out a deleted key again
        repo.delete(second).await.unwrap();
        assert_eq!(repo.create(&QuoteDraft::new("e", "f")).await.unwrap(), QuoteId(3));
    }

    #[tokio::test]
    async fn test_zero_rows_affected_is_not_found() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path()).await;

        assert_eq!(repo.update(QuoteId(9), &QuoteDraft::new("a", "c")).await.unwrap(), None);
        assert_eq!(repo.delete(QuoteId(9)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_like_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path()).await;
        repo.create(&QuoteDraft::new("Seneca", "c")).await.unwrap();

        let page = repo
            .find_page(&SearchCondition::author("seneca"), PageRequest::first(5).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn test_content_bound_enforced() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path()).await;

        let too_long = "x".repeat(MAX_CONTENT_LEN + 1);
        let err = repo.create(&QuoteDraft::new("a", too_long)).await.unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
    }

    #[test]
    fn test_where_clause() {
        let (sql, binds) = where_clause(&SearchCondition::none());
        assert!(sql.is_empty() && binds.is_empty());

        let (sql, binds) = where_clause(&SearchCondition::new(Some("a".into()), Some("c".into())));
        assert_eq!(sql, " WHERE (author LIKE ? OR content LIKE ?)");
        assert_eq!(
            binds,
            vec![Value::Text("%a%".to_string()), Value::Text("%c%".to_string())]
        );
    }
}
