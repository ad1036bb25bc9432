//! Backend selection
//!
//! The backend is picked once from configuration; the rest of the program only
//! sees `SharedRepository`.

use quotes_core::{BackendKind, StorageConfig};
use tracing::info;

use crate::consolidated::create_consolidated_repository;
use crate::error::Result;
use crate::file::create_file_repository;
use crate::memory::create_memory_repository;
use crate::trait_::SharedRepository;

/// Open the repository described by `config`
pub async fn open_repository(config: &StorageConfig) -> Result<SharedRepository> {
    info!("Opening {} quote repository", config.backend);

    match config.backend {
        BackendKind::Memory => Ok(create_memory_repository()),
        BackendKind::FilePerRecord => create_file_repository(config.data_dir.clone()).await,
        BackendKind::Consolidated => {
            create_consolidated_repository(
                config.data_dir.clone(),
                config.recent_limit,
                config.seed_count,
            )
            .await
        }
        BackendKind::Sqlite => open_sqlite(config).await,
    }
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(config: &StorageConfig) -> Result<SharedRepository> {
    crate::sqlite::create_sqlite_repository(config.db_path.clone(), config.table.clone()).await
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_config: &StorageConfig) -> Result<SharedRepository> {
    Err(crate::error::StorageError::InvalidConfig(
        "built without the `sqlite` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotes_core::{QuoteDraft, QuoteId};
    use tempfile::tempdir;

    fn config(backend: BackendKind, dir: &std::path::Path) -> StorageConfig {
        StorageConfig {
            backend,
            data_dir: dir.join("data"),
            db_path: dir.join("quotes.db"),
            seed_count: 0,
            ..StorageConfig::default()
        }
    }

    #[tokio::test]
    async fn test_opens_every_backend() {
        for backend in [
            BackendKind::Memory,
            BackendKind::FilePerRecord,
            BackendKind::Consolidated,
            BackendKind::Sqlite,
        ] {
            let dir = tempdir().unwrap();
            let repo = open_repository(&config(backend, dir.path())).await.unwrap();
            let id = repo.create(&QuoteDraft::new("a", "c")).await.unwrap();
            assert_eq!(id, QuoteId(1), "backend {backend}");
        }
    }

    #[tokio::test]
    async fn test_file_backends_use_data_dir() {
        let dir = tempdir().unwrap();
        open_repository(&config(BackendKind::Consolidated, dir.path()))
            .await
            .unwrap();
        assert!(dir.path().join("data").join("data.json").exists());
    }
}
