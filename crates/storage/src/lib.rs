// Quotes Storage Layer
//
// Repository contract with pluggable backends:
// - memory: process-local map
// - file: one JSON unit per quote
// - consolidated: one JSON array unit, cached in memory
// - sqlite: one row per quote

pub mod trait_;
pub mod error;
pub mod id_gen;
pub mod codec;
pub mod paging;
pub mod memory;
pub mod file;
pub mod consolidated;
pub mod factory;
pub mod service;
mod fs_util;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use trait_::*;
pub use error::{Result, StorageError};
pub use memory::{MemoryRepository, create_memory_repository};
pub use file::{FileRepository, create_file_repository};
pub use consolidated::{ConsolidatedRepository, create_consolidated_repository};
pub use factory::open_repository;
pub use service::{QuoteService, ServiceError, ServiceResult};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteRepository, create_sqlite_repository};
