//! File helpers shared by the file backends

use std::path::{Path, PathBuf};

use crate::error::Result;

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to a `.tmp` sibling, then rename it over `path`
pub async fn write_staged(path: &Path, contents: &str) -> Result<()> {
    let temp_path = staging_path(path);
    tokio::fs::write(&temp_path, contents).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Read a UTF-8 file, `None` if it does not exist
pub async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
