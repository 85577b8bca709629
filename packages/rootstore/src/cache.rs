//! On-disk store cache
//!
//! A normalized store file that exists and is non-empty is authoritative.
//! Stale or corrupt content is not detected here; it shows up as a parse
//! error when the pool is built.

use std::path::Path;

use tokio::fs;

use crate::error::Result;

/// Whether `path` holds a non-empty store file
pub async fn store_is_populated(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() && metadata.len() > 0 => {
            tracing::info!("{} already exists", path.display());
            true
        }
        _ => false,
    }
}

/// Write a store file via a temporary sibling and rename
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub async fn write_store(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("pem.tmp");
    fs::write(&temp_path, contents).await?;
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}
