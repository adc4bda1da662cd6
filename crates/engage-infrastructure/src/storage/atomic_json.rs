//! Atomic JSON file operations.
//!
//! Writes go to a hidden sibling `.{name}.tmp`, are fsynced, then renamed over
//! the target so a crash never leaves a half-written conversation behind.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use engage_core::error::{EngageError, Result};

/// Reads a file, returning `None` when it does not exist or is empty.
pub async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EngageError::io(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Atomically replaces `path` with `contents`, creating parent directories.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| EngageError::io(format!("No parent directory for {}", path.display())))?;
    fs::create_dir_all(parent)
        .await
        .map_err(|e| EngageError::io(format!("Failed to create directory: {}", e)))?;

    let tmp_path = temp_path(path)?;
    let mut tmp_file = File::create(&tmp_path)
        .await
        .map_err(|e| EngageError::io(format!("Failed to create temp file: {}", e)))?;
    tmp_file.write_all(contents.as_bytes()).await?;
    tmp_file.sync_all().await?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).await.map_err(|e| {
        EngageError::io(format!("Failed to replace {}: {}", path.display(), e))
    })?;

    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| EngageError::io(format!("Invalid file path: {}", path.display())))?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data.json");

        write_atomic(&path, "{\"a\":1}").await.unwrap();
        assert_eq!(read_optional(&path).await.unwrap().as_deref(), Some("{\"a\":1}"));

        write_atomic(&path, "{\"a\":2}").await.unwrap();
        assert_eq!(read_optional(&path).await.unwrap().as_deref(), Some("{\"a\":2}"));

        assert!(!temp_dir.path().join("nested").join(".data.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_or_empty_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        assert!(read_optional(&path).await.unwrap().is_none());

        std::fs::write(&path, "  \n").unwrap();
        assert!(read_optional(&path).await.unwrap().is_none());
    }
}
