//! Crash-safe file replacement.
//!
//! Data is written to a sibling `.tmp` file, flushed, synced and then
//! renamed over the target. A crash before the rename leaves the previous
//! file intact.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::{JsonlWriter, Result};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically replaces `path` with one JSON line per value.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
/// The target file is left unchanged on failure.
pub async fn write_jsonl_atomic<'a, T, I, P>(path: P, values: I) -> Result<usize>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp = temp_path(path);

    let mut writer = JsonlWriter::new(File::create(&tmp).await?);
    for value in values {
        writer.write(value).await?;
    }
    let count = writer.written();
    let file = writer.finish().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await?;
    tracing::debug!(path = %path.display(), records = count, "Wrote JSONL file");
    Ok(count)
}

/// Atomically replaces `path` with the pretty-printed JSON form of `value`.
///
/// # Errors
///
/// Returns an error if serialization, the write or the rename fails.
pub async fn write_json_atomic<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp = temp_path(path);

    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');

    let mut file = File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote JSON file");
    Ok(())
}
