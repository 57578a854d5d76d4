use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

/// Reads a whole file while holding a shared lock on it. A missing file is not an error and yields
/// `None`.
pub async fn read_locked(path: &Path) -> Result<Option<Vec<u8>>> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to open {path:?}")),
    };

    file.lock_shared()?;
    let mut buffer = Vec::new();
    let result = file.read_to_end(&mut buffer).await;
    file.unlock_async().await?;
    result.with_context(|| format!("Failed to read {path:?}"))?;

    debug!("Read {} bytes from {path:?}", buffer.len());
    Ok(Some(buffer))
}

/// Replaces the content of `path` with `content`. Data is written into a sibling temporary file
/// under an exclusive lock and then renamed over the target, so readers either see the old or the
/// new document and never a half written one.
pub async fn replace_atomically(path: &Path, content: &[u8]) -> Result<()> {
    let temporary = temporary_path(path);

    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temporary)
        .await
        .with_context(|| format!("Failed to create {temporary:?}"))?;

    file.lock_exclusive()?;
    let result = write_all_synced(&mut file, content).await;
    file.unlock_async().await?;
    drop(file);

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temporary).await;
        return Err(e).with_context(|| format!("Failed to write {temporary:?}"));
    }

    tokio::fs::rename(&temporary, path)
        .await
        .with_context(|| format!("Failed to move {temporary:?} to {path:?}"))?;

    debug!("Replaced {path:?} with {} bytes", content.len());
    Ok(())
}

async fn write_all_synced(file: &mut File, content: &[u8]) -> std::io::Result<()> {
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("data"));
    name.push(".tmp");
    path.with_file_name(name)
}
