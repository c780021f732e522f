//! Persists fetched icon bytes under a collision-free name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::error::DownloadError;
use super::filename::{extension_for_content_type, icon_base_name, resolve_unique_path};

/// Writes `bytes` to `directory` as `{base_name}[_{size}x{size}][_{n}]{.ico|.png}`.
///
/// The extension comes from `content_type`; the numeric suffix is the first one
/// that does not collide with an existing file. The file is opened with
/// create-new semantics, so a file that appears between resolution and
/// creation is never truncated; resolution is repeated once per rejected path.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] when the file cannot be created or written.
/// A partially written file is removed before returning.
pub async fn save(
    bytes: &[u8],
    content_type: &str,
    base_name: &str,
    size: u32,
    directory: &Path,
) -> Result<PathBuf, DownloadError> {
    let extension = extension_for_content_type(content_type);
    let base = icon_base_name(base_name, size);

    let mut rejected: Option<PathBuf> = None;
    let (path, file) = loop {
        let path = resolve_unique_path(directory, &base, extension);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => break (path, file),
            // A second rejection of the same path means the scan cannot make progress.
            Err(e) if e.kind() == ErrorKind::AlreadyExists && rejected.as_ref() != Some(&path) => {
                debug!(path = %path.display(), "path claimed concurrently, resolving again");
                rejected = Some(path);
            }
            Err(e) => return Err(DownloadError::io(path, e)),
        }
    };

    write_or_remove(file, &path, bytes).await?;

    info!(path = %path.display(), bytes = bytes.len(), "favicon saved");
    Ok(path)
}

/// Writes `bytes` to the freshly created `file`, removing it again on failure.
async fn write_or_remove(
    mut file: tokio::fs::File,
    path: &Path,
    bytes: &[u8],
) -> Result<(), DownloadError> {
    let written: std::io::Result<()> = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;
    drop(file);

    if let Err(e) = written {
        debug!(path = %path.display(), "cleaning up partial file after error");
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %cleanup, "failed to remove partial file");
        }
        return Err(DownloadError::io(path, e));
    }
    Ok(())
}
