//! Reading and writing engine configuration files.
//!
//! Writes go to a sibling temp file first and are then renamed over the
//! target, so a failed or cancelled write never leaves a truncated
//! configuration behind for the engine to pick up.

use std::future::Future;
use std::path::{Path, PathBuf};

use kvm_topology::{Document, ImportError};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Error type for engine configuration file operations.
#[derive(Debug, Error)]
pub enum EngineFileError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing engine config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but its contents were rejected.
    #[error("engine config {path} is invalid: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: ImportError,
    },
}

/// Whether a cancellable write reached the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Cancelled,
}

/// Writes `document` to `path`, replacing any previous file.
///
/// # Errors
///
/// Returns [`EngineFileError::Io`] if the directory, the temp file or the
/// rename fails.  The temp file is removed on failure.
pub fn save_document(path: &Path, document: &Document) -> Result<(), EngineFileError> {
    ensure_parent(path)?;
    let temp = temp_path(path);

    let result = std::fs::write(&temp, document.as_str())
        .and_then(|()| std::fs::rename(&temp, path));
    if let Err(source) = result {
        let _ = std::fs::remove_file(&temp);
        return Err(EngineFileError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    info!(path = %path.display(), "engine configuration written");
    Ok(())
}

/// Reads the document at `path`.
///
/// Parsing is left to the caller; see
/// [`crate::application::config_io::open_engine_config`].
///
/// # Errors
///
/// Returns [`EngineFileError::Io`] if the file cannot be read.
pub fn load_document(path: &Path) -> Result<Document, EngineFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| EngineFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "engine configuration read");
    Ok(Document::from_text(text))
}

/// Writes `document` to `path` unless `cancel` completes first.
///
/// Cancellation is checked before the write starts and while it runs.  A
/// cancelled write removes its temp file and leaves `path` untouched.
///
/// # Errors
///
/// Returns [`EngineFileError::Io`] if the write or the rename fails.
pub async fn write_document_cancellable<C>(
    path: &Path,
    document: &Document,
    cancel: C,
) -> Result<WriteOutcome, EngineFileError>
where
    C: Future<Output = ()>,
{
    ensure_parent(path)?;
    let temp = temp_path(path);

    let outcome = tokio::select! {
        biased;
        () = cancel => None,
        result = write_and_rename(&temp, path, document) => Some(result),
    };

    match outcome {
        None => {
            // The write future was dropped, which closed the file handle.
            let _ = tokio::fs::remove_file(&temp).await;
            warn!(path = %path.display(), "engine configuration write cancelled");
            Ok(WriteOutcome::Cancelled)
        }
        Some(Ok(())) => {
            info!(path = %path.display(), "engine configuration written");
            Ok(WriteOutcome::Written)
        }
        Some(Err(source)) => {
            let _ = tokio::fs::remove_file(&temp).await;
            Err(EngineFileError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

async fn write_and_rename(temp: &Path, path: &Path, document: &Document) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(temp).await?;
    file.write_all(document.as_str().as_bytes()).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(temp, path).await
}

fn ensure_parent(path: &Path) -> Result<(), EngineFileError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| EngineFileError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// `<name>.<uuid>.tmp` in the same directory, so the rename stays on one
/// file system.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.{}.tmp", Uuid::new_v4()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
