//! File repository rooted at one storage directory.

use crate::error::{StorageError, StorageResult};
use crate::names::physical_name;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Suffix of objects still being written. Never produced by hex encoding.
const STAGING_SUFFIX: &str = "part";

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// A flat store of uploaded files.
///
/// Every object lives directly under `root`, named by [`physical_name`].
/// The repository keeps no in-memory index; the file list advertised to
/// clients is owned by the caller and committed only after a write
/// completes.
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> connhub_storage::StorageResult<()> {
/// use connhub_storage::FileRepository;
/// use tokio::io::AsyncWriteExt;
///
/// let repo = FileRepository::new("./temp");
/// let report = repo.reset();
/// assert!(report.is_clean());
///
/// let mut object = repo.create("notes.txt").await?;
/// object.write_all(b"hello").await?;
/// object.commit().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

/// An opened stored object.
#[derive(Debug)]
pub struct StoredFile {
    /// Readable handle positioned at the start.
    pub file: File,
    /// Size in bytes at open time.
    pub len: u64,
}

/// An object being written under a staging name.
///
/// Writes go to a private file next to the target. [`commit`](Self::commit)
/// renames it over the target, so readers see either the previous bytes or
/// the complete new ones. Dropping without committing leaves the staging file
/// for the next reset.
#[derive(Debug)]
pub struct PendingObject {
    file: File,
    staging: PathBuf,
    target: PathBuf,
}

impl PendingObject {
    /// Flushes the written bytes and moves them into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush or the rename fails; the target is left
    /// as it was.
    pub async fn commit(self) -> StorageResult<()> {
        let Self {
            mut file,
            staging,
            target,
        } = self;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&staging, &target).await?;
        debug!(path = %target.display(), "committed object");
        Ok(())
    }
}

impl AsyncWrite for PendingObject {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.file).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_shutdown(cx)
    }
}

/// One entry that could not be removed or created during a reset.
#[derive(Debug)]
pub struct ResetFailure {
    /// The path involved.
    pub path: PathBuf,
    /// The underlying error.
    pub error: io::Error,
}

/// Outcome of [`FileRepository::reset`].
#[derive(Debug, Default)]
pub struct ResetReport {
    /// Number of stale entries removed.
    pub removed: usize,
    /// Steps that failed; the reset carried on past each of them.
    pub failures: Vec<ResetFailure>,
}

impl ResetReport {
    /// Returns true if every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: &Path, error: io::Error) {
        warn!(path = %path.display(), %error, "storage reset step failed");
        self.failures.push(ResetFailure {
            path: path.to_path_buf(),
            error,
        });
    }
}

impl FileRepository {
    /// Creates a repository rooted at `root`.
    ///
    /// Nothing is touched on disk until [`reset`](Self::reset) or a write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the on-disk path for a logical name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidName`] for the empty name, which would
    /// map onto the root itself.
    pub fn path_for(&self, logical: &str) -> StorageResult<PathBuf> {
        if logical.is_empty() {
            return Err(StorageError::InvalidName(logical.to_string()));
        }
        Ok(self.root.join(physical_name(logical)))
    }

    /// Clears the storage area: removes every child, the root itself, then
    /// recreates an empty root.
    ///
    /// Best effort: a failing step is recorded in the report and the reset
    /// continues with the next one.
    pub fn reset(&self) -> ResetReport {
        let mut report = ResetReport::default();

        if self.root.exists() {
            match fs::read_dir(&self.root) {
                Ok(entries) => {
                    for entry in entries {
                        let path = match entry {
                            Ok(entry) => entry.path(),
                            Err(e) => {
                                report.fail(&self.root, e);
                                continue;
                            }
                        };
                        let removed = if path.is_dir() {
                            fs::remove_dir_all(&path)
                        } else {
                            fs::remove_file(&path)
                        };
                        match removed {
                            Ok(()) => report.removed += 1,
                            Err(e) => report.fail(&path, e),
                        }
                    }
                }
                Err(e) => report.fail(&self.root, e),
            }
            if let Err(e) = fs::remove_dir(&self.root) {
                report.fail(&self.root, e);
            }
        }

        if let Err(e) = fs::create_dir_all(&self.root) {
            report.fail(&self.root, e);
        }

        debug!(
            root = %self.root.display(),
            removed = report.removed,
            failures = report.failures.len(),
            "storage reset"
        );
        report
    }

    /// Removes the storage root and everything in it.
    ///
    /// A missing root is not an error.
    pub fn remove_all(&self) -> StorageResult<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Opens a fresh writable object for `logical`.
    ///
    /// The handle always starts empty. Any existing object for the name stays
    /// readable until the new one is committed, and is then replaced.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name or if the file cannot be created.
    pub async fn create(&self, logical: &str) -> StorageResult<PendingObject> {
        let target = self.path_for(logical)?;
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        let staging = self.root.join(format!(
            "{}.{seq}.{STAGING_SUFFIX}",
            physical_name(logical)
        ));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging)
            .await?;
        debug!(name = logical, path = %staging.display(), "opened object for writing");
        Ok(PendingObject {
            file,
            staging,
            target,
        })
    }

    /// Opens the stored object for `logical` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no object exists for the name.
    pub async fn open(&self, logical: &str) -> StorageResult<StoredFile> {
        let path = self.path_for(logical)?;
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(logical.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(logical.to_string()));
        }
        Ok(StoredFile {
            file,
            len: metadata.len(),
        })
    }

    /// Returns true if an object exists for `logical`.
    pub async fn contains(&self, logical: &str) -> bool {
        match self.path_for(logical) {
            Ok(path) => tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Deletes the stored object for `logical`.
    ///
    /// Idempotent: returns `Ok(false)` if nothing was stored under the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the object exists but cannot be removed.
    pub async fn delete(&self, logical: &str) -> StorageResult<bool> {
        let path = self.path_for(logical)?;
        let removed = remove_if_present(&path).await?;
        if removed {
            debug!(name = logical, "deleted object");
        }
        Ok(removed)
    }
}

async fn remove_if_present(path: &Path) -> StorageResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
