//! Storage fixtures.

use connhub_storage::FileRepository;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding a storage root, removed on drop.
pub struct TempRoot {
    root: PathBuf,
    _temp_dir: TempDir,
}

impl TempRoot {
    /// Creates a fresh temporary directory with a `store` root inside it.
    ///
    /// The root itself is not created, so the first reset starts from nothing.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("store");
        Self {
            root,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the storage root path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Returns a repository over the root after resetting it.
    pub fn repository(&self) -> FileRepository {
        let repository = FileRepository::new(&self.root);
        let report = repository.reset();
        assert!(report.is_clean(), "reset failed: {:?}", report.failures);
        repository
    }

    /// Lists the physical names currently in the root, sorted.
    pub fn physical_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

impl Default for TempRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a test with a freshly reset repository.
///
/// # Example
///
/// ```rust
/// use connhub_testkit::with_temp_repository;
///
/// with_temp_repository(|repo| {
///     assert!(repo.root().is_dir());
/// });
/// ```
pub fn with_temp_repository<F, R>(f: F) -> R
where
    F: FnOnce(&FileRepository) -> R,
{
    let root = TempRoot::new();
    let repository = root.repository();
    f(&repository)
}
