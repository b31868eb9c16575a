//! Synchronized in-memory state: the shared text and the file list.
//!
//! Each resource sits behind its own lock together with its version, and is
//! reachable only through the operations below. A reader therefore sees the
//! value and version of one resource from the same mutation, and text and
//! file operations never wait on each other.

use connhub_sync_protocol::Version;
use indexmap::IndexSet;
use parking_lot::Mutex;

/// Snapshot of the shared text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSnapshot {
    /// The text.
    pub content: String,
    /// Its version.
    pub version: Version,
}

/// Snapshot of the file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesSnapshot {
    /// File names in list order.
    pub names: Vec<String>,
    /// The list's version.
    pub version: Version,
}

/// Ordered set of logical file names.
///
/// Order is commit order: a name that is committed again moves to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    names: IndexSet<String>,
}

impl FileList {
    /// Inserts `name` at the end, moving it there if already present.
    pub fn touch(&mut self, name: &str) {
        self.names.shift_remove(name);
        self.names.insert(name.to_string());
    }

    /// Removes `name`, preserving the order of the rest.
    ///
    /// Returns true if the name was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.shift_remove(name)
    }

    /// Returns true if `name` is listed.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of listed names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names are listed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates the names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

#[derive(Debug)]
struct TextResource {
    content: String,
    version: Version,
}

#[derive(Debug)]
struct FileListResource {
    names: FileList,
    version: Version,
}

/// The two shared resources.
///
/// Created fresh on every server start; nothing is persisted.
#[derive(Debug)]
pub struct SyncState {
    text: Mutex<TextResource>,
    files: Mutex<FileListResource>,
}

impl SyncState {
    /// Creates empty state stamped with the current time.
    ///
    /// A first poll with version 0 therefore reports both resources as
    /// updated, with empty data.
    pub fn new() -> Self {
        let now = Version::now();
        Self {
            text: Mutex::new(TextResource {
                content: String::new(),
                version: now,
            }),
            files: Mutex::new(FileListResource {
                names: FileList::default(),
                version: now,
            }),
        }
    }

    /// Returns the text if its version is newer than `client`.
    pub fn text_if_newer(&self, client: Version) -> Option<TextSnapshot> {
        let text = self.text.lock();
        text.version.is_newer_than(client).then(|| TextSnapshot {
            content: text.content.clone(),
            version: text.version,
        })
    }

    /// Replaces the text, returning its new version.
    pub fn set_text(&self, content: String) -> Version {
        let mut text = self.text.lock();
        text.content = content;
        text.version = Version::next_after(text.version);
        text.version
    }

    /// Returns the current text version.
    pub fn text_version(&self) -> Version {
        self.text.lock().version
    }

    /// Returns the file list if its version is newer than `client`.
    pub fn files_if_newer(&self, client: Version) -> Option<FilesSnapshot> {
        let files = self.files.lock();
        files.version.is_newer_than(client).then(|| FilesSnapshot {
            names: files.names.to_vec(),
            version: files.version,
        })
    }

    /// Applies `mutate` to the file list under its lock.
    ///
    /// `mutate` returns whether it changed anything; the version is bumped
    /// only if it did. Returns the list's version afterwards.
    pub fn mutate_files<F>(&self, mutate: F) -> Version
    where
        F: FnOnce(&mut FileList) -> bool,
    {
        let mut files = self.files.lock();
        if mutate(&mut files.names) {
            files.version = Version::next_after(files.version);
        }
        files.version
    }

    /// Commits an uploaded name: appended, or moved to the end.
    ///
    /// Always bumps the version, since the stored bytes changed even when the
    /// order did not.
    pub fn commit_file(&self, name: &str) -> Version {
        self.mutate_files(|list| {
            list.touch(name);
            true
        })
    }

    /// Removes a name from the list.
    ///
    /// Returns whether it was listed and the list's version afterwards;
    /// removing an absent name leaves the version unchanged.
    pub fn remove_file(&self, name: &str) -> (bool, Version) {
        let mut removed = false;
        let version = self.mutate_files(|list| {
            removed = list.remove(name);
            removed
        });
        (removed, version)
    }

    /// Returns true if `name` is in the file list.
    pub fn has_file(&self, name: &str) -> bool {
        self.files.lock().names.contains(name)
    }

    /// Returns the current file-list version.
    pub fn files_version(&self) -> Version {
        self.files.lock().version
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
