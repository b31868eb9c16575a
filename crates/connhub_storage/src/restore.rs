//! Renaming a storage directory back to logical names.

use crate::error::StorageResult;
use crate::names::logical_name;
use std::fs;
use std::io;
use std::path::Path;

/// Result of restoring one directory entry.
#[derive(Debug)]
pub enum RestoreOutcome {
    /// The entry was renamed to its logical name.
    Renamed {
        /// On-disk name before the rename.
        from: String,
        /// Logical name after the rename.
        to: String,
    },
    /// The entry was left alone.
    Skipped {
        /// On-disk name of the entry.
        name: String,
        /// Why it was skipped.
        reason: &'static str,
    },
    /// The rename was attempted and failed.
    Failed {
        /// On-disk name of the entry.
        name: String,
        /// The underlying error.
        error: io::Error,
    },
}

/// Renames every hex-named file in `dir` to the logical name it encodes.
///
/// Directories, names that do not decode, names that would not stay inside
/// `dir`, and names whose target already exists are skipped. Each entry is
/// handled independently; one failure does not stop the rest.
///
/// # Errors
///
/// Returns an error only if `dir` itself cannot be listed.
pub fn restore_names(dir: &Path) -> StorageResult<Vec<RestoreOutcome>> {
    let mut outcomes = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if path.is_dir() {
            outcomes.push(RestoreOutcome::Skipped {
                name,
                reason: "directory",
            });
            continue;
        }
        let Some(logical) = logical_name(&name) else {
            outcomes.push(RestoreOutcome::Skipped {
                name,
                reason: "not a hex-encoded name",
            });
            continue;
        };
        if !is_plain_file_name(&logical) {
            outcomes.push(RestoreOutcome::Skipped {
                name,
                reason: "decoded name is not a plain file name",
            });
            continue;
        }
        let target = dir.join(&logical);
        if target.exists() {
            outcomes.push(RestoreOutcome::Skipped {
                name,
                reason: "target already exists",
            });
            continue;
        }
        match fs::rename(&path, &target) {
            Ok(()) => outcomes.push(RestoreOutcome::Renamed {
                from: name,
                to: logical,
            }),
            Err(error) => outcomes.push(RestoreOutcome::Failed { name, error }),
        }
    }
    Ok(outcomes)
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
