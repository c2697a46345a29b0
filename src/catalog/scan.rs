//! Image file scanning for a single directory.

use std::fs;
use std::io;
use std::path::Path;

use super::is_image_name;

/// List the image files directly inside `directory`.
///
/// Names are filtered by extension and sorted lexically (case-sensitive).
/// A missing directory yields an empty list. Failures while reading the
/// directory are logged and whatever was collected so far is returned.
#[must_use]
pub fn scan_directory(directory: &Path) -> Vec<String> {
    let mut images = Vec::new();

    if !directory.exists() {
        return images;
    }

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            log_read_failure(directory, &err);
            return images;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log_read_failure(directory, &err);
                break;
            }
        };

        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!("Skipping non UTF-8 entry in {}", directory.display());
            continue;
        };

        if is_image_name(&name) {
            images.push(name);
        }
    }

    images.sort();
    images
}

pub(super) fn log_read_failure(directory: &Path, err: &io::Error) {
    if err.kind() == io::ErrorKind::PermissionDenied {
        tracing::warn!("Permission denied accessing {}", directory.display());
    } else {
        tracing::warn!("Failed to list {}: {err}", directory.display());
    }
}
