//! Turning a (subfolder, image) selection into a validated file path.
//!
//! Validation and loading both go through [`resolve_selection`], so a
//! selection that passes validation cannot fail to load for path reasons.

use std::path::{Component, Path, PathBuf};

use crate::catalog::PATH_SEPARATOR;
use crate::error::{Error, Result};

/// A selection resolved to a file inside the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Canonical absolute path of the image file.
    pub path: PathBuf,
    /// Subfolder actually used, `""` for the root.
    pub subfolder: String,
    /// Filename with any subfolder prefix stripped.
    pub filename: String,
}

/// Split `image` into the subfolder it names (if any) and the clean filename,
/// then pick the effective subfolder. An explicit `subfolder` always wins over
/// a prefix embedded in `image`.
///
/// Only `subfolder/name` with exactly one separator is split; anything else is
/// kept as the filename.
#[must_use]
pub fn reconcile<'a>(subfolder: &'a str, image: &'a str) -> (&'a str, &'a str) {
    match image.split_once(PATH_SEPARATOR) {
        Some((prefix, clean)) if !clean.contains(PATH_SEPARATOR) => {
            let subfolder = if subfolder.is_empty() { prefix } else { subfolder };
            (subfolder, clean)
        }
        _ => (subfolder, image),
    }
}

/// Resolve a selection against `root`.
///
/// # Errors
///
/// - [`Error::NotFound`] if `image` is empty or no file exists at the path
/// - [`Error::Traversal`] if the path leaves `root`, either through `..`
///   components or absolute names, or through symlinks
/// - [`Error::Io`] if the paths cannot be made absolute or canonical
pub fn resolve_selection(root: &Path, subfolder: &str, image: &str) -> Result<ResolvedImage> {
    if image.is_empty() {
        return Err(Error::no_image());
    }

    let (actual_subfolder, clean_image) = reconcile(subfolder, image);

    let file_path = if actual_subfolder.is_empty() {
        root.join(clean_image)
    } else {
        root.join(actual_subfolder).join(clean_image)
    };

    let root_abs = normalize_lexically(&std::path::absolute(root)?);
    let file_abs = normalize_lexically(&std::path::absolute(&file_path)?);
    if !file_abs.starts_with(&root_abs) {
        return Err(Error::Traversal {
            path: file_abs,
            root: root_abs,
        });
    }

    if clean_image.is_empty() || !file_path.is_file() {
        tracing::debug!(
            "File not found: {} (subfolder '{actual_subfolder}', clean image '{clean_image}')",
            file_path.display()
        );
        return Err(Error::NotFound {
            name: clean_image.to_string(),
            path: Some(file_path),
        });
    }

    let root_canonical = root.canonicalize()?;
    let file_canonical = file_path.canonicalize()?;
    if !file_canonical.starts_with(&root_canonical) {
        return Err(Error::Traversal {
            path: file_canonical,
            root: root_canonical,
        });
    }

    Ok(ResolvedImage {
        path: file_canonical,
        subfolder: actual_subfolder.to_string(),
        filename: clean_image.to_string(),
    })
}

/// Drop `.` components and fold `..` into their parent without touching the
/// filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
