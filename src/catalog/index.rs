//! Subfolder enumeration and the relative-path image catalog.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::cache::ListingCache;
use super::scan::log_read_failure;
use super::PATH_SEPARATOR;

/// Subfolders and images below one input directory.
///
/// Root images appear unprefixed in the catalog, images of an immediate
/// subfolder as `subfolder/name`. Deeper files are never listed.
#[derive(Debug)]
pub struct SubfolderIndex {
    root: PathBuf,
    cache: ListingCache,
}

impl SubfolderIndex {
    /// Create an index over `root` with its own listing cache.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P, cache_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            cache: ListingCache::new(cache_timeout),
        }
    }

    /// Input directory this index enumerates.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Listing cache backing the image scans.
    #[must_use]
    pub const fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// `""` (the root itself) followed by every non-hidden immediate
    /// subdirectory, sorted by name. Symlinked directories are only listed
    /// when their target stays inside the root.
    #[must_use]
    pub fn list_subfolders(&self) -> Vec<String> {
        let mut subfolders = vec![String::new()];

        if !self.root.exists() {
            return subfolders;
        }

        let mut names = Vec::new();
        match fs::read_dir(&self.root) {
            Ok(entries) => {
                for entry in entries {
                    match entry {
                        Ok(entry) => {
                            if let Ok(name) = entry.file_name().into_string() {
                                names.push(name);
                            }
                        }
                        Err(err) => {
                            log_read_failure(&self.root, &err);
                            break;
                        }
                    }
                }
            }
            Err(err) => log_read_failure(&self.root, &err),
        }

        names.sort();
        let root_canonical = self.root.canonicalize().ok();
        subfolders.extend(names.into_iter().filter(|name| {
            !name.starts_with('.') && self.is_contained_dir(root_canonical.as_deref(), name)
        }));

        subfolders
    }

    /// Sorted catalog of every root and one-level-deep image, using cached
    /// listings where still fresh.
    #[must_use]
    pub fn catalog_all_images(&self) -> Vec<String> {
        self.catalog(false)
    }

    /// Same as [`Self::catalog_all_images`] but rescans every directory.
    #[must_use]
    pub fn rescan_all_images(&self) -> Vec<String> {
        self.catalog(true)
    }

    /// Selectable names for `subfolder`, as bare filenames.
    #[must_use]
    pub fn images_for_subfolder(&self, subfolder: &str) -> Vec<String> {
        filter_for_subfolder(&self.catalog_all_images(), subfolder)
    }

    fn is_contained_dir(&self, root_canonical: Option<&Path>, name: &str) -> bool {
        let path = self.root.join(name);
        if !path.is_dir() {
            return false;
        }

        let contained = match (path.canonicalize(), root_canonical) {
            (Ok(target), Some(root)) => target.starts_with(root),
            _ => false,
        };
        if !contained {
            tracing::debug!("Skipping {} outside the input directory", path.display());
        }
        contained
    }

    fn catalog(&self, force_refresh: bool) -> Vec<String> {
        let mut images = Vec::new();

        if !self.root.exists() {
            return images;
        }

        images.extend(self.cache.get(&self.root, force_refresh));

        for subfolder in self.list_subfolders().into_iter().skip(1) {
            let listing = self.cache.get(&self.root.join(&subfolder), force_refresh);
            images.extend(
                listing
                    .into_iter()
                    .map(|name| format!("{subfolder}{PATH_SEPARATOR}{name}")),
            );
        }

        images.sort();
        images
    }
}

/// Narrow a catalog to one subfolder.
///
/// An empty `subfolder` keeps the root-level entries. Otherwise entries of the
/// form `subfolder/name` are kept with the prefix stripped.
#[must_use]
pub fn filter_for_subfolder(catalog: &[String], subfolder: &str) -> Vec<String> {
    if subfolder.is_empty() {
        return catalog
            .iter()
            .filter(|image| !image.contains(PATH_SEPARATOR))
            .cloned()
            .collect();
    }

    catalog
        .iter()
        .filter_map(|image| {
            let (prefix, name) = image.split_once(PATH_SEPARATOR)?;
            (prefix == subfolder && !name.contains(PATH_SEPARATOR)).then(|| name.to_string())
        })
        .collect()
}
