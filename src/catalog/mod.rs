//! Directory listings: image scanning, time-boxed listing cache and the
//! subfolder/image catalog that drives the two-stage picker.

mod cache;
mod index;
mod scan;

pub use cache::{ListingCache, DEFAULT_CACHE_TIMEOUT};
pub use index::{filter_for_subfolder, SubfolderIndex};
pub use scan::scan_directory;

use std::path::Path;

/// File extensions (lowercase, without dot) accepted as images.
pub const VALID_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "bmp", "tiff", "tif"];

/// Separator between a subfolder and a filename in a relative image path.
pub const PATH_SEPARATOR: char = '/';

/// Whether `name` carries one of the [`VALID_EXTENSIONS`] (case-insensitive).
#[must_use]
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            VALID_EXTENSIONS.contains(&ext.as_str())
        })
}
