//! Custom error types for `subfolder_loader`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the `subfolder_loader` library.
#[derive(Error, Debug)]
pub enum Error {
    /// No image was selected, or the selected file does not exist.
    #[error("{}", not_found_message(.name))]
    NotFound {
        /// Clean filename (or the raw selection when it is empty).
        name: String,
        /// Path that was probed, if one could be built.
        path: Option<PathBuf>,
    },

    /// The selection resolves to a path outside the input directory.
    #[error("invalid file path: {path} is outside input directory {root}")]
    Traversal { path: PathBuf, root: PathBuf },

    /// Failed to open or decode an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shape mismatch in tensor operations.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

impl Error {
    /// Build a [`Error::NotFound`] for a selection with no usable filename.
    pub(crate) fn no_image() -> Self {
        Self::NotFound {
            name: String::new(),
            path: None,
        }
    }
}

fn not_found_message(name: &str) -> String {
    if name.is_empty() {
        "no image specified".to_string()
    } else {
        format!("image file not found: {name}")
    }
}

/// Result type alias for `subfolder_loader` operations.
pub type Result<T> = std::result::Result<T, Error>;
