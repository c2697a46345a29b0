//! Loader configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::DEFAULT_CACHE_TIMEOUT;
use crate::error::{Error, Result};

/// Configuration for [`super::SubfolderImageLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root input directory. It is never created; a missing directory simply
    /// yields empty listings.
    pub input_dir: PathBuf,

    /// How long directory listings are reused before rescanning.
    pub cache_timeout: Duration,

    /// Default for the `load_mask` input.
    pub load_mask: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            load_mask: true,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(Error::InvalidParameter {
                name: "input_dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
