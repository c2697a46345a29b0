//! # `subfolder_loader`
//!
//! Pick an image from a subfolder of an input directory and load it, with an
//! optional transparency mask, as normalized tensors.
//!
//! Selection happens in two stages: first a subfolder (or the root itself,
//! named `""`), then an image from that subfolder. Only images directly in the
//! root or in one of its immediate subfolders are visible.
//!
//! ## Example
//!
//! ```no_run
//! use subfolder_loader::{Config, Selection, SubfolderImageLoader};
//!
//! # fn main() -> subfolder_loader::Result<()> {
//! let loader = SubfolderImageLoader::new(Config::default())?;
//!
//! for subfolder in loader.index().list_subfolders() {
//!     println!("{subfolder:?}: {:?}", loader.index().images_for_subfolder(&subfolder));
//! }
//!
//! let output = loader.execute(&Selection::new("portraits", "face.png"));
//! println!("{} is {}x{}", output.filename, output.width, output.height);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod image;
pub mod loader;

pub use error::{Error, Result};
pub use loader::{Config, LoadOutput, Selection, SubfolderImageLoader};
