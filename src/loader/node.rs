//! The loader node: input description, validation, re-execution check and
//! execution with placeholder fallback.

use std::fs;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::catalog::SubfolderIndex;
use crate::error::Result;
use crate::image::{decode_image, DecodedImage, ImageTensor, MaskTensor};

use super::config::Config;
use super::resolve::{resolve_selection, ResolvedImage};

/// Identifier the node is registered under.
pub const NODE_NAME: &str = "SubfolderImageLoader";

/// Human readable node name.
pub const DISPLAY_NAME: &str = "Subfolder Image Loader";

/// Menu category.
pub const CATEGORY: &str = "image/loaders";

/// Short description shown by the host.
pub const DESCRIPTION: &str = "Load images from subfolders with dynamic filtering. \
    Organize your images in subfolders and select them easily.";

/// Output types, in order.
pub const RETURN_TYPES: [&str; 5] = ["IMAGE", "MASK", "STRING", "INT", "INT"];

/// Output names, in order.
pub const RETURN_NAMES: [&str; 5] = ["image", "mask", "filename", "width", "height"];

/// Filename reported by the placeholder fallback.
pub const ERROR_FILENAME: &str = "error";

const fn default_load_mask() -> bool {
    true
}

/// What the user picked in the two-stage picker.
///
/// `image` may carry a `subfolder/` prefix of its own; see
/// [`super::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub subfolder: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_load_mask")]
    pub load_mask: bool,
}

impl Selection {
    /// Selection with mask extraction enabled.
    #[must_use]
    pub fn new(subfolder: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            subfolder: subfolder.into(),
            image: image.into(),
            load_mask: true,
        }
    }

    /// Set whether the alpha channel should become the mask.
    #[must_use]
    pub const fn with_load_mask(mut self, load_mask: bool) -> Self {
        self.load_mask = load_mask;
        self
    }
}

/// An enumerated input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceInput {
    pub choices: Vec<String>,
    pub default: String,
    pub tooltip: &'static str,
}

impl ChoiceInput {
    /// An empty choice list still offers `""` so the field stays selectable.
    fn new(mut choices: Vec<String>, tooltip: &'static str) -> Self {
        if choices.is_empty() {
            choices.push(String::new());
        }
        let default = choices[0].clone();
        Self {
            choices,
            default,
            tooltip,
        }
    }
}

/// A boolean input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleInput {
    pub default: bool,
    pub tooltip: &'static str,
}

/// Input fields of the node: two required choices and one optional toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSchema {
    pub subfolder: ChoiceInput,
    pub image: ChoiceInput,
    pub load_mask: ToggleInput,
}

/// The node's outputs, see [`RETURN_NAMES`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutput {
    pub image: ImageTensor,
    pub mask: MaskTensor,
    pub filename: String,
    pub width: usize,
    pub height: usize,
    /// Set only on the placeholder emitted after a failed load.
    pub fallback: bool,
}

impl LoadOutput {
    /// Placeholder emitted when loading fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            fallback: true,
            ..Self::from_decoded(DecodedImage::placeholder(), ERROR_FILENAME.to_string())
        }
    }

    /// Whether this is the placeholder fallback.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    fn from_decoded(decoded: DecodedImage, filename: String) -> Self {
        let (height, width) = (decoded.height(), decoded.width());
        Self {
            image: decoded.image,
            mask: decoded.mask,
            filename,
            width,
            height,
            fallback: false,
        }
    }
}

/// Loads images from subfolders of the input directory.
#[derive(Debug)]
pub struct SubfolderImageLoader {
    config: Config,
    index: SubfolderIndex,
}

impl SubfolderImageLoader {
    /// Create a loader with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing loader with config: {config:?}");

        let index = SubfolderIndex::new(config.input_dir.clone(), config.cache_timeout);

        Ok(Self { config, index })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Subfolder and image listings of the input directory.
    #[must_use]
    pub const fn index(&self) -> &SubfolderIndex {
        &self.index
    }

    /// Current input fields. The image choices start at the root folder.
    #[must_use]
    pub fn describe_inputs(&self) -> InputSchema {
        InputSchema {
            subfolder: ChoiceInput::new(
                self.index.list_subfolders(),
                "Select a subfolder from your input directory. Leave empty for root folder. \
                 The image list will update automatically when you change this.",
            ),
            image: ChoiceInput::new(
                self.index.images_for_subfolder(""),
                "Choose an image from the selected subfolder. \
                 This list is filtered based on your subfolder selection.",
            ),
            load_mask: ToggleInput {
                default: self.config.load_mask,
                tooltip: "Extract alpha channel as mask from RGBA/transparent images. \
                          Disable if you don't need transparency masks.",
            },
        }
    }

    /// Pre-execution check. A rejection carries a human readable reason and
    /// blocks execution.
    ///
    /// # Errors
    ///
    /// Returns the reason the selection cannot be loaded.
    pub fn validate(&self, selection: &Selection) -> std::result::Result<(), String> {
        self.resolve(selection).map(|_| ()).map_err(|err| {
            tracing::error!(
                "Invalid selection - Subfolder: '{}', Image: '{}': {err}",
                selection.subfolder,
                selection.image
            );
            err.to_string()
        })
    }

    /// Modification time of the selected file, used by the host to decide
    /// whether to re-execute. `None` means "do not re-execute".
    #[must_use]
    pub fn should_rerun(&self, selection: &Selection) -> Option<SystemTime> {
        let resolved = self.resolve(selection).ok()?;
        fs::metadata(&resolved.path)
            .and_then(|metadata| metadata.modified())
            .ok()
    }

    /// Load the selection, substituting the placeholder on any failure.
    #[must_use]
    pub fn execute(&self, selection: &Selection) -> LoadOutput {
        match self.load(selection) {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(
                    "Error loading image '{}' from subfolder '{}': {err}",
                    selection.image,
                    selection.subfolder
                );
                LoadOutput::fallback()
            }
        }
    }

    /// Load the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection does not resolve to a file inside
    /// the input directory or the file cannot be decoded.
    pub fn load(&self, selection: &Selection) -> Result<LoadOutput> {
        let resolved = self.resolve(selection)?;

        tracing::info!(
            "Loading {} (subfolder '{}', image '{}')",
            resolved.path.display(),
            resolved.subfolder,
            resolved.filename
        );

        let decoded = decode_image(&resolved.path, selection.load_mask)?;

        Ok(LoadOutput::from_decoded(decoded, resolved.filename))
    }

    fn resolve(&self, selection: &Selection) -> Result<ResolvedImage> {
        resolve_selection(self.index.root(), &selection.subfolder, &selection.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::path::Path;
    use std::time::Duration;

    fn loader(root: &Path) -> SubfolderImageLoader {
        SubfolderImageLoader::new(Config {
            input_dir: root.to_path_buf(),
            cache_timeout: Duration::from_secs(60),
            load_mask: true,
        })
        .unwrap()
    }

    fn sample_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("A")).unwrap();
        fs::create_dir(root.join("B")).unwrap();
        RgbImage::from_pixel(10, 20, Rgb([40, 80, 120]))
            .save(root.join("A").join("a1.png"))
            .unwrap();
        let mut rgba = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        for y in 0..5 {
            for x in 0..5 {
                rgba.put_pixel(x, y, Rgba([255, 255, 255, 0]));
            }
        }
        rgba.save(root.join("B").join("b1.png")).unwrap();
        RgbImage::new(4, 3).save(root.join("r1.png")).unwrap();
        fs::write(root.join("broken.png"), b"\x89PNG\r\n\x1a\ntruncated").unwrap();
        dir
    }

    #[test]
    fn test_describe_inputs() {
        let dir = sample_root();
        let schema = loader(dir.path()).describe_inputs();

        assert_eq!(schema.subfolder.choices, vec!["", "A", "B"]);
        assert_eq!(schema.subfolder.default, "");
        assert_eq!(schema.image.choices, vec!["broken.png", "r1.png"]);
        assert_eq!(schema.image.default, "broken.png");
        assert!(schema.load_mask.default);
    }

    #[test]
    fn test_describe_inputs_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let schema = loader(&dir.path().join("missing")).describe_inputs();

        assert_eq!(schema.subfolder.choices, vec![""]);
        assert_eq!(schema.image.choices, vec![""]);
        assert_eq!(schema.image.default, "");
    }

    #[test]
    fn test_execute_opaque_image() {
        let dir = sample_root();
        let output = loader(dir.path()).execute(&Selection::new("", "A/a1.png"));

        assert_eq!(output.filename, "a1.png");
        assert_eq!((output.width, output.height), (10, 20));
        assert_eq!(output.image.shape(), &[1, 20, 10, 3]);
        assert_eq!(output.mask.shape(), &[1, 20, 10]);
        assert!(output.mask.iter().all(|&v| v == 1.0));
        assert!(!output.is_fallback());
    }

    #[test]
    fn test_execute_alpha_mask() {
        let dir = sample_root();
        let loader = loader(dir.path());

        let output = loader.execute(&Selection::new("B", "b1.png"));
        assert_eq!(output.mask[[0, 0, 0]], 0.0);
        assert_eq!(output.mask[[0, 4, 4]], 0.0);
        assert_eq!(output.mask[[0, 5, 5]], 1.0);

        let unmasked = loader.execute(&Selection::new("B", "b1.png").with_load_mask(false));
        assert!(unmasked.mask.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_execute_corrupt_file_falls_back() {
        let dir = sample_root();
        let output = loader(dir.path()).execute(&Selection::new("", "broken.png"));

        assert!(output.is_fallback());
        assert_eq!(output.filename, "error");
        assert_eq!((output.width, output.height), (512, 512));
        assert_eq!(output.image.shape(), &[1, 512, 512, 3]);
        assert!(output.mask.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_file_named_error_is_not_a_fallback() {
        let dir = sample_root();
        RgbImage::new(3, 2)
            .save_with_format(dir.path().join("error"), image::ImageFormat::Png)
            .unwrap();

        let output = loader(dir.path()).execute(&Selection::new("", "error"));

        assert_eq!(output.filename, "error");
        assert_eq!((output.width, output.height), (3, 2));
        assert!(!output.is_fallback());
    }

    #[test]
    fn test_execute_never_fails_on_bad_selection() {
        let dir = sample_root();
        let loader = loader(dir.path());

        assert!(loader.execute(&Selection::new("", "")).is_fallback());
        assert!(loader.execute(&Selection::new("A", "missing.png")).is_fallback());
        assert!(loader.execute(&Selection::new("../..", "etc/passwd")).is_fallback());
    }

    #[test]
    fn test_validate() {
        let dir = sample_root();
        let loader = loader(dir.path());

        assert_eq!(loader.validate(&Selection::new("A", "a1.png")), Ok(()));
        assert_eq!(loader.validate(&Selection::new("", "A/a1.png")), Ok(()));
        assert_eq!(
            loader.validate(&Selection::new("A", "")),
            Err("no image specified".to_string())
        );
        assert_eq!(
            loader.validate(&Selection::new("A", "zzz.png")),
            Err("image file not found: zzz.png".to_string())
        );
        let traversal = loader
            .validate(&Selection::new("../../etc", "passwd"))
            .unwrap_err();
        assert!(traversal.contains("outside input directory"));
    }

    #[test]
    fn test_validation_agrees_with_loading() {
        let dir = sample_root();
        let loader = loader(dir.path());

        for selection in [
            Selection::new("", "r1.png"),
            Selection::new("A", "A/a1.png"),
            Selection::new("B", "b1.png"),
        ] {
            assert!(loader.validate(&selection).is_ok());
            assert!(loader.load(&selection).is_ok());
        }
    }

    #[test]
    fn test_should_rerun() {
        let dir = sample_root();
        let loader = loader(dir.path());

        let expected = fs::metadata(dir.path().join("A").join("a1.png"))
            .unwrap()
            .modified()
            .unwrap();

        assert_eq!(loader.should_rerun(&Selection::new("A", "a1.png")), Some(expected));
        assert_eq!(loader.should_rerun(&Selection::new("", "A/a1.png")), Some(expected));
        assert_eq!(loader.should_rerun(&Selection::new("A", "gone.png")), None);
        assert_eq!(loader.should_rerun(&Selection::new("A", "")), None);
    }

    #[test]
    fn test_selection_from_json() {
        let selection: Selection =
            serde_json::from_str(r#"{"subfolder": "A", "image": "a1.png"}"#).unwrap();

        assert_eq!(selection, Selection::new("A", "a1.png"));
        assert!(selection.load_mask);
    }

    #[test]
    fn test_invalid_config() {
        let err = SubfolderImageLoader::new(Config {
            input_dir: std::path::PathBuf::new(),
            ..Config::default()
        })
        .unwrap_err();

        assert!(err.to_string().contains("input_dir"));
    }
}
