//! Image loading utilities.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageError, ImageReader, RgbImage};
use ndarray::{Array2, Axis};

use crate::error::{Error, Result};

use super::{DecodedImage, ImageTensor, MaskTensor, RGB_CHANNELS};

/// Load an image from disk and convert it to normalized tensors.
///
/// Color handling:
/// 1. RGBA (including palette images with a transparency entry, which the
///    decoders expand to RGBA): the alpha channel becomes the mask when
///    `extract_mask` is set, then the image is reduced to RGB
/// 2. Grayscale: broadcast to three identical channels, no mask
/// 3. Anything else (RGB, gray+alpha, ...): converted to RGB, no mask
///
/// Without a captured alpha channel the mask is all ones.
///
/// The file handle is released before this returns.
///
/// # Errors
///
/// Returns [`Error::ImageLoad`] if the file cannot be opened or decoded.
pub fn decode_image<P: AsRef<Path>>(path: P, extract_mask: bool) -> Result<DecodedImage> {
    let path = path.as_ref();

    let img = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        "Decoded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    image_to_tensors(&img, extract_mask)
}

/// Convert a `DynamicImage` to an NHWC image tensor and its mask.
fn image_to_tensors(img: &DynamicImage, extract_mask: bool) -> Result<DecodedImage> {
    let color = img.color();

    let mask = if extract_mask && color.has_color() && color.has_alpha() {
        Some(alpha_to_mask(img)?)
    } else {
        None
    };

    let image = if color.channel_count() == 1 {
        gray_to_tensor(&img.to_luma8())?
    } else {
        rgb_to_tensor(&img.to_rgb8())?
    };

    let (_, height, width, _) = image.dim();
    let mask = mask.unwrap_or_else(|| MaskTensor::ones((1, height, width)));

    Ok(DecodedImage { image, mask })
}

fn rgb_to_tensor(rgb: &RgbImage) -> Result<ImageTensor> {
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let data: Vec<f32> = rgb.as_raw().iter().map(|&v| normalize(v)).collect();

    ImageTensor::from_shape_vec((1, height, width, RGB_CHANNELS), data).map_err(|err| {
        Error::ShapeMismatch {
            expected: format!("(1, {height}, {width}, {RGB_CHANNELS})"),
            actual: err.to_string(),
        }
    })
}

/// Single-channel pixels broadcast to three identical channels.
fn gray_to_tensor(gray: &GrayImage) -> Result<ImageTensor> {
    let plane = plane_from_raw(gray.width(), gray.height(), gray.as_raw().iter().copied())?;
    let (height, width) = plane.dim();

    let broadcast = plane
        .insert_axis(Axis(2))
        .broadcast((height, width, RGB_CHANNELS))
        .map(|view| view.to_owned())
        .ok_or_else(|| Error::ShapeMismatch {
            expected: format!("({height}, {width}, {RGB_CHANNELS})"),
            actual: format!("({height}, {width}, 1)"),
        })?;

    Ok(broadcast.insert_axis(Axis(0)))
}

fn alpha_to_mask(img: &DynamicImage) -> Result<MaskTensor> {
    let rgba = img.to_rgba8();
    let alpha = rgba.pixels().map(|pixel| pixel[3]);
    let plane = plane_from_raw(rgba.width(), rgba.height(), alpha)?;

    Ok(plane.insert_axis(Axis(0)))
}

fn plane_from_raw(
    width: u32,
    height: u32,
    values: impl Iterator<Item = u8>,
) -> Result<Array2<f32>> {
    let (width, height) = (width as usize, height as usize);
    let data: Vec<f32> = values.map(normalize).collect();

    Array2::from_shape_vec((height, width), data).map_err(|err| Error::ShapeMismatch {
        expected: format!("({height}, {width})"),
        actual: err.to_string(),
    })
}

/// Normalize an 8-bit sample from [0, 255] to [0, 1].
#[inline]
fn normalize(value: u8) -> f32 {
    f32::from(value) / 255.0
}
