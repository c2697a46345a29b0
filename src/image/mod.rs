//! Image decoding into normalized tensors.

mod load;

pub use load::decode_image;

use ndarray::{Array3, Array4};

/// Image tensor in NHWC format (batch, height, width, channels).
/// Values are normalized to [0, 1].
pub type ImageTensor = Array4<f32>;

/// Mask tensor (batch, height, width) with values in [0, 1]; 1 is opaque.
pub type MaskTensor = Array3<f32>;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Edge length of the placeholder emitted when loading fails.
pub const PLACEHOLDER_SIZE: u32 = 512;

/// A decoded image and its mask, sharing the same spatial dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Shape `(1, H, W, 3)`.
    pub image: ImageTensor,
    /// Shape `(1, H, W)`.
    pub mask: MaskTensor,
}

impl DecodedImage {
    /// Solid black `512x512` image with a fully opaque mask.
    #[must_use]
    pub fn placeholder() -> Self {
        let size = PLACEHOLDER_SIZE as usize;
        Self {
            image: ImageTensor::zeros((1, size, size, RGB_CHANNELS)),
            mask: MaskTensor::ones((1, size, size)),
        }
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.image.dim().1
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.image.dim().2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let placeholder = DecodedImage::placeholder();

        assert_eq!(placeholder.image.shape(), &[1, 512, 512, 3]);
        assert_eq!(placeholder.mask.shape(), &[1, 512, 512]);
        assert!(placeholder.image.iter().all(|&v| v == 0.0));
        assert!(placeholder.mask.iter().all(|&v| v == 1.0));
        assert_eq!((placeholder.width(), placeholder.height()), (512, 512));
    }
}
