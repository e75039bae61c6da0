//! Colour-space conversion kernels.

use ndarray::Array2;

use crate::error::{PrepCvError, Result};
use crate::traits::Operation;
use crate::types::image::from_gray;
use crate::types::{Image, ResolvedParams};

/// Collapses a BGR(A) image to one luma channel (BT.601 weights).
/// Single-channel input is returned untouched.
pub fn bgr_to_gray(image: Image) -> Result<Image> {
    let (rows, cols, channels) = image.dim();
    match channels {
        1 => Ok(image),
        3 | 4 => {
            let plane = Array2::from_shape_fn((rows, cols), |(row, col)| {
                let b = image[[row, col, 0]] as f64;
                let g = image[[row, col, 1]] as f64;
                let r = image[[row, col, 2]] as f64;
                (0.114 * b + 0.587 * g + 0.299 * r).round().min(255.0) as u8
            });
            Ok(from_gray(plane))
        }
        n => Err(PrepCvError::UnsupportedImage(format!(
            "grayscale expects 1, 3 or 4 channels, got {}",
            n
        ))),
    }
}

/// `grayscale`: takes no parameters.
pub struct Grayscale;

impl Operation for Grayscale {
    fn name(&self) -> &str {
        "grayscale"
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        Some(&[])
    }

    fn apply(&self, image: Image, _params: &ResolvedParams) -> Result<Image> {
        bgr_to_gray(image)
    }
}
