//! The image artifact shared by every operation, plus the handful of summary
//! metrics used by automatic selection and by the terminal prompt.

use ndarray::{Array2, Array3, Axis};

/// An image as `(rows, cols, channels)` bytes. Colour images are 3 channels in
/// BGR order, grayscale and binary images are 1 channel.
pub type Image = Array3<u8>;

/// Builds an image where every sample holds `value`.
pub fn uniform(rows: usize, cols: usize, channels: usize, value: u8) -> Image {
    Array3::from_elem((rows, cols, channels), value)
}

/// Lifts a single-plane array into a 1-channel image.
pub fn from_gray(plane: Array2<u8>) -> Image {
    plane.insert_axis(Axis(2))
}

/// Returns `rows x cols x channels` for logs and prompts.
pub fn describe_shape(image: &Image) -> String {
    let (rows, cols, channels) = image.dim();
    format!("{}x{}x{}", rows, cols, channels)
}

/// Mean over all samples, `0.0` for an empty image.
pub fn mean_intensity(image: &Image) -> f64 {
    if image.is_empty() {
        return 0.0;
    }
    let sum: u64 = image.iter().map(|&v| v as u64).sum();
    sum as f64 / image.len() as f64
}

/// Fraction of samples that are non-zero. For a thresholded image this is the
/// share of foreground pixels.
pub fn foreground_ratio(image: &Image) -> f64 {
    if image.is_empty() {
        return 0.0;
    }
    let on = image.iter().filter(|&&v| v != 0).count();
    on as f64 / image.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_metrics() {
        let img = uniform(4, 5, 1, 200);
        assert_eq!(describe_shape(&img), "4x5x1");
        assert!((mean_intensity(&img) - 200.0).abs() < f64::EPSILON);
        assert!((foreground_ratio(&img) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_image_metrics_are_zero() {
        let img = uniform(0, 0, 1, 0);
        assert_eq!(mean_intensity(&img), 0.0);
        assert_eq!(foreground_ratio(&img), 0.0);
    }

    #[test]
    fn test_foreground_ratio_half() {
        let plane = Array2::from_shape_vec((2, 2), vec![0, 255, 0, 255]).unwrap();
        let img = from_gray(plane);
        assert_eq!(img.dim(), (2, 2, 1));
        assert!((foreground_ratio(&img) - 0.5).abs() < f64::EPSILON);
    }
}
