//! Morphological dilation and erosion with an arbitrary structuring element.
//!
//! Non-zero kernel cells are active; the anchor is the kernel centre. Samples
//! outside the image are ignored rather than padded.

use ndarray::{Array2, Array3};

use crate::error::{PrepCvError, Result};
use crate::traits::Operation;
use crate::types::{Image, ResolvedParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Morph {
    Dilate,
    Erode,
}

/// A `rows x cols` structuring element with every cell active.
pub fn ones(rows: usize, cols: usize) -> Array2<u8> {
    Array2::from_elem((rows, cols), 1)
}

fn active_offsets(kernel: &Array2<u8>) -> Vec<(isize, isize)> {
    let (k_rows, k_cols) = kernel.dim();
    let (anchor_r, anchor_c) = ((k_rows / 2) as isize, (k_cols / 2) as isize);
    kernel
        .indexed_iter()
        .filter(|(_, &v)| v != 0)
        .map(|((r, c), _)| (r as isize - anchor_r, c as isize - anchor_c))
        .collect()
}

fn morph_once(image: &Image, offsets: &[(isize, isize)], op: Morph) -> Image {
    let (rows, cols, channels) = image.dim();
    Array3::from_shape_fn((rows, cols, channels), |(r, c, ch)| {
        let neighbours = offsets.iter().filter_map(|&(dr, dc)| {
            let rr = r as isize + dr;
            let cc = c as isize + dc;
            if rr < 0 || cc < 0 || rr >= rows as isize || cc >= cols as isize {
                None
            } else {
                Some(image[[rr as usize, cc as usize, ch]])
            }
        });
        let folded = match op {
            Morph::Dilate => neighbours.max(),
            Morph::Erode => neighbours.min(),
        };
        folded.unwrap_or(image[[r, c, ch]])
    })
}

fn morph(image: Image, kernel: &Array2<u8>, iterations: usize, op: Morph) -> Result<Image> {
    if kernel.is_empty() {
        return Err(PrepCvError::invalid_value("kernel", "structuring element is empty"));
    }
    let offsets = active_offsets(kernel);
    let mut current = image;
    for _ in 0..iterations {
        current = morph_once(&current, &offsets, op);
    }
    Ok(current)
}

/// Local maximum over the structuring element, repeated `iterations` times.
pub fn dilate(image: Image, kernel: &Array2<u8>, iterations: usize) -> Result<Image> {
    morph(image, kernel, iterations, Morph::Dilate)
}

/// Local minimum over the structuring element, repeated `iterations` times.
pub fn erode(image: Image, kernel: &Array2<u8>, iterations: usize) -> Result<Image> {
    morph(image, kernel, iterations, Morph::Erode)
}

const PARAMS: [&str; 2] = ["kernel", "iterations"];

fn read_params(params: &ResolvedParams) -> Result<(Array2<u8>, usize)> {
    let kernel = params.kernel("kernel")?.cloned().unwrap_or_else(|| ones(3, 3));
    let iterations = params.int_or("iterations", 1)?;
    let iterations = usize::try_from(iterations).map_err(|_| {
        PrepCvError::invalid_value("iterations", format!("must be non-negative, got {}", iterations))
    })?;
    Ok((kernel, iterations))
}

/// `dilate`: `kernel` (default 3x3 ones), `iterations` (default 1).
pub struct Dilate;

impl Operation for Dilate {
    fn name(&self) -> &str {
        "dilate"
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        Some(&PARAMS)
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image> {
        let (kernel, iterations) = read_params(params)?;
        dilate(image, &kernel, iterations)
    }
}

/// `erode`: `kernel` (default 3x3 ones), `iterations` (default 1).
pub struct Erode;

impl Operation for Erode {
    fn name(&self) -> &str {
        "erode"
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        Some(&PARAMS)
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image> {
        let (kernel, iterations) = read_params(params)?;
        erode(image, &kernel, iterations)
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::image::{from_gray, uniform};

    fn single_dot() -> Image {
        let mut plane = Array2::zeros((5, 5));
        plane[[2, 2]] = 255;
        from_gray(plane)
    }

    #[test]
    fn test_dilate_grows_dot_to_kernel_footprint() {
        let out = dilate(single_dot(), &ones(3, 3), 1).unwrap();
        assert_eq!(out.iter().filter(|&&v| v == 255).count(), 9);
        assert_eq!(out[[1, 1, 0]], 255);
        assert_eq!(out[[0, 0, 0]], 0);
    }

    #[test]
    fn test_erode_removes_dot() {
        let out = erode(single_dot(), &ones(3, 3), 1).unwrap();
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_iterations_compound() {
        let out = dilate(single_dot(), &ones(3, 3), 2).unwrap();
        assert!(out.iter().all(|&v| v == 255));
        let untouched = dilate(single_dot(), &ones(3, 3), 0).unwrap();
        assert_eq!(untouched, single_dot());
    }

    #[test]
    fn test_border_is_ignored_not_padded() {
        // Erosion of a uniform bright image must stay bright at the edges.
        let out = erode(uniform(4, 4, 1, 200), &ones(3, 3), 1).unwrap();
        assert!(out.iter().all(|&v| v == 200));
    }

    #[test]
    fn test_operation_defaults_and_validation() {
        let out = Dilate.apply(single_dot(), &ResolvedParams::new()).unwrap();
        assert_eq!(out.iter().filter(|&&v| v == 255).count(), 9);

        let params = ResolvedParams::new().with("iterations", -1);
        assert!(Erode.apply(single_dot(), &params).is_err());

        let params = ResolvedParams::new().with("kernel", Array2::<u8>::zeros((0, 0)));
        assert!(Dilate.apply(single_dot(), &params).is_err());
    }
}
