//! Geometric kernels: relative cropping and nearest-neighbour scaling.

use ndarray::{s, Array3};

use crate::error::{PrepCvError, Result};
use crate::traits::Operation;
use crate::types::{Image, ResolvedParams};

/// Crops using relative coordinates in `[0, 1]`. Pixel bounds are truncated,
/// so `minx = 0.1` on a 25 pixel wide image starts at column 2.
pub fn crop(image: Image, minx: f64, maxx: f64, miny: f64, maxy: f64) -> Result<Image> {
    for (name, value) in [("minx", minx), ("maxx", maxx), ("miny", miny), ("maxy", maxy)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(PrepCvError::invalid_value(
                name,
                format!("relative coordinate {} is outside [0, 1]", value),
            ));
        }
    }

    let (rows, cols, _) = image.dim();
    let x_start = (cols as f64 * minx) as usize;
    let x_end = (cols as f64 * maxx) as usize;
    let y_start = (rows as f64 * miny) as usize;
    let y_end = (rows as f64 * maxy) as usize;

    if x_start >= x_end || y_start >= y_end {
        return Err(PrepCvError::invalid_value(
            "maxx",
            format!(
                "crop region [{}..{}, {}..{}] of a {}x{} image is empty",
                y_start, y_end, x_start, x_end, rows, cols
            ),
        ));
    }
    Ok(image.slice(s![y_start..y_end, x_start..x_end, ..]).to_owned())
}

/// Scales both axes by `scale_factor` with nearest-neighbour sampling.
/// Target dimensions are truncated, as with an integer cast.
pub fn resize(image: &Image, scale_factor: f64) -> Result<Image> {
    if !(scale_factor > 0.0 && scale_factor.is_finite()) {
        return Err(PrepCvError::invalid_value(
            "scale_factor",
            format!("must be a positive finite number, got {}", scale_factor),
        ));
    }
    let (rows, cols, channels) = image.dim();
    let new_rows = (rows as f64 * scale_factor) as usize;
    let new_cols = (cols as f64 * scale_factor) as usize;
    if new_rows == 0 || new_cols == 0 {
        return Err(PrepCvError::invalid_value(
            "scale_factor",
            format!("scaling {}x{} by {} leaves no pixels", rows, cols, scale_factor),
        ));
    }
    let fits = new_rows
        .checked_mul(new_cols)
        .and_then(|n| n.checked_mul(channels))
        .map_or(false, |n| n <= isize::MAX as usize);
    if !fits {
        return Err(PrepCvError::invalid_value(
            "scale_factor",
            format!("scaling {}x{} by {} exceeds the addressable size", rows, cols, scale_factor),
        ));
    }

    let row_ratio = rows as f64 / new_rows as f64;
    let col_ratio = cols as f64 / new_cols as f64;
    Ok(Array3::from_shape_fn((new_rows, new_cols, channels), |(r, c, ch)| {
        let src_r = ((r as f64 * row_ratio) as usize).min(rows - 1);
        let src_c = ((c as f64 * col_ratio) as usize).min(cols - 1);
        image[[src_r, src_c, ch]]
    }))
}

/// `crop`: `minx`, `maxx`, `miny`, `maxy`; all required.
pub struct Crop;

impl Crop {
    const PARAMS: [&'static str; 4] = ["minx", "maxx", "miny", "maxy"];
}

impl Operation for Crop {
    fn name(&self) -> &str {
        "crop"
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        Some(&Self::PARAMS)
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image> {
        crop(
            image,
            params.require_float("minx")?,
            params.require_float("maxx")?,
            params.require_float("miny")?,
            params.require_float("maxy")?,
        )
    }
}

/// `resize`: `scale_factor`, required.
pub struct Resize;

impl Operation for Resize {
    fn name(&self) -> &str {
        "resize"
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        Some(&["scale_factor"])
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image> {
        resize(&image, params.require_float("scale_factor")?)
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::image::uniform;

    fn numbered(rows: usize, cols: usize) -> Image {
        Array3::from_shape_fn((rows, cols, 1), |(r, c, _)| (r * cols + c) as u8)
    }

    #[test]
    fn test_crop_truncates_bounds() {
        let img = numbered(10, 20);
        let out = crop(img, 0.1, 0.7, 0.4, 0.95).unwrap();
        // cols 2..14, rows 4..9
        assert_eq!(out.dim(), (5, 12, 1));
        assert_eq!(out[[0, 0, 0]], (4 * 20 + 2) as u8);
    }

    #[test]
    fn test_crop_rejects_out_of_range_and_empty() {
        assert!(crop(uniform(4, 4, 1, 0), -0.1, 0.5, 0.0, 1.0).is_err());
        assert!(crop(uniform(4, 4, 1, 0), 0.5, 0.5, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_resize_up_and_down() {
        let img = numbered(2, 3);
        let up = resize(&img, 2.0).unwrap();
        assert_eq!(up.dim(), (4, 6, 1));
        assert_eq!(up[[1, 1, 0]], img[[0, 0, 0]]);
        assert_eq!(up[[3, 5, 0]], img[[1, 2, 0]]);

        let down = resize(&numbered(4, 4), 0.5).unwrap();
        assert_eq!(down.dim(), (2, 2, 1));
        assert_eq!(down[[1, 1, 0]], 10);
    }

    #[test]
    fn test_resize_rejects_degenerate_scale() {
        assert!(resize(&uniform(2, 2, 1, 0), 0.0).is_err());
        assert!(resize(&uniform(2, 2, 1, 0), 0.1).is_err());
    }

    #[test]
    fn test_resize_rejects_unaddressable_target() {
        let result = resize(&uniform(10, 10, 3, 0), 1e12);
        assert!(matches!(
            result,
            Err(PrepCvError::InvalidParameterValue { parameter, .. }) if parameter == "scale_factor"
        ));
    }

    #[test]
    fn test_crop_operation_requires_all_bounds() {
        let params = ResolvedParams::new().with("minx", 0.0).with("maxx", 1.0);
        let result = Crop.apply(uniform(4, 4, 1, 0), &params);
        assert!(matches!(result, Err(PrepCvError::MissingParameter(p)) if p == "miny"));
    }
}
