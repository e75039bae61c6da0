//! Global and adaptive thresholding kernels.
//!
//! Adaptive thresholding compares each sample against a statistic of its
//! `block_size x block_size` neighbourhood (borders replicated) minus a
//! constant `c`:
//!
//! - `binary`:     `dst = src > T ? max_value : 0`
//! - `binary_inv`: `dst = src > T ? 0 : max_value`

use ndarray::{Array2, Axis};

use crate::error::{PrepCvError, Result};
use crate::traits::Operation;
use crate::types::image::from_gray;
use crate::types::{Image, ResolvedParams};
use crate::utils::clamp_index;

//==================================================================================
// 1. Modes
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdType {
    Binary,
    BinaryInv,
    Trunc,
    ToZero,
    ToZeroInv,
}

impl ThresholdType {
    pub fn parse(parameter: &str, text: &str) -> Result<Self> {
        match text {
            "binary" => Ok(Self::Binary),
            "binary_inv" => Ok(Self::BinaryInv),
            "trunc" => Ok(Self::Trunc),
            "tozero" => Ok(Self::ToZero),
            "tozero_inv" => Ok(Self::ToZeroInv),
            other => Err(PrepCvError::invalid_value(
                parameter,
                format!("unknown threshold type '{}'", other),
            )),
        }
    }

    #[inline]
    fn apply(self, src: u8, above: bool, max_value: u8, thresh: u8) -> u8 {
        match self {
            Self::Binary => if above { max_value } else { 0 },
            Self::BinaryInv => if above { 0 } else { max_value },
            Self::Trunc => if above { thresh } else { src },
            Self::ToZero => if above { src } else { 0 },
            Self::ToZeroInv => if above { 0 } else { src },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveMethod {
    MeanC,
    GaussianC,
}

impl AdaptiveMethod {
    pub fn parse(parameter: &str, text: &str) -> Result<Self> {
        match text {
            "mean_c" => Ok(Self::MeanC),
            "gaussian_c" => Ok(Self::GaussianC),
            other => Err(PrepCvError::invalid_value(
                parameter,
                format!("unknown adaptive method '{}'", other),
            )),
        }
    }
}

fn to_u8(parameter: &str, value: i64) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| PrepCvError::invalid_value(parameter, format!("{} is outside 0..=255", value)))
}

//==================================================================================
// 2. Global Threshold
//==================================================================================

/// Applies a fixed threshold to every sample of every channel.
pub fn threshold(image: Image, thresh: f64, max_value: u8, kind: ThresholdType) -> Image {
    let clamped = thresh.clamp(0.0, 255.0) as u8;
    image.mapv(|v| kind.apply(v, v as f64 > thresh, max_value, clamped))
}

/// `threshold`: `thresh` (default 127), `maxval` (default 255), `type` (default `binary`).
pub struct Threshold;

impl Threshold {
    const PARAMS: [&'static str; 3] = ["thresh", "maxval", "type"];
}

impl Operation for Threshold {
    fn name(&self) -> &str {
        "threshold"
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        Some(&Self::PARAMS)
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image> {
        let thresh = params.float_or("thresh", 127.0)?;
        let max_value = to_u8("maxval", params.int_or("maxval", 255)?)?;
        let kind = ThresholdType::parse("type", params.text_or("type", "binary")?)?;
        Ok(threshold(image, thresh, max_value, kind))
    }
}

//==================================================================================
// 3. Adaptive Threshold
//==================================================================================

/// Normalised 1-D Gaussian weights for a window of `size` samples, using the
/// sigma rule `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
fn gaussian_weights(size: usize) -> Vec<f64> {
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as f64;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - half;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Separable weighted local average with replicated borders.
fn local_average(plane: &Array2<u8>, weights: &[f64]) -> Array2<f64> {
    let (rows, cols) = plane.dim();
    let half = (weights.len() / 2) as isize;

    let horizontal = Array2::from_shape_fn((rows, cols), |(r, c)| {
        weights
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let cc = clamp_index(c as isize + k as isize - half, cols);
                w * plane[[r, cc]] as f64
            })
            .sum::<f64>()
    });

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        weights
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let rr = clamp_index(r as isize + k as isize - half, rows);
                w * horizontal[[rr, c]]
            })
            .sum::<f64>()
    })
}

/// Thresholds a single-channel image against its local neighbourhood.
pub fn adaptive_threshold(
    image: Image,
    max_value: u8,
    method: AdaptiveMethod,
    kind: ThresholdType,
    block_size: usize,
    c: f64,
) -> Result<Image> {
    let (rows, cols, channels) = image.dim();
    if channels != 1 {
        return Err(PrepCvError::UnsupportedImage(format!(
            "adaptive_threshold expects a single-channel image, got {} channels",
            channels
        )));
    }
    if block_size < 3 || block_size % 2 == 0 {
        return Err(PrepCvError::invalid_value(
            "blockSize",
            format!("must be odd and greater than 1, got {}", block_size),
        ));
    }
    if !matches!(kind, ThresholdType::Binary | ThresholdType::BinaryInv) {
        return Err(PrepCvError::invalid_value(
            "thresholdType",
            "adaptive thresholding supports only 'binary' and 'binary_inv'",
        ));
    }
    if rows == 0 || cols == 0 {
        return Ok(image);
    }
    // Any wider window only adds replicated border taps.
    let widest = 2 * rows.max(cols) + 1;
    if block_size > widest {
        return Err(PrepCvError::invalid_value(
            "blockSize",
            format!(
                "{} is wider than a {}x{} image allows (at most {})",
                block_size, rows, cols, widest
            ),
        ));
    }

    let plane = image.index_axis_move(Axis(2), 0);
    let weights = match method {
        AdaptiveMethod::MeanC => vec![1.0 / block_size as f64; block_size],
        AdaptiveMethod::GaussianC => gaussian_weights(block_size),
    };
    let average = local_average(&plane, &weights);

    let out = Array2::from_shape_fn((rows, cols), |(r, col)| {
        let src = plane[[r, col]];
        let local = average[[r, col]].round();
        let above = src as f64 - local > -c;
        kind.apply(src, above, max_value, 0)
    });
    Ok(from_gray(out))
}

/// `adaptive_threshold`: `maxValue` (255), `adaptiveMethod` (`mean_c`),
/// `thresholdType` (`binary`), `blockSize` (3), `C` (0).
pub struct AdaptiveThreshold;

impl AdaptiveThreshold {
    const PARAMS: [&'static str; 5] = [
        "maxValue",
        "adaptiveMethod",
        "thresholdType",
        "blockSize",
        "C",
    ];
}

impl Operation for AdaptiveThreshold {
    fn name(&self) -> &str {
        "adaptive_threshold"
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        Some(&Self::PARAMS)
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image> {
        let max_value = to_u8("maxValue", params.int_or("maxValue", 255)?)?;
        let method =
            AdaptiveMethod::parse("adaptiveMethod", params.text_or("adaptiveMethod", "mean_c")?)?;
        let kind = ThresholdType::parse("thresholdType", params.text_or("thresholdType", "binary")?)?;
        let block_size = params.int_or("blockSize", 3)?;
        let block_size = usize::try_from(block_size).map_err(|_| {
            PrepCvError::invalid_value("blockSize", format!("must be positive, got {}", block_size))
        })?;
        let c = params.float_or("C", 0.0)?;
        adaptive_threshold(image, max_value, method, kind, block_size, c)
    }
}
