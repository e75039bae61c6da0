//! This module defines the core, strongly-typed data representations used
//! throughout the prepcv pipeline search.
//!
//! It includes the image artifact alias that every operation consumes and
//! produces, and the parameter value/spec types that pipeline descriptions
//! are built from.

pub mod image;
pub mod params;

// Re-export the main type(s) for easier access.
pub use image::Image;
pub use params::{Candidates, ParamSpec, ParamValue, ResolvedParams};
