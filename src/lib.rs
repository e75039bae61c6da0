//! This file is the root of the `prepcv` Rust crate: exhaustive search over
//! image preprocessing pipelines with an interactive or automatic selection
//! tournament.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`pipeline`,
//!     `search`, `kernels`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the types a typical caller needs.
//!
//! A typical session:
//! 1.  Build a [`PipelineDescription`] whose parameters hold candidate lists.
//! 2.  [`PipelineRegistry::register`] it, which resolves every combination
//!     into a [`Preprocessor`].
//! 3.  [`PipelineRegistry::run_search`] on a sample image with a
//!     [`Selector`] wrapping a [`SelectionOracle`].
//! 4.  Read the winner back with [`PipelineRegistry::get_best`].

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod config;
pub mod error;
pub mod experiment;
pub mod kernels;
pub mod pipeline;
pub mod search;
pub mod traits;
pub mod types;

mod utils;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use config::{OracleKind, SearchConfig, StrategyKind};
pub use error::{PrepCvError, Result};
pub use experiment::{ExperimentFile, WinnerRecord};
pub use kernels::OperationCatalog;
pub use observability::enable_verbose_logging;
pub use pipeline::{PipelineDescription, PipelineRegistry, Preprocessor, ResolvedPipelineDescription};
pub use search::{
    GridSearch, Scorer, SearchReport, SearchStrategy, Selection, SelectionOracle, Selector,
};
pub use traits::{FnOperation, Operation, OperationRef};
pub use types::{Candidates, Image, ParamSpec, ParamValue, ResolvedParams};
