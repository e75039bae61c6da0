//! This module defines the description layer: validated pipeline descriptions,
//! their grid expansion into resolved descriptions, the preprocessors that
//! execute them and the registry that collects them for search.

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub mod description;
pub mod expander;
pub mod preprocessor;
pub mod registry;
pub mod signature;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use self::description::{
    DescriptionBuilder, PipelineDescription, ResolvedPipelineDescription, ResolvedStage, Stage,
};
pub use self::expander::{count_combinations, expand, resolve};
pub use self::preprocessor::Preprocessor;
pub use self::registry::PipelineRegistry;
pub use self::signature::{
    valid_parameter_names, DeclaredSignatures, NoIntrospection, ParameterIntrospector,
};
