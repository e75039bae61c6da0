// In: src/pipeline/expander.rs

//! Grid expansion of candidate lists.
//!
//! Two levels share one Cartesian product helper:
//! 1.  [`expand`] turns one operation's [`ParamSpec`] into every single-valued
//!     [`ResolvedParams`].
//! 2.  [`resolve`] takes the product of those expansions across operations to
//!     produce every [`ResolvedPipelineDescription`].
//!
//! In both, input order is preserved and the last entry varies fastest.

use crate::pipeline::description::{
    PipelineDescription, ResolvedPipelineDescription, ResolvedStage,
};
use crate::types::{ParamSpec, ResolvedParams};
use crate::utils::cartesian_product;

/// Every single-valued assignment of `spec`. An empty spec yields one empty
/// mapping; a parameter with an empty candidate list yields none.
pub fn expand(spec: &ParamSpec) -> Vec<ResolvedParams> {
    let names: Vec<&str> = spec.names().collect();
    let axes: Vec<Vec<_>> = spec
        .iter()
        .map(|(_, candidates)| candidates.as_slice().to_vec())
        .collect();

    cartesian_product(&axes)
        .into_iter()
        .map(|values| {
            let mut params = ResolvedParams::new();
            for (name, value) in names.iter().zip(values) {
                params.push(name.to_string(), value);
            }
            params
        })
        .collect()
}

/// Every resolved description `description` stands for, in grid order.
pub fn resolve(description: &PipelineDescription) -> Vec<ResolvedPipelineDescription> {
    let per_stage: Vec<Vec<ResolvedParams>> = description
        .stages()
        .iter()
        .map(|stage| expand(stage.params()))
        .collect();

    cartesian_product(&per_stage)
        .into_iter()
        .map(|combination| {
            let stages = description
                .stages()
                .iter()
                .zip(combination)
                .map(|(stage, params)| ResolvedStage::new(stage.operation().clone(), params))
                .collect();
            ResolvedPipelineDescription::from_stages(stages)
        })
        .collect()
}

/// The length [`resolve`] would return, without materialising anything.
pub fn count_combinations(description: &PipelineDescription) -> usize {
    description.combination_count()
}
