// In: src/pipeline/description.rs

//! Validated, immutable pipeline descriptions.
//!
//! A [`PipelineDescription`] is an ordered mapping from operation to a
//! [`ParamSpec`] that may still hold candidate lists. A
//! [`ResolvedPipelineDescription`] holds exactly one value per parameter and
//! is the only form a preprocessor executes.
//!
//! Neither type exposes a mutating method. "Changing" a description means
//! building a new one, which re-runs validation.

use std::fmt;

use crate::error::{PrepCvError, Result};
use crate::pipeline::signature::{DeclaredSignatures, ParameterIntrospector};
use crate::traits::OperationRef;
use crate::types::{Candidates, ParamSpec, ResolvedParams};

//==================================================================================
// 1. Multi-valued Descriptions
//==================================================================================

/// One operation together with its (possibly multi-valued) parameters.
#[derive(Clone, Debug)]
pub struct Stage {
    operation: OperationRef,
    params: ParamSpec,
}

impl Stage {
    pub fn operation(&self) -> &OperationRef {
        &self.operation
    }

    pub fn name(&self) -> &str {
        self.operation.name()
    }

    pub fn params(&self) -> &ParamSpec {
        &self.params
    }
}

#[derive(Clone, Debug)]
pub struct PipelineDescription {
    stages: Vec<Stage>,
}

impl PipelineDescription {
    /// Builds and validates a description against each operation's declared
    /// signature.
    pub fn new<I>(stages: I) -> Result<Self>
    where
        I: IntoIterator<Item = (OperationRef, ParamSpec)>,
    {
        Self::with_introspector(stages, &DeclaredSignatures)
    }

    /// Builds and validates a description with a caller-chosen introspector.
    pub fn with_introspector<I>(stages: I, introspector: &dyn ParameterIntrospector) -> Result<Self>
    where
        I: IntoIterator<Item = (OperationRef, ParamSpec)>,
    {
        let stages: Vec<Stage> = stages
            .into_iter()
            .map(|(operation, params)| Stage { operation, params })
            .collect();
        validate(&stages, introspector)?;
        Ok(Self { stages })
    }

    pub fn builder() -> DescriptionBuilder {
        DescriptionBuilder::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// How many resolved descriptions this one expands into. Construction
    /// rejects descriptions whose count would overflow.
    pub fn combination_count(&self) -> usize {
        checked_count(&self.stages).unwrap_or(usize::MAX)
    }

    /// Returns the resolved form if every parameter already holds a single
    /// literal value.
    pub fn try_resolved(&self) -> Option<ResolvedPipelineDescription> {
        let mut stages = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let mut params = ResolvedParams::new();
            for (name, candidates) in stage.params.iter() {
                match candidates {
                    Candidates::Single(value) => params.push(name.to_string(), value.clone()),
                    Candidates::List(_) => return None,
                }
            }
            stages.push(ResolvedStage {
                operation: stage.operation.clone(),
                params,
            });
        }
        Some(ResolvedPipelineDescription { stages })
    }

    /// A human-readable dump of the full mapping.
    pub fn describe(&self) -> String {
        render(
            "PipelineDescription",
            self.stages.iter().map(|s| (s.name(), s.params.to_string())),
        )
    }
}

impl fmt::Display for PipelineDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Collects stages before validating them all at once in [`build`](Self::build).
#[derive(Default)]
pub struct DescriptionBuilder {
    stages: Vec<(OperationRef, ParamSpec)>,
}

impl DescriptionBuilder {
    pub fn stage(mut self, operation: OperationRef, params: ParamSpec) -> Self {
        self.stages.push((operation, params));
        self
    }

    pub fn build(self) -> Result<PipelineDescription> {
        PipelineDescription::new(self.stages)
    }
}

fn checked_count(stages: &[Stage]) -> Option<usize> {
    stages.iter().try_fold(1usize, |acc, s| {
        s.params
            .checked_combination_count()
            .and_then(|n| acc.checked_mul(n))
    })
}

fn validate(stages: &[Stage], introspector: &dyn ParameterIntrospector) -> Result<()> {
    for (i, stage) in stages.iter().enumerate() {
        let name = stage.name();
        if stages[..i].iter().any(|earlier| earlier.name() == name) {
            return Err(PrepCvError::DuplicateOperation(name.to_string()));
        }

        let valid = match introspector.describe_parameters(stage.operation.as_ref()) {
            Some(valid) => valid,
            None => {
                log::warn!(
                    "Unable to retrieve parameters for operation '{}'. Skipping validation.",
                    name
                );
                continue;
            }
        };

        if let Some(bad) = stage.params.names().find(|p| !valid.contains(*p)) {
            return Err(PrepCvError::Validation {
                operation: name.to_string(),
                parameter: bad.to_string(),
                valid: valid.iter().cloned().collect::<Vec<_>>().join(", "),
            });
        }
    }

    if checked_count(stages).is_none() {
        let sizes: Vec<String> = stages
            .iter()
            .map(|s| format!("{}={}", s.name(), s.params.combination_count()))
            .collect();
        return Err(PrepCvError::TooManyCombinations(sizes.join(", ")));
    }
    Ok(())
}

fn render<'a>(title: &str, stages: impl Iterator<Item = (&'a str, String)>) -> String {
    let mut out = format!("{} {{\n", title);
    for (name, params) in stages {
        out.push_str(&format!("    {}: {},\n", name, params));
    }
    out.push('}');
    out
}

//==================================================================================
// 2. Resolved Descriptions
//==================================================================================

/// One operation together with exactly one value per parameter.
#[derive(Clone, Debug)]
pub struct ResolvedStage {
    operation: OperationRef,
    params: ResolvedParams,
}

impl ResolvedStage {
    pub(crate) fn new(operation: OperationRef, params: ResolvedParams) -> Self {
        Self { operation, params }
    }

    pub fn operation(&self) -> &OperationRef {
        &self.operation
    }

    pub fn name(&self) -> &str {
        self.operation.name()
    }

    pub fn params(&self) -> &ResolvedParams {
        &self.params
    }
}

impl PartialEq for ResolvedStage {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.params == other.params
    }
}

/// A description with no candidate lists left. Only produced by resolution
/// (or [`PipelineDescription::try_resolved`]) of an already-validated
/// description, so it inherits that validation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPipelineDescription {
    stages: Vec<ResolvedStage>,
}

impl ResolvedPipelineDescription {
    pub(crate) fn from_stages(stages: Vec<ResolvedStage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[ResolvedStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The resolved parameters of the stage running `operation`, if present.
    pub fn params_for(&self, operation: &str) -> Option<&ResolvedParams> {
        self.stages
            .iter()
            .find(|s| s.name() == operation)
            .map(|s| &s.params)
    }

    pub fn describe(&self) -> String {
        render(
            "ResolvedPipelineDescription",
            self.stages.iter().map(|s| (s.name(), s.params.to_string())),
        )
    }
}

impl fmt::Display for ResolvedPipelineDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{color::Grayscale, threshold::AdaptiveThreshold};
    use crate::pipeline::signature::NoIntrospection;
    use crate::traits::FnOperation;
    use crate::types::{Image, ParamValue};
    use std::sync::Arc;

    fn grayscale() -> OperationRef {
        Arc::new(Grayscale)
    }

    fn adaptive() -> OperationRef {
        Arc::new(AdaptiveThreshold)
    }

    #[test]
    fn test_valid_names_construct() {
        let desc = PipelineDescription::builder()
            .stage(grayscale(), ParamSpec::new())
            .stage(
                adaptive(),
                ParamSpec::new()
                    .single("maxValue", 255)
                    .candidates("blockSize", [3, 5]),
            )
            .build()
            .unwrap();
        assert_eq!(desc.len(), 2);
        assert_eq!(desc.combination_count(), 2);
        assert_eq!(desc.stages()[1].name(), "adaptive_threshold");
    }

    #[test]
    fn test_invalid_name_names_operation_and_parameter() {
        let err = PipelineDescription::builder()
            .stage(adaptive(), ParamSpec::new().candidates("block_size", [3]))
            .build()
            .unwrap_err();
        match err {
            PrepCvError::Validation { operation, parameter, valid } => {
                assert_eq!(operation, "adaptive_threshold");
                assert_eq!(parameter, "block_size");
                assert!(valid.contains("blockSize"));
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parameterless_operation_rejects_any_parameter() {
        let result = PipelineDescription::builder()
            .stage(grayscale(), ParamSpec::new().single("code", 6))
            .build();
        assert!(matches!(result, Err(PrepCvError::Validation { .. })));
    }

    #[test]
    fn test_uninspectable_operation_skips_validation() {
        let custom = FnOperation::new("custom", |img: Image, _p: &ResolvedParams| Ok(img)).into_ref();
        let desc = PipelineDescription::builder()
            .stage(custom, ParamSpec::new().single("anything", 1))
            .build();
        assert!(desc.is_ok());

        // The null introspector disables validation for everything.
        let desc = PipelineDescription::with_introspector(
            vec![(adaptive(), ParamSpec::new().single("not_a_param", 1))],
            &NoIntrospection,
        );
        assert!(desc.is_ok());
    }

    #[test]
    fn test_duplicate_operation_rejected() {
        let result = PipelineDescription::builder()
            .stage(grayscale(), ParamSpec::new())
            .stage(grayscale(), ParamSpec::new())
            .build();
        assert!(matches!(result, Err(PrepCvError::DuplicateOperation(n)) if n == "grayscale"));
    }

    #[test]
    fn test_overflowing_combination_count_rejected() {
        let custom = FnOperation::new("wide", |img: Image, _p: &ResolvedParams| Ok(img)).into_ref();
        let spec = (0..65).fold(ParamSpec::new(), |spec, i| {
            spec.candidates(&format!("p{}", i), [0, 1])
        });
        let result = PipelineDescription::builder().stage(custom, spec).build();
        assert!(matches!(result, Err(PrepCvError::TooManyCombinations(_))));
    }

    #[test]
    fn test_describe_lists_every_stage_in_order() {
        let desc = PipelineDescription::builder()
            .stage(grayscale(), ParamSpec::new())
            .stage(adaptive(), ParamSpec::new().candidates("blockSize", [3, 5]))
            .build()
            .unwrap();
        assert_eq!(
            desc.describe(),
            "PipelineDescription {\n    grayscale: {},\n    adaptive_threshold: {blockSize: [3, 5]},\n}"
        );
    }

    #[test]
    fn test_try_resolved_only_for_single_values() {
        let literal = PipelineDescription::builder()
            .stage(adaptive(), ParamSpec::new().single("blockSize", 7))
            .build()
            .unwrap();
        let resolved = literal.try_resolved().unwrap();
        assert_eq!(
            resolved.params_for("adaptive_threshold").unwrap().get("blockSize"),
            Some(&ParamValue::Int(7))
        );

        let listed = PipelineDescription::builder()
            .stage(adaptive(), ParamSpec::new().candidates("blockSize", [7]))
            .build()
            .unwrap();
        assert!(listed.try_resolved().is_none());
    }
}
