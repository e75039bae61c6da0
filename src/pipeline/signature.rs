// In: src/pipeline/signature.rs

//! Parameter-name introspection for operations.
//!
//! Introspection is a capability, not a guarantee: an operation built from a
//! bare closure has no declared signature. Callers receive `None` in that case
//! and decide for themselves that it means "skip validation", never "reject".

use std::collections::BTreeSet;

use crate::traits::Operation;

/// Answers "which parameter names does this operation accept?".
pub trait ParameterIntrospector {
    fn describe_parameters(&self, operation: &dyn Operation) -> Option<BTreeSet<String>>;
}

/// Reads the signature each operation declares about itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredSignatures;

impl ParameterIntrospector for DeclaredSignatures {
    fn describe_parameters(&self, operation: &dyn Operation) -> Option<BTreeSet<String>> {
        operation
            .parameter_names()
            .map(|names| names.iter().map(|n| n.to_string()).collect())
    }
}

/// Null object: nothing is introspectable, so every description validates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIntrospection;

impl ParameterIntrospector for NoIntrospection {
    fn describe_parameters(&self, _operation: &dyn Operation) -> Option<BTreeSet<String>> {
        None
    }
}

/// The accepted parameter names of `operation`, or `None` if they cannot be
/// determined.
pub fn valid_parameter_names(operation: &dyn Operation) -> Option<BTreeSet<String>> {
    DeclaredSignatures.describe_parameters(operation)
}
