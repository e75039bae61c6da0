//! This module defines the operation contract shared by the built-in kernels,
//! user closures, and the pipeline machinery that strings them together.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Image, ResolvedParams};

/// A single named image transform with keyword parameters.
///
/// The image is passed by value: the preprocessor already owns a private
/// working copy, so operations are free to reuse its buffer.
pub trait Operation: Send + Sync {
    /// The identifier used in descriptions, logs and experiment files.
    fn name(&self) -> &str;

    /// The accepted parameter names, or `None` when the operation cannot be
    /// introspected. `Some(&[])` means "accepts no parameters".
    fn parameter_names(&self) -> Option<&[&'static str]> {
        None
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image>;
}

/// Shared handle to an operation. Descriptions, resolved descriptions and
/// preprocessors all point at the same operation instance.
pub type OperationRef = Arc<dyn Operation>;

type OperationFn = dyn Fn(Image, &ResolvedParams) -> Result<Image> + Send + Sync;

/// Adapts a closure into an [`Operation`].
pub struct FnOperation {
    name: String,
    parameters: Option<Vec<&'static str>>,
    func: Box<OperationFn>,
}

impl FnOperation {
    /// Wraps a closure whose parameters are unknown; descriptions using it
    /// skip validation with a warning.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Image, &ResolvedParams) -> Result<Image> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: None,
            func: Box::new(func),
        }
    }

    /// Declares the accepted parameter names so descriptions can be validated.
    pub fn with_parameters(mut self, names: &[&'static str]) -> Self {
        self.parameters = Some(names.to_vec());
        self
    }

    pub fn into_ref(self) -> OperationRef {
        Arc::new(self)
    }
}

impl Operation for FnOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_names(&self) -> Option<&[&'static str]> {
        self.parameters.as_deref()
    }

    fn apply(&self, image: Image, params: &ResolvedParams) -> Result<Image> {
        (self.func)(image, params)
    }
}

impl fmt::Debug for dyn Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation({})", self.name())
    }
}
