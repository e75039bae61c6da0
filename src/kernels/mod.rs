//! This module contains the pure, stateless image kernels and the catalog that
//! maps operation names to them.
//!
//! Every kernel is exposed twice: as a plain function taking typed arguments
//! (for direct use and unit tests) and as a unit struct implementing
//! [`Operation`] that reads its arguments from [`ResolvedParams`] and declares
//! its parameter names for description validation.
//!
//! [`Operation`]: crate::traits::Operation
//! [`ResolvedParams`]: crate::types::ResolvedParams

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{PrepCvError, Result};
use crate::traits::OperationRef;

pub mod color;
pub mod geometry;
pub mod morphology;
pub mod threshold;

/// Every built-in operation, in a stable order.
pub fn builtin_operations() -> Vec<OperationRef> {
    vec![
        Arc::new(color::Grayscale),
        Arc::new(threshold::Threshold),
        Arc::new(threshold::AdaptiveThreshold),
        Arc::new(geometry::Crop),
        Arc::new(geometry::Resize),
        Arc::new(morphology::Dilate),
        Arc::new(morphology::Erode),
    ]
}

/// Name → operation lookup used when descriptions come from experiment files.
#[derive(Default, Clone)]
pub struct OperationCatalog {
    operations: BTreeMap<String, OperationRef>,
}

impl OperationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for op in builtin_operations() {
            catalog.insert(op);
        }
        catalog
    }

    /// Adds an operation under its own name, returning the one it replaced.
    pub fn insert(&mut self, operation: OperationRef) -> Option<OperationRef> {
        self.operations.insert(operation.name().to_string(), operation)
    }

    pub fn get(&self, name: &str) -> Result<OperationRef> {
        self.operations
            .get(name)
            .cloned()
            .ok_or_else(|| PrepCvError::UnknownOperation(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
