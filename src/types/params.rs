//! Parameter values and the two parameter-mapping shapes built from them.
//!
//! - [`ParamSpec`] is what a user writes: every parameter maps to either a
//!   single value or an ordered list of candidates.
//! - [`ResolvedParams`] is what an operation receives: exactly one value per
//!   parameter.
//!
//! Both keep insertion order. That order is observable (it drives expansion
//! order and the human-readable dump), so neither type is backed by a hash map.

use std::fmt;

use ndarray::Array2;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PrepCvError, Result};

//==================================================================================
// 1. Single Values
//==================================================================================

/// A single parameter value as passed to an operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A 2-D structuring element or filter kernel.
    Kernel(Array2<u8>),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats; nothing else converts.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_kernel(&self) -> Option<&Array2<u8>> {
        match self {
            ParamValue::Kernel(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "'{}'", v),
            ParamValue::Kernel(k) => write!(f, "kernel({}x{})", k.nrows(), k.ncols()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Array2<u8>> for ParamValue {
    fn from(v: Array2<u8>) -> Self {
        ParamValue::Kernel(v)
    }
}

//==================================================================================
// 2. Candidate Lists
//==================================================================================

/// The right-hand side of a [`ParamSpec`] entry. A bare value behaves exactly
/// like a one-element list during expansion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Candidates {
    List(Vec<ParamValue>),
    Single(ParamValue),
}

impl Candidates {
    /// The candidates as a slice; a `Single` is viewed as a singleton list.
    pub fn as_slice(&self) -> &[ParamValue] {
        match self {
            Candidates::List(values) => values,
            Candidates::Single(value) => std::slice::from_ref(value),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl fmt::Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidates::Single(value) => write!(f, "{}", value),
            Candidates::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

//==================================================================================
// 3. Parameter Specs (possibly multi-valued)
//==================================================================================

/// An ordered mapping from parameter name to a value or a list of candidates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSpec {
    entries: Vec<(String, Candidates)>,
}

impl ParamSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ParamSpec::insert`] for a literal single value.
    pub fn single(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, Candidates::Single(value.into()));
        self
    }

    /// Builder form of [`ParamSpec::insert`] for a candidate list.
    pub fn candidates<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(name, Candidates::List(values));
        self
    }

    /// Inserts a parameter. Re-inserting an existing name replaces its value
    /// but keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, candidates: Candidates) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = candidates,
            None => self.entries.push((name, candidates)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Candidates> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Candidates)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of single-valued mappings this spec expands to, saturating
    /// at `usize::MAX`.
    pub fn combination_count(&self) -> usize {
        self.checked_combination_count().unwrap_or(usize::MAX)
    }

    /// `None` when the count overflows `usize`.
    pub fn checked_combination_count(&self) -> Option<usize> {
        self.entries
            .iter()
            .try_fold(1usize, |acc, (_, c)| acc.checked_mul(c.len()))
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, candidates)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, candidates)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for ParamSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, candidates) in &self.entries {
            map.serialize_entry(name, candidates)?;
        }
        map.end()
    }
}

// Hand-written so that document order survives deserialization.
impl<'de> Deserialize<'de> for ParamSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = ParamSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to values or candidate lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<ParamSpec, A::Error> {
                let mut spec = ParamSpec::new();
                while let Some((name, candidates)) = map.next_entry::<String, Candidates>()? {
                    spec.insert(name, candidates);
                }
                Ok(spec)
            }
        }

        deserializer.deserialize_map(SpecVisitor)
    }
}

//==================================================================================
// 4. Resolved Parameters (single-valued)
//==================================================================================

/// An ordered mapping from parameter name to exactly one value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedParams {
    entries: Vec<(String, ParamValue)>,
}

impl ResolvedParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and by callers invoking an operation directly.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.push(name.into(), value.into());
        self
    }

    pub(crate) fn push(&mut self, name: String, value: ParamValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Views the resolved mapping as a spec of single values.
    pub fn to_spec(&self) -> ParamSpec {
        let mut spec = ParamSpec::new();
        for (name, value) in &self.entries {
            spec.insert(name.clone(), Candidates::Single(value.clone()));
        }
        spec
    }

    // --- Typed accessors used by the kernels ---

    fn typed<'a, T>(
        &'a self,
        name: &str,
        kind: &str,
        extract: impl Fn(&'a ParamValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => extract(value).map(Some).ok_or_else(|| {
                PrepCvError::invalid_value(name, format!("expected {}, got {}", kind, value))
            }),
        }
    }

    pub fn int_or(&self, name: &str, default: i64) -> Result<i64> {
        Ok(self.typed(name, "an integer", ParamValue::as_int)?.unwrap_or(default))
    }

    pub fn float_or(&self, name: &str, default: f64) -> Result<f64> {
        Ok(self.typed(name, "a number", ParamValue::as_float)?.unwrap_or(default))
    }

    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str> {
        Ok(self.typed(name, "a string", ParamValue::as_text)?.unwrap_or(default))
    }

    pub fn require_float(&self, name: &str) -> Result<f64> {
        self.typed(name, "a number", ParamValue::as_float)?
            .ok_or_else(|| PrepCvError::MissingParameter(name.to_string()))
    }

    pub fn kernel(&self, name: &str) -> Result<Option<&Array2<u8>>> {
        self.typed(name, "a kernel", ParamValue::as_kernel)
    }
}

impl fmt::Display for ResolvedParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for ResolvedParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
