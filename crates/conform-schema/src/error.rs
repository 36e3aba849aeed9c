//! # Error Model — Invalid, MultipleInvalid, and the Compile-Time Taxonomy
//!
//! ## Taxonomy
//!
//! - [`SchemaError`]: the schema definition (or its configuration) is
//!   malformed. Raised once, at compile time.
//! - [`Invalid`]: one runtime validation failure, addressed by path.
//! - [`MultipleInvalid`]: a flat, non-empty list of `Invalid`.
//! - [`ValidationError`]: what `Schema::validate` returns: one of the two
//!   above, or a fatal failure of a user callable that is not part of the
//!   validation taxonomy at all.
//! - [`CallableError`]: what user callables return. A fixed whitelist of
//!   variants (`Assertion`, `Type`, `Value`) is coerced into `Invalid` by
//!   the engine; `Fatal` is propagated untouched.
//!
//! ## Enrichment
//!
//! A failure is created where it happens, with only local knowledge. Each
//! ancestor frame then applies the enrichment rule on the way up:
//! `expected`, `provided` and `validator` are filled only if still unset,
//! and the ancestor's path prefix is always *prepended*.
//!
//! ## Flatness
//!
//! `MultipleInvalid` wraps a `Vec<Invalid>`, so an aggregate of aggregates
//! cannot be expressed. Every constructor that accepts aggregates splices
//! their contents.

use std::collections::BTreeMap;
use std::fmt;

use conform_core::{PathDisplay, PathSegment, Value};
use serde::Serialize;
use thiserror::Error;

use crate::marker::MarkerKind;

/// A boxed error raised by user code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ─── Compile-time errors ─────────────────────────────────────────────

/// The schema definition itself is structurally invalid.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A marker directly wraps a marker of another kind, e.g. `Required(Optional(k))`.
    #[error("conflicting markers: {outer} cannot wrap {inner}")]
    ConflictingMarkers {
        /// The wrapping marker.
        outer: MarkerKind,
        /// The wrapped marker.
        inner: MarkerKind,
    },

    /// A marker used without an inner schema where one is required.
    #[error("bare {kind} marker is not allowed {context}")]
    BareMarker {
        /// The offending marker.
        kind: MarkerKind,
        /// Where it appeared.
        context: &'static str,
    },

    /// Two pairs of one mapping declare the same key.
    #[error("duplicate mapping key {key}")]
    DuplicateKey {
        /// Display of the key definition.
        key: String,
    },

    /// A mapping declares more than one `Extra` pair.
    #[error("mapping declares more than one Extra key")]
    MultipleExtra,

    /// A marker kind that makes no sense for a compile option.
    #[error("{kind} cannot be used as {option}")]
    InvalidOption {
        /// `default_keys` or `extra_keys`.
        option: &'static str,
        /// The rejected kind.
        kind: MarkerKind,
    },

    /// The options document could not be parsed.
    #[error("invalid schema configuration: {0}")]
    Config(String),
}

// ─── Invalid ─────────────────────────────────────────────────────────

/// A single, path-addressed validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invalid {
    /// Human-readable description of the failure.
    pub message: String,
    /// Label of what the schema wanted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Label of what the input gave. `None` means nothing was provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided: Option<String>,
    /// Steps from the input root to the failing value.
    pub path: Vec<PathSegment>,
    /// Display of the schema node that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    /// Extra fields supplied by validators.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, Value>,
}

impl Invalid {
    /// A bare failure with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            provided: None,
            path: Vec::new(),
            validator: None,
            info: BTreeMap::new(),
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_provided(mut self, provided: impl Into<String>) -> Self {
        self.provided = Some(provided.into());
        self
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }

    /// Apply the enrichment rule: fill unset fields, prepend `path`.
    pub fn enrich(
        mut self,
        expected: Option<&str>,
        provided: Option<&str>,
        path: &[PathSegment],
        validator: Option<&str>,
    ) -> Self {
        if self.expected.is_none() {
            self.expected = expected.map(str::to_string);
        }
        if self.provided.is_none() {
            self.provided = provided.map(str::to_string);
        }
        if self.validator.is_none() {
            self.validator = validator.map(str::to_string);
        }
        if !path.is_empty() {
            let mut full = path.to_vec();
            full.append(&mut self.path);
            self.path = full;
        }
        self
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if self.path.is_empty() {
            f.write_str(" @ (root)")?;
        } else {
            write!(f, " @ {}", PathDisplay(&self.path))?;
        }
        match (&self.expected, &self.provided) {
            (Some(e), Some(p)) => write!(f, ": expected {e}, got {p}"),
            (Some(e), None) => write!(f, ": expected {e}"),
            (None, Some(p)) => write!(f, ": got {p}"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for Invalid {}

impl IntoIterator for Invalid {
    type Item = Invalid;
    type IntoIter = std::iter::Once<Invalid>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self)
    }
}

// ─── MultipleInvalid ─────────────────────────────────────────────────

/// A flat, ordered, non-empty collection of [`Invalid`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MultipleInvalid {
    /// Never empty.
    errors: Vec<Invalid>,
}

impl MultipleInvalid {
    /// Splice any sequence of error aggregates into one flat list.
    ///
    /// Returns `None` when the sequence holds no errors at all.
    pub fn flatten<I, E>(aggregates: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = Invalid>,
    {
        let errors: Vec<Invalid> = aggregates.into_iter().flatten().collect();
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// All constituent errors, in discovery order.
    pub fn errors(&self) -> &[Invalid] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first error, which backs the single-error accessors.
    pub fn first(&self) -> &Invalid {
        &self.errors[0]
    }

    pub fn message(&self) -> &str {
        &self.first().message
    }

    pub fn expected(&self) -> Option<&str> {
        self.first().expected.as_deref()
    }

    pub fn provided(&self) -> Option<&str> {
        self.first().provided.as_deref()
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.first().path
    }

    pub fn validator(&self) -> Option<&str> {
        self.first().validator.as_deref()
    }

    /// Apply the enrichment rule to every contained error.
    pub fn enrich(
        self,
        expected: Option<&str>,
        provided: Option<&str>,
        path: &[PathSegment],
        validator: Option<&str>,
    ) -> Self {
        Self {
            errors: self
                .errors
                .into_iter()
                .map(|e| e.enrich(expected, provided, path, validator))
                .collect(),
        }
    }

    /// Apply `f` to every contained error.
    pub fn map(self, f: impl FnMut(Invalid) -> Invalid) -> Self {
        Self {
            errors: self.errors.into_iter().map(f).collect(),
        }
    }
}

impl fmt::Display for MultipleInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultipleInvalid {}

impl IntoIterator for MultipleInvalid {
    type Item = Invalid;
    type IntoIter = std::vec::IntoIter<Invalid>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultipleInvalid {
    type Item = &'a Invalid;
    type IntoIter = std::slice::Iter<'a, Invalid>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// ─── ValidationError ─────────────────────────────────────────────────

/// Failure of `Schema::validate`.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Exactly one problem was found.
    #[error("{0}")]
    Invalid(Invalid),

    /// More than one independent problem was found.
    #[error("{n} validation errors:\n{0}", n = .0.len())]
    Multiple(MultipleInvalid),

    /// A user callable failed in a way that says nothing about the input.
    #[error("validator {validator} failed: {source}")]
    Fatal {
        /// Display of the callable node.
        validator: String,
        /// The error the callable raised.
        #[source]
        source: BoxError,
    },
}

impl ValidationError {
    /// One error becomes `Invalid`, several become `Multiple`, none is `None`.
    pub fn from_invalids(mut errors: Vec<Invalid>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop().map(Self::Invalid),
            _ => MultipleInvalid::flatten([errors]).map(Self::Multiple),
        }
    }

    /// The validation errors, uniformly. Empty for `Fatal`.
    pub fn errors(&self) -> &[Invalid] {
        match self {
            Self::Invalid(e) => std::slice::from_ref(e),
            Self::Multiple(m) => m.errors(),
            Self::Fatal { .. } => &[],
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// The first error, if this is a validation failure.
    pub fn first(&self) -> Option<&Invalid> {
        self.errors().first()
    }

    /// Apply the enrichment rule. `Fatal` passes through unchanged.
    pub fn enrich(
        self,
        expected: Option<&str>,
        provided: Option<&str>,
        path: &[PathSegment],
        validator: Option<&str>,
    ) -> Self {
        match self {
            Self::Invalid(e) => Self::Invalid(e.enrich(expected, provided, path, validator)),
            Self::Multiple(m) => Self::Multiple(m.enrich(expected, provided, path, validator)),
            fatal @ Self::Fatal { .. } => fatal,
        }
    }

    /// Apply `f` to every validation error. `Fatal` passes through unchanged.
    pub fn map_errors(self, mut f: impl FnMut(Invalid) -> Invalid) -> Self {
        match self {
            Self::Invalid(e) => Self::Invalid(f(e)),
            Self::Multiple(m) => Self::Multiple(m.map(f)),
            fatal @ Self::Fatal { .. } => fatal,
        }
    }

    /// Structured report suitable for logging or an API response.
    pub fn to_report(&self) -> serde_json::Value {
        match self {
            Self::Fatal { validator, source } => serde_json::json!({
                "fatal": { "validator": validator, "error": source.to_string() }
            }),
            other => serde_json::json!({ "errors": other.errors() }),
        }
    }
}

impl From<Invalid> for ValidationError {
    fn from(e: Invalid) -> Self {
        Self::Invalid(e)
    }
}

impl From<MultipleInvalid> for ValidationError {
    fn from(m: MultipleInvalid) -> Self {
        Self::Multiple(m)
    }
}

// ─── Callable errors ─────────────────────────────────────────────────

/// Error returned by a user callable.
///
/// `Assertion`, `Type` and `Value` are the whitelisted "expected failure
/// shapes": the engine wraps them into an `Invalid` labelled with the
/// callable. `Invalid` and `Multiple` are enriched and propagated.
/// `Fatal` means the callable itself is broken and aborts validation.
#[derive(Error, Debug)]
pub enum CallableError {
    #[error(transparent)]
    Invalid(#[from] Invalid),

    #[error(transparent)]
    Multiple(#[from] MultipleInvalid),

    /// A checked condition did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// The value has a type the callable cannot handle.
    #[error("type error: {0}")]
    Type(String),

    /// The value has the right type but could not be converted.
    #[error("value error: {0}")]
    Value(String),

    /// Anything else. Not a validation failure.
    #[error(transparent)]
    Fatal(BoxError),
}

impl CallableError {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    pub fn fatal(error: impl Into<BoxError>) -> Self {
        Self::Fatal(error.into())
    }
}

impl From<ValidationError> for CallableError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Invalid(e) => Self::Invalid(e),
            ValidationError::Multiple(m) => Self::Multiple(m),
            ValidationError::Fatal { source, .. } => Self::Fatal(source),
        }
    }
}

impl From<std::num::ParseIntError> for CallableError {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::Value(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for CallableError {
    fn from(e: std::num::ParseFloatError) -> Self {
        Self::Value(e.to_string())
    }
}

impl From<std::str::ParseBoolError> for CallableError {
    fn from(e: std::str::ParseBoolError) -> Self {
        Self::Value(e.to_string())
    }
}

impl From<std::num::TryFromIntError> for CallableError {
    fn from(e: std::num::TryFromIntError) -> Self {
        Self::Value(e.to_string())
    }
}
