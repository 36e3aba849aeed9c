//! # Schema Definitions
//!
//! [`Def`] is what schema authors write: a plain tree of literals, types,
//! callables, containers, mappings, nested schemas, and markers. It is
//! handed to the compiler once and never looked at again; validation only
//! ever walks the compiled [`Node`](crate::node::Node) tree.
//!
//! ```
//! use conform_schema::{optional, Def, Schema, Value, ValueKind};
//!
//! let schema = Schema::new(Def::mapping([
//!     ("name".into(), ValueKind::Str.into()),
//!     (optional("tags"), Def::list([ValueKind::Str])),
//! ]))
//! .unwrap();
//!
//! let ok = schema.validate(&Value::map([("name", "Alex")])).unwrap();
//! assert_eq!(ok, Value::map([("name", "Alex")]));
//! ```

use std::fmt;
use std::sync::Arc;

use conform_core::{Value, ValueKind};

use crate::error::CallableError;
use crate::marker::MarkerKind;
use crate::schema::Schema;

// ─── Outcome ─────────────────────────────────────────────────────────

/// Result of validating one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The sanitized value.
    Kept(Value),
    /// Omit this value from the enclosing container.
    Dropped,
}

// ─── Containers ──────────────────────────────────────────────────────

/// The container kinds an iterable schema can enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Tuple,
    Set,
    FrozenSet,
}

impl ContainerKind {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::List => ValueKind::List,
            Self::Tuple => ValueKind::Tuple,
            Self::Set => ValueKind::Set,
            Self::FrozenSet => ValueKind::FrozenSet,
        }
    }

    /// Elements of `value` if it is exactly this container kind.
    pub(crate) fn elements<'v>(&self, value: &'v Value) -> Option<Vec<&'v Value>> {
        match (self, value) {
            (Self::List, Value::List(items)) | (Self::Tuple, Value::Tuple(items)) => {
                Some(items.iter().collect())
            }
            (Self::Set, Value::Set(items)) | (Self::FrozenSet, Value::FrozenSet(items)) => {
                Some(items.iter().collect())
            }
            _ => None,
        }
    }

    /// Rebuild a container of this kind from sanitized elements.
    pub(crate) fn build(&self, items: Vec<Value>) -> Value {
        match self {
            Self::List => Value::List(items),
            Self::Tuple => Value::Tuple(items),
            Self::Set => Value::Set(items.into_iter().collect()),
            Self::FrozenSet => Value::FrozenSet(items.into_iter().collect()),
        }
    }
}

// ─── Callables ───────────────────────────────────────────────────────

type CallableFn = dyn Fn(&Value) -> Result<Outcome, CallableError> + Send + Sync;

/// A user-supplied validation function with a human label.
///
/// The function's return value becomes the sanitized value, so callables
/// can coerce as well as check.
#[derive(Clone)]
pub struct Callable {
    label: String,
    func: Arc<CallableFn>,
}

impl Callable {
    /// A callable named `name`; its label is `name()`.
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        Self::with_outcome(name, move |v| f(v).map(Outcome::Kept))
    }

    /// Like [`Callable::new`], but the function may also drop the value.
    pub fn with_outcome<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Outcome, CallableError> + Send + Sync + 'static,
    {
        Self {
            label: format!("{name}()"),
            func: Arc::new(f),
        }
    }

    /// A callable labelled after the function's own name, e.g. `intify()`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        Self::new(short_type_name::<F>(), f)
    }

    /// Replace the label verbatim.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, value: &Value) -> Result<Outcome, CallableError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("label", &self.label).finish()
    }
}

/// Last path segment of a type name: `my_crate::checks::intify` → `intify`.
/// Closures take the name of the function they are defined in.
pub(crate) fn short_type_name<F>() -> &'static str {
    let full = std::any::type_name::<F>();
    full.rsplit("::")
        .find(|segment| !segment.starts_with("{{"))
        .unwrap_or(full)
}

// ─── Definitions ─────────────────────────────────────────────────────

/// A schema definition.
#[derive(Debug, Clone)]
pub enum Def {
    /// Matches one exact value.
    Literal(Value),
    /// Matches any value of a kind.
    Type(ValueKind),
    /// Delegates to a function.
    Callable(Callable),
    /// A container of the given kind whose every element matches one alternative.
    Iterable(ContainerKind, Vec<Def>),
    /// A mapping of key definitions to value definitions.
    Mapping(Vec<(Def, Def)>),
    /// An already compiled schema, used verbatim.
    Schema(Schema),
    /// A marker; `None` is a bare marker.
    Marker(MarkerKind, Option<Box<Def>>),
}

impl Def {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// The `None` literal.
    pub fn none() -> Self {
        Self::Literal(Value::None)
    }

    pub fn list<I, T>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Def>,
    {
        Self::Iterable(ContainerKind::List, collect_defs(alternatives))
    }

    pub fn tuple<I, T>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Def>,
    {
        Self::Iterable(ContainerKind::Tuple, collect_defs(alternatives))
    }

    pub fn set<I, T>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Def>,
    {
        Self::Iterable(ContainerKind::Set, collect_defs(alternatives))
    }

    pub fn frozenset<I, T>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Def>,
    {
        Self::Iterable(ContainerKind::FrozenSet, collect_defs(alternatives))
    }

    /// A mapping schema. Pair order is the declaration order used for tie-breaks.
    pub fn mapping(pairs: impl IntoIterator<Item = (Def, Def)>) -> Self {
        Self::Mapping(pairs.into_iter().collect())
    }

    /// `kind(inner)`.
    pub fn marker(kind: MarkerKind, inner: impl Into<Def>) -> Self {
        Self::Marker(kind, Some(Box::new(inner.into())))
    }

    /// A marker with no inner schema: `Extra`, or `Reject`/`Allow`/`Remove` as a value.
    pub fn bare(kind: MarkerKind) -> Self {
        Self::Marker(kind, None)
    }

    pub fn callable<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        Self::Callable(Callable::new(name, f))
    }
}

fn collect_defs<I, T>(items: I) -> Vec<Def>
where
    I: IntoIterator<Item = T>,
    T: Into<Def>,
{
    items.into_iter().map(Into::into).collect()
}

impl From<Value> for Def {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

impl From<&str> for Def {
    fn from(s: &str) -> Self {
        Self::Literal(Value::from(s))
    }
}

impl From<String> for Def {
    fn from(s: String) -> Self {
        Self::Literal(Value::Str(s))
    }
}

impl From<i64> for Def {
    fn from(n: i64) -> Self {
        Self::Literal(Value::Int(n))
    }
}

impl From<i32> for Def {
    fn from(n: i32) -> Self {
        Self::Literal(Value::from(n))
    }
}

impl From<f64> for Def {
    fn from(n: f64) -> Self {
        Self::Literal(Value::Float(n))
    }
}

impl From<bool> for Def {
    fn from(b: bool) -> Self {
        Self::Literal(Value::Bool(b))
    }
}

impl From<ValueKind> for Def {
    fn from(kind: ValueKind) -> Self {
        Self::Type(kind)
    }
}

impl From<Callable> for Def {
    fn from(c: Callable) -> Self {
        Self::Callable(c)
    }
}

impl From<Schema> for Def {
    fn from(s: Schema) -> Self {
        Self::Schema(s)
    }
}
