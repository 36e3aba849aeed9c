//! # Input Paths
//!
//! A path locates a value inside the original input: a sequence of mapping
//! keys and iterable positions from the root down to the failing value.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::value::Value;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSegment {
    /// Position inside a list, tuple, or set (iteration order).
    Index(usize),
    /// Key inside a mapping.
    Key(Value),
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self {
        Self::Key(Value::from(k))
    }
}

impl From<Value> for PathSegment {
    fn from(k: Value) -> Self {
        Self::Key(k)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => write!(f, "{k}"),
        }
    }
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Index(i) => serializer.serialize_u64(*i as u64),
            Self::Key(Value::Int(n)) => serializer.serialize_i64(*n),
            Self::Key(Value::Str(s)) => serializer.serialize_str(s),
            Self::Key(other) => serializer.serialize_str(&other.to_string()),
        }
    }
}

/// Displays a path JSON-Pointer style: `/a/b/0`. The root path is empty.
pub struct PathDisplay<'a>(pub &'a [PathSegment]);

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
