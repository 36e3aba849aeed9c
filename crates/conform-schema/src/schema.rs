//! # Compiled Schemas
//!
//! A [`Schema`] owns the compiled node tree together with the options it
//! was compiled with. It is immutable after construction and cheap to
//! clone (the tree sits behind an `Arc`), so one schema can be shared by
//! any number of threads and nested inside other schemas without copying.

use std::fmt;
use std::sync::Arc;

use conform_core::Value;

use crate::compile::Compiler;
use crate::config::{ExtraKeys, Messages, SchemaOptions};
use crate::def::{Def, Outcome};
use crate::error::{Invalid, SchemaError, ValidationError};
use crate::marker::MarkerKind;
use crate::node::{Node, NodeKind};
use crate::validate::Engine;

struct Compiled {
    root: Node,
    default_keys: MarkerKind,
    extra_keys: ExtraKeys,
    messages: Messages,
}

/// A compiled, reusable validator.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<Compiled>,
}

impl Schema {
    /// Compile with the default options: keys `Required`, extra keys rejected.
    pub fn new(def: impl Into<Def>) -> Result<Self, SchemaError> {
        Self::with_options(def, SchemaOptions::default())
    }

    pub fn with_options(def: impl Into<Def>, options: SchemaOptions) -> Result<Self, SchemaError> {
        options.check()?;
        let def = def.into();
        let SchemaOptions {
            default_keys,
            extra_keys,
            messages,
        } = options;

        let root = Compiler::new(default_keys, &extra_keys, &messages).compile(&def)?;
        let pairs = match root.kind() {
            NodeKind::MappingOf { pairs } => pairs.len(),
            _ => 0,
        };
        tracing::debug!(expected = root.expected(), pairs, "compiled schema");

        Ok(Self {
            inner: Arc::new(Compiled {
                root,
                default_keys,
                extra_keys,
                messages,
            }),
        })
    }

    /// Validate `value`, returning the sanitized value.
    ///
    /// A schema that drops its whole input (a top-level `Remove`) fails,
    /// since there is nothing to return.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let err = match self.validate_outcome(value) {
            Ok(Outcome::Kept(v)) => return Ok(v),
            Ok(Outcome::Dropped) => Invalid::new(&self.inner.messages.value_removed)
                .with_validator(self.inner.root.to_string())
                .into(),
            Err(err) => err,
        };
        if !err.is_fatal() {
            tracing::debug!(schema = %self, errors = err.errors().len(), "validation failed");
        }
        Err(err)
    }

    /// Validate without resolving a dropped outcome.
    pub(crate) fn validate_outcome(&self, value: &Value) -> Result<Outcome, ValidationError> {
        Engine::new(&self.inner.messages).validate(&self.inner.root, value)
    }

    pub fn root(&self) -> &Node {
        &self.inner.root
    }

    pub fn messages(&self) -> &Messages {
        &self.inner.messages
    }

    pub fn default_keys(&self) -> MarkerKind {
        self.inner.default_keys
    }

    pub fn extra_keys(&self) -> &ExtraKeys {
        &self.inner.extra_keys
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("root", &self.inner.root.to_string())
            .field("default_keys", &self.inner.default_keys)
            .field("extra_keys", &self.inner.extra_keys)
            .finish()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.root.expected())
    }
}

/// Compile `def` with explicit defaults.
///
/// ```
/// use conform_schema::{compile, Def, ExtraKeys, MarkerKind, Value, ValueKind};
///
/// let schema = compile(
///     Def::mapping([("name".into(), ValueKind::Str.into())]),
///     MarkerKind::Required,
///     ExtraKeys::Allow,
/// )
/// .unwrap();
/// let input = Value::map([("name", "Alex"), ("age", "X")]);
/// assert_eq!(schema.validate(&input).unwrap(), input);
/// ```
pub fn compile(
    def: impl Into<Def>,
    default_keys: MarkerKind,
    extra_keys: impl Into<ExtraKeys>,
) -> Result<Schema, SchemaError> {
    let options = SchemaOptions::default()
        .default_keys(default_keys)
        .extra_keys(extra_keys);
    Schema::with_options(def, options)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::error::CallableError;
    use conform_core::{PathSegment, ValueKind};
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::None),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[a-z0-9 ]{0,12}".prop_map(Value::Str),
        ]
    }

    /// Wrap a failing leaf `depth` levels deep in alternating lists and maps.
    /// Every list level also holds one valid sibling of the same shape.
    fn nest(depth: usize) -> (Def, Value, Vec<PathSegment>) {
        let mut def = Def::from(ValueKind::Int);
        let mut valid = Value::from(1);
        let mut value = Value::from("leaf");
        let mut path = Vec::new();
        for level in 0..depth {
            if level % 2 == 0 {
                def = Def::list([def]);
                value = Value::list([valid.clone(), value]);
                valid = Value::list([valid]);
                path.insert(0, PathSegment::Index(1));
            } else {
                def = Def::mapping([("k".into(), def)]);
                value = Value::map([("k", value)]);
                valid = Value::map([("k", valid)]);
                path.insert(0, PathSegment::from("k"));
            }
        }
        (def, value, path)
    }

    fn trimmed(v: &Value) -> Result<Value, CallableError> {
        match v {
            Value::Str(s) => Ok(Value::from(s.trim())),
            _ => Err(CallableError::type_error("expected a string")),
        }
    }

    proptest! {
        /// A literal schema returns exactly its own value.
        #[test]
        fn literal_accepts_itself(v in scalar()) {
            let schema = Schema::new(Def::literal(v.clone())).unwrap();
            prop_assert_eq!(schema.validate(&v).unwrap(), v);
        }

        /// A literal schema rejects every other value.
        #[test]
        fn literal_rejects_others(a in scalar(), b in scalar()) {
            prop_assume!(a != b);
            let schema = Schema::new(Def::literal(a)).unwrap();
            prop_assert!(schema.validate(&b).is_err());
        }

        /// Errors stay flat and carry the full path at any depth.
        #[test]
        fn nested_failures_are_flat(depth in 1usize..8, copies in 2usize..5) {
            let (def, value, path) = nest(depth);
            let schema = Schema::new(Def::list([def])).unwrap();
            let input = Value::List(vec![value; copies]);
            let err = schema.validate(&input).unwrap_err();
            prop_assert_eq!(err.errors().len(), copies);
            for (i, e) in err.errors().iter().enumerate() {
                let mut expected = vec![PathSegment::Index(i)];
                expected.extend(path.iter().cloned());
                prop_assert_eq!(&e.path, &expected);
            }
        }

        /// Validating sanitized output again changes nothing.
        #[test]
        fn validation_is_idempotent(
            entries in prop::collection::btree_map("[a-z]{1,6}", "[ a-z]{0,8}", 0..6),
        ) {
            let schema = Schema::new(Def::mapping([(
                Def::from(crate::def::Callable::from_fn(trimmed)),
                Def::from(crate::def::Callable::from_fn(trimmed)),
            )]))
            .unwrap();
            let input = Value::map(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            match schema.validate(&input) {
                Ok(once) => prop_assert_eq!(schema.validate(&once).unwrap(), once),
                Err(_) => prop_assert!(entries.is_empty()),
            }
        }
    }
}
