//! # Validator Nodes — the Compiled Tree
//!
//! A closed tagged variant built once by the compiler. Each node carries its
//! priority and the `expected` label used in error messages. Nodes are
//! immutable; the tree is owned top-down with no sharing cycles (nested
//! schemas are shared through `Arc`, but a schema cannot contain itself).

use std::fmt;

use conform_core::{Value, ValueKind};

use crate::def::{Callable, ContainerKind};
use crate::marker::{Disposition, MarkerKind};
use crate::priority::{self, Priority};
use crate::schema::Schema;

/// One compiled unit of a schema.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    priority: Priority,
    expected: String,
}

/// The node variants.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Literal(Value),
    TypeCheck(ValueKind),
    Callable(Callable),
    IterableOf {
        container: ContainerKind,
        /// Sorted by priority, declaration order within a tier.
        alternatives: Vec<Node>,
    },
    MappingOf {
        /// Sorted by key priority, declaration order within a tier.
        pairs: Vec<Pair>,
    },
    NestedSchema(Schema),
    Marker {
        kind: MarkerKind,
        inner: Box<Node>,
    },
}

/// One `key: value` rule of a mapping.
#[derive(Debug, Clone)]
pub struct Pair {
    /// Always a `Marker` node; unmarked keys are wrapped with `default_keys`.
    pub key: Node,
    /// Validates the input value when the disposition is `Validate`.
    pub value: Node,
    pub disposition: Disposition,
}

impl Pair {
    /// Marker kind of the key.
    pub fn key_marker(&self) -> Option<MarkerKind> {
        match &self.key.kind {
            NodeKind::Marker { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The node an input key is tested against: the key marker's inner node.
    pub fn matcher(&self) -> &Node {
        match &self.key.kind {
            NodeKind::Marker { inner, .. } => inner,
            _ => &self.key,
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind, expected: impl Into<String>) -> Self {
        let priority = priority::priority(&kind);
        Self {
            kind,
            priority,
            expected: expected.into(),
        }
    }

    pub fn literal(value: Value) -> Self {
        let expected = value.to_string();
        Self::new(NodeKind::Literal(value), expected)
    }

    /// A type check with the default label.
    pub fn type_check(kind: ValueKind) -> Self {
        Self::new(NodeKind::TypeCheck(kind), kind.label())
    }

    /// Matches any value and returns it unchanged.
    pub fn identity() -> Self {
        let c = Callable::new("identity", |v| Ok(v.clone())).named("*");
        Self::new(NodeKind::Callable(c), "*")
    }

    /// Wrap `inner` in a marker. The label is inherited from `inner`.
    pub fn marker(kind: MarkerKind, inner: Node) -> Self {
        let expected = inner.expected.clone();
        Self::new(
            NodeKind::Marker {
                kind,
                inner: Box::new(inner),
            },
            expected,
        )
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn marker_kind(&self) -> Option<MarkerKind> {
        match &self.kind {
            NodeKind::Marker { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// How a node is named in the `validator` field of an error.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Literal(v) => write!(f, "{}", v.repr()),
            NodeKind::NestedSchema(_) => write!(f, "Schema({})", self.expected),
            NodeKind::Marker {
                kind: MarkerKind::Extra,
                ..
            } => f.write_str("Extra"),
            NodeKind::Marker { kind, inner } => write!(f, "{kind}({inner})"),
            NodeKind::TypeCheck(_)
            | NodeKind::Callable(_)
            | NodeKind::IterableOf { .. }
            | NodeKind::MappingOf { .. } => f.write_str(&self.expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_inherits_label() {
        let n = Node::marker(MarkerKind::Required, Node::literal(Value::from("sex")));
        assert_eq!(n.expected(), "sex");
        assert_eq!(n.to_string(), "Required('sex')");
    }

    #[test]
    fn test_extra_displays_bare() {
        let n = Node::marker(MarkerKind::Extra, Node::identity());
        assert_eq!(n.to_string(), "Extra");
        assert_eq!(n.priority(), priority::EXTRA);
    }

    #[test]
    fn test_pair_matcher_is_marker_inner() {
        let pair = Pair {
            key: Node::marker(MarkerKind::Optional, Node::type_check(ValueKind::Int)),
            value: Node::identity(),
            disposition: Disposition::Validate,
        };
        assert_eq!(pair.key_marker(), Some(MarkerKind::Optional));
        assert!(matches!(pair.matcher().kind(), NodeKind::TypeCheck(ValueKind::Int)));
    }
}
