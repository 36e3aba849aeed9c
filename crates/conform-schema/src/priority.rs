//! Priority classification of compiled nodes.
//!
//! Mapping pairs and iterable alternatives are tried in ascending priority.
//! Ties keep declaration order (every sort over priorities is stable), so a
//! mapping can declare a specific literal key next to a general type key,
//! and two callables on the same tier run in the order they were written.

use crate::marker::MarkerKind;
use crate::node::NodeKind;

/// Lower is tried first.
pub type Priority = u8;

pub const REMOVE: Priority = 0;
pub const LITERAL: Priority = 10;
pub const TYPE_CHECK: Priority = 20;
pub const GENERAL: Priority = 30;
pub const REJECT: Priority = 40;
pub const ALLOW: Priority = 50;
/// The catch-all runs after every other key, `Allow` included.
pub const EXTRA: Priority = 60;

/// The priority of a node kind. `Required`/`Optional` inherit from what they wrap.
pub fn priority(kind: &NodeKind) -> Priority {
    match kind {
        NodeKind::Literal(_) => LITERAL,
        NodeKind::TypeCheck(_) => TYPE_CHECK,
        NodeKind::Callable(_)
        | NodeKind::IterableOf { .. }
        | NodeKind::MappingOf { .. }
        | NodeKind::NestedSchema(_) => GENERAL,
        NodeKind::Marker { kind, inner } => match kind {
            MarkerKind::Remove => REMOVE,
            MarkerKind::Reject => REJECT,
            MarkerKind::Allow => ALLOW,
            MarkerKind::Extra => EXTRA,
            MarkerKind::Required | MarkerKind::Optional => inner.priority(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use conform_core::{Value, ValueKind};

    fn literal() -> Node {
        Node::literal(Value::from("a"))
    }

    fn marker(kind: MarkerKind, inner: Node) -> NodeKind {
        NodeKind::Marker {
            kind,
            inner: Box::new(inner),
        }
    }

    #[test]
    fn test_tier_order() {
        let remove = priority(&marker(MarkerKind::Remove, Node::type_check(ValueKind::Str)));
        let lit = priority(&NodeKind::Literal(Value::Int(1)));
        let ty = priority(&NodeKind::TypeCheck(ValueKind::Int));
        let rej = priority(&marker(MarkerKind::Reject, literal()));
        let all = priority(&marker(MarkerKind::Allow, literal()));
        let ext = priority(&marker(MarkerKind::Extra, literal()));
        assert!(remove < lit && lit < ty && ty < GENERAL && GENERAL < rej && rej < all);
        assert!(all < ext);
    }

    #[test]
    fn test_remove_wins_regardless_of_inner() {
        assert_eq!(priority(&marker(MarkerKind::Remove, literal())), REMOVE);
        assert_eq!(
            priority(&marker(MarkerKind::Remove, Node::type_check(ValueKind::Int))),
            REMOVE
        );
    }

    #[test]
    fn test_required_inherits_inner_priority() {
        assert_eq!(priority(&marker(MarkerKind::Required, literal())), LITERAL);
        assert_eq!(
            priority(&marker(MarkerKind::Optional, Node::type_check(ValueKind::Int))),
            TYPE_CHECK
        );
    }
}
