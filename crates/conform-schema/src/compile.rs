//! # Schema Compiler
//!
//! Turns a [`Def`] into a [`Node`] tree exactly once. All of the shape
//! probing ("is this a type, a callable, a mapping?") happens here; the
//! engine only ever dispatches on [`NodeKind`].
//!
//! ## Mapping compilation
//!
//! 1. Every key definition is compiled; a key that is not a marker is
//!    wrapped with `default_keys`.
//! 2. A bare `Reject`/`Allow`/`Remove` value turns into the pair's
//!    disposition instead of a value node.
//! 3. The catch-all `(Extra, extra_keys)` pair is appended unless the
//!    mapping declares its own `Extra` key.
//! 4. Pairs are stably sorted by key priority.

use std::collections::BTreeSet;

use conform_core::{Value, ValueKind};

use crate::config::{ExtraKeys, Messages};
use crate::def::{ContainerKind, Def};
use crate::error::SchemaError;
use crate::marker::{Disposition, MarkerKind};
use crate::node::{Node, NodeKind, Pair};

/// Keys that can be compared for duplicate detection.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum KeyIdentity {
    Literal(Value),
    Type(ValueKind),
}

impl KeyIdentity {
    /// Strip markers and return the comparable part of a key definition.
    fn of(def: &Def) -> Option<Self> {
        match def {
            Def::Literal(v) => Some(Self::Literal(v.clone())),
            Def::Type(k) => Some(Self::Type(*k)),
            Def::Marker(_, Some(inner)) => Self::of(inner),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Literal(v) => v.repr(),
            Self::Type(k) => k.label().to_string(),
        }
    }
}

pub(crate) struct Compiler<'a> {
    default_keys: MarkerKind,
    extra_keys: &'a ExtraKeys,
    messages: &'a Messages,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(
        default_keys: MarkerKind,
        extra_keys: &'a ExtraKeys,
        messages: &'a Messages,
    ) -> Self {
        Self {
            default_keys,
            extra_keys,
            messages,
        }
    }

    pub(crate) fn compile(&self, def: &Def) -> Result<Node, SchemaError> {
        match def {
            Def::Literal(v) => Ok(Node::literal(v.clone())),
            Def::Type(kind) => Ok(Node::new(
                NodeKind::TypeCheck(*kind),
                self.messages.type_name(*kind),
            )),
            Def::Callable(c) => Ok(Node::new(NodeKind::Callable(c.clone()), c.label())),
            Def::Iterable(container, defs) => self.compile_iterable(*container, defs),
            Def::Mapping(pairs) => self.compile_mapping(pairs),
            Def::Schema(s) => Ok(Node::new(
                NodeKind::NestedSchema(s.clone()),
                s.root().expected(),
            )),
            Def::Marker(MarkerKind::Extra, None) => {
                Ok(Node::marker(MarkerKind::Extra, Node::identity()))
            }
            Def::Marker(kind, None) => Err(SchemaError::BareMarker {
                kind: *kind,
                context: "outside a mapping value",
            }),
            Def::Marker(kind, Some(inner)) => self.compile_marker(*kind, inner),
        }
    }

    fn compile_marker(&self, kind: MarkerKind, inner: &Def) -> Result<Node, SchemaError> {
        let inner = self.compile(inner)?;
        match inner.marker_kind() {
            // Required(Required(k)) is just Required(k).
            Some(inner_kind) if inner_kind == kind => Ok(inner),
            Some(inner_kind) => Err(SchemaError::ConflictingMarkers {
                outer: kind,
                inner: inner_kind,
            }),
            None => Ok(Node::marker(kind, inner)),
        }
    }

    fn compile_iterable(
        &self,
        container: ContainerKind,
        defs: &[Def],
    ) -> Result<Node, SchemaError> {
        let mut alternatives = defs
            .iter()
            .map(|d| self.compile(d))
            .collect::<Result<Vec<_>, _>>()?;

        // Labels keep declaration order; matching order is by priority.
        let labels: Vec<&str> = alternatives.iter().map(Node::expected).collect();
        let expected = format!(
            "{}[{}]",
            self.messages.type_name(container.value_kind()),
            labels.join("|")
        );
        alternatives.sort_by_key(Node::priority);

        Ok(Node::new(
            NodeKind::IterableOf {
                container,
                alternatives,
            },
            expected,
        ))
    }

    fn compile_mapping(&self, defs: &[(Def, Def)]) -> Result<Node, SchemaError> {
        let mut pairs = Vec::with_capacity(defs.len() + 1);
        let mut seen = BTreeSet::new();
        let mut has_extra = false;

        for (key_def, value_def) in defs {
            if let Some(identity) = KeyIdentity::of(key_def) {
                if seen.contains(&identity) {
                    return Err(SchemaError::DuplicateKey {
                        key: identity.describe(),
                    });
                }
                seen.insert(identity);
            }

            let key = self.compile_key(key_def)?;
            let key_marker = key.marker_kind().unwrap_or(self.default_keys);
            if key_marker == MarkerKind::Extra {
                if has_extra {
                    return Err(SchemaError::MultipleExtra);
                }
                has_extra = true;
            }

            let (value, action) = self.compile_value(value_def)?;
            pairs.push(Pair {
                key,
                value,
                disposition: Disposition::resolve(key_marker, action),
            });
        }

        if !has_extra {
            pairs.push(self.catch_all()?);
        }
        pairs.sort_by_key(|p| p.key.priority());

        tracing::trace!(pairs = pairs.len(), "compiled mapping");
        Ok(Node::new(
            NodeKind::MappingOf { pairs },
            self.messages.type_name(ValueKind::Map),
        ))
    }

    fn compile_key(&self, def: &Def) -> Result<Node, SchemaError> {
        if let Def::Marker(kind, None) = def {
            if *kind != MarkerKind::Extra {
                return Err(SchemaError::BareMarker {
                    kind: *kind,
                    context: "as a mapping key",
                });
            }
        }
        let key = self.compile(def)?;
        if key.marker_kind().is_some() {
            Ok(key)
        } else {
            Ok(Node::marker(self.default_keys, key))
        }
    }

    /// A value node plus the bare action marker it stood for, if any.
    fn compile_value(&self, def: &Def) -> Result<(Node, Option<MarkerKind>), SchemaError> {
        match def {
            Def::Marker(kind, None) if kind.is_action() => Ok((Node::identity(), Some(*kind))),
            Def::Marker(kind, None) => Err(SchemaError::BareMarker {
                kind: *kind,
                context: "as a mapping value",
            }),
            other => Ok((self.compile(other)?, None)),
        }
    }

    fn catch_all(&self) -> Result<Pair, SchemaError> {
        let key = Node::marker(MarkerKind::Extra, Node::identity());
        let (value, action) = self.compile_value(&self.extra_keys.to_def())?;
        Ok(Pair {
            key,
            value,
            disposition: Disposition::resolve(MarkerKind::Extra, action),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{extra, optional, reject, remove, required};

    fn compile_default(def: &Def) -> Result<Node, SchemaError> {
        let extra_keys = ExtraKeys::Reject;
        let messages = Messages::default();
        Compiler::new(MarkerKind::Required, &extra_keys, &messages).compile(def)
    }

    fn pairs(node: &Node) -> &[Pair] {
        match node.kind() {
            NodeKind::MappingOf { pairs } => pairs,
            other => panic!("expected a mapping node, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_and_type_labels() {
        assert_eq!(compile_default(&Def::from(1)).unwrap().expected(), "1");
        assert_eq!(
            compile_default(&ValueKind::Int.into()).unwrap().expected(),
            "Integer number"
        );
        assert_eq!(
            compile_default(&ValueKind::Str.into()).unwrap().expected(),
            "String"
        );
    }

    #[test]
    fn test_iterable_label_keeps_declaration_order() {
        let node = compile_default(&Def::list([Def::from(1), Def::from(2), ValueKind::Str.into()])).unwrap();
        assert_eq!(node.expected(), "List[1|2|String]");
    }

    #[test]
    fn test_iterable_alternatives_sorted_by_priority() {
        let def = Def::list([
            Def::callable("intify", |v| Ok(v.clone())),
            ValueKind::Str.into(),
            Def::from("x"),
        ]);
        let node = compile_default(&def).unwrap();
        assert_eq!(node.expected(), "List[intify()|String|x]");
        match node.kind() {
            NodeKind::IterableOf { alternatives, .. } => {
                let labels: Vec<&str> = alternatives.iter().map(Node::expected).collect();
                assert_eq!(labels, vec!["x", "String", "intify()"]);
            }
            other => panic!("expected an iterable node, got {other:?}"),
        }
    }

    #[test]
    fn test_mapping_wraps_keys_and_appends_catch_all() {
        let node = compile_default(&Def::mapping([("a".into(), ValueKind::Int.into())])).unwrap();
        let pairs = pairs(&node);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].key_marker(), Some(MarkerKind::Required));
        assert_eq!(pairs[1].key_marker(), Some(MarkerKind::Extra));
        assert_eq!(pairs[1].disposition, Disposition::RejectExtra);
    }

    #[test]
    fn test_explicit_extra_replaces_catch_all() {
        let node = compile_default(&Def::mapping([
            ("a".into(), 1.into()),
            (extra(), ValueKind::Int.into()),
        ]))
        .unwrap();
        let pairs = pairs(&node);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].key_marker(), Some(MarkerKind::Extra));
        assert_eq!(pairs[1].disposition, Disposition::Validate);
    }

    #[test]
    fn test_pairs_sorted_by_priority_with_declaration_tie_break() {
        let node = compile_default(&Def::mapping([
            (Def::callable("first", |v| Ok(v.clone())), 1.into()),
            (ValueKind::Str.into(), 2.into()),
            (Def::callable("second", |v| Ok(v.clone())), 3.into()),
            (remove("gone"), 4.into()),
            ("name".into(), 5.into()),
        ]))
        .unwrap();
        let order: Vec<String> = pairs(&node).iter().map(|p| p.key.to_string()).collect();
        assert_eq!(
            order,
            vec![
                "Remove('gone')",
                "Required('name')",
                "Required(String)",
                "Required(first())",
                "Required(second())",
                "Extra",
            ]
        );
    }

    #[test]
    fn test_value_actions_become_dispositions() {
        let node = compile_default(&Def::mapping([
            (ValueKind::Str.into(), Def::bare(MarkerKind::Reject)),
            (extra(), Def::bare(MarkerKind::Reject)),
        ]))
        .unwrap();
        let dispositions: Vec<Disposition> = pairs(&node).iter().map(|p| p.disposition).collect();
        assert_eq!(dispositions, vec![Disposition::Reject, Disposition::RejectExtra]);
    }

    #[test]
    fn test_conflicting_markers_rejected() {
        let err = compile_default(&Def::mapping([(required(optional("a")), 1.into())])).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ConflictingMarkers {
                outer: MarkerKind::Required,
                inner: MarkerKind::Optional
            }
        ));
    }

    #[test]
    fn test_same_marker_collapses() {
        let node = compile_default(&required(required("a"))).unwrap();
        assert_eq!(node.to_string(), "Required('a')");
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = compile_default(&Def::mapping([
            (required("a"), 1.into()),
            (optional("a"), 2.into()),
        ]))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey { .. }));
    }

    #[test]
    fn test_multiple_extra_rejected() {
        let err = compile_default(&Def::mapping([
            (extra(), 1.into()),
            (extra(), 2.into()),
        ]))
        .unwrap_err();
        assert!(matches!(err, SchemaError::MultipleExtra));
    }

    #[test]
    fn test_bare_markers_outside_value_position_rejected() {
        assert!(matches!(
            compile_default(&Def::bare(MarkerKind::Required)),
            Err(SchemaError::BareMarker { .. })
        ));
        assert!(matches!(
            compile_default(&Def::mapping([(Def::bare(MarkerKind::Reject), 1.into())])),
            Err(SchemaError::BareMarker { .. })
        ));
        assert!(matches!(
            compile_default(&Def::mapping([("a".into(), Def::bare(MarkerKind::Optional))])),
            Err(SchemaError::BareMarker { .. })
        ));
        assert!(compile_default(&Def::mapping([("a".into(), reject("b"))])).is_ok());
    }
}
