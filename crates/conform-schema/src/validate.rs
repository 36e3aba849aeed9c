//! # Validation Engine
//!
//! A recursive walk over the compiled [`Node`] tree. Every call returns its
//! errors to the caller instead of raising past it; container frames
//! prepend their own path segment and collect sibling failures before
//! returning one aggregate. A fatal callable failure stops the walk.

use std::collections::BTreeMap;

use conform_core::{PathSegment, Value};

use crate::config::Messages;
use crate::def::{Callable, ContainerKind, Outcome};
use crate::error::{CallableError, Invalid, ValidationError};
use crate::marker::{Disposition, MarkerKind};
use crate::node::{Node, NodeKind, Pair};

pub(crate) type Step = Result<Outcome, ValidationError>;

/// Move the validation errors of `err` into `errors`; a fatal error is handed back.
fn absorb(errors: &mut Vec<Invalid>, err: ValidationError) -> Result<(), ValidationError> {
    match err {
        ValidationError::Invalid(e) => errors.push(e),
        ValidationError::Multiple(m) => errors.extend(m),
        fatal @ ValidationError::Fatal { .. } => return Err(fatal),
    }
    Ok(())
}

fn finish(errors: Vec<Invalid>, value: Value) -> Step {
    match ValidationError::from_invalids(errors) {
        Some(err) => Err(err),
        None => Ok(Outcome::Kept(value)),
    }
}

pub(crate) struct Engine<'a> {
    messages: &'a Messages,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(messages: &'a Messages) -> Self {
        Self { messages }
    }

    pub(crate) fn validate(&self, node: &Node, value: &Value) -> Step {
        match node.kind() {
            NodeKind::Literal(expected) => self.literal(node, expected, value),
            NodeKind::TypeCheck(kind) => {
                if value.kind() == *kind {
                    Ok(Outcome::Kept(value.clone()))
                } else {
                    Err(self.wrong_kind(&self.messages.wrong_type, node, node.expected(), value))
                }
            }
            NodeKind::Callable(c) => self.callable(node, c, value),
            NodeKind::IterableOf {
                container,
                alternatives,
            } => self.iterable(node, *container, alternatives, value),
            NodeKind::MappingOf { pairs } => self.mapping(node, pairs, value),
            NodeKind::NestedSchema(schema) => schema.validate_outcome(value),
            NodeKind::Marker { kind, inner } => self.marker(node, *kind, inner, value),
        }
    }

    fn wrong_kind(&self, message: &str, node: &Node, expected: &str, value: &Value) -> ValidationError {
        Invalid::new(message)
            .with_expected(expected)
            .with_provided(self.messages.type_name(value.kind()))
            .with_validator(node.to_string())
            .into()
    }

    fn literal(&self, node: &Node, expected: &Value, value: &Value) -> Step {
        if expected.kind() != value.kind() {
            let label = self.messages.type_name(expected.kind());
            return Err(self.wrong_kind(&self.messages.wrong_value_type, node, label, value));
        }
        if expected != value {
            return Err(Invalid::new(&self.messages.invalid_value)
                .with_expected(node.expected())
                .with_provided(value.to_string())
                .with_validator(node.to_string())
                .into());
        }
        Ok(Outcome::Kept(value.clone()))
    }

    fn callable(&self, node: &Node, callable: &Callable, value: &Value) -> Step {
        let label = callable.label();
        let wrap = |prefix: &str, message: String| -> ValidationError {
            Invalid::new(format!("{prefix}: {message}"))
                .with_expected(label)
                .with_provided(value.to_string())
                .with_validator(node.to_string())
                .into()
        };

        match callable.call(value) {
            Ok(outcome) => Ok(outcome),
            Err(CallableError::Assertion(m)) => Err(wrap(&self.messages.assertion_failed, m)),
            Err(CallableError::Type(m)) => Err(wrap(&self.messages.type_error, m)),
            Err(CallableError::Value(m)) => Err(wrap(&self.messages.value_error, m)),
            Err(CallableError::Invalid(e)) => Err(self.enrich_raised(node, label, value, e.into())),
            Err(CallableError::Multiple(m)) => Err(self.enrich_raised(node, label, value, m.into())),
            Err(CallableError::Fatal(source)) => {
                tracing::warn!(validator = %node, error = %source, "callable failed fatally");
                Err(ValidationError::Fatal {
                    validator: node.to_string(),
                    source,
                })
            }
        }
    }

    /// Errors a callable raised about the value itself get the callable's
    /// context; errors addressed deeper already carry their own.
    fn enrich_raised(
        &self,
        node: &Node,
        label: &str,
        value: &Value,
        err: ValidationError,
    ) -> ValidationError {
        let provided = value.to_string();
        let validator = node.to_string();
        err.map_errors(|e| {
            if e.path.is_empty() {
                e.enrich(Some(label), Some(&provided), &[], Some(&validator))
            } else {
                e
            }
        })
    }

    fn iterable(
        &self,
        node: &Node,
        container: ContainerKind,
        alternatives: &[Node],
        value: &Value,
    ) -> Step {
        let Some(elements) = container.elements(value) else {
            let label = self.messages.type_name(container.value_kind());
            return Err(self.wrong_kind(&self.messages.wrong_value_type, node, label, value));
        };
        tracing::trace!(expected = node.expected(), elements = elements.len(), "validating iterable");

        let mut kept = Vec::with_capacity(elements.len());
        let mut errors = Vec::new();
        for (index, element) in elements.into_iter().enumerate() {
            match self.element(node, alternatives, element) {
                Ok(Outcome::Kept(v)) => kept.push(v),
                Ok(Outcome::Dropped) => {}
                Err(err) => {
                    let err = err.enrich(None, None, &[PathSegment::Index(index)], None);
                    absorb(&mut errors, err)?;
                }
            }
        }
        finish(errors, container.build(kept))
    }

    /// First alternative that accepts `element`, or one representative error.
    fn element(&self, node: &Node, alternatives: &[Node], element: &Value) -> Step {
        let mut last = None;
        for alternative in alternatives {
            match self.validate(alternative, element) {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => last = Some(err),
            }
        }
        match last {
            Some(err) if alternatives.len() == 1 => Err(err),
            _ => Err(Invalid::new(&self.messages.invalid_value)
                .with_expected(node.expected())
                .with_provided(element.to_string())
                .with_validator(node.to_string())
                .into()),
        }
    }

    fn mapping(&self, node: &Node, pairs: &[Pair], value: &Value) -> Step {
        let Some(input) = value.as_map() else {
            return Err(self.wrong_kind(&self.messages.wrong_value_type, node, node.expected(), value));
        };
        tracing::trace!(keys = input.len(), pairs = pairs.len(), "validating mapping");

        let mut output = BTreeMap::new();
        let mut errors = Vec::new();
        let mut matched = vec![false; pairs.len()];

        for (key, item) in input {
            let here = [PathSegment::Key(key.clone())];
            let Some((index, key_outcome)) = self.match_key(pairs, key)? else {
                // Only reachable when an explicit Extra key restricts what it catches.
                errors.push(self.extra_key(key, &here));
                continue;
            };
            matched[index] = true;
            let pair = &pairs[index];

            let Outcome::Kept(out_key) = key_outcome else {
                continue;
            };
            match pair.disposition {
                Disposition::Validate => match self.validate(&pair.value, item) {
                    Ok(Outcome::Kept(v)) => {
                        output.insert(out_key, v);
                    }
                    Ok(Outcome::Dropped) => {}
                    Err(err) => absorb(&mut errors, err.enrich(None, None, &here, None))?,
                },
                Disposition::Remove => {}
                Disposition::Reject => errors.push(
                    Invalid::new(&self.messages.value_rejected)
                        .with_provided(item.to_string())
                        .with_path(here.to_vec())
                        .with_validator(pair.key.to_string()),
                ),
                Disposition::RejectExtra => errors.push(
                    self.extra_key(key, &here)
                        .with_validator(pair.key.to_string()),
                ),
                Disposition::Allow => {
                    output.insert(out_key, item.clone());
                }
            }
        }

        for (pair, hit) in pairs.iter().zip(&matched) {
            let demands_value = matches!(pair.disposition, Disposition::Validate | Disposition::Allow);
            if *hit || !demands_value || pair.key_marker() != Some(MarkerKind::Required) {
                continue;
            }
            // A key claimed by an earlier pair still satisfies a general required key.
            if !self.accepts_any(pair, input.keys())? {
                errors.push(self.missing_key(pair));
            }
        }

        finish(errors, Value::Map(output))
    }

    /// Index of the first pair whose key node accepts `key`, with the sanitized key.
    fn match_key(
        &self,
        pairs: &[Pair],
        key: &Value,
    ) -> Result<Option<(usize, Outcome)>, ValidationError> {
        for (index, pair) in pairs.iter().enumerate() {
            match self.validate(pair.matcher(), key) {
                Ok(outcome) => return Ok(Some((index, outcome))),
                Err(err) if err.is_fatal() => return Err(err),
                Err(_) => {}
            }
        }
        Ok(None)
    }

    fn accepts_any<'v>(
        &self,
        pair: &Pair,
        keys: impl Iterator<Item = &'v Value>,
    ) -> Result<bool, ValidationError> {
        for key in keys {
            match self.validate(pair.matcher(), key) {
                Ok(_) => return Ok(true),
                Err(err) if err.is_fatal() => return Err(err),
                Err(_) => {}
            }
        }
        Ok(false)
    }

    fn extra_key(&self, key: &Value, here: &[PathSegment]) -> Invalid {
        Invalid::new(&self.messages.extra_keys)
            .with_provided(key.to_string())
            .with_path(here.to_vec())
    }

    fn missing_key(&self, pair: &Pair) -> Invalid {
        let matcher = pair.matcher();
        // Only a literal key names a concrete path step.
        let path = match matcher.kind() {
            NodeKind::Literal(k) => vec![PathSegment::Key(k.clone())],
            _ => Vec::new(),
        };
        Invalid::new(&self.messages.required_key)
            .with_expected(matcher.expected())
            .with_path(path)
            .with_validator(pair.key.to_string())
    }

    fn marker(&self, node: &Node, kind: MarkerKind, inner: &Node, value: &Value) -> Step {
        match kind {
            MarkerKind::Remove => self.validate(inner, value).map(|_| Outcome::Dropped),
            MarkerKind::Reject => {
                self.validate(inner, value)?;
                Err(Invalid::new(&self.messages.value_rejected)
                    .with_provided(value.to_string())
                    .with_validator(node.to_string())
                    .into())
            }
            MarkerKind::Required | MarkerKind::Optional | MarkerKind::Allow | MarkerKind::Extra => {
                self.validate(inner, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_core::ValueKind;

    fn messages() -> Messages {
        Messages::default()
    }

    fn single(step: Step) -> Invalid {
        match step {
            Err(ValidationError::Invalid(e)) => e,
            other => panic!("expected a single error, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_messages() {
        let msgs = messages();
        let engine = Engine::new(&msgs);
        let node = Node::literal(Value::from(1));

        let kind = single(engine.validate(&node, &Value::from("1")));
        assert_eq!(kind.message, "Wrong value type");
        assert_eq!(kind.expected.as_deref(), Some("Integer number"));
        assert_eq!(kind.provided.as_deref(), Some("String"));

        let value = single(engine.validate(&node, &Value::from(2)));
        assert_eq!(value.message, "Invalid value");
        assert_eq!(value.expected.as_deref(), Some("1"));
        assert_eq!(value.provided.as_deref(), Some("2"));
    }

    #[test]
    fn test_type_check_message() {
        let msgs = messages();
        let engine = Engine::new(&msgs);
        let err = single(engine.validate(&Node::type_check(ValueKind::Str), &Value::from(3)));
        assert_eq!(err.message, "Wrong type");
        assert_eq!(err.expected.as_deref(), Some("String"));
        assert_eq!(err.provided.as_deref(), Some("Integer number"));
    }

    #[test]
    fn test_standalone_remove_drops_on_match() {
        let msgs = messages();
        let engine = Engine::new(&msgs);
        let node = Node::marker(MarkerKind::Remove, Node::type_check(ValueKind::Int));
        assert_eq!(engine.validate(&node, &Value::from(1)).unwrap(), Outcome::Dropped);
        assert!(engine.validate(&node, &Value::from("x")).is_err());
    }

    #[test]
    fn test_standalone_reject_fails_on_match() {
        let msgs = messages();
        let engine = Engine::new(&msgs);
        let node = Node::marker(MarkerKind::Reject, Node::literal(Value::from("x")));
        assert_eq!(single(engine.validate(&node, &Value::from("x"))).message, "Value rejected");
        assert_eq!(single(engine.validate(&node, &Value::from("y"))).message, "Invalid value");
    }

    #[test]
    fn test_fatal_is_absorbed_back() {
        let mut errors = Vec::new();
        let fatal = ValidationError::Fatal {
            validator: "boom()".into(),
            source: "broken".into(),
        };
        assert!(absorb(&mut errors, fatal).is_err());
        assert!(absorb(&mut errors, Invalid::new("x").into()).is_ok());
        assert_eq!(errors.len(), 1);
    }
}
