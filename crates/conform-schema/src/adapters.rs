//! Small adapters built on the callable contract.
//!
//! None of these add engine behavior; they are ordinary callables that
//! wrap a schema or a predicate.

use conform_core::Value;

use crate::def::{short_type_name, Callable, Def};
use crate::error::{CallableError, Invalid};
use crate::schema::Schema;

/// Validate with `schema`, replacing the message of every error it reports.
///
/// ```
/// use conform_schema::{adapters::msg, Def, Schema, Value, ValueKind};
///
/// let schema = Schema::new(Def::mapping([(
///     "port".into(),
///     msg(Schema::new(ValueKind::Int).unwrap(), "port must be a number"),
/// )]))
/// .unwrap();
///
/// let err = schema.validate(&Value::map([("port", "http")])).unwrap_err();
/// assert_eq!(err.first().unwrap().message, "port must be a number");
/// ```
pub fn msg(schema: Schema, message: impl Into<String>) -> Def {
    let message = message.into();
    let label = schema.root().expected().to_string();
    Callable::with_outcome("msg", move |value| {
        schema.validate_outcome(value).map_err(|err| {
            err.map_errors(|mut e| {
                e.message.clone_from(&message);
                e
            })
            .into()
        })
    })
    .named(label)
    .into()
}

/// Give `callable` the label reported as `expected` when it fails.
pub fn name(label: impl Into<String>, callable: Callable) -> Callable {
    callable.named(label)
}

/// Adapt a boolean predicate into a callable that fails with `message`.
///
/// `expected` is reported when given; otherwise the engine uses the
/// predicate's label.
pub fn truth<F>(message: impl Into<String>, expected: Option<&str>, predicate: F) -> Callable
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    let message = message.into();
    let expected = expected.map(str::to_string);
    let label = short_type_name::<F>();
    Callable::new(label, move |value| {
        if predicate(value) {
            return Ok(value.clone());
        }
        let err = Invalid::new(message.as_str());
        Err(CallableError::Invalid(match &expected {
            Some(e) => err.with_expected(e.as_str()),
            None => err,
        }))
    })
}
