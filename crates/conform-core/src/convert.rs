//! # Format Conversions — JSON and YAML at the Boundary
//!
//! Documents arrive as `serde_json::Value` or `serde_yaml::Value` and are
//! converted once into the generic [`Value`] tree.
//!
//! ## Rules
//!
//! 1. **Integers stay integers.** Numbers that fit `i64` become `Int`,
//!    everything else becomes `Float`.
//! 2. **YAML keys keep their type.** A YAML mapping `{1: a}` produces an
//!    `Int` key; JSON object keys are always `Str`.
//! 3. **YAML tags are ignored.** The tagged value is converted as-is.
//! 4. **Back to JSON stringifies keys.** Non-string keys become their
//!    `Display` form, tuples and sets become arrays, bytes become arrays of
//!    numbers. Non-finite floats are rejected.

use serde_json::Number;

use crate::error::ValueError;
use crate::value::Value;

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => json_number(&n),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn json_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else {
        // u64 beyond i64::MAX, or a genuine float.
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl TryFrom<&serde_yaml::Value> for Value {
    type Error = ValueError;

    fn try_from(yaml: &serde_yaml::Value) -> Result<Self, Self::Error> {
        match yaml {
            serde_yaml::Value::Null => Ok(Self::None),
            serde_yaml::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(ValueError::UnsupportedNumber(n.to_string()))
                }
            }
            serde_yaml::Value::String(s) => Ok(Self::Str(s.clone())),
            serde_yaml::Value::Sequence(seq) => {
                let items: Result<Vec<Value>, ValueError> =
                    seq.iter().map(Value::try_from).collect();
                Ok(Self::List(items?))
            }
            serde_yaml::Value::Mapping(map) => {
                let mut entries = std::collections::BTreeMap::new();
                for (k, v) in map {
                    entries.insert(Value::try_from(k)?, Value::try_from(v)?);
                }
                Ok(Self::Map(entries))
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(&tagged.value),
        }
    }
}

impl Value {
    /// Parse a JSON document into a value.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(s).map(Value::from)
    }

    /// Parse a YAML document into a value.
    pub fn from_yaml_str(s: &str) -> Result<Self, ValueError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(s)
            .map_err(|e| ValueError::Parse(e.to_string()))?;
        Value::try_from(&yaml)
    }

    /// Convert into a JSON value, stringifying non-string keys.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NonFiniteFloat` if the tree contains NaN or an
    /// infinity anywhere.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        Ok(match self {
            Self::None => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(n) => serde_json::Value::Number(Number::from(*n)),
            Self::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or(ValueError::NonFiniteFloat(*f))?,
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Bytes(b) => serde_json::Value::Array(
                b.iter()
                    .map(|byte| serde_json::Value::Number(Number::from(*byte)))
                    .collect(),
            ),
            Self::List(items) | Self::Tuple(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_, _>>()?,
            ),
            Self::Set(items) | Self::FrozenSet(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_, _>>()?,
            ),
            Self::Map(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    let key = match k {
                        Self::Str(s) => s.clone(),
                        other => other.to_string(),
                    };
                    map.insert(key, v.to_json()?);
                }
                serde_json::Value::Object(map)
            }
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// JSON values without floats, so they survive the trip back exactly.
    fn json_value_no_floats() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,20}".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// JSON → Value → JSON is lossless for float-free documents.
        #[test]
        fn json_survives_value_model(json in json_value_no_floats()) {
            let value = Value::from(json.clone());
            prop_assert_eq!(value.to_json().unwrap(), json);
        }
    }
}
