//! # Compile Options and the Message Hook
//!
//! [`SchemaOptions`] carries the two compile-time defaults of a schema
//! (`default_keys`, `extra_keys`) and the [`Messages`] used to render
//! errors. Options are plain serde data, so they can be loaded from a YAML
//! or JSON document next to the rest of an application's configuration:
//!
//! ```yaml
//! default_keys: optional
//! extra_keys: remove
//! messages:
//!   required_key: "is required"
//!   type_names:
//!     int: "Integer"
//! ```
//!
//! A sub-schema for `extra_keys` can only be supplied in code.

use std::collections::BTreeMap;

use conform_core::ValueKind;
use serde::{Deserialize, Serialize};

use crate::def::Def;
use crate::error::SchemaError;
use crate::marker::MarkerKind;

/// What happens to mapping keys no declared pair matched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKeys {
    /// Fail with "extra keys not allowed".
    #[default]
    Reject,
    /// Keep them unvalidated.
    Allow,
    /// Drop them silently.
    Remove,
    /// Validate their values against this schema.
    #[serde(skip)]
    Schema(Def),
}

impl ExtraKeys {
    /// `extra_keys` from a marker kind; only the action kinds qualify.
    pub fn from_marker(kind: MarkerKind) -> Result<Self, SchemaError> {
        match kind {
            MarkerKind::Reject => Ok(Self::Reject),
            MarkerKind::Allow => Ok(Self::Allow),
            MarkerKind::Remove => Ok(Self::Remove),
            other => Err(SchemaError::InvalidOption {
                option: "extra_keys",
                kind: other,
            }),
        }
    }

    /// The catch-all value definition this setting compiles to.
    pub(crate) fn to_def(&self) -> Def {
        match self {
            Self::Reject => Def::bare(MarkerKind::Reject),
            Self::Allow => Def::bare(MarkerKind::Allow),
            Self::Remove => Def::bare(MarkerKind::Remove),
            Self::Schema(def) => def.clone(),
        }
    }
}

impl From<Def> for ExtraKeys {
    fn from(def: Def) -> Self {
        Self::Schema(def)
    }
}

/// Compile options for a [`Schema`](crate::Schema).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Marker applied to mapping keys that carry none.
    pub default_keys: MarkerKind,
    /// Rule for keys not declared in a mapping.
    pub extra_keys: ExtraKeys,
    /// Error message strings.
    pub messages: Messages,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            default_keys: MarkerKind::Required,
            extra_keys: ExtraKeys::Reject,
            messages: Messages::default(),
        }
    }
}

impl SchemaOptions {
    pub fn default_keys(mut self, kind: MarkerKind) -> Self {
        self.default_keys = kind;
        self
    }

    pub fn extra_keys(mut self, extra: impl Into<ExtraKeys>) -> Self {
        self.extra_keys = extra.into();
        self
    }

    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Load options from a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, SchemaError> {
        let options: Self =
            serde_yaml::from_str(s).map_err(|e| SchemaError::Config(e.to_string()))?;
        options.check()?;
        Ok(options)
    }

    /// Load options from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, SchemaError> {
        let options: Self =
            serde_json::from_str(s).map_err(|e| SchemaError::Config(e.to_string()))?;
        options.check()?;
        Ok(options)
    }

    /// Reject option combinations the compiler cannot honor.
    pub(crate) fn check(&self) -> Result<(), SchemaError> {
        if self.default_keys == MarkerKind::Extra {
            return Err(SchemaError::InvalidOption {
                option: "default_keys",
                kind: MarkerKind::Extra,
            });
        }
        Ok(())
    }
}

/// Every string the engine puts into an error, plus type-label overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub wrong_type: String,
    pub wrong_value_type: String,
    pub invalid_value: String,
    pub required_key: String,
    pub extra_keys: String,
    pub value_rejected: String,
    pub value_removed: String,
    pub assertion_failed: String,
    pub type_error: String,
    pub value_error: String,
    /// Overrides for [`ValueKind::label`].
    pub type_names: BTreeMap<ValueKind, String>,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            wrong_type: "Wrong type".into(),
            wrong_value_type: "Wrong value type".into(),
            invalid_value: "Invalid value".into(),
            required_key: "Required key not provided".into(),
            extra_keys: "Extra keys not allowed".into(),
            value_rejected: "Value rejected".into(),
            value_removed: "Value removed".into(),
            assertion_failed: "Assertion failed".into(),
            type_error: "Type error".into(),
            value_error: "Value error".into(),
            type_names: BTreeMap::new(),
        }
    }
}

impl Messages {
    /// Human label of a value kind, honoring overrides.
    pub fn type_name(&self, kind: ValueKind) -> &str {
        self.type_names
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SchemaOptions::default();
        assert_eq!(opts.default_keys, MarkerKind::Required);
        assert!(matches!(opts.extra_keys, ExtraKeys::Reject));
        assert_eq!(opts.messages.required_key, "Required key not provided");
    }

    #[test]
    fn test_load_yaml() {
        let opts = SchemaOptions::from_yaml_str(
            "default_keys: optional\nextra_keys: remove\nmessages:\n  required_key: is required\n  type_names:\n    int: Integer\n",
        )
        .unwrap();
        assert_eq!(opts.default_keys, MarkerKind::Optional);
        assert!(matches!(opts.extra_keys, ExtraKeys::Remove));
        assert_eq!(opts.messages.required_key, "is required");
        assert_eq!(opts.messages.wrong_type, "Wrong type");
        assert_eq!(opts.messages.type_name(ValueKind::Int), "Integer");
        assert_eq!(opts.messages.type_name(ValueKind::Str), "String");
    }

    #[test]
    fn test_load_json() {
        let opts = SchemaOptions::from_json_str(r#"{"extra_keys": "allow"}"#).unwrap();
        assert!(matches!(opts.extra_keys, ExtraKeys::Allow));
        assert_eq!(opts.default_keys, MarkerKind::Required);
    }

    #[test]
    fn test_extra_as_default_keys_rejected() {
        let err = SchemaOptions::from_yaml_str("default_keys: extra\n").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidOption {
                option: "default_keys",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let err = SchemaOptions::from_json_str(r#"{"extra_keys": "sometimes"}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn test_extra_keys_from_marker() {
        assert!(ExtraKeys::from_marker(MarkerKind::Required).is_err());
        assert!(matches!(ExtraKeys::from_marker(MarkerKind::Allow), Ok(ExtraKeys::Allow)));
    }
}
