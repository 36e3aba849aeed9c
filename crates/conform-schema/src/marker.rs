//! # Marker Protocol
//!
//! Markers are compile-time annotations that change how a key (or a value)
//! takes part in mapping and iterable dispatch. The set is closed and small,
//! so it is one enum matched inside the engine instead of per-marker
//! behavior objects.
//!
//! | Marker     | As a mapping key                                  |
//! |------------|---------------------------------------------------|
//! | `Required` | must match at least one input key                 |
//! | `Optional` | may match no input key                            |
//! | `Remove`   | matched pairs are dropped, value never validated  |
//! | `Reject`   | matched pairs always fail                         |
//! | `Allow`    | matched pairs pass through, value not validated   |
//! | `Extra`    | catch-all for keys nothing else matched           |
//!
//! A bare `Reject`, `Allow` or `Remove` in the *value* position of a pair
//! (`{Extra: Reject}`, `{str: Remove}`) decides the fate of every key that
//! pair matches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::def::Def;

/// The closed set of markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Required,
    Optional,
    Remove,
    Reject,
    Allow,
    Extra,
}

impl MarkerKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "Required",
            Self::Optional => "Optional",
            Self::Remove => "Remove",
            Self::Reject => "Reject",
            Self::Allow => "Allow",
            Self::Extra => "Extra",
        }
    }

    /// Whether a bare marker of this kind can decide what happens to matched keys.
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Remove | Self::Reject | Self::Allow)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a mapping pair does with an input key it matched.
///
/// Resolved once at compile time from the key marker and a bare value
/// marker, so the engine never re-derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Validate the input value with the pair's value node.
    Validate,
    /// Drop the pair without looking at the value.
    Remove,
    /// Fail with "value rejected".
    Reject,
    /// Fail with "extra keys not allowed" (the catch-all with `Reject`).
    RejectExtra,
    /// Keep the pair as-is.
    Allow,
}

impl Disposition {
    /// Disposition of a pair given its key marker and an optional bare value marker.
    pub(crate) fn resolve(key_marker: MarkerKind, value_action: Option<MarkerKind>) -> Self {
        match (key_marker, value_action) {
            (MarkerKind::Extra, Some(MarkerKind::Reject)) => Self::RejectExtra,
            (_, Some(MarkerKind::Remove)) | (MarkerKind::Remove, _) => Self::Remove,
            (_, Some(MarkerKind::Reject)) | (MarkerKind::Reject, _) => Self::Reject,
            (_, Some(MarkerKind::Allow)) | (MarkerKind::Allow, _) => Self::Allow,
            _ => Self::Validate,
        }
    }
}

// ─── Constructors for schema authors ─────────────────────────────────

/// `Required(key)`: the key must be present.
pub fn required(key: impl Into<Def>) -> Def {
    Def::marker(MarkerKind::Required, key)
}

/// `Optional(key)`: the key may be absent.
pub fn optional(key: impl Into<Def>) -> Def {
    Def::marker(MarkerKind::Optional, key)
}

/// `Remove(key)`: matching pairs are dropped from the output.
pub fn remove(key: impl Into<Def>) -> Def {
    Def::marker(MarkerKind::Remove, key)
}

/// `Reject(key)`: matching pairs are an error.
pub fn reject(key: impl Into<Def>) -> Def {
    Def::marker(MarkerKind::Reject, key)
}

/// `Allow(key)`: matching pairs pass through unvalidated.
pub fn allow(key: impl Into<Def>) -> Def {
    Def::marker(MarkerKind::Allow, key)
}

/// The bare `Extra` catch-all key.
pub fn extra() -> Def {
    Def::bare(MarkerKind::Extra)
}
