//! # Error Types — Value Conversion Failures
//!
//! Errors raised when a document cannot be converted into, or out of, the
//! generic [`Value`](crate::Value) tree. Validation failures are not
//! represented here; they belong to `conform-schema`.

use thiserror::Error;

/// Error converting between `Value` and an external document model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// JSON has no representation for NaN or infinities.
    #[error("non-finite float {0} cannot be represented in JSON")]
    NonFiniteFloat(f64),

    /// A YAML number that fits neither `i64` nor `f64`.
    #[error("unsupported number: {0}")]
    UnsupportedNumber(String),

    /// The document is not well-formed YAML.
    #[error("YAML parse error: {0}")]
    Parse(String),
}
