//! # conform-core — Value Model for the conform Validation Engine
//!
//! This crate is the leaf of the conform workspace. It defines the generic
//! value tree that every schema is validated against, so the engine in
//! `conform-schema` never has to care which serialization format an input
//! came from.
//!
//! ## Key Design Principles
//!
//! 1. **One closed `Value` enum.** Scalars, byte strings, four container
//!    kinds, and maps with arbitrary (not just string) keys. Exhaustive
//!    `match` everywhere.
//!
//! 2. **Type-strict equality with a total order.** `1`, `1.0` and `true` are
//!    three different values. Floats are ordered by `total_cmp`, which lets
//!    `Value` key a `BTreeMap` or live in a `BTreeSet`.
//!
//! 3. **Human type labels live next to the kinds.** `ValueKind::label()` is
//!    the single source of the names that show up in validation errors.
//!
//! 4. **Format conversions at the boundary.** JSON and YAML documents are
//!    converted into `Value` once; sanitized output converts back to JSON
//!    with key stringification.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `conform-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod convert;
pub mod error;
pub mod path;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::ValueError;
pub use path::{PathDisplay, PathSegment};
pub use value::{Value, ValueKind};
