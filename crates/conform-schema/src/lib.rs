//! # conform-schema — Schema Compiler and Validation Engine
//!
//! Compiles a declarative description of the shape a value should have into
//! an immutable validator tree, then validates any number of input values
//! against it. A successful validation returns the sanitized (possibly
//! coerced) value; a failed one returns every independent problem found in
//! one pass, each addressed by its path inside the input.
//!
//! ```
//! use conform_schema::{optional, Def, Schema, Value, ValueKind};
//!
//! let schema = Schema::new(Def::mapping([
//!     ("name".into(), ValueKind::Str.into()),
//!     (optional("age"), ValueKind::Int.into()),
//! ]))
//! .unwrap();
//!
//! let err = schema
//!     .validate(&Value::map([("name", Value::from(1)), ("age", Value::from("x"))]))
//!     .unwrap_err();
//! assert_eq!(err.errors().len(), 2);
//! ```
//!
//! ## Layers
//!
//! - [`def`]: what schema authors write.
//! - `compile`: turns a [`Def`] into a [`Node`] tree once, ordering every
//!   candidate list by [`priority`].
//! - `validate`: walks the tree against a [`Value`].
//! - [`error`]: `Invalid` / `MultipleInvalid` and their enrichment rule.
//! - [`marker`]: `Required`, `Optional`, `Remove`, `Reject`, `Allow`, `Extra`.
//!
//! ## Crate Policy
//!
//! - Depends only on `conform-core` internally.
//! - Validation never fails fast inside one container.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod adapters;
mod compile;
pub mod config;
pub mod def;
pub mod error;
pub mod marker;
pub mod node;
pub mod priority;
pub mod schema;
mod validate;

// Re-export primary types for ergonomic imports.
pub use config::{ExtraKeys, Messages, SchemaOptions};
pub use conform_core::{PathSegment, Value, ValueKind};
pub use def::{Callable, ContainerKind, Def, Outcome};
pub use error::{BoxError, CallableError, Invalid, MultipleInvalid, SchemaError, ValidationError};
pub use marker::{allow, extra, optional, reject, remove, required, Disposition, MarkerKind};
pub use node::{Node, NodeKind, Pair};
pub use schema::{compile, Schema};
