// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # refgen — method set and reference resolver generation
//!
//! refgen reads Go API type declarations, classifies the structs it finds
//! by structural shape, and generates the boilerplate method sets those
//! shapes call for. Its centerpiece is reference resolution: a field
//! annotated with `+crossplane:generate:reference:type=...` gets a
//! generated `ResolveReferences` method that fetches the referenced object
//! at runtime, extracts a value from it, and writes the value and the
//! resolved reference back through arbitrarily nested pointer and slice
//! paths.
//!
//! ## Pipeline
//!
//! 1. [`parse`] reads a package directory into a structural model
//!    ([`model::Package`]).
//! 2. [`traverse`] walks each struct's type tree, running processors such
//!    as the [`reference::ReferenceProcessor`] at every field.
//! 3. [`resolver`] and [`methods`] turn what the processors found into Go
//!    method bodies, and [`generate`] assembles them into
//!    `zz_generated.*.go` files.
//!
//! [`schema`] is a companion linter that diffs two CRD documents for
//! removed fields, and [`convert`] documents the value adapters the
//! generated code calls.

pub mod convert;
pub mod error;
pub mod fields;
pub mod generate;
pub mod markers;
pub mod matcher;
pub mod methods;
pub mod model;
pub mod parse;
pub mod reference;
pub mod resolver;
pub mod schema;
pub mod traverse;

pub use error::{Error, Result};

/// Crate version, for the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
