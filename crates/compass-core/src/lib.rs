//! # compass-core: Test-Case Configuration Documents
//!
//! Test cases are configured through INI-style files: sectioned
//! `key = value` text with `#`/`;` comments. A test case's effective
//! configuration is the combination of several such files (machine defaults,
//! MPAS core, test group, test case), read in order so later files override
//! earlier ones.
//!
//! This crate provides the document model every typed loader builds on:
//!
//! - [`ConfigDocument`] ([`document`]): parsing, layering, lookup and writing.
//! - [`interpolate`]: `${option}` / `${section:option}` references.
//! - [`ConfigValue`] ([`value`]): coercion of raw text to `f64`, `bool`,
//!   integers, with the spellings the framework accepts (`True`, `yes`, `on`...).
//! - [`ConfigError`] / [`MalformedConfig`] ([`error`]): the error taxonomy.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `compass-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod interpolate;
pub mod value;

pub use document::{ConfigDocument, Section, DEFAULT_SECTION};
pub use error::{ConfigError, ConfigResult, MalformedConfig};
pub use value::ConfigValue;
