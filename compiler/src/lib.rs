//! molgen-compiler
//!
//! Turns a molecule schema IR (the JSON `moleculec --format json` emits) into
//! a Rust module of codecs built on `molgen-schema`:
//!  1) a foundation catalog naming the types the runtime already provides,
//!  2) an IR loader and a classifier sorting names into buckets,
//!  3) a verifier (names, shapes, reference closure),
//!  4) dependency ordering and byte layout of custom declarations,
//!  5) code generation (`compile_schema_to_rust` → `String`),
//!  6) a driver writing the module to disk (`generate`), and its config.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod driver;
pub mod error;
pub mod gen_rust;
pub mod layout;
pub mod loader;
pub mod order;
pub mod types;
pub mod utils;
pub mod verifier;

pub use catalog::{Catalog, CatalogEntry, Foundation};
pub use classifier::{Bucket, Classifier};
pub use config::GeneratorConfig;
pub use driver::{check, generate, render, CheckReport, GeneratedOutput, GenerationReport};
pub use error::MolgenError;
pub use gen_rust::compile_schema_to_rust;
pub use loader::{load_schema, parse_schema};
