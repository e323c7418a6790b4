use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MolgenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Schema file {} has no declarations", .0.display())]
    EmptySchema(PathBuf),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("The type {0} is defined twice")]
    DuplicateDeclaration(String),

    #[error("The type {reference} used by {declaration} is not defined")]
    UnresolvedReference {
        declaration: String,
        reference:   String,
    },

    #[error("Recursive nesting is not allowed: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Verifier error: {0}")]
    VerifierError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for MolgenError {
    fn from(err: serde_json::Error) -> Self {
        MolgenError::ParseError {
            msg:    err.to_string(),
            line:   err.line(),
            column: err.column(),
        }
    }
}
