// sieve-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, PartialEq)]
pub enum DomainError {
    #[error("Unknown strategy '{strategy}' (expected one of: {expected})")]
    #[diagnostic(
        code(sieve::domain::strategy),
        help("Strategies are chosen per stage in sieve.yaml.")
    )]
    UnknownStrategy { strategy: String, expected: String },

    #[error("Column '{0}' not found in table schema")]
    #[diagnostic(
        code(sieve::domain::missing_column),
        help("Check the field names used in identity keys and stage configuration.")
    )]
    MissingColumn(String),

    #[error("Schema Error: {0}")]
    #[diagnostic(code(sieve::domain::schema))]
    Schema(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(sieve::domain::config))]
    InvalidConfig(String),
}
