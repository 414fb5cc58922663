pub mod enrichment;
pub mod error;
pub mod outliers;
pub mod project;
pub mod report;
pub mod resolver;
pub mod standardize;
pub mod table;
pub mod validation;

pub use error::DomainError;
pub use report::{DatasetStatistics, ReconciliationReport};
pub use resolver::DuplicateResolver;
pub use table::{CleanResult, Record, RecordTable, Schema, Value};
