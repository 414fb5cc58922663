// sieve-core/src/application/mod.rs

pub mod audit;
pub mod clean;
pub mod pipeline;
pub mod reachability;
pub mod stages;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write `use sieve_core::application::{run_pipeline, clean_project};`
// without knowing the internal file layout.

pub use audit::{AuditRules, AuditSummary, RecordAudit, audit_table};
pub use clean::clean_project;
pub use pipeline::{PipelineOutput, RunResult, reconcile, run_pipeline};
pub use reachability::{ReachabilityResults, annotate, check_reachability};
pub use stages::{StageOutcome, apply_stage};
