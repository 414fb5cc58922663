// sieve-core/src/lib.rs

// 1. Documentation is not mandatory yet
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts towards the outside world (URL probing).
pub mod ports;

// 2. Domain (business core)
// Record table, duplicate resolution, validators, standardization, report.
// Depends on NOTHING else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// CSV store, HTTP prober, project configuration, atomic writes.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration (Pipeline, Reachability, Audit, Clean).
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::SieveError;
