// sieve-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{
    DedupConfig, OutlierKind, ProjectConfig, ReachabilityConfig, StageConfig, StandardizeConfig,
    StatisticsConfig,
};
