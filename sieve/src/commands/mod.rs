// sieve/src/commands/mod.rs

pub mod clean;
pub mod inspect;
pub mod probe;
pub mod run;
