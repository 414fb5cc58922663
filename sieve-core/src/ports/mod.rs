// sieve-core/src/ports/mod.rs

pub mod prober;
pub mod store;

pub use prober::UrlProber;
pub use store::TableStore;
