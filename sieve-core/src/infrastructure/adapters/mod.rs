// sieve-core/src/infrastructure/adapters/mod.rs

pub mod csv;
pub mod http;

pub use self::csv::CsvStore;
pub use self::http::HttpProber;
