// sieve-core/src/ports/prober.rs

use crate::error::SieveError;
use async_trait::async_trait;

#[async_trait]
pub trait UrlProber: Send + Sync {
    /// `Ok(true)` when the URL answered with a non-error status.
    /// Transport failures are returned as errors; callers decide how to degrade.
    async fn probe(&self, url: &str) -> Result<bool, SieveError>;
}
