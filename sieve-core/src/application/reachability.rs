// sieve-core/src/application/reachability.rs

use futures::StreamExt;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::table::{RecordTable, Value};
use crate::domain::validation::{UrlValidator, Verdict};
use crate::ports::UrlProber;

pub const REACHABLE_COLUMN: &str = "url_reachable";

/// Probe results keyed by normalized URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReachabilityResults {
    pub by_url: BTreeMap<String, bool>,
}

impl ReachabilityResults {
    pub fn probed(&self) -> usize {
        self.by_url.len()
    }

    pub fn unreachable(&self) -> usize {
        self.by_url.values().filter(|ok| !**ok).count()
    }
}

/// Distinct valid URLs of the table, normalized, in sorted order.
pub fn distinct_urls(
    table: &RecordTable,
    validator: &UrlValidator,
) -> Result<BTreeSet<String>, DomainError> {
    let col = table.column_index(validator.field())?;
    Ok(table
        .column(col)
        .filter(|v| validator.classify(v).is_valid())
        .filter_map(UrlValidator::normalize)
        .collect())
}

/// Probes every distinct valid URL once, at most `workers` at a time. A probe
/// that fails or exceeds `timeout` counts as unreachable; nothing is retried.
#[instrument(skip(table, validator, prober))]
pub async fn check_reachability(
    table: &RecordTable,
    validator: &UrlValidator,
    prober: &dyn UrlProber,
    workers: usize,
    timeout: Duration,
) -> Result<ReachabilityResults, DomainError> {
    let urls = distinct_urls(table, validator)?;
    info!(urls = urls.len(), workers, "Probing URLs");

    let by_url: BTreeMap<String, bool> = futures::stream::iter(urls)
        .map(|url| async move {
            let ok = match tokio::time::timeout(timeout, prober.probe(&url)).await {
                Ok(Ok(ok)) => ok,
                Ok(Err(e)) => {
                    warn!(url = %url, error = %e, "Probe failed");
                    false
                }
                Err(_) => {
                    warn!(url = %url, "Probe timed out");
                    false
                }
            };
            (url, ok)
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let results = ReachabilityResults { by_url };
    info!(
        probed = results.probed(),
        unreachable = results.unreachable(),
        "Reachability check finished"
    );
    Ok(results)
}

/// Adds a `url_reachable` column: `"true"`/`"false"` for present URLs (invalid
/// ones are `"false"` without probing), Missing when there is no URL.
pub fn annotate(
    table: &RecordTable,
    validator: &UrlValidator,
    results: &ReachabilityResults,
) -> Result<RecordTable, DomainError> {
    let col = table.column_index(validator.field())?;
    let flags = table
        .column(col)
        .map(|value| match validator.classify(value) {
            Verdict::Missing => Value::Missing,
            Verdict::Invalid(_) => Value::text("false"),
            Verdict::Valid => {
                let ok = UrlValidator::normalize(value)
                    .and_then(|url| results.by_url.get(&url).copied())
                    .unwrap_or(false);
                Value::text(ok.to_string())
            }
        })
        .collect();
    table.with_column(REACHABLE_COLUMN, flags)
}
