// sieve-core/src/domain/outliers.rs

use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::table::{CleanResult, RecordTable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierMethod {
    Iqr { threshold: f64 },
    ZScore { threshold: f64 },
}

impl Default for OutlierMethod {
    fn default() -> Self {
        Self::Iqr {
            threshold: default_iqr_threshold(),
        }
    }
}

pub(crate) fn default_iqr_threshold() -> f64 {
    1.5
}

pub(crate) fn default_zscore_threshold() -> f64 {
    3.0
}

/// Cut-offs computed once per column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fence {
    /// Kept when `lower <= x <= upper`.
    Closed { lower: f64, upper: f64 },
    /// Kept when `|x - mean| / stddev < threshold`.
    Score { mean: f64, stddev: f64, threshold: f64 },
}

impl Fence {
    pub fn is_outlier(&self, x: f64) -> bool {
        match *self {
            Self::Closed { lower, upper } => x < lower || x > upper,
            Self::Score {
                mean,
                stddev,
                threshold,
            } => ((x - mean) / stddev).abs() >= threshold,
        }
    }
}

impl OutlierMethod {
    /// `None` when the sample is too small or flat to flag anything.
    pub fn fence(&self, values: &[f64]) -> Option<Fence> {
        match *self {
            Self::Iqr { threshold } => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let q1 = quantile(&sorted, 0.25)?;
                let q3 = quantile(&sorted, 0.75)?;
                let iqr = q3 - q1;
                Some(Fence::Closed {
                    lower: q1 - threshold * iqr,
                    upper: q3 + threshold * iqr,
                })
            }
            Self::ZScore { threshold } => {
                if values.len() < 2 {
                    return None;
                }
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
                let stddev = variance.sqrt();
                (stddev > 1e-9).then_some(Fence::Score {
                    mean,
                    stddev,
                    threshold,
                })
            }
        }
    }
}

/// Linearly interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub struct OutlierFilter {
    columns: Vec<String>,
    method: OutlierMethod,
}

impl OutlierFilter {
    pub fn new(columns: Vec<String>, method: OutlierMethod) -> Self {
        Self { columns, method }
    }

    /// Filters each configured column in turn; later columns see the table
    /// already trimmed by earlier ones. Missing and non-numeric cells are kept.
    pub fn filter(&self, table: &RecordTable) -> Result<CleanResult, DomainError> {
        let mut cleaned = table.clone();
        let mut rejected = table.empty_like();

        for name in &self.columns {
            let col = cleaned.column_index(name)?;
            let sample: Vec<f64> = cleaned
                .column(col)
                .filter(|v| v.is_numeric())
                .filter_map(|v| v.as_f64())
                .collect();

            let Some(fence) = self.method.fence(&sample) else {
                debug!(column = %name, "Sample too small for outlier detection");
                continue;
            };

            let split = cleaned.split(|_, r| {
                let v = r.get(col);
                !(v.is_numeric() && v.as_f64().is_some_and(|x| fence.is_outlier(x)))
            });
            debug!(column = %name, outliers = split.rejected.len(), "Outlier pass");
            rejected = rejected.concat(split.rejected)?;
            cleaned = split.cleaned;
        }

        info!(
            method = ?self.method,
            removed = rejected.len(),
            "Outlier filtering finished"
        );
        Ok(CleanResult { cleaned, rejected })
    }
}
