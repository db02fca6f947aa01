//! Empirical p-values against resampled null distributions.
//!
//! The null distribution for a statistic is produced elsewhere by
//! recomputing it on [`RESAMPLE_SIZE`] randomized graphs. The p-value is
//! two-sided: the smaller of the counts of resamples strictly below and
//! strictly above the observed value, divided by the resample count. It
//! therefore lies on the grid `{0, 0.001, …, 0.5}`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::MetricsError;
use crate::table::MetricsTable;

/// Number of resamples every null distribution must contain.
pub const RESAMPLE_SIZE: usize = 1000;

/// Two-sided empirical p-value of `observed` within `resamples`.
///
/// # Errors
///
/// Returns [`MetricsError::ResampleSize`] unless `resamples` holds exactly
/// [`RESAMPLE_SIZE`] values.
#[allow(clippy::cast_precision_loss)]
pub fn empirical_p_value(observed: f64, resamples: &[f64]) -> Result<f64, MetricsError> {
    if resamples.len() != RESAMPLE_SIZE {
        return Err(MetricsError::ResampleSize {
            expected: RESAMPLE_SIZE,
            actual: resamples.len(),
        });
    }
    let above = resamples.iter().filter(|&&r| observed > r).count();
    let below = resamples.iter().filter(|&&r| observed < r).count();
    Ok(above.min(below) as f64 / RESAMPLE_SIZE as f64)
}

/// P-values for one column of `table`, keyed by row name.
///
/// Only rows with a numeric value in `column` and an entry in `samples` are
/// tested; the rest are skipped.
///
/// # Errors
///
/// Returns [`MetricsError::UnknownColumn`] if `column` is not in the table,
/// or [`MetricsError::ResampleSize`] if any matched distribution has the
/// wrong length.
pub fn column_p_values(
    table: &MetricsTable,
    column: &str,
    samples: &BTreeMap<String, Vec<f64>>,
) -> Result<BTreeMap<String, f64>, MetricsError> {
    let mut p_values = BTreeMap::new();
    for (name, cell) in table.column(column)? {
        let (Some(observed), Some(resamples)) = (cell.as_f64(), samples.get(name)) else {
            debug!(graph = name, column, "no value or null distribution; skipping");
            continue;
        };
        p_values.insert(name.to_string(), empirical_p_value(observed, resamples)?);
    }
    Ok(p_values)
}
