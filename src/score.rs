//! Similarity scoring between normalized grids.
//!
//! The metric is total absolute intensity difference mapped onto [0, 100]:
//! 100 for identical grids, 0 when every sample pair differs by the full
//! intensity range. It is a holistic comparison with no translation,
//! rotation, scale, or lighting invariance; that coarseness is an accepted
//! property of the metric.

use crate::grid::NormalizedGrid;
use crate::util::{PrintMatchError, PrintMatchResult};

/// Maximum per-sample absolute difference for 8-bit intensities.
const MAX_SAMPLE_DIFF: u64 = 255;

/// Scores two equal-length sample slices.
///
/// Returns the similarity in [0, 100]. The slices must have the same
/// nonzero length; [`similarity`] guarantees this for grids produced by one
/// normalizer.
pub fn similarity_samples(a: &[u8], b: &[u8]) -> PrintMatchResult<f64> {
    if a.len() != b.len() {
        return Err(PrintMatchError::GridLenMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(PrintMatchError::EmptyGrid);
    }

    let total_diff: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    let max_diff = a.len() as u64 * MAX_SAMPLE_DIFF;
    Ok(((max_diff - total_diff) as f64 / max_diff as f64) * 100.0)
}

/// Scores two normalized grids.
///
/// Pure over both arguments. Mismatched lengths indicate a normalizer bug
/// upstream and are reported as [`PrintMatchError::GridLenMismatch`].
pub fn similarity(a: &NormalizedGrid, b: &NormalizedGrid) -> PrintMatchResult<f64> {
    similarity_samples(a.samples(), b.samples())
}
