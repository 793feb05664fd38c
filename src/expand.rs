//! Window-to-SNP expansion of prediction arrays.

use log::debug;
use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{ReportError, Result};

/// Broadcast a per-window prediction array `[rows, n_wind]` to per-SNP
/// resolution `[rows, chm_len]`.
///
/// Each window's value is replicated `window_size` times; the remainder
/// (`chm_len - n_wind * window_size` trailing SNPs) repeats the value of the
/// last window. A `chm_len` shorter than the window-tiled length is a shape
/// error.
pub fn expand_predictions(
    pred: ArrayView2<u8>,
    chm_len: usize,
    window_size: usize,
) -> Result<Array2<u8>> {
    let (n_rows, n_wind) = pred.dim();
    if n_wind == 0 {
        return Err(ReportError::shape(
            "prediction array has no windows to expand",
        ));
    }
    if window_size == 0 {
        return Err(ReportError::shape("window size must be positive"));
    }
    let tiled_len = n_wind * window_size;
    if chm_len < tiled_len {
        return Err(ReportError::shape(format!(
            "chromosome length {} is shorter than {} windows of size {} ({} SNPs)",
            chm_len, n_wind, window_size, tiled_len
        )));
    }
    debug!(
        "Expanding {} windows of size {} to {} SNPs ({} remainder) for {} rows.",
        n_wind,
        window_size,
        chm_len,
        chm_len - tiled_len,
        n_rows
    );

    let mut expanded = Array2::<u8>::zeros((n_rows, chm_len));
    for snp in 0..chm_len {
        let window = (snp / window_size).min(n_wind - 1);
        expanded.column_mut(snp).assign(&pred.column(window));
    }
    Ok(expanded)
}

/// Expand a per-window prediction array and return only the columns at
/// `marker_idx`, yielding predictions for an arbitrary subset of SNP
/// positions (e.g. query markers absent from the model SNP set).
pub fn predictions_at_markers(
    pred: ArrayView2<u8>,
    chm_len: usize,
    window_size: usize,
    marker_idx: &[usize],
) -> Result<Array2<u8>> {
    if let Some(&bad) = marker_idx.iter().find(|&&idx| idx >= chm_len) {
        return Err(ReportError::shape(format!(
            "marker index {} out of range for chromosome length {}",
            bad, chm_len
        )));
    }
    let expanded = expand_predictions(pred, chm_len, window_size)?;
    Ok(expanded.select(Axis(1), marker_idx))
}
