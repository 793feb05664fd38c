//! Per-window metadata: physical/genetic coordinates and query-SNP counts.
//!
//! Windows are contiguous blocks of `wind_size` model SNPs; the final window
//! absorbs the remainder when the model SNP count is not a multiple of
//! `wind_size`. The metadata table carries one row per window and is the
//! shared prefix of both report formats.

use log::debug;

use crate::error::{ReportError, Result};
use crate::genetic_map::GeneticMap;

/// One metadata row: coordinates and query-SNP count for a single window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowMeta {
    /// Physical position (bp) of the first model SNP in the window.
    pub spos: u64,
    /// Physical position (bp) of the last model SNP in the window.
    pub epos: u64,
    /// Genetic position (cM) of `spos`, rounded to 5 decimals.
    pub sgpos: f64,
    /// Genetic position (cM) of `epos`, rounded to 5 decimals.
    pub egpos: f64,
    /// Number of query SNPs attributed to the window.
    pub n_snps: usize,
}

/// Window metadata for one chromosome, in window order.
#[derive(Clone, Debug)]
pub struct MetadataTable {
    pub chm: String,
    pub windows: Vec<WindowMeta>,
}

impl MetadataTable {
    /// Build the metadata table for `n_wind` windows of `wind_size` model
    /// SNPs over `model_pos`, counting how many `query_pos` entries fall in
    /// each window.
    ///
    /// A query position belongs to the earliest window whose end position is
    /// `>=` the query position; positions beyond the last window's end are
    /// clamped to the last window, so every query position is counted
    /// exactly once.
    pub fn build(
        chm: &str,
        model_pos: &[u64],
        query_pos: &[u64],
        n_wind: usize,
        wind_size: usize,
        genetic_map: &GeneticMap,
    ) -> Result<Self> {
        if wind_size == 0 {
            return Err(ReportError::shape("window size must be positive"));
        }
        if n_wind == 0 {
            return Err(ReportError::shape("window count must be positive"));
        }
        if model_pos.is_empty() {
            return Err(ReportError::invalid_data("model position vector is empty"));
        }
        for i in 1..model_pos.len() {
            if model_pos[i] <= model_pos[i - 1] {
                return Err(ReportError::invalid_data(format!(
                    "model positions not strictly increasing at index {} ({} after {})",
                    i,
                    model_pos[i],
                    model_pos[i - 1]
                )));
            }
        }

        let model_chm_len = model_pos.len();
        let start_idx: Vec<usize> = (0..model_chm_len).step_by(wind_size).collect();
        if start_idx.len() != n_wind {
            return Err(ReportError::shape(format!(
                "{} model SNPs with window size {} yield {} windows, but {} were requested",
                model_chm_len,
                wind_size,
                start_idx.len(),
                n_wind
            )));
        }

        // End index of each window = next start - 1; the last window is
        // clamped to the final model SNP and absorbs the remainder.
        let end_idx: Vec<usize> = (0..n_wind)
            .map(|w| {
                if w + 1 < n_wind {
                    start_idx[w + 1] - 1
                } else {
                    model_chm_len - 1
                }
            })
            .collect();

        let spos: Vec<u64> = start_idx.iter().map(|&i| model_pos[i]).collect();
        let epos: Vec<u64> = end_idx.iter().map(|&i| model_pos[i]).collect();

        let mut n_snps = vec![0usize; n_wind];
        for &q in query_pos {
            let window = epos.partition_point(|&e| e < q).min(n_wind - 1);
            n_snps[window] += 1;
        }

        let windows: Vec<WindowMeta> = (0..n_wind)
            .map(|w| WindowMeta {
                spos: spos[w],
                epos: epos[w],
                sgpos: round5(genetic_map.interpolate(spos[w])),
                egpos: round5(genetic_map.interpolate(epos[w])),
                n_snps: n_snps[w],
            })
            .collect();

        debug!(
            "Built metadata for chromosome {}: {} windows over {} model SNPs, {} query SNPs.",
            chm,
            n_wind,
            model_chm_len,
            query_pos.len()
        );

        Ok(Self {
            chm: chm.to_string(),
            windows,
        })
    }

    /// Number of windows (metadata rows).
    pub fn n_windows(&self) -> usize {
        self.windows.len()
    }

    /// Total query SNPs across all windows; equals the query position count
    /// the table was built from.
    pub fn total_query_snps(&self) -> usize {
        self.windows.iter().map(|w| w.n_snps).sum()
    }
}

/// Round to 5 decimal digits, matching the precision of the report formats.
fn round5(x: f64) -> f64 {
    (x * 1e5).round() / 1e5
}
