//! Physical-to-genetic coordinate interpolation.
//!
//! A [`GeneticMap`] holds the (basepair, centimorgan) column pair of a
//! recombination map and interpolates the genetic position of arbitrary
//! physical positions. Between map points the interpolation is piecewise
//! linear; outside the covered range the nearest boundary's cM value is
//! returned unchanged (flat extrapolation). The flat policy is deliberate:
//! window edges that fall before the first or after the last map entry are
//! pinned to the map ends rather than extended along the boundary slope.

use log::debug;

use crate::error::{ReportError, Result};

/// A genetic map for one chromosome: physical positions (bp) paired with
/// genetic positions (cM), both strictly increasing.
#[derive(Clone, Debug)]
pub struct GeneticMap {
    positions: Vec<u64>,
    gen_positions: Vec<f64>,
}

impl GeneticMap {
    /// Build a map from its two columns, validating that both are strictly
    /// increasing and of equal, non-zero length.
    pub fn new(positions: Vec<u64>, gen_positions: Vec<f64>) -> Result<Self> {
        if positions.is_empty() {
            return Err(ReportError::invalid_data("genetic map has no entries"));
        }
        if positions.len() != gen_positions.len() {
            return Err(ReportError::invalid_data(format!(
                "genetic map column lengths differ: {} physical vs {} genetic positions",
                positions.len(),
                gen_positions.len()
            )));
        }
        for i in 1..positions.len() {
            if positions[i] <= positions[i - 1] {
                return Err(ReportError::invalid_data(format!(
                    "genetic map physical positions not strictly increasing at entry {} ({} after {})",
                    i,
                    positions[i],
                    positions[i - 1]
                )));
            }
            if gen_positions[i] <= gen_positions[i - 1] {
                return Err(ReportError::invalid_data(format!(
                    "genetic map cM positions not strictly increasing at entry {} ({} after {})",
                    i, gen_positions[i], gen_positions[i - 1]
                )));
            }
        }
        if let Some(bad) = gen_positions.iter().find(|g| !g.is_finite()) {
            return Err(ReportError::invalid_data(format!(
                "genetic map cM position is not finite: {bad}"
            )));
        }
        debug!(
            "Genetic map with {} entries spanning {}-{} bp ({}-{} cM).",
            positions.len(),
            positions[0],
            positions[positions.len() - 1],
            gen_positions[0],
            gen_positions[gen_positions.len() - 1]
        );
        Ok(Self {
            positions,
            gen_positions,
        })
    }

    /// Interpolate the genetic position (cM) of a physical position (bp).
    ///
    /// Positions outside the map's covered range return the first/last cM
    /// value (flat extrapolation).
    pub fn interpolate(&self, phys_pos: u64) -> f64 {
        let last = self.positions.len() - 1;
        if phys_pos <= self.positions[0] {
            return self.gen_positions[0];
        }
        if phys_pos >= self.positions[last] {
            return self.gen_positions[last];
        }

        match self.positions.binary_search(&phys_pos) {
            Ok(idx) => self.gen_positions[idx],
            Err(idx) => {
                // Interpolate between idx-1 and idx
                let p0 = self.positions[idx - 1] as f64;
                let p1 = self.positions[idx] as f64;
                let g0 = self.gen_positions[idx - 1];
                let g1 = self.gen_positions[idx];
                let t = (phys_pos as f64 - p0) / (p1 - p0);
                g0 + t * (g1 - g0)
            }
        }
    }

    /// Number of map entries.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
