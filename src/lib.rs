//! # ancestry_reports
//!
//! Turns window-level output from a local-ancestry classifier into the two
//! standard per-chromosome report files:
//!
//! - `.msp` — most-probable ancestry code per window and haplotype, prefixed
//!   by window metadata (physical and genetic start/end coordinates, query
//!   SNP counts);
//! - `.fb` — per-window ancestry probabilities, one column per
//!   (sample, haplotype, ancestry) triple.
//!
//! The classifier itself, genetic-map file loading, and argument handling
//! live upstream; this crate receives in-memory arrays and position vectors
//! and is responsible for the coordinate bookkeeping between window indices,
//! physical basepair positions, and genetic (cM) positions, plus the final
//! serialization. All transformations are pure and single-threaded; callers
//! processing multiple chromosomes can parallelize over independent calls.

pub mod error;
pub mod expand;
pub mod genetic_map;
pub mod report;
pub mod windows;

pub use error::{ReportError, Result};
pub use expand::{expand_predictions, predictions_at_markers};
pub use genetic_map::GeneticMap;
pub use report::{
    samples_from_msp_header, write_fb, write_msp, HaplotypeLayout, MSP_META_COLUMNS,
};
pub use windows::{MetadataTable, WindowMeta};
