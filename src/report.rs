//! Serialization of the `.msp` and `.fb` report files.
//!
//! Both writers share the metadata table as a row prefix and the
//! [`HaplotypeLayout`] as the single authority on haplotype ordering, so the
//! column layout of the two files cannot drift apart. All dimension checks
//! happen before the output file is created; a report is either written in
//! full or not at all.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use log::info;
use ndarray::{ArrayView2, ArrayView3};

use crate::error::{ReportError, Result};
use crate::windows::MetadataTable;

/// Metadata column names prefixing every MSP row, in file order.
pub const MSP_META_COLUMNS: [&str; 6] = ["chm", "spos", "epos", "sgpos", "egpos", "n snps"];

/// Haplotypes per diploid sample.
pub const HAPS_PER_SAMPLE: usize = 2;

const FB_META_COLUMNS: [&str; 4] = [
    "chromosome",
    "physical position",
    "genetic_position",
    "genetic_marker_index",
];
const FB_DELIMITER: &str = ":::";
const FB_HAP_TAGS: [&str; HAPS_PER_SAMPLE] = ["hap1", "hap2"];

/// Haplotype column ordering shared by the MSP and FB writers.
///
/// Rows of prediction/probability arrays are interleaved sample-major: the
/// two haplotypes of sample `s` occupy rows `2*s` and `2*s + 1`. Column
/// names in both report formats are derived from this one type so the two
/// files cannot disagree on ordering.
#[derive(Clone, Copy, Debug)]
pub struct HaplotypeLayout<'a> {
    samples: &'a [String],
}

impl<'a> HaplotypeLayout<'a> {
    pub fn new(samples: &'a [String]) -> Self {
        Self { samples }
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn n_haplotypes(&self) -> usize {
        self.samples.len() * HAPS_PER_SAMPLE
    }

    /// Row index of (sample, haplotype) in haplotype-major arrays.
    pub fn hap_row(&self, sample: usize, hap: usize) -> usize {
        sample * HAPS_PER_SAMPLE + hap
    }

    /// MSP haplotype column names: `<sample>.0`, `<sample>.1`, ...
    pub fn msp_column_names(&self) -> Vec<String> {
        self.samples
            .iter()
            .flat_map(|s| (0..HAPS_PER_SAMPLE).map(move |h| format!("{s}.{h}")))
            .collect()
    }

    /// FB probability column names: `<sample>:::hap1:::<ancestry>`, ...,
    /// enumerated sample-major, haplotype-second, ancestry-minor.
    pub fn fb_column_names(&self, ancestry: &[String]) -> Vec<String> {
        self.samples
            .iter()
            .flat_map(|s| {
                FB_HAP_TAGS.iter().flat_map(move |&tag| {
                    ancestry
                        .iter()
                        .map(move |a| [s.as_str(), tag, a.as_str()].join(FB_DELIMITER))
                })
            })
            .collect()
    }
}

/// Recover the diploid sample list from MSP column headers: skip the fixed
/// metadata columns, keep one of each haplotype pair, strip the 2-character
/// haplotype suffix.
pub fn samples_from_msp_header<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns
        .iter()
        .skip(MSP_META_COLUMNS.len())
        .step_by(HAPS_PER_SAMPLE)
        .map(|c| strip_hap_suffix(c.as_ref()).to_string())
        .collect()
}

fn strip_hap_suffix(name: &str) -> &str {
    name.char_indices()
        .rev()
        .nth(1)
        .map(|(idx, _)| &name[..idx])
        .unwrap_or("")
}

/// Write `<prefix>.msp`: one row per window holding the metadata columns
/// followed by the predicted ancestry code of every haplotype.
///
/// `pred_labels` has shape `[haplotypes, windows]` with rows in
/// [`HaplotypeLayout`] order; label values are indices into `populations`.
pub fn write_msp(
    prefix: &str,
    meta: &MetadataTable,
    pred_labels: ArrayView2<u8>,
    populations: &[String],
    query_samples: &[String],
) -> Result<()> {
    if populations.is_empty() {
        return Err(ReportError::invalid_data("population list is empty"));
    }
    if query_samples.is_empty() {
        return Err(ReportError::invalid_data("sample list is empty"));
    }
    let layout = HaplotypeLayout::new(query_samples);
    let (n_haps, n_wind) = pred_labels.dim();
    if n_wind != meta.n_windows() {
        return Err(ReportError::shape(format!(
            "prediction array has {} windows but metadata has {} rows",
            n_wind,
            meta.n_windows()
        )));
    }
    if n_haps != layout.n_haplotypes() {
        return Err(ReportError::shape(format!(
            "prediction array has {} rows but {} samples imply {} haplotypes",
            n_haps,
            layout.n_samples(),
            layout.n_haplotypes()
        )));
    }

    let path = PathBuf::from(format!("{prefix}.msp"));
    let file = File::create(&path).map_err(|e| ReportError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    msp_body(&mut writer, meta, pred_labels, populations, &layout)
        .and_then(|()| writer.flush())
        .map_err(|e| ReportError::io(&path, e))?;

    info!(
        "Wrote MSP report to {} ({} windows, {} haplotypes).",
        path.display(),
        n_wind,
        n_haps
    );
    Ok(())
}

fn msp_body(
    writer: &mut impl Write,
    meta: &MetadataTable,
    pred_labels: ArrayView2<u8>,
    populations: &[String],
    layout: &HaplotypeLayout,
) -> io::Result<()> {
    write!(writer, "#Subpopulation order/codes:")?;
    for (code, pop) in populations.iter().enumerate() {
        write!(writer, "\t{pop}={code}")?;
    }
    writeln!(writer)?;

    write!(writer, "#{}", MSP_META_COLUMNS.join("\t"))?;
    for name in layout.msp_column_names() {
        write!(writer, "\t{name}")?;
    }
    writeln!(writer)?;

    for (win, row) in meta.windows.iter().enumerate() {
        write!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            meta.chm, row.spos, row.epos, row.sgpos, row.egpos, row.n_snps
        )?;
        for hap in 0..pred_labels.nrows() {
            write!(writer, "\t{}", pred_labels[[hap, win]])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write `<prefix>.fb`: one row per window holding derived position columns
/// followed by the ancestry probabilities of every (sample, haplotype,
/// ancestry) triple.
///
/// `proba` has shape `[haplotypes, ancestries, windows]` with haplotype rows
/// in [`HaplotypeLayout`] order. The physical position column is the rounded
/// mean of the window's start/end positions, the genetic position the mean
/// of its start/end cM values; the genetic-marker-index column is a `.`
/// placeholder.
pub fn write_fb(
    prefix: &str,
    meta: &MetadataTable,
    proba: ArrayView3<f64>,
    ancestry: &[String],
    query_samples: &[String],
) -> Result<()> {
    if ancestry.is_empty() {
        return Err(ReportError::invalid_data("ancestry list is empty"));
    }
    if query_samples.is_empty() {
        return Err(ReportError::invalid_data("sample list is empty"));
    }
    let layout = HaplotypeLayout::new(query_samples);
    let (n_haps, n_anc, n_wind) = proba.dim();
    if n_wind != meta.n_windows() {
        return Err(ReportError::shape(format!(
            "probability tensor has {} windows but metadata has {} rows",
            n_wind,
            meta.n_windows()
        )));
    }
    if n_anc != ancestry.len() {
        return Err(ReportError::shape(format!(
            "probability tensor has {} ancestries but {} names were supplied",
            n_anc,
            ancestry.len()
        )));
    }
    if n_haps != layout.n_haplotypes() {
        return Err(ReportError::shape(format!(
            "probability tensor has {} haplotype rows but {} samples imply {}",
            n_haps,
            layout.n_samples(),
            layout.n_haplotypes()
        )));
    }

    let path = PathBuf::from(format!("{prefix}.fb"));
    let file = File::create(&path).map_err(|e| ReportError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    fb_body(&mut writer, meta, proba, ancestry, &layout)
        .and_then(|()| writer.flush())
        .map_err(|e| ReportError::io(&path, e))?;

    info!(
        "Wrote FB report to {} ({} windows, {} probability columns).",
        path.display(),
        n_wind,
        n_haps * n_anc
    );
    Ok(())
}

fn fb_body(
    writer: &mut impl Write,
    meta: &MetadataTable,
    proba: ArrayView3<f64>,
    ancestry: &[String],
    layout: &HaplotypeLayout,
) -> io::Result<()> {
    write!(writer, "#reference_panel_population:")?;
    for anc in ancestry {
        write!(writer, "\t{anc}")?;
    }
    writeln!(writer)?;

    write!(writer, "{}", FB_META_COLUMNS.join("\t"))?;
    for name in layout.fb_column_names(ancestry) {
        write!(writer, "\t{name}")?;
    }
    writeln!(writer)?;

    for (win, row) in meta.windows.iter().enumerate() {
        let phys_pos = ((row.spos as f64 + row.epos as f64) / 2.0).round() as u64;
        let gen_pos = (row.sgpos + row.egpos) / 2.0;
        write!(writer, "{}\t{}\t{}\t.", meta.chm, phys_pos, gen_pos)?;
        for sample in 0..layout.n_samples() {
            for hap in 0..HAPS_PER_SAMPLE {
                let hap_row = layout.hap_row(sample, hap);
                for anc in 0..ancestry.len() {
                    write!(writer, "\t{}", proba[[hap_row, anc, win]])?;
                }
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::WindowMeta;
    use ndarray::{array, Array3};

    fn sample_names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn two_window_meta() -> MetadataTable {
        MetadataTable {
            chm: "22".to_string(),
            windows: vec![
                WindowMeta {
                    spos: 100,
                    epos: 200,
                    sgpos: 0.25,
                    egpos: 0.75,
                    n_snps: 3,
                },
                WindowMeta {
                    spos: 201,
                    epos: 301,
                    sgpos: 0.75,
                    egpos: 1.25,
                    n_snps: 2,
                },
            ],
        }
    }

    #[test]
    fn test_msp_column_names_interleave_haplotypes() {
        let samples = sample_names(&["S1", "S2"]);
        let layout = HaplotypeLayout::new(&samples);

        assert_eq!(layout.n_haplotypes(), 4);
        assert_eq!(
            layout.msp_column_names(),
            vec!["S1.0", "S1.1", "S2.0", "S2.1"]
        );
    }

    #[test]
    fn test_fb_column_names_sample_major_ancestry_minor() {
        let samples = sample_names(&["S1", "S2"]);
        let ancestry = sample_names(&["AFR", "EUR"]);
        let layout = HaplotypeLayout::new(&samples);

        assert_eq!(
            layout.fb_column_names(&ancestry),
            vec![
                "S1:::hap1:::AFR",
                "S1:::hap1:::EUR",
                "S1:::hap2:::AFR",
                "S1:::hap2:::EUR",
                "S2:::hap1:::AFR",
                "S2:::hap1:::EUR",
                "S2:::hap2:::AFR",
                "S2:::hap2:::EUR",
            ]
        );
    }

    #[test]
    fn test_hap_row_is_sample_major() {
        let samples = sample_names(&["S1", "S2", "S3"]);
        let layout = HaplotypeLayout::new(&samples);

        assert_eq!(layout.hap_row(0, 0), 0);
        assert_eq!(layout.hap_row(0, 1), 1);
        assert_eq!(layout.hap_row(2, 1), 5);
    }

    #[test]
    fn test_sample_recovery_from_msp_header() {
        let samples = sample_names(&["NA12878", "HG00096"]);
        let layout = HaplotypeLayout::new(&samples);

        let mut columns: Vec<String> =
            MSP_META_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(layout.msp_column_names());

        assert_eq!(samples_from_msp_header(&columns), samples);
    }

    #[test]
    fn test_msp_shape_mismatch_writes_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("out");
        let prefix = prefix.to_str().expect("utf-8 path");

        let meta = two_window_meta();
        let samples = sample_names(&["S1"]);
        let populations = sample_names(&["AFR", "EUR"]);
        // 3 rows for 1 diploid sample: wrong.
        let labels = array![[0u8, 1], [1, 1], [0, 0]];

        let err = write_msp(prefix, &meta, labels.view(), &populations, &samples).unwrap_err();
        assert!(matches!(err, ReportError::ShapeMismatch { .. }));
        assert!(!std::path::Path::new(&format!("{prefix}.msp")).exists());
    }

    #[test]
    fn test_fb_shape_mismatch_writes_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("out");
        let prefix = prefix.to_str().expect("utf-8 path");

        let meta = two_window_meta();
        let samples = sample_names(&["S1"]);
        let ancestry = sample_names(&["AFR", "EUR"]);
        // 3 windows for a 2-row metadata table: wrong.
        let proba = Array3::<f64>::zeros((2, 2, 3));

        let err = write_fb(prefix, &meta, proba.view(), &ancestry, &samples).unwrap_err();
        assert!(matches!(err, ReportError::ShapeMismatch { .. }));
        assert!(!std::path::Path::new(&format!("{prefix}.fb")).exists());
    }

    #[test]
    fn test_empty_population_list_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("out");
        let prefix = prefix.to_str().expect("utf-8 path");

        let meta = two_window_meta();
        let samples = sample_names(&["S1"]);
        let labels = array![[0u8, 1], [1, 1]];

        let err = write_msp(prefix, &meta, labels.view(), &[], &samples).unwrap_err();
        assert!(matches!(err, ReportError::InvalidData { .. }));
    }
}
