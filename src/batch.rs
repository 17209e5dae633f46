use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::despike::despike;
use crate::data::loader::load_file;
use crate::data::model::{DespikeParams, SampleSeries};
use crate::data::writer::{base_name, output_path_for, write_csv};
use crate::error::Result;
use crate::render::{plot_path_for, render_comparison};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Also save `<base>-comparison.jpg` next to each input.
    pub render_plot: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { render_plot: true }
    }
}

// ---------------------------------------------------------------------------
// Per-file result
// ---------------------------------------------------------------------------

/// Everything produced for one successfully processed file.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub original: SampleSeries,
    pub corrected: SampleSeries,
    pub mask: Vec<bool>,
    pub output_path: PathBuf,
    /// Set only when the chart was written.
    pub plot_path: Option<PathBuf>,
    /// Why the chart could not be written, if it was requested.
    pub plot_error: Option<String>,
}

impl ProcessedFile {
    pub fn spike_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Positions of the flagged samples, for marking them on a plot.
    pub fn spike_indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Success,
    /// Numeric output written, chart failed.
    PartialSuccess { plot_error: String },
    Failure { reason: String },
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub status: FileStatus,
    /// `None` when the file failed.
    pub processed: Option<ProcessedFile>,
}

impl FileReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failure { .. })
    }

    /// One-line summary for the status list.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = self.processed.as_ref().map(|p| p.output_path.display());
        match (&self.status, output) {
            (FileStatus::Failure { reason }, _) => {
                write!(f, "Processing failed {}: {reason}", self.input.display())
            }
            (FileStatus::PartialSuccess { plot_error }, Some(out)) => write!(
                f,
                "Processing complete: {out} (comparison chart failed: {plot_error})"
            ),
            (FileStatus::Success, Some(out)) => {
                let with_plot = self
                    .processed
                    .as_ref()
                    .is_some_and(|p| p.plot_path.is_some());
                if with_plot {
                    write!(f, "Processing complete: {out} (with comparison chart)")
                } else {
                    write!(f, "Processing complete: {out}")
                }
            }
            (_, None) => write!(f, "Processing complete: {}", self.input.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Load, despike and write one file. Chart failures are recorded on the
/// result instead of failing it.
pub fn process_file(
    path: &Path,
    params: &DespikeParams,
    options: &BatchOptions,
) -> Result<ProcessedFile> {
    let original = load_file(path)?;
    let outcome = despike(&original.y, params)?;
    let corrected = original.with_intensity(outcome.corrected);

    let output_path = output_path_for(path);
    write_csv(&output_path, &corrected)?;

    let mut plot_path = None;
    let mut plot_error = None;
    if options.render_plot {
        let target = plot_path_for(path);
        let title = format!("{} Data Processing Comparison", base_name(path));
        match render_comparison(&target, &original, &corrected, &title) {
            Ok(()) => plot_path = Some(target),
            Err(e) => {
                log::warn!("Comparison chart for {} not written: {e}", path.display());
                plot_error = Some(e.to_string());
            }
        }
    }

    Ok(ProcessedFile {
        original,
        corrected,
        mask: outcome.mask,
        output_path,
        plot_path,
        plot_error,
    })
}

/// Process every path in order. A failing file never stops the batch; each
/// input gets exactly one report, in input order.
///
/// Parameters are validated up front, so invalid ones reject the whole run.
pub fn process_batch<P: AsRef<Path>>(
    paths: &[P],
    params: &DespikeParams,
    options: &BatchOptions,
) -> Result<Vec<FileReport>> {
    params.validate()?;
    log::info!(
        "Processing {} file(s) with window size {} and threshold multiplier {}",
        paths.len(),
        params.window_size,
        params.threshold_multiplier
    );

    let reports = paths
        .iter()
        .map(|p| {
            let input = p.as_ref().to_path_buf();
            let report = match process_file(&input, params, options) {
                Ok(processed) => {
                    let status = match &processed.plot_error {
                        Some(err) => FileStatus::PartialSuccess {
                            plot_error: err.clone(),
                        },
                        None => FileStatus::Success,
                    };
                    log::info!(
                        "{}: {} spike(s) removed",
                        input.display(),
                        processed.spike_count()
                    );
                    FileReport {
                        input,
                        status,
                        processed: Some(processed),
                    }
                }
                Err(e) => FileReport {
                    input,
                    status: FileStatus::Failure {
                        reason: e.to_string(),
                    },
                    processed: None,
                },
            };
            if report.is_failure() {
                log::error!("{report}");
            }
            report
        })
        .collect();

    Ok(reports)
}
