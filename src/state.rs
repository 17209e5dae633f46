use std::path::PathBuf;

use spark_remove::batch::{process_batch, FileReport, ProcessedFile};
use spark_remove::{BatchOptions, DespikeParams};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Files queued for the next run, in the order they were picked.
    pub file_paths: Vec<PathBuf>,

    /// Window size / threshold multiplier as edited in the side panel.
    pub params: DespikeParams,

    pub options: BatchOptions,

    /// Status lines from every run so far, oldest first.
    pub status_lines: Vec<StatusLine>,

    /// Successfully processed files of the last run, for the preview plot.
    pub previews: Vec<(PathBuf, ProcessedFile)>,

    /// Index into `previews` shown in the central panel.
    pub selected_preview: usize,

    /// Error that prevented a run from starting at all.
    pub status_message: Option<String>,
}

pub struct StatusLine {
    pub text: String,
    pub failed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            file_paths: Vec::new(),
            params: DespikeParams::default(),
            options: BatchOptions::default(),
            status_lines: Vec::new(),
            previews: Vec::new(),
            selected_preview: 0,
            status_message: None,
        }
    }
}

impl AppState {
    /// Replace the queued files with a fresh selection.
    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        log::info!("Selected {} file(s)", files.len());
        self.file_paths = files;
        self.status_lines.clear();
        self.status_message = None;
    }

    /// Forget queued files and everything shown for them.
    pub fn clear(&mut self) {
        self.file_paths.clear();
        self.status_lines.clear();
        self.previews.clear();
        self.selected_preview = 0;
        self.status_message = None;
    }

    /// Run the batch synchronously and collect status lines and previews.
    pub fn process(&mut self) {
        if self.file_paths.is_empty() {
            self.status_message = Some("No files selected.".into());
            return;
        }

        match process_batch(self.file_paths.as_slice(), &self.params, &self.options) {
            Ok(reports) => {
                self.status_message = None;
                self.previews.clear();
                self.selected_preview = 0;
                for report in reports {
                    self.ingest(report);
                }
            }
            Err(e) => {
                log::error!("Batch rejected: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    fn ingest(&mut self, report: FileReport) {
        self.status_lines.push(StatusLine {
            text: report.message(),
            failed: report.is_failure(),
        });
        if let Some(processed) = report.processed {
            self.previews.push((report.input, processed));
        }
    }

    /// The processed file currently selected for preview.
    pub fn current_preview(&self) -> Option<&(PathBuf, ProcessedFile)> {
        self.previews.get(self.selected_preview)
    }
}
