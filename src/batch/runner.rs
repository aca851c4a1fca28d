//! Sequential batch runner.
//!
//! Each file goes through `Open -> Composite -> Encode -> Save`. A file that
//! fails at any stage is recorded and the batch moves on; only problems
//! outside a single file (no inputs, unusable output directory) abort the
//! run. Metadata problems never fail a file on their own: the save falls
//! back to pixels only.

use super::naming::{collect_inputs, output_path};
use super::BatchError;
use crate::codec::{decode_file, encode_jpeg};
use crate::constants::JPEG_QUALITY;
use crate::logging::create_file_span;
use crate::metadata::{read_source_exif, save_jpeg, MetadataStatus};
use crate::watermark::{FontResolver, WatermarkJob, WatermarkRenderer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stage at which a file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    /// Could not be read or decoded; the file is skipped
    Open,
    Composite,
    Encode,
    Save,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStage::Open => "open",
            FileStage::Composite => "composite",
            FileStage::Encode => "encode",
            FileStage::Save => "save",
        };
        f.write_str(name)
    }
}

/// A file written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub metadata: MetadataStatus,
    /// Source was not a JPEG and has been converted
    pub transcoded: bool,
}

/// A file that produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub source: PathBuf,
    pub stage: FileStage,
    pub reason: String,
}

/// Per-file results of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<FileOutcome>,
    pub failed: Vec<FileFailure>,
    /// Stopped before every input was attempted
    pub cancelled: bool,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    pub fn embedded_count(&self) -> usize {
        self.succeeded
            .iter()
            .filter(|o| o.metadata.is_embedded())
            .count()
    }

    pub fn transcoded_count(&self) -> usize {
        self.succeeded.iter().filter(|o| o.transcoded).count()
    }

    /// End-of-run summary for the caller.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Processed {} image(s): {} succeeded, {} failed",
            self.processed(),
            self.succeeded.len(),
            self.failed.len()
        )];

        if !self.succeeded.is_empty() {
            let embedded = self.embedded_count();
            if embedded == self.succeeded.len() {
                lines.push("Metadata embedded in every output".to_string());
            } else {
                lines.push(format!(
                    "Metadata embedded in {} of {} outputs",
                    embedded,
                    self.succeeded.len()
                ));
            }

            let transcoded = self.transcoded_count();
            if transcoded > 0 {
                lines.push(format!("{} non-JPEG source(s) converted to JPEG", transcoded));
            }
        }

        for failure in &self.failed {
            lines.push(format!(
                "Failed {} ({}): {}",
                failure.source.display(),
                failure.stage,
                failure.reason
            ));
        }

        if self.cancelled {
            lines.push("Cancelled before all files were processed".to_string());
        }

        lines.join("\n")
    }
}

/// Applies one job to a set of files, one at a time.
pub struct BatchRunner {
    job: WatermarkJob,
    renderer: WatermarkRenderer,
    output_dir: Option<PathBuf>,
    cancel: Arc<AtomicBool>,
}

impl BatchRunner {
    /// Resolve and load the job's font once for the whole run.
    pub fn new(job: WatermarkJob, resolver: &FontResolver) -> Self {
        let renderer = WatermarkRenderer::new(&job, resolver);
        Self::with_renderer(job, renderer)
    }

    pub fn with_renderer(job: WatermarkJob, renderer: WatermarkRenderer) -> Self {
        Self {
            job,
            renderer,
            output_dir: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Write outputs here instead of next to each source.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Share a cancellation flag, checked before each file.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn job(&self) -> &WatermarkJob {
        &self.job
    }

    pub fn renderer(&self) -> &WatermarkRenderer {
        &self.renderer
    }

    /// Process a directory or a single file.
    pub fn run_input(&self, input: &Path) -> Result<BatchReport, BatchError> {
        let prefix = self.job.output().output_prefix();
        let inputs = collect_inputs(input, prefix.as_deref())?;
        self.run(&inputs)
    }

    /// Process `inputs` in order.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<BatchReport, BatchError> {
        if inputs.is_empty() {
            return Err(BatchError::NoInputSelected);
        }

        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir).map_err(|source| BatchError::OutputDirectory {
                path: dir.clone(),
                source,
            })?;
        }

        let total = inputs.len();
        tracing::info!(total = total, text = %self.job.text(), "Starting batch");

        let mut report = BatchReport::default();
        for (position, source) in inputs.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!(remaining = total - position, "Batch cancelled");
                report.cancelled = true;
                break;
            }

            let span = create_file_span(position + 1, total, &source.display().to_string());
            let _guard = span.enter();

            let dir = match &self.output_dir {
                Some(dir) => dir.clone(),
                None => source
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            };
            let output = output_path(self.job.output(), &dir, position);

            match self.process_file(source, &output) {
                Ok(outcome) => {
                    tracing::info!(
                        output = %outcome.output.display(),
                        metadata = outcome.metadata.is_embedded(),
                        transcoded = outcome.transcoded,
                        "Image watermarked"
                    );
                    report.succeeded.push(outcome);
                }
                Err(failure) => {
                    tracing::error!(
                        stage = %failure.stage,
                        reason = %failure.reason,
                        "Image failed"
                    );
                    report.failed.push(failure);
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "Batch finished"
        );
        Ok(report)
    }

    /// Watermark one file into `output`.
    pub fn process_file(&self, source: &Path, output: &Path) -> Result<FileOutcome, FileFailure> {
        let fail = |stage: FileStage, reason: String| FileFailure {
            source: source.to_path_buf(),
            stage,
            reason,
        };

        let decoded = decode_file(source).map_err(|e| fail(FileStage::Open, e.to_string()))?;
        let transcoded = !decoded.format.is_jpeg();
        let rgb = self
            .renderer
            .render(&decoded.image, &self.job)
            .map_err(|e| fail(FileStage::Composite, e.to_string()))?;
        drop(decoded);

        let jpeg = encode_jpeg(&rgb, JPEG_QUALITY).map_err(|e| fail(FileStage::Encode, e.to_string()))?;
        drop(rgb);

        let source_exif = read_source_exif(source);
        let metadata = save_jpeg(output, &jpeg, source_exif.as_ref(), &self.job)
            .map_err(|e| fail(FileStage::Save, e.to_string()))?;

        Ok(FileOutcome {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            metadata,
            transcoded,
        })
    }
}
