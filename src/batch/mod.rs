//! Batch processing: input discovery, output naming and the runner.

pub mod naming;
pub mod runner;

pub use naming::{batch_file_name, collect_inputs, deduplicate, output_path};
pub use runner::{BatchReport, BatchRunner, FileFailure, FileOutcome, FileStage};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run before or outside per-file processing
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No input selected")]
    NoInputSelected,

    #[error("No images found in {}", path.display())]
    NoImagesFound { path: PathBuf },

    #[error("Failed to read input {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}
