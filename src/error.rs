// Error types module

use std::fmt;

/// Centralized error type for a watermark run
///
/// Categorizes run-level failures. Per-file failures never surface here;
/// they are recorded in the batch report and the run continues.
#[derive(Debug, Clone)]
pub enum CopymarkError {
    /// Configuration errors (no input selected, no images found, invalid job)
    Config(String),

    /// I/O failures outside a single file's processing (output directory)
    Io(String),

    /// Internal errors outside the per-file boundary
    Internal(String),
}

impl fmt::Display for CopymarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopymarkError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CopymarkError::Io(msg) => write!(f, "I/O error: {}", msg),
            CopymarkError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CopymarkError {}

impl From<crate::batch::BatchError> for CopymarkError {
    fn from(err: crate::batch::BatchError) -> Self {
        use crate::batch::BatchError;
        match err {
            BatchError::NoInputSelected | BatchError::NoImagesFound { .. } => {
                CopymarkError::Config(err.to_string())
            }
            BatchError::ReadInput { .. } | BatchError::OutputDirectory { .. } => {
                CopymarkError::Io(err.to_string())
            }
        }
    }
}

impl From<crate::watermark::WatermarkError> for CopymarkError {
    fn from(err: crate::watermark::WatermarkError) -> Self {
        use crate::watermark::WatermarkError;
        match err {
            WatermarkError::ConfigError(_) => CopymarkError::Config(err.to_string()),
            _ => CopymarkError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchError;
    use std::path::PathBuf;

    #[test]
    fn test_error_display() {
        let err = CopymarkError::Config("no input".to_string());
        assert_eq!(err.to_string(), "Configuration error: no input");

        let err = CopymarkError::Io("disk full".to_string());
        assert_eq!(err.to_string(), "I/O error: disk full");
    }

    #[test]
    fn test_batch_errors_map_to_run_taxonomy() {
        let err: CopymarkError = BatchError::NoInputSelected.into();
        assert!(matches!(err, CopymarkError::Config(_)));

        let err: CopymarkError = BatchError::NoImagesFound {
            path: PathBuf::from("/tmp/empty"),
        }
        .into();
        assert!(matches!(err, CopymarkError::Config(_)));

        let err: CopymarkError = BatchError::OutputDirectory {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(matches!(err, CopymarkError::Io(_)));
    }
}
