//! Watermark error types.
//!
//! Defines errors that can occur while building a job or rendering a
//! watermark onto an image.

use std::fmt;

/// Errors that can occur during watermark processing.
#[derive(Debug)]
pub enum WatermarkError {
    /// Failed to read or parse a font file
    FontError(String),

    /// Failed to render text watermark
    RenderError(String),

    /// Invalid job configuration
    ConfigError(String),

    /// Failed to composite watermark onto image
    CompositeError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontError(msg) => write!(f, "Failed to load font: {}", msg),
            Self::RenderError(msg) => write!(f, "Failed to render text watermark: {}", msg),
            Self::ConfigError(msg) => write!(f, "Watermark configuration error: {}", msg),
            Self::CompositeError(msg) => write!(f, "Failed to composite watermark: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatermarkError::FontError("arial.ttf: not a font".to_string());
        assert_eq!(err.to_string(), "Failed to load font: arial.ttf: not a font");

        let err = WatermarkError::RenderError("font not found".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to render text watermark: font not found"
        );

        let err = WatermarkError::ConfigError("invalid opacity".to_string());
        assert_eq!(
            err.to_string(),
            "Watermark configuration error: invalid opacity"
        );

        let err = WatermarkError::CompositeError("image too small".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to composite watermark: image too small"
        );
    }

    #[test]
    fn test_error_debug() {
        let err = WatermarkError::ConfigError("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("ConfigError"));
        assert!(debug_str.contains("test"));
    }
}
