//! Codec error types

use std::fmt;

/// Errors that can occur while reading or encoding an image file
#[derive(Debug, Clone)]
pub enum CodecError {
    /// The file could not be read
    ReadFailed { message: String },
    /// Image format is not supported
    UnsupportedFormat { format: String },
    /// Failed to decode image data
    DecodeFailed { message: String },
    /// Encoding to the output format failed
    EncodeFailed { format: String, message: String },
    /// Writing the encoded file failed
    WriteFailed { message: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ReadFailed { message } => write!(f, "Failed to read image: {}", message),
            CodecError::UnsupportedFormat { format } => {
                write!(f, "Unsupported image format: {}", format)
            }
            CodecError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            CodecError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            CodecError::WriteFailed { message } => {
                write!(f, "Failed to write image: {}", message)
            }
        }
    }
}

impl std::error::Error for CodecError {}

impl CodecError {
    pub fn read_failed(message: impl Into<String>) -> Self {
        CodecError::ReadFailed {
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        CodecError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        CodecError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn write_failed(message: impl Into<String>) -> Self {
        CodecError::WriteFailed {
            message: message.into(),
        }
    }
}
