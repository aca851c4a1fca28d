//! Provenance metadata for output files.
//!
//! Every output is a JPEG, so every output gets an EXIF block: the JSON
//! [`ProvenanceRecord`] in UserComment plus the standard descriptive fields
//! (copyright, artist, software, capture date, description, document name and
//! the Windows XP* slots). Metadata is best effort: if the block cannot be
//! built or embedded, the pixels are saved without it.

pub mod embed;
pub mod record;

pub use embed::{read_embedded, read_source_exif, EmbeddedMetadata};
pub use record::ProvenanceRecord;

use crate::codec::{write_file, CodecError};
use crate::watermark::WatermarkJob;
use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Serialization error: {0}")]
    Serialize(serde_json::Error),

    #[error("Failed to build EXIF block: {0}")]
    Build(String),

    #[error("EXIF segment of {size} bytes exceeds the JPEG segment limit")]
    SegmentTooLarge { size: usize },

    #[error("Failed to embed EXIF block: {0}")]
    Embed(String),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No readable EXIF block: {0}")]
    Parse(String),

    #[error("No provenance record embedded")]
    MissingProvenance,
}

/// Whether an output file carries its provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataStatus {
    Embedded,
    /// Saved with pixel data only
    Fallback { reason: String },
}

impl MetadataStatus {
    pub fn is_embedded(&self) -> bool {
        matches!(self, MetadataStatus::Embedded)
    }
}

/// Attach the provenance block to an encoded JPEG.
pub fn with_provenance(
    jpeg: &[u8],
    source: Option<&exif::Exif>,
    job: &WatermarkJob,
    document_name: &str,
) -> Result<Vec<u8>, MetadataError> {
    let record = ProvenanceRecord::from_job(job, Local::now());
    let tiff = embed::build_exif(source, job, &record, document_name)?;
    embed::embed_exif(jpeg, tiff)
}

/// Write `jpeg` to `output` with provenance metadata, falling back to the
/// bare pixels when the metadata cannot be embedded or written.
///
/// Fails only when the metadata-less save fails too.
pub fn save_jpeg(
    output: &Path,
    jpeg: &[u8],
    source: Option<&exif::Exif>,
    job: &WatermarkJob,
) -> Result<MetadataStatus, CodecError> {
    let document_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let reason = match with_provenance(jpeg, source, job, &document_name) {
        Ok(bytes) => match write_file(output, &bytes) {
            Ok(()) => return Ok(MetadataStatus::Embedded),
            Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
    };

    tracing::warn!(
        output = %output.display(),
        reason = %reason,
        "Metadata not embedded, saving pixels only"
    );
    write_file(output, jpeg)?;
    Ok(MetadataStatus::Fallback { reason })
}

/// Read the provenance record embedded in a produced file.
pub fn read_provenance(path: &Path) -> Result<ProvenanceRecord, MetadataError> {
    read_embedded(path)?
        .provenance
        .ok_or(MetadataError::MissingProvenance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_jpeg;
    use crate::watermark::Anchor;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn job() -> WatermarkJob {
        WatermarkJob::builder()
            .text("© Test")
            .opacity_percent(50)
            .linear(1, Anchor::BottomRight)
            .build()
            .unwrap()
    }

    fn jpeg() -> Vec<u8> {
        encode_jpeg(&RgbImage::from_pixel(8, 8, Rgb([1, 2, 3])), 95).unwrap()
    }

    #[test]
    fn test_save_and_read_provenance() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("image_001.jpg");

        let status = save_jpeg(&output, &jpeg(), None, &job()).unwrap();
        assert_eq!(status, MetadataStatus::Embedded);

        let record = read_provenance(&output).unwrap();
        assert_eq!(record.text, "© Test");
        assert_eq!(record.position, Some(Anchor::BottomRight));
        assert!((record.opacity - 0.5).abs() < f32::EPSILON);

        let embedded = read_embedded(&output).unwrap();
        assert_eq!(embedded.document_name.as_deref(), Some("image_001.jpg"));
    }

    #[test]
    fn test_fallback_saves_pixels_when_embedding_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jpg");

        // Not a JPEG container: embedding fails, bytes are still written
        let bytes = b"raw pixel payload".to_vec();
        let status = save_jpeg(&output, &bytes, None, &job()).unwrap();
        assert!(matches!(status, MetadataStatus::Fallback { .. }));
        assert!(!status.is_embedded());
        assert_eq!(std::fs::read(&output).unwrap(), bytes);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("missing").join("out.jpg");
        assert!(save_jpeg(&output, &jpeg(), None, &job()).is_err());
    }

    #[test]
    fn test_read_provenance_without_exif() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("plain.jpg");
        std::fs::write(&output, jpeg()).unwrap();
        assert!(read_provenance(&output).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MetadataError::SegmentTooLarge { size: 70000 }.to_string(),
            "EXIF segment of 70000 bytes exceeds the JPEG segment limit"
        );
        assert_eq!(
            MetadataError::MissingProvenance.to_string(),
            "No provenance record embedded"
        );
    }
}
