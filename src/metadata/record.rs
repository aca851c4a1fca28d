//! Provenance record embedded in every output file.

use crate::watermark::{Anchor, WatermarkJob};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Snapshot of the job parameters that produced an output file.
///
/// Serialized as compact JSON into the EXIF UserComment field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub text: String,
    pub author: String,
    pub title: String,
    pub subject: String,
    pub comment: String,
    /// ISO-8601 timestamp with local offset
    pub date_applied: DateTime<Local>,
    /// 0.0..=1.0
    pub opacity: f32,
    /// Linear anchor, `null` in mosaic mode
    pub position: Option<Anchor>,
    pub is_mosaic: bool,
    /// Linear line count, `null` in mosaic mode
    pub num_watermarks: Option<u8>,
    pub font: String,
    pub is_bold: bool,
    pub font_size_percent: f32,
    pub application: String,
    pub version: String,
}

impl ProvenanceRecord {
    pub fn from_job(job: &WatermarkJob, date_applied: DateTime<Local>) -> Self {
        let metadata = job.metadata();
        let font = job.font();
        Self {
            text: job.text().to_string(),
            author: metadata.author.trim().to_string(),
            title: metadata.title.clone(),
            subject: metadata.subject.clone(),
            comment: metadata.comment.clone(),
            date_applied,
            opacity: job.opacity(),
            position: job.layout().anchor(),
            is_mosaic: job.layout().is_mosaic(),
            num_watermarks: job.layout().count(),
            font: font.name.clone(),
            is_bold: font.bold,
            font_size_percent: font.size_percent,
            application: metadata.application_name.clone(),
            version: metadata.version.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
