//! Watermark job configuration.
//!
//! A [`WatermarkJob`] is the fully-resolved, immutable description of one
//! run: what text to draw, how to lay it out, which font to use, what to
//! embed as provenance metadata and how to name the outputs. It is built
//! once through [`WatermarkJobBuilder`] and only ever borrowed afterwards.

use super::text_renderer::Color;
use super::WatermarkError;
use crate::constants::{
    APPLICATION_NAME, APPLICATION_VERSION, DEFAULT_BASE_NAME, DEFAULT_FONT_NAME,
    DEFAULT_FONT_SIZE_PERCENT, DEFAULT_MOSAIC_SPACING, DEFAULT_OPACITY_PERCENT,
    DEFAULT_START_INDEX, MAX_LINEAR_COUNT, MIN_MOSAIC_SPACING,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Anchor of linear watermarks on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Anchor {
    /// All anchors, in display order.
    pub const ALL: [Anchor; 5] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Center,
    ];

    /// Kebab-case name, as stored in the provenance record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        }
    }

    /// Whether the anchor hugs the right edge.
    pub fn is_right(&self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    /// Whether the anchor stacks lines upwards from the bottom edge.
    pub fn is_bottom(&self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How watermark instances are laid out. Linear and mosaic are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LayoutMode {
    /// `count` stacked lines anchored at `anchor`
    Linear { count: u8, anchor: Anchor },
    /// Rotated, staggered tiling over the whole canvas
    Mosaic { spacing_h: f32, spacing_v: f32 },
}

impl LayoutMode {
    pub fn is_mosaic(&self) -> bool {
        matches!(self, Self::Mosaic { .. })
    }

    /// Anchor of a linear layout, `None` for mosaic.
    pub fn anchor(&self) -> Option<Anchor> {
        match self {
            Self::Linear { anchor, .. } => Some(*anchor),
            Self::Mosaic { .. } => None,
        }
    }

    /// Line count of a linear layout, `None` for mosaic.
    pub fn count(&self) -> Option<u8> {
        match self {
            Self::Linear { count, .. } => Some(*count),
            Self::Mosaic { .. } => None,
        }
    }
}

impl Default for LayoutMode {
    fn default() -> Self {
        Self::Linear {
            count: 1,
            anchor: Anchor::BottomRight,
        }
    }
}

/// Copyright symbols offered as a text prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyrightSymbol {
    Copyright,
    Registered,
    Trademark,
    #[serde(rename = "(c)")]
    ParenC,
    AllRightsReserved,
}

impl CopyrightSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copyright => "©",
            Self::Registered => "®",
            Self::Trademark => "™",
            Self::ParenC => "(c)",
            Self::AllRightsReserved => "All Rights Reserved",
        }
    }
}

/// Font selection for the watermark text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Logical family name (e.g. "Arial")
    pub name: String,
    /// Request the bold weight
    pub bold: bool,
    /// Font size as percent of the image width
    pub size_percent: f32,
}

impl FontSpec {
    /// Font size in pixels for an image of the given width.
    ///
    /// Recomputed per image since widths vary across a batch. Never below 1.
    pub fn font_size_px(&self, image_width: u32) -> u32 {
        let px = (image_width as f64 * self.size_percent as f64 / 100.0).round();
        (px as u32).max(1)
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_FONT_NAME.to_string(),
            bold: false,
            size_percent: DEFAULT_FONT_SIZE_PERCENT,
        }
    }
}

/// Descriptive fields embedded as provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFields {
    /// Author; also drawn as the signature line in linear mode
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_application_name")]
    pub application_name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_application_name() -> String {
    APPLICATION_NAME.to_string()
}

fn default_version() -> String {
    APPLICATION_VERSION.to_string()
}

impl Default for MetadataFields {
    fn default() -> Self {
        Self {
            author: String::new(),
            title: String::new(),
            subject: String::new(),
            comment: String::new(),
            application_name: default_application_name(),
            version: default_version(),
        }
    }
}

/// Where outputs are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// `{base_name}_{index:03}.jpg` starting at `start_index`
    Batch { base_name: String, start_index: u32 },
    /// One explicit output file
    Single { path: PathBuf },
}

impl OutputNaming {
    /// Prefix that marks a file as a previous output of this naming scheme.
    pub fn output_prefix(&self) -> Option<String> {
        match self {
            Self::Batch { base_name, .. } => Some(format!("{}_", base_name)),
            Self::Single { .. } => None,
        }
    }
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self::Batch {
            base_name: DEFAULT_BASE_NAME.to_string(),
            start_index: DEFAULT_START_INDEX,
        }
    }
}

/// Immutable watermark job.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkJob {
    text: String,
    color: Color,
    opacity_percent: u8,
    font: FontSpec,
    layout: LayoutMode,
    metadata: MetadataFields,
    output: OutputNaming,
}

impl WatermarkJob {
    pub fn builder() -> WatermarkJobBuilder {
        WatermarkJobBuilder::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn opacity_percent(&self) -> u8 {
        self.opacity_percent
    }

    /// Opacity as a 0.0..=1.0 fraction.
    pub fn opacity(&self) -> f32 {
        self.opacity_percent as f32 / 100.0
    }

    /// Alpha byte used to fill glyphs: `round(255 * opacity / 100)`.
    pub fn alpha_byte(&self) -> u8 {
        alpha_byte(self.opacity_percent)
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn layout(&self) -> &LayoutMode {
        &self.layout
    }

    pub fn metadata(&self) -> &MetadataFields {
        &self.metadata
    }

    pub fn output(&self) -> &OutputNaming {
        &self.output
    }

    /// Signature line text, when an author is set.
    pub fn signature(&self) -> Option<&str> {
        let author = self.metadata.author.trim();
        (!author.is_empty()).then_some(author)
    }
}

/// Map an opacity percent to an alpha byte, clamped to 0..=255.
pub fn alpha_byte(opacity_percent: u8) -> u8 {
    (255.0 * opacity_percent as f32 / 100.0).round().clamp(0.0, 255.0) as u8
}

/// Builder for [`WatermarkJob`]; validates on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct WatermarkJobBuilder {
    symbol: Option<CopyrightSymbol>,
    text: String,
    color: Color,
    opacity_percent: u8,
    font: FontSpec,
    layout: LayoutMode,
    metadata: MetadataFields,
    output: OutputNaming,
}

impl Default for WatermarkJobBuilder {
    fn default() -> Self {
        Self {
            symbol: None,
            text: String::new(),
            color: Color::white(),
            opacity_percent: DEFAULT_OPACITY_PERCENT,
            font: FontSpec::default(),
            layout: LayoutMode::default(),
            metadata: MetadataFields::default(),
            output: OutputNaming::default(),
        }
    }
}

impl WatermarkJobBuilder {
    /// Set the watermark text verbatim.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Prefix the text with a copyright symbol (`"{symbol} {text}"`).
    pub fn symbol(mut self, symbol: CopyrightSymbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn opacity_percent(mut self, opacity_percent: u8) -> Self {
        self.opacity_percent = opacity_percent;
        self
    }

    pub fn font(mut self, name: impl Into<String>, bold: bool, size_percent: f32) -> Self {
        self.font = FontSpec {
            name: name.into(),
            bold,
            size_percent,
        };
        self
    }

    pub fn linear(mut self, count: u8, anchor: Anchor) -> Self {
        self.layout = LayoutMode::Linear { count, anchor };
        self
    }

    pub fn mosaic(mut self, spacing_h: f32, spacing_v: f32) -> Self {
        self.layout = LayoutMode::Mosaic {
            spacing_h,
            spacing_v,
        };
        self
    }

    pub fn mosaic_default(self) -> Self {
        self.mosaic(DEFAULT_MOSAIC_SPACING, DEFAULT_MOSAIC_SPACING)
    }

    pub fn layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    pub fn metadata(mut self, metadata: MetadataFields) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = author.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = title.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.metadata.subject = subject.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.metadata.comment = comment.into();
        self
    }

    pub fn batch_output(mut self, base_name: impl Into<String>, start_index: u32) -> Self {
        self.output = OutputNaming::Batch {
            base_name: base_name.into(),
            start_index,
        };
        self
    }

    pub fn single_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = OutputNaming::Single {
            path: path.as_ref().to_path_buf(),
        };
        self
    }

    /// Validate and freeze the job.
    pub fn build(self) -> Result<WatermarkJob, WatermarkError> {
        let text = match self.symbol {
            Some(symbol) => format!("{} {}", symbol.as_str(), self.text),
            None => self.text,
        };

        if text.trim().is_empty() {
            return Err(WatermarkError::ConfigError(
                "Watermark text cannot be empty".to_string(),
            ));
        }

        if self.opacity_percent > 100 {
            return Err(WatermarkError::ConfigError(format!(
                "Opacity must be between 0 and 100, got {}",
                self.opacity_percent
            )));
        }

        let size = self.font.size_percent;
        if !size.is_finite() || size <= 0.0 || size > 100.0 {
            return Err(WatermarkError::ConfigError(format!(
                "Font size must be a finite percent in (0, 100], got {}",
                size
            )));
        }

        if self.font.name.trim().is_empty() {
            return Err(WatermarkError::ConfigError(
                "Font name cannot be empty".to_string(),
            ));
        }

        match self.layout {
            LayoutMode::Linear { count, .. } => {
                if count == 0 || count > MAX_LINEAR_COUNT {
                    return Err(WatermarkError::ConfigError(format!(
                        "Linear watermark count must be between 1 and {}, got {}",
                        MAX_LINEAR_COUNT, count
                    )));
                }
            }
            LayoutMode::Mosaic {
                spacing_h,
                spacing_v,
            } => {
                for (axis, factor) in [("horizontal", spacing_h), ("vertical", spacing_v)] {
                    if !factor.is_finite() || factor < MIN_MOSAIC_SPACING {
                        return Err(WatermarkError::ConfigError(format!(
                            "Mosaic {} spacing factor must be a finite value >= {}, got {}",
                            axis, MIN_MOSAIC_SPACING, factor
                        )));
                    }
                }
            }
        }

        match &self.output {
            OutputNaming::Batch { base_name, .. } => {
                if base_name.is_empty() || base_name.contains(['/', '\\']) {
                    return Err(WatermarkError::ConfigError(format!(
                        "Output base name must be a non-empty file name, got '{}'",
                        base_name
                    )));
                }
            }
            OutputNaming::Single { path } => {
                if path.as_os_str().is_empty() {
                    return Err(WatermarkError::ConfigError(
                        "Single output path cannot be empty".to_string(),
                    ));
                }
            }
        }

        Ok(WatermarkJob {
            text,
            color: self.color,
            opacity_percent: self.opacity_percent,
            font: self.font,
            layout: self.layout,
            metadata: self.metadata,
            output: self.output,
        })
    }
}
