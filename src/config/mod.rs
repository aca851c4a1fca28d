// Job file loading
//
// A YAML job file describes one watermark run. `${VAR}` references are
// substituted from the environment before parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_BASE_NAME, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE_PERCENT, DEFAULT_OPACITY_PERCENT,
    DEFAULT_START_INDEX,
};
use crate::watermark::{
    parse_hex_color, CopyrightSymbol, FontDirs, LayoutMode, MetadataFields, WatermarkJob,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub watermark: WatermarkSection,
    #[serde(default)]
    pub metadata: MetadataFields,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub fonts: FontDirs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkSection {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<CopyrightSymbol>,
    /// `#RGB` or `#RRGGBB`
    #[serde(default = "default_color")]
    pub color: String,
    /// 0..=100
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default)]
    pub font: FontSection,
    #[serde(default)]
    pub layout: LayoutMode,
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_opacity() -> u8 {
    DEFAULT_OPACITY_PERCENT
}

impl Default for WatermarkSection {
    fn default() -> Self {
        Self {
            text: String::new(),
            symbol: None,
            color: default_color(),
            opacity: default_opacity(),
            font: FontSection::default(),
            layout: LayoutMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSection {
    #[serde(default = "default_font_name")]
    pub name: String,
    #[serde(default)]
    pub bold: bool,
    /// Percent of image width
    #[serde(default = "default_font_size")]
    pub size_percent: f32,
}

fn default_font_name() -> String {
    DEFAULT_FONT_NAME.to_string()
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE_PERCENT
}

impl Default for FontSection {
    fn default() -> Self {
        Self {
            name: default_font_name(),
            bold: false,
            size_percent: default_font_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_base_name")]
    pub base_name: String,
    #[serde(default = "default_start_index")]
    pub start_index: u32,
    /// Defaults to each source's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Single-output mode when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_base_name() -> String {
    DEFAULT_BASE_NAME.to_string()
}

fn default_start_index() -> u32 {
    DEFAULT_START_INDEX
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            base_name: default_base_name(),
            start_index: default_start_index(),
            dir: None,
            path: None,
        }
    }
}

impl JobFile {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = Vec::new();
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.push(var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing.first() {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read job file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Build the immutable job. All validation happens in the job builder.
    pub fn to_job(&self) -> Result<WatermarkJob, String> {
        let wm = &self.watermark;
        let color = parse_hex_color(&wm.color).map_err(|e| e.to_string())?;

        let mut builder = WatermarkJob::builder()
            .text(wm.text.clone())
            .color(color)
            .opacity_percent(wm.opacity)
            .font(wm.font.name.clone(), wm.font.bold, wm.font.size_percent)
            .layout(wm.layout)
            .metadata(self.metadata.clone());

        if let Some(symbol) = wm.symbol {
            builder = builder.symbol(symbol);
        }

        builder = match &self.output.path {
            Some(path) => builder.single_output(path),
            None => builder.batch_output(self.output.base_name.clone(), self.output.start_index),
        };

        builder.build().map_err(|e| e.to_string())
    }
}
