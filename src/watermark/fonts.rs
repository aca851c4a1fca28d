//! Font file resolution.
//!
//! Maps a logical family name and weight flag to a concrete font file.
//! Resolution never fails: unknown or missing fonts degrade through the
//! custom font directory, the system font directory and finally the
//! platform's default sans-serif file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Files of a well-known font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownFamily {
    pub name: &'static str,
    pub regular: &'static str,
    /// `None` when the family ships without a bold face
    pub bold: Option<&'static str>,
}

/// Well-known families and their file names.
pub const KNOWN_FAMILIES: &[KnownFamily] = &[
    KnownFamily {
        name: "Arial",
        regular: "arial.ttf",
        bold: Some("arialbd.ttf"),
    },
    KnownFamily {
        name: "Calibri",
        regular: "calibri.ttf",
        bold: Some("calibrib.ttf"),
    },
    KnownFamily {
        name: "Comic Sans MS",
        regular: "comic.ttf",
        bold: Some("comicbd.ttf"),
    },
    KnownFamily {
        name: "DejaVu Sans",
        regular: "DejaVuSans.ttf",
        bold: Some("DejaVuSans-Bold.ttf"),
    },
    KnownFamily {
        name: "Georgia",
        regular: "georgia.ttf",
        bold: Some("georgiab.ttf"),
    },
    KnownFamily {
        name: "Juice",
        regular: "Juice.ttf",
        bold: None,
    },
    KnownFamily {
        name: "Tahoma",
        regular: "tahoma.ttf",
        bold: Some("tahomabd.ttf"),
    },
    KnownFamily {
        name: "Times New Roman",
        regular: "times.ttf",
        bold: Some("timesbd.ttf"),
    },
    KnownFamily {
        name: "Trebuchet MS",
        regular: "trebuc.ttf",
        bold: Some("trebucbd.ttf"),
    },
    KnownFamily {
        name: "Verdana",
        regular: "verdana.ttf",
        bold: Some("verdanab.ttf"),
    },
];

/// Families always offered, whether or not their files are installed.
const DEFAULT_FAMILIES: &[&str] = &["Arial", "Comic Sans MS"];

/// Look up a well-known family (case-insensitive).
pub fn known_family(name: &str) -> Option<&'static KnownFamily> {
    KNOWN_FAMILIES
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
}

/// True iff `name` is a known family without a bold file.
pub fn needs_synthetic_bold(name: &str) -> bool {
    known_family(name).map_or(false, |f| f.bold.is_none())
}

/// Directories probed during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDirs {
    /// Caller-supplied fonts shipped alongside the application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_dir: Option<PathBuf>,
    /// Operating system font directory
    #[serde(default = "default_system_dir")]
    pub system_dir: PathBuf,
    /// Terminal fallback, assumed present on the host
    #[serde(default = "default_fallback_font")]
    pub fallback_font: PathBuf,
}

#[cfg(windows)]
fn windows_fonts_dir() -> PathBuf {
    let windir = std::env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
    PathBuf::from(windir).join("Fonts")
}

#[cfg(windows)]
fn default_system_dir() -> PathBuf {
    windows_fonts_dir()
}

#[cfg(windows)]
fn default_fallback_font() -> PathBuf {
    windows_fonts_dir().join("arial.ttf")
}

#[cfg(target_os = "macos")]
fn default_system_dir() -> PathBuf {
    PathBuf::from("/Library/Fonts")
}

#[cfg(target_os = "macos")]
fn default_fallback_font() -> PathBuf {
    PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf")
}

#[cfg(not(any(windows, target_os = "macos")))]
fn default_system_dir() -> PathBuf {
    PathBuf::from("/usr/share/fonts/truetype")
}

#[cfg(not(any(windows, target_os = "macos")))]
fn default_fallback_font() -> PathBuf {
    PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")
}

impl Default for FontDirs {
    fn default() -> Self {
        Self {
            custom_dir: None,
            system_dir: default_system_dir(),
            fallback_font: default_fallback_font(),
        }
    }
}

/// How a font request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Known family, file found
    Known,
    /// Found by probing the custom font directory
    Custom,
    /// Found by probing the system font directory
    System,
    /// Terminal fallback
    Fallback,
}

/// Result of resolving a font request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub path: PathBuf,
    /// Render with the 2x2 smear instead of a bold face
    pub synthetic_bold: bool,
    pub kind: ResolutionKind,
}

/// Resolves logical font names to files.
#[derive(Debug, Clone, Default)]
pub struct FontResolver {
    dirs: FontDirs,
}

impl FontResolver {
    pub fn new(dirs: FontDirs) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &FontDirs {
        &self.dirs
    }

    /// Resolve `name`/`bold` to a font file.
    ///
    /// Order: known family (bold file if requested and installed, otherwise
    /// the regular file with synthetic bold), then `"{name} Bold.ttf"` /
    /// `"{name}.ttf"` in the custom and system directories, then the
    /// fallback font.
    pub fn resolve(&self, name: &str, bold: bool) -> ResolvedFont {
        let name = name.trim();

        if let Some(family) = known_family(name) {
            if let (true, Some(bold_file)) = (bold, family.bold) {
                if let Some(path) = self.find_in_dirs(bold_file) {
                    return ResolvedFont {
                        path,
                        synthetic_bold: false,
                        kind: ResolutionKind::Known,
                    };
                }
                tracing::debug!(font = name, file = bold_file, "Bold font file not installed");
            }
            if let Some(path) = self.find_in_dirs(family.regular) {
                return ResolvedFont {
                    path,
                    synthetic_bold: bold,
                    kind: ResolutionKind::Known,
                };
            }
            tracing::debug!(font = name, file = family.regular, "Known font file not installed");
        }

        let mut candidates = Vec::with_capacity(2);
        if bold {
            candidates.push(format!("{} Bold.ttf", name));
        }
        candidates.push(format!("{}.ttf", name));

        let probes = [
            (self.dirs.custom_dir.as_deref(), ResolutionKind::Custom),
            (Some(self.dirs.system_dir.as_path()), ResolutionKind::System),
        ];
        for (dir, kind) in probes {
            let Some(dir) = dir else { continue };
            for candidate in &candidates {
                let path = dir.join(candidate);
                if path.is_file() {
                    return ResolvedFont {
                        path,
                        synthetic_bold: bold && needs_synthetic_bold(name),
                        kind,
                    };
                }
            }
        }

        tracing::debug!(
            font = name,
            bold = bold,
            fallback = %self.dirs.fallback_font.display(),
            "Font not found, using fallback"
        );
        ResolvedFont {
            path: self.dirs.fallback_font.clone(),
            synthetic_bold: false,
            kind: ResolutionKind::Fallback,
        }
    }

    /// Fonts offered to the caller: the default families plus every known
    /// family whose regular file is installed. Sorted, no duplicates.
    pub fn available_fonts(&self) -> Vec<String> {
        let mut fonts: Vec<String> = DEFAULT_FAMILIES.iter().map(|s| s.to_string()).collect();
        for family in KNOWN_FAMILIES {
            if self.find_in_dirs(family.regular).is_some() {
                fonts.push(family.name.to_string());
            }
        }
        fonts.sort();
        fonts.dedup();
        fonts
    }

    fn find_in_dirs(&self, file: &str) -> Option<PathBuf> {
        let dirs: [Option<&Path>; 2] = [
            self.dirs.custom_dir.as_deref(),
            Some(self.dirs.system_dir.as_path()),
        ];
        dirs.into_iter()
            .flatten()
            .map(|dir| dir.join(file))
            .find(|path| path.is_file())
    }
}
