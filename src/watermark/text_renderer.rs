//! Text measurement and glyph rendering.
//!
//! This module measures and draws watermark text with real font metrics
//! and produces the rotated tile used by the mosaic layout.
//!
//! # Features
//!
//! - Hex color parsing (#RGB and #RRGGBB formats)
//! - Ink bounding boxes from glyph outlines (ascent/descent aware, kerned)
//! - Synthetic bold by 2x2 offset redraw
//! - Expanding rotation with bicubic resampling
//! - Embedded fallback font (no external dependencies)
//!
//! # Example
//!
//! ```ignore
//! use copymark::watermark::text_renderer::{measure_text, FontFace};
//!
//! let face = FontFace::embedded();
//! let size = measure_text(&face, "© 2025", 32.0);
//! assert!(size.width > 0);
//! ```

use super::position::rotated_bounds;
use super::WatermarkError;
use ab_glyph::{point, Font, FontArc, Glyph, OutlinedGlyph, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Embedded font used when no font file can be opened.
static DEFAULT_FONT: OnceLock<FontArc> = OnceLock::new();

/// Embedded font data (DejaVu Sans Mono, permissive license).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

/// Pixel offsets of the synthetic bold smear.
const SYNTHETIC_BOLD_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// Get the embedded font, initializing it lazily.
fn get_default_font() -> FontArc {
    DEFAULT_FONT
        .get_or_init(|| {
            FontArc::try_from_slice(EMBEDDED_FONT_DATA)
                .expect("Failed to load embedded font - this is a bug")
        })
        .clone()
}

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// RGBA fill with the given alpha byte.
    pub fn with_alpha(&self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }

    /// `#RRGGBB` representation.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
///
/// # Examples
///
/// ```ignore
/// let white = parse_hex_color("#FFF").unwrap();
/// assert_eq!(white, Color::new(255, 255, 255));
///
/// let red = parse_hex_color("#FF0000").unwrap();
/// assert_eq!(red, Color::new(255, 0, 0));
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let hex = hex
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::ConfigError("Color must start with '#'".to_string()))?;

    let digit = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| WatermarkError::ConfigError(format!("Invalid hex digit in '{}'", s)))
    };

    if !hex.is_ascii() {
        return Err(WatermarkError::ConfigError(
            "Color must contain only hex digits".to_string(),
        ));
    }

    match hex.len() {
        3 => {
            // #RGB format - each digit doubled: 0xF -> 0xFF
            let r = digit(&hex[0..1])?;
            let g = digit(&hex[1..2])?;
            let b = digit(&hex[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            digit(&hex[0..2])?,
            digit(&hex[2..4])?,
            digit(&hex[4..6])?,
        )),
        _ => Err(WatermarkError::ConfigError(format!(
            "Color must be #RGB or #RRGGBB format, got {} characters",
            hex.len()
        ))),
    }
}

/// Where a loaded font came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    File(PathBuf),
    Embedded,
}

/// A parsed font ready for measuring and drawing.
#[derive(Clone)]
pub struct FontFace {
    font: FontArc,
    source: FontSource,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("source", &self.source)
            .finish()
    }
}

impl FontFace {
    /// Load a TrueType/OpenType font file.
    pub fn load(path: &Path) -> Result<Self, WatermarkError> {
        let data = std::fs::read(path)
            .map_err(|e| WatermarkError::FontError(format!("{}: {}", path.display(), e)))?;
        let font = FontArc::try_from_vec(data)
            .map_err(|e| WatermarkError::FontError(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            font,
            source: FontSource::File(path.to_path_buf()),
        })
    }

    /// The embedded fallback font.
    pub fn embedded() -> Self {
        Self {
            font: get_default_font(),
            source: FontSource::Embedded,
        }
    }

    /// Load `path`, falling back to the embedded font if it cannot be opened.
    pub fn load_or_embedded(path: &Path) -> Self {
        match Self::load(path) {
            Ok(face) => face,
            Err(e) => {
                tracing::warn!(error = %e, "Font unusable, using embedded font");
                Self::embedded()
            }
        }
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }
}

/// Ink bounding box of a text run.
///
/// `offset_x`/`offset_y` locate the ink's top-left corner relative to the
/// run's origin (left edge, ascender line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSize {
    pub width: u32,
    pub height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Glyphs of a run laid out on one line: origin at (0, 0), baseline at ascent.
fn layout_run(face: &FontFace, text: &str, font_size: f32) -> (Vec<Glyph>, f32) {
    let scale = PxScale::from(font_size);
    let scaled_font = face.font.as_scaled(scale);
    let ascent = scaled_font.ascent();

    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor_x = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }
        glyphs.push(glyph_id.with_scale_and_position(scale, point(cursor_x, ascent)));
        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    (glyphs, cursor_x)
}

/// Measure the rendered ink box of `text` at `font_size` pixels.
pub fn measure_text(face: &FontFace, text: &str, font_size: f32) -> TextSize {
    let (glyphs, advance) = layout_run(face, text, font_size);

    let mut bounds: Option<(f32, f32, f32, f32)> = None;
    for glyph in glyphs {
        if let Some(outlined) = face.font.outline_glyph(glyph) {
            let b = outlined.px_bounds();
            bounds = Some(match bounds {
                None => (b.min.x, b.min.y, b.max.x, b.max.y),
                Some((x0, y0, x1, y1)) => {
                    (x0.min(b.min.x), y0.min(b.min.y), x1.max(b.max.x), y1.max(b.max.y))
                }
            });
        }
    }

    match bounds {
        Some((x0, y0, x1, y1)) => TextSize {
            width: (x1 - x0).ceil().max(0.0) as u32,
            height: (y1 - y0).ceil().max(0.0) as u32,
            offset_x: x0.floor() as i32,
            offset_y: y0.floor() as i32,
        },
        // Whitespace only: fall back to advance and line metrics
        None => {
            let scaled_font = face.font.as_scaled(PxScale::from(font_size));
            TextSize {
                width: advance.ceil().max(0.0) as u32,
                height: (scaled_font.ascent() - scaled_font.descent()).ceil().max(0.0) as u32,
                offset_x: 0,
                offset_y: 0,
            }
        }
    }
}

/// Draw `text` so that its ink box's top-left corner lands on `origin`.
///
/// Coverage is written with max-alpha semantics: overlapping glyphs and the
/// synthetic bold smear never exceed the fill's alpha. Pixels outside the
/// target are clipped.
pub fn draw_text(
    target: &mut RgbaImage,
    face: &FontFace,
    text: &str,
    font_size: f32,
    origin: (i32, i32),
    fill: Rgba<u8>,
    synthetic_bold: bool,
) {
    let size = measure_text(face, text, font_size);
    let (glyphs, _) = layout_run(face, text, font_size);

    let shift_x = (origin.0 - size.offset_x) as f32;
    let shift_y = (origin.1 - size.offset_y) as f32;

    let outlines: Vec<OutlinedGlyph> = glyphs
        .into_iter()
        .filter_map(|mut glyph| {
            glyph.position = point(glyph.position.x + shift_x, glyph.position.y + shift_y);
            face.font.outline_glyph(glyph)
        })
        .collect();

    let offsets: &[(i32, i32)] = if synthetic_bold {
        &SYNTHETIC_BOLD_OFFSETS
    } else {
        &SYNTHETIC_BOLD_OFFSETS[..1]
    };

    let width = target.width() as i32;
    let height = target.height() as i32;

    for &(dx, dy) in offsets {
        for outlined in &outlines {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32 + dx;
                let y = py as i32 + bounds.min.y as i32 + dy;

                if x >= 0 && y >= 0 && x < width && y < height {
                    let alpha = (coverage.clamp(0.0, 1.0) * fill[3] as f32).round() as u8;
                    let pixel = target.get_pixel_mut(x as u32, y as u32);
                    if alpha > pixel[3] {
                        *pixel = Rgba([fill[0], fill[1], fill[2], alpha]);
                    }
                }
            });
        }
    }
}

/// Options for rendering a standalone (optionally rotated) text tile.
#[derive(Debug, Clone)]
pub struct TileRenderOptions<'a> {
    pub text: &'a str,
    pub font_size: f32,
    pub fill: Rgba<u8>,
    pub synthetic_bold: bool,
    /// Side of the square scratch buffer relative to the longest text side
    pub scratch_factor: f32,
    /// Rotation in degrees (counter-clockwise positive)
    pub rotation_degrees: f32,
}

/// Render text centered in a square scratch buffer, then rotate it with
/// expansion.
pub fn render_tile(face: &FontFace, options: &TileRenderOptions<'_>) -> Result<RgbaImage, WatermarkError> {
    if options.text.is_empty() {
        return Err(WatermarkError::RenderError(
            "Cannot render empty text".to_string(),
        ));
    }

    let size = measure_text(face, options.text, options.font_size);
    let side = scratch_side(size, options.scratch_factor);

    let mut scratch = RgbaImage::new(side, side);
    let origin = (
        (side as f32 / 2.0 - size.width as f32 / 2.0).round() as i32,
        (side as f32 / 2.0 - size.height as f32 / 2.0).round() as i32,
    );
    draw_text(
        &mut scratch,
        face,
        options.text,
        options.font_size,
        origin,
        options.fill,
        options.synthetic_bold,
    );

    if options.rotation_degrees == 0.0 {
        return Ok(scratch);
    }

    Ok(rotate_image(&scratch, options.rotation_degrees))
}

/// Side of the square scratch buffer for a text box.
pub fn scratch_side(size: TextSize, factor: f32) -> u32 {
    ((size.width.max(size.height) as f32 * factor) as u32).max(1)
}

/// Rotate an image counter-clockwise by `degrees`, expanding the canvas to
/// fit the rotated content. Samples with a Catmull-Rom bicubic kernel on
/// premultiplied values.
pub fn rotate_image(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let radians = degrees.to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let src_w = image.width();
    let src_h = image.height();
    let (dst_w, dst_h) = rotated_bounds(src_w, src_h, degrees);

    let mut rotated = RgbaImage::new(dst_w.max(1), dst_h.max(1));

    let src_cx = src_w as f32 / 2.0;
    let src_cy = src_h as f32 / 2.0;
    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            // Inverse mapping from destination pixel center to source space
            let rx = dx as f32 + 0.5 - dst_cx;
            let ry = dy as f32 + 0.5 - dst_cy;

            let sx = rx * cos - ry * sin + src_cx - 0.5;
            let sy = rx * sin + ry * cos + src_cy - 0.5;

            if sx < -1.0 || sy < -1.0 || sx > src_w as f32 || sy > src_h as f32 {
                continue;
            }

            rotated.put_pixel(dx, dy, sample_bicubic(image, sx, sy));
        }
    }

    rotated
}

/// Catmull-Rom weights for the four taps around `t` in [0, 1).
fn cubic_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        -0.5 * t3 + t2 - 0.5 * t,
        1.5 * t3 - 2.5 * t2 + 1.0,
        -1.5 * t3 + 2.0 * t2 + 0.5 * t,
        0.5 * t3 - 0.5 * t2,
    ]
}

fn sample_bicubic(image: &RgbaImage, sx: f32, sy: f32) -> Rgba<u8> {
    let x0 = sx.floor() as i32;
    let y0 = sy.floor() as i32;
    let wx = cubic_weights(sx - x0 as f32);
    let wy = cubic_weights(sy - y0 as f32);

    let w = image.width() as i32;
    let h = image.height() as i32;

    // Premultiplied accumulation; taps outside the source are transparent
    let mut acc = [0.0f32; 4];
    for (j, wyj) in wy.iter().enumerate() {
        let y = y0 - 1 + j as i32;
        if y < 0 || y >= h {
            continue;
        }
        for (i, wxi) in wx.iter().enumerate() {
            let x = x0 - 1 + i as i32;
            if x < 0 || x >= w {
                continue;
            }
            let p = image.get_pixel(x as u32, y as u32);
            let weight = wxi * wyj;
            let a = p[3] as f32 / 255.0;
            acc[0] += p[0] as f32 * a * weight;
            acc[1] += p[1] as f32 * a * weight;
            acc[2] += p[2] as f32 * a * weight;
            acc[3] += a * weight;
        }
    }

    let alpha = acc[3].clamp(0.0, 1.0);
    if alpha < 1.0 / 255.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let unpremultiply = |c: f32| (c / acc[3]).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremultiply(acc[0]),
        unpremultiply(acc[1]),
        unpremultiply(acc[2]),
        (alpha * 255.0).round() as u8,
    ])
}
