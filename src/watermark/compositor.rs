//! Watermark compositor for blending watermarks onto images.
//!
//! This module draws the watermark text onto a transparent overlay at the
//! placements computed by the layout engine, then alpha-blends the overlay
//! over the source image.
//!
//! # Features
//!
//! - Porter-Duff "over" blending of straight-alpha layers
//! - Linear text runs (primary lines plus signature) drawn directly
//! - Mosaic tiles rendered once per image and pasted at every placement
//! - Font resolved and loaded once per job, embedded font as last resort
//!
//! # Example
//!
//! ```ignore
//! use copymark::watermark::{FontResolver, WatermarkJob, WatermarkRenderer};
//!
//! let job = WatermarkJob::builder().text("© Studio").build()?;
//! let renderer = WatermarkRenderer::new(&job, &FontResolver::default());
//! let output = renderer.render(&source, &job)?;
//! ```

use super::fonts::{FontResolver, ResolvedFont};
use super::job::WatermarkJob;
use super::position::{
    compute_placements, GlyphRun, ImageDimensions, LayoutPlan, PlacementPosition,
    WatermarkDimensions,
};
use super::text_renderer::{draw_text, measure_text, render_tile, FontFace, TextSize, TileRenderOptions};
use super::WatermarkError;
use crate::constants::{MOSAIC_ROTATION_DEGREES, MOSAIC_SCRATCH_FACTOR};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

/// A layer to be composited onto an image.
#[derive(Clone, Copy)]
pub struct WatermarkLayer<'a> {
    /// The layer image (RGBA, straight alpha).
    pub image: &'a RgbaImage,
    /// Position of the layer's top-left corner; may be off-canvas.
    pub position: PlacementPosition,
}

impl std::fmt::Debug for WatermarkLayer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .finish()
    }
}

/// Ordered stack of layers applied onto a target.
#[derive(Debug, Default)]
pub struct Compositor<'a> {
    layers: Vec<WatermarkLayer<'a>>,
}

impl<'a> Compositor<'a> {
    /// Create a new compositor with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer to the compositor.
    pub fn add_layer(&mut self, layer: WatermarkLayer<'a>) {
        self.layers.push(layer);
    }

    /// Apply all layers to the target image, in the order they were added.
    pub fn apply(&self, target: &mut RgbaImage) {
        for layer in &self.layers {
            blend_layer(target, layer);
        }
    }

    /// Get the number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

/// Blend a single layer onto the target image, clipping to its bounds.
pub fn blend_layer(target: &mut RgbaImage, layer: &WatermarkLayer<'_>) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;

    let wm_width = layer.image.width() as i32;
    let wm_height = layer.image.height() as i32;

    // Calculate the visible region (clamp to target bounds)
    let x_start = layer.position.x.max(0);
    let y_start = layer.position.y.max(0);
    let x_end = (layer.position.x + wm_width).min(target_width);
    let y_end = (layer.position.y + wm_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - layer.position.x) as u32;
            let wy = (ty - layer.position.y) as u32;

            let wm_pixel = layer.image.get_pixel(wx, wy);
            if wm_pixel[3] == 0 {
                continue;
            }
            let target_pixel = target.get_pixel(tx as u32, ty as u32);
            let blended = blend_pixels(*target_pixel, *wm_pixel);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Blend two pixels using alpha compositing.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    // Porter-Duff "over" operator
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Everything the layout needed to know about one image.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub font_size: u32,
    pub text: TextSize,
    pub signature: Option<TextSize>,
    pub layout: LayoutPlan,
}

/// Renders a job's watermark onto images with one loaded font.
#[derive(Debug, Clone)]
pub struct WatermarkRenderer {
    face: FontFace,
    synthetic_bold: bool,
    resolved: Option<ResolvedFont>,
}

impl WatermarkRenderer {
    /// Resolve and load the job's font. Never fails: an unreadable file
    /// falls back to the embedded font.
    pub fn new(job: &WatermarkJob, resolver: &FontResolver) -> Self {
        let font = job.font();
        let resolved = resolver.resolve(&font.name, font.bold);
        let face = FontFace::load_or_embedded(&resolved.path);

        tracing::info!(
            font = %font.name,
            bold = font.bold,
            path = %resolved.path.display(),
            synthetic_bold = resolved.synthetic_bold,
            resolution = ?resolved.kind,
            "Font resolved"
        );

        Self {
            face,
            synthetic_bold: font.bold && resolved.synthetic_bold,
            resolved: Some(resolved),
        }
    }

    /// Renderer over an already loaded face.
    pub fn from_face(face: FontFace, synthetic_bold: bool) -> Self {
        Self {
            face,
            synthetic_bold,
            resolved: None,
        }
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    pub fn resolved(&self) -> Option<&ResolvedFont> {
        self.resolved.as_ref()
    }

    pub fn synthetic_bold(&self) -> bool {
        self.synthetic_bold
    }

    /// Measure the job's text for a canvas and compute its placements.
    pub fn plan(&self, canvas: ImageDimensions, job: &WatermarkJob) -> RenderPlan {
        let font_size = job.font().font_size_px(canvas.width);
        let text = measure_text(&self.face, job.text(), font_size as f32);

        let signature = if job.layout().is_mosaic() {
            None
        } else {
            job.signature()
                .map(|sig| measure_text(&self.face, sig, font_size as f32))
        };

        let layout = compute_placements(
            &canvas,
            &dimensions(text),
            job.layout(),
            signature.map(dimensions).as_ref(),
        );

        RenderPlan {
            font_size,
            text,
            signature,
            layout,
        }
    }

    /// Draw the watermark layer for `canvas` (transparent where no text).
    pub fn render_overlay(
        &self,
        canvas: ImageDimensions,
        job: &WatermarkJob,
    ) -> Result<(RgbaImage, RenderPlan), WatermarkError> {
        let plan = self.plan(canvas, job);
        let mut overlay = RgbaImage::new(canvas.width, canvas.height);
        let fill = job.color().with_alpha(job.alpha_byte());
        let font_size = plan.font_size as f32;

        match plan.layout.mosaic {
            Some(_) => {
                let tile = render_tile(
                    &self.face,
                    &TileRenderOptions {
                        text: job.text(),
                        font_size,
                        fill,
                        synthetic_bold: self.synthetic_bold,
                        scratch_factor: MOSAIC_SCRATCH_FACTOR,
                        rotation_degrees: MOSAIC_ROTATION_DEGREES,
                    },
                )?;

                let mut compositor = Compositor::new();
                for placement in plan.layout.visible() {
                    compositor.add_layer(WatermarkLayer {
                        image: &tile,
                        position: placement.position,
                    });
                }
                tracing::debug!(tiles = compositor.layer_count(), "Mosaic tiles placed");
                compositor.apply(&mut overlay);
            }
            None => {
                for placement in plan.layout.visible() {
                    let text = match placement.run {
                        GlyphRun::Primary => job.text(),
                        GlyphRun::Signature => match job.signature() {
                            Some(sig) => sig,
                            None => continue,
                        },
                    };
                    draw_text(
                        &mut overlay,
                        &self.face,
                        text,
                        font_size,
                        (placement.position.x, placement.position.y),
                        fill,
                        self.synthetic_bold,
                    );
                }
            }
        }

        Ok((overlay, plan))
    }

    /// Composite the watermark over `source`, keeping the alpha channel.
    pub fn render_rgba(
        &self,
        source: &DynamicImage,
        job: &WatermarkJob,
    ) -> Result<RgbaImage, WatermarkError> {
        let mut target = source.to_rgba8();
        let canvas = ImageDimensions {
            width: target.width(),
            height: target.height(),
        };
        if canvas.width == 0 || canvas.height == 0 {
            return Err(WatermarkError::CompositeError(
                "Source image has no pixels".to_string(),
            ));
        }

        let (overlay, plan) = self.render_overlay(canvas, job)?;
        blend_layer(
            &mut target,
            &WatermarkLayer {
                image: &overlay,
                position: PlacementPosition::new(0, 0),
            },
        );

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            font_size = plan.font_size,
            placements = plan.layout.visible().count(),
            "Watermark composited"
        );

        Ok(target)
    }

    /// Composite the watermark over `source` and flatten to RGB for encoding.
    pub fn render(&self, source: &DynamicImage, job: &WatermarkJob) -> Result<RgbImage, WatermarkError> {
        let composited = self.render_rgba(source, job)?;
        Ok(DynamicImage::ImageRgba8(composited).to_rgb8())
    }
}

fn dimensions(size: TextSize) -> WatermarkDimensions {
    WatermarkDimensions {
        width: size.width,
        height: size.height,
    }
}
