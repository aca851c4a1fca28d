//! Watermark module for applying text watermarks to images.
//!
//! A [`WatermarkJob`] is built once per run and never mutated. For every
//! source image the layout engine recomputes placements (image sizes vary),
//! the text is drawn onto a transparent overlay and the overlay is
//! alpha-blended over the source.
//!
//! # Features
//!
//! - **Linear layout**: 1 to 10 stacked lines at one of five anchors, with
//!   an optional signature line beneath the last one
//! - **Mosaic layout**: rotated, staggered tiling across the whole canvas
//! - **Font resolution** with a fallback chain that never fails, plus
//!   synthetic bold for families without a bold face
//! - **Previews** rendered on a downscaled copy of the source
//!
//! # Example
//!
//! ```ignore
//! use copymark::watermark::{Anchor, FontResolver, WatermarkJob, WatermarkRenderer};
//!
//! let job = WatermarkJob::builder()
//!     .text("© 2024 Studio")
//!     .opacity_percent(50)
//!     .linear(1, Anchor::BottomRight)
//!     .build()?;
//! let renderer = WatermarkRenderer::new(&job, &FontResolver::default());
//! let rgb = renderer.render(&source, &job)?;
//! ```

pub mod compositor;
pub mod error;
pub mod fonts;
pub mod job;
pub mod position;
pub mod preview;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{blend_layer, blend_pixels, Compositor, RenderPlan, WatermarkLayer, WatermarkRenderer};
pub use error::WatermarkError;
pub use fonts::{FontDirs, FontResolver, ResolutionKind, ResolvedFont};
pub use job::{
    alpha_byte, Anchor, CopyrightSymbol, FontSpec, LayoutMode, MetadataFields, OutputNaming,
    WatermarkJob, WatermarkJobBuilder,
};
pub use position::{
    compute_placements, GlyphRun, ImageDimensions, LayoutPlan, MosaicGrid, Placement,
    PlacementPosition, WatermarkDimensions,
};
pub use preview::render_preview;
pub use text_renderer::{parse_hex_color, Color, FontFace, FontSource, TextSize};
