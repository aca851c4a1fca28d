//! Placement calculation for watermark text.
//!
//! This module computes where every watermark glyph run is drawn. It is
//! state-free: the same canvas, text size and layout always produce the
//! same placements.
//!
//! # Layout Modes
//!
//! - **Linear**: `count` lines stacked at one of five anchors (corners or
//!   center), 10px from the edges with a 10px gap between lines
//! - **Mosaic**: the text rotated by -15 degrees, tiled over a staggered grid
//!   that over-provisions two extra rows and columns so edge tiles bleed in
//!
//! # Example
//!
//! ```ignore
//! use copymark::watermark::position::{linear_position, ImageDimensions, WatermarkDimensions};
//! use copymark::watermark::Anchor;
//!
//! let canvas = ImageDimensions { width: 800, height: 600 };
//! let text = WatermarkDimensions { width: 100, height: 50 };
//!
//! let pos = linear_position(Anchor::BottomRight, 0, 1, &canvas, &text);
//! assert_eq!((pos.x, pos.y), (690, 540)); // 800 - 100 - 10, 600 - 1 * (50 + 10)
//! ```

use super::job::{Anchor, LayoutMode};
use crate::constants::{
    EDGE_MARGIN_PX, LINE_GAP_PX, MOSAIC_GRID_OVERSCAN, MOSAIC_ROTATION_DEGREES,
    MOSAIC_SCRATCH_FACTOR, SIGNATURE_GAP_PX,
};

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of a text box or tile to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner of a placed run. May lie outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Which text a placement draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphRun {
    Primary,
    Signature,
}

/// One computed placement of a glyph run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top-left of the ink box (linear) or of the rotated tile (mosaic)
    pub position: PlacementPosition,
    /// Counter-clockwise rotation in degrees
    pub rotation_degrees: f32,
    /// Set when the placement's bounding box misses the canvas entirely
    pub discard: bool,
    pub run: GlyphRun,
    /// Grid column (mosaic) or 0 (linear)
    pub column: u32,
    /// Grid row (mosaic) or line index (linear)
    pub row: u32,
}

/// Geometry of a mosaic grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosaicGrid {
    /// Horizontal distance between tile centers
    pub spacing_x: f32,
    /// Vertical distance between tile centers
    pub spacing_y: f32,
    pub columns: u32,
    pub rows: u32,
    /// Size of the rotated tile buffer pasted at each placement
    pub tile: WatermarkDimensions,
}

/// All placements for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub placements: Vec<Placement>,
    /// Present in mosaic mode
    pub mosaic: Option<MosaicGrid>,
}

impl LayoutPlan {
    /// Placements that are actually drawn.
    pub fn visible(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| !p.discard)
    }

    /// Last primary-text placement, anchor of the signature line.
    pub fn last_primary(&self) -> Option<&Placement> {
        self.placements
            .iter()
            .rev()
            .find(|p| p.run == GlyphRun::Primary)
    }
}

/// Axis-aligned extent of a `w` x `h` box rotated by `degrees`.
pub fn rotated_extent(width: f32, height: f32, degrees: f32) -> (f32, f32) {
    let radians = degrees.to_radians();
    let cos = radians.cos().abs();
    let sin = radians.sin().abs();
    (width * cos + height * sin, width * sin + height * cos)
}

/// Pixel size of an image rotated by `degrees` with expansion.
pub fn rotated_bounds(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let (w, h) = rotated_extent(width as f32, height as f32, degrees);
    // Tolerate float noise so exact multiples of 90 degrees keep their size
    let snap = |v: f32| (v - 1e-3).ceil().max(1.0) as u32;
    (snap(w), snap(h))
}

/// Position of linear line `index` of `count` for `anchor`.
///
/// Coordinates may be negative if the text is larger than the canvas.
pub fn linear_position(
    anchor: Anchor,
    index: u32,
    count: u32,
    canvas: &ImageDimensions,
    text: &WatermarkDimensions,
) -> PlacementPosition {
    let img_w = canvas.width as i32;
    let img_h = canvas.height as i32;
    let text_w = text.width as i32;
    let text_h = text.height as i32;
    let slot = text_h + LINE_GAP_PX;
    let offset = index as i32 * slot;
    let from_bottom = (count as i32 - index as i32) * slot;

    match anchor {
        Anchor::TopLeft => PlacementPosition::new(EDGE_MARGIN_PX, EDGE_MARGIN_PX + offset),
        Anchor::TopRight => {
            PlacementPosition::new(img_w - text_w - EDGE_MARGIN_PX, EDGE_MARGIN_PX + offset)
        }
        Anchor::BottomLeft => PlacementPosition::new(EDGE_MARGIN_PX, img_h - from_bottom),
        Anchor::BottomRight => {
            PlacementPosition::new(img_w - text_w - EDGE_MARGIN_PX, img_h - from_bottom)
        }
        Anchor::Center => PlacementPosition::new(
            (img_w - text_w).div_euclid(2),
            (img_h - count as i32 * text_h).div_euclid(2) + offset,
        ),
    }
}

/// Placements for a linear layout. Linear placements are never discarded.
pub fn calculate_linear_placements(
    canvas: &ImageDimensions,
    text: &WatermarkDimensions,
    count: u32,
    anchor: Anchor,
) -> Vec<Placement> {
    (0..count)
        .map(|i| Placement {
            position: linear_position(anchor, i, count, canvas, text),
            rotation_degrees: 0.0,
            discard: false,
            run: GlyphRun::Primary,
            column: 0,
            row: i,
        })
        .collect()
}

/// Placement of the signature line under the last primary line.
pub fn signature_placement(
    anchor: Anchor,
    canvas: &ImageDimensions,
    last: &PlacementPosition,
    text: &WatermarkDimensions,
    signature: &WatermarkDimensions,
) -> Placement {
    let y = last.y + text.height as i32 + SIGNATURE_GAP_PX;
    let x = if anchor.is_right() {
        canvas.width as i32 - signature.width as i32 - EDGE_MARGIN_PX
    } else if anchor == Anchor::Center {
        (canvas.width as i32 - signature.width as i32).div_euclid(2)
    } else {
        last.x
    };

    Placement {
        position: PlacementPosition::new(x, y),
        rotation_degrees: 0.0,
        discard: false,
        run: GlyphRun::Signature,
        column: 0,
        row: 0,
    }
}

/// Grid geometry for a mosaic of `text` on `canvas`.
pub fn mosaic_grid(
    canvas: &ImageDimensions,
    text: &WatermarkDimensions,
    spacing_h: f32,
    spacing_v: f32,
) -> MosaicGrid {
    let (rw, rh) = rotated_extent(
        text.width as f32,
        text.height as f32,
        MOSAIC_ROTATION_DEGREES,
    );

    // A zero-sized text box would make the grid infinite
    let spacing_x = (rw * spacing_h).max(1.0);
    let spacing_y = (rh * spacing_v).max(1.0);

    let columns = ((canvas.width as f32 / spacing_x).floor() as u32 + MOSAIC_GRID_OVERSCAN).max(1);
    let rows = ((canvas.height as f32 / spacing_y).floor() as u32 + MOSAIC_GRID_OVERSCAN).max(1);

    let side = ((text.width.max(text.height) as f32 * MOSAIC_SCRATCH_FACTOR) as u32).max(1);
    let (tile_w, tile_h) = rotated_bounds(side, side, MOSAIC_ROTATION_DEGREES);

    MosaicGrid {
        spacing_x,
        spacing_y,
        columns,
        rows,
        tile: WatermarkDimensions {
            width: tile_w,
            height: tile_h,
        },
    }
}

/// Tile center for grid cell (`column`, `row`); odd rows shift by half a
/// spacing.
pub fn mosaic_center(grid: &MosaicGrid, column: u32, row: u32) -> (f32, f32) {
    let mut x = column as f32 * grid.spacing_x;
    let y = row as f32 * grid.spacing_y;
    if row % 2 == 1 {
        x += grid.spacing_x / 2.0;
    }
    (x, y)
}

/// Placements for a mosaic layout; tiles entirely off-canvas are discarded.
pub fn calculate_mosaic_placements(canvas: &ImageDimensions, grid: &MosaicGrid) -> Vec<Placement> {
    let mut placements = Vec::with_capacity((grid.columns * grid.rows) as usize);

    for column in 0..grid.columns {
        for row in 0..grid.rows {
            let (cx, cy) = mosaic_center(grid, column, row);
            let position = PlacementPosition::new(
                (cx - grid.tile.width as f32 / 2.0).floor() as i32,
                (cy - grid.tile.height as f32 / 2.0).floor() as i32,
            );

            placements.push(Placement {
                position,
                rotation_degrees: MOSAIC_ROTATION_DEGREES,
                discard: !is_visible(&position, canvas, &grid.tile),
                run: GlyphRun::Primary,
                column,
                row,
            });
        }
    }

    placements
}

/// Compute every placement for one image.
///
/// `signature` is the measured signature box, if the job has one; it is
/// only placed in linear mode.
pub fn compute_placements(
    canvas: &ImageDimensions,
    text: &WatermarkDimensions,
    layout: &LayoutMode,
    signature: Option<&WatermarkDimensions>,
) -> LayoutPlan {
    match *layout {
        LayoutMode::Linear { count, anchor } => {
            let mut placements = calculate_linear_placements(canvas, text, count as u32, anchor);
            if let (Some(sig), Some(last)) = (signature, placements.last().copied()) {
                placements.push(signature_placement(anchor, canvas, &last.position, text, sig));
            }
            LayoutPlan {
                placements,
                mosaic: None,
            }
        }
        LayoutMode::Mosaic {
            spacing_h,
            spacing_v,
        } => {
            let grid = mosaic_grid(canvas, text, spacing_h, spacing_v);
            LayoutPlan {
                placements: calculate_mosaic_placements(canvas, &grid),
                mosaic: Some(grid),
            }
        }
    }
}

/// Check if a box at `pos` is at least partially visible within the image.
pub fn is_visible(
    pos: &PlacementPosition,
    image: &ImageDimensions,
    watermark: &WatermarkDimensions,
) -> bool {
    let wm_right = pos.x + watermark.width as i32;
    let wm_bottom = pos.y + watermark.height as i32;

    pos.x < image.width as i32 && pos.y < image.height as i32 && wm_right > 0 && wm_bottom > 0
}
