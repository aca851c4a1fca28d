// Constants module - centralized default values for watermark jobs
//
// This module defines all default values used throughout the codebase.
// Layout constants are part of the placement contract; changing them moves
// every rendered watermark.

// =============================================================================
// Application identity
// =============================================================================

/// Application name written into the software metadata field
pub const APPLICATION_NAME: &str = "Copymark";

/// Version string written into the provenance record
pub const APPLICATION_VERSION: &str = "1.0";

/// Artist written when the job carries no author
pub const DEFAULT_ARTIST: &str = "Copymark User";

// =============================================================================
// Layout
// =============================================================================

/// Distance between a linear watermark and the canvas edge in pixels
pub const EDGE_MARGIN_PX: i32 = 10;

/// Gap between stacked linear watermarks in pixels
pub const LINE_GAP_PX: i32 = 10;

/// Gap between the last primary line and the signature line in pixels
pub const SIGNATURE_GAP_PX: i32 = 5;

/// Rotation applied to every mosaic tile (negative = clockwise)
pub const MOSAIC_ROTATION_DEGREES: f32 = -15.0;

/// Side of the mosaic scratch buffer relative to the longest text side
pub const MOSAIC_SCRATCH_FACTOR: f32 = 1.5;

/// Extra rows/columns added to the mosaic grid so edge tiles bleed in
pub const MOSAIC_GRID_OVERSCAN: u32 = 2;

/// Smallest accepted mosaic spacing factor
pub const MIN_MOSAIC_SPACING: f32 = 0.1;

/// Maximum number of linear watermark lines
pub const MAX_LINEAR_COUNT: u8 = 10;

// =============================================================================
// Job defaults
// =============================================================================

/// Default font family
pub const DEFAULT_FONT_NAME: &str = "Arial";

/// Default font size as percent of image width
pub const DEFAULT_FONT_SIZE_PERCENT: f32 = 5.0;

/// Default watermark opacity percent
pub const DEFAULT_OPACITY_PERCENT: u8 = 50;

/// Default mosaic spacing factor (horizontal and vertical)
pub const DEFAULT_MOSAIC_SPACING: f32 = 1.5;

/// Default output base name in batch mode
pub const DEFAULT_BASE_NAME: &str = "watermarked";

/// Default first output index in batch mode
pub const DEFAULT_START_INDEX: u32 = 1;

// =============================================================================
// Output
// =============================================================================

/// JPEG quality used for every output file
pub const JPEG_QUALITY: u8 = 95;

/// Extension of every output file
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Extensions accepted as batch input (lowercase, without dot)
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Preview bounding box (width, height)
pub const PREVIEW_BOUNDS: (u32, u32) = (400, 300);
