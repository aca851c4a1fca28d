//! Preview rendering.
//!
//! Downscales a source image into preview bounds and composites the job's
//! watermark onto the thumbnail. Since font size is a percentage of image
//! width, the preview shows the same proportions as the full-size output.

use super::compositor::WatermarkRenderer;
use super::job::WatermarkJob;
use super::WatermarkError;
use crate::constants::PREVIEW_BOUNDS;
use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::{DynamicImage, RgbImage};
use std::num::NonZeroU32;

/// Largest size fitting `(width, height)` into `bounds` with the aspect ratio
/// kept. Never upscales; never returns a zero side.
pub fn fit_within(width: u32, height: u32, bounds: (u32, u32)) -> (u32, u32) {
    let (max_w, max_h) = bounds;
    if width <= max_w && height <= max_h {
        return (width.max(1), height.max(1));
    }

    let scale = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    let w = (width as f64 * scale).round() as u32;
    let h = (height as f64 * scale).round() as u32;
    (w.clamp(1, max_w), h.clamp(1, max_h))
}

/// Resize an image to exactly `target_w` x `target_h` with Lanczos3.
pub fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, WatermarkError> {
    let resize_failed = |msg: String| WatermarkError::RenderError(format!("Preview resize: {}", msg));

    let src_width = NonZeroU32::new(img.width())
        .ok_or_else(|| resize_failed("Source width is 0".to_string()))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| resize_failed("Source height is 0".to_string()))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| resize_failed("Target width is 0".to_string()))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| resize_failed("Target height is 0".to_string()))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| resize_failed(format!("Resize operation failed: {:?}", e)))?;

    let rgba_image = image::RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| resize_failed("Failed to create output image buffer".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba_image))
}

/// Render a watermarked preview of `source` within [`PREVIEW_BOUNDS`].
pub fn render_preview(
    renderer: &WatermarkRenderer,
    source: &DynamicImage,
    job: &WatermarkJob,
) -> Result<RgbImage, WatermarkError> {
    render_preview_within(renderer, source, job, PREVIEW_BOUNDS)
}

/// Render a watermarked preview of `source` within `bounds`.
pub fn render_preview_within(
    renderer: &WatermarkRenderer,
    source: &DynamicImage,
    job: &WatermarkJob,
    bounds: (u32, u32),
) -> Result<RgbImage, WatermarkError> {
    let (w, h) = fit_within(source.width(), source.height(), bounds);

    let thumbnail = if (w, h) == (source.width(), source.height()) {
        source.clone()
    } else {
        resize_image(source, w, h)?
    };

    tracing::debug!(
        source_width = source.width(),
        source_height = source.height(),
        preview_width = w,
        preview_height = h,
        "Rendering preview"
    );

    renderer.render(&thumbnail, job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::text_renderer::{Color, FontFace};
    use image::{Rgba, RgbaImage};
    use rstest::rstest;

    #[rstest]
    #[case((1000, 800), (375, 300))]
    #[case((800, 200), (400, 100))]
    #[case((4000, 3000), (400, 300))]
    #[case((200, 100), (200, 100))]
    #[case((5000, 10), (400, 1))]
    fn test_fit_within(#[case] size: (u32, u32), #[case] expected: (u32, u32)) {
        assert_eq!(fit_within(size.0, size.1, (400, 300)), expected);
    }

    #[test]
    fn test_resize_image_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 80, Rgba([9, 9, 9, 255])));
        let resized = resize_image(&img, 50, 40).unwrap();
        assert_eq!((resized.width(), resized.height()), (50, 40));
        assert_eq!(resized.to_rgba8().get_pixel(25, 20)[0], 9);
    }

    #[test]
    fn test_resize_rejects_zero_target() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
        assert!(resize_image(&img, 0, 5).is_err());
    }

    #[test]
    fn test_preview_is_watermarked_and_bounded() {
        let source =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(1200, 900, Rgba([0, 0, 0, 255])));
        let job = WatermarkJob::builder()
            .text("© Preview")
            .color(Color::white())
            .opacity_percent(100)
            .font("Arial", false, 10.0)
            .build()
            .unwrap();
        let renderer = WatermarkRenderer::from_face(FontFace::embedded(), false);

        let preview = render_preview(&renderer, &source, &job).unwrap();
        assert_eq!(preview.dimensions(), (400, 300));
        assert!(preview.pixels().any(|p| p[0] > 0));
    }
}
