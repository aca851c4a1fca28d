// Shared fixtures for integration tests

use copymark::batch::BatchRunner;
use copymark::watermark::{Anchor, FontDirs, FontResolver, WatermarkJob, WatermarkJobBuilder};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a solid-colour image in the given format.
pub fn write_image(path: &Path, width: u32, height: u32, color: [u8; 3], format: ImageFormat) {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let img = match format {
        // The GIF encoder works on RGBA frames
        ImageFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
        _ => img,
    };
    img.save_with_format(path, format).unwrap();
}

/// Resolver whose directories are empty, so every font lands on the
/// (missing) fallback and the embedded font is used.
pub fn isolated_resolver(fonts_dir: &Path) -> FontResolver {
    FontResolver::new(FontDirs {
        custom_dir: Some(fonts_dir.to_path_buf()),
        system_dir: fonts_dir.to_path_buf(),
        fallback_font: fonts_dir.join("missing-fallback.ttf"),
    })
}

pub fn base_job() -> WatermarkJobBuilder {
    WatermarkJob::builder()
        .text("© Test")
        .opacity_percent(50)
        .font("Arial", false, 5.0)
        .linear(1, Anchor::BottomRight)
        .batch_output("image", 1)
}

pub struct Workspace {
    pub dir: TempDir,
    pub input: PathBuf,
    pub fonts: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        let fonts = dir.path().join("fonts");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::create_dir_all(&fonts).unwrap();
        Self { dir, input, fonts }
    }

    pub fn runner(&self, job: WatermarkJob) -> BatchRunner {
        BatchRunner::new(job, &isolated_resolver(&self.fonts))
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.input)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
