//! Image decoding and JPEG encoding.
//!
//! Sources may be PNG, JPEG, BMP or GIF; every output is JPEG at a fixed
//! quality, so non-JPEG sources are transcoded and lose any transparency.

pub mod error;

pub use error::CodecError;

use crate::constants::SUPPORTED_INPUT_EXTENSIONS;
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Format of a decoded source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Png => "png",
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Bmp => "bmp",
            SourceFormat::Gif => "gif",
        }
    }

    /// True when writing the output does not change the container format
    pub fn is_jpeg(&self) -> bool {
        matches!(self, SourceFormat::Jpeg)
    }

    fn from_image_format(format: ImageFormat) -> Result<Self, CodecError> {
        match format {
            ImageFormat::Png => Ok(SourceFormat::Png),
            ImageFormat::Jpeg => Ok(SourceFormat::Jpeg),
            ImageFormat::Bmp => Ok(SourceFormat::Bmp),
            ImageFormat::Gif => Ok(SourceFormat::Gif),
            other => Err(CodecError::unsupported_format(format!("{:?}", other))),
        }
    }
}

/// True if the path has one of the supported input extensions (any case)
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_INPUT_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// A decoded source image together with its container format
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: SourceFormat,
}

/// Decode image bytes, detecting the format from content
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, CodecError> {
    let format = image::guess_format(data).map_err(|e| CodecError::decode_failed(e.to_string()))?;
    let format = SourceFormat::from_image_format(format)?;

    let image = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CodecError::decode_failed(e.to_string()))?
        .decode()
        .map_err(|e| CodecError::decode_failed(e.to_string()))?;

    Ok(DecodedImage { image, format })
}

/// Read and decode an image file
pub fn decode_file(path: &Path) -> Result<DecodedImage, CodecError> {
    let data = std::fs::read(path)
        .map_err(|e| CodecError::read_failed(format!("{}: {}", path.display(), e)))?;
    decode_image(&data)
}

/// Encode RGB pixels as a baseline JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    use image::codecs::jpeg::JpegEncoder;
    use image::ImageEncoder as _;

    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgb8,
        )
        .map_err(|e| CodecError::encode_failed("jpeg", e.to_string()))?;

    Ok(output.into_inner())
}

/// Write encoded bytes to `path`
pub fn write_file(path: &Path, data: &[u8]) -> Result<(), CodecError> {
    std::fs::write(path, data)
        .map_err(|e| CodecError::write_failed(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};
    use rstest::rstest;
    use std::path::PathBuf;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[rstest]
    #[case("a.png", true)]
    #[case("a.JPG", true)]
    #[case("a.jpeg", true)]
    #[case("a.Bmp", true)]
    #[case("a.gif", true)]
    #[case("a.tiff", false)]
    #[case("a.webp", false)]
    #[case("noext", false)]
    fn test_is_supported_extension(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_supported_extension(&PathBuf::from(name)), expected);
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode_image(&png_bytes()).unwrap();
        assert_eq!(decoded.format, SourceFormat::Png);
        assert!(!decoded.format.is_jpeg());
        assert_eq!((decoded.image.width(), decoded.image.height()), (4, 3));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailed { .. }));
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let bytes = png_bytes();
        assert!(decode_image(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_encode_jpeg_produces_decodable_output() {
        let rgb = RgbImage::from_pixel(8, 6, Rgb([200, 100, 50]));
        let data = encode_jpeg(&rgb, 95).unwrap();
        // JPEG magic bytes: FF D8 FF
        assert_eq!(&data[0..3], &[0xFF, 0xD8, 0xFF]);

        let decoded = decode_image(&data).unwrap();
        assert_eq!(decoded.format, SourceFormat::Jpeg);
        assert_eq!((decoded.image.width(), decoded.image.height()), (8, 6));
    }

    #[test]
    fn test_decode_file_missing() {
        let err = decode_file(Path::new("/nonexistent/copymark/in.png")).unwrap_err();
        assert!(matches!(err, CodecError::ReadFailed { .. }));
    }
}
