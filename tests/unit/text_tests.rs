// Text measurement with the embedded font

use copymark::watermark::text_renderer::measure_text;
use copymark::watermark::{FontFace, FontSource};

#[test]
fn test_embedded_face_source() {
    assert_eq!(FontFace::embedded().source(), &FontSource::Embedded);
}

#[test]
fn test_measurement_scales_with_font_size() {
    let face = FontFace::embedded();
    let small = measure_text(&face, "© Test", 25.0);
    let large = measure_text(&face, "© Test", 50.0);

    assert!(large.width > small.width * 3 / 2);
    assert!(large.height > small.height * 3 / 2);
    assert!(large.height <= 50 + 2);
}

#[test]
fn test_signature_measured_independently() {
    let face = FontFace::embedded();
    let text = measure_text(&face, "© Test", 40.0);
    let signature = measure_text(&face, "Jane Doe Photography", 40.0);
    assert!(signature.width > text.width);
}

#[test]
fn test_descenders_extend_ink_box() {
    let face = FontFace::embedded();
    let flat = measure_text(&face, "ace", 40.0);
    let deep = measure_text(&face, "gjp", 40.0);
    assert!(deep.height > flat.height);
}

#[test]
fn test_missing_font_file_uses_embedded() {
    let face = FontFace::load_or_embedded(std::path::Path::new("/nonexistent/font.ttf"));
    assert_eq!(face.source(), &FontSource::Embedded);
    assert!(measure_text(&face, "x", 20.0).width > 0);
}
