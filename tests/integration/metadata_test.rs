// Provenance metadata written by batch runs

use super::test_harness::{base_job, write_image, Workspace};
use copymark::metadata::{read_embedded, read_provenance, MetadataStatus};
use copymark::watermark::Anchor;
use image::ImageFormat;

#[test]
fn test_provenance_round_trip() {
    let ws = Workspace::new();
    write_image(&ws.input.join("a.jpg"), 320, 240, [20, 40, 60], ImageFormat::Jpeg);

    let job = base_job()
        .font("Verdana", true, 4.5)
        .opacity_percent(35)
        .linear(2, Anchor::TopRight)
        .author("Jane Doe")
        .title("Harbour")
        .subject("Boats")
        .comment("Morning light")
        .build()
        .unwrap();
    let report = ws.runner(job).run_input(&ws.input).unwrap();
    let outcome = &report.succeeded[0];
    assert_eq!(outcome.metadata, MetadataStatus::Embedded);

    let record = read_provenance(&outcome.output).unwrap();
    assert_eq!(record.text, "© Test");
    assert!((record.opacity - 0.35).abs() < 1e-6);
    assert_eq!(record.position, Some(Anchor::TopRight));
    assert!(!record.is_mosaic);
    assert_eq!(record.num_watermarks, Some(2));
    assert_eq!(record.font, "Verdana");
    assert!(record.is_bold);
    assert_eq!(record.author, "Jane Doe");
    assert_eq!(record.application, "Copymark");

    let embedded = read_embedded(&outcome.output).unwrap();
    assert_eq!(embedded.copyright.as_deref(), Some("© Test - Jane Doe"));
    assert_eq!(embedded.artist.as_deref(), Some("Jane Doe"));
    assert_eq!(embedded.software.as_deref(), Some("Copymark"));
    assert_eq!(embedded.description.as_deref(), Some("Harbour"));
    assert_eq!(embedded.xp_title.as_deref(), Some("Harbour"));
    assert_eq!(embedded.xp_subject.as_deref(), Some("Boats"));
    assert_eq!(embedded.xp_comment.as_deref(), Some("Morning light"));
    assert_eq!(embedded.document_name.as_deref(), Some("image_001.jpg"));

    let date = embedded.date_time_original.unwrap();
    assert_eq!(date.len(), 19);
    assert_eq!(&date[4..5], ":");
}

#[test]
fn test_mosaic_record_has_no_position() {
    let ws = Workspace::new();
    write_image(&ws.input.join("a.png"), 200, 200, [0, 0, 0], ImageFormat::Png);

    let job = base_job().mosaic(2.0, 1.0).build().unwrap();
    let report = ws.runner(job).run_input(&ws.input).unwrap();

    let record = read_provenance(&report.succeeded[0].output).unwrap();
    assert!(record.is_mosaic);
    assert_eq!(record.position, None);
    assert_eq!(record.num_watermarks, None);
}

#[test]
fn test_artist_defaults_without_author() {
    let ws = Workspace::new();
    write_image(&ws.input.join("a.png"), 64, 64, [0, 0, 0], ImageFormat::Png);

    let report = ws.runner(base_job().build().unwrap()).run_input(&ws.input).unwrap();
    let embedded = read_embedded(&report.succeeded[0].output).unwrap();
    assert_eq!(embedded.artist.as_deref(), Some("Copymark User"));
    assert_eq!(embedded.copyright.as_deref(), Some("© Test"));
    assert_eq!(embedded.description, None);
}

#[test]
fn test_malformed_source_exif_is_ignored() {
    let ws = Workspace::new();
    let source = ws.input.join("a.jpg");
    write_image(&source, 64, 64, [0, 0, 0], ImageFormat::Jpeg);

    // Splice a broken APP1 "Exif" segment right after SOI
    let mut data = std::fs::read(&source).unwrap();
    let broken: &[u8] = b"\xFF\xE1\x00\x0EExif\x00\x00II*\x00\xFF\xFF";
    data.splice(2..2, broken.iter().copied());
    std::fs::write(&source, data).unwrap();

    let report = ws.runner(base_job().build().unwrap()).run_input(&ws.input).unwrap();
    assert!(report.all_succeeded(), "{}", report.summary());
    assert!(read_provenance(&report.succeeded[0].output).is_ok());
}
