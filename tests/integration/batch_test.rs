// End-to-end batch runs over temporary directories

use super::test_harness::{base_job, write_image, Workspace};
use copymark::batch::FileStage;
use copymark::watermark::Anchor;
use image::{GenericImageView, ImageFormat};

#[test]
fn test_bottom_right_scenario() {
    let ws = Workspace::new();
    write_image(&ws.input.join("photo.jpg"), 1000, 800, [0, 0, 0], ImageFormat::Jpeg);

    let report = ws.runner(base_job().build().unwrap()).run_input(&ws.input).unwrap();
    assert!(report.all_succeeded());

    let output = ws.input.join("image_001.jpg");
    assert_eq!(report.succeeded[0].output, output);
    assert!(output.is_file());

    let img = image::open(&output).unwrap();
    assert_eq!(img.dimensions(), (1000, 800));
    let rgb = img.to_rgb8();

    // Watermark ink sits in the bottom-right corner, inside the margin
    let bright = |x0: u32, y0: u32, x1: u32, y1: u32| {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .map(|(x, y)| rgb.get_pixel(x, y)[0])
            .max()
            .unwrap()
    };
    assert!(bright(600, 700, 990, 790) > 90);
    assert!(bright(0, 0, 500, 400) < 30);
    assert!(bright(995, 0, 1000, 800) < 30);
    assert!(bright(0, 795, 1000, 800) < 30);
}

#[test]
fn test_png_source_is_transcoded_to_jpeg() {
    let ws = Workspace::new();
    write_image(&ws.input.join("graphic.png"), 400, 300, [0, 0, 0], ImageFormat::Png);

    let report = ws.runner(base_job().opacity_percent(100).build().unwrap())
        .run_input(&ws.input)
        .unwrap();
    let outcome = &report.succeeded[0];
    assert!(outcome.transcoded);
    assert_eq!(outcome.output.extension().unwrap(), "jpg");

    let data = std::fs::read(&outcome.output).unwrap();
    assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Jpeg);

    // Composited watermark is present in the pixels
    let rgb = image::load_from_memory(&data).unwrap().to_rgb8();
    assert!(rgb.pixels().any(|p| p[0] > 150));
    assert!(report.summary().contains("converted to JPEG"));
}

#[test]
fn test_second_run_never_overwrites() {
    let ws = Workspace::new();
    write_image(&ws.input.join("a.jpg"), 200, 100, [10, 10, 10], ImageFormat::Jpeg);
    write_image(&ws.input.join("b.png"), 200, 100, [10, 10, 10], ImageFormat::Png);

    let job = base_job().build().unwrap();
    ws.runner(job.clone()).run_input(&ws.input).unwrap();
    let first_bytes = std::fs::read(ws.input.join("image_001.jpg")).unwrap();

    let report = ws.runner(job).run_input(&ws.input).unwrap();
    // Previous outputs are not picked up as inputs
    assert_eq!(report.processed(), 2);
    assert_eq!(report.succeeded[0].output, ws.input.join("image_001_1.jpg"));
    assert_eq!(report.succeeded[1].output, ws.input.join("image_002_1.jpg"));
    assert_eq!(std::fs::read(ws.input.join("image_001.jpg")).unwrap(), first_bytes);

    assert_eq!(
        ws.file_names(),
        vec![
            "a.jpg",
            "b.png",
            "image_001.jpg",
            "image_001_1.jpg",
            "image_002.jpg",
            "image_002_1.jpg"
        ]
    );
}

#[test]
fn test_corrupt_file_fails_and_batch_continues() {
    let ws = Workspace::new();
    std::fs::write(ws.input.join("a_broken.jpg"), b"\xFF\xD8\xFF garbage").unwrap();
    write_image(&ws.input.join("b_good.bmp"), 120, 90, [0, 0, 0], ImageFormat::Bmp);
    write_image(&ws.input.join("c_good.gif"), 120, 90, [0, 0, 0], ImageFormat::Gif);

    let report = ws.runner(base_job().build().unwrap()).run_input(&ws.input).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].stage, FileStage::Open);
    assert!(report.failed[0].source.ends_with("a_broken.jpg"));
    assert_eq!(report.succeeded.len(), 2);
    assert!(!report.all_succeeded());
    assert!(report.summary().contains("1 failed"));
}

#[test]
fn test_start_index_and_output_dir() {
    let ws = Workspace::new();
    write_image(&ws.input.join("a.png"), 100, 100, [0, 0, 0], ImageFormat::Png);
    let out = ws.dir.path().join("out");

    let job = base_job().batch_output("holiday", 7).build().unwrap();
    let report = ws.runner(job).with_output_dir(&out).run_input(&ws.input).unwrap();
    assert_eq!(report.succeeded[0].output, out.join("holiday_007.jpg"));
}

#[test]
fn test_single_output_mode() {
    let ws = Workspace::new();
    let source = ws.input.join("portrait.png");
    write_image(&source, 300, 200, [0, 0, 0], ImageFormat::Png);
    let target = ws.dir.path().join("final.jpg");

    let job = base_job().single_output(&target).build().unwrap();
    let report = ws.runner(job.clone()).run_input(&source).unwrap();
    assert_eq!(report.succeeded[0].output, target);

    // Existing single output is kept, the new one gets a suffix
    let report = ws.runner(job).run_input(&source).unwrap();
    assert_eq!(report.succeeded[0].output, ws.dir.path().join("final_1.jpg"));
}

#[test]
fn test_unknown_font_falls_back_without_error() {
    let ws = Workspace::new();
    write_image(&ws.input.join("a.png"), 300, 200, [0, 0, 0], ImageFormat::Png);

    let job = base_job()
        .font("No Such Font Family", true, 8.0)
        .opacity_percent(100)
        .linear(2, Anchor::Center)
        .build()
        .unwrap();
    let runner = ws.runner(job);
    assert!(!runner.renderer().synthetic_bold());

    let report = runner.run_input(&ws.input).unwrap();
    assert!(report.all_succeeded());
    let rgb = image::open(&report.succeeded[0].output).unwrap().to_rgb8();
    assert!(rgb.pixels().any(|p| p[0] > 150));
}

#[test]
fn test_mosaic_run_covers_image() {
    let ws = Workspace::new();
    write_image(&ws.input.join("wide.png"), 640, 360, [0, 0, 0], ImageFormat::Png);

    let job = base_job().mosaic(1.5, 1.5).opacity_percent(80).build().unwrap();
    let report = ws.runner(job).run_input(&ws.input).unwrap();
    let rgb = image::open(&report.succeeded[0].output).unwrap().to_rgb8();

    for (x0, y0) in [(0, 0), (320, 0), (0, 180), (320, 180)] {
        let lit = (y0..y0 + 180)
            .flat_map(|y| (x0..x0 + 320).map(move |x| (x, y)))
            .any(|(x, y)| rgb.get_pixel(x, y)[0] > 100);
        assert!(lit, "quadrant at ({}, {}) has no watermark", x0, y0);
    }
}
