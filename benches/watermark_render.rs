use criterion::{black_box, criterion_group, criterion_main, Criterion};
use copymark::codec::encode_jpeg;
use copymark::constants::JPEG_QUALITY;
use copymark::watermark::{Anchor, Color, FontFace, WatermarkJob, WatermarkRenderer};
use image::{DynamicImage, RgbaImage};

fn create_bench_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = image::Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

fn bench_watermark_render(c: &mut Criterion) {
    let source = create_bench_image(1920, 1080);
    let renderer = WatermarkRenderer::from_face(FontFace::embedded(), false);

    let linear = WatermarkJob::builder()
        .text("© 2024 Bench Studio")
        .color(Color::white())
        .opacity_percent(50)
        .linear(3, Anchor::BottomRight)
        .author("Bench Author")
        .build()
        .unwrap();

    let mosaic = WatermarkJob::builder()
        .text("© 2024 Bench Studio")
        .color(Color::white())
        .opacity_percent(30)
        .font("Arial", false, 3.0)
        .mosaic(1.5, 1.5)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("watermark_render");
    group.sample_size(10); // Image ops are slow, reduce sample size

    group.bench_function("linear_1080p", |b| {
        b.iter(|| renderer.render(black_box(&source), black_box(&linear)).unwrap())
    });

    group.bench_function("mosaic_1080p", |b| {
        b.iter(|| renderer.render(black_box(&source), black_box(&mosaic)).unwrap())
    });

    group.bench_function("mosaic_1080p_with_jpeg_encode", |b| {
        b.iter(|| {
            let rgb = renderer.render(black_box(&source), black_box(&mosaic)).unwrap();
            encode_jpeg(&rgb, JPEG_QUALITY).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_watermark_render);
criterion_main!(benches);
