// Placement properties swept over many canvas and text sizes

use copymark::watermark::position::{mosaic_center, rotated_bounds};
use copymark::watermark::{
    compute_placements, Anchor, GlyphRun, ImageDimensions, LayoutMode, WatermarkDimensions,
};

fn canvas(width: u32, height: u32) -> ImageDimensions {
    ImageDimensions { width, height }
}

fn text(width: u32, height: u32) -> WatermarkDimensions {
    WatermarkDimensions { width, height }
}

const CANVASES: &[(u32, u32)] = &[(1, 1), (64, 48), (640, 480), (1000, 800), (1920, 1080), (300, 2000)];
const TEXTS: &[(u32, u32)] = &[(1, 1), (40, 12), (180, 37), (900, 120)];

#[test]
fn test_mosaic_kept_tiles_intersect_canvas() {
    for &(cw, ch) in CANVASES {
        for &(tw, th) in TEXTS {
            let plan = compute_placements(
                &canvas(cw, ch),
                &text(tw, th),
                &LayoutMode::Mosaic {
                    spacing_h: 1.5,
                    spacing_v: 1.5,
                },
                None,
            );
            let grid = plan.mosaic.unwrap();

            for p in &plan.placements {
                let right = p.position.x + grid.tile.width as i32;
                let bottom = p.position.y + grid.tile.height as i32;
                let intersects =
                    p.position.x < cw as i32 && p.position.y < ch as i32 && right > 0 && bottom > 0;
                assert_eq!(!p.discard, intersects, "canvas {}x{} text {}x{}", cw, ch, tw, th);
                assert_eq!(p.rotation_degrees, -15.0);
            }
            assert!(plan.visible().count() >= 1);
        }
    }
}

#[test]
fn test_mosaic_stagger_is_half_spacing() {
    let plan = compute_placements(
        &canvas(1920, 1080),
        &text(180, 37),
        &LayoutMode::Mosaic {
            spacing_h: 2.0,
            spacing_v: 1.0,
        },
        None,
    );
    let grid = plan.mosaic.unwrap();

    for column in 0..grid.columns {
        for row in (0..grid.rows.saturating_sub(1)).step_by(2) {
            let (even_x, _) = mosaic_center(&grid, column, row);
            let (odd_x, _) = mosaic_center(&grid, column, row + 1);
            assert!((odd_x - even_x - grid.spacing_x / 2.0).abs() < 1e-3);
        }
    }
}

#[test]
fn test_mosaic_tile_size_matches_rotated_scratch() {
    let plan = compute_placements(
        &canvas(800, 600),
        &text(200, 40),
        &LayoutMode::Mosaic {
            spacing_h: 1.5,
            spacing_v: 1.5,
        },
        None,
    );
    let grid = plan.mosaic.unwrap();
    assert_eq!(
        (grid.tile.width, grid.tile.height),
        rotated_bounds(300, 300, -15.0)
    );
}

#[test]
fn test_linear_bottom_right_three_lines_property() {
    for &(cw, ch) in CANVASES {
        for &(tw, th) in TEXTS {
            let plan = compute_placements(
                &canvas(cw, ch),
                &text(tw, th),
                &LayoutMode::Linear {
                    count: 3,
                    anchor: Anchor::BottomRight,
                },
                None,
            );
            let ys: Vec<i32> = plan.placements.iter().map(|p| p.position.y).collect();
            assert!(ys[0] < ys[1] && ys[1] < ys[2]);
            for p in &plan.placements {
                assert_eq!(p.position.x, cw as i32 - tw as i32 - 10);
                assert!(!p.discard);
            }
        }
    }
}

#[test]
fn test_signature_follows_last_line_for_every_anchor() {
    for anchor in Anchor::ALL {
        let plan = compute_placements(
            &canvas(1000, 800),
            &text(180, 37),
            &LayoutMode::Linear { count: 2, anchor },
            Some(&text(120, 30)),
        );
        assert_eq!(plan.placements.len(), 3);
        let last = plan.last_primary().unwrap();
        let signature = plan.placements[2];
        assert_eq!(signature.run, GlyphRun::Signature);
        assert_eq!(signature.position.y, last.position.y + 37 + 5);
    }
}
