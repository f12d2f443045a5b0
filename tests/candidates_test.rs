mod common;

use common::{blank_page, draw_square, SyntheticSource};
use component_extract::config::detector::DetectorConfig;
use component_extract::detect::candidates::generate_candidates;
use component_extract::page::{PageSource, PdfRect, TextBlock};

fn three_square_source() -> SyntheticSource {
    let mut image = blank_page(1000, 1400);
    draw_square(&mut image, 100, 200, 150);
    draw_square(&mut image, 400, 200, 100);
    draw_square(&mut image, 700, 200, 60);
    SyntheticSource::single(image, 150)
}

#[test]
fn test_blank_page_yields_empty_lists_not_error() {
    let source = SyntheticSource::single(blank_page(800, 1000), 150);
    let page = common::base_render(&source, 0);
    let cfg = DetectorConfig::default();

    let (outcome, _) = generate_candidates(&page, &[], &cfg);
    assert!(outcome.accepted.is_empty());
    assert!(outcome.rejected.is_empty());
}

#[test]
fn test_distinct_shapes_are_detected() {
    let source = three_square_source();
    let page = common::base_render(&source, 0);
    let cfg = DetectorConfig::default();

    let (outcome, _) = generate_candidates(&page, &[], &cfg);
    assert_eq!(
        outcome.accepted.len(),
        3,
        "three well-separated squares should survive: {:?}",
        outcome.accepted
    );
    // (y, x, -area) order: same row, so left to right.
    assert!(outcome.accepted[0].bbox_px.x < outcome.accepted[1].bbox_px.x);
    assert!(outcome.accepted[1].bbox_px.x < outcome.accepted[2].bbox_px.x);
}

#[test]
fn test_generator_is_deterministic() {
    let source = three_square_source();
    let page = common::base_render(&source, 0);
    let cfg = DetectorConfig::default();

    let (first, _) = generate_candidates(&page, &[], &cfg);
    let (second, _) = generate_candidates(&page, &[], &cfg);

    assert_eq!(first.accepted, second.accepted);
    assert_eq!(first.rejected, second.rejected);
}

#[test]
fn test_merge_soundness_no_accepted_pair_overlaps() {
    // The coarse and fine passes both see every square, so the pooled list
    // starts with near-duplicate boxes that must collapse.
    let source = three_square_source();
    let page = common::base_render(&source, 0);
    let cfg = DetectorConfig::default();

    let (outcome, _) = generate_candidates(&page, &[], &cfg);
    assert!(outcome.accepted.iter().any(|c| c.merged));
    for i in 0..outcome.accepted.len() {
        for j in (i + 1)..outcome.accepted.len() {
            let iou = outcome.accepted[i]
                .bbox_px
                .iou(&outcome.accepted[j].bbox_px);
            assert!(
                iou < cfg.merge_iou_threshold,
                "accepted pair {i}/{j} retains IoU {iou}"
            );
        }
    }
}

#[test]
fn test_raising_min_area_never_increases_accepted_count() {
    let source = three_square_source();
    let page = common::base_render(&source, 0);

    let mut previous = usize::MAX;
    for min_area in [0u64, 900, 5000, 30000, 200000] {
        let cfg = DetectorConfig {
            min_area_px: min_area,
            ..DetectorConfig::default()
        };
        let (outcome, _) = generate_candidates(&page, &[], &cfg);
        assert!(
            outcome.accepted.len() <= previous,
            "min_area_px={min_area} increased accepted count to {}",
            outcome.accepted.len()
        );
        previous = outcome.accepted.len();
    }
}

#[test]
fn test_shape_touching_top_margin_is_rejected_as_border() {
    let mut image = blank_page(1000, 1400);
    draw_square(&mut image, 300, 10, 100);
    let source = SyntheticSource::single(image, 150);
    let page = common::base_render(&source, 0);
    let cfg = DetectorConfig::default();

    let (outcome, _) = generate_candidates(&page, &[], &cfg);
    assert!(outcome.accepted.is_empty());
    assert!(
        outcome.rejected.iter().any(|r| r.gate() == "border_top"),
        "expected a border_top rejection, got {:?}",
        outcome
            .rejected
            .iter()
            .map(|r| r.reason.clone())
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_every_contour_lands_in_exactly_one_list() {
    let source = three_square_source();
    let page = common::base_render(&source, 0);
    let cfg = DetectorConfig::default();

    let (outcome, _) = generate_candidates(&page, &[], &cfg);
    for accepted in &outcome.accepted {
        assert!(
            !outcome.rejected.iter().any(|r| r.region == *accepted),
            "region is both accepted and rejected"
        );
    }
}

#[test]
fn test_text_blocks_suppress_glyph_edges() {
    // The same shape once bare and once fully covered by a text block: the
    // masked page must not produce a candidate there.
    let mut image = blank_page(1000, 1400);
    draw_square(&mut image, 400, 300, 120);
    let blocks = vec![TextBlock {
        rect: PdfRect::new(180.0, 130.0, 260.0, 220.0), // covers the square, in points
    }];
    let mut source = SyntheticSource::single(image, 150);
    source.pages[0].blocks = blocks;

    let page = common::base_render(&source, 0);
    let text_blocks = source.text_blocks(0).unwrap();
    let cfg = DetectorConfig::default();

    let (outcome, _) = generate_candidates(&page, &text_blocks, &cfg);
    assert!(
        outcome.accepted.is_empty(),
        "masked shape must not seed a candidate: {:?}",
        outcome.accepted
    );
}
