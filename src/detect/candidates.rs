// Candidate generation: two edge-sensitivity passes over the masked raster,
// pooled contours, the raw-bbox gate chain, and IoU merging.

use tracing::debug;

use crate::config::detector::DetectorConfig;
use crate::detect::contours::{connected_components, Blob};
use crate::detect::edges::{dilate, sobel, suppress_masked, threshold, BitMap, GradientField};
use crate::detect::gates;
use crate::detect::mask::TextMask;
use crate::detect::metrics;
use crate::detect::{CandidateRegion, DetectionOutcome, RejectedRegion};
use crate::page::{RenderedPage, TextBlock};

/// Working buffers shared by the generator and the later quality gates, so
/// the page is converted and differentiated exactly once.
pub struct PageAnalysis {
    pub gray: image::GrayImage,
    pub field: GradientField,
    pub fine_edges: BitMap,
    /// Exact (unexpanded) text occupancy, for overlap measurement.
    pub overlap_mask: TextMask,
}

/// Run both edge passes and the raw-bbox gate chain for one page.
///
/// Every pooled contour box ends up in exactly one of the outcome's lists.
/// A page with no contours at all yields two empty lists, not an error.
pub fn generate_candidates(
    page: &RenderedPage,
    blocks: &[TextBlock],
    cfg: &DetectorConfig,
) -> (DetectionOutcome, PageAnalysis) {
    let gray = page.image.to_luma8();

    let expanded_mask = TextMask::build(page, blocks, cfg.text_mask_margin_pts);
    let overlap_mask = TextMask::build(page, blocks, 0.0);

    let mut field = sobel(&gray);
    suppress_masked(&mut field, &expanded_mask);

    // Coarse pass closes large outlines; fine pass keeps small tokens that
    // wide dilation would smear together. Contours are pooled so neither
    // pass suppresses the other's detections.
    let coarse = dilate(&threshold(&field, cfg.coarse_edge_threshold), cfg.coarse_dilation_radius);
    let fine = dilate(&threshold(&field, cfg.fine_edge_threshold), cfg.fine_dilation_radius);

    let mut blobs = connected_components(&coarse);
    blobs.extend(connected_components(&fine));

    debug!(
        page = page.index,
        contours = blobs.len(),
        "pooled contours from both edge passes"
    );

    let fine_edges = fine;
    let mut outcome = DetectionOutcome::default();

    for blob in &blobs {
        match gate_raw_bbox(page, blob, &field, &fine_edges, cfg) {
            Ok(candidate) => outcome.accepted.push(candidate),
            Err(rejected) => outcome.rejected.push(rejected),
        }
    }

    sort_candidates(&mut outcome.accepted);
    merge_overlapping(&mut outcome.accepted, page, cfg.merge_iou_threshold);

    sort_candidates(&mut outcome.accepted);
    outcome.rejected.sort_by(|a, b| region_key(&a.region).cmp(&region_key(&b.region)));

    (
        outcome,
        PageAnalysis {
            gray,
            field,
            fine_edges,
            overlap_mask,
        },
    )
}

/// Ordering key (y, x, −area) shared by both output lists.
fn region_key(c: &CandidateRegion) -> (u32, u32, i64) {
    (c.bbox_px.y, c.bbox_px.x, -(c.area_px as i64))
}

fn sort_candidates(candidates: &mut [CandidateRegion]) {
    candidates.sort_by(|a, b| region_key(a).cmp(&region_key(b)));
}

/// The ordered raw-bbox gate chain: area, border margins, aspect ceiling,
/// text-panel heuristic.
fn gate_raw_bbox(
    page: &RenderedPage,
    blob: &Blob,
    field: &GradientField,
    fine_edges: &BitMap,
    cfg: &DetectorConfig,
) -> Result<CandidateRegion, RejectedRegion> {
    let bbox = blob.bbox;
    let region = CandidateRegion {
        bbox_px: bbox,
        bbox_pts: page.to_pdf_rect(&bbox),
        area_px: bbox.area(),
        confidence: blob.fill_ratio(),
        merged: false,
    };

    let page_area = page.width() as u64 * page.height() as u64;
    let min_area = cfg
        .min_area_px
        .max((page_area as f64 * cfg.min_area_page_ratio as f64) as u64);
    if region.area_px < min_area {
        return Err(RejectedRegion::new(
            region.clone(),
            format!("too_small (area={} min={})", region.area_px, min_area),
        ));
    }
    let max_area = (page_area as f64 * cfg.max_area_page_ratio as f64) as u64;
    if region.area_px > max_area {
        return Err(RejectedRegion::new(
            region.clone(),
            format!("oversize (area={} max={})", region.area_px, max_area),
        ));
    }

    // Border-exclusion margins: headers, footers, gutters.
    let margin_x = (page.width() as f32 * cfg.border_margin_x_ratio) as u32;
    let margin_y = (page.height() as f32 * cfg.border_margin_y_ratio) as u32;
    if bbox.y < margin_y {
        return Err(RejectedRegion::new(
            region.clone(),
            format!("border_top (y={} margin={})", bbox.y, margin_y),
        ));
    }
    if bbox.bottom() > page.height() - margin_y {
        return Err(RejectedRegion::new(
            region.clone(),
            format!(
                "border_bottom (bottom={} limit={})",
                bbox.bottom(),
                page.height() - margin_y
            ),
        ));
    }
    if bbox.x < margin_x {
        return Err(RejectedRegion::new(
            region.clone(),
            format!("border_left (x={} margin={})", bbox.x, margin_x),
        ));
    }
    if bbox.right() > page.width() - margin_x {
        return Err(RejectedRegion::new(
            region.clone(),
            format!(
                "border_right (right={} limit={})",
                bbox.right(),
                page.width() - margin_x
            ),
        ));
    }

    let long = bbox.w.max(bbox.h) as f32;
    let short = bbox.w.min(bbox.h).max(1) as f32;
    let aspect = long / short;
    if aspect > cfg.max_aspect_ratio {
        return Err(RejectedRegion::new(
            region.clone(),
            format!("extreme_aspect (aspect={:.2} max={:.2})", aspect, cfg.max_aspect_ratio),
        ));
    }

    let edge_density = metrics::edge_density(fine_edges, &bbox);
    let component_density = metrics::component_density(fine_edges, &bbox);
    let hv_ratio = metrics::hv_energy_ratio(field, &bbox);
    if gates::is_text_panel(edge_density, component_density, hv_ratio, cfg) {
        return Err(RejectedRegion::new(
            region.clone(),
            format!(
                "text_panel (edge_density={:.3} components={:.5} hv_ratio={:.2})",
                edge_density, component_density, hv_ratio
            ),
        ));
    }

    Ok(region)
}

/// Merge every pair with IoU at or above `threshold` into its enclosing box,
/// averaging confidence, until no such pair remains.
///
/// The scan always restarts from the lowest-indexed pair of the sorted list
/// and the enclosing-box union is order-insensitive within a cluster, so the
/// fixed point does not depend on merge order.
fn merge_overlapping(candidates: &mut Vec<CandidateRegion>, page: &RenderedPage, threshold: f32) {
    if threshold <= 0.0 {
        return;
    }
    'outer: loop {
        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                if candidates[i].bbox_px.iou(&candidates[j].bbox_px) >= threshold {
                    let absorbed = candidates.remove(j);
                    let merged = &mut candidates[i];
                    merged.bbox_px = merged.bbox_px.union(&absorbed.bbox_px);
                    merged.bbox_pts = page.to_pdf_rect(&merged.bbox_px);
                    merged.area_px = merged.bbox_px.area();
                    merged.confidence = (merged.confidence + absorbed.confidence) / 2.0;
                    merged.merged = true;
                    continue 'outer;
                }
            }
        }
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PixelRect;

    fn page(w: u32, h: u32) -> RenderedPage {
        RenderedPage {
            index: 0,
            image: image::DynamicImage::ImageRgba8(image::RgbaImage::new(w, h)),
            dpi: 72,
            page_width_pts: w as f32,
            page_height_pts: h as f32,
        }
    }

    fn candidate(p: &RenderedPage, x: u32, y: u32, w: u32, h: u32) -> CandidateRegion {
        let bbox = PixelRect::new(x, y, w, h);
        CandidateRegion {
            bbox_px: bbox,
            bbox_pts: p.to_pdf_rect(&bbox),
            area_px: bbox.area(),
            confidence: 0.5,
            merged: false,
        }
    }

    #[test]
    fn test_merge_collapses_high_iou_pair() {
        let p = page(500, 500);
        let mut list = vec![
            candidate(&p, 100, 100, 100, 100),
            candidate(&p, 110, 110, 100, 100),
        ];
        merge_overlapping(&mut list, &p, 0.40);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].bbox_px, PixelRect::new(100, 100, 110, 110));
        assert!(list[0].merged);
    }

    #[test]
    fn test_merge_leaves_disjoint_pair() {
        let p = page(500, 500);
        let mut list = vec![
            candidate(&p, 10, 10, 50, 50),
            candidate(&p, 300, 300, 50, 50),
        ];
        merge_overlapping(&mut list, &p, 0.40);
        assert_eq!(list.len(), 2);
        assert!(!list[0].merged);
    }

    #[test]
    fn test_merge_reaches_fixed_point_across_cluster() {
        // A chain where each neighbor overlaps: the cluster collapses into a
        // single enclosing box no matter the visit order.
        let p = page(1000, 1000);
        let mut list = vec![
            candidate(&p, 100, 100, 100, 100),
            candidate(&p, 130, 100, 100, 100),
            candidate(&p, 160, 100, 100, 100),
        ];
        merge_overlapping(&mut list, &p, 0.40);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].bbox_px, PixelRect::new(100, 100, 160, 100));
    }

    #[test]
    fn test_no_surviving_pair_above_threshold() {
        let p = page(1000, 1000);
        let mut list = vec![
            candidate(&p, 0, 0, 120, 120),
            candidate(&p, 60, 0, 120, 120),
            candidate(&p, 500, 500, 80, 80),
        ];
        merge_overlapping(&mut list, &p, 0.40);
        for i in 0..list.len() {
            for j in (i + 1)..list.len() {
                assert!(list[i].bbox_px.iou(&list[j].bbox_px) < 0.40);
            }
        }
    }
}
