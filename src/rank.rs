// Likeness scoring and the per-page total order.

use crate::classify::{Classified, SizeTier};
use crate::config::detector::DetectorConfig;
use crate::detect::metrics::RegionStats;
use crate::detect::CandidateRegion;

/// An accepted region with every computed metric, scored and ranked within
/// its page. Immutable after ranking, except for the informational
/// upscale-probe flag set by the fidelity upgrader.
#[derive(Debug, Clone)]
pub struct Figure {
    pub region: CandidateRegion,
    pub width_in: f32,
    pub height_in: f32,
    pub coverage_x: f32,
    pub coverage_y: f32,
    pub stats: RegionStats,
    pub tier: SizeTier,
    pub score: f32,
    /// 0-based position in the page's deterministic order.
    pub rank: u32,
    pub upscale_suspect: bool,
}

/// Component-likeness score: a clamped weighted sum of banding bonuses.
/// Bands, not raw values, so one extreme metric cannot dominate the order.
pub fn likeness_score(
    width_in: f32,
    height_in: f32,
    stats: &RegionStats,
    cfg: &DetectorConfig,
) -> f32 {
    let score = cfg.score_weight_area * area_band(width_in * height_in)
        + cfg.score_weight_aspect * aspect_band(width_in, height_in)
        + cfg.score_weight_edge * edge_band(stats.edge_density)
        + cfg.score_weight_variance * variance_band(stats.luma_stddev);
    score.clamp(0.0, 1.0)
}

/// Physical areas around typical component sizes earn the full bonus.
fn area_band(area_in2: f32) -> f32 {
    if (0.25..=9.0).contains(&area_in2) {
        1.0
    } else if (0.05..=16.0).contains(&area_in2) {
        0.5
    } else {
        0.1
    }
}

/// Near-square boxes are the most component-like.
fn aspect_band(width_in: f32, height_in: f32) -> f32 {
    let long = width_in.max(height_in);
    let short = width_in.min(height_in).max(f32::EPSILON);
    let aspect = long / short;
    if aspect <= 1.5 {
        1.0
    } else if aspect <= 3.0 {
        0.6
    } else {
        0.2
    }
}

/// Moderate edge density: enough structure to be art, not so much that it
/// reads as texture or glyphs.
fn edge_band(edge_density: f32) -> f32 {
    if (0.03..=0.35).contains(&edge_density) {
        1.0
    } else if edge_density <= 0.60 {
        0.5
    } else {
        0.2
    }
}

fn variance_band(luma_stddev: f32) -> f32 {
    if luma_stddev >= 24.0 {
        1.0
    } else if luma_stddev >= 10.0 {
        0.6
    } else {
        0.2
    }
}

/// Score and order one page's survivors by (−score, x0, y0, width, height).
/// The key covers every field of the box, so the order is total: no ties.
pub fn rank_figures(classified: Vec<Classified>, cfg: &DetectorConfig) -> Vec<Figure> {
    let mut figures: Vec<Figure> = classified
        .into_iter()
        .map(|c| {
            let score = likeness_score(c.width_in, c.height_in, &c.stats, cfg);
            Figure {
                region: c.region,
                width_in: c.width_in,
                height_in: c.height_in,
                coverage_x: c.coverage_x,
                coverage_y: c.coverage_y,
                stats: c.stats,
                tier: c.tier,
                score,
                rank: 0,
                upscale_suspect: false,
            }
        })
        .collect();

    figures.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.region.bbox_px.x.cmp(&b.region.bbox_px.x))
            .then_with(|| a.region.bbox_px.y.cmp(&b.region.bbox_px.y))
            .then_with(|| a.region.bbox_px.w.cmp(&b.region.bbox_px.w))
            .then_with(|| a.region.bbox_px.h.cmp(&b.region.bbox_px.h))
    });

    for (i, figure) in figures.iter_mut().enumerate() {
        figure.rank = i as u32;
    }

    figures
}
