// Role and quality gating of generator-accepted candidates, plus size-tier
// assignment.

pub mod fidelity;

use crate::config::detector::DetectorConfig;
use crate::detect::metrics::RegionStats;
use crate::detect::{gates, CandidateRegion, RejectedRegion};
use crate::page::RenderedPage;

/// Coarse physical-size class selecting which floors apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Icon,
    Mid,
    Board,
}

impl SizeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Icon => "icon",
            SizeTier::Mid => "mid",
            SizeTier::Board => "board",
        }
    }
}

/// A candidate that survived every role/quality gate, with its measured
/// geometry and statistics. The ranker turns these into ordered figures.
#[derive(Debug, Clone)]
pub struct Classified {
    pub region: CandidateRegion,
    pub width_in: f32,
    pub height_in: f32,
    pub coverage_x: f32,
    pub coverage_y: f32,
    pub stats: RegionStats,
    pub tier: SizeTier,
}

/// Run the role/coverage/tier/overlap/background gates for one candidate.
///
/// Gate order is load-bearing: full-page art first, then large
/// illustrations, then tiering and tier floors, fragment/remnant checks,
/// the non-negotiable text-overlap gate, and the flat-background heuristic
/// last.
pub fn evaluate(
    region: CandidateRegion,
    page: &RenderedPage,
    stats: RegionStats,
    cfg: &DetectorConfig,
) -> Result<Classified, RejectedRegion> {
    let coverage_x = region.bbox_px.w as f32 / page.width() as f32;
    let coverage_y = region.bbox_px.h as f32 / page.height() as f32;
    let width_in = region.bbox_px.w as f32 / page.dpi as f32;
    let height_in = region.bbox_px.h as f32 / page.dpi as f32;

    if coverage_x >= cfg.art_coverage && coverage_y >= cfg.art_coverage {
        return Err(RejectedRegion::new(
            region,
            format!(
                "full_page_coverage (coverage={:.2}x{:.2} limit={:.2})",
                coverage_x, coverage_y, cfg.art_coverage
            ),
        ));
    }
    if coverage_x >= cfg.illustration_coverage && coverage_y >= cfg.illustration_coverage {
        return Err(RejectedRegion::new(
            region,
            format!(
                "large_illustration (coverage={:.2}x{:.2} limit={:.2})",
                coverage_x, coverage_y, cfg.illustration_coverage
            ),
        ));
    }

    let tier = classify_tier(width_in, height_in, coverage_x, coverage_y, cfg);

    let (min_side, min_area) = match tier {
        SizeTier::Icon => (cfg.icon_min_inches, cfg.icon_min_area_in2),
        SizeTier::Mid | SizeTier::Board => (cfg.mid_min_inches, cfg.mid_min_area_in2),
    };
    if width_in < min_side || height_in < min_side {
        return Err(RejectedRegion::new(
            region,
            format!(
                "tier_floor (tier={} size={:.2}x{:.2}in min_side={:.2}in)",
                tier.as_str(),
                width_in,
                height_in,
                min_side
            ),
        ));
    }
    if width_in * height_in < min_area {
        return Err(RejectedRegion::new(
            region,
            format!(
                "tier_floor (tier={} area={:.3}in2 min_area={:.3}in2)",
                tier.as_str(),
                width_in * height_in,
                min_area
            ),
        ));
    }

    if coverage_x < cfg.micro_coverage && coverage_y < cfg.micro_coverage {
        return Err(RejectedRegion::new(
            region,
            format!(
                "micro_fragment (coverage={:.3}x{:.3} min={:.3})",
                coverage_x, coverage_y, cfg.micro_coverage
            ),
        ));
    }
    if coverage_x > cfg.remnant_coverage && coverage_y > cfg.remnant_coverage {
        return Err(RejectedRegion::new(
            region,
            format!(
                "page_remnant (coverage={:.2}x{:.2} max={:.2})",
                coverage_x, coverage_y, cfg.remnant_coverage
            ),
        ));
    }

    // Any material text overlap signals a caption panel. Hard gate.
    if stats.text_overlap >= cfg.text_overlap_max {
        return Err(RejectedRegion::new(
            region,
            format!(
                "text_panel (overlap={:.3} max={:.3})",
                stats.text_overlap, cfg.text_overlap_max
            ),
        ));
    }

    if gates::is_flat_background(stats.edge_density, stats.luma_stddev, stats.uniformity, cfg) {
        return Err(RejectedRegion::new(
            region,
            format!(
                "flat_background (edge_density={:.3} luma_stddev={:.1} uniformity={:.2})",
                stats.edge_density, stats.luma_stddev, stats.uniformity
            ),
        ));
    }

    Ok(Classified {
        region,
        width_in,
        height_in,
        coverage_x,
        coverage_y,
        stats,
        tier,
    })
}

/// BOARD on coverage or physical size, ICON only when both small and low
/// coverage, MID otherwise.
pub fn classify_tier(
    width_in: f32,
    height_in: f32,
    coverage_x: f32,
    coverage_y: f32,
    cfg: &DetectorConfig,
) -> SizeTier {
    let board_by_coverage = coverage_x >= cfg.board_coverage && coverage_y >= cfg.board_coverage;
    let board_by_size = width_in >= cfg.board_min_inches && height_in >= cfg.board_min_inches;
    if board_by_coverage || board_by_size {
        return SizeTier::Board;
    }

    let small = width_in < cfg.icon_max_inches && height_in < cfg.icon_max_inches;
    let low_coverage = coverage_x < cfg.icon_max_coverage && coverage_y < cfg.icon_max_coverage;
    if small && low_coverage {
        return SizeTier::Icon;
    }

    SizeTier::Mid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_small_low_coverage_is_icon() {
        let cfg = DetectorConfig::default();
        // 0.5in x 0.5in at 5% page coverage
        assert_eq!(classify_tier(0.5, 0.5, 0.05, 0.05, &cfg), SizeTier::Icon);
    }

    #[test]
    fn test_tier_large_coverage_is_board() {
        let cfg = DetectorConfig::default();
        // 4.5in x 5in at 60% coverage
        assert_eq!(classify_tier(4.5, 5.0, 0.60, 0.60, &cfg), SizeTier::Board);
    }

    #[test]
    fn test_tier_physical_size_alone_makes_board() {
        let cfg = DetectorConfig::default();
        assert_eq!(classify_tier(4.0, 4.2, 0.30, 0.30, &cfg), SizeTier::Board);
    }

    #[test]
    fn test_tier_small_but_high_coverage_is_mid() {
        let cfg = DetectorConfig::default();
        // Physically small yet covering a fifth of a tiny page: not an icon.
        assert_eq!(classify_tier(0.8, 0.8, 0.20, 0.20, &cfg), SizeTier::Mid);
    }
}
