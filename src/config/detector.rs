// Every detection/gating threshold in one place, passed explicitly into the
// pipeline. Values are empirically tuned defaults, overridable from YAML or
// directly in tests; none of them is a physical constant.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // --- candidate generation -------------------------------------------
    /// Gradient-magnitude cutoff for the coarse (large-shape) edge pass.
    pub coarse_edge_threshold: u8,
    /// Gradient-magnitude cutoff for the fine (small-token) edge pass.
    pub fine_edge_threshold: u8,
    /// Dilation radius in pixels for the coarse pass.
    pub coarse_dilation_radius: u32,
    /// Dilation radius in pixels for the fine pass.
    pub fine_dilation_radius: u32,
    /// Margin added around each text block when building the text mask, in
    /// PDF points.
    pub text_mask_margin_pts: f32,

    // --- raw bbox gates --------------------------------------------------
    /// Absolute minimum candidate area in pixels.
    pub min_area_px: u64,
    /// Minimum candidate area as a fraction of page area.
    pub min_area_page_ratio: f32,
    /// Maximum candidate area as a fraction of page area.
    pub max_area_page_ratio: f32,
    /// Excluded strip on the left/right edges, as a fraction of page width.
    pub border_margin_x_ratio: f32,
    /// Excluded strip on the top/bottom edges, as a fraction of page height.
    pub border_margin_y_ratio: f32,
    /// Maximum long-side / short-side ratio before a box counts as a banner.
    pub max_aspect_ratio: f32,

    // --- text-panel heuristic (all three must hold to reject) ------------
    pub text_edge_density_min: f32,
    /// Connected components per pixel above which a box looks like glyphs.
    pub text_component_density_min: f32,
    /// Horizontal-to-vertical edge energy ratio typical of text lines.
    pub text_hv_energy_ratio_min: f32,

    /// Candidates with IoU at or above this merge into their enclosing box.
    pub merge_iou_threshold: f32,

    // --- role / coverage gates -------------------------------------------
    /// Coverage on both axes at or above this is full-page art.
    pub art_coverage: f32,
    /// Coverage on both axes at or above this is a large illustration.
    pub illustration_coverage: f32,
    /// Coverage below this on both axes rejects as a micro fragment.
    pub micro_coverage: f32,
    /// Coverage above this on both axes rejects as a near-full-page remnant.
    pub remnant_coverage: f32,

    // --- size tiers -------------------------------------------------------
    /// BOARD when coverage reaches this on both axes...
    pub board_coverage: f32,
    /// ...or physical size reaches this many inches on both axes.
    pub board_min_inches: f32,
    /// ICON when smaller than this many inches on both axes...
    pub icon_max_inches: f32,
    /// ...and coverage stays below this on both axes.
    pub icon_max_coverage: f32,
    /// Minimum physical side for MID-tier candidates, in inches.
    pub mid_min_inches: f32,
    /// Minimum physical side for ICON-tier candidates, in inches (looser,
    /// to favor recall on small tokens).
    pub icon_min_inches: f32,
    /// Minimum physical area for MID-tier candidates, in square inches.
    pub mid_min_area_in2: f32,
    /// Minimum physical area for ICON-tier candidates, in square inches.
    pub icon_min_area_in2: f32,

    /// Fraction of candidate area covered by text blocks at or above which
    /// the candidate is a caption panel. Hard reject.
    pub text_overlap_max: f32,

    // --- flat-background heuristic (all three must hold to reject) -------
    pub flat_edge_density_max: f32,
    pub flat_luma_stddev_max: f32,
    pub flat_uniformity_min: f32,
    /// Pixels within this distance of the median luma count as uniform.
    pub uniformity_luma_window: u8,

    // --- likeness score weights ------------------------------------------
    pub score_weight_area: f32,
    pub score_weight_aspect: f32,
    pub score_weight_edge: f32,
    pub score_weight_variance: f32,

    // --- fidelity upgrade -------------------------------------------------
    /// Minimum acceptable output dimension in pixels; smaller accepted
    /// figures trigger a clipped re-render.
    pub min_output_px: u32,
    /// DPI escalation ladder for clipped re-renders, tried in order.
    pub fidelity_dpi_steps: Vec<u32>,
    /// DPI pair used by the upscale probe (low, high re-render).
    pub probe_low_dpi: u32,
    pub probe_high_dpi: u32,
    /// Edge-density gain below this flags a probable upscaled raster.
    pub upscale_gain_min: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            coarse_edge_threshold: 48,
            fine_edge_threshold: 24,
            coarse_dilation_radius: 4,
            fine_dilation_radius: 1,
            text_mask_margin_pts: 4.0,

            min_area_px: 900,
            min_area_page_ratio: 0.0005,
            max_area_page_ratio: 0.95,
            border_margin_x_ratio: 0.04,
            border_margin_y_ratio: 0.05,
            max_aspect_ratio: 6.0,

            text_edge_density_min: 0.18,
            text_component_density_min: 0.0008,
            text_hv_energy_ratio_min: 1.8,

            merge_iou_threshold: 0.40,

            art_coverage: 0.80,
            illustration_coverage: 0.60,
            micro_coverage: 0.03,
            remnant_coverage: 0.85,

            board_coverage: 0.50,
            board_min_inches: 4.0,
            icon_max_inches: 1.0,
            icon_max_coverage: 0.15,
            mid_min_inches: 0.30,
            icon_min_inches: 0.10,
            mid_min_area_in2: 0.12,
            icon_min_area_in2: 0.02,

            text_overlap_max: 0.08,

            flat_edge_density_max: 0.02,
            flat_luma_stddev_max: 6.0,
            flat_uniformity_min: 0.92,
            uniformity_luma_window: 15,

            score_weight_area: 0.30,
            score_weight_aspect: 0.25,
            score_weight_edge: 0.25,
            score_weight_variance: 0.20,

            min_output_px: 96,
            fidelity_dpi_steps: vec![300, 600],
            probe_low_dpi: 72,
            probe_high_dpi: 288,
            upscale_gain_min: 1.15,
        }
    }
}
