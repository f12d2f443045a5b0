// Boolean gate heuristics as pure functions over precomputed scalars.
//
// The two three-way heuristics intentionally require ALL of their conditions:
// a dense but genuine illustration fails the glyph-density test, and
// low-contrast but structured art fails the uniformity test, so neither is
// rejected by a single noisy metric.

use crate::config::detector::DetectorConfig;

/// Text-panel heuristic: high edge density AND many small glyph-like
/// components AND horizontally dominated edge energy.
pub fn is_text_panel(
    edge_density: f32,
    component_density: f32,
    hv_energy_ratio: f32,
    cfg: &DetectorConfig,
) -> bool {
    edge_density >= cfg.text_edge_density_min
        && component_density >= cfg.text_component_density_min
        && hv_energy_ratio >= cfg.text_hv_energy_ratio_min
}

/// Flat-background heuristic: low edge density AND low luma variance AND
/// high uniformity.
pub fn is_flat_background(
    edge_density: f32,
    luma_stddev: f32,
    uniformity: f32,
    cfg: &DetectorConfig,
) -> bool {
    edge_density <= cfg.flat_edge_density_max
        && luma_stddev <= cfg.flat_luma_stddev_max
        && uniformity >= cfg.flat_uniformity_min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_panel_requires_all_three() {
        let cfg = DetectorConfig::default();
        // All three above threshold: reject.
        assert!(is_text_panel(0.30, 0.002, 2.5, &cfg));
        // Dense illustration: few components, balanced energy.
        assert!(!is_text_panel(0.30, 0.0001, 1.0, &cfg));
        // Glyph-like but vertically dominated (e.g. a fence pattern).
        assert!(!is_text_panel(0.30, 0.002, 0.8, &cfg));
        // Sparse edges.
        assert!(!is_text_panel(0.05, 0.002, 2.5, &cfg));
    }

    #[test]
    fn test_flat_background_requires_all_three() {
        let cfg = DetectorConfig::default();
        assert!(is_flat_background(0.01, 2.0, 0.99, &cfg));
        // Low-contrast but structured art: edges present.
        assert!(!is_flat_background(0.10, 2.0, 0.99, &cfg));
        // Noisy texture: high variance.
        assert!(!is_flat_background(0.01, 30.0, 0.99, &cfg));
        // Bimodal fill: low uniformity.
        assert!(!is_flat_background(0.01, 2.0, 0.50, &cfg));
    }
}
