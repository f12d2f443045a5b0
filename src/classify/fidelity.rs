// Adaptive fidelity: clipped high-DPI re-renders for small figures, and the
// low-vs-high resolution probe that flags probable upscaled raster sources.

use image::DynamicImage;
use tracing::{debug, warn};

use crate::config::detector::DetectorConfig;
use crate::detect::edges::{sobel, threshold};
use crate::page::{PageSource, PdfRect, RenderedPage};

/// The pixel buffer chosen for persistence plus the probe verdict.
pub struct FidelityOutcome {
    pub image: DynamicImage,
    /// DPI the buffer was rendered at (the page DPI when no upgrade ran).
    pub dpi: u32,
    /// True when the upscale probe saw too little edge-detail gain.
    /// Informational only; never rejects.
    pub upscale_suspect: bool,
}

/// Crop the figure from the page raster, escalating through clipped
/// re-renders until the smallest output dimension clears the quality floor
/// (or the DPI ladder is exhausted — best effort, not an error).
///
/// A failing re-render degrades to the best buffer so far; fidelity trouble
/// must never take down a candidate that already has usable pixels.
pub fn upgrade(
    source: &dyn PageSource,
    page: &RenderedPage,
    region_pts: &PdfRect,
    cfg: &DetectorConfig,
) -> FidelityOutcome {
    let bbox = page.to_pixel_rect(region_pts);
    let base = page.image.crop_imm(bbox.x, bbox.y, bbox.w, bbox.h);

    if base.width().min(base.height()) >= cfg.min_output_px {
        return FidelityOutcome {
            image: base,
            dpi: page.dpi,
            upscale_suspect: false,
        };
    }

    let mut best = base;
    let mut best_dpi = page.dpi;
    for &dpi in &cfg.fidelity_dpi_steps {
        if dpi <= best_dpi {
            continue;
        }
        match source.render_region(page.index, region_pts, dpi) {
            Ok(rendered) => {
                debug!(
                    page = page.index,
                    dpi,
                    width = rendered.width(),
                    height = rendered.height(),
                    "clipped re-render for small figure"
                );
                best = rendered;
                best_dpi = dpi;
                if best.width().min(best.height()) >= cfg.min_output_px {
                    break;
                }
            }
            Err(e) => {
                warn!(page = page.index, dpi, error = %e, "clip re-render failed; keeping previous buffer");
                break;
            }
        }
    }

    // The probe only makes sense where a re-render happened anyway; figures
    // already above the floor are served straight from the page raster.
    let upscale_suspect = probe_upscale(source, page.index, region_pts, cfg);

    FidelityOutcome {
        image: best,
        dpi: best_dpi,
        upscale_suspect,
    }
}

/// Compare edge density between a low- and a high-DPI re-render of the same
/// rectangle. Vector art keeps gaining edge detail with resolution; an
/// upscaled raster source does not. Probe failures report "not suspect".
fn probe_upscale(
    source: &dyn PageSource,
    page_index: u32,
    region_pts: &PdfRect,
    cfg: &DetectorConfig,
) -> bool {
    let (low, high) = match (
        source.render_region(page_index, region_pts, cfg.probe_low_dpi),
        source.render_region(page_index, region_pts, cfg.probe_high_dpi),
    ) {
        (Ok(low), Ok(high)) => (low, high),
        (Err(e), _) | (_, Err(e)) => {
            warn!(page = page_index, error = %e, "upscale probe render failed");
            return false;
        }
    };

    let low_density = edge_density_of(&low, cfg.fine_edge_threshold);
    let high_density = edge_density_of(&high, cfg.fine_edge_threshold);

    // A featureless crop has no gain to measure; do not flag it.
    if low_density <= 0.0 {
        return false;
    }

    let gain = high_density / low_density;
    debug!(
        page = page_index,
        low_density, high_density, gain, "upscale probe"
    );
    gain < cfg.upscale_gain_min
}

/// Edge-pixel fraction of an arbitrary buffer at the fine threshold.
fn edge_density_of(image: &DynamicImage, edge_threshold: u8) -> f32 {
    let gray = image.to_luma8();
    let total = (gray.width() as u64 * gray.height() as u64).max(1);
    let field = sobel(&gray);
    let binary = threshold(&field, edge_threshold);
    let on: u64 = binary.data.iter().map(|&b| b as u64).sum();
    on as f32 / total as f32
}
