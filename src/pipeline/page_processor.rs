// Per-page processing: mask → candidates → gates → tier/rank → fidelity →
// normalize → persist, strictly in deterministic order.

use std::path::Path;

use tracing::debug;

use crate::classify::{self, fidelity};
use crate::config::detector::DetectorConfig;
use crate::detect::candidates::generate_candidates;
use crate::detect::metrics;
use crate::detect::RejectedRegion;
use crate::health::ExtractionHealthMetrics;
use crate::normalize::{self, RawPixelBuffer};
use crate::page::PageSource;
use crate::persist::log::AttemptLog;
use crate::persist::store;
use crate::persist::{AttemptStatus, NormalizedImageResult};
use crate::rank::{rank_figures, Figure};

/// Everything one page produced. The rendered page itself is dropped before
/// this is returned; only records and figures survive.
pub struct PageOutcome {
    pub page_index: u32,
    pub figures: Vec<Figure>,
    pub rejected: Vec<RejectedRegion>,
    pub results: Vec<NormalizedImageResult>,
    pub health: ExtractionHealthMetrics,
}

/// Deterministic output name from the stable page/rank index, so re-running
/// on unchanged input reproduces identical filenames.
pub fn output_file_name(page_index: u32, figure_index: u32) -> String {
    format!("page_{page_index:04}_fig_{figure_index:02}.png")
}

/// Process one page end to end. Per-candidate conversion and save problems
/// become failed records; only infrastructure errors (rendering the page,
/// writing the log) propagate.
pub fn process_page(
    source: &dyn PageSource,
    page_index: u32,
    dpi: u32,
    overwrite: bool,
    output_dir: &Path,
    cfg: &DetectorConfig,
    log: &mut AttemptLog,
) -> crate::error::Result<PageOutcome> {
    let page = source.render_page(page_index, dpi)?;
    let blocks = source.text_blocks(page_index)?;

    let (detection, analysis) = generate_candidates(&page, &blocks, cfg);
    let mut rejected = detection.rejected;

    let mut classified = Vec::new();
    for candidate in detection.accepted {
        let stats = metrics::region_stats(
            &analysis.gray,
            &analysis.field,
            &analysis.fine_edges,
            &analysis.overlap_mask,
            &candidate.bbox_px,
            cfg.uniformity_luma_window,
        );
        match classify::evaluate(candidate, &page, stats, cfg) {
            Ok(c) => classified.push(c),
            Err(r) => rejected.push(r),
        }
    }

    let mut figures = rank_figures(classified, cfg);
    debug!(
        page = page_index,
        figures = figures.len(),
        rejected = rejected.len(),
        "page gating complete"
    );

    let mut results = Vec::with_capacity(figures.len());
    let mut health = ExtractionHealthMetrics::new();

    for figure in &mut figures {
        let upgraded = fidelity::upgrade(source, &page, &figure.region.bbox_pts, cfg);
        figure.upscale_suspect = upgraded.upscale_suspect;

        let target = output_dir.join(output_file_name(page_index, figure.rank));
        let raw = RawPixelBuffer::from_dynamic(&upgraded.image);
        let colorspace = raw.colorspace.family().to_string();

        let result = if target.exists() && !overwrite {
            NormalizedImageResult {
                page_index,
                figure_index: figure.rank,
                colorspace,
                status: AttemptStatus::Skipped {
                    reason: "exists".to_string(),
                },
                width: upgraded.image.width(),
                height: upgraded.image.height(),
                mode: None,
                ops: Vec::new(),
                warnings: Vec::new(),
            }
        } else {
            match normalize::normalize(&raw) {
                Ok(norm) => {
                    let (width, height) = (norm.image.width(), norm.image.height());
                    let status = match store::persist_png(&norm.image, &target) {
                        Ok(bytes) => AttemptStatus::Persisted {
                            path: target.clone(),
                            bytes,
                        },
                        Err(detail) => AttemptStatus::Failed {
                            reason: normalize::FailureReason::SaveError,
                            detail,
                        },
                    };
                    NormalizedImageResult {
                        page_index,
                        figure_index: figure.rank,
                        colorspace,
                        status,
                        width,
                        height,
                        mode: Some(norm.mode),
                        ops: norm.ops.iter().map(|s| s.to_string()).collect(),
                        warnings: norm.warnings,
                    }
                }
                Err(failure) => NormalizedImageResult {
                    page_index,
                    figure_index: figure.rank,
                    colorspace,
                    status: AttemptStatus::Failed {
                        reason: failure.reason,
                        detail: failure.detail,
                    },
                    width: upgraded.image.width(),
                    height: upgraded.image.height(),
                    mode: None,
                    ops: Vec::new(),
                    warnings: Vec::new(),
                },
            }
        };

        log.append(&result.to_record())?;
        health.record(&result);
        results.push(result);
    }

    Ok(PageOutcome {
        page_index,
        figures,
        rejected,
        results,
        health,
    })
}
