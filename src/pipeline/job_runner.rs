// Per-document run: pages strictly in index order, one attempt log, one
// health aggregate.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::detector::DetectorConfig;
use crate::error::ExtractError;
use crate::health::ExtractionHealthMetrics;
use crate::page::PageSource;
use crate::persist::log::AttemptLog;
use crate::pipeline::page_processor::process_page;

/// Configuration for a single extraction job.
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    /// 1-based page numbers; `None` processes the whole document.
    pub pages: Option<Vec<u32>>,
    pub dpi: u32,
    pub overwrite: bool,
    pub attempt_log_name: String,
    pub unhealthy_failure_ratio: f32,
    pub detector: DetectorConfig,
}

/// Result of processing a single job.
#[derive(Debug)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub pages_processed: usize,
    pub figures_accepted: usize,
    pub regions_rejected: usize,
    pub health: ExtractionHealthMetrics,
    /// False when the failure ratio exceeded the configured threshold. The
    /// job still completes and emits full records either way; acting on the
    /// flag is the caller's decision.
    pub healthy: bool,
    pub attempt_log_path: PathBuf,
}

/// Run one document through the pipeline.
///
/// Pages are processed strictly in index order; candidate-level failures are
/// recorded, never propagated. Only infrastructure errors (log creation,
/// page rendering) abort the job.
pub fn run_job(source: &dyn PageSource, config: &JobConfig) -> crate::error::Result<JobResult> {
    std::fs::create_dir_all(&config.output_dir)?;

    let page_count = source.page_count();
    let page_indices: Vec<u32> = match &config.pages {
        None => (0..page_count).collect(),
        Some(pages) => {
            for &page_num in pages {
                if page_num < 1 || page_num > page_count {
                    return Err(ExtractError::config(format!(
                        "page {} out of range (document has {} pages)",
                        page_num, page_count
                    )));
                }
            }
            // Already sorted and deduplicated by the range parser; convert
            // 1-based to 0-based.
            pages.iter().map(|p| p - 1).collect()
        }
    };

    let attempt_log_path = config.output_dir.join(&config.attempt_log_name);
    let mut log = AttemptLog::create(&attempt_log_path)?;

    let mut health = ExtractionHealthMetrics::new();
    let mut figures_accepted = 0usize;
    let mut regions_rejected = 0usize;

    for &page_index in &page_indices {
        let outcome = process_page(
            source,
            page_index,
            config.dpi,
            config.overwrite,
            &config.output_dir,
            &config.detector,
            &mut log,
        )?;

        info!(
            page = page_index,
            figures = outcome.figures.len(),
            rejected = outcome.rejected.len(),
            persisted = outcome.health.saved(),
            failed = outcome.health.failed(),
            "page processed"
        );

        figures_accepted += outcome.figures.len();
        regions_rejected += outcome.rejected.len();
        health.merge(&outcome.health);
    }

    debug_assert_eq!(health.attempted(), log.count() - health.skipped());

    let healthy = health.is_healthy(config.unhealthy_failure_ratio);
    if !healthy {
        warn!(
            input = %config.input_path.display(),
            failure_ratio = health.failure_ratio(),
            threshold = config.unhealthy_failure_ratio,
            "document flagged unhealthy"
        );
    }

    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_dir: config.output_dir.clone(),
        pages_processed: page_indices.len(),
        figures_accepted,
        regions_rejected,
        health,
        healthy,
        attempt_log_path,
    })
}
