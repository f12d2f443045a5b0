// Corpus-wide accounting. `attempted == saved + failed` holds after every
// record; a discrepancy would mean a silently dropped candidate.

use std::collections::BTreeMap;

use crate::persist::{AttemptStatus, NormalizedImageResult};

#[derive(Debug, Default, Clone)]
pub struct ExtractionHealthMetrics {
    attempted: u64,
    saved: u64,
    failed: u64,
    skipped: u64,
    colorspace_counts: BTreeMap<String, u64>,
    conversion_ops: BTreeMap<String, u64>,
    failure_reasons: BTreeMap<String, u64>,
}

impl ExtractionHealthMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one attempt into the counters. Skips are tracked separately:
    /// the attempted/saved/failed identity counts conversion attempts only.
    pub fn record(&mut self, result: &NormalizedImageResult) {
        match &result.status {
            AttemptStatus::Persisted { .. } => {
                self.attempted += 1;
                self.saved += 1;
            }
            AttemptStatus::Failed { reason, .. } => {
                self.attempted += 1;
                self.failed += 1;
                *self
                    .failure_reasons
                    .entry(reason.code().to_string())
                    .or_default() += 1;
            }
            AttemptStatus::Skipped { .. } => {
                self.skipped += 1;
            }
        }

        *self
            .colorspace_counts
            .entry(result.colorspace.clone())
            .or_default() += 1;
        for op in &result.ops {
            *self.conversion_ops.entry(op.clone()).or_default() += 1;
        }

        debug_assert_eq!(self.attempted, self.saved + self.failed);
    }

    /// Fold another page's (or document's) counters into this one.
    pub fn merge(&mut self, other: &ExtractionHealthMetrics) {
        self.attempted += other.attempted;
        self.saved += other.saved;
        self.failed += other.failed;
        self.skipped += other.skipped;
        for (k, v) in &other.colorspace_counts {
            *self.colorspace_counts.entry(k.clone()).or_default() += v;
        }
        for (k, v) in &other.conversion_ops {
            *self.conversion_ops.entry(k.clone()).or_default() += v;
        }
        for (k, v) in &other.failure_reasons {
            *self.failure_reasons.entry(k.clone()).or_default() += v;
        }
    }

    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    pub fn saved(&self) -> u64 {
        self.saved
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn colorspace_counts(&self) -> &BTreeMap<String, u64> {
        &self.colorspace_counts
    }

    pub fn conversion_ops(&self) -> &BTreeMap<String, u64> {
        &self.conversion_ops
    }

    pub fn failure_reasons(&self) -> &BTreeMap<String, u64> {
        &self.failure_reasons
    }

    /// Failed fraction of all attempts; 0.0 before the first attempt.
    pub fn failure_ratio(&self) -> f32 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.failed as f32 / self.attempted as f32
    }

    /// Whether the corpus stayed under the caller's failure threshold.
    /// An unhealthy document still completes with full records; the hard
    /// failure decision belongs to the caller.
    pub fn is_healthy(&self, max_failure_ratio: f32) -> bool {
        self.failure_ratio() <= max_failure_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FailureReason;

    fn result(status: AttemptStatus) -> NormalizedImageResult {
        NormalizedImageResult {
            page_index: 0,
            figure_index: 0,
            colorspace: "rgb".to_string(),
            status,
            width: 10,
            height: 10,
            mode: None,
            ops: vec!["rgb_passthrough".to_string()],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_identity_holds_across_mixed_outcomes() {
        let mut health = ExtractionHealthMetrics::new();
        health.record(&result(AttemptStatus::Persisted {
            path: "a.png".into(),
            bytes: 10,
        }));
        health.record(&result(AttemptStatus::Failed {
            reason: FailureReason::ConversionError,
            detail: "boom".to_string(),
        }));
        health.record(&result(AttemptStatus::Skipped {
            reason: "exists".to_string(),
        }));

        assert_eq!(health.attempted(), health.saved() + health.failed());
        assert_eq!(health.attempted(), 2);
        assert_eq!(health.skipped(), 1);
    }

    #[test]
    fn test_unhealthy_above_threshold() {
        let mut health = ExtractionHealthMetrics::new();
        for _ in 0..3 {
            health.record(&result(AttemptStatus::Failed {
                reason: FailureReason::SaveError,
                detail: String::new(),
            }));
        }
        for _ in 0..7 {
            health.record(&result(AttemptStatus::Persisted {
                path: "a.png".into(),
                bytes: 1,
            }));
        }
        assert!((health.failure_ratio() - 0.3).abs() < 1e-6);
        assert!(!health.is_healthy(0.20));
        assert!(health.is_healthy(0.35));
    }

    #[test]
    fn test_merge_accumulates_histograms() {
        let mut a = ExtractionHealthMetrics::new();
        let mut b = ExtractionHealthMetrics::new();
        a.record(&result(AttemptStatus::Persisted {
            path: "a.png".into(),
            bytes: 1,
        }));
        b.record(&result(AttemptStatus::Failed {
            reason: FailureReason::PixmapInvalid,
            detail: String::new(),
        }));
        a.merge(&b);
        assert_eq!(a.attempted(), 2);
        assert_eq!(a.colorspace_counts().get("rgb"), Some(&2));
        assert_eq!(a.failure_reasons().get("pixmap_invalid"), Some(&1));
    }
}
