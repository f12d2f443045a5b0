// Region detection: text masking, edge passes, contours, gate chain.

pub mod candidates;
pub mod contours;
pub mod edges;
pub mod gates;
pub mod mask;
pub mod metrics;

use crate::page::{PdfRect, PixelRect};

/// A rectangular sub-area of a rendered page proposed as a possible
/// component, before quality gating.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRegion {
    pub bbox_px: PixelRect,
    pub bbox_pts: PdfRect,
    /// Pixel area of the bounding box.
    pub area_px: u64,
    /// Contour solidity at creation; averaged when candidates merge.
    pub confidence: f32,
    /// True when this box absorbed at least one overlapping candidate.
    pub merged: bool,
}

/// A candidate that failed a gate, with the gate name and the
/// measured-vs-limit values baked into the reason. Kept for audit; never
/// persisted as an image.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRegion {
    pub region: CandidateRegion,
    pub reason: String,
}

impl RejectedRegion {
    pub fn new(region: CandidateRegion, reason: impl Into<String>) -> Self {
        RejectedRegion {
            region,
            reason: reason.into(),
        }
    }

    /// Gate name: the reason up to the first space or '('.
    pub fn gate(&self) -> &str {
        self.reason
            .split(|c: char| c == ' ' || c == '(')
            .next()
            .unwrap_or(&self.reason)
    }
}

/// Output of the candidate generator: every examined box lands in exactly
/// one of the two lists.
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    pub accepted: Vec<CandidateRegion>,
    pub rejected: Vec<RejectedRegion>,
}
