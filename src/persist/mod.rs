// Persistence outcomes and the zero-silent-drop record types.

pub mod log;
pub mod store;

use std::path::PathBuf;

use crate::normalize::{FailureReason, OutputMode};
use crate::persist::log::AttemptRecord;

/// Terminal state of one attempted component. A sum type, so a persisted
/// result always carries its verified path and byte count, and a failed one
/// always carries its reason — the contradictory states are unrepresentable.
#[derive(Debug, Clone)]
pub enum AttemptStatus {
    /// Written, verified, renamed, re-verified.
    Persisted { path: PathBuf, bytes: u64 },
    /// Classified failure; no file exists at the would-be path.
    Failed {
        reason: FailureReason,
        detail: String,
    },
    /// Deliberately not attempted (existing output with overwrite off).
    Skipped { reason: String },
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Persisted { .. } => "persisted",
            AttemptStatus::Failed { .. } => "failed",
            AttemptStatus::Skipped { .. } => "skipped",
        }
    }
}

/// One record per attempted component, immutable after creation.
#[derive(Debug, Clone)]
pub struct NormalizedImageResult {
    pub page_index: u32,
    /// Rank within the page; part of the deterministic output name.
    pub figure_index: u32,
    /// Declared source colorspace family.
    pub colorspace: String,
    pub status: AttemptStatus,
    pub width: u32,
    pub height: u32,
    pub mode: Option<OutputMode>,
    /// Conversion operations applied, for the health histogram.
    pub ops: Vec<String>,
    pub warnings: Vec<String>,
}

impl NormalizedImageResult {
    /// Flatten into the append-only log shape.
    pub fn to_record(&self) -> AttemptRecord {
        let (reason, output_path, bytes) = match &self.status {
            AttemptStatus::Persisted { path, bytes } => {
                (None, Some(path.to_string_lossy().into_owned()), *bytes)
            }
            AttemptStatus::Failed { reason, .. } => (Some(reason.code().to_string()), None, 0),
            AttemptStatus::Skipped { reason } => (Some(reason.clone()), None, 0),
        };
        AttemptRecord {
            page_index: self.page_index,
            figure_index: self.figure_index,
            colorspace: self.colorspace.clone(),
            status: self.status.as_str().to_string(),
            reason,
            output_path,
            bytes,
            width: self.width,
            height: self.height,
            warnings: self.warnings.clone(),
        }
    }
}
