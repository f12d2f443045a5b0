use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base render resolution for full pages.
    pub dpi: u32,
    /// Replace existing output files instead of recording a skip.
    pub overwrite: bool,
    /// File name of the per-attempt JSONL log inside the output directory.
    pub attempt_log_name: String,
    /// Documents whose failure ratio exceeds this are flagged unhealthy.
    pub unhealthy_failure_ratio: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dpi: 150,
            overwrite: false,
            attempt_log_name: "attempts.jsonl".to_string(),
            unhealthy_failure_ratio: 0.20,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::ExtractError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
