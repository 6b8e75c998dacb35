// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PapermillError, Result};
use crate::types::{OutputFormat, PaperSize};

/// Settings shared by every conversion a host performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Page size for laid-out documents.
    pub paper_size: PaperSize,
    /// Margin on every side, in points.
    pub margin_pt: f32,
    /// Body text size, in points. Line height is always 1.4x this.
    pub font_size_pt: f32,
    /// TrueType font used for measuring and embedding. `None` selects the
    /// built-in Helvetica metrics.
    pub font_path: Option<PathBuf>,
    /// Title embedded in document metadata.
    pub title: String,
    /// Creator embedded in document metadata.
    pub creator: String,
    /// Format used when a request names none.
    pub default_format: OutputFormat,
    /// Image target size in kilobytes when a request names none.
    pub target_kb: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            margin_pt: 40.0,
            font_size_pt: 12.0,
            font_path: None,
            title: "Converted Document".into(),
            creator: "papermill".into(),
            default_format: OutputFormat::Pdf,
            target_kb: 100,
        }
    }
}

impl ConvertConfig {
    /// Load a configuration from a JSON file. Absent fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        if !(config.font_size_pt > 0.0) {
            return Err(PapermillError::Config(format!(
                "font_size_pt must be positive, got {}",
                config.font_size_pt
            )));
        }
        if config.margin_pt < 0.0 {
            return Err(PapermillError::Config(format!(
                "margin_pt must not be negative, got {}",
                config.margin_pt
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = ConvertConfig::from_json_str(r#"{ "font_size_pt": 10.0 }"#).unwrap();
        assert_eq!(config.font_size_pt, 10.0);
        assert_eq!(config.margin_pt, 40.0);
        assert_eq!(config.paper_size, PaperSize::A4);
        assert_eq!(config.default_format, OutputFormat::Pdf);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "paper_size": "Letter", "default_format": "docx", "target_kb": 50 }}"#
        )
        .unwrap();

        let config = ConvertConfig::load(file.path()).unwrap();
        assert_eq!(config.paper_size, PaperSize::Letter);
        assert_eq!(config.default_format, OutputFormat::Docx);
        assert_eq!(config.target_kb, 50);
    }

    #[test]
    fn non_positive_font_size_is_rejected() {
        let err = ConvertConfig::from_json_str(r#"{ "font_size_pt": 0.0 }"#).unwrap_err();
        assert!(matches!(err, PapermillError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ConvertConfig::load("/nonexistent/papermill.json").unwrap_err();
        assert!(matches!(err, PapermillError::Io(_)));
    }
}
