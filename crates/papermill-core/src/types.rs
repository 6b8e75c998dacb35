// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Papermill conversions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PapermillError;

/// Points per millimetre (1in = 25.4mm = 72pt).
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (width, height).
    ///
    /// The ISO sizes use their exact point values (A4 = 595.28 x 841.89)
    /// rather than the rounded millimetre figures.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            Self::A4 => (595.28, 841.89),
            Self::A3 => (841.89, 1190.55),
            Self::A5 => (419.53, 595.28),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
            Self::Tabloid => (792.0, 1224.0),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm as f32 * PT_PER_MM, *height_mm as f32 * PT_PER_MM),
        }
    }
}

/// Document formats the text pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed-layout pages.
    Pdf,
    /// WordprocessingML flow document.
    Docx,
    /// Single-column delimited text.
    Csv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Pdf, Self::Docx, Self::Csv];

    /// MIME type for the produced bytes.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Csv => "text/csv",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Csv => "csv",
        }
    }

    /// Suggested file name for the converted download.
    pub fn download_name(&self) -> String {
        format!("converted.{}", self.extension())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = PapermillError;

    /// Parse a format tag. Surrounding whitespace and case are ignored.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "csv" => Ok(Self::Csv),
            other => Err(PapermillError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Smallest target the resize form accepts, in kilobytes.
pub const MIN_TARGET_KB: u32 = 20;
/// Largest target the resize form accepts, in kilobytes.
pub const MAX_TARGET_KB: u32 = 100;

/// Byte-size window for a re-encoded image.
///
/// Only `max_bytes` is enforced by the encoder; `min_bytes` bounds what a
/// caller may ask for and is never pursued by padding output upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeConstraint {
    pub min_bytes: usize,
    pub max_bytes: usize,
}

impl SizeConstraint {
    pub fn new(min_bytes: usize, max_bytes: usize) -> Result<Self, PapermillError> {
        if min_bytes > max_bytes {
            return Err(PapermillError::InvalidConstraint(format!(
                "minimum {min_bytes} bytes exceeds maximum {max_bytes} bytes"
            )));
        }
        Ok(Self {
            min_bytes,
            max_bytes,
        })
    }

    /// Build a constraint from a target in kilobytes, clamped to the
    /// accepted 20..=100 KB range.
    pub fn from_target_kb(target_kb: u32) -> Self {
        let kb = target_kb.clamp(MIN_TARGET_KB, MAX_TARGET_KB) as usize;
        Self {
            min_bytes: MIN_TARGET_KB as usize * 1024,
            max_bytes: kb * 1024,
        }
    }

    /// Whether an encoded buffer of `len` bytes satisfies the constraint.
    pub fn admits(&self, len: usize) -> bool {
        len <= self.max_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tag_is_normalised() {
        assert_eq!(" PDF ".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("Docx".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        assert_eq!("csv\n".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = "odt".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, PapermillError::UnsupportedFormat(tag) if tag == "odt"));
    }

    #[test]
    fn download_names_follow_extension() {
        assert_eq!(OutputFormat::Pdf.download_name(), "converted.pdf");
        assert_eq!(OutputFormat::Csv.mime_type(), "text/csv");
    }

    #[test]
    fn target_kb_is_clamped() {
        assert_eq!(SizeConstraint::from_target_kb(5).max_bytes, 20 * 1024);
        assert_eq!(SizeConstraint::from_target_kb(500).max_bytes, 100 * 1024);
        assert_eq!(SizeConstraint::from_target_kb(64).max_bytes, 64 * 1024);
    }

    #[test]
    fn inverted_constraint_is_rejected() {
        assert!(SizeConstraint::new(10, 5).is_err());
        let c = SizeConstraint::new(5, 10).unwrap();
        assert!(c.admits(10));
        assert!(c.admits(1));
        assert!(!c.admits(11));
    }

    #[test]
    fn a4_points_match_millimetres() {
        let (w, h) = PaperSize::A4.dimensions_pt();
        let custom = PaperSize::Custom {
            width_mm: 210,
            height_mm: 297,
        }
        .dimensions_pt();
        assert!((w - custom.0).abs() < 0.5);
        assert!((h - custom.1).abs() < 0.5);
    }
}
