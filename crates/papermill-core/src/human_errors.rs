// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity tells the host whether the user can fix the problem themselves.

use crate::error::PapermillError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must change their input or settings.
    ActionRequired,
    /// The input cannot be processed no matter what is retried.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Drives how prominently the host reports the failure.
    pub severity: Severity,
}

/// Convert a `PapermillError` into a `HumanError`.
pub fn humanize_error(err: &PapermillError) -> HumanError {
    match err {
        PapermillError::InvalidGeometry(detail) => HumanError {
            message: "The page settings leave no room for text.".into(),
            suggestion: format!("Use smaller margins or a smaller font size. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PapermillError::Font(detail) => HumanError {
            message: "The text could not be set in the selected font.".into(),
            suggestion: format!("Point the configuration at a TrueType (.ttf) font. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PapermillError::UnsupportedFormat(tag) => HumanError {
            message: "Unsupported format.".into(),
            suggestion: format!("Choose pdf, docx or csv instead of \"{tag}\"."),
            severity: Severity::ActionRequired,
        },

        PapermillError::Render(detail) => HumanError {
            message: "Conversion failed.".into(),
            suggestion: format!("The document could not be written. ({detail})"),
            severity: Severity::Permanent,
        },

        PapermillError::DecodeFailed(detail) => HumanError {
            message: "This image couldn't be opened.".into(),
            suggestion: format!("Try a JPEG or PNG file instead. ({detail})"),
            severity: Severity::Permanent,
        },

        PapermillError::EncodeFailed(detail) => HumanError {
            message: "Processing failed.".into(),
            suggestion: format!("The image could not be re-encoded. ({detail})"),
            severity: Severity::Permanent,
        },

        PapermillError::InvalidConstraint(detail) => HumanError {
            message: "The requested size range is not valid.".into(),
            suggestion: format!("Make sure the minimum is not larger than the maximum. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PapermillError::NoInput => HumanError {
            message: "No text provided.".into(),
            suggestion: "Choose a text file or paste some text, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        PapermillError::Config(detail) => HumanError {
            message: "The settings file has a problem.".into(),
            suggestion: detail.clone(),
            severity: Severity::ActionRequired,
        },

        PapermillError::Io(io_err) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: format!("Check the path and permissions. ({io_err})"),
            severity: Severity::ActionRequired,
        },

        PapermillError::Serialization(json_err) => HumanError {
            message: "The settings file is not valid JSON.".into(),
            suggestion: format!("Fix the file and try again. ({json_err})"),
            severity: Severity::ActionRequired,
        },
    }
}
