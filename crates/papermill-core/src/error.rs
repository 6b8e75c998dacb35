// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Papermill.

use thiserror::Error;

/// Top-level error type for all Papermill operations.
#[derive(Debug, Error)]
pub enum PapermillError {
    // -- Layout errors --
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("font could not be loaded: {0}")]
    Font(String),

    // -- Rendering errors --
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("document rendering failed: {0}")]
    Render(String),

    // -- Image errors --
    #[error("image could not be decoded: {0}")]
    DecodeFailed(String),

    #[error("image could not be encoded: {0}")]
    EncodeFailed(String),

    #[error("invalid size constraint: {0}")]
    InvalidConstraint(String),

    // -- Input / configuration --
    #[error("no text provided")]
    NoInput,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PapermillError>;
