// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render module — turns laid-out documents into PDF, DOCX or CSV bytes.
//
// Renderers are registered per output format once, when a host starts, and
// looked up by format tag for each conversion.

pub mod csv;
pub mod docx;
pub mod pdf;

use std::collections::HashMap;

use papermill_core::OutputFormat;
use papermill_core::error::{PapermillError, Result};
use tracing::debug;

use crate::layout::{Document, FontSource};

pub use self::csv::CsvRenderer;
pub use self::docx::DocxRenderer;
pub use self::pdf::PdfRenderer;

/// Produces one binary document format from a laid-out `Document`.
pub trait PageRenderer: Send + Sync {
    /// The format this renderer writes.
    fn format(&self) -> OutputFormat;

    fn render(&self, document: &Document) -> Result<Vec<u8>>;
}

/// Metadata written into formats that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub creator: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "Converted Document".into(),
            creator: "papermill".into(),
        }
    }
}

/// Output format to renderer mapping.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<OutputFormat, Box<dyn PageRenderer>>,
}

impl RendererRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the PDF, DOCX and CSV renderers.
    pub fn with_defaults(font: FontSource, info: DocumentInfo) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PdfRenderer::new(font, info.title.clone())));
        registry.register(Box::new(DocxRenderer::new(info)));
        registry.register(Box::new(CsvRenderer));
        registry
    }

    /// Add a renderer, returning the one it replaces for the same format.
    pub fn register(&mut self, renderer: Box<dyn PageRenderer>) -> Option<Box<dyn PageRenderer>> {
        let format = renderer.format();
        debug!(%format, "Registering renderer");
        self.renderers.insert(format, renderer)
    }

    pub fn get(&self, format: OutputFormat) -> Result<&dyn PageRenderer> {
        self.renderers
            .get(&format)
            .map(|renderer| renderer.as_ref())
            .ok_or_else(|| PapermillError::UnsupportedFormat(format.to_string()))
    }

    /// Registered formats, in a stable order.
    pub fn formats(&self) -> Vec<OutputFormat> {
        OutputFormat::ALL
            .into_iter()
            .filter(|format| self.renderers.contains_key(format))
            .collect()
    }

    pub fn render(&self, format: OutputFormat, document: &Document) -> Result<Vec<u8>> {
        self.get(format)?.render(document)
    }
}
