// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CSV renderer — one single-column record per source paragraph.

use papermill_core::OutputFormat;
use papermill_core::error::{PapermillError, Result};
use tracing::{debug, instrument};

use super::PageRenderer;
use crate::layout::Document;

/// Delimited-text renderer. Quoting follows RFC 4180; records are separated
/// by CRLF.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl PageRenderer for CsvRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    #[instrument(skip_all, fields(lines = document.line_count()))]
    fn render(&self, document: &Document) -> Result<Vec<u8>> {
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(::csv::Terminator::CRLF)
            .from_writer(Vec::new());

        let paragraphs = document.paragraphs();
        for paragraph in &paragraphs {
            writer
                .write_record([paragraph.as_str()])
                .map_err(|err| PapermillError::Render(format!("CSV write failed: {}", err)))?;
        }
        let mut output = writer
            .into_inner()
            .map_err(|err| PapermillError::Render(format!("CSV flush failed: {}", err)))?;
        // CRLF separates records; the last one is not terminated.
        if output.ends_with(b"\r\n") {
            output.truncate(output.len() - 2);
        }

        debug!(records = paragraphs.len(), output_bytes = output.len(), "CSV written");
        Ok(output)
    }
}
