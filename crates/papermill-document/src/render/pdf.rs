// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF renderer — writes each laid-out page as a PDF page using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use papermill_core::OutputFormat;
use papermill_core::error::{PapermillError, Result};
use printpdf::font::ParsedFont;
use printpdf::{
    BuiltinFont, FontId, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
    TextItem,
};
use tracing::{debug, info, instrument};

use super::PageRenderer;
use crate::layout::{BuiltinMetrics, Document, FontSource, Page};

/// Millimetres per point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Fixed-layout renderer: one PDF page per layout page, every line drawn at
/// its placed baseline.
pub struct PdfRenderer {
    /// Font the document was measured with.
    font: FontSource,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

/// The font a page's text operations refer to.
enum PageFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

impl PageFont {
    fn text_ops(&self, text: &str, x: f32, y: f32, size: f32) -> Vec<Op> {
        let mut ops = vec![
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point { x: Pt(x), y: Pt(y) },
            },
        ];
        match self {
            Self::Builtin(font) => {
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(size),
                    font: font.clone(),
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(text.to_string())],
                    font: font.clone(),
                });
            }
            Self::Embedded(font) => {
                ops.push(Op::SetFontSize {
                    size: Pt(size),
                    font: font.clone(),
                });
                ops.push(Op::WriteText {
                    items: vec![TextItem::Text(text.to_string())],
                    font: font.clone(),
                });
            }
        }
        ops.push(Op::EndTextSection);
        ops
    }
}

impl PdfRenderer {
    pub fn new(font: FontSource, title: impl Into<String>) -> Self {
        Self {
            font,
            title: title.into(),
        }
    }

    fn page_ops(page: &Page, font: &PageFont, size: f32) -> Vec<Op> {
        page.lines()
            .iter()
            .flat_map(|placed| font.text_ops(&placed.line.text, placed.x, placed.y, size))
            .collect()
    }
}

/// The built-in font is written as WinAnsiEncoding; anything outside it
/// would silently vanish from the page.
fn check_builtin_coverage(document: &Document) -> Result<()> {
    let missing = document
        .lines()
        .flat_map(|line| line.text.chars())
        .find(|&ch| !BuiltinMetrics::can_draw(ch));
    match missing {
        Some(ch) => Err(PapermillError::Font(format!(
            "the built-in Helvetica font cannot draw {ch:?} (U+{:04X}); configure a TrueType font",
            ch as u32
        ))),
        None => Ok(()),
    }
}

impl PageRenderer for PdfRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    #[instrument(skip_all, fields(pages = document.pages().len()))]
    fn render(&self, document: &Document) -> Result<Vec<u8>> {
        let geometry = document.geometry();
        let page_w = Mm(geometry.width() * MM_PER_PT);
        let page_h = Mm(geometry.height() * MM_PER_PT);

        info!(title = %self.title, font = ?self.font, "Rendering PDF");

        let mut doc = PdfDocument::new(&self.title);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();

        let font = match &self.font {
            FontSource::Builtin => {
                check_builtin_coverage(document)?;
                PageFont::Builtin(BuiltinFont::Helvetica)
            }
            FontSource::TrueType(data) => {
                let parsed = ParsedFont::from_bytes(data, 0, &mut warnings).ok_or_else(|| {
                    PapermillError::Render("embedded font could not be parsed".into())
                })?;
                PageFont::Embedded(doc.add_font(&parsed))
            }
        };

        let pages: Vec<PdfPage> = document
            .pages()
            .iter()
            .map(|page| {
                PdfPage::new(page_w, page_h, Self::page_ops(page, &font, geometry.font_size()))
            })
            .collect();
        doc.with_pages(pages);

        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(
            output_bytes = output.len(),
            warnings = warnings.len(),
            "PDF serialised"
        );
        Ok(output)
    }
}
