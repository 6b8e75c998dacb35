// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX renderer — a minimal WordprocessingML package with one paragraph per
// source paragraph. Word processors re-flow the text, so only paragraph
// boundaries and page size carry over from the layout.

use std::io::{Cursor, Write};

use papermill_core::OutputFormat;
use papermill_core::error::{PapermillError, Result};
use quick_xml::escape::escape;
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{DocumentInfo, PageRenderer};
use crate::layout::{Document, PageGeometry};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

/// Flow-document renderer.
pub struct DocxRenderer {
    info: DocumentInfo,
}

impl DocxRenderer {
    pub fn new(info: DocumentInfo) -> Self {
        Self { info }
    }

    fn core_properties(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
                "<dc:title>{}</dc:title><dc:creator>{}</dc:creator>",
                "<dc:description>Generated from plain text</dc:description>",
                "</cp:coreProperties>"
            ),
            escape(xml_text(&self.info.title).as_str()),
            escape(xml_text(&self.info.creator).as_str()),
        )
    }
}

/// Drop characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    text.chars()
        .filter(|&ch| ch >= ' ' || matches!(ch, '\t' | '\n' | '\r'))
        .collect()
}

/// Page size and margins in twentieths of a point.
fn section_properties(geometry: &PageGeometry) -> String {
    let twips = |pt: f32| (pt * 20.0).round() as i64;
    let margin = twips(geometry.margin());
    format!(
        r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{margin}" w:right="{margin}" w:bottom="{margin}" w:left="{margin}" w:header="0" w:footer="0" w:gutter="0"/></w:sectPr>"#,
        twips(geometry.width()),
        twips(geometry.height()),
    )
}

fn document_xml(document: &Document) -> String {
    let mut body = String::new();
    for paragraph in document.paragraphs() {
        // Empty paragraphs keep a single space so the blank line survives.
        let text = if paragraph.is_empty() {
            " ".to_string()
        } else {
            xml_text(&paragraph)
        };
        body.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
        body.push_str(&escape(text.as_str()));
        body.push_str("</w:t></w:r></w:p>");
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}{}</w:body></w:document>"
        ),
        body,
        section_properties(document.geometry()),
    )
}

fn zip_error(err: zip::result::ZipError) -> PapermillError {
    PapermillError::Render(format!("DOCX packaging failed: {}", err))
}

impl PageRenderer for DocxRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    #[instrument(skip_all, fields(lines = document.line_count()))]
    fn render(&self, document: &Document) -> Result<Vec<u8>> {
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("docProps/core.xml", self.core_properties()),
            ("word/document.xml", document_xml(document)),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, contents) in parts {
            zip.start_file(name, options).map_err(zip_error)?;
            zip.write_all(contents.as_bytes())?;
        }
        let output = zip.finish().map_err(zip_error)?.into_inner();

        debug!(output_bytes = output.len(), "DOCX package written");
        Ok(output)
    }
}
