// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text conversion pipeline — plain text in, PDF/DOCX/CSV bytes out.
//
// The font asset, page geometry and renderer registry are resolved once when
// the converter is built; each conversion is then a pure layout + render.

use papermill_core::error::{PapermillError, Result};
use papermill_core::{ConvertConfig, OutputFormat};
use tracing::{debug, info, instrument};

use crate::layout::{FontSource, LayoutEngine, PageGeometry};
use crate::render::{DocumentInfo, RendererRegistry};

/// Bytes of one converted document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Pages produced by layout.
    pub pages: usize,
}

impl ConvertedDocument {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn download_name(&self) -> String {
        self.format.download_name()
    }
}

/// Converts plain text into any registered output format.
pub struct TextConverter {
    engine: LayoutEngine,
    registry: RendererRegistry,
    default_format: OutputFormat,
}

impl TextConverter {
    /// Build a converter measuring and drawing with `font`.
    pub fn new(font: FontSource, geometry: PageGeometry, info: DocumentInfo) -> Result<Self> {
        let metrics = font.metrics()?;
        Ok(Self {
            engine: LayoutEngine::new(metrics, geometry),
            registry: RendererRegistry::with_defaults(font, info),
            default_format: OutputFormat::Pdf,
        })
    }

    /// Build a converter from configuration, loading the font file if one
    /// is configured.
    #[instrument(skip_all, fields(paper = ?config.paper_size, font = ?config.font_path))]
    pub fn from_config(config: &ConvertConfig) -> Result<Self> {
        let geometry =
            PageGeometry::for_paper(config.paper_size, config.margin_pt, config.font_size_pt)?;
        let font = FontSource::load(config.font_path.as_deref())?;
        let info = DocumentInfo {
            title: config.title.clone(),
            creator: config.creator.clone(),
        };
        let mut converter = Self::new(font, geometry, info)?;
        converter.default_format = config.default_format;
        info!(
            formats = ?converter.registry.formats(),
            default_format = %converter.default_format,
            "Text converter ready"
        );
        Ok(converter)
    }

    pub fn default_format(&self) -> OutputFormat {
        self.default_format
    }

    /// Replace or extend the renderers this converter dispatches to.
    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    /// Lay out `text` and render it as `format`.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn convert(&self, text: &str, format: OutputFormat) -> Result<ConvertedDocument> {
        let renderer = self.registry.get(format)?;
        let document = self.engine.layout(text);
        let bytes = renderer.render(&document)?;

        info!(
            %format,
            pages = document.pages().len(),
            lines = document.line_count(),
            output_bytes = bytes.len(),
            "Text converted"
        );
        Ok(ConvertedDocument {
            bytes,
            format,
            pages: document.pages().len(),
        })
    }
}

/// Decode uploaded text as UTF-8, replacing invalid sequences and dropping a
/// leading byte-order mark.
pub fn read_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string()
}

/// Pick the text to convert: an uploaded file wins over pasted text; neither
/// (or an empty paste) is an error.
pub fn resolve_text(upload: Option<&[u8]>, paste: Option<&str>) -> Result<String> {
    match (upload, paste) {
        (Some(bytes), _) => {
            debug!(upload_bytes = bytes.len(), "Using uploaded text");
            Ok(read_text(bytes))
        }
        (None, Some(paste)) if !paste.is_empty() => Ok(paste.to_string()),
        _ => Err(PapermillError::NoInput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Document;
    use crate::render::PageRenderer;

    fn converter() -> TextConverter {
        TextConverter::from_config(&ConvertConfig::default()).unwrap()
    }

    #[test]
    fn converts_to_every_format() {
        let converter = converter();
        let pdf = converter.convert("hello world", OutputFormat::Pdf).unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.pages, 1);
        assert_eq!(pdf.download_name(), "converted.pdf");

        let docx = converter.convert("hello world", OutputFormat::Docx).unwrap();
        assert!(docx.bytes.starts_with(b"PK"));
        assert_eq!(
            docx.mime_type(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );

        let csv = converter.convert("hello\nworld", OutputFormat::Csv).unwrap();
        assert_eq!(csv.bytes, b"hello\r\nworld");
    }

    #[test]
    fn long_text_spans_several_pages() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(400);
        let pdf = converter().convert(&text, OutputFormat::Pdf).unwrap();
        assert!(pdf.pages > 1);
    }

    #[test]
    fn config_defaults_are_applied() {
        let config = ConvertConfig {
            default_format: OutputFormat::Csv,
            ..ConvertConfig::default()
        };
        let converter = TextConverter::from_config(&config).unwrap();
        assert_eq!(converter.default_format(), OutputFormat::Csv);
    }

    #[test]
    fn degenerate_config_fails_at_construction() {
        let config = ConvertConfig {
            margin_pt: 400.0,
            ..ConvertConfig::default()
        };
        assert!(matches!(
            TextConverter::from_config(&config),
            Err(PapermillError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn missing_renderer_is_unsupported() {
        struct Only;
        impl PageRenderer for Only {
            fn format(&self) -> OutputFormat {
                OutputFormat::Pdf
            }
            fn render(&self, _: &Document) -> Result<Vec<u8>> {
                Ok(b"custom".to_vec())
            }
        }
        let mut converter = converter();
        converter.registry_mut().register(Box::new(Only));
        let out = converter.convert("x", OutputFormat::Pdf).unwrap();
        assert_eq!(out.bytes, b"custom");

        let empty = TextConverter {
            engine: LayoutEngine::new(Box::new(crate::layout::BuiltinMetrics), PageGeometry::default()),
            registry: RendererRegistry::new(),
            default_format: OutputFormat::Pdf,
        };
        assert!(matches!(
            empty.convert("x", OutputFormat::Docx),
            Err(PapermillError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn upload_wins_over_paste() {
        let text = resolve_text(Some(b"from file"), Some("pasted")).unwrap();
        assert_eq!(text, "from file");
        assert_eq!(resolve_text(None, Some("pasted")).unwrap(), "pasted");
    }

    #[test]
    fn no_text_is_an_error() {
        assert!(matches!(resolve_text(None, None), Err(PapermillError::NoInput)));
        assert!(matches!(resolve_text(None, Some("")), Err(PapermillError::NoInput)));
    }

    #[test]
    fn read_text_is_lossy_and_drops_bom() {
        assert_eq!(read_text(b"\xEF\xBB\xBFhi"), "hi");
        assert_eq!(read_text(b"a\xFFb"), "a\u{FFFD}b");
    }
}
