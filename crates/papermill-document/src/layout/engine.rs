// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout engine — greedy line wrapping against glyph metrics, with a
// character-level fallback for unbreakable words, followed by single-pass
// first-fit pagination onto fixed-size pages.

use papermill_core::PaperSize;
use papermill_core::error::{PapermillError, Result};
use tracing::{debug, instrument};

use super::metrics::GlyphMetrics;

/// Line height as a multiple of the font size.
pub const LEADING_RATIO: f32 = 1.4;

// -- Geometry -----------------------------------------------------------------

/// Page size, margins and font size, all in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    width: f32,
    height: f32,
    margin: f32,
    font_size: f32,
    line_height: f32,
}

impl PageGeometry {
    /// Validate and build a geometry.
    ///
    /// Fails on non-finite values, when the margins leave no horizontal room,
    /// or when not even one line fits between the top and bottom margins.
    pub fn new(width: f32, height: f32, margin: f32, font_size: f32) -> Result<Self> {
        if ![width, height, margin, font_size].iter().all(|v| v.is_finite()) {
            return Err(PapermillError::InvalidGeometry(format!(
                "dimensions must be finite, got {width}x{height}pt, margin {margin}pt, font {font_size}pt"
            )));
        }
        if font_size <= 0.0 {
            return Err(PapermillError::InvalidGeometry(format!(
                "font size must be positive, got {font_size}"
            )));
        }
        if margin < 0.0 {
            return Err(PapermillError::InvalidGeometry(format!(
                "margin must not be negative, got {margin}"
            )));
        }
        let line_height = font_size * LEADING_RATIO;
        if !(width - margin * 2.0 > 0.0) {
            return Err(PapermillError::InvalidGeometry(format!(
                "margins of {margin}pt leave no text width on a {width}pt page"
            )));
        }
        if !(height - margin * 2.0 >= line_height) {
            return Err(PapermillError::InvalidGeometry(format!(
                "a {line_height}pt line does not fit between {margin}pt margins on a {height}pt page"
            )));
        }
        Ok(Self {
            width,
            height,
            margin,
            font_size,
            line_height,
        })
    }

    /// Geometry for a standard paper size.
    pub fn for_paper(paper: PaperSize, margin: f32, font_size: f32) -> Result<Self> {
        let (width, height) = paper.dimensions_pt();
        Self::new(width, height, margin, font_size)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Widest a line may be.
    pub fn max_text_width(&self) -> f32 {
        self.width - self.margin * 2.0
    }

    /// Baseline of the first line on a fresh page.
    pub fn top(&self) -> f32 {
        self.height - self.margin
    }

    fn has_room(&self, cursor: f32) -> bool {
        cursor >= self.margin + self.line_height
    }
}

impl Default for PageGeometry {
    /// A4 with 40pt margins and 12pt text.
    fn default() -> Self {
        let (width, height) = PaperSize::A4.dimensions_pt();
        Self {
            width,
            height,
            margin: 40.0,
            font_size: 12.0,
            line_height: 12.0 * LEADING_RATIO,
        }
    }
}

// -- Document model -----------------------------------------------------------

/// How a line attaches to the line before it in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStart {
    /// First line of a paragraph.
    Paragraph,
    /// Placeholder standing in for an empty paragraph.
    Blank,
    /// Continues the paragraph after a break at a space.
    Word,
    /// Continues a word that was broken between characters.
    Glyph,
}

/// One wrapped line of text and its measured width.
///
/// `source` is the slice of the paragraph this line accounts for: `text`
/// plus the spaces dropped at the break before it (and, on a paragraph's
/// last line, any trailing spaces that never made it onto a line).
/// Concatenating the sources of a paragraph's lines gives the paragraph back.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub width: f32,
    pub start: LineStart,
    pub source: String,
}

/// A line positioned on a page. `y` is the baseline, measured up from the
/// bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub line: Line,
}

/// A page of placed lines. Pages handed out by a `Document` are sealed.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    lines: Vec<PlacedLine>,
    cursor: f32,
}

impl Page {
    fn open(geometry: &PageGeometry) -> Self {
        Self {
            lines: Vec::new(),
            cursor: geometry.top(),
        }
    }

    fn place(&mut self, line: Line, geometry: &PageGeometry) {
        self.lines.push(PlacedLine {
            x: geometry.margin(),
            y: self.cursor,
            line,
        });
        self.cursor -= geometry.line_height();
    }

    pub fn lines(&self) -> &[PlacedLine] {
        &self.lines
    }

    /// Where the next line would have gone.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }
}

/// The laid-out pages of one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    geometry: PageGeometry,
    pages: Vec<Page>,
}

impl Document {
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// All lines in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|placed| &placed.line))
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|page| page.lines.len()).sum()
    }

    /// Reassemble the paragraph texts from the wrapped lines, exactly as they
    /// appeared in the input (less a trailing `\r`).
    pub fn paragraphs(&self) -> Vec<String> {
        let mut paragraphs: Vec<String> = Vec::new();
        for line in self.lines() {
            match (line.start, paragraphs.last_mut()) {
                (LineStart::Word | LineStart::Glyph, Some(current)) => {
                    current.push_str(&line.source)
                }
                _ => paragraphs.push(line.source.clone()),
            }
        }
        paragraphs
    }
}

// -- Wrapping -----------------------------------------------------------------

/// Accumulates wrapped lines, tracking how the next one attaches and which
/// source spaces have not been assigned to a line yet.
struct LineSink<'a> {
    lines: Vec<Line>,
    next_start: LineStart,
    pending: String,
    metrics: &'a dyn GlyphMetrics,
    font_size: f32,
}

impl LineSink<'_> {
    fn emit(&mut self, text: String, width: f32, then: LineStart) {
        let mut source = std::mem::take(&mut self.pending);
        source.push_str(&text);
        self.lines.push(Line {
            text,
            width,
            start: self.next_start,
            source,
        });
        self.next_start = then;
    }

    fn measure(&self, text: &str) -> f32 {
        self.metrics.width_of(text, self.font_size)
    }

    fn finish(mut self) -> Vec<Line> {
        match self.lines.last_mut() {
            Some(last) => last.source.push_str(&self.pending),
            None => {
                let width = self.measure(" ");
                let source = std::mem::take(&mut self.pending);
                self.lines.push(Line {
                    text: " ".to_string(),
                    width,
                    start: LineStart::Blank,
                    source,
                });
            }
        }
        self.lines
    }
}

/// Wrap one paragraph (no newlines) into lines no wider than `max_width`.
///
/// Words are separated by single spaces; a word too wide for a line on its
/// own is broken between characters, and its last chunk keeps accepting the
/// words that follow. A lone character wider than `max_width` still gets a
/// line of its own. A paragraph that yields no text becomes one `" "`
/// placeholder line.
pub fn wrap_paragraph(
    paragraph: &str,
    metrics: &dyn GlyphMetrics,
    font_size: f32,
    max_width: f32,
) -> Vec<Line> {
    let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
    let mut sink = LineSink {
        lines: Vec::new(),
        next_start: LineStart::Paragraph,
        pending: String::new(),
        metrics,
        font_size,
    };
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for (index, word) in paragraph.split(' ').enumerate() {
        if index > 0 && current.is_empty() {
            sink.pending.push(' ');
        }
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let candidate_width = sink.measure(&candidate);
        if candidate_width <= max_width {
            current = candidate;
            current_width = candidate_width;
            continue;
        }

        if !current.is_empty() {
            sink.emit(std::mem::take(&mut current), current_width, LineStart::Word);
            sink.pending.push(' ');
        }

        let word_width = sink.measure(word);
        if word_width <= max_width {
            current = word.to_string();
            current_width = word_width;
            continue;
        }

        // Character-level fallback.
        let mut chunk = String::new();
        let mut chunk_width = 0.0_f32;
        for ch in word.chars() {
            let mut trial = chunk.clone();
            trial.push(ch);
            let trial_width = sink.measure(&trial);
            if trial_width <= max_width {
                chunk = trial;
                chunk_width = trial_width;
            } else {
                if !chunk.is_empty() {
                    sink.emit(std::mem::take(&mut chunk), chunk_width, LineStart::Glyph);
                }
                chunk.push(ch);
                chunk_width = sink.measure(&chunk);
            }
        }
        current = chunk;
        current_width = chunk_width;
    }

    if !current.is_empty() {
        sink.emit(current, current_width, LineStart::Word);
    }

    sink.finish()
}

// -- Pagination ---------------------------------------------------------------

/// Place lines top to bottom, opening a new page whenever the cursor drops
/// below the bottom margin plus one line. Always yields at least one page.
fn paginate(lines: impl IntoIterator<Item = Line>, geometry: &PageGeometry) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut page = Page::open(geometry);

    for line in lines {
        if !geometry.has_room(page.cursor) {
            pages.push(std::mem::replace(&mut page, Page::open(geometry)));
        }
        page.place(line, geometry);
    }

    pages.push(page);
    pages
}

// -- Engine -------------------------------------------------------------------

/// Lays out plain text with an injected font and fixed page geometry.
pub struct LayoutEngine {
    metrics: Box<dyn GlyphMetrics>,
    geometry: PageGeometry,
}

impl LayoutEngine {
    pub fn new(metrics: Box<dyn GlyphMetrics>, geometry: PageGeometry) -> Self {
        Self { metrics, geometry }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Lay out `text` into pages. Never fails.
    pub fn layout(&self, text: &str) -> Document {
        layout(text, self.metrics.as_ref(), &self.geometry)
    }
}

/// Split `text` into paragraphs on `\n`, wrap each, and paginate the result.
#[instrument(skip_all, fields(text_len = text.len()))]
pub fn layout(text: &str, metrics: &dyn GlyphMetrics, geometry: &PageGeometry) -> Document {
    let max_width = geometry.max_text_width();
    let lines = text
        .split('\n')
        .flat_map(|paragraph| wrap_paragraph(paragraph, metrics, geometry.font_size(), max_width));
    let pages = paginate(lines, geometry);

    let document = Document {
        geometry: *geometry,
        pages,
    };
    debug!(
        pages = document.pages.len(),
        lines = document.line_count(),
        "Layout complete"
    );
    document
}
