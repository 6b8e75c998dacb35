// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph metrics — rendered string widths for the layout engine, either from
// a static Helvetica table or from a TrueType font parsed with `ttf-parser`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use papermill_core::error::{PapermillError, Result};
use tracing::{debug, instrument};
use ttf_parser::{Face, GlyphId};

/// Measures the rendered width of text, in the same unit as page geometry.
///
/// Implementations must be deterministic and monotonic: appending characters
/// never makes a string narrower.
pub trait GlyphMetrics: Send + Sync {
    fn width_of(&self, text: &str, font_size: f32) -> f32;
}

// -- Built-in Helvetica ------------------------------------------------------

/// Helvetica advance widths in 1/1000 em for ASCII 0x20..=0x7E.
/// Index = (char as usize) - 32.
const HELVETICA_WIDTHS: [u16; 95] = [
    // sp !   "    #    $    %    &    '    (    )    *    +    ,    -    .    /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // :  ;    <    =    >    ?    @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611,
    // [  \    ]    ^    _    `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500,
    // {  |    }    ~
    334, 260, 334, 584,
];

/// Helvetica advance widths for Latin-1 0xA0..=0xFF, which WinAnsiEncoding
/// maps to the same byte values.
const HELVETICA_LATIN1_WIDTHS: [u16; 96] = [
    // nbsp ¡   ¢    £    ¤    ¥    ¦    §    ¨    ©    ª    «    ¬    shy  ®    ¯
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // °  ±    ²    ³    ´    µ    ¶    ·    ¸    ¹    º    »    ¼    ½    ¾    ¿
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // À-Å                         Æ     Ç    È-Ë                 Ì-Ï
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // Ð  Ñ    Ò-Ö                      ×    Ø    Ù-Ü                 Ý    Þ    ß
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // à-å                         æ    ç    è-ë                 ì-ï
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // ð  ñ    ò-ö                      ÷    ø    ù-ü                 ý    þ    ÿ
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Helvetica advances for the characters WinAnsiEncoding places in
/// 0x80..=0x9F.
fn winansi_punctuation_width(ch: char) -> Option<u16> {
    let width = match ch {
        '€' | 'ƒ' | '†' | '‡' | '–' => 556,
        '‚' | '‘' | '’' => 222,
        '„' | '“' | '”' | 'ˆ' | '‹' | '›' | '˜' => 333,
        '…' | '‰' | 'Œ' | '—' | '™' => 1000,
        'Š' | 'Ÿ' => 667,
        'Ž' => 611,
        '•' => 350,
        'š' | 'ž' => 500,
        'œ' => 944,
        _ => return None,
    };
    Some(width)
}

/// Advance used for characters without a Helvetica glyph.
const HELVETICA_FALLBACK: u16 = 556;

/// Static metrics matching the PDF built-in Helvetica font.
///
/// Covers the WinAnsiEncoding repertoire the built-in font is written with.
/// Anything else is measured at a flat fallback and cannot be drawn; see
/// [`BuiltinMetrics::can_draw`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    fn width(ch: char) -> Option<u16> {
        match ch as u32 {
            code @ 0x20..=0x7E => Some(HELVETICA_WIDTHS[code as usize - 0x20]),
            code @ 0xA0..=0xFF => Some(HELVETICA_LATIN1_WIDTHS[code as usize - 0xA0]),
            _ => winansi_punctuation_width(ch),
        }
    }

    fn advance(ch: char) -> u16 {
        Self::width(ch).unwrap_or(HELVETICA_FALLBACK)
    }

    /// Whether the built-in font can encode `ch`. ASCII control characters
    /// pass through as-is.
    pub fn can_draw(ch: char) -> bool {
        ch.is_ascii() || Self::width(ch).is_some()
    }
}

impl GlyphMetrics for BuiltinMetrics {
    fn width_of(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| Self::advance(ch) as u32).sum();
        units as f32 / 1000.0 * font_size
    }
}

// -- TrueType ----------------------------------------------------------------

/// Metrics read from a TrueType/OpenType font's horizontal advances.
///
/// The Unicode cmap is read once into an advance table, so measuring never
/// reparses the font. Code points without a glyph use the `.notdef` advance.
/// Kerning is ignored.
#[derive(Clone)]
pub struct TrueTypeMetrics {
    data: Arc<[u8]>,
    units_per_em: f32,
    advances: HashMap<char, u16>,
    notdef_advance: u16,
}

impl TrueTypeMetrics {
    /// Parse font bytes, rejecting anything `ttf-parser` cannot read.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let data = data.into();
        let face = Face::parse(&data, 0)
            .map_err(|err| PapermillError::Font(format!("failed to parse font: {}", err)))?;
        let units_per_em = face.units_per_em().max(1) as f32;
        let notdef_advance = face.glyph_hor_advance(GlyphId(0)).unwrap_or(0);

        let mut advances = HashMap::new();
        if let Some(cmap) = &face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
                subtable.codepoints(|code| {
                    let Some(ch) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(glyph) = subtable.glyph_index(code) {
                        let advance = face.glyph_hor_advance(glyph).unwrap_or(notdef_advance);
                        advances.entry(ch).or_insert(advance);
                    }
                });
            }
        }
        if advances.is_empty() {
            return Err(PapermillError::Font("font has no Unicode character map".into()));
        }

        debug!(
            units_per_em,
            glyphs = face.number_of_glyphs(),
            mapped = advances.len(),
            "TrueType font parsed"
        );
        Ok(Self {
            data,
            units_per_em,
            advances,
            notdef_advance,
        })
    }

    /// Load a font file from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|err| {
            PapermillError::Font(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        Self::from_bytes(bytes)
    }

    /// Raw font bytes, shared with renderers that embed the font.
    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }

    fn advance(&self, ch: char) -> u16 {
        self.advances.get(&ch).copied().unwrap_or(self.notdef_advance)
    }
}

impl GlyphMetrics for TrueTypeMetrics {
    fn width_of(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| self.advance(ch) as u32).sum();
        units as f32 / self.units_per_em * font_size
    }
}

// -- Font asset --------------------------------------------------------------

/// The font asset injected into layout and rendering, so text is measured
/// with the same face it is drawn in.
#[derive(Clone, Default)]
pub enum FontSource {
    /// PDF built-in Helvetica (no embedding, WinAnsi coverage).
    #[default]
    Builtin,
    /// An embedded TrueType font.
    TrueType(Arc<[u8]>),
}

impl FontSource {
    /// Resolve an optional font path from configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::Builtin),
            Some(path) => Ok(Self::TrueType(TrueTypeMetrics::open(path)?.data)),
        }
    }

    /// Metrics provider for this font.
    pub fn metrics(&self) -> Result<Box<dyn GlyphMetrics>> {
        match self {
            Self::Builtin => Ok(Box::new(BuiltinMetrics)),
            Self::TrueType(data) => Ok(Box::new(TrueTypeMetrics::from_bytes(data.clone())?)),
        }
    }
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => f.write_str("Builtin"),
            Self::TrueType(data) => write!(f, "TrueType({} bytes)", data.len()),
        }
    }
}
