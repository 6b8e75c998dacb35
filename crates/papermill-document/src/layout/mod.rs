// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout module — glyph metrics, line wrapping and pagination.

pub mod engine;
pub mod metrics;

pub use engine::{
    Document, LayoutEngine, Line, LineStart, Page, PageGeometry, PlacedLine, layout,
    wrap_paragraph,
};
pub use metrics::{BuiltinMetrics, FontSource, GlyphMetrics, TrueTypeMetrics};
