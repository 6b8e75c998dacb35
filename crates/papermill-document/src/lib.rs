// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// papermill-document — Text layout, rendering and image encoding for Papermill.
//
// Wraps and paginates plain text against real glyph metrics, renders the
// result as PDF, DOCX or CSV, and re-encodes images to fit a byte budget.

pub mod convert;
pub mod image;
pub mod layout;
pub mod render;

// Re-export the primary entry points so callers can use `papermill_document::TextConverter` etc.
pub use convert::{ConvertedDocument, TextConverter, read_text, resolve_text};
pub use image::{ImageCodec, JpegCodec, SizedImage, encode_to_size};
pub use layout::{Document, FontSource, LayoutEngine, PageGeometry};
pub use render::{DocumentInfo, PageRenderer, RendererRegistry};
