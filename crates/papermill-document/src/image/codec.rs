// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image codec seam — metadata and parameterised encoding used by the
// size-targeted encoder.

use std::io::Cursor;

use image::ImageReader;
use papermill_core::error::{PapermillError, Result};
use serde::Serialize;
use tracing::{debug, instrument};

use super::processor::ImageProcessor;

/// Pixel dimensions of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
}

/// Parameters for one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeParams {
    /// Lossy quality, 1-100.
    pub quality: u8,
    /// Target width in pixels; `None` keeps the source width.
    pub width: Option<u32>,
}

/// Decode/encode primitive the size search drives.
pub trait ImageCodec: Send + Sync {
    fn decode_metadata(&self, data: &[u8]) -> Result<ImageMetadata>;

    /// Re-encode `data` from scratch with `params`.
    fn encode(&self, data: &[u8], params: EncodeParams) -> Result<Vec<u8>>;
}

/// JPEG output via the `image` crate; accepts any input format it decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn decode_metadata(&self, data: &[u8]) -> Result<ImageMetadata> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|err| {
                PapermillError::DecodeFailed(format!("failed to read image header: {}", err))
            })?;
        Ok(ImageMetadata { width, height })
    }

    #[instrument(skip(self, data), fields(data_len = data.len(), quality = params.quality, width = ?params.width))]
    fn encode(&self, data: &[u8], params: EncodeParams) -> Result<Vec<u8>> {
        let mut processor = ImageProcessor::from_bytes(data)?;
        if let Some(width) = params.width {
            processor = processor.resize_to_width(width);
        }
        let output = processor.to_jpeg_bytes(params.quality)?;
        debug!(output_bytes = output.len(), "Encoded JPEG");
        Ok(output)
    }
}
