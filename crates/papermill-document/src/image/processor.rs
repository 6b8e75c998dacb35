// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, downscale and JPEG-encode in-memory images using
// the `image` crate.

use image::DynamicImage;
use image::imageops::FilterType;
use papermill_core::error::PapermillError;
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&upload)?
///     .resize_to_width(800)
///     .to_jpeg_bytes(70)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PapermillError> {
        let img = image::load_from_memory(data).map_err(|err| {
            PapermillError::DecodeFailed(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Transformations ------------------------------------------------------

    /// Scale the image down to `width` pixels wide, preserving aspect ratio.
    /// Uses Lanczos3 filtering. Images already at or below `width` are left
    /// untouched.
    #[instrument(skip(self), fields(width))]
    pub fn resize_to_width(self, width: u32) -> Self {
        let (from_w, from_h) = (self.image.width(), self.image.height());
        if width == 0 || width >= from_w {
            return self;
        }
        let height = ((from_h as f64 * width as f64 / from_w as f64).round() as u32).max(1);
        let resized = self.image.resize_exact(width, height, FilterType::Lanczos3);
        debug!(from_w, from_h, new_w = width, new_h = height, "Resize complete");
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as baseline JPEG bytes with the given quality
    /// (1-100). Alpha is discarded.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, PapermillError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder).map_err(|err| {
            PapermillError::EncodeFailed(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x ^ y) % 256) as u8])
        }))
    }

    #[test]
    fn resize_preserves_aspect_ratio() {
        let p = ImageProcessor::from_dynamic(gradient(400, 300)).resize_to_width(200);
        assert_eq!((p.width(), p.height()), (200, 150));
    }

    #[test]
    fn resize_never_enlarges() {
        let p = ImageProcessor::from_dynamic(gradient(120, 80)).resize_to_width(500);
        assert_eq!((p.width(), p.height()), (120, 80));
    }

    #[test]
    fn jpeg_round_trips_dimensions() {
        let jpeg = ImageProcessor::from_dynamic(gradient(64, 48))
            .to_jpeg_bytes(80)
            .unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = ImageProcessor::from_bytes(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn lower_quality_is_smaller() {
        let p = ImageProcessor::from_dynamic(gradient(256, 256));
        let high = p.to_jpeg_bytes(90).unwrap();
        let low = p.to_jpeg_bytes(20).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = ImageProcessor::from_bytes(b"not an image").err().unwrap();
        assert!(matches!(err, PapermillError::DecodeFailed(_)));
    }
}
