// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Size-targeted encoding — search quality, then width, until an encoded
// image fits under a byte ceiling.
//
// Both descents are monotonic: quality steps down from 80 to 20 at full
// resolution, then the width shrinks by 0.9x per step at the last quality
// until the result fits or the width reaches 100px. Exceeding the ceiling
// is never an error; the last buffer produced is returned with
// `within_target = false`.

use std::iter::successors;

use papermill_core::SizeConstraint;
use papermill_core::error::{PapermillError, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::codec::{EncodeParams, ImageCodec};

/// First quality tried.
pub const START_QUALITY: u8 = 80;
/// Quality decrement per attempt.
pub const QUALITY_STEP: u8 = 10;
/// Lowest quality tried.
pub const QUALITY_FLOOR: u8 = 20;
/// Width multiplier per dimension step.
pub const WIDTH_FACTOR: f64 = 0.9;
/// Widths at or below this are never tried.
pub const WIDTH_FLOOR: u32 = 100;
/// Assumed source width when the codec cannot report one.
pub const FALLBACK_WIDTH: u32 = 1000;

/// Parameters and outcome of one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeAttempt {
    pub quality: u8,
    /// Width override, if the attempt resized.
    pub width: Option<u32>,
    pub result_bytes: usize,
}

/// Final output of [`encode_to_size`].
#[derive(Debug, Clone)]
pub struct SizedImage {
    pub bytes: Vec<u8>,
    /// The attempt that produced `bytes`.
    pub attempt: EncodeAttempt,
    /// Whether `bytes` fits under the ceiling.
    pub within_target: bool,
    /// Encode calls made in total.
    pub attempts: u32,
}

impl SizedImage {
    /// Suggested file name for the re-encoded download.
    pub fn download_name(&self) -> &'static str {
        "resized.jpg"
    }
}

/// Qualities tried at full resolution: 80, 70, ..., 20.
pub fn quality_ladder() -> impl Iterator<Item = u8> {
    successors(Some(START_QUALITY), |quality| {
        quality
            .checked_sub(QUALITY_STEP)
            .filter(|next| *next >= QUALITY_FLOOR)
    })
}

/// Widths tried after quality is exhausted: repeated `round(w * 0.9)`
/// starting from `original`, while above 100px.
pub fn width_ladder(original: u32) -> impl Iterator<Item = u32> {
    let shrink = |width: u32| (width as f64 * WIDTH_FACTOR).round() as u32;
    successors(Some(shrink(original)), move |width| Some(shrink(*width)))
        .take_while(|width| *width > WIDTH_FLOOR)
}

struct Encoded {
    bytes: Vec<u8>,
    attempt: EncodeAttempt,
}

/// Outcome of walking one ladder of candidate parameters.
struct Descent {
    /// The fitting result, or the last one produced.
    last: Option<Encoded>,
    fit: bool,
    attempts: u32,
}

/// Encode each candidate in order, stopping at the first result the
/// constraint admits. Rejected buffers are dropped as soon as the next one
/// replaces them.
fn descend(
    candidates: impl IntoIterator<Item = EncodeParams>,
    image: &[u8],
    constraint: &SizeConstraint,
    codec: &dyn ImageCodec,
) -> Result<Descent> {
    let mut descent = Descent {
        last: None,
        fit: false,
        attempts: 0,
    };
    for params in candidates {
        let bytes = codec.encode(image, params)?;
        descent.attempts += 1;
        let attempt = EncodeAttempt {
            quality: params.quality,
            width: params.width,
            result_bytes: bytes.len(),
        };
        debug!(?attempt, max_bytes = constraint.max_bytes, "Encode attempt");
        descent.fit = constraint.admits(bytes.len());
        descent.last = Some(Encoded { bytes, attempt });
        if descent.fit {
            break;
        }
    }
    Ok(descent)
}

/// Re-encode `image` so it fits under `constraint.max_bytes` if the search
/// space allows.
///
/// Fails only when the codec cannot decode or encode the input at all.
/// `constraint.min_bytes` is never pursued: small results are returned as-is.
#[instrument(skip_all, fields(data_len = image.len(), max_bytes = constraint.max_bytes))]
pub fn encode_to_size(
    image: &[u8],
    constraint: &SizeConstraint,
    codec: &dyn ImageCodec,
) -> Result<SizedImage> {
    let by_quality = descend(
        quality_ladder().map(|quality| EncodeParams {
            quality,
            width: None,
        }),
        image,
        constraint,
        codec,
    )?;
    let mut attempts = by_quality.attempts;
    let mut best = by_quality
        .last
        .ok_or_else(|| PapermillError::EncodeFailed("no encode attempted".into()))?;

    if !by_quality.fit {
        let quality = best.attempt.quality;
        let original_width = match codec.decode_metadata(image) {
            Ok(meta) if meta.width > 0 => meta.width,
            Ok(_) => FALLBACK_WIDTH,
            Err(err) => {
                warn!(%err, fallback = FALLBACK_WIDTH, "Image width unavailable");
                FALLBACK_WIDTH
            }
        };
        info!(
            quality,
            original_width,
            result_bytes = best.attempt.result_bytes,
            "Quality floor reached, reducing dimensions"
        );

        let by_width = descend(
            width_ladder(original_width).map(|width| EncodeParams {
                quality,
                width: Some(width),
            }),
            image,
            constraint,
            codec,
        )?;
        attempts += by_width.attempts;
        if let Some(last) = by_width.last {
            best = last;
        }
    }

    let within_target = constraint.admits(best.bytes.len());
    if within_target {
        info!(attempt = ?best.attempt, attempts, "Image fits target size");
    } else {
        warn!(
            attempt = ?best.attempt,
            attempts,
            max_bytes = constraint.max_bytes,
            "Target size unreachable, returning smallest attempt"
        );
    }
    if best.bytes.len() < constraint.min_bytes {
        debug!(
            result_bytes = best.bytes.len(),
            min_bytes = constraint.min_bytes,
            "Result below requested minimum"
        );
    }

    Ok(SizedImage {
        bytes: best.bytes,
        attempt: best.attempt,
        within_target,
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::codec::{ImageMetadata, JpegCodec};
    use std::sync::Mutex;

    /// Deterministic codec: output size is `quality * width` bytes.
    struct ModelCodec {
        metadata: Option<ImageMetadata>,
        calls: Mutex<Vec<EncodeParams>>,
    }

    impl ModelCodec {
        fn with_width(width: u32) -> Self {
            Self {
                metadata: Some(ImageMetadata { width, height: width }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn without_metadata() -> Self {
            Self {
                metadata: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<EncodeParams> {
            self.calls.lock().unwrap().clone()
        }

        fn size_of(&self, params: EncodeParams) -> usize {
            let full = self
                .metadata
                .map(|m| m.width)
                .filter(|width| *width > 0)
                .unwrap_or(FALLBACK_WIDTH);
            params.quality as usize * params.width.unwrap_or(full) as usize
        }
    }

    impl ImageCodec for ModelCodec {
        fn decode_metadata(&self, _data: &[u8]) -> Result<ImageMetadata> {
            self.metadata
                .ok_or_else(|| PapermillError::DecodeFailed("no header".into()))
        }

        fn encode(&self, _data: &[u8], params: EncodeParams) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(params);
            Ok(vec![0u8; self.size_of(params)])
        }
    }

    struct BrokenCodec;

    impl ImageCodec for BrokenCodec {
        fn decode_metadata(&self, _data: &[u8]) -> Result<ImageMetadata> {
            Err(PapermillError::DecodeFailed("corrupt".into()))
        }

        fn encode(&self, _data: &[u8], _params: EncodeParams) -> Result<Vec<u8>> {
            Err(PapermillError::DecodeFailed("corrupt".into()))
        }
    }

    fn ceiling(max_bytes: usize) -> SizeConstraint {
        SizeConstraint::new(0, max_bytes).unwrap()
    }

    #[test]
    fn quality_ladder_has_seven_steps() {
        let ladder: Vec<u8> = quality_ladder().collect();
        assert_eq!(ladder, vec![80, 70, 60, 50, 40, 30, 20]);
    }

    #[test]
    fn width_ladder_shrinks_geometrically() {
        let ladder: Vec<u32> = width_ladder(1000).collect();
        assert_eq!(&ladder[..7], &[900, 810, 729, 656, 590, 531, 478]);
        assert!(ladder.windows(2).all(|w| w[1] < w[0]));
        assert!(ladder.iter().all(|w| *w > WIDTH_FLOOR));
        assert_eq!(width_ladder(112).collect::<Vec<_>>(), vec![101]);
        assert_eq!(width_ladder(100).count(), 0);
    }

    #[test]
    fn width_ladder_is_bounded_for_huge_images() {
        assert!(width_ladder(u32::MAX).count() < 200);
    }

    #[test]
    fn first_quality_that_fits_wins() {
        let codec = ModelCodec::with_width(1000);
        let sized = encode_to_size(b"img", &ceiling(100 * 1024), &codec).unwrap();
        assert_eq!(
            sized.attempt,
            EncodeAttempt {
                quality: 80,
                width: None,
                result_bytes: 80_000
            }
        );
        assert_eq!(sized.attempts, 1);
        assert!(sized.within_target);
        assert_eq!(codec.calls().len(), 1);
    }

    #[test]
    fn quality_descends_until_it_fits() {
        let codec = ModelCodec::with_width(1000);
        let sized = encode_to_size(b"img", &ceiling(50_000), &codec).unwrap();
        assert_eq!(sized.attempt.quality, 50);
        assert_eq!(sized.attempt.width, None);
        assert_eq!(sized.attempts, 4);
        assert_eq!(sized.bytes.len(), 50_000);
    }

    #[test]
    fn width_descends_after_quality_floor() {
        let codec = ModelCodec::with_width(1000);
        let sized = encode_to_size(b"img", &ceiling(10_000), &codec).unwrap();
        assert_eq!(sized.attempt.quality, 20);
        assert_eq!(sized.attempt.width, Some(478));
        assert_eq!(sized.attempts, 14);
        assert!(sized.within_target);

        let calls = codec.calls();
        assert!(calls[7..].iter().all(|p| p.quality == 20));
        assert_eq!(calls[7].width, Some(900));
    }

    #[test]
    fn unreachable_target_returns_last_attempt() {
        let codec = ModelCodec::with_width(1000);
        let sized = encode_to_size(b"img", &ceiling(10), &codec).unwrap();
        let widths = width_ladder(1000).count() as u32;
        assert!(!sized.within_target);
        assert_eq!(sized.attempts, 7 + widths);
        assert_eq!(sized.attempt.width, width_ladder(1000).last());
        assert_eq!(sized.attempt.quality, QUALITY_FLOOR);
    }

    #[test]
    fn result_sizes_never_grow() {
        let codec = ModelCodec::with_width(4000);
        encode_to_size(b"img", &ceiling(1), &codec).unwrap();
        let sizes: Vec<usize> = codec.calls().into_iter().map(|p| codec.size_of(p)).collect();
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn missing_metadata_falls_back_to_default_width() {
        let codec = ModelCodec::without_metadata();
        encode_to_size(b"img", &ceiling(10_000), &codec).unwrap();
        assert_eq!(codec.calls()[7].width, Some(900));
    }

    #[test]
    fn zero_width_metadata_falls_back_to_default_width() {
        let codec = ModelCodec {
            metadata: Some(ImageMetadata { width: 0, height: 0 }),
            calls: Mutex::new(Vec::new()),
        };
        encode_to_size(b"img", &ceiling(1), &codec).unwrap();
        assert_eq!(codec.calls()[7].width, Some(900));
    }

    #[test]
    fn small_images_skip_dimension_descent() {
        let codec = ModelCodec::with_width(100);
        let sized = encode_to_size(b"img", &ceiling(10), &codec).unwrap();
        assert_eq!(sized.attempts, 7);
        assert_eq!(sized.attempt.width, None);
        assert!(!sized.within_target);
    }

    #[test]
    fn minimum_is_not_padded_toward() {
        let codec = ModelCodec::with_width(10);
        let constraint = SizeConstraint::new(20 * 1024, 100 * 1024).unwrap();
        let sized = encode_to_size(b"img", &constraint, &codec).unwrap();
        assert_eq!(sized.bytes.len(), 800);
        assert_eq!(sized.attempts, 1);
        assert!(sized.within_target);
    }

    #[test]
    fn codec_failure_propagates() {
        let err = encode_to_size(b"img", &ceiling(10), &BrokenCodec).unwrap_err();
        assert!(matches!(err, PapermillError::DecodeFailed(_)));
    }

    #[test]
    fn real_jpeg_search_shrinks_dimensions() {
        use image::{DynamicImage, Rgb, RgbImage};
        use std::io::Cursor;

        let noisy = DynamicImage::ImageRgb8(RgbImage::from_fn(300, 200, |x, y| {
            let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
            Rgb([(v >> 3) as u8, (v >> 11) as u8, (v >> 19) as u8])
        }));
        let mut png = Vec::new();
        noisy
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let generous = encode_to_size(&png, &ceiling(usize::MAX), &JpegCodec).unwrap();
        assert_eq!(generous.attempts, 1);
        assert_eq!(generous.attempt.quality, 80);

        let impossible = encode_to_size(&png, &ceiling(1), &JpegCodec).unwrap();
        assert!(!impossible.within_target);
        assert_eq!(impossible.attempts, 7 + width_ladder(300).count() as u32);
        let meta = JpegCodec.decode_metadata(&impossible.bytes).unwrap();
        assert_eq!(Some(meta.width), width_ladder(300).last());
        assert_eq!(impossible.download_name(), "resized.jpg");
    }
}
