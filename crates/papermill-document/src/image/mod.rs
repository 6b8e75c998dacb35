// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, downscaling, JPEG encoding and the size-targeted
// quality/width search.

pub mod codec;
pub mod processor;
pub mod target;

pub use codec::{EncodeParams, ImageCodec, ImageMetadata, JpegCodec};
pub use processor::ImageProcessor;
pub use target::{EncodeAttempt, SizedImage, encode_to_size};
