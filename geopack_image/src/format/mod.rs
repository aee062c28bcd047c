//! Encoding and decoding of tile blobs.
//!
//! Stored tiles carry no format column; [`decode`] sniffs the magic bytes
//! and dispatches to the matching codec. [`encode`] takes the target
//! format explicitly, since the format of a pyramid is fixed at creation
//! time.

pub mod jpeg;
pub mod png;
pub mod webp;

use anyhow::{Context, Result, bail};
use geopack_core::{Blob, TileFormat};
use image::DynamicImage;

/// Encode an image as a tile blob of the given format.
///
/// `quality` applies to JPEG and WEBP (0..=100, where 100 selects lossless
/// WEBP and is rejected for JPEG); for PNG it selects the compression
/// effort. `None` uses each codec's default.
///
/// # Errors
/// Returns an error if the image layout is unsupported by the codec or
/// encoding fails.
pub fn encode(image: &DynamicImage, format: TileFormat, quality: Option<u8>) -> Result<Blob> {
	log::trace!("encode {}x{} as {format}", image.width(), image.height());
	match format {
		TileFormat::Png => png::encode(image, quality),
		TileFormat::Jpeg => jpeg::encode(image, quality),
		TileFormat::Webp => match quality {
			Some(100) => webp::encode_lossless(image),
			q => webp::encode(image, q),
		},
	}
	.with_context(|| format!("encoding {}x{} {:?} as {format}", image.width(), image.height(), image.color()))
}

/// Decode a tile blob, identifying its format from the magic bytes.
///
/// # Errors
/// Returns an error if the payload is not PNG, JPEG or WEBP, or the codec
/// rejects it.
pub fn decode(blob: &Blob) -> Result<DynamicImage> {
	let Some(format) = TileFormat::sniff(blob) else {
		bail!("tile payload ({} bytes) is not PNG, JPEG or WEBP", blob.len());
	};
	log::trace!("decode {format} tile ({} bytes)", blob.len());
	decode_as(blob, format)
}

/// Decode a tile blob with a known format.
///
/// # Errors
/// Returns an error if the codec rejects the payload.
pub fn decode_as(blob: &Blob, format: TileFormat) -> Result<DynamicImage> {
	match format {
		TileFormat::Png => png::decode(blob),
		TileFormat::Jpeg => jpeg::decode(blob),
		TileFormat::Webp => webp::decode(blob),
	}
	.with_context(|| format!("decoding {format} tile ({} bytes)", blob.len()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::test_image;
	use geopack_core::BandLayout;

	#[test]
	fn decode_dispatches_on_magic_bytes() {
		let image = test_image(BandLayout::Rgb, 32, 32);
		for format in [TileFormat::Png, TileFormat::Jpeg, TileFormat::Webp] {
			let blob = encode(&image, format, None).unwrap();
			assert_eq!(TileFormat::sniff(&blob), Some(format));
			let decoded = decode(&blob).unwrap();
			assert_eq!((decoded.width(), decoded.height()), (32, 32));
		}
	}

	#[test]
	fn decode_rejects_garbage() {
		let err = decode(&Blob::from(b"GIF89a not a tile")).unwrap_err();
		assert!(err.to_string().contains("not PNG, JPEG or WEBP"));
	}

	#[test]
	fn quality_100_selects_lossless_webp() {
		let image = test_image(BandLayout::Rgba, 16, 16);
		let blob = encode(&image, TileFormat::Webp, Some(100)).unwrap();
		let decoded = decode(&blob).unwrap();
		assert_eq!(decoded.to_rgba8(), image.to_rgba8());
	}
}
