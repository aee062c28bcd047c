//! PNG codec. Lossless, supports all four band layouts.

use anyhow::{Result, anyhow, bail};
use geopack_core::Blob;
use image::{DynamicImage, ImageEncoder, ImageFormat, codecs::png, load_from_memory_with_format};

/// Encode an image as PNG.
///
/// `quality` trades encoding effort against output size: low values select
/// the strongest compression, high values the fastest. Defaults to 75.
///
/// # Errors
/// Returns an error for layouts other than 8-bit grey, grey+alpha, RGB or
/// RGBA.
pub fn encode(image: &DynamicImage, quality: Option<u8>) -> Result<Blob> {
	if image.color().bytes_per_pixel() != image.color().channel_count() {
		bail!("png tiles only support 8-bit images");
	}
	if image.color().channel_count() > 4 {
		bail!("png tiles only support grey, grey+alpha, RGB or RGBA");
	}

	let quality = quality.unwrap_or(75).clamp(0, 100);

	use png::{CompressionType, FilterType};
	let (compression_type, filter_type) = match quality {
		0..25 => (CompressionType::Best, FilterType::Adaptive),
		25..50 => (CompressionType::Default, FilterType::Adaptive),
		50..75 => (CompressionType::Default, FilterType::Paeth),
		75..90 => (CompressionType::Fast, FilterType::Avg),
		_ => (CompressionType::Fast, FilterType::NoFilter),
	};

	let mut buffer: Vec<u8> = Vec::new();
	png::PngEncoder::new_with_quality(&mut buffer, compression_type, filter_type).write_image(
		image.as_bytes(),
		image.width(),
		image.height(),
		image.color().into(),
	)?;

	Ok(Blob::from(buffer))
}

/// Decode a PNG blob.
///
/// # Errors
/// Returns an error if the payload is not a valid PNG.
pub fn decode(blob: &Blob) -> Result<DynamicImage> {
	load_from_memory_with_format(blob.as_slice(), ImageFormat::Png)
		.map_err(|e| anyhow!("failed to decode PNG tile: {e}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::test_image;
	use geopack_core::BandLayout;
	use rstest::rstest;

	#[rstest]
	#[case::grey(BandLayout::Grey)]
	#[case::greya(BandLayout::GreyAlpha)]
	#[case::rgb(BandLayout::Rgb)]
	#[case::rgba(BandLayout::Rgba)]
	fn round_trip_is_lossless(#[case] layout: BandLayout) -> Result<()> {
		let image = test_image(layout, 64, 48);
		let blob = encode(&image, None)?;
		let decoded = decode(&blob)?;
		assert_eq!(decoded.as_bytes(), image.as_bytes());
		assert_eq!(decoded.color(), image.color());
		Ok(())
	}

	#[test]
	fn quality_changes_effort_not_pixels() -> Result<()> {
		let image = test_image(BandLayout::Rgb, 64, 64);
		let best = encode(&image, Some(0))?;
		let fast = encode(&image, Some(100))?;
		assert_eq!(decode(&best)?.as_bytes(), decode(&fast)?.as_bytes());
		Ok(())
	}

	#[test]
	fn rejects_high_bit_depth() {
		let image = DynamicImage::new_rgb16(8, 8);
		assert!(encode(&image, None).is_err());
	}
}
