//! JPEG codec. Lossy, grey and RGB only; alpha cannot be represented.

use anyhow::{Result, anyhow, bail};
use geopack_core::Blob;
use image::{DynamicImage, ImageEncoder, ImageFormat, codecs::jpeg::JpegEncoder, load_from_memory_with_format};

/// Encode an image as JPEG.
///
/// `quality` is 0..=99; defaults to 75. A quality of 100 is rejected since
/// JPEG has no lossless mode.
///
/// # Errors
/// Returns an error for images with an alpha band, non-8-bit images, or
/// `quality >= 100`.
pub fn encode(image: &DynamicImage, quality: Option<u8>) -> Result<Blob> {
	if image.color().bytes_per_pixel() != image.color().channel_count() {
		bail!("jpeg tiles only support 8-bit images");
	}

	let quality = quality.unwrap_or(75);
	if quality >= 100 {
		bail!("jpeg has no lossless mode, use a quality < 100");
	}

	if !matches!(image.color().channel_count(), 1 | 3) {
		bail!("jpeg tiles only support grey or RGB images without alpha");
	}

	let mut buffer: Vec<u8> = Vec::new();
	JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
		image.as_bytes(),
		image.width(),
		image.height(),
		image.color().into(),
	)?;

	Ok(Blob::from(buffer))
}

/// Decode a JPEG blob.
///
/// # Errors
/// Returns an error if the payload is not a valid JPEG.
pub fn decode(blob: &Blob) -> Result<DynamicImage> {
	load_from_memory_with_format(blob.as_slice(), ImageFormat::Jpeg)
		.map_err(|e| anyhow!("failed to decode JPEG tile: {e}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pixel::max_band_difference;
	use crate::testing::test_image;
	use geopack_core::BandLayout;
	use rstest::rstest;

	#[rstest]
	#[case::grey(BandLayout::Grey)]
	#[case::rgb(BandLayout::Rgb)]
	fn round_trip_stays_close(#[case] layout: BandLayout) -> Result<()> {
		let image = test_image(layout, 64, 64);
		let blob = encode(&image, Some(90))?;
		let decoded = decode(&blob)?;
		assert_eq!(decoded.color(), image.color());
		assert!(max_band_difference(&image, &decoded)? < 24.0);
		Ok(())
	}

	#[rstest]
	#[case::greya(BandLayout::GreyAlpha)]
	#[case::rgba(BandLayout::Rgba)]
	fn rejects_alpha(#[case] layout: BandLayout) {
		let image = test_image(layout, 16, 16);
		assert_eq!(
			encode(&image, None).unwrap_err().to_string(),
			"jpeg tiles only support grey or RGB images without alpha"
		);
	}

	#[test]
	fn rejects_quality_100() {
		let image = test_image(BandLayout::Rgb, 16, 16);
		assert!(encode(&image, Some(100)).is_err());
	}
}
