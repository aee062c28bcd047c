//! WEBP codec. RGB and RGBA only; lossy by default, lossless on request.

use anyhow::{Result, anyhow, bail};
use geopack_core::Blob;
use image::{DynamicImage, ImageEncoder, codecs::webp::WebPEncoder};

/// Encode an image as lossy WEBP.
///
/// `quality` is 0..=100 and defaults to 75.
///
/// # Errors
/// Returns an error for layouts other than 8-bit RGB or RGBA.
pub fn encode(image: &DynamicImage, quality: Option<u8>) -> Result<Blob> {
	let encoder = match image {
		DynamicImage::ImageRgb8(img) => webp::Encoder::from_rgb(img.as_raw(), img.width(), img.height()),
		DynamicImage::ImageRgba8(img) => webp::Encoder::from_rgba(img.as_raw(), img.width(), img.height()),
		_ => bail!("webp tiles only support RGB or RGBA images"),
	};

	let quality = f32::from(quality.unwrap_or(75).clamp(0, 100));
	Ok(Blob::from(
		encoder.encode_simple(false, quality).map_err(|e| anyhow!("{e:?}"))?.to_vec(),
	))
}

/// Encode an image as lossless WEBP.
///
/// # Errors
/// Returns an error for layouts other than 8-bit RGB or RGBA.
pub fn encode_lossless(image: &DynamicImage) -> Result<Blob> {
	if !matches!(image, DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_)) {
		bail!("webp tiles only support RGB or RGBA images");
	}

	let mut buffer: Vec<u8> = Vec::new();
	WebPEncoder::new_lossless(&mut buffer).write_image(
		image.as_bytes(),
		image.width(),
		image.height(),
		image.color().into(),
	)?;

	Ok(Blob::from(buffer))
}

/// Decode a WEBP blob.
///
/// # Errors
/// Returns an error if the payload is not a valid WEBP.
pub fn decode(blob: &Blob) -> Result<DynamicImage> {
	webp::Decoder::new(blob.as_slice())
		.decode()
		.map(|img| img.to_image())
		.ok_or_else(|| anyhow!("failed to decode WEBP tile"))
}
