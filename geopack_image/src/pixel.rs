//! Operations on decoded tile images.
//!
//! Everything here works on 8-bit [`DynamicImage`]s in one of the four
//! band layouts. Assembly of read windows and tile padding are expressed
//! through [`blank`], [`paste`] and the layout conversions.

use anyhow::{Result, bail, ensure};
use geopack_core::{BandLayout, ColorTable, PixelWindow};
use image::{DynamicImage, GenericImageView, imageops};

/// Whether and how an image uses its alpha band.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlphaState {
	/// The layout has no alpha band.
	NoAlpha,
	/// Every alpha sample is 255.
	Opaque,
	/// Every alpha sample is 0.
	Transparent,
	/// Alpha samples vary.
	Mixed,
}

/// The band layout of an image.
///
/// # Errors
/// Returns an error for layouts other than 8-bit grey, grey+alpha, RGB or
/// RGBA.
pub fn layout_of(image: &DynamicImage) -> Result<BandLayout> {
	Ok(match image {
		DynamicImage::ImageLuma8(_) => BandLayout::Grey,
		DynamicImage::ImageLumaA8(_) => BandLayout::GreyAlpha,
		DynamicImage::ImageRgb8(_) => BandLayout::Rgb,
		DynamicImage::ImageRgba8(_) => BandLayout::Rgba,
		_ => bail!("unsupported pixel layout {:?}", image.color()),
	})
}

/// Convert an image to the given band layout.
///
/// Grey expands to identical RGB channels; color collapses to grey via
/// luminance. Adding alpha fills it with 255, dropping alpha discards it.
#[must_use]
pub fn to_layout(image: &DynamicImage, layout: BandLayout) -> DynamicImage {
	match layout {
		BandLayout::Grey => DynamicImage::ImageLuma8(image.to_luma8()),
		BandLayout::GreyAlpha => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
		BandLayout::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
		BandLayout::Rgba => DynamicImage::ImageRgba8(image.to_rgba8()),
	}
}

/// A zero-filled image in the given layout.
///
/// For layouts with alpha the result is fully transparent black.
#[must_use]
pub fn blank(layout: BandLayout, width: u32, height: u32) -> DynamicImage {
	match layout {
		BandLayout::Grey => DynamicImage::new_luma8(width, height),
		BandLayout::GreyAlpha => DynamicImage::new_luma_a8(width, height),
		BandLayout::Rgb => DynamicImage::new_rgb8(width, height),
		BandLayout::Rgba => DynamicImage::new_rgba8(width, height),
	}
}

/// Copy `src` into `dest` with its top-left corner at (x, y).
///
/// Pixels are replaced, not alpha-blended; parts of `src` outside `dest`
/// are clipped.
pub fn paste(dest: &mut DynamicImage, src: &DynamicImage, x: i64, y: i64) {
	imageops::replace(dest, src, x, y);
}

/// Cut a window out of an image.
///
/// # Errors
/// Returns an error if the window exceeds the image.
pub fn crop(image: &DynamicImage, window: &PixelWindow) -> Result<DynamicImage> {
	window.check_fits(image.width(), image.height())?;
	Ok(image.crop_imm(window.x, window.y, window.width, window.height))
}

/// Classify the alpha band of an image.
#[must_use]
pub fn alpha_state(image: &DynamicImage) -> AlphaState {
	let channels = image.color().channel_count() as usize;
	if !image.color().has_alpha() {
		return AlphaState::NoAlpha;
	}

	let mut min = 255u8;
	let mut max = 0u8;
	for alpha in image.as_bytes().iter().skip(channels - 1).step_by(channels) {
		min = min.min(*alpha);
		max = max.max(*alpha);
	}

	match (min, max) {
		(255, _) => AlphaState::Opaque,
		(_, 0) => AlphaState::Transparent,
		_ => AlphaState::Mixed,
	}
}

/// Expand an indexed grey image into RGBA through a color table.
///
/// # Errors
/// Returns an error if the image is not single-band grey or an index has
/// no palette entry.
pub fn expand_color_table(image: &DynamicImage, table: &ColorTable) -> Result<DynamicImage> {
	let DynamicImage::ImageLuma8(indexed) = image else {
		bail!("color table expansion requires a single-band grey image");
	};

	let mut expanded = image::RgbaImage::new(indexed.width(), indexed.height());
	for (source, target) in indexed.pixels().zip(expanded.pixels_mut()) {
		let index = source.0[0];
		let Some(entry) = table.get(index) else {
			bail!("pixel index {index} has no entry in the {}-entry color table", table.len());
		};
		target.0 = [entry.red, entry.green, entry.blue, entry.alpha];
	}

	Ok(DynamicImage::ImageRgba8(expanded))
}

/// The samples of one band in row-major order.
///
/// # Errors
/// Returns an error if `band` is out of range for the image layout.
pub fn band_samples(image: &DynamicImage, band: u8) -> Result<Vec<u8>> {
	let channels = image.color().channel_count();
	ensure!(
		band < channels,
		"band {band} out of range, image has {channels} band(s)"
	);
	Ok(image
		.as_bytes()
		.iter()
		.skip(usize::from(band))
		.step_by(usize::from(channels))
		.copied()
		.collect())
}

/// Largest absolute per-sample difference between two images.
///
/// # Errors
/// Returns an error if the images differ in size or layout.
pub fn max_band_difference(a: &DynamicImage, b: &DynamicImage) -> Result<f64> {
	ensure!(
		a.dimensions() == b.dimensions() && a.color() == b.color(),
		"images differ in size or layout"
	);
	Ok(a.as_bytes()
		.iter()
		.zip(b.as_bytes())
		.map(|(x, y)| u8::abs_diff(*x, *y))
		.max()
		.map_or(0.0, f64::from))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::test_image;
	use geopack_core::ColorEntry;

	#[test]
	fn layout_round_trip() {
		for layout in [BandLayout::Grey, BandLayout::GreyAlpha, BandLayout::Rgb, BandLayout::Rgba] {
			let image = blank(layout, 4, 4);
			assert_eq!(layout_of(&image).unwrap(), layout);
		}
	}

	#[test]
	fn grey_expands_to_identical_channels() {
		let grey = test_image(BandLayout::Grey, 8, 8);
		let rgb = to_layout(&grey, BandLayout::Rgb);
		for pixel in rgb.to_rgb8().pixels() {
			assert_eq!(pixel.0[0], pixel.0[1]);
			assert_eq!(pixel.0[1], pixel.0[2]);
		}
	}

	#[test]
	fn added_alpha_is_opaque() {
		let rgb = test_image(BandLayout::Rgb, 8, 8);
		let rgba = to_layout(&rgb, BandLayout::Rgba);
		assert_eq!(alpha_state(&rgba), AlphaState::Opaque);
	}

	#[test]
	fn alpha_states() {
		assert_eq!(alpha_state(&blank(BandLayout::Rgb, 4, 4)), AlphaState::NoAlpha);
		assert_eq!(alpha_state(&blank(BandLayout::Rgba, 4, 4)), AlphaState::Transparent);

		let mut mixed = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
		mixed.put_pixel(0, 0, image::Rgba([9, 9, 9, 128]));
		assert_eq!(alpha_state(&DynamicImage::ImageRgba8(mixed)), AlphaState::Mixed);
	}

	#[test]
	fn paste_replaces_without_blending() {
		let mut dest = blank(BandLayout::Rgba, 4, 4);
		let src = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 0])));
		paste(&mut dest, &src, 1, 1);

		let pixels = dest.to_rgba8();
		assert_eq!(pixels.get_pixel(0, 0).0, [0, 0, 0, 0]);
		// Fully transparent source pixels still overwrite the target.
		assert_eq!(pixels.get_pixel(1, 1).0, [10, 20, 30, 0]);
	}

	#[test]
	fn crop_checks_bounds() {
		let image = test_image(BandLayout::Rgb, 8, 8);
		let window = PixelWindow::new(2, 2, 4, 4).unwrap();
		let cropped = crop(&image, &window).unwrap();
		assert_eq!((cropped.width(), cropped.height()), (4, 4));

		assert!(crop(&image, &PixelWindow::new(6, 6, 4, 4).unwrap()).is_err());
	}

	#[test]
	fn color_table_expansion() {
		let table: ColorTable = [
			ColorEntry::opaque(255, 0, 0),
			ColorEntry {
				red: 0,
				green: 0,
				blue: 255,
				alpha: 128,
			},
		]
		.into_iter()
		.collect();

		let mut indexed = image::GrayImage::new(2, 1);
		indexed.put_pixel(1, 0, image::Luma([1]));
		let expanded = expand_color_table(&DynamicImage::ImageLuma8(indexed), &table).unwrap();

		let pixels = expanded.to_rgba8();
		assert_eq!(pixels.get_pixel(0, 0).0, [255, 0, 0, 255]);
		assert_eq!(pixels.get_pixel(1, 0).0, [0, 0, 255, 128]);
	}

	#[test]
	fn color_table_rejects_missing_index() {
		let table: ColorTable = [ColorEntry::opaque(0, 0, 0)].into_iter().collect();
		let mut indexed = image::GrayImage::new(1, 1);
		indexed.put_pixel(0, 0, image::Luma([7]));
		assert!(expand_color_table(&DynamicImage::ImageLuma8(indexed), &table).is_err());
	}

	#[test]
	fn band_extraction() {
		let image = test_image(BandLayout::Rgba, 4, 4);
		let red = band_samples(&image, 0).unwrap();
		assert_eq!(red.len(), 16);
		assert_eq!(red, image.as_bytes().iter().step_by(4).copied().collect::<Vec<u8>>());
		assert!(band_samples(&image, 4).is_err());
	}
}
