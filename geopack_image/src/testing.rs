//! Deterministic test images.
//!
//! Shared by the codec tests here and by container tests downstream. The
//! gradients exercise every sample value without relying on random data.

use geopack_core::BandLayout;
use image::DynamicImage;

/// A deterministic gradient image in the given layout.
///
/// Pixel values depend only on position, so two calls with the same
/// arguments produce identical images.
#[must_use]
pub fn test_image(layout: BandLayout, width: u32, height: u32) -> DynamicImage {
	let v = |x: u32, y: u32, offset: u32| ((x * 7 + y * 13 + offset * 31) % 256) as u8;
	match layout {
		BandLayout::Grey => DynamicImage::ImageLuma8(image::GrayImage::from_fn(width, height, |x, y| {
			image::Luma([v(x, y, 0)])
		})),
		BandLayout::GreyAlpha => DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_fn(width, height, |x, y| {
			image::LumaA([v(x, y, 0), v(x, y, 1).max(1)])
		})),
		BandLayout::Rgb => DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
			image::Rgb([v(x, y, 0), v(x, y, 1), v(x, y, 2)])
		})),
		BandLayout::Rgba => DynamicImage::ImageRgba8(image::RgbaImage::from_fn(width, height, |x, y| {
			image::Rgba([v(x, y, 0), v(x, y, 1), v(x, y, 2), v(x, y, 3).max(1)])
		})),
	}
}

/// A single-color image in the given layout.
#[must_use]
pub fn flat_image(layout: BandLayout, width: u32, height: u32, value: u8, alpha: u8) -> DynamicImage {
	match layout {
		BandLayout::Grey => {
			DynamicImage::ImageLuma8(image::GrayImage::from_pixel(width, height, image::Luma([value])))
		}
		BandLayout::GreyAlpha => DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_pixel(
			width,
			height,
			image::LumaA([value, alpha]),
		)),
		BandLayout::Rgb => DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
			width,
			height,
			image::Rgb([value, value, value]),
		)),
		BandLayout::Rgba => DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
			width,
			height,
			image::Rgba([value, value, value, alpha]),
		)),
	}
}
