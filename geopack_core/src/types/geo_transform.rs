//! Affine pixel ↔ geographic coordinate mapping.
//!
//! GPKG tile matrices cannot express rotation or shearing, so the transform
//! is reduced to an origin plus signed per-axis pixel sizes. The
//! 6-coefficient constructor accepts the common
//! `[origin_x, pixel_size_x, 0, origin_y, 0, pixel_size_y]` layout and
//! rejects rotated transforms.

use crate::GeoExtent;
use anyhow::{Result, ensure};

/// North-up affine georeferencing of a raster.
///
/// `origin_x`/`origin_y` is the geographic position of the **top-left
/// corner** of pixel (0, 0). `pixel_size_y` is negative for north-up
/// rasters (pixel rows advance southwards).
///
/// # Examples
///
/// ```
/// use geopack_core::GeoTransform;
///
/// let gt = GeoTransform::new(0.0, 0.0, 10.0, -10.0).unwrap();
/// assert_eq!(gt.pixel_to_geo(2.0, 3.0), (20.0, -30.0));
/// assert_eq!(gt.geo_to_pixel(20.0, -30.0), (2.0, 3.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTransform {
	/// Geographic x of the top-left corner of pixel (0, 0).
	pub origin_x: f64,
	/// Geographic y of the top-left corner of pixel (0, 0).
	pub origin_y: f64,
	/// Width of one pixel in SRS units (positive).
	pub pixel_size_x: f64,
	/// Height of one pixel in SRS units (negative for north-up).
	pub pixel_size_y: f64,
}

impl GeoTransform {
	/// Create a new transform.
	///
	/// # Errors
	/// Returns an error if `pixel_size_x` is not positive or `pixel_size_y` is zero.
	pub fn new(origin_x: f64, origin_y: f64, pixel_size_x: f64, pixel_size_y: f64) -> Result<GeoTransform> {
		ensure!(pixel_size_x > 0.0, "pixel_size_x ({pixel_size_x}) must be > 0");
		ensure!(pixel_size_y != 0.0, "pixel_size_y must not be 0");
		Ok(GeoTransform {
			origin_x,
			origin_y,
			pixel_size_x,
			pixel_size_y,
		})
	}

	/// Create a transform from GDAL-style coefficients
	/// `[origin_x, pixel_size_x, rot_x, origin_y, rot_y, pixel_size_y]`.
	///
	/// # Errors
	/// Returns an error if the rotation terms are non-zero.
	pub fn from_coefficients(c: [f64; 6]) -> Result<GeoTransform> {
		ensure!(
			c[2] == 0.0 && c[4] == 0.0,
			"rotated geotransforms are not supported by tile matrices"
		);
		GeoTransform::new(c[0], c[3], c[1], c[5])
	}

	/// The GDAL-style 6-coefficient representation.
	#[must_use]
	pub fn to_coefficients(&self) -> [f64; 6] {
		[
			self.origin_x,
			self.pixel_size_x,
			0.0,
			self.origin_y,
			0.0,
			self.pixel_size_y,
		]
	}

	/// Map a (fractional) pixel position to geographic coordinates.
	#[must_use]
	pub fn pixel_to_geo(&self, px: f64, py: f64) -> (f64, f64) {
		(
			self.origin_x + px * self.pixel_size_x,
			self.origin_y + py * self.pixel_size_y,
		)
	}

	/// Map geographic coordinates to a (fractional) pixel position.
	#[must_use]
	pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
		(
			(x - self.origin_x) / self.pixel_size_x,
			(y - self.origin_y) / self.pixel_size_y,
		)
	}

	/// The geographic extent covered by a `width` × `height` raster.
	///
	/// # Errors
	/// Returns an error for south-up transforms or zero-sized rasters.
	pub fn extent_of(&self, width: u32, height: u32) -> Result<GeoExtent> {
		ensure!(self.pixel_size_y < 0.0, "extent_of requires a north-up transform");
		let (max_x, min_y) = self.pixel_to_geo(f64::from(width), f64::from(height));
		GeoExtent::new(self.origin_x, min_y, max_x, self.origin_y)
	}

	/// Derive the transform that maps a `width` × `height` raster onto `extent`.
	///
	/// # Errors
	/// Returns an error if width or height is zero.
	pub fn from_extent(extent: &GeoExtent, width: u32, height: u32) -> Result<GeoTransform> {
		ensure!(width > 0 && height > 0, "raster size must not be zero");
		GeoTransform::new(
			extent.min_x,
			extent.max_y,
			extent.width() / f64::from(width),
			-extent.height() / f64::from(height),
		)
	}
}
