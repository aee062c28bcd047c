//! An axis-aligned geographic bounding box.

use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// A `min_x/min_y/max_x/max_y` extent in the units of the dataset SRS.
///
/// Stored in `gpkg_contents` and `gpkg_tile_matrix_set`; also the unit in
/// which open-time extent overrides are expressed.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoExtent {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl GeoExtent {
	/// Create a new extent.
	///
	/// # Errors
	/// Returns an error if a minimum is not strictly below its maximum.
	pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<GeoExtent> {
		ensure!(min_x < max_x, "min_x ({min_x}) must be < max_x ({max_x})");
		ensure!(min_y < max_y, "min_y ({min_y}) must be < max_y ({max_y})");
		Ok(GeoExtent {
			min_x,
			min_y,
			max_x,
			max_y,
		})
	}

	/// Width of the extent in SRS units.
	#[must_use]
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Height of the extent in SRS units.
	#[must_use]
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Intersection with another extent; `None` when disjoint.
	#[must_use]
	pub fn intersect(&self, other: &GeoExtent) -> Option<GeoExtent> {
		let min_x = self.min_x.max(other.min_x);
		let min_y = self.min_y.max(other.min_y);
		let max_x = self.max_x.min(other.max_x);
		let max_y = self.max_y.min(other.max_y);
		if min_x < max_x && min_y < max_y {
			Some(GeoExtent {
				min_x,
				min_y,
				max_x,
				max_y,
			})
		} else {
			None
		}
	}

	/// Returns `true` if the point lies inside (or on the border of) the extent.
	#[must_use]
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
	}
}

impl Debug for GeoExtent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"GeoExtent[{}, {}, {}, {}]",
			self.min_x, self.min_y, self.max_x, self.max_y
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn construction() {
		assert!(GeoExtent::new(0.0, 0.0, 10.0, 5.0).is_ok());
		assert!(GeoExtent::new(10.0, 0.0, 0.0, 5.0).is_err());
		assert!(GeoExtent::new(0.0, 5.0, 10.0, 5.0).is_err());
	}

	#[test]
	fn dimensions() {
		let extent = GeoExtent::new(-10.0, -5.0, 30.0, 15.0).unwrap();
		assert_eq!(extent.width(), 40.0);
		assert_eq!(extent.height(), 20.0);
	}

	#[test]
	fn intersect() {
		let a = GeoExtent::new(0.0, 0.0, 10.0, 10.0).unwrap();
		let b = GeoExtent::new(5.0, 5.0, 15.0, 15.0).unwrap();
		assert_eq!(a.intersect(&b), Some(GeoExtent::new(5.0, 5.0, 10.0, 10.0).unwrap()));

		let c = GeoExtent::new(20.0, 0.0, 30.0, 10.0).unwrap();
		assert_eq!(a.intersect(&c), None);
	}

	#[test]
	fn contains() {
		let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0).unwrap();
		assert!(extent.contains(5.0, 5.0));
		assert!(extent.contains(0.0, 10.0));
		assert!(!extent.contains(-0.1, 5.0));
	}
}
