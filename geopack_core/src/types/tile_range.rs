//! An inclusive rectangular range of tile cells at one zoom level.

use crate::TileCoord;
use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// A rectangular, inclusive col/row range at a single zoom level.
///
/// Used by the tile-grid indexer to describe which tiles a pixel window
/// touches, and by the writer to iterate the tiles of one zoom level.
///
/// # Examples
///
/// ```
/// use geopack_core::TileRange;
///
/// let range = TileRange::new(2, 1, 0, 2, 1).unwrap();
/// assert_eq!(range.count(), 4);
/// let cells: Vec<_> = range.iter().map(|c| (c.col, c.row)).collect();
/// assert_eq!(cells, vec![(1, 0), (2, 0), (1, 1), (2, 1)]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
	/// The zoom level of all cells in the range.
	pub zoom: u8,
	/// Leftmost column (inclusive).
	pub col_min: u32,
	/// Topmost row (inclusive).
	pub row_min: u32,
	/// Rightmost column (inclusive).
	pub col_max: u32,
	/// Bottommost row (inclusive).
	pub row_max: u32,
}

impl TileRange {
	/// Create a new range from inclusive minimum and maximum indices.
	///
	/// # Errors
	/// Returns an error if a minimum exceeds its maximum.
	pub fn new(zoom: u8, col_min: u32, row_min: u32, col_max: u32, row_max: u32) -> Result<TileRange> {
		ensure!(col_min <= col_max, "col_min ({col_min}) must be <= col_max ({col_max})");
		ensure!(row_min <= row_max, "row_min ({row_min}) must be <= row_max ({row_max})");
		Ok(TileRange {
			zoom,
			col_min,
			row_min,
			col_max,
			row_max,
		})
	}

	/// The full range of a `matrix_width` × `matrix_height` tile matrix.
	///
	/// # Errors
	/// Returns an error if either dimension is zero.
	pub fn full_matrix(zoom: u8, matrix_width: u32, matrix_height: u32) -> Result<TileRange> {
		ensure!(matrix_width > 0, "matrix_width must be > 0");
		ensure!(matrix_height > 0, "matrix_height must be > 0");
		TileRange::new(zoom, 0, 0, matrix_width - 1, matrix_height - 1)
	}

	/// Number of columns in the range.
	#[must_use]
	pub fn width(&self) -> u32 {
		self.col_max - self.col_min + 1
	}

	/// Number of rows in the range.
	#[must_use]
	pub fn height(&self) -> u32 {
		self.row_max - self.row_min + 1
	}

	/// Number of cells in the range.
	#[must_use]
	pub fn count(&self) -> u64 {
		u64::from(self.width()) * u64::from(self.height())
	}

	/// Intersect with another range at the same zoom; `None` when disjoint.
	#[must_use]
	pub fn intersect(&self, other: &TileRange) -> Option<TileRange> {
		if self.zoom != other.zoom {
			return None;
		}
		let col_min = self.col_min.max(other.col_min);
		let row_min = self.row_min.max(other.row_min);
		let col_max = self.col_max.min(other.col_max);
		let row_max = self.row_max.min(other.row_max);
		if col_min > col_max || row_min > row_max {
			None
		} else {
			Some(TileRange {
				zoom: self.zoom,
				col_min,
				row_min,
				col_max,
				row_max,
			})
		}
	}

	/// Returns `true` if the coordinate lies within the range.
	#[must_use]
	pub fn contains(&self, coord: &TileCoord) -> bool {
		coord.zoom == self.zoom
			&& coord.col >= self.col_min
			&& coord.col <= self.col_max
			&& coord.row >= self.row_min
			&& coord.row <= self.row_max
	}

	/// Iterate all cells in row-major order (top row first).
	pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
		let zoom = self.zoom;
		let cols = self.col_min..=self.col_max;
		(self.row_min..=self.row_max).flat_map(move |row| cols.clone().map(move |col| TileCoord::new(zoom, col, row)))
	}
}

impl Debug for TileRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"TileRange({}: [{},{}]..[{},{}] = {}x{})",
			self.zoom,
			self.col_min,
			self.row_min,
			self.col_max,
			self.row_max,
			self.width(),
			self.height()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn construction() {
		assert!(TileRange::new(0, 2, 0, 1, 0).is_err());
		assert!(TileRange::new(0, 0, 2, 0, 1).is_err());
		let range = TileRange::full_matrix(3, 4, 2).unwrap();
		assert_eq!(range.width(), 4);
		assert_eq!(range.height(), 2);
		assert_eq!(range.count(), 8);
	}

	#[test]
	fn iter_row_major() {
		let range = TileRange::new(1, 0, 0, 1, 1).unwrap();
		let cells: Vec<_> = range.iter().collect();
		assert_eq!(
			cells,
			vec![
				TileCoord::new(1, 0, 0),
				TileCoord::new(1, 1, 0),
				TileCoord::new(1, 0, 1),
				TileCoord::new(1, 1, 1),
			]
		);
	}

	#[test]
	fn intersect() {
		let a = TileRange::new(2, 0, 0, 3, 3).unwrap();
		let b = TileRange::new(2, 2, 2, 5, 5).unwrap();
		assert_eq!(a.intersect(&b), Some(TileRange::new(2, 2, 2, 3, 3).unwrap()));

		let c = TileRange::new(2, 4, 0, 5, 3).unwrap();
		assert_eq!(a.intersect(&c), None);

		let d = TileRange::new(3, 0, 0, 3, 3).unwrap();
		assert_eq!(a.intersect(&d), None);
	}

	#[test]
	fn contains() {
		let range = TileRange::new(2, 1, 1, 2, 2).unwrap();
		assert!(range.contains(&TileCoord::new(2, 1, 2)));
		assert!(!range.contains(&TileCoord::new(2, 0, 2)));
		assert!(!range.contains(&TileCoord::new(1, 1, 1)));
	}

	#[test]
	fn debug_format() {
		let range = TileRange::new(2, 1, 0, 2, 1).unwrap();
		assert_eq!(format!("{range:?}"), "TileRange(2: [1,0]..[2,1] = 2x2)");
	}
}
