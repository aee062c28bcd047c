//! Tile coordinates in a GeoPackage tile matrix.
//!
//! Unlike TMS-style schemes, GPKG anchors `tile_row = 0` at the **top** of
//! the grid, so no y flip is ever applied. Coordinates are only meaningful
//! relative to the tile matrix of their zoom level; validity against matrix
//! bounds is checked where the matrix is known.

use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// A cell in a GPKG tile matrix: zoom level plus column/row indices.
///
/// # Examples
///
/// ```
/// use geopack_core::TileCoord;
///
/// let coord = TileCoord::new(3, 4, 1);
/// assert_eq!(coord.zoom, 3);
/// assert_eq!(coord.col, 4);
/// assert_eq!(coord.row, 1);
/// ```
#[derive(Eq, PartialEq, Clone, Copy, Hash)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub zoom: u8,
	/// The column index (0 = leftmost).
	pub col: u32,
	/// The row index (0 = topmost).
	pub row: u32,
}

impl TileCoord {
	/// Create a new `TileCoord`.
	#[must_use]
	pub fn new(zoom: u8, col: u32, row: u32) -> TileCoord {
		TileCoord { zoom, col, row }
	}

	/// Validate this coordinate against the matrix dimensions of its zoom.
	///
	/// # Errors
	/// Returns an error if the column or row is outside the matrix.
	pub fn check_bounds(&self, matrix_width: u32, matrix_height: u32) -> Result<()> {
		ensure!(
			self.col < matrix_width,
			"tile_column ({}) out of bounds for matrix width {matrix_width}",
			self.col
		);
		ensure!(
			self.row < matrix_height,
			"tile_row ({}) out of bounds for matrix height {matrix_height}",
			self.row
		);
		Ok(())
	}

	/// The coordinate of the parent cell one zoom level up the pyramid.
	///
	/// # Errors
	/// Returns an error if the zoom level is already 0.
	pub fn parent(&self) -> Result<TileCoord> {
		ensure!(self.zoom > 0, "zoom level 0 has no parent");
		Ok(TileCoord::new(self.zoom - 1, self.col / 2, self.row / 2))
	}
}

/// Custom `Debug` format as `TileCoord(z, col, row)` for readability.
impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, {}, {})", self.zoom, self.col, self.row)
	}
}

/// Lexicographic ordering: first by `zoom`, then `row`, then `col`.
impl Ord for TileCoord {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self
			.zoom
			.cmp(&other.zoom)
			.then(self.row.cmp(&other.row))
			.then(self.col.cmp(&other.col))
	}
}

impl PartialOrd for TileCoord {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}
