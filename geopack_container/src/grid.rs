//! Mapping between dataset pixels and tile positions.
//!
//! An opened dataset is a pixel rectangle anchored somewhere inside a tile
//! grid. The raster origin rarely coincides with a tile corner, so every
//! read and write has to split pixel windows into per-tile slices. That
//! arithmetic lives here, with signed offsets so that rasters anchored
//! before the grid origin (possible with extent overrides) stay valid.

use anyhow::{Result, ensure};
use geopack_core::{PixelWindow, TileCoord, TileRange};

/// One tile's share of a pixel window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSlice {
	/// The tile holding the pixels.
	pub coord: TileCoord,
	/// The covered region inside the tile.
	pub tile_area: PixelWindow,
	/// The matching region in dataset pixel coordinates.
	pub raster_area: PixelWindow,
}

/// The pixel-to-tile indexer of one zoom level.
#[derive(Clone, Copy, Debug)]
pub struct TileGrid {
	zoom: u8,
	matrix_width: u32,
	matrix_height: u32,
	tile_width: u32,
	tile_height: u32,
	/// Grid pixel x of dataset pixel (0, 0). Negative when the raster
	/// starts left of the grid origin.
	offset_x: i64,
	offset_y: i64,
	width: u32,
	height: u32,
}

impl TileGrid {
	/// Create a grid indexer.
	///
	/// `offset_x`/`offset_y` anchor dataset pixel (0, 0) in grid pixels,
	/// `width`/`height` are the dataset dimensions.
	///
	/// # Errors
	/// Returns an error for zero tile, matrix or raster dimensions.
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		zoom: u8,
		matrix_width: u32,
		matrix_height: u32,
		tile_width: u32,
		tile_height: u32,
		offset_x: i64,
		offset_y: i64,
		width: u32,
		height: u32,
	) -> Result<TileGrid> {
		ensure!(matrix_width > 0 && matrix_height > 0, "matrix size must not be zero");
		ensure!(tile_width > 0 && tile_height > 0, "tile size must not be zero");
		ensure!(width > 0 && height > 0, "raster size must not be zero");
		Ok(TileGrid {
			zoom,
			matrix_width,
			matrix_height,
			tile_width,
			tile_height,
			offset_x,
			offset_y,
			width,
			height,
		})
	}

	#[must_use]
	pub fn zoom(&self) -> u8 {
		self.zoom
	}

	#[must_use]
	pub fn tile_size(&self) -> (u32, u32) {
		(self.tile_width, self.tile_height)
	}

	#[must_use]
	pub fn raster_size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	/// The tiles touched by the full raster, clipped to the matrix.
	///
	/// # Errors
	/// Returns an error if the raster lies entirely outside the matrix.
	pub fn full_tile_range(&self) -> Result<TileRange> {
		let window = PixelWindow::full(self.width, self.height)?;
		let slices = self.slices(&window)?;
		ensure!(!slices.is_empty(), "raster does not intersect the tile matrix");

		let col_min = slices.iter().map(|s| s.coord.col).min().unwrap_or(0);
		let col_max = slices.iter().map(|s| s.coord.col).max().unwrap_or(0);
		let row_min = slices.iter().map(|s| s.coord.row).min().unwrap_or(0);
		let row_max = slices.iter().map(|s| s.coord.row).max().unwrap_or(0);
		TileRange::new(self.zoom, col_min, row_min, col_max, row_max)
	}

	/// Split a pixel window into per-tile slices.
	///
	/// Slices are returned in row-major tile order. Parts of the window
	/// falling outside the tile matrix produce no slice; callers treat
	/// those pixels as absent.
	///
	/// # Errors
	/// Returns an error if the window exceeds the raster.
	pub fn slices(&self, window: &PixelWindow) -> Result<Vec<TileSlice>> {
		window.check_fits(self.width, self.height)?;

		// Window bounds in grid pixels.
		let gx0 = i64::from(window.x) + self.offset_x;
		let gy0 = i64::from(window.y) + self.offset_y;
		let gx1 = gx0 + i64::from(window.width);
		let gy1 = gy0 + i64::from(window.height);

		let tw = i64::from(self.tile_width);
		let th = i64::from(self.tile_height);

		let col_min = (gx0.div_euclid(tw)).max(0);
		let row_min = (gy0.div_euclid(th)).max(0);
		let col_max = ((gx1 - 1).div_euclid(tw)).min(i64::from(self.matrix_width) - 1);
		let row_max = ((gy1 - 1).div_euclid(th)).min(i64::from(self.matrix_height) - 1);

		let mut slices = Vec::new();
		for row in row_min..=row_max {
			for col in col_min..=col_max {
				// Intersection of the window with this tile, in grid pixels.
				let x0 = gx0.max(col * tw);
				let y0 = gy0.max(row * th);
				let x1 = gx1.min((col + 1) * tw);
				let y1 = gy1.min((row + 1) * th);
				if x0 >= x1 || y0 >= y1 {
					continue;
				}

				slices.push(TileSlice {
					coord: TileCoord::new(self.zoom, col as u32, row as u32),
					tile_area: PixelWindow::new(
						(x0 - col * tw) as u32,
						(y0 - row * th) as u32,
						(x1 - x0) as u32,
						(y1 - y0) as u32,
					)?,
					raster_area: PixelWindow::new(
						(x0 - self.offset_x) as u32,
						(y0 - self.offset_y) as u32,
						(x1 - x0) as u32,
						(y1 - y0) as u32,
					)?,
				});
			}
		}

		Ok(slices)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn grid_400x200() -> TileGrid {
		// 400x200 raster, 256px tiles, anchored at the grid origin.
		TileGrid::new(1, 2, 1, 256, 256, 0, 0, 400, 200).unwrap()
	}

	#[test]
	fn full_raster_slices() {
		let grid = grid_400x200();
		let slices = grid.slices(&PixelWindow::full(400, 200).unwrap()).unwrap();
		assert_eq!(slices.len(), 2);

		assert_eq!(slices[0].coord, TileCoord::new(1, 0, 0));
		assert_eq!(slices[0].tile_area, PixelWindow::new(0, 0, 256, 200).unwrap());
		assert_eq!(slices[0].raster_area, PixelWindow::new(0, 0, 256, 200).unwrap());

		assert_eq!(slices[1].coord, TileCoord::new(1, 1, 0));
		assert_eq!(slices[1].tile_area, PixelWindow::new(0, 0, 144, 200).unwrap());
		assert_eq!(slices[1].raster_area, PixelWindow::new(256, 0, 144, 200).unwrap());
	}

	#[test]
	fn window_inside_one_tile() {
		let grid = grid_400x200();
		let slices = grid.slices(&PixelWindow::new(10, 20, 30, 40).unwrap()).unwrap();
		assert_eq!(slices.len(), 1);
		assert_eq!(slices[0].tile_area, PixelWindow::new(10, 20, 30, 40).unwrap());
	}

	#[test]
	fn window_across_tile_border() {
		let grid = grid_400x200();
		let slices = grid.slices(&PixelWindow::new(250, 0, 12, 10).unwrap()).unwrap();
		assert_eq!(slices.len(), 2);
		assert_eq!(slices[0].tile_area, PixelWindow::new(250, 0, 6, 10).unwrap());
		assert_eq!(slices[1].tile_area, PixelWindow::new(0, 0, 6, 10).unwrap());
		assert_eq!(slices[1].raster_area, PixelWindow::new(256, 0, 6, 10).unwrap());
	}

	#[test]
	fn offset_anchoring() {
		// Raster starts 100 grid pixels into the first tile.
		let grid = TileGrid::new(0, 1, 1, 256, 256, 100, 50, 100, 100).unwrap();
		let slices = grid.slices(&PixelWindow::full(100, 100).unwrap()).unwrap();
		assert_eq!(slices.len(), 1);
		assert_eq!(slices[0].tile_area, PixelWindow::new(100, 50, 100, 100).unwrap());
		assert_eq!(slices[0].raster_area, PixelWindow::new(0, 0, 100, 100).unwrap());
	}

	#[test]
	fn negative_offset_clips_to_matrix() {
		// Raster starts 10 pixels before the grid origin; those pixels have
		// no backing tile.
		let grid = TileGrid::new(0, 1, 1, 256, 256, -10, 0, 100, 100).unwrap();
		let slices = grid.slices(&PixelWindow::full(100, 100).unwrap()).unwrap();
		assert_eq!(slices.len(), 1);
		assert_eq!(slices[0].tile_area, PixelWindow::new(0, 0, 90, 100).unwrap());
		assert_eq!(slices[0].raster_area, PixelWindow::new(10, 0, 90, 100).unwrap());
	}

	#[test]
	fn full_tile_range() {
		assert_eq!(
			grid_400x200().full_tile_range().unwrap(),
			TileRange::new(1, 0, 0, 1, 0).unwrap()
		);
	}

	#[test]
	fn window_exceeding_raster_is_rejected() {
		let grid = grid_400x200();
		assert!(grid.slices(&PixelWindow::new(390, 0, 20, 10).unwrap()).is_err());
	}
}
