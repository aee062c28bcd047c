//! Tile matrix records and pyramid derivation.
//!
//! One [`TileMatrix`] corresponds to one row of the `gpkg_tile_matrix`
//! table: the tile layout of a single zoom level. A complete pyramid runs
//! from zoom 0 (coarsest, one or few tiles) to the base zoom whose pixel
//! size equals the source raster's. Each step down one zoom doubles the
//! pixel size and (roughly) halves the raster.

use anyhow::{Result, ensure};

/// The tile layout of one zoom level.
///
/// Pixel sizes are stored as positive magnitudes, matching the
/// `gpkg_tile_matrix` schema; the vertical orientation lives in the
/// dataset's geotransform, not here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileMatrix {
	pub zoom: u8,
	pub matrix_width: u32,
	pub matrix_height: u32,
	pub tile_width: u32,
	pub tile_height: u32,
	pub pixel_size_x: f64,
	pub pixel_size_y: f64,
}

impl TileMatrix {
	/// Create a new tile matrix row.
	///
	/// # Errors
	/// Returns an error if any dimension or pixel size is not positive.
	pub fn new(
		zoom: u8,
		matrix_width: u32,
		matrix_height: u32,
		tile_width: u32,
		tile_height: u32,
		pixel_size_x: f64,
		pixel_size_y: f64,
	) -> Result<TileMatrix> {
		ensure!(matrix_width > 0 && matrix_height > 0, "matrix size must not be zero");
		ensure!(tile_width > 0 && tile_height > 0, "tile size must not be zero");
		ensure!(
			pixel_size_x > 0.0 && pixel_size_y > 0.0,
			"pixel sizes must be positive"
		);
		Ok(TileMatrix {
			zoom,
			matrix_width,
			matrix_height,
			tile_width,
			tile_height,
			pixel_size_x,
			pixel_size_y,
		})
	}

	/// Total width of the grid in pixels (`matrix_width * tile_width`).
	#[must_use]
	pub fn grid_width_px(&self) -> u64 {
		u64::from(self.matrix_width) * u64::from(self.tile_width)
	}

	/// Total height of the grid in pixels (`matrix_height * tile_height`).
	#[must_use]
	pub fn grid_height_px(&self) -> u64 {
		u64::from(self.matrix_height) * u64::from(self.tile_height)
	}
}

/// Derive the full tile matrix pyramid for a raster.
///
/// `width`/`height` are the raster dimensions in pixels at the base zoom,
/// `pixel_size_x`/`pixel_size_y` its (positive) pixel sizes. The base zoom
/// is the smallest zoom whose matrix covers the raster; zoom 0 always has
/// a matrix small enough that a single doubling chain reaches the base.
///
/// Returned matrices are ordered by ascending zoom; only the last (base)
/// level is expected to hold tiles after an initial write.
///
/// # Errors
/// Returns an error for zero dimensions or non-positive pixel sizes.
pub fn derive_tile_matrix_pyramid(
	width: u32,
	height: u32,
	tile_width: u32,
	tile_height: u32,
	pixel_size_x: f64,
	pixel_size_y: f64,
) -> Result<Vec<TileMatrix>> {
	ensure!(width > 0 && height > 0, "raster size must not be zero");
	ensure!(tile_width > 0 && tile_height > 0, "tile size must not be zero");

	let tiles_x = width.div_ceil(tile_width);
	let tiles_y = height.div_ceil(tile_height);
	let max_tiles = tiles_x.max(tiles_y);

	let mut base_zoom = 0u8;
	while (1u32 << base_zoom) < max_tiles {
		base_zoom += 1;
	}

	let mut pyramid = Vec::with_capacity(usize::from(base_zoom) + 1);
	for zoom in 0..=base_zoom {
		let scale = 1u32 << (base_zoom - zoom);
		let level_width = width.div_ceil(scale);
		let level_height = height.div_ceil(scale);
		pyramid.push(TileMatrix::new(
			zoom,
			level_width.div_ceil(tile_width),
			level_height.div_ceil(tile_height),
			tile_width,
			tile_height,
			pixel_size_x * f64::from(scale),
			pixel_size_y * f64::from(scale),
		)?);
	}

	Ok(pyramid)
}
