//! Opening and creating raster datasets.
//!
//! A dataset is one tile pyramid table presented as a single addressable
//! raster. [`RasterWriter`] creates tables and stores tiles,
//! [`RasterReader`] assembles pixel windows from stored tiles. Both go
//! through the [`catalog`](crate::catalog) for all SQL.

mod reader;
mod writer;

pub use reader::RasterReader;
pub use writer::RasterWriter;

use crate::catalog::Catalog;
use anyhow::{Result, ensure};
use async_trait::async_trait;
use geopack_core::{BandLayout, GeoExtent, GeoTransform, PixelWindow, TileFormat};
use image::DynamicImage;
use std::path::Path;

/// Options for creating a new tile pyramid table.
#[derive(Clone, Debug)]
pub struct CreateOptions {
	/// Name of the tile pyramid table.
	pub table_name: String,
	/// Human readable identifier; defaults to the table name.
	pub identifier: Option<String>,
	/// Free-form description.
	pub description: String,
	/// Codec for stored tiles.
	pub format: TileFormat,
	/// Codec quality (0..=100); `None` uses the codec default. For WEBP a
	/// quality of 100 stores lossless tiles.
	pub quality: Option<u8>,
	pub tile_width: u32,
	pub tile_height: u32,
	/// SRS id written to the catalog; 0 means undefined.
	pub srs_id: i32,
}

impl Default for CreateOptions {
	fn default() -> CreateOptions {
		CreateOptions {
			table_name: "tiles".to_string(),
			identifier: None,
			description: String::new(),
			format: TileFormat::Png,
			quality: None,
			tile_width: 256,
			tile_height: 256,
			srs_id: 0,
		}
	}
}

/// Options for opening an existing dataset.
#[derive(Clone, Debug, Default)]
pub struct OpenOptions {
	/// Tile pyramid table to open. Required when the container holds more
	/// than one; optional otherwise.
	pub table_name: Option<String>,
	/// Band layout to expose; `None` defaults to RGBA.
	pub band_layout: Option<BandLayout>,
	/// Zoom level to open; `None` opens the base (highest) level. Levels
	/// beyond the base clamp to the base.
	pub zoom_level: Option<u8>,
	/// Derive the raster area from the tiles actually stored instead of
	/// the declared contents extent.
	pub use_tile_extent: bool,
	/// Override edges of the raster area, snapped outward to the pixel
	/// grid of the opened zoom level.
	pub extent: ExtentOverride,
}

/// Per-edge override of the raster area.
///
/// Unset edges keep the declared contents extent, so a single edge can be
/// moved while the others stay put.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtentOverride {
	pub min_x: Option<f64>,
	pub min_y: Option<f64>,
	pub max_x: Option<f64>,
	pub max_y: Option<f64>,
}

impl ExtentOverride {
	/// Merge with a base extent, keeping unset edges.
	///
	/// # Errors
	/// Returns an error if the merged edges do not form a valid extent.
	pub fn apply(&self, base: &GeoExtent) -> Result<GeoExtent> {
		GeoExtent::new(
			self.min_x.unwrap_or(base.min_x),
			self.min_y.unwrap_or(base.min_y),
			self.max_x.unwrap_or(base.max_x),
			self.max_y.unwrap_or(base.max_y),
		)
	}
}

impl From<GeoExtent> for ExtentOverride {
	fn from(extent: GeoExtent) -> ExtentOverride {
		ExtentOverride {
			min_x: Some(extent.min_x),
			min_y: Some(extent.min_y),
			max_x: Some(extent.max_x),
			max_y: Some(extent.max_y),
		}
	}
}

/// Read access to an opened raster dataset.
#[async_trait]
pub trait RasterSource: Send + Sync {
	/// Raster width in pixels.
	fn width(&self) -> u32;

	/// Raster height in pixels.
	fn height(&self) -> u32;

	/// The band layout pixels are returned in.
	fn band_layout(&self) -> BandLayout;

	/// The affine georeferencing of the raster.
	fn geo_transform(&self) -> GeoTransform;

	/// Read a pixel window, assembling it from stored tiles.
	///
	/// Pixels without a backing tile read as zero (transparent black for
	/// layouts with alpha).
	async fn read_window(&self, window: &PixelWindow) -> Result<DynamicImage>;

	/// Read the full raster.
	async fn read_full(&self) -> Result<DynamicImage> {
		self.read_window(&PixelWindow::full(self.width(), self.height())?).await
	}

	/// Positional checksum of one band, for quick comparisons.
	async fn band_checksum(&self, band: u8) -> Result<u16> {
		let image = self.read_full().await?;
		Ok(geopack_core::checksum::band_checksum(geopack_image::pixel::band_samples(
			&image, band,
		)?))
	}
}

/// One tile pyramid table of a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subdataset {
	pub table_name: String,
	pub identifier: String,
	pub description: String,
}

/// List the tile pyramid tables of a container.
///
/// # Errors
/// Returns an error if the file does not exist or is not a GeoPackage.
pub fn list_subdatasets(path: &Path) -> Result<Vec<Subdataset>> {
	ensure!(path.exists(), "file {path:?} does not exist");

	let catalog = Catalog::new(Catalog::open_pool(path)?);
	catalog.check_application_id()?;
	ensure!(catalog.has_schema()?, "file {path:?} has no catalog tables");

	Ok(catalog
		.list_tile_contents()?
		.into_iter()
		.map(|contents| Subdataset {
			table_name: contents.table_name,
			identifier: contents.identifier,
			description: contents.description,
		})
		.collect())
}
