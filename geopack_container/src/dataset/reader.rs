//! Open tile pyramid tables and assemble pixel windows from stored tiles.

use super::{OpenOptions, RasterSource};
use crate::catalog::Catalog;
use crate::grid::TileGrid;
use anyhow::{Context, Result, bail, ensure};
use async_trait::async_trait;
use geopack_core::{BandLayout, Blob, GeoExtent, GeoTransform, PixelWindow, TileCoord, TileFormat, TileMatrix};
use geopack_image::{format, pixel};
use image::DynamicImage;
use std::path::Path;

/// Extension names this reader understands; anything else is reported but
/// does not block opening.
const KNOWN_EXTENSIONS: [&str; 1] = ["gpkg_webp"];

/// Reader for one tile pyramid table, presented as a single raster.
///
/// The raster area defaults to the declared contents extent; open options
/// can widen or narrow it ([`OpenOptions::extent`]) or derive it from the
/// tiles actually stored ([`OpenOptions::use_tile_extent`]). Pixels
/// without a backing tile read as zero.
pub struct RasterReader {
	catalog: Catalog,
	table_name: String,
	identifier: String,
	description: String,
	layout: BandLayout,
	zoom: u8,
	grid: TileGrid,
	geo_transform: GeoTransform,
	srs_id: i32,
}

impl RasterReader {
	/// Open the only tile pyramid table of a container with defaults.
	///
	/// # Errors
	/// Returns an error if the file is not a GeoPackage, holds no tile
	/// pyramids, or holds more than one.
	pub fn open(path: &Path) -> Result<RasterReader> {
		RasterReader::open_with(path, OpenOptions::default())
	}

	/// Open a tile pyramid table.
	///
	/// # Errors
	/// Returns an error if the file or table cannot be resolved, the
	/// requested zoom level does not exist, or the catalog rows are
	/// inconsistent.
	pub fn open_with(path: &Path, options: OpenOptions) -> Result<RasterReader> {
		log::debug!("open {path:?} with {options:?}");

		ensure!(path.exists(), "file {path:?} does not exist");

		let catalog = Catalog::new(Catalog::open_pool(path)?);
		catalog.check_application_id()?;
		ensure!(catalog.has_schema()?, "file {path:?} has no catalog tables");

		let contents = {
			let mut tables = catalog.list_tile_contents()?;
			match &options.table_name {
				Some(name) => tables
					.into_iter()
					.find(|c| &c.table_name == name)
					.with_context(|| format!("container has no tile table '{name}'"))?,
				None => {
					if tables.is_empty() {
						bail!("container holds no tile pyramids");
					}
					ensure!(
						tables.len() == 1,
						"container holds {} tile tables ({}), specify one",
						tables.len(),
						tables.iter().map(|c| c.table_name.as_str()).collect::<Vec<_>>().join(", ")
					);
					tables.remove(0)
				}
			}
		};
		let table_name = contents.table_name.clone();

		let matrix_set = catalog
			.get_tile_matrix_set(&table_name)?
			.with_context(|| format!("table '{table_name}' has no gpkg_tile_matrix_set row"))?;
		let matrices = catalog.get_tile_matrices(&table_name)?;
		ensure!(!matrices.is_empty(), "table '{table_name}' has no gpkg_tile_matrix rows");

		for extension in catalog.get_extensions(&table_name)? {
			if !KNOWN_EXTENSIONS.contains(&extension.extension_name.as_str()) {
				log::warn!(
					"table '{table_name}' uses unknown extension '{}'",
					extension.extension_name
				);
			}
		}

		let base = *matrices
			.last()
			.with_context(|| format!("table '{table_name}' has no gpkg_tile_matrix rows"))?;
		let matrix = match options.zoom_level {
			None => base,
			// Requests beyond the base level clamp to the base level.
			Some(zoom) if zoom >= base.zoom => base,
			Some(zoom) => *matrices
				.iter()
				.find(|m| m.zoom == zoom)
				.with_context(|| format!("table '{table_name}' has no zoom level {zoom}"))?,
		};

		let extent = RasterReader::resolve_extent(&catalog, &table_name, &contents.extent, &matrix_set.extent, &matrix, &options)?;

		let width = (extent.width() / matrix.pixel_size_x).round() as u32;
		let height = (extent.height() / matrix.pixel_size_y).round() as u32;
		ensure!(width > 0 && height > 0, "resolved raster area is empty");

		let offset_x = ((extent.min_x - matrix_set.extent.min_x) / matrix.pixel_size_x).round() as i64;
		let offset_y = ((matrix_set.extent.max_y - extent.max_y) / matrix.pixel_size_y).round() as i64;

		Ok(RasterReader {
			grid: TileGrid::new(
				matrix.zoom,
				matrix.matrix_width,
				matrix.matrix_height,
				matrix.tile_width,
				matrix.tile_height,
				offset_x,
				offset_y,
				width,
				height,
			)?,
			geo_transform: GeoTransform::new(extent.min_x, extent.max_y, matrix.pixel_size_x, -matrix.pixel_size_y)?,
			layout: options.band_layout.unwrap_or(BandLayout::Rgba),
			zoom: matrix.zoom,
			srs_id: contents.srs_id,
			identifier: contents.identifier,
			description: contents.description,
			table_name,
			catalog,
		})
	}

	/// Determine the raster area in geographic coordinates.
	fn resolve_extent(
		catalog: &Catalog,
		table_name: &str,
		contents_extent: &GeoExtent,
		grid_extent: &GeoExtent,
		matrix: &TileMatrix,
		options: &OpenOptions,
	) -> Result<GeoExtent> {
		if options.use_tile_extent {
			let range = catalog
				.get_tile_range(table_name, matrix.zoom)?
				.with_context(|| format!("table '{table_name}' holds no tiles at zoom {}", matrix.zoom))?;

			let tile_span_x = f64::from(matrix.tile_width) * matrix.pixel_size_x;
			let tile_span_y = f64::from(matrix.tile_height) * matrix.pixel_size_y;
			return GeoExtent::new(
				grid_extent.min_x + f64::from(range.col_min) * tile_span_x,
				grid_extent.max_y - f64::from(range.row_max + 1) * tile_span_y,
				grid_extent.min_x + f64::from(range.col_max + 1) * tile_span_x,
				grid_extent.max_y - f64::from(range.row_min) * tile_span_y,
			);
		}

		let extent = options.extent.apply(contents_extent)?;

		// Snap outward to the pixel grid of the opened zoom level.
		let snap_out = |value: f64, origin: f64, step: f64, up: bool| {
			let steps = (value - origin) / step;
			let snapped = if up { steps.ceil() } else { steps.floor() };
			origin + snapped * step
		};
		// The y axis runs against its snapping origin (the top edge), so
		// "outward" flips: the lower edge rounds up in steps, the upper
		// edge rounds down.
		GeoExtent::new(
			snap_out(extent.min_x, grid_extent.min_x, matrix.pixel_size_x, false),
			snap_out(extent.min_y, grid_extent.max_y, -matrix.pixel_size_y, true),
			snap_out(extent.max_x, grid_extent.min_x, matrix.pixel_size_x, true),
			snap_out(extent.max_y, grid_extent.max_y, -matrix.pixel_size_y, false),
		)
	}

	#[must_use]
	pub fn table_name(&self) -> &str {
		&self.table_name
	}

	#[must_use]
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	#[must_use]
	pub fn description(&self) -> &str {
		&self.description
	}

	/// Codec of the stored tiles, sniffed from one stored blob.
	///
	/// Returns `Ok(None)` when the opened zoom level holds no tiles.
	///
	/// # Errors
	/// Returns an error if the query fails or the blob matches no known
	/// codec.
	pub fn tile_format(&self) -> Result<Option<TileFormat>> {
		match self.catalog.sample_tile(&self.table_name, self.zoom)? {
			Some(blob) => Ok(Some(TileFormat::sniff(&blob).with_context(|| {
				format!("tile data in '{}' matches no known codec", self.table_name)
			})?)),
			None => Ok(None),
		}
	}

	/// The zoom level this reader is pinned to.
	#[must_use]
	pub fn zoom(&self) -> u8 {
		self.zoom
	}

	#[must_use]
	pub fn srs_id(&self) -> i32 {
		self.srs_id
	}

	/// Fetch one raw tile blob; `Ok(None)` when the tile is not stored.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn get_tile(&self, coord: &TileCoord) -> Result<Option<Blob>> {
		self.catalog.get_tile(&self.table_name, coord)
	}
}

#[async_trait]
impl RasterSource for RasterReader {
	fn width(&self) -> u32 {
		self.grid.raster_size().0
	}

	fn height(&self) -> u32 {
		self.grid.raster_size().1
	}

	fn band_layout(&self) -> BandLayout {
		self.layout
	}

	fn geo_transform(&self) -> GeoTransform {
		self.geo_transform
	}

	async fn read_window(&self, window: &PixelWindow) -> Result<DynamicImage> {
		log::trace!("read {window:?} from '{}'", self.table_name);

		let mut target = pixel::blank(self.layout, window.width, window.height);

		for slice in self.grid.slices(window)? {
			let Some(blob) = self.catalog.get_tile(&self.table_name, &slice.coord)? else {
				continue;
			};

			let tile = format::decode(&blob).with_context(|| format!("tile {:?} of '{}'", slice.coord, self.table_name))?;

			let (tile_width, tile_height) = self.grid.tile_size();
			ensure!(
				tile.width() == tile_width && tile.height() == tile_height,
				"tile {:?} of '{}' decodes to {}x{} instead of {tile_width}x{tile_height}",
				slice.coord,
				self.table_name,
				tile.width(),
				tile.height()
			);

			let tile = pixel::to_layout(&tile, self.layout);
			let piece = pixel::crop(&tile, &slice.tile_area)?;

			pixel::paste(
				&mut target,
				&piece,
				i64::from(slice.raster_area.x) - i64::from(window.x),
				i64::from(slice.raster_area.y) - i64::from(window.y),
			);
		}

		Ok(target)
	}
}

impl std::fmt::Debug for RasterReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RasterReader")
			.field("table_name", &self.table_name)
			.field("zoom", &self.zoom)
			.field("size", &format!("{}x{}", self.width(), self.height()))
			.field("layout", &self.layout)
			.finish()
	}
}
