//! Create tile pyramid tables and fill them from pixel data.

use super::CreateOptions;
use crate::catalog::{Catalog, ContentsRecord, ExtensionRecord, TileMatrixSetRecord, now_rfc3339};
use crate::grid::TileGrid;
use anyhow::{Context, Result, bail, ensure};
use geopack_core::{
	Blob, ColorTable, GeoTransform, PixelWindow, TileFormat, TileMatrix, derive_tile_matrix_pyramid,
};
use geopack_image::format;
use geopack_image::pixel::{self, AlphaState};
use image::DynamicImage;
use image::imageops::FilterType;
use std::path::Path;

/// Largest accepted tile edge length.
const MAX_TILE_SIZE: u32 = 4096;

/// Writer for one new tile pyramid table.
///
/// Usage is two-phase: create the writer, set the georeferencing, then
/// write the pixel data. Catalog rows are only written once the
/// georeferencing is known, so a writer that is dropped before
/// [`write_image`](RasterWriter::write_image) leaves no partial pyramid
/// behind (the catalog schema itself may already exist).
pub struct RasterWriter {
	catalog: Catalog,
	options: CreateOptions,
	width: u32,
	height: u32,
	geo_transform: Option<GeoTransform>,
	srs_override: Option<i32>,
	color_table: Option<ColorTable>,
	pyramid: Vec<TileMatrix>,
	/// Base-level pixels, kept for overview building.
	base_image: Option<DynamicImage>,
}

impl RasterWriter {
	/// Create a writer for a new tile pyramid table.
	///
	/// A missing file is created and seeded with the catalog schema; an
	/// existing GeoPackage gains an additional table. The pyramid itself
	/// is written by [`write_image`](RasterWriter::write_image).
	///
	/// # Errors
	/// Returns an error for invalid options, for non-GeoPackage files, or
	/// when the table already exists in the container.
	pub fn create(path: &Path, width: u32, height: u32, options: CreateOptions) -> Result<RasterWriter> {
		log::debug!("create '{}' ({width}x{height}) in {path:?}", options.table_name);

		ensure!(width > 0 && height > 0, "raster size must not be zero");
		ensure!(
			(1..=MAX_TILE_SIZE).contains(&options.tile_width) && (1..=MAX_TILE_SIZE).contains(&options.tile_height),
			"tile size must be between 1 and {MAX_TILE_SIZE}"
		);
		if let Some(quality) = options.quality {
			ensure!(quality <= 100, "quality must be between 0 and 100");
		}

		let existed = path.exists();
		let catalog = Catalog::new(Catalog::open_pool(path)?);

		if catalog.has_schema()? {
			catalog.check_application_id()?;
			ensure!(
				catalog.get_contents(&options.table_name)?.is_none(),
				"table '{}' already exists in {path:?}",
				options.table_name
			);
		} else {
			// A pre-existing file without catalog tables is not ours to claim.
			ensure!(
				!existed || std::fs::metadata(path)?.len() == 0,
				"file {path:?} exists and is not a GeoPackage"
			);
			catalog.initialize()?;
		}

		Ok(RasterWriter {
			catalog,
			options,
			width,
			height,
			geo_transform: None,
			srs_override: None,
			color_table: None,
			pyramid: Vec::new(),
			base_image: None,
		})
	}

	/// Set the affine georeferencing of the raster.
	///
	/// # Errors
	/// Returns an error if a geotransform was already set or the transform
	/// is not north-up.
	pub fn set_geo_transform(&mut self, geo_transform: GeoTransform) -> Result<()> {
		ensure!(self.geo_transform.is_none(), "geotransform already set");
		ensure!(
			geo_transform.pixel_size_y < 0.0,
			"tile pyramids require a north-up geotransform"
		);
		self.geo_transform = Some(geo_transform);
		Ok(())
	}

	/// Set the SRS id of the raster, overriding the creation option.
	///
	/// # Errors
	/// Returns an error if a projection was already set or the id has no
	/// record in `gpkg_spatial_ref_sys`.
	pub fn set_projection(&mut self, srs_id: i32) -> Result<()> {
		ensure!(self.srs_override.is_none(), "projection already set");
		ensure!(
			self.catalog.get_srs(srs_id)?.is_some(),
			"srs_id {srs_id} has no record in gpkg_spatial_ref_sys"
		);
		self.srs_override = Some(srs_id);
		Ok(())
	}

	/// Set a color table for expanding single-band indexed pixels.
	///
	/// # Errors
	/// Returns an error if a color table was already set or the table is
	/// empty.
	pub fn set_color_table(&mut self, table: ColorTable) -> Result<()> {
		ensure!(self.color_table.is_none(), "color table already set");
		ensure!(!table.is_empty(), "color table must not be empty");
		self.color_table = Some(table);
		Ok(())
	}

	/// Write the full raster at the base zoom level.
	///
	/// Derives the tile matrix pyramid, writes all catalog rows (including
	/// the still-empty overview levels) and stores the base tiles. Fully
	/// transparent tiles are skipped; fully opaque tiles drop their alpha
	/// band before encoding.
	///
	/// # Errors
	/// Returns an error when called twice, without a geotransform, or with
	/// an image that does not match the raster size.
	pub fn write_image(&mut self, image: &DynamicImage) -> Result<()> {
		ensure!(self.base_image.is_none(), "raster already written");
		let Some(geo_transform) = self.geo_transform else {
			bail!("writing pixel data requires a geotransform");
		};
		ensure!(
			image.width() == self.width && image.height() == self.height,
			"image size {}x{} does not match raster size {}x{}",
			image.width(),
			image.height(),
			self.width,
			self.height
		);

		let image = self.prepare(image)?;

		self.pyramid = derive_tile_matrix_pyramid(
			self.width,
			self.height,
			self.options.tile_width,
			self.options.tile_height,
			geo_transform.pixel_size_x,
			-geo_transform.pixel_size_y,
		)?;
		let base_zoom = self.pyramid.last().map_or(0, |m| m.zoom);

		self.write_catalog_rows(&geo_transform)?;
		self.write_level(base_zoom, &image)?;
		self.base_image = Some(image);

		Ok(())
	}

	/// Fill the overview levels by downsampling the base image.
	///
	/// # Errors
	/// Returns an error when no base raster has been written yet.
	pub fn build_overviews(&mut self) -> Result<()> {
		let Some(base) = self.base_image.clone() else {
			bail!("building overviews requires a written raster");
		};

		let base_zoom = self.pyramid.last().map_or(0, |m| m.zoom);
		let mut current = base;
		for zoom in (0..base_zoom).rev() {
			let scale = 1u32 << (base_zoom - zoom);
			let level_width = self.width.div_ceil(scale);
			let level_height = self.height.div_ceil(scale);
			current = current.resize_exact(level_width, level_height, FilterType::Triangle);
			self.write_level(zoom, &current)?;
		}

		Ok(())
	}

	/// Expand a color table and convert to the format's working layout.
	fn prepare(&self, image: &DynamicImage) -> Result<DynamicImage> {
		let image = if let Some(table) = &self.color_table {
			pixel::expand_color_table(image, table).context("expanding color table")?
		} else {
			image.clone()
		};

		let layout = pixel::layout_of(&image)?;
		let working = match self.options.format {
			// JPEG cannot carry alpha; grey stays grey.
			TileFormat::Jpeg => layout.without_alpha(),
			// WEBP has no grey mode.
			TileFormat::Webp => {
				if layout.has_alpha() {
					geopack_core::BandLayout::Rgba
				} else {
					geopack_core::BandLayout::Rgb
				}
			}
			TileFormat::Png => layout,
		};
		Ok(pixel::to_layout(&image, working))
	}

	fn write_catalog_rows(&self, geo_transform: &GeoTransform) -> Result<()> {
		let extent = geo_transform.extent_of(self.width, self.height)?;
		let srs_id = self.srs_override.unwrap_or(self.options.srs_id);
		let table_name = &self.options.table_name;

		self.catalog.put_contents(&ContentsRecord {
			table_name: table_name.clone(),
			data_type: "tiles".to_string(),
			identifier: self.options.identifier.clone().unwrap_or_else(|| table_name.clone()),
			description: self.options.description.clone(),
			last_change: now_rfc3339()?,
			extent,
			srs_id,
		})?;

		self.catalog.put_tile_matrix_set(&TileMatrixSetRecord {
			table_name: table_name.clone(),
			srs_id,
			extent,
		})?;

		for matrix in &self.pyramid {
			self.catalog.put_tile_matrix(table_name, matrix)?;
		}

		self.catalog.create_tile_table(table_name)?;

		if self.options.format == TileFormat::Webp {
			self.catalog.put_extension(&ExtensionRecord::webp(table_name))?;
		}

		Ok(())
	}

	/// Tile one zoom level of pixel data and store it in a single
	/// transaction.
	fn write_level(&self, zoom: u8, image: &DynamicImage) -> Result<()> {
		let matrix = self
			.pyramid
			.iter()
			.find(|m| m.zoom == zoom)
			.with_context(|| format!("zoom level {zoom} is not part of the pyramid"))?;

		let grid = TileGrid::new(
			zoom,
			matrix.matrix_width,
			matrix.matrix_height,
			matrix.tile_width,
			matrix.tile_height,
			0,
			0,
			image.width(),
			image.height(),
		)?;

		let layout = pixel::layout_of(image)?;
		let mut tiles: Vec<(geopack_core::TileCoord, Blob)> = Vec::new();

		for slice in grid.slices(&PixelWindow::full(image.width(), image.height())?)? {
			let piece = pixel::crop(image, &slice.raster_area)?;

			let full_tile = slice.tile_area.width == matrix.tile_width && slice.tile_area.height == matrix.tile_height;
			let tile_image = if full_tile {
				piece
			} else if self.options.format == TileFormat::Jpeg {
				// JPEG tiles are padded with zero pixels.
				let mut canvas = pixel::blank(layout, matrix.tile_width, matrix.tile_height);
				pixel::paste(&mut canvas, &piece, i64::from(slice.tile_area.x), i64::from(slice.tile_area.y));
				canvas
			} else {
				// Lossless formats pad with transparency, gaining an alpha
				// band if the data has none.
				let padded_layout = layout.with_alpha();
				let mut canvas = pixel::blank(padded_layout, matrix.tile_width, matrix.tile_height);
				pixel::paste(
					&mut canvas,
					&pixel::to_layout(&piece, padded_layout),
					i64::from(slice.tile_area.x),
					i64::from(slice.tile_area.y),
				);
				canvas
			};

			let tile_image = match pixel::alpha_state(&tile_image) {
				AlphaState::Transparent => continue,
				AlphaState::Opaque => {
					let tile_layout = pixel::layout_of(&tile_image)?;
					pixel::to_layout(&tile_image, tile_layout.without_alpha())
				}
				AlphaState::NoAlpha | AlphaState::Mixed => tile_image,
			};

			let blob = format::encode(&tile_image, self.options.format, self.options.quality)?;
			tiles.push((slice.coord, blob));
		}

		log::debug!(
			"storing {} tiles at zoom {zoom} into '{}'",
			tiles.len(),
			self.options.table_name
		);
		self.catalog.put_tiles(&self.options.table_name, &tiles)
	}
}

impl std::fmt::Debug for RasterWriter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RasterWriter")
			.field("table_name", &self.options.table_name)
			.field("size", &format!("{}x{}", self.width, self.height))
			.field("format", &self.options.format)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::TempDir;
	use geopack_core::BandLayout;
	use geopack_image::testing::{flat_image, test_image};

	fn temp_path(dir: &TempDir) -> std::path::PathBuf {
		dir.path().join("test.gpkg")
	}

	#[test]
	fn requires_geotransform_before_pixels() {
		let dir = TempDir::new().unwrap();
		let mut writer = RasterWriter::create(&temp_path(&dir), 64, 64, CreateOptions::default()).unwrap();
		let image = test_image(BandLayout::Rgba, 64, 64);

		assert_eq!(
			writer.write_image(&image).unwrap_err().to_string(),
			"writing pixel data requires a geotransform"
		);

		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&image).unwrap();
	}

	#[test]
	fn geotransform_can_only_be_set_once() {
		let dir = TempDir::new().unwrap();
		let mut writer = RasterWriter::create(&temp_path(&dir), 64, 64, CreateOptions::default()).unwrap();
		let gt = GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap();

		writer.set_geo_transform(gt).unwrap();
		assert_eq!(
			writer.set_geo_transform(gt).unwrap_err().to_string(),
			"geotransform already set"
		);
	}

	#[test]
	fn projection_can_only_be_set_once() {
		let dir = TempDir::new().unwrap();
		let mut writer = RasterWriter::create(&temp_path(&dir), 64, 64, CreateOptions::default()).unwrap();

		writer.set_projection(4326).unwrap();
		assert_eq!(
			writer.set_projection(4326).unwrap_err().to_string(),
			"projection already set"
		);
	}

	#[test]
	fn unknown_srs_is_rejected() {
		let dir = TempDir::new().unwrap();
		let mut writer = RasterWriter::create(&temp_path(&dir), 64, 64, CreateOptions::default()).unwrap();
		assert!(writer.set_projection(3857).is_err());
	}

	#[test]
	fn rejects_duplicate_table() {
		let dir = TempDir::new().unwrap();
		let path = temp_path(&dir);

		let mut writer = RasterWriter::create(&path, 64, 64, CreateOptions::default()).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&test_image(BandLayout::Rgb, 64, 64)).unwrap();

		assert!(RasterWriter::create(&path, 32, 32, CreateOptions::default()).is_err());

		// A second table with a different name is fine.
		let second = CreateOptions {
			table_name: "other".to_string(),
			..CreateOptions::default()
		};
		RasterWriter::create(&path, 32, 32, second).unwrap();
	}

	#[test]
	fn rejects_oversized_tiles() {
		let dir = TempDir::new().unwrap();
		let options = CreateOptions {
			tile_width: 5000,
			..CreateOptions::default()
		};
		assert!(RasterWriter::create(&temp_path(&dir), 64, 64, options).is_err());
	}

	#[test]
	fn transparent_tiles_are_skipped() {
		let dir = TempDir::new().unwrap();
		let path = temp_path(&dir);

		// 2x1 tiles of 32px; the right half is fully transparent.
		let mut image = flat_image(BandLayout::Rgba, 64, 32, 0, 0);
		let opaque = flat_image(BandLayout::Rgba, 32, 32, 120, 255);
		pixel::paste(&mut image, &opaque, 0, 0);

		let options = CreateOptions {
			tile_width: 32,
			tile_height: 32,
			..CreateOptions::default()
		};
		let mut writer = RasterWriter::create(&path, 64, 32, options).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&image).unwrap();

		let catalog = Catalog::new(Catalog::open_pool(&path).unwrap());
		assert_eq!(catalog.count_tiles("tiles", 1).unwrap(), 1);
	}

	#[test]
	fn opaque_rgba_is_stored_without_alpha() {
		let dir = TempDir::new().unwrap();
		let path = temp_path(&dir);

		let image = flat_image(BandLayout::Rgba, 32, 32, 99, 255);
		let options = CreateOptions {
			tile_width: 32,
			tile_height: 32,
			..CreateOptions::default()
		};
		let mut writer = RasterWriter::create(&path, 32, 32, options).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&image).unwrap();

		let catalog = Catalog::new(Catalog::open_pool(&path).unwrap());
		let blob = catalog
			.get_tile("tiles", &geopack_core::TileCoord::new(0, 0, 0))
			.unwrap()
			.unwrap();
		let decoded = format::decode(&blob).unwrap();
		assert_eq!(pixel::layout_of(&decoded).unwrap(), BandLayout::Rgb);
	}

	#[test]
	fn partial_png_tile_gains_alpha() {
		let dir = TempDir::new().unwrap();
		let path = temp_path(&dir);

		// 40px raster in 32px tiles: the second column is a partial tile.
		let image = flat_image(BandLayout::Rgb, 40, 32, 50, 255);
		let options = CreateOptions {
			tile_width: 32,
			tile_height: 32,
			..CreateOptions::default()
		};
		let mut writer = RasterWriter::create(&path, 40, 32, options).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&image).unwrap();

		let catalog = Catalog::new(Catalog::open_pool(&path).unwrap());
		let partial = catalog
			.get_tile("tiles", &geopack_core::TileCoord::new(1, 1, 0))
			.unwrap()
			.unwrap();
		let decoded = format::decode(&partial).unwrap();
		assert!(pixel::layout_of(&decoded).unwrap().has_alpha());

		// Padding must be transparent, data opaque.
		let rgba = decoded.to_rgba8();
		assert_eq!(rgba.get_pixel(0, 0).0, [50, 50, 50, 255]);
		assert_eq!(rgba.get_pixel(8, 0).0[3], 0);
	}

	#[test]
	fn jpeg_partial_tile_is_zero_padded() {
		let dir = TempDir::new().unwrap();
		let path = temp_path(&dir);

		let image = flat_image(BandLayout::Rgb, 40, 32, 200, 255);
		let options = CreateOptions {
			format: TileFormat::Jpeg,
			quality: Some(95),
			tile_width: 32,
			tile_height: 32,
			..CreateOptions::default()
		};
		let mut writer = RasterWriter::create(&path, 40, 32, options).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&image).unwrap();

		let catalog = Catalog::new(Catalog::open_pool(&path).unwrap());
		let partial = catalog
			.get_tile("tiles", &geopack_core::TileCoord::new(1, 1, 0))
			.unwrap()
			.unwrap();
		let decoded = format::decode(&partial).unwrap();
		assert!(!pixel::layout_of(&decoded).unwrap().has_alpha());

		let rgb = decoded.to_rgb8();
		assert!(rgb.get_pixel(0, 0).0[0] > 150);
		assert!(rgb.get_pixel(20, 0).0[0] < 50);
	}

	#[test]
	fn webp_registers_extension() {
		let dir = TempDir::new().unwrap();
		let path = temp_path(&dir);

		let options = CreateOptions {
			format: TileFormat::Webp,
			tile_width: 32,
			tile_height: 32,
			..CreateOptions::default()
		};
		let mut writer = RasterWriter::create(&path, 32, 32, options).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&test_image(BandLayout::Rgb, 32, 32)).unwrap();

		let catalog = Catalog::new(Catalog::open_pool(&path).unwrap());
		let extensions = catalog.get_extensions("tiles").unwrap();
		assert!(extensions.iter().any(|e| e.extension_name == "gpkg_webp"));
	}

	#[test]
	fn overview_rows_precede_overview_tiles() {
		let dir = TempDir::new().unwrap();
		let path = temp_path(&dir);

		let image = test_image(BandLayout::Rgb, 400, 200);
		let mut writer = RasterWriter::create(&path, 400, 200, CreateOptions::default()).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(-180.0, 90.0, 0.9, -0.9).unwrap())
			.unwrap();
		writer.write_image(&image).unwrap();

		let catalog = Catalog::new(Catalog::open_pool(&path).unwrap());
		let matrices = catalog.get_tile_matrices("tiles").unwrap();
		assert_eq!(matrices.len(), 2);
		assert_eq!(catalog.count_tiles("tiles", 0).unwrap(), 0);
		assert_eq!(catalog.count_tiles("tiles", 1).unwrap(), 2);

		writer.build_overviews().unwrap();
		assert_eq!(catalog.count_tiles("tiles", 0).unwrap(), 1);
	}

	#[test]
	fn overviews_require_pixels() {
		let dir = TempDir::new().unwrap();
		let mut writer = RasterWriter::create(&temp_path(&dir), 64, 64, CreateOptions::default()).unwrap();
		assert!(writer.build_overviews().is_err());
	}
}
