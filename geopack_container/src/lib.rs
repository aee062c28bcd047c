//! Raster storage in GeoPackage (SQLite) containers.
//!
//! A GeoPackage holds one or more tile pyramid tables plus a small set of
//! catalog tables describing them. This crate provides:
//!
//! - [`catalog`]: the catalog tables (`gpkg_contents`,
//!   `gpkg_tile_matrix_set`, `gpkg_tile_matrix`, `gpkg_spatial_ref_sys`,
//!   `gpkg_extensions`) and the tile pyramid tables themselves,
//! - [`grid`]: the mapping between dataset pixels and tile positions,
//! - [`dataset`]: [`RasterWriter`] and [`RasterReader`], which present a
//!   tile table as a single addressable raster.
//!
//! ## Usage
//! ```rust,no_run
//! use anyhow::Result;
//! use geopack_container::{CreateOptions, OpenOptions, RasterReader, RasterSource, RasterWriter};
//! use geopack_core::{GeoTransform, PixelWindow};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let path = Path::new("/absolute/path/to/data.gpkg");
//!
//!     let image = image::DynamicImage::new_rgba8(400, 200);
//!     let mut writer = RasterWriter::create(path, 400, 200, CreateOptions::default())?;
//!     writer.set_geo_transform(GeoTransform::new(-180.0, 90.0, 0.9, -0.9)?)?;
//!     writer.write_image(&image)?;
//!
//!     let reader = RasterReader::open_with(path, OpenOptions::default())?;
//!     let _pixels = reader.read_window(&PixelWindow::new(0, 0, 256, 128)?).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod dataset;
pub mod grid;

pub use dataset::{
	CreateOptions, ExtentOverride, OpenOptions, RasterReader, RasterSource, RasterWriter, Subdataset,
	list_subdatasets,
};
