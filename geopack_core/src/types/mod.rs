//! Core data types of the geopack engine.

mod band_layout;
mod blob;
mod color_table;
mod geo_extent;
mod geo_transform;
mod pixel_window;
mod tile_coord;
mod tile_format;
mod tile_matrix;
mod tile_range;

pub use band_layout::BandLayout;
pub use blob::Blob;
pub use color_table::{ColorEntry, ColorTable};
pub use geo_extent::GeoExtent;
pub use geo_transform::GeoTransform;
pub use pixel_window::PixelWindow;
pub use tile_coord::TileCoord;
pub use tile_format::TileFormat;
pub use tile_matrix::{TileMatrix, derive_tile_matrix_pyramid};
pub use tile_range::TileRange;
