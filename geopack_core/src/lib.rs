//! Shared types for the geopack raster engine: tile coordinates, tile
//! matrices, geotransforms, extents, color tables and checksums.

pub mod checksum;

pub mod types;

pub use types::*;
