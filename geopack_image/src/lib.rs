//! Tile codecs and pixel buffer helpers.
//!
//! Tiles travel as [`geopack_core::Blob`]s and are decoded into
//! [`image::DynamicImage`]s with one of four 8-bit layouts (grey,
//! grey+alpha, RGB, RGBA). The [`format`] module bridges blobs and images,
//! the [`pixel`] module manipulates decoded images (layout conversion,
//! alpha inspection, pasting, palette expansion).

pub mod format;
pub mod pixel;
pub mod testing;
