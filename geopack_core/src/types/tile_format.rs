//! The encoded image format of stored tiles.

use crate::Blob;
use anyhow::{Result, bail};
use std::fmt::Display;
use std::str::FromStr;

/// Image codec used for the `tile_data` blobs of a tile pyramid table.
///
/// GPKG tile blobs carry no format column; the format is identified per
/// blob from its magic bytes (see [`TileFormat::sniff`]), with PNG and JPEG
/// always allowed and WEBP gated behind the `gpkg_webp` extension.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TileFormat {
	Png,
	Jpeg,
	Webp,
}

impl TileFormat {
	/// Canonical lowercase name, e.g. `"png"`.
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			TileFormat::Png => "png",
			TileFormat::Jpeg => "jpeg",
			TileFormat::Webp => "webp",
		}
	}

	/// MIME type of the encoded tiles.
	#[must_use]
	pub fn as_mime(&self) -> &str {
		match self {
			TileFormat::Png => "image/png",
			TileFormat::Jpeg => "image/jpeg",
			TileFormat::Webp => "image/webp",
		}
	}

	/// Identify the format of an encoded tile from its magic bytes.
	///
	/// Returns `None` for payloads that are not PNG, JPEG or WEBP.
	#[must_use]
	pub fn sniff(blob: &Blob) -> Option<TileFormat> {
		let bytes = blob.as_slice();
		if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
			Some(TileFormat::Png)
		} else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
			Some(TileFormat::Jpeg)
		} else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
			Some(TileFormat::Webp)
		} else {
			None
		}
	}

	/// Returns `true` if the format performs lossy compression by default.
	#[must_use]
	pub fn is_lossy(&self) -> bool {
		matches!(self, TileFormat::Jpeg | TileFormat::Webp)
	}
}

impl Display for TileFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TileFormat {
	type Err = anyhow::Error;

	fn from_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().as_str() {
			"png" => TileFormat::Png,
			"jpg" | "jpeg" => TileFormat::Jpeg,
			"webp" => TileFormat::Webp,
			_ => bail!("unknown tile format '{value}'"),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("png", TileFormat::Png)]
	#[case("PNG", TileFormat::Png)]
	#[case("jpg", TileFormat::Jpeg)]
	#[case("jpeg", TileFormat::Jpeg)]
	#[case("webp", TileFormat::Webp)]
	fn parse(#[case] input: &str, #[case] expected: TileFormat) {
		assert_eq!(TileFormat::from_str(input).unwrap(), expected);
	}

	#[test]
	fn parse_unknown() {
		assert!(TileFormat::from_str("gif").is_err());
	}

	#[test]
	fn sniff() {
		assert_eq!(
			TileFormat::sniff(&Blob::from(b"\x89PNG\r\n\x1a\n____")),
			Some(TileFormat::Png)
		);
		assert_eq!(
			TileFormat::sniff(&Blob::from(&[0xFF, 0xD8, 0xFF, 0xE0])),
			Some(TileFormat::Jpeg)
		);
		assert_eq!(
			TileFormat::sniff(&Blob::from(b"RIFF\x00\x00\x00\x00WEBPVP8 ")),
			Some(TileFormat::Webp)
		);
		assert_eq!(TileFormat::sniff(&Blob::from(b"GIF89a")), None);
		assert_eq!(TileFormat::sniff(&Blob::new_empty()), None);
	}

	#[test]
	fn display_and_mime() {
		assert_eq!(TileFormat::Jpeg.to_string(), "jpeg");
		assert_eq!(TileFormat::Webp.as_mime(), "image/webp");
		assert!(!TileFormat::Png.is_lossy());
		assert!(TileFormat::Jpeg.is_lossy());
	}
}
