//! Band layouts a dataset can expose.

use anyhow::{Result, bail};
use std::fmt::Display;

/// Number and meaning of the bands exposed by an opened dataset.
///
/// Tiles are always decoded into one of these four layouts; which one an
/// opened dataset uses is a property of the open call, not of the stored
/// blobs. The default is [`BandLayout::Rgba`], which every tile format can
/// be expanded into without loss.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BandLayout {
	/// One grey band.
	Grey,
	/// Grey plus alpha.
	GreyAlpha,
	/// Red, green, blue.
	Rgb,
	/// Red, green, blue, alpha.
	Rgba,
}

impl BandLayout {
	/// Number of bands in this layout.
	#[must_use]
	pub fn band_count(&self) -> u8 {
		match self {
			BandLayout::Grey => 1,
			BandLayout::GreyAlpha => 2,
			BandLayout::Rgb => 3,
			BandLayout::Rgba => 4,
		}
	}

	/// The layout with the given band count.
	///
	/// # Errors
	/// Returns an error unless `count` is 1, 2, 3 or 4.
	pub fn from_band_count(count: u8) -> Result<BandLayout> {
		Ok(match count {
			1 => BandLayout::Grey,
			2 => BandLayout::GreyAlpha,
			3 => BandLayout::Rgb,
			4 => BandLayout::Rgba,
			_ => bail!("band count must be between 1 and 4, got {count}"),
		})
	}

	/// Returns `true` if the last band is an alpha band.
	#[must_use]
	pub fn has_alpha(&self) -> bool {
		matches!(self, BandLayout::GreyAlpha | BandLayout::Rgba)
	}

	/// The same layout with an alpha band.
	#[must_use]
	pub fn with_alpha(&self) -> BandLayout {
		match self {
			BandLayout::Grey | BandLayout::GreyAlpha => BandLayout::GreyAlpha,
			BandLayout::Rgb | BandLayout::Rgba => BandLayout::Rgba,
		}
	}

	/// The same layout without an alpha band.
	#[must_use]
	pub fn without_alpha(&self) -> BandLayout {
		match self {
			BandLayout::Grey | BandLayout::GreyAlpha => BandLayout::Grey,
			BandLayout::Rgb | BandLayout::Rgba => BandLayout::Rgb,
		}
	}
}

impl Display for BandLayout {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			BandLayout::Grey => "grey",
			BandLayout::GreyAlpha => "grey+alpha",
			BandLayout::Rgb => "rgb",
			BandLayout::Rgba => "rgba",
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(1, BandLayout::Grey)]
	#[case(2, BandLayout::GreyAlpha)]
	#[case(3, BandLayout::Rgb)]
	#[case(4, BandLayout::Rgba)]
	fn band_count_round_trip(#[case] count: u8, #[case] layout: BandLayout) {
		assert_eq!(BandLayout::from_band_count(count).unwrap(), layout);
		assert_eq!(layout.band_count(), count);
	}

	#[test]
	fn invalid_count() {
		assert!(BandLayout::from_band_count(0).is_err());
		assert!(BandLayout::from_band_count(5).is_err());
	}

	#[test]
	fn alpha() {
		assert!(!BandLayout::Grey.has_alpha());
		assert!(BandLayout::GreyAlpha.has_alpha());
		assert!(!BandLayout::Rgb.has_alpha());
		assert!(BandLayout::Rgba.has_alpha());
	}

	#[test]
	fn alpha_conversions() {
		assert_eq!(BandLayout::Grey.with_alpha(), BandLayout::GreyAlpha);
		assert_eq!(BandLayout::Rgb.with_alpha(), BandLayout::Rgba);
		assert_eq!(BandLayout::Rgba.with_alpha(), BandLayout::Rgba);
		assert_eq!(BandLayout::GreyAlpha.without_alpha(), BandLayout::Grey);
		assert_eq!(BandLayout::Rgba.without_alpha(), BandLayout::Rgb);
		assert_eq!(BandLayout::Grey.without_alpha(), BandLayout::Grey);
	}
}
