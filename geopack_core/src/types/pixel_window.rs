//! A rectangle in dataset pixel space.

use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// A `x/y/width/height` rectangle addressing pixels of an opened dataset.
///
/// Coordinates are zero-based with (0, 0) at the dataset's top-left pixel.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

impl PixelWindow {
	/// Create a new window.
	///
	/// # Errors
	/// Returns an error if width or height is zero.
	pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<PixelWindow> {
		ensure!(width > 0 && height > 0, "pixel window must not be empty");
		Ok(PixelWindow { x, y, width, height })
	}

	/// The full window of a `width` × `height` raster.
	///
	/// # Errors
	/// Returns an error if width or height is zero.
	pub fn full(width: u32, height: u32) -> Result<PixelWindow> {
		PixelWindow::new(0, 0, width, height)
	}

	/// First pixel column beyond the window. Widened to u64 so windows
	/// reaching past `u32::MAX` cannot wrap.
	#[must_use]
	pub fn x_end(&self) -> u64 {
		u64::from(self.x) + u64::from(self.width)
	}

	/// First pixel row beyond the window.
	#[must_use]
	pub fn y_end(&self) -> u64 {
		u64::from(self.y) + u64::from(self.height)
	}

	/// Validate that the window fits inside a `width` × `height` raster.
	///
	/// # Errors
	/// Returns an error if the window extends beyond the raster.
	pub fn check_fits(&self, width: u32, height: u32) -> Result<()> {
		ensure!(
			self.x_end() <= u64::from(width) && self.y_end() <= u64::from(height),
			"window {self:?} exceeds raster size {width}x{height}"
		);
		Ok(())
	}
}

impl Debug for PixelWindow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PixelWindow({},{} {}x{})", self.x, self.y, self.width, self.height)
	}
}
