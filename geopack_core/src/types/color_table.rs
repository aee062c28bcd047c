//! RGBA color tables for paletted sources.

use anyhow::{Result, ensure};

/// One palette entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColorEntry {
	pub red: u8,
	pub green: u8,
	pub blue: u8,
	pub alpha: u8,
}

impl ColorEntry {
	#[must_use]
	pub fn opaque(red: u8, green: u8, blue: u8) -> ColorEntry {
		ColorEntry {
			red,
			green,
			blue,
			alpha: 255,
		}
	}
}

/// An indexed RGBA palette of up to 256 entries.
///
/// Tile encoders have no paletted output, so a source color table is only
/// used to expand index values into full RGBA pixels before tiles are
/// encoded. The table itself is not persisted in the container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorTable {
	entries: Vec<ColorEntry>,
}

impl ColorTable {
	#[must_use]
	pub fn new() -> ColorTable {
		ColorTable::default()
	}

	/// Append an entry.
	///
	/// # Errors
	/// Returns an error when the table already holds 256 entries.
	pub fn push(&mut self, entry: ColorEntry) -> Result<()> {
		ensure!(self.entries.len() < 256, "color table cannot exceed 256 entries");
		self.entries.push(entry);
		Ok(())
	}

	/// Look up the entry for a pixel index.
	#[must_use]
	pub fn get(&self, index: u8) -> Option<&ColorEntry> {
		self.entries.get(usize::from(index))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	#[must_use]
	pub fn entries(&self) -> &[ColorEntry] {
		&self.entries
	}
}

impl FromIterator<ColorEntry> for ColorTable {
	fn from_iter<T: IntoIterator<Item = ColorEntry>>(iter: T) -> ColorTable {
		let entries: Vec<ColorEntry> = iter.into_iter().take(256).collect();
		ColorTable { entries }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn push_and_get() {
		let mut table = ColorTable::new();
		table.push(ColorEntry::opaque(255, 0, 0)).unwrap();
		table
			.push(ColorEntry {
				red: 0,
				green: 0,
				blue: 0,
				alpha: 0,
			})
			.unwrap();

		assert_eq!(table.len(), 2);
		assert_eq!(table.get(0), Some(&ColorEntry::opaque(255, 0, 0)));
		assert_eq!(table.get(1).unwrap().alpha, 0);
		assert_eq!(table.get(2), None);
	}

	#[test]
	fn capacity_limit() {
		let mut table: ColorTable = (0..=255).map(|v| ColorEntry::opaque(v, v, v)).collect();
		assert_eq!(table.len(), 256);
		assert!(table.push(ColorEntry::opaque(0, 0, 0)).is_err());
	}
}
