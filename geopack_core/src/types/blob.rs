//! A thin wrapper around `Vec<u8>` for encoded tile payloads.
//!
//! Tile blobs move between the SQLite layer and the image codecs as opaque
//! bytes; [`Blob`] keeps that boundary explicit and gives the byte buffer a
//! compact `Debug` representation.

use std::fmt::Debug;

/// An owned byte buffer holding one encoded tile (or any other payload
/// read from / written to the container).
///
/// # Examples
///
/// ```
/// use geopack_core::Blob;
///
/// let blob = Blob::from(vec![1u8, 2, 3]);
/// assert_eq!(blob.len(), 3);
/// assert_eq!(blob.as_slice(), &[1, 2, 3]);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	/// Creates an empty `Blob`.
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Returns a reference to the underlying byte slice.
	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	/// Consumes this `Blob` and returns the underlying `Vec<u8>`.
	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Returns the length of the underlying byte slice.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` if the blob holds no bytes.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `true` if the blob starts with the given byte sequence.
	#[must_use]
	pub fn starts_with(&self, prefix: &[u8]) -> bool {
		self.0.starts_with(prefix)
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(item: &[u8; N]) -> Self {
		Blob(item.to_vec())
	}
}

/// Prints the length and at most the first 16 bytes in hex.
impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let head = self
			.0
			.iter()
			.take(16)
			.map(|byte| format!("{byte:02x}"))
			.collect::<Vec<_>>()
			.join(" ");
		let ellipsis = if self.0.len() > 16 { " …" } else { "" };
		write!(f, "Blob({}): {head}{ellipsis}", self.0.len())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn basics() {
		let blob = Blob::from(vec![0u8, 1, 2, 3]);
		assert_eq!(blob.len(), 4);
		assert!(!blob.is_empty());
		assert!(blob.starts_with(&[0, 1]));
		assert!(!blob.starts_with(&[1]));
		assert_eq!(blob.clone().into_vec(), vec![0, 1, 2, 3]);
	}

	#[test]
	fn empty() {
		let blob = Blob::new_empty();
		assert!(blob.is_empty());
		assert_eq!(blob, Blob::default());
	}

	#[test]
	fn debug() {
		assert_eq!(format!("{:?}", Blob::from(&[0xDE, 0xAD])), "Blob(2): de ad");
		let long = Blob::from(vec![0u8; 20]);
		assert!(format!("{long:?}").ends_with("…"));
	}
}
