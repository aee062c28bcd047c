//! Order-sensitive band checksums.
//!
//! The checksum weights each sample by its position, so it changes when
//! pixels move even if the multiset of values stays the same. It is meant
//! for quick comparisons in tests and probing tools, not for integrity
//! protection.

/// Checksum of one band's samples in row-major order.
///
/// Each sample `v` at index `i` contributes `v * (i % 11 + 1)`; the sum is
/// reduced modulo 65536.
///
/// # Examples
///
/// ```
/// use geopack_core::checksum::band_checksum;
///
/// assert_eq!(band_checksum([0u8, 0, 0]), 0);
/// assert_eq!(band_checksum([1u8, 1, 1]), 6);
/// ```
#[must_use]
pub fn band_checksum(samples: impl IntoIterator<Item = u8>) -> u16 {
	let mut sum: u32 = 0;
	for (i, value) in samples.into_iter().enumerate() {
		let weight = (i % 11) as u32 + 1;
		sum = (sum + u32::from(value) * weight) & 0xFFFF;
	}
	sum as u16
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty() {
		assert_eq!(band_checksum(Vec::<u8>::new()), 0);
	}

	#[test]
	fn weighted_positions() {
		// 10*1 + 20*2 + 30*3 = 140
		assert_eq!(band_checksum([10u8, 20, 30]), 140);
	}

	#[test]
	fn weight_cycle_wraps_after_eleven() {
		// Twelve ones: weights 1..=11 then 1 again -> 66 + 1.
		assert_eq!(band_checksum(vec![1u8; 12]), 67);
	}

	#[test]
	fn order_sensitive() {
		assert_ne!(band_checksum([10u8, 20]), band_checksum([20u8, 10]));
	}

	#[test]
	fn modular_reduction() {
		// 255 * (1+2+...+11) = 16830 per 11 samples; 44 samples = 67320,
		// which wraps to 67320 - 65536 = 1784.
		assert_eq!(band_checksum(vec![255u8; 44]), 1784);
	}
}
