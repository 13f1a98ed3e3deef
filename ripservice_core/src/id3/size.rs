/*!
# Rip Service: ID3 Sizes and Cursor
*/

use crate::RipSvcError;



/// # Read Sync-Safe Size.
///
/// Each byte carries seven significant bits; the high bit must be clear so
/// the value can never be mistaken for an MPEG frame sync.
///
/// ## Errors
///
/// Returns an error if any byte has its high bit set.
pub(crate) fn read_sync_safe_u32(src: [u8; 4]) -> Result<u32, RipSvcError> {
	src.into_iter().try_fold(0_u32, |acc, b|
		if b & 0x80 == 0 { Ok((acc << 7) | u32::from(b)) }
		else { Err(RipSvcError::MalformedSize) }
	)
}

#[inline]
/// # Read Plain Size.
///
/// ID3v2.3 frame sizes are ordinary big-endian integers.
pub(crate) const fn read_plain_u32_be(src: [u8; 4]) -> u32 { u32::from_be_bytes(src) }

/// # Write Sync-Safe Size.
///
/// The caller must make sure the value fits in 28 bits; anything larger is
/// silently truncated.
pub(crate) fn write_sync_safe_u32(mut src: u32) -> [u8; 4] {
	debug_assert!(src < (1 << 28), "Sync-safe sizes are limited to 28 bits.");
	let mut out = [0_u8; 4];
	for b in out.iter_mut().rev() {
		*b = (src & 0x7F) as u8;
		src >>= 7;
	}
	out
}



#[derive(Debug, Clone, Copy)]
/// # Byte Cursor.
///
/// A forward-only reader over a byte slice. Every read is bounds-checked, so
/// a lying frame size becomes an error rather than a panic.
pub(crate) struct Cursor<'a>(&'a [u8]);

impl<'a> Cursor<'a> {
	/// # New.
	pub(crate) const fn new(src: &'a [u8]) -> Self { Self(src) }

	/// # Remaining Length.
	pub(crate) const fn remaining(&self) -> usize { self.0.len() }

	/// # Peek.
	pub(crate) fn peek(&self) -> Option<u8> { self.0.first().copied() }

	/// # Rest.
	pub(crate) const fn rest(&self) -> &'a [u8] { self.0 }

	/// # Take Slice.
	pub(crate) fn take(&mut self, len: usize) -> Option<&'a [u8]> {
		if len <= self.0.len() {
			let (a, b) = self.0.split_at(len);
			self.0 = b;
			Some(a)
		}
		else { None }
	}

	/// # Take Array.
	pub(crate) fn take_array<const N: usize>(&mut self) -> Option<[u8; N]> {
		self.take(N).and_then(|v| <[u8; N]>::try_from(v).ok())
	}

	/// # Take Byte.
	pub(crate) fn take_u8(&mut self) -> Option<u8> {
		let (first, rest) = self.0.split_first()?;
		self.0 = rest;
		Some(*first)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_sync_safe() {
		assert_eq!(read_sync_safe_u32([0, 0, 0, 0]), Ok(0));
		assert_eq!(read_sync_safe_u32([0, 0, 2, 1]), Ok(257));
		assert_eq!(read_sync_safe_u32([0x7F, 0x7F, 0x7F, 0x7F]), Ok(0x0FFF_FFFF));

		for v in [0, 1, 127, 128, 257, 4096, 1_000_000, 0x0FFF_FFFF] {
			let enc = write_sync_safe_u32(v);
			assert!(enc.iter().all(|b| b & 0x80 == 0), "High bit leaked into {v}.");
			assert_eq!(read_sync_safe_u32(enc), Ok(v), "Round trip failed for {v}.");
		}
	}

	#[test]
	fn t_sync_safe_high_bit() {
		for idx in 0..4 {
			for high in [0x80, 0xFF] {
				let mut raw = [0x01; 4];
				raw[idx] = high;
				assert_eq!(
					read_sync_safe_u32(raw),
					Err(RipSvcError::MalformedSize),
					"High bit in byte {idx} should fail.",
				);
			}
		}
	}

	#[test]
	fn t_plain() {
		assert_eq!(read_plain_u32_be([0, 0, 1, 0x80]), 384);
		assert_eq!(read_plain_u32_be([0xFF, 0, 0, 0]), 0xFF00_0000);
	}

	#[test]
	fn t_cursor() {
		let mut c = Cursor::new(b"TIT2\0\0\0\x05");
		assert_eq!(c.remaining(), 8);
		assert_eq!(c.peek(), Some(b'T'));
		assert_eq!(c.take_array::<4>(), Some(*b"TIT2"));
		assert_eq!(c.take_u8(), Some(0));
		assert_eq!(c.take(10), None, "Over-long reads should fail.");
		assert_eq!(c.remaining(), 3, "Failed reads should not advance.");
		assert_eq!(c.take(3), Some(&b"\0\0\x05"[..]));
		assert_eq!(c.peek(), None);
	}
}
