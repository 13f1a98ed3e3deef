/*!
# Rip Service: Text Encodings
*/

use crate::RipSvcError;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Text Encoding.
///
/// The four text encodings an ID3v2 frame may declare in its leading
/// encoding byte.
pub enum TextEncoding {
	/// # ISO-8859-1.
	Latin1 = 0x00,

	/// # UTF-16 with Byte Order Mark.
	Utf16Bom = 0x01,

	/// # UTF-16 Big Endian.
	Utf16Be = 0x02,

	/// # UTF-8.
	Utf8 = 0x03,
}

impl TryFrom<u8> for TextEncoding {
	type Error = RipSvcError;

	fn try_from(src: u8) -> Result<Self, Self::Error> {
		match src {
			0x00 => Ok(Self::Latin1),
			0x01 => Ok(Self::Utf16Bom),
			0x02 => Ok(Self::Utf16Be),
			0x03 => Ok(Self::Utf8),
			_ => Err(RipSvcError::InvalidEncoding("text encoding")),
		}
	}
}

impl TextEncoding {
	#[must_use]
	/// # As Byte.
	pub const fn as_u8(self) -> u8 { self as u8 }

	/// # From Byte (Capped).
	///
	/// Same as `TryFrom<u8>`, but also rejects encodings newer than `max`.
	/// ID3v2.3, for example, only knows about Latin-1 and UTF-16 w/ BOM.
	///
	/// ## Errors
	///
	/// Returns an error if the byte is not a known encoding or exceeds `max`.
	pub fn try_from_max(src: u8, max: Self) -> Result<Self, RipSvcError> {
		if src <= max.as_u8() { Self::try_from(src) }
		else { Err(RipSvcError::InvalidEncoding("text encoding")) }
	}

	/// # Decode.
	///
	/// Decode `src` to a proper Rust string.
	///
	/// ## Errors
	///
	/// Returns an error if the data is not valid for the encoding.
	pub fn decode(self, src: &[u8]) -> Result<String, RipSvcError> {
		match self {
			Self::Latin1 => Ok(decode_latin1(src)),
			Self::Utf16Bom => decode_utf16_bom(src),
			Self::Utf16Be => decode_utf16(src, true),
			Self::Utf8 => decode_utf8(src),
		}
	}

	#[must_use]
	/// # Split at Terminator.
	///
	/// Find the first NUL terminator, returning the bytes up to and including
	/// it, and everything after it. UTF-16 terminators are a two-byte pair
	/// aligned to the start of the string.
	///
	/// Returns `None` if there is no terminator.
	pub fn split_terminated(self, src: &[u8]) -> Option<(&[u8], &[u8])> {
		let end = match self {
			Self::Latin1 | Self::Utf8 => src.iter().position(|&b| b == 0)? + 1,
			Self::Utf16Bom | Self::Utf16Be => src.chunks_exact(2)
				.position(|pair| pair == [0, 0])
				.map(|idx| idx * 2 + 2)?,
		};
		Some(src.split_at(end))
	}
}



/// # Decode Latin-1.
///
/// Every byte maps directly to the Unicode code point of the same value.
pub fn decode_latin1(src: &[u8]) -> String {
	src.iter().copied().map(char::from).collect()
}

/// # Decode UTF-16 (BOM).
///
/// The first two bytes decide the byte order: `FE FF` is big endian, `FF FE`
/// little.
///
/// ## Errors
///
/// Returns an error if the BOM is missing or the remainder is invalid.
pub fn decode_utf16_bom(src: &[u8]) -> Result<String, RipSvcError> {
	match src {
		[0xFE, 0xFF, rest @ ..] => decode_utf16(rest, true),
		[0xFF, 0xFE, rest @ ..] => decode_utf16(rest, false),
		_ => Err(RipSvcError::InvalidEncoding("UTF-16")),
	}
}

/// # Decode UTF-16.
///
/// A high surrogate must be followed immediately by a low one; anything else
/// is an error, as is an odd number of bytes.
///
/// ## Errors
///
/// Returns an error if the data is not valid UTF-16.
pub fn decode_utf16(src: &[u8], big_endian: bool) -> Result<String, RipSvcError> {
	if src.len() % 2 != 0 {
		return Err(RipSvcError::InvalidEncoding("UTF-16"));
	}

	let units = src.chunks_exact(2).map(|pair|
		if big_endian { u16::from_be_bytes([pair[0], pair[1]]) }
		else { u16::from_le_bytes([pair[0], pair[1]]) }
	);

	char::decode_utf16(units)
		.collect::<Result<String, _>>()
		.map_err(|_| RipSvcError::InvalidEncoding("UTF-16"))
}

/// # Decode UTF-8.
///
/// Lead bytes must be followed by the right number of continuation bytes,
/// and the data may not end in the middle of a sequence.
///
/// ## Errors
///
/// Returns an error if the data is not valid UTF-8.
pub fn decode_utf8(src: &[u8]) -> Result<String, RipSvcError> {
	std::str::from_utf8(src)
		.map(str::to_owned)
		.map_err(|_| RipSvcError::InvalidEncoding("UTF-8"))
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_latin1() {
		assert_eq!(decode_latin1(b"Caf\xe9"), "Café");
		assert_eq!(decode_latin1(&[0xFF, 0x41]), "ÿA");
		assert_eq!(decode_latin1(&[]), "");
	}

	#[test]
	fn t_utf16() {
		// BOM, both ways.
		assert_eq!(
			decode_utf16_bom(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xE9]).as_deref(),
			Ok("Aé"),
		);
		assert_eq!(
			decode_utf16_bom(&[0xFF, 0xFE, 0x41, 0x00, 0xE9, 0x00]).as_deref(),
			Ok("Aé"),
		);

		// Missing BOM.
		assert_eq!(
			decode_utf16_bom(&[0x00, 0x41]),
			Err(RipSvcError::InvalidEncoding("UTF-16")),
		);

		// Odd length.
		assert!(decode_utf16(&[0x00, 0x41, 0x00], true).is_err(), "Odd lengths should fail.");

		// A proper surrogate pair: U+1F3B5.
		assert_eq!(
			decode_utf16(&[0xD8, 0x3C, 0xDF, 0xB5], true).as_deref(),
			Ok("\u{1F3B5}"),
		);

		// High surrogate without a low one.
		assert!(decode_utf16(&[0xD8, 0x3C, 0x00, 0x41], true).is_err(), "Unpaired high surrogate.");
		assert!(decode_utf16(&[0xD8, 0x3C], true).is_err(), "Trailing high surrogate.");

		// Low surrogate on its own.
		assert!(decode_utf16(&[0xDF, 0xB5, 0x00, 0x41], true).is_err(), "Lone low surrogate.");
	}

	#[test]
	fn t_utf16_bmp_roundtrip() {
		let text = "Ünïcödé ça va? Ωμέγα 東京";
		for be in [true, false] {
			let raw: Vec<u8> = text.encode_utf16()
				.flat_map(|u| if be { u.to_be_bytes() } else { u.to_le_bytes() })
				.collect();
			let dec = decode_utf16(&raw, be).expect("UTF-16 decode failed.");
			assert_eq!(dec, text, "BMP text should survive UTF-16 decoding.");
		}
	}

	#[test]
	fn t_utf8() {
		assert_eq!(decode_utf8("héllo".as_bytes()).as_deref(), Ok("héllo"));

		// Bad continuation.
		assert!(decode_utf8(&[0xC3, 0x41]).is_err(), "Bad continuation byte.");

		// Truncated.
		assert!(decode_utf8(&[0xE2, 0x82]).is_err(), "Truncated sequence.");

		// Stray continuation.
		assert!(decode_utf8(&[0x80]).is_err(), "Stray continuation byte.");
	}

	#[test]
	fn t_encoding_byte() {
		assert_eq!(TextEncoding::try_from(3), Ok(TextEncoding::Utf8));
		assert!(TextEncoding::try_from(4).is_err(), "There is no encoding #4.");
		assert_eq!(
			TextEncoding::try_from_max(1, TextEncoding::Utf16Bom),
			Ok(TextEncoding::Utf16Bom),
		);
		assert!(
			TextEncoding::try_from_max(3, TextEncoding::Utf16Bom).is_err(),
			"UTF-8 should be rejected when capped at UTF-16.",
		);
	}

	#[test]
	fn t_split_terminated() {
		let (a, b) = TextEncoding::Latin1.split_terminated(b"image/png\0\x03rest")
			.expect("Missing terminator.");
		assert_eq!(a, b"image/png\0");
		assert_eq!(b, b"\x03rest");

		// UTF-16 needs an aligned pair; bytes 1-2 are both zero, but only
		// 4-5 line up.
		let raw = [0x41, 0x00, 0x00, 0x41, 0x00, 0x00, 0xAA];
		let (a, b) = TextEncoding::Utf16Be.split_terminated(&raw)
			.expect("Missing terminator.");
		assert_eq!(a, &raw[..6]);
		assert_eq!(b, &[0xAA]);

		assert!(TextEncoding::Utf8.split_terminated(b"nothing").is_none(), "No terminator.");
	}
}
