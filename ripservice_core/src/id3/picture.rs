/*!
# Rip Service: ID3 Pictures
*/

use crate::{
	id3::size::Cursor,
	RipSvcError,
	TextEncoding,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Attached Picture.
///
/// The decoded contents of an `APIC` frame.
pub struct Picture {
	/// # MIME Type.
	mime: String,

	/// # Picture Type.
	///
	/// `0x00` is "other", `0x03` is a front cover, etc.
	kind: u8,

	/// # Description.
	description: String,

	/// # Image Data.
	data: Vec<u8>,
}

impl Picture {
	#[must_use]
	/// # New.
	///
	/// Create an untyped picture with no description.
	pub fn new(mime: &str, data: Vec<u8>) -> Self {
		Self {
			mime: mime.to_owned(),
			kind: 0,
			description: String::new(),
			data,
		}
	}

	#[must_use]
	/// # Valid MIME Type?
	///
	/// MIME types are written as NUL-terminated Latin-1, so only printable
	/// ASCII is accepted from callers.
	pub fn valid_mime(mime: &str) -> bool {
		mime.bytes().all(|b| b.is_ascii_graphic() || b == b' ')
	}

	#[must_use]
	/// # MIME Type.
	pub fn mime(&self) -> &str { &self.mime }

	#[must_use]
	/// # Picture Type.
	pub const fn kind(&self) -> u8 { self.kind }

	#[must_use]
	/// # Description.
	pub fn description(&self) -> &str { &self.description }

	#[must_use]
	/// # Image Data.
	pub fn data(&self) -> &[u8] { &self.data }
}

impl Picture {
	/// # Read.
	///
	/// Parse an `APIC` payload: encoding byte, Latin-1 MIME type, picture
	/// type, description (in the frame's encoding), then the image itself.
	pub(super) fn read(max: TextEncoding, payload: &[u8]) -> Result<Self, RipSvcError> {
		let mut cur = Cursor::new(payload);
		let enc = cur.take_u8()
			.ok_or(RipSvcError::MalformedFrame("APIC".to_owned(), "unexpected end of frame"))?;
		let enc = TextEncoding::try_from_max(enc, max)?;

		let (mime, rest) = TextEncoding::Latin1.split_terminated(cur.rest())
			.ok_or(RipSvcError::MalformedFrame(
				"APIC".to_owned(),
				"missing null terminator on MIME type",
			))?;
		let mime = TextEncoding::Latin1.decode(strip_nul(mime, 1))?;

		let mut cur = Cursor::new(rest);
		let kind = cur.take_u8()
			.ok_or(RipSvcError::MalformedFrame("APIC".to_owned(), "unexpected end of frame"))?;

		let (description, data) = enc.split_terminated(cur.rest())
			.ok_or(RipSvcError::MalformedFrame(
				"APIC".to_owned(),
				"missing null terminator on description",
			))?;
		let width = match enc {
			TextEncoding::Latin1 | TextEncoding::Utf8 => 1,
			TextEncoding::Utf16Bom | TextEncoding::Utf16Be => 2,
		};
		let description = enc.decode(strip_nul(description, width))?;

		log::trace!("Read picture {kind} {description:?} ({mime}, {} bytes).", data.len());
		Ok(Self { mime, kind, description, data: data.to_vec() })
	}

	/// # Payload Length.
	pub(super) fn payload_len(&self) -> usize {
		1 + self.mime.chars().count() + 1 + 1 + self.description.len() + 1 + self.data.len()
	}

	/// # Write Payload.
	///
	/// Pictures are always written back with UTF-8 descriptions. MIME types
	/// keep their original Latin-1 bytes.
	pub(super) fn write_to(&self, out: &mut Vec<u8>) {
		out.push(TextEncoding::Utf8.as_u8());
		// Decoded Latin-1 and validated ASCII both fit in a byte.
		out.extend(self.mime.chars().filter_map(|c| u8::try_from(c).ok()));
		out.push(0);
		out.push(self.kind);
		out.extend_from_slice(self.description.as_bytes());
		out.push(0);
		out.extend_from_slice(&self.data);
	}
}

/// # Strip Terminator.
fn strip_nul(src: &[u8], width: usize) -> &[u8] {
	&src[..src.len().saturating_sub(width)]
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_read_write() {
		let mut raw = vec![0x03];
		raw.extend_from_slice(b"image/png\0");
		raw.push(0x03);
		raw.extend_from_slice("Cover ☺\0".as_bytes());
		raw.extend_from_slice(&[0x89, b'P', b'N', b'G', 0, 0]);

		let pic = Picture::read(TextEncoding::Utf8, &raw).expect("Picture read failed.");
		assert_eq!(pic.mime(), "image/png");
		assert_eq!(pic.kind(), 3);
		assert_eq!(pic.description(), "Cover ☺");
		assert_eq!(pic.data(), &[0x89, b'P', b'N', b'G', 0, 0], "Image data may contain NULs.");

		let mut out = Vec::new();
		pic.write_to(&mut out);
		assert_eq!(out, raw, "UTF-8 pictures should write back unchanged.");
		assert_eq!(pic.payload_len(), out.len());
	}

	#[test]
	fn t_read_utf16() {
		let mut raw = vec![0x01];
		raw.extend_from_slice(b"image/jpeg\0");
		raw.push(0x00);
		raw.extend_from_slice(&[0xFF, 0xFE, b'H', 0, b'i', 0, 0, 0]);
		raw.extend_from_slice(&[0xFF, 0xD8]);

		let pic = Picture::read(TextEncoding::Utf16Bom, &raw).expect("Picture read failed.");
		assert_eq!(pic.description(), "Hi");
		assert_eq!(pic.data(), &[0xFF, 0xD8]);

		// ID3v2.3 never allowed UTF-8.
		raw[0] = 0x03;
		assert!(Picture::read(TextEncoding::Utf16Bom, &raw).is_err(), "Encoding should be capped.");
	}

	#[test]
	fn t_read_bad() {
		assert!(Picture::read(TextEncoding::Utf8, &[]).is_err(), "Empty payload.");
		assert_eq!(
			Picture::read(TextEncoding::Utf8, b"\x00image/png"),
			Err(RipSvcError::MalformedFrame("APIC".to_owned(), "missing null terminator on MIME type")),
		);
		assert!(
			Picture::read(TextEncoding::Utf8, b"\x00image/png\0").is_err(),
			"Missing picture type.",
		);
		assert_eq!(
			Picture::read(TextEncoding::Utf8, b"\x00image/png\0\x03desc"),
			Err(RipSvcError::MalformedFrame("APIC".to_owned(), "missing null terminator on description")),
		);
	}

	#[test]
	fn t_new() {
		let pic = Picture::new("image/gif", vec![1, 2, 3]);
		assert_eq!(pic.kind(), 0);
		assert!(pic.description().is_empty());
		let mut out = Vec::new();
		pic.write_to(&mut out);
		assert_eq!(out, b"\x03image/gif\0\x00\0\x01\x02\x03");
	}

	#[test]
	fn t_mime() {
		for good in ["", "image/png", "image/svg+xml", "-->"] {
			assert!(Picture::valid_mime(good), "{good:?} should be valid.");
		}
		for bad in ["image/p\0ng", "image/pñg", "image\npng"] {
			assert!(! Picture::valid_mime(bad), "{bad:?} should be invalid.");
		}

		// Latin-1 read from disk goes back out untouched.
		let raw = b"\x00image/\xE9\0\x00\0\xFF";
		let pic = Picture::read(TextEncoding::Utf8, raw).expect("Picture read failed.");
		assert_eq!(pic.mime(), "image/é");
		let mut out = Vec::new();
		pic.write_to(&mut out);
		assert_eq!(&out[1..], &raw[1..], "Latin-1 MIME types should survive a write.");
	}
}
