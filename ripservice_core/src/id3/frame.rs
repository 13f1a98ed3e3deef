/*!
# Rip Service: ID3 Frames
*/

use crate::{
	id3::{
		Picture,
		size::write_sync_safe_u32,
		spec::{
			FrameKind,
			FrameSpec,
			paired_spec,
		},
	},
	RipSvcError,
	TextEncoding,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Frame Body.
pub(super) enum FrameBody {
	/// # Decoded Text.
	///
	/// Sequence frames hold the joined "number/total" form.
	Text(String),

	/// # Picture.
	Picture(Picture),

	/// # Opaque Bytes.
	Raw(Vec<u8>),
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Frame.
///
/// One ID3 frame: a static spec and its decoded body. Sequence frames are
/// always keyed by the number half of their spec pair.
pub(super) struct Frame {
	/// # Spec.
	pub(super) spec: &'static FrameSpec,

	/// # Body.
	pub(super) body: FrameBody,
}

impl Frame {
	/// # Text Frame.
	pub(super) const fn text(spec: &'static FrameSpec, text: String) -> Self {
		Self { spec, body: FrameBody::Text(text) }
	}

	/// # Read.
	///
	/// Decode a payload according to its spec. Discarded frames return
	/// `None`.
	pub(super) fn read(major: u8, spec: &'static FrameSpec, payload: &[u8])
	-> Result<Option<Self>, RipSvcError> {
		let max = if major == 3 { TextEncoding::Utf16Bom } else { TextEncoding::Utf8 };
		let body = match spec.kind {
			FrameKind::Text | FrameKind::Flag | FrameKind::SequenceNumber | FrameKind::SequenceTotal =>
				FrameBody::Text(read_text(spec, major, max, payload)?),
			FrameKind::Picture => FrameBody::Picture(Picture::read(max, payload)?),
			FrameKind::PassThrough => FrameBody::Raw(payload.to_vec()),
			FrameKind::Discard => {
				log::trace!("Discarding {} frame.", spec.code_str());
				return Ok(None);
			},
		};

		Ok(Some(Self { spec, body }))
	}

	/// # Tag Entries.
	///
	/// Return the zero, one or two name/value pairs this frame represents.
	pub(super) fn entries(&self) -> impl Iterator<Item=(&'static str, &str)> {
		let (a, b) = match (&self.body, self.spec.name) {
			(FrameBody::Text(t), Some(name)) =>
				if self.spec.kind.is_sequence() {
					let (number, total) = split_sequence(t);
					(
						number.map(|v| (name, v)),
						total.and_then(|v|
							paired_spec(self.spec)
								.and_then(|p| p.name)
								.map(|name| (name, v))
						),
					)
				}
				else { (Some((name, t.as_str())), None) },
			_ => (None, None),
		};
		a.into_iter().chain(b)
	}

	/// # Has Entries?
	///
	/// True for frames that surface as tags, i.e. the ones `clear` removes.
	pub(super) fn is_tag(&self) -> bool {
		matches!(self.body, FrameBody::Text(_)) && self.spec.name.is_some()
	}

	/// # Payload Length.
	pub(super) fn payload_len(&self) -> usize {
		match &self.body {
			FrameBody::Text(t) => 1 + t.len() + 1,
			FrameBody::Picture(p) => p.payload_len(),
			FrameBody::Raw(r) => r.len(),
		}
	}

	/// # Write.
	///
	/// Append the full ID3v2.4 frame (header and payload) to `out`. Text is
	/// always written as NUL-terminated UTF-8.
	pub(super) fn write_to(&self, out: &mut Vec<u8>) -> Result<(), RipSvcError> {
		let code = self.spec.v4.ok_or_else(|| RipSvcError::UnknownFrame(self.spec.code_str()))?;
		let len = self.payload_len();
		let len32 = u32::try_from(len).ok()
			.filter(|&n| n < (1 << 28))
			.ok_or_else(|| RipSvcError::MalformedFrame(self.spec.code_str(), "frame too large"))?;

		log::trace!("Writing {} frame ({len} bytes).", self.spec.code_str());
		out.extend_from_slice(&code);
		out.extend_from_slice(&write_sync_safe_u32(len32));
		out.extend_from_slice(&[0, 0]);
		match &self.body {
			FrameBody::Text(t) => {
				out.push(TextEncoding::Utf8.as_u8());
				out.extend_from_slice(t.as_bytes());
				out.push(0);
			},
			FrameBody::Picture(p) => p.write_to(out),
			FrameBody::Raw(r) => out.extend_from_slice(r),
		}

		Ok(())
	}
}



/// # Read Text Payload.
///
/// ID3v2.4 text must end with exactly one NUL. ID3v2.3 text may or may not
/// be terminated, but cannot have a NUL anywhere else.
fn read_text(spec: &FrameSpec, major: u8, max: TextEncoding, payload: &[u8])
-> Result<String, RipSvcError> {
	let (&enc, rest) = payload.split_first()
		.ok_or_else(|| RipSvcError::MalformedFrame(spec.code_str(), "unexpected end of frame"))?;
	let mut text = TextEncoding::try_from_max(enc, max)?.decode(rest)?;

	match (text.find('\0'), major) {
		(Some(idx), _) if idx + 1 == text.len() => { text.truncate(idx); },
		(None, 3) => {},
		(None, _) => return Err(RipSvcError::MalformedFrame(
			spec.code_str(),
			"missing null terminator",
		)),
		(Some(_), 3) => return Err(RipSvcError::MalformedFrame(
			spec.code_str(),
			"tag value has embedded NUL character",
		)),
		(Some(_), _) => return Err(RipSvcError::MalformedFrame(
			spec.code_str(),
			"more than one tag value",
		)),
	}

	log::trace!("Read {} text {text:?}.", spec.code_str());
	Ok(text)
}

/// # Split Sequence.
///
/// Split "number/total" on the first slash. Empty halves are treated as
/// absent.
pub(super) fn split_sequence(src: &str) -> (Option<&str>, Option<&str>) {
	let (number, total) = match src.split_once('/') {
		Some((a, b)) => (a, Some(b)),
		None => (src, None),
	};
	(
		Some(number).filter(|v| ! v.is_empty()),
		total.filter(|v| ! v.is_empty()),
	)
}

/// # Join Sequence.
///
/// The inverse of [`split_sequence`].
pub(super) fn join_sequence(number: Option<&str>, total: Option<&str>) -> String {
	let number = number.unwrap_or_default();
	match total {
		Some(total) => format!("{number}/{total}"),
		None => number.to_owned(),
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		id3::spec::spec_for_tag_name,
		tag,
	};

	#[test]
	fn t_sequence() {
		assert_eq!(split_sequence("3/12"), (Some("3"), Some("12")));
		assert_eq!(split_sequence("3"), (Some("3"), None));
		assert_eq!(split_sequence("/12"), (None, Some("12")));
		assert_eq!(split_sequence("3/"), (Some("3"), None));
		assert_eq!(split_sequence("3/1/2"), (Some("3"), Some("1/2")), "Only the first slash splits.");
		assert_eq!(split_sequence(""), (None, None));

		for (n, t) in [
			(Some("1"), Some("9")),
			(Some("01"), None),
			(None, Some("10")),
			(Some("7"), Some("007")),
		] {
			assert_eq!(split_sequence(&join_sequence(n, t)), (n, t), "Round trip failed.");
		}
	}

	#[test]
	fn t_read_text() {
		let spec = spec_for_tag_name(tag::TITLE).expect("Missing TITLE.");

		// ID3v2.4.
		assert_eq!(read_text(spec, 4, TextEncoding::Utf8, b"\x03Hello\0").as_deref(), Ok("Hello"));
		assert_eq!(
			read_text(spec, 4, TextEncoding::Utf8, b"\x03Hello"),
			Err(RipSvcError::MalformedFrame("TIT2".to_owned(), "missing null terminator")),
		);
		assert_eq!(
			read_text(spec, 4, TextEncoding::Utf8, b"\x03A\0B\0"),
			Err(RipSvcError::MalformedFrame("TIT2".to_owned(), "more than one tag value")),
		);
		assert_eq!(
			read_text(spec, 4, TextEncoding::Utf8, &[0x01, 0xFF, 0xFE, b'H', 0, b'i', 0, 0, 0]).as_deref(),
			Ok("Hi"),
		);
		assert!(read_text(spec, 4, TextEncoding::Utf8, b"").is_err(), "Empty payload.");

		// ID3v2.3.
		assert_eq!(read_text(spec, 3, TextEncoding::Utf16Bom, b"\x00Hello").as_deref(), Ok("Hello"));
		assert_eq!(read_text(spec, 3, TextEncoding::Utf16Bom, b"\x00Hello\0").as_deref(), Ok("Hello"));
		assert_eq!(
			read_text(spec, 3, TextEncoding::Utf16Bom, b"\x00A\0B"),
			Err(RipSvcError::MalformedFrame("TIT2".to_owned(), "tag value has embedded NUL character")),
		);
		assert!(
			read_text(spec, 3, TextEncoding::Utf16Bom, b"\x03Hello").is_err(),
			"ID3v2.3 does not support UTF-8.",
		);
	}

	#[test]
	fn t_entries() {
		let number = spec_for_tag_name(tag::TRACKNUMBER).expect("Missing TRACKNUMBER.");
		let frame = Frame::text(number, "3/12".to_owned());
		assert_eq!(
			frame.entries().collect::<Vec<_>>(),
			vec![(tag::TRACKNUMBER, "3"), (tag::TRACKTOTAL, "12")],
		);
		let frame = Frame::text(number, "/12".to_owned());
		assert_eq!(frame.entries().collect::<Vec<_>>(), vec![(tag::TRACKTOTAL, "12")]);

		let title = spec_for_tag_name(tag::TITLE).expect("Missing TITLE.");
		let frame = Frame::text(title, String::new());
		assert_eq!(frame.entries().collect::<Vec<_>>(), vec![(tag::TITLE, "")]);
	}

	#[test]
	fn t_write() {
		let title = spec_for_tag_name(tag::TITLE).expect("Missing TITLE.");
		let frame = Frame::text(title, "Hi".to_owned());
		let mut out = Vec::new();
		frame.write_to(&mut out).expect("Write failed.");
		assert_eq!(out, b"TIT2\0\0\0\x04\0\0\x03Hi\0");
		assert_eq!(frame.payload_len() + 10, out.len());

		// Legacy frames are written under their new codes.
		let date = spec_for_tag_name(tag::DATE).expect("Missing DATE.");
		let frame = Frame::read(3, date, b"\x001999").expect("Read failed.").expect("Missing frame.");
		out.clear();
		frame.write_to(&mut out).expect("Write failed.");
		assert_eq!(&out[..4], b"TDRC");
	}
}
