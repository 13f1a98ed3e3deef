/*!
# Rip Service: ID3 Frame Table
*/

use crate::{
	RipSvcError,
	tag,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Frame Kind.
///
/// How a frame's payload is read, exposed, edited and written back.
pub enum FrameKind {
	/// # Plain Text.
	Text,

	/// # Boolean Text ("0" or "1").
	Flag,

	/// # The Number Half of a "number/total" Pair.
	SequenceNumber,

	/// # The Total Half of a "number/total" Pair.
	SequenceTotal,

	/// # Attached Picture.
	Picture,

	/// # Opaque; Kept As-Is.
	PassThrough,

	/// # Opaque; Dropped.
	Discard,
}

impl FrameKind {
	#[must_use]
	/// # Text-Based?
	///
	/// Text, flag and sequence frames all share the same encoded-string
	/// payload.
	pub const fn is_text(self) -> bool {
		matches!(self, Self::Text | Self::Flag | Self::SequenceNumber | Self::SequenceTotal)
	}

	#[must_use]
	/// # Sequence?
	pub const fn is_sequence(self) -> bool {
		matches!(self, Self::SequenceNumber | Self::SequenceTotal)
	}
}



#[derive(Debug, Eq, PartialEq)]
/// # Frame Spec.
///
/// One entry in the static frame table, mapping a tag name to its on-disk
/// codes. Either code may be missing if the frame only exists in one
/// version of the format.
pub struct FrameSpec {
	/// # Tag Name.
	pub name: Option<&'static str>,

	/// # ID3v2.3 Code.
	pub v3: Option<[u8; 4]>,

	/// # ID3v2.4 Code.
	pub v4: Option<[u8; 4]>,

	/// # Behavior.
	pub kind: FrameKind,
}

impl FrameSpec {
	/// # New.
	const fn new(
		name: Option<&'static str>,
		v3: Option<&[u8; 4]>,
		v4: Option<&[u8; 4]>,
		kind: FrameKind,
	) -> Self {
		Self {
			name,
			v3: match v3 { Some(c) => Some(*c), None => None },
			v4: match v4 { Some(c) => Some(*c), None => None },
			kind,
		}
	}

	#[must_use]
	/// # Code for Version.
	pub const fn code(&self, major: u8) -> Option<[u8; 4]> {
		match major {
			3 => self.v3,
			4 => self.v4,
			_ => None,
		}
	}

	#[must_use]
	/// # Code (Lossy).
	///
	/// The best code for logging and error messages, preferring ID3v2.4.
	pub fn code_str(&self) -> String {
		self.v4.or(self.v3)
			.map(|c| String::from_utf8_lossy(&c).into_owned())
			.unwrap_or_default()
	}
}



/// # Shorthand: Present in Both Versions.
macro_rules! both {
	($name:expr, $code:literal, $kind:ident) => (
		FrameSpec::new($name, Some($code), Some($code), FrameKind::$kind)
	);
}

/// # Shorthand: ID3v2.4 Only.
macro_rules! v4 {
	($name:expr, $code:literal, $kind:ident) => (
		FrameSpec::new($name, None, Some($code), FrameKind::$kind)
	);
}

/// # Shorthand: ID3v2.3 Only.
macro_rules! v3 {
	($name:expr, $code:literal, $kind:ident) => (
		FrameSpec::new($name, Some($code), None, FrameKind::$kind)
	);
}

/// # Frame Table.
///
/// Sequence number specs precede their total counterparts; a code lookup
/// always lands on the number.
static SPECS: &[FrameSpec] = &[
	// Identification.
	both!(Some(tag::GROUPING), b"TIT1", Text),
	both!(Some(tag::TITLE), b"TIT2", Text),
	both!(Some(tag::SUBTITLE), b"TIT3", Text),
	both!(Some(tag::ALBUM), b"TALB", Text),
	both!(Some(tag::ORIGINALALBUM), b"TOAL", Text),
	both!(Some(tag::TRACKNUMBER), b"TRCK", SequenceNumber),
	both!(Some(tag::TRACKTOTAL), b"TRCK", SequenceTotal),
	both!(Some(tag::DISCNUMBER), b"TPOS", SequenceNumber),
	both!(Some(tag::DISCTOTAL), b"TPOS", SequenceTotal),
	v4!(Some(tag::DISCSUBTITLE), b"TSST", Text),
	both!(Some(tag::ISRC), b"TSRC", Text),

	// People.
	both!(Some(tag::ARTIST), b"TPE1", Text),
	both!(Some(tag::ALBUMARTIST), b"TPE2", Text),
	both!(Some(tag::CONDUCTOR), b"TPE3", Text),
	both!(Some(tag::REMIXER), b"TPE4", Text),
	both!(Some(tag::ORIGINALARTIST), b"TOPE", Text),
	both!(Some(tag::LYRICIST), b"TEXT", Text),
	both!(Some(tag::ORIGINALLYRICIST), b"TOLY", Text),
	both!(Some(tag::COMPOSER), b"TCOM", Text),
	v4!(None, b"TMCL", PassThrough),
	v4!(None, b"TIPL", PassThrough),
	both!(Some(tag::ENCODEDBY), b"TENC", Text),

	// Derived and subjective properties.
	both!(Some(tag::BPM), b"TBPM", Text),
	both!(None, b"TLEN", PassThrough),
	both!(None, b"TKEY", PassThrough),
	both!(None, b"TLAN", PassThrough),
	both!(Some(tag::GENRE), b"TCON", Text),
	both!(None, b"TFLT", PassThrough),
	both!(None, b"TMED", PassThrough),
	v4!(Some(tag::MOOD), b"TMOO", Text),

	// Rights and license.
	both!(Some(tag::COPYRIGHT), b"TCOP", Text),
	v4!(Some(tag::PRODUCED), b"TPRO", Text),
	both!(Some(tag::LABEL), b"TPUB", Text),
	both!(None, b"TOWN", PassThrough),
	both!(None, b"TRSN", PassThrough),
	both!(None, b"TRSO", PassThrough),

	// Other text.
	both!(None, b"TOFN", PassThrough),
	both!(None, b"TDLY", PassThrough),
	v4!(None, b"TDEN", PassThrough),
	FrameSpec::new(Some(tag::ORIGINALDATE), Some(b"TORY"), Some(b"TDOR"), FrameKind::Text),
	FrameSpec::new(Some(tag::DATE), Some(b"TYER"), Some(b"TDRC"), FrameKind::Text),
	v4!(None, b"TDRL", PassThrough),
	v4!(None, b"TDTG", PassThrough),
	both!(Some(tag::ENCODER), b"TSSE", Text),
	FrameSpec::new(Some(tag::ALBUMSORT), Some(b"XSOA"), Some(b"TSOA"), FrameKind::Text),
	FrameSpec::new(Some(tag::ARTISTSORT), Some(b"XSOP"), Some(b"TSOP"), FrameKind::Text),
	FrameSpec::new(Some(tag::TITLESORT), Some(b"XSOT"), Some(b"TSOT"), FrameKind::Text),

	// ID3v2.3 leftovers with no ID3v2.4 home.
	v3!(None, b"TDAT", Discard),
	v3!(None, b"TIME", Discard),
	v3!(None, b"TRDA", Discard),
	v3!(None, b"TSIZ", Discard),

	// User-defined text and URLs.
	both!(None, b"TXXX", PassThrough),
	both!(None, b"WCOM", PassThrough),
	both!(None, b"WCOP", PassThrough),
	both!(None, b"WOAF", PassThrough),
	both!(None, b"WOAR", PassThrough),
	both!(None, b"WOAS", PassThrough),
	both!(None, b"WORS", PassThrough),
	both!(None, b"WPAY", PassThrough),
	both!(None, b"WPUB", PassThrough),
	both!(None, b"WXXX", PassThrough),

	// Pictures.
	both!(None, b"APIC", Picture),

	// Everything else we know about but don't interpret.
	both!(None, b"USLT", PassThrough),
	both!(None, b"COMM", PassThrough),
	both!(None, b"USER", PassThrough),
	both!(None, b"PRIV", PassThrough),

	// Unofficial, but common.
	both!(Some(tag::COMPILATION), b"TCMP", Flag),
];



/// # Spec by On-Disk Code.
///
/// ## Errors
///
/// Returns an error if no spec for the given major version uses the code.
pub fn spec_for_disk_code(major: u8, code: [u8; 4]) -> Result<&'static FrameSpec, RipSvcError> {
	SPECS.iter()
		.find(|s| s.code(major) == Some(code))
		.ok_or_else(|| RipSvcError::UnknownFrame(String::from_utf8_lossy(&code).into_owned()))
}

/// # Spec by Tag Name.
///
/// ## Errors
///
/// Returns an error if no spec carries the name.
pub fn spec_for_tag_name(name: &str) -> Result<&'static FrameSpec, RipSvcError> {
	SPECS.iter()
		.find(|s| s.name == Some(name))
		.ok_or_else(|| RipSvcError::UnknownTag(name.to_owned()))
}

#[must_use]
/// # Paired Spec.
///
/// Return the other half of a number/total pair, if any.
pub fn paired_spec(spec: &'static FrameSpec) -> Option<&'static FrameSpec> {
	let want = match spec.kind {
		FrameKind::SequenceNumber => FrameKind::SequenceTotal,
		FrameKind::SequenceTotal => FrameKind::SequenceNumber,
		_ => return None,
	};
	SPECS.iter().find(|s| s.kind == want && s.v4 == spec.v4 && s.v3 == spec.v3)
}
