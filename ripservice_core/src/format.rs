/*!
# Rip Service: Path Formats

A tiny `strftime`-like language for building file paths out of tags.

| Code | Tag |
| ---- | --- |
| `%a` | `ARTIST` |
| `%A` | `ALBUM` |
| `%b` | `ALBUMARTIST` (or `ARTIST` if there isn't one) |
| `%t` | `TITLE` |
| `%g` | `GENRE` |
| `%G` | `GROUPING` |
| `%y` | `DATE` |
| `%k` | `TRACKNUMBER` |
| `%K` | `TRACKTOTAL` |
| `%d` | `DISCNUMBER` |
| `%D` | `DISCTOTAL` |
| `%%` | A literal `%`. |

Everything else is copied as-is.
*/

use crate::{
	RipSvcError,
	tag::{
		self,
		TagStore,
	},
};
use std::{
	fmt,
	ops::ControlFlow,
	str::FromStr,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Format Code.
enum Code {
	Artist,
	Album,
	AlbumArtist,
	Title,
	Genre,
	Grouping,
	Date,
	TrackNumber,
	TrackTotal,
	DiscNumber,
	DiscTotal,
}

impl Code {
	/// # From Char.
	const fn from_char(ch: char) -> Option<Self> {
		match ch {
			'a' => Some(Self::Artist),
			'A' => Some(Self::Album),
			'b' => Some(Self::AlbumArtist),
			't' => Some(Self::Title),
			'g' => Some(Self::Genre),
			'G' => Some(Self::Grouping),
			'y' => Some(Self::Date),
			'k' => Some(Self::TrackNumber),
			'K' => Some(Self::TrackTotal),
			'd' => Some(Self::DiscNumber),
			'D' => Some(Self::DiscTotal),
			_ => None,
		}
	}

	/// # As Char.
	const fn as_char(self) -> char {
		match self {
			Self::Artist => 'a',
			Self::Album => 'A',
			Self::AlbumArtist => 'b',
			Self::Title => 't',
			Self::Genre => 'g',
			Self::Grouping => 'G',
			Self::Date => 'y',
			Self::TrackNumber => 'k',
			Self::TrackTotal => 'K',
			Self::DiscNumber => 'd',
			Self::DiscTotal => 'D',
		}
	}

	/// # Tag Name.
	const fn tag(self) -> &'static str {
		match self {
			Self::Artist => tag::ARTIST,
			Self::Album => tag::ALBUM,
			Self::AlbumArtist => tag::ALBUMARTIST,
			Self::Title => tag::TITLE,
			Self::Genre => tag::GENRE,
			Self::Grouping => tag::GROUPING,
			Self::Date => tag::DATE,
			Self::TrackNumber => tag::TRACKNUMBER,
			Self::TrackTotal => tag::TRACKTOTAL,
			Self::DiscNumber => tag::DISCNUMBER,
			Self::DiscTotal => tag::DISCTOTAL,
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Format Piece.
enum Piece {
	/// # Literal Text.
	Text(String),

	/// # One or More Slashes.
	Slash(usize),

	/// # Tag Code.
	Code(Code),
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Output State.
enum State {
	/// # Nothing Yet.
	Initial,

	/// # Something Since the Last Slash.
	Content,

	/// # Nothing Since the Last Slash.
	Empty,
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Path Format.
///
/// A parsed path template, ready to be filled in from a [`TagStore`].
///
/// Tag values are escaped so they can't introduce directories of their own,
/// and a directory that would come out empty (because its tags are missing)
/// is dropped rather than producing `//`.
///
/// ## Examples
///
/// ```
/// use ripservice_core::{
///     PathFormat,
///     tag::{self, MemoryTags, TagStore},
/// };
///
/// let mut tags = MemoryTags::new();
/// tags.add(tag::ARTIST, "Band").unwrap();
/// tags.add(tag::TITLE, "Song?").unwrap();
/// tags.add(tag::TRACKNUMBER, "3").unwrap();
///
/// let fmt: PathFormat = "%b/%A/%k %t".parse().unwrap();
/// assert_eq!(fmt.format(&tags, Some("wav")), "Band/03 Song_.wav");
/// ```
pub struct PathFormat(Vec<Piece>);

impl Default for PathFormat {
	/// # Default.
	///
	/// Just the (padded) track number: `%k`.
	fn default() -> Self { Self(vec![Piece::Code(Code::TrackNumber)]) }
}

impl fmt::Display for PathFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for p in &self.0 {
			match p {
				Piece::Text(s) => {
					for part in s.split_inclusive('%') {
						f.write_str(part)?;
						if part.ends_with('%') { f.write_str("%")?; }
					}
				},
				Piece::Slash(n) => for _ in 0..*n { f.write_str("/")?; },
				Piece::Code(c) => write!(f, "%{}", c.as_char())?,
			}
		}
		Ok(())
	}
}

impl FromStr for PathFormat {
	type Err = RipSvcError;

	fn from_str(src: &str) -> Result<Self, Self::Err> {
		let mut out = Vec::new();
		let mut text = String::new();
		let mut chars = src.chars().peekable();
		while let Some(ch) = chars.next() {
			match ch {
				'/' => {
					if ! text.is_empty() { out.push(Piece::Text(std::mem::take(&mut text))); }
					let mut n = 1;
					while chars.next_if_eq(&'/').is_some() { n += 1; }
					out.push(Piece::Slash(n));
				},
				'%' => match chars.next() {
					Some('%') => { text.push('%'); },
					Some(c) => {
						let code = Code::from_char(c).ok_or_else(||
							RipSvcError::PathFormat(format!("%{}", c.escape_default()))
						)?;
						if ! text.is_empty() { out.push(Piece::Text(std::mem::take(&mut text))); }
						out.push(Piece::Code(code));
					},
					None => return Err(RipSvcError::PathFormat("%".to_owned())),
				},
				c => { text.push(c); },
			}
		}
		if ! text.is_empty() { out.push(Piece::Text(text)); }

		Ok(Self(out))
	}
}

impl PathFormat {
	#[must_use]
	/// # Format.
	///
	/// Fill in the template from `tags`, appending `.extension` if provided.
	///
	/// Codes with several values are joined with commas. Codes directly
	/// following other codes are separated by a space, except for a track
	/// number right after a disc number, which gets a dash (`1-03`).
	///
	/// Track numbers are zero-padded to the width of the track total, with a
	/// minimum of two digits; disc numbers likewise to the width of the disc
	/// total.
	pub fn format<T>(&self, tags: &T, extension: Option<&str>) -> String
	where T: TagStore + ?Sized {
		let mut out = String::new();
		let mut state = State::Initial;
		let mut last: Option<Code> = None;

		for p in &self.0 {
			match p {
				Piece::Text(s) => {
					out.push_str(s);
					state = State::Content;
					last = None;
				},
				Piece::Slash(n) => {
					if state != State::Empty {
						for _ in 0..*n { out.push('/'); }
					}
					state = State::Empty;
					last = None;
				},
				Piece::Code(code) => {
					let mut code = *code;
					let prefix =
						if code == Code::TrackNumber && last == Some(Code::DiscNumber) { "-" }
						else if last.is_some() { " " }
						else { "" };

					let width = match code {
						Code::TrackNumber => max_len(tags, tag::TRACKTOTAL, 2),
						Code::DiscNumber => max_len(tags, tag::DISCTOTAL, 1),
						Code::AlbumArtist => {
							if tags.count(tag::ALBUMARTIST) == 0 { code = Code::Artist; }
							0
						},
						_ => 0,
					};

					let mut count = 0;
					for v in tags.find(code.tag()) {
						if v.is_empty() { continue; }
						out.push_str(if count == 0 { prefix } else { ", " });
						count += 1;

						if width != 0 && is_canonical_int(&v) {
							for _ in v.len()..width { out.push('0'); }
						}
						escape_for_path(&v, &mut out);
					}

					if count != 0 {
						state = State::Content;
						last = Some(code);
					}
					else if state == State::Initial { state = State::Empty; }
				},
			}
		}

		if let Some(ext) = extension {
			out.push('.');
			out.push_str(ext);
		}

		out
	}
}



/// # Longest Value.
///
/// Return the length of the longest value for `name`, or `min`, whichever
/// is larger.
fn max_len<T>(tags: &T, name: &str, min: usize) -> usize
where T: TagStore + ?Sized {
	let mut out = min;
	tags.each(&mut |k, v| {
		if k == name && v.len() > out { out = v.len(); }
		ControlFlow::Continue(())
	});
	out
}

/// # Canonical Integer?
///
/// Matches `0` or `[1-9][0-9]*`.
fn is_canonical_int(src: &str) -> bool {
	match src.as_bytes() {
		[b'0'] => true,
		[b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
		_ => false,
	}
}

/// # Escape For Path.
///
/// Push `src` to `out`, replacing any ASCII character that isn't
/// alphanumeric or in a small safe list with an underscore. Non-ASCII
/// characters pass through unchanged.
fn escape_for_path(src: &str, out: &mut String) {
	out.extend(src.chars().map(|c|
		if ! c.is_ascii() || c.is_ascii_alphanumeric() || " #%&'()*+,-@[]^_{|}~".contains(c) { c }
		else { '_' }
	));
}
