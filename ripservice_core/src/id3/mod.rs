/*!
# Rip Service: ID3v2 Tags

This module reads and writes ID3v2.3/2.4 tags at the start of a file,
exposing them through the [`TagStore`] contract.

Saves always produce ID3v2.4 with UTF-8 text, written to a temporary file
alongside the original and then renamed over it.
*/

mod frame;
mod picture;
pub(crate) mod size;
pub(crate) mod spec;

use crate::{
	RipSvcError,
	tag::{
		TagMode,
		TagStore,
	},
};
use frame::{
	Frame,
	FrameBody,
	join_sequence,
	split_sequence,
};
pub use picture::Picture;
use size::{
	Cursor,
	read_plain_u32_be,
	read_sync_safe_u32,
	write_sync_safe_u32,
};
use spec::{
	FrameKind,
	FrameSpec,
	paired_spec,
	spec_for_disk_code,
	spec_for_tag_name,
};
use std::{
	fs::File,
	io::{
		ErrorKind,
		Read,
		Seek,
		SeekFrom,
		Write,
	},
	ops::ControlFlow,
	path::{
		Path,
		PathBuf,
	},
};



/// # ID3 Magic.
const MAGIC: &[u8; 3] = b"ID3";

/// # Header Length.
const HEADER_LEN: u64 = 10;

/// # Largest Sync-Safe Size.
const MAX_SIZE: usize = (1 << 28) - 1;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Parsed Header.
struct Header {
	/// # Major Version.
	major: u8,

	/// # Revision.
	revision: u8,

	/// # Body Size.
	size: u32,
}

impl Header {
	/// # Parse.
	///
	/// Returns `Ok(None)` if the magic is missing.
	fn parse(raw: [u8; 10]) -> Result<Option<Self>, RipSvcError> {
		if raw[..3] != MAGIC[..] { return Ok(None); }

		let (major, revision) = (raw[3], raw[4]);
		if ! matches!(major, 3 | 4) {
			return Err(RipSvcError::Id3Version(major, revision));
		}
		if raw[5] != 0 { return Err(RipSvcError::Id3Flags(raw[5])); }

		let size = read_sync_safe_u32([raw[6], raw[7], raw[8], raw[9]])?;
		Ok(Some(Self { major, revision, size }))
	}
}



#[derive(Debug)]
/// # ID3 Tags.
///
/// An open file and its decoded ID3 frames. The file handle is held until
/// the container is dropped.
///
/// ## Examples
///
/// ```no_run
/// use ripservice_core::{
///     Id3Tags,
///     tag::{self, TagMode, TagStore},
/// };
///
/// let mut tags = Id3Tags::open("song.mp3", TagMode::ReadWrite).unwrap();
/// tags.remove(tag::TITLE).unwrap();
/// tags.add(tag::TITLE, "Rip It Good").unwrap();
/// tags.save().unwrap();
/// ```
pub struct Id3Tags {
	/// # Path.
	path: PathBuf,

	/// # File Handle.
	file: File,

	/// # Mode.
	mode: TagMode,

	/// # Header.
	///
	/// This is `None` for files that had no tag when opened.
	header: Option<Header>,

	/// # Frames.
	frames: Vec<Frame>,
}

impl Id3Tags {
	/// # Open.
	///
	/// Open `path` and parse its leading ID3 tag.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be read, lacks an ID3 tag, or the
	/// tag is malformed or unsupported. Nothing is kept on failure.
	pub fn open<P>(path: P, mode: TagMode) -> Result<Self, RipSvcError>
	where P: AsRef<Path> {
		let out = Self::load(path.as_ref(), mode)?;
		if out.header.is_some() { Ok(out) }
		else { Err(RipSvcError::NotId3) }
	}

	/// # Open or New.
	///
	/// Open `path` read-write. Unlike [`Id3Tags::open`], a file without a tag
	/// is fine; it is treated as an empty tag in front of the audio.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be read, or it has a tag that is
	/// malformed or unsupported.
	pub fn open_or_new<P>(path: P) -> Result<Self, RipSvcError>
	where P: AsRef<Path> {
		Self::load(path.as_ref(), TagMode::ReadWrite)
	}

	/// # Load.
	fn load(path: &Path, mode: TagMode) -> Result<Self, RipSvcError> {
		log::debug!("Reading ID3 tags from {}.", path.display());
		let read_err = || RipSvcError::Read(path.to_string_lossy().into_owned());
		let mut file = File::options()
			.read(true)
			.write(mode.writable())
			.open(path)
			.map_err(|_| read_err())?;

		let header = read_header(&mut file).map_err(|e|
			if matches!(e, RipSvcError::Read(_)) { read_err() } else { e }
		)?;

		let frames = match header {
			Some(h) => {
				log::debug!("Found ID3v2.{}.{} tag, {} bytes.", h.major, h.revision, h.size);
				// The declared size has to fit inside the file.
				let len = file.metadata().map_err(|_| read_err())?.len();
				if len < HEADER_LEN + u64::from(h.size) {
					return Err(RipSvcError::MalformedSize);
				}

				let mut region = Vec::new();
				(&mut file).take(u64::from(h.size))
					.read_to_end(&mut region)
					.map_err(|_| read_err())?;
				if region.len() as u64 != u64::from(h.size) {
					return Err(RipSvcError::MalformedSize);
				}
				read_frames(h.major, &region)?
			},
			None => {
				log::debug!("No ID3 tag; audio starts at byte zero.");
				Vec::new()
			},
		};

		Ok(Self {
			path: path.to_path_buf(),
			file,
			mode,
			header,
			frames,
		})
	}
}

impl Id3Tags {
	#[must_use]
	/// # Path.
	pub fn path(&self) -> &Path { &self.path }

	#[must_use]
	/// # Version.
	///
	/// Return the major version and revision of the tag as last read or
	/// written, if any.
	pub fn version(&self) -> Option<(u8, u8)> {
		self.header.map(|h| (h.major, h.revision))
	}

	/// # Audio Offset.
	///
	/// Where the non-tag data begins.
	fn audio_offset(&self) -> u64 {
		self.header.map_or(0, |h| HEADER_LEN + u64::from(h.size))
	}

	/// # Iterate Pairs.
	///
	/// Lazily walk the name/value pairs, in frame order.
	pub fn iter(&self) -> impl Iterator<Item=(&'static str, &str)> {
		self.frames.iter().flat_map(Frame::entries)
	}

	/// # Pictures.
	pub fn pictures(&self) -> impl Iterator<Item=&Picture> {
		self.frames.iter().filter_map(|f|
			if let FrameBody::Picture(p) = &f.body { Some(p) }
			else { None }
		)
	}

	/// # Add Picture.
	///
	/// The MIME type is stored as a bare Latin-1 string, so it must be
	/// printable ASCII.
	///
	/// ## Errors
	///
	/// Returns an error if the tags are read-only or the MIME type is
	/// invalid.
	pub fn add_picture(&mut self, mime: &str, data: Vec<u8>) -> Result<(), RipSvcError> {
		self.check_writable()?;
		if ! Picture::valid_mime(mime) {
			return Err(RipSvcError::InvalidTagValue("APIC MIME".to_owned(), mime.to_owned()));
		}
		let spec = spec_for_disk_code(4, *b"APIC")?;
		self.frames.push(Frame { spec, body: FrameBody::Picture(Picture::new(mime, data)) });
		Ok(())
	}

	/// # Remove Picture.
	///
	/// Remove and return the picture at `index` (counting pictures only), if
	/// there is one.
	///
	/// ## Errors
	///
	/// Returns an error if the tags are read-only.
	pub fn remove_picture(&mut self, index: usize) -> Result<Option<Picture>, RipSvcError> {
		self.check_writable()?;
		let pos = self.frames.iter()
			.enumerate()
			.filter(|(_, f)| matches!(f.body, FrameBody::Picture(_)))
			.nth(index)
			.map(|(pos, _)| pos);

		Ok(pos.and_then(|pos| match self.frames.remove(pos).body {
			FrameBody::Picture(p) => Some(p),
			_ => None,
		}))
	}

	/// # Clear Pictures.
	///
	/// ## Errors
	///
	/// Returns an error if the tags are read-only.
	pub fn clear_pictures(&mut self) -> Result<(), RipSvcError> {
		self.check_writable()?;
		self.frames.retain(|f| ! matches!(f.body, FrameBody::Picture(_)));
		Ok(())
	}

	/// # Check Writable.
	const fn check_writable(&self) -> Result<(), RipSvcError> {
		if self.mode.writable() { Ok(()) }
		else { Err(RipSvcError::ReadOnly) }
	}

	/// # Frame Position.
	fn position(&self, spec: &'static FrameSpec) -> Option<usize> {
		self.frames.iter().position(|f| std::ptr::eq(f.spec, spec))
	}
}

impl Id3Tags {
	/// # Add Sequence Half.
	fn add_sequence(&mut self, spec: &'static FrameSpec, value: &str)
	-> Result<(), RipSvcError> {
		let name = spec.name.unwrap_or_default();
		if value.is_empty() || value.contains('/') {
			return Err(RipSvcError::InvalidTagValue(name.to_owned(), value.to_owned()));
		}

		let is_number = spec.kind == FrameKind::SequenceNumber;
		let number_spec =
			if is_number { spec }
			else { paired_spec(spec).ok_or_else(|| RipSvcError::UnknownTag(name.to_owned()))? };

		let Some(pos) = self.position(number_spec) else {
			let joined =
				if is_number { join_sequence(Some(value), None) }
				else { join_sequence(None, Some(value)) };
			log::trace!("Adding {} frame {joined:?}.", number_spec.code_str());
			self.frames.push(Frame::text(number_spec, joined));
			return Ok(());
		};

		let FrameBody::Text(text) = &mut self.frames[pos].body else {
			return Err(RipSvcError::MalformedFrame(
				number_spec.code_str(),
				"expected a text frame",
			));
		};

		let (number, total) = split_sequence(text);
		let taken = if is_number { number.is_some() } else { total.is_some() };
		if taken { return Err(RipSvcError::DuplicateTag(name.to_owned())); }

		let joined =
			if is_number { join_sequence(Some(value), total) }
			else { join_sequence(number, Some(value)) };
		log::trace!("Replacing {} frame with {joined:?}.", number_spec.code_str());
		*text = joined;

		Ok(())
	}

	/// # Remove Sequence Half.
	fn remove_sequence(&mut self, spec: &'static FrameSpec) -> Result<(), RipSvcError> {
		let is_number = spec.kind == FrameKind::SequenceNumber;
		let number_spec =
			if is_number { spec }
			else {
				paired_spec(spec)
					.ok_or_else(|| RipSvcError::UnknownTag(spec.name.unwrap_or_default().to_owned()))?
			};

		let Some(pos) = self.position(number_spec) else { return Ok(()); };
		let kept = match &self.frames[pos].body {
			FrameBody::Text(text) => {
				let (number, total) = split_sequence(text);
				let (number, total) = if is_number { (None, total) } else { (number, None) };
				if number.is_none() && total.is_none() { None }
				else { Some(join_sequence(number, total)) }
			},
			_ => None,
		};

		match kept {
			Some(text) => { self.frames[pos].body = FrameBody::Text(text); },
			None => { self.frames.remove(pos); },
		}

		Ok(())
	}

	/// # Write Tag.
	///
	/// Build the complete ID3v2.4 tag (header and padded body).
	fn build_tag(&self) -> Result<(Vec<u8>, u32), RipSvcError> {
		let write_err = || RipSvcError::Write(self.path.to_string_lossy().into_owned());

		// Never shrink the tag.
		let mut body_len: usize = self.frames.iter().map(|f| 10 + f.payload_len()).sum();
		let old_len = self.header.map_or(0, |h| h.size as usize);
		if body_len < old_len { body_len = old_len; }
		if MAX_SIZE < body_len {
			log::error!("ID3 tag too large ({body_len} bytes).");
			return Err(write_err());
		}
		let body_len32 = u32::try_from(body_len).map_err(|_| write_err())?;

		let mut out = Vec::with_capacity(HEADER_LEN as usize + body_len);
		out.extend_from_slice(MAGIC);
		out.extend_from_slice(&[4, 0, 0]);
		out.extend_from_slice(&write_sync_safe_u32(body_len32));
		for frame in &self.frames { frame.write_to(&mut out)?; }
		out.resize(HEADER_LEN as usize + body_len, 0);

		Ok((out, body_len32))
	}
}

impl TagStore for Id3Tags {
	fn mode(&self) -> TagMode { self.mode }

	fn add_raw(&mut self, name: &str, value: &str) -> Result<(), RipSvcError> {
		let spec = spec_for_tag_name(name)?;
		match spec.kind {
			FrameKind::Text | FrameKind::Flag => {
				if spec.kind == FrameKind::Flag && ! matches!(value, "0" | "1") {
					return Err(RipSvcError::InvalidTagValue(name.to_owned(), value.to_owned()));
				}
				if self.position(spec).is_some() {
					return Err(RipSvcError::DuplicateTag(name.to_owned()));
				}
				self.frames.push(Frame::text(spec, value.to_owned()));
				Ok(())
			},
			FrameKind::SequenceNumber | FrameKind::SequenceTotal => self.add_sequence(spec, value),
			FrameKind::Picture | FrameKind::PassThrough | FrameKind::Discard =>
				Err(RipSvcError::UnknownTag(name.to_owned())),
		}
	}

	fn remove_raw(&mut self, name: &str) -> Result<(), RipSvcError> {
		let spec = spec_for_tag_name(name)?;
		match spec.kind {
			FrameKind::Text | FrameKind::Flag => {
				self.frames.retain(|f| ! std::ptr::eq(f.spec, spec));
				Ok(())
			},
			FrameKind::SequenceNumber | FrameKind::SequenceTotal => self.remove_sequence(spec),
			FrameKind::Picture | FrameKind::PassThrough | FrameKind::Discard =>
				Err(RipSvcError::UnknownTag(name.to_owned())),
		}
	}

	fn clear_raw(&mut self) { self.frames.retain(|f| ! f.is_tag()); }

	fn each(&self, visitor: &mut dyn FnMut(&str, &str) -> ControlFlow<()>) -> bool {
		self.iter().all(|(k, v)| visitor(k, v).is_continue())
	}

	/// # Save.
	///
	/// Write a fresh ID3v2.4 tag followed by the original audio data to a
	/// temporary file, then rename it over the original.
	fn save_raw(&mut self) -> Result<(), RipSvcError> {
		log::debug!("Writing ID3 tags to {}.", self.path.display());
		let write_err = || RipSvcError::Write(self.path.to_string_lossy().into_owned());
		let (tag, body_len) = self.build_tag()?;

		let dir = match self.path.parent() {
			Some(p) if ! p.as_os_str().is_empty() => p,
			_ => Path::new("."),
		};
		let mut tmp = tempfile::Builder::new()
			.prefix(".ripservice")
			.tempfile_in(dir)
			.map_err(|_| write_err())?;

		tmp.write_all(&tag).map_err(|_| write_err())?;

		log::debug!("Copying audio data to {}.", tmp.path().display());
		let offset = self.audio_offset();
		self.file.seek(SeekFrom::Start(offset))
			.map_err(|_| RipSvcError::Read(self.path.to_string_lossy().into_owned()))?;
		std::io::copy(&mut self.file, tmp.as_file_mut()).map_err(|_| write_err())?;
		tmp.flush().map_err(|_| write_err())?;

		let perms = self.file.metadata().map_err(|_| write_err())?.permissions();
		std::fs::set_permissions(tmp.path(), perms).map_err(|_| write_err())?;

		log::debug!("Renaming {} to {}.", tmp.path().display(), self.path.display());
		let file = tmp.persist(&self.path).map_err(|_| write_err())?;

		// Point ourselves at the new file so the next save reads the audio
		// from the right place.
		self.file = file;
		self.header.replace(Header { major: 4, revision: 0, size: body_len });
		Ok(())
	}
}



/// # Skip ID3.
///
/// Consume the ID3 tag, if any, at the reader's current position, returning
/// the offset where the audio data begins. Readers without a tag are
/// rewound to where they started.
///
/// ## Errors
///
/// Returns an error if the reader cannot be read or seeked, or the tag
/// header is malformed.
pub fn skip_id3<R>(reader: &mut R) -> Result<u64, RipSvcError>
where R: Read + Seek {
	let io_err = |_| RipSvcError::Read("audio stream".to_owned());
	let start = reader.stream_position().map_err(io_err)?;
	let end = match read_header(reader)? {
		Some(h) => start + HEADER_LEN + u64::from(h.size),
		None => start,
	};
	reader.seek(SeekFrom::Start(end)).map_err(io_err)
}

/// # Read Header.
///
/// Files too short to hold a header are treated the same as files without
/// the magic.
fn read_header<R: Read>(reader: &mut R) -> Result<Option<Header>, RipSvcError> {
	let mut raw = [0_u8; 10];
	match reader.read_exact(&mut raw) {
		Ok(()) => Header::parse(raw),
		Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
		Err(_) => Err(RipSvcError::Read("ID3 header".to_owned())),
	}
}

/// # Read Frames.
fn read_frames(major: u8, region: &[u8]) -> Result<Vec<Frame>, RipSvcError> {
	let mut frames: Vec<Frame> = Vec::new();
	let mut cur = Cursor::new(region);

	while cur.remaining() >= 10 && cur.peek() != Some(0) {
		let Some(head) = cur.take_array::<10>() else { break; };
		let code = [head[0], head[1], head[2], head[3]];
		let spec = spec_for_disk_code(major, code)?;
		log::trace!("Reading ID3 {} frame.", String::from_utf8_lossy(&code));

		let size = [head[4], head[5], head[6], head[7]];
		let size =
			if major == 3 { read_plain_u32_be(size) }
			else { read_sync_safe_u32(size)? };
		if head[8] != 0 || head[9] != 0 {
			return Err(RipSvcError::Id3FrameFlags(spec.code_str()));
		}

		let payload = usize::try_from(size).ok()
			.and_then(|size| cur.take(size))
			.ok_or_else(|| RipSvcError::MalformedFrame(spec.code_str(), "invalid frame size"))?;

		if let Some(frame) = Frame::read(major, spec, payload)? {
			if frame.is_tag() && frames.iter().any(|f| std::ptr::eq(f.spec, spec)) {
				return Err(RipSvcError::DuplicateTag(spec.name.unwrap_or_default().to_owned()));
			}
			frames.push(frame);
		}
	}

	// Anything left over has to be padding.
	if cur.rest().iter().all(|&b| b == 0) { Ok(frames) }
	else { Err(RipSvcError::TrailingJunk) }
}
