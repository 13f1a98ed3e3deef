/*!
# Rip Service: Errors
*/

use cdtoc::TocError;
#[cfg(feature = "bin")] use fyi_msg::fyi_ansi::{
	ansi,
	csi,
};
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r#"
   .-----.
  /  .-.  \    "#, csi!(199), "Rip Service", ansi!((cornflower_blue) " v", env!("CARGO_PKG_VERSION")), r#"
 |  ( o )  |   Audio CD ripping and
  \  '-'  /    ID3v2 tag editing.
   '-----'

USAGE:
    ripservice <COMMAND> [OPTIONS] [FILE(S)]

COMMANDS:
    info              Print the table of contents, media catalog number, and
                      MusicBrainz disc ID(s) for the disc in the drive.
    rip               Rip audio tracks, naming the files after their tags.
    print             Print the tags of one or more ID3-tagged files.
    tag               Edit the tags of an ID3-tagged file.

DRIVE SETTINGS:
    -d, --dev <PATH>  The device path for the optical drive containing the CD
                      of interest, like /dev/cdrom. [default: auto]

RIP SETTINGS:
    -p, --path <FORMAT>
                      The output path, relative to the current working
                      directory, with the extension added automatically.
                      Tags are inserted with %a (artist), %A (album), %b
                      (album artist), %t (title), %g (genre), %G (grouping),
                      %y (date), %k/%K (track number/total), %d/%D (disc
                      number/total); %% is a literal %. Directories are
                      created as needed. [default: %k]
        --raw         Save raw PCM (.pcm) rather than WAV (.wav) files.
        --speed <NUM> Request a specific read speed from the drive.
                      [default: max]
    -t, --tracks <NUM(s),RNG>
                      Rip one or more specific tracks (rather than the whole
                      disc). Multiple tracks can be separated by commas (2,3),
                      specified as an inclusive range (2-3), and/or given their
                      own -t/--track (-t 2 -t 3). [default: every audio track]

TAG SETTINGS:
        --from <FILE> Replace the tags with those of another ID3-tagged file
                      before applying any other changes.
    -a, --add <NAME=VALUE>
                      Add a tag. May be repeated.
    -r, --remove <NAME>
                      Remove all values of a tag. May be repeated.
        --clear       Remove all tags before applying any additions.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -v, --verbose     Print debug messages to STDERR.
    -V, --version     Print version information to STDOUT and exit.

EARLY EXIT:
    Press "#, ansi!((dark_orange) "CTRL"), "+", ansi!((dark_orange) "C"), r#" to stop a rip early. The track in progress
    will be incomplete, so it is removed.
"#);



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum RipSvcError {
	/// # CDTOC passthrough.
	Cdtoc(TocError),

	/// # CD read error.
	CdRead(u32),

	/// # CD read operation terminal failure.
	CdReadUnsupported,

	/// # Invalid device.
	Device(String),

	/// # Unable to open device.
	DeviceOpen(Option<String>),

	/// # Duplicate tag.
	DuplicateTag(String),

	/// # ID3 frame flags.
	Id3FrameFlags(String),

	/// # ID3 header flags.
	Id3Flags(u8),

	/// # Unsupported ID3 version.
	Id3Version(u8, u8),

	/// # Text decoding failure.
	InvalidEncoding(&'static str),

	/// # Invalid tag name.
	InvalidTagName(String),

	/// # Invalid tag value.
	InvalidTagValue(String, String),

	/// # User Abort.
	Killed,

	/// # Malformed frame payload.
	MalformedFrame(String, &'static str),

	/// # Sync-safe size with a high bit set.
	MalformedSize,

	/// # Malformed table of contents.
	MalformedToc(&'static str),

	/// # Not an ID3 file.
	NotId3,

	/// # Invalid path format.
	PathFormat(String),

	/// # Reading from disk.
	Read(String),

	/// # Tags opened read-only.
	ReadOnly,

	/// # Rip sink closed.
	SinkClosed,

	/// # Drive refused speed change.
	Speed,

	/// # TOC query failed.
	Toc,

	/// # Junk after the last ID3 frame.
	TrailingJunk,

	/// # Unknown ID3 frame.
	UnknownFrame(String),

	/// # Unknown tag.
	UnknownTag(String),

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Noop.
	Noop,

	#[cfg(feature = "bin")]
	/// # No Track.
	NoTrack(u8),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,

	#[cfg(feature = "bin")]
	/// # Unreadable Files (Already Reported).
	Unreadable(usize),
}

impl Error for RipSvcError {}

impl From<TocError> for RipSvcError {
	#[inline]
	fn from(err: TocError) -> Self { Self::Cdtoc(err) }
}

impl From<RipSvcError> for Msg {
	#[inline]
	fn from(src: RipSvcError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipSvcError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Cdtoc(s) => write!(f, "Unable to fingerprint disc: {s}"),
			Self::CdRead(n) => write!(f, "Read error at sector {n}."),
			Self::CdReadUnsupported => f.write_str("Unable to read CD; the drive refused the request."),
			Self::Device(s) => write!(f, "Invalid device path {s}."),
			Self::DeviceOpen(s) =>
				if let Some(s) = s { write!(f, "Unable to open connection with {s}.") }
				else {
					f.write_str("Unable to open connection with default optical drive.")
				},
			Self::DuplicateTag(s) => write!(f, "Only one ID3 {s} tag permitted."),
			Self::Id3FrameFlags(s) => write!(f, "{s}: ID3 frame flags are not supported."),
			Self::Id3Flags(n) => write!(f, "ID3 header flags are not supported ({n:#04x})."),
			Self::Id3Version(a, b) => write!(f, "Unsupported ID3 version 2.{a}.{b}."),
			Self::InvalidEncoding(s) => write!(f, "Invalid {s} data."),
			Self::InvalidTagName(s) => write!(f, "Invalid tag name: {s}."),
			Self::InvalidTagValue(k, v) => write!(f, "Invalid ID3 {k} value: {v:?}."),
			Self::Killed => f.write_str("User abort."),
			Self::MalformedFrame(k, s) => write!(f, "{k}: {s}."),
			Self::MalformedSize => f.write_str("Invalid ID3 size."),
			Self::MalformedToc(s) => write!(f, "Malformed table of contents: {s}."),
			Self::NotId3 => f.write_str("Missing ID3 header."),
			Self::PathFormat(s) => write!(f, "Invalid path format code: {s}."),
			Self::Read(s) => write!(f, "Unable to read from {s}."),
			Self::ReadOnly => f.write_str("Tags opened in read-only mode."),
			Self::SinkClosed => f.write_str("The rip destination closed early."),
			Self::Speed => f.write_str("The drive refused the speed change."),
			Self::Toc => f.write_str("Unable to read the table of contents."),
			Self::TrailingJunk => f.write_str("Junk data after last ID3 frame."),
			Self::UnknownFrame(s) => write!(f, "{s}: invalid ID3 frame type."),
			Self::UnknownTag(s) => write!(f, "No such ID3 tag: {s}."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::Noop => f.write_str("There's nothing to do!"),

			#[cfg(feature = "bin")]
			Self::NoTrack(n) => write!(f, "There is no audio track #{n} on this disc."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Rip Service v", env!("CARGO_PKG_VERSION"))),

			#[cfg(feature = "bin")]
			Self::Unreadable(n) =>
				if *n == 1 { f.write_str("One file could not be read.") }
				else { write!(f, "{n} files could not be read.") },
		}
	}
}
