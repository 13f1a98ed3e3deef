/*!
# Rip Service: Library

This crate covers the two halves of Rip Service:

* Audio CD access: reading a disc's table of contents, fingerprinting its
  sessions for MusicBrainz, and ripping raw CDDA sectors to any [`Write`](std::io::Write)
  sink (e.g. a [`WavSink`]).
* ID3v2 tags: reading ID3v2.3/2.4 tags from a file, editing them through the
  [`TagStore`](tag::TagStore) contract, and saving them back as ID3v2.4.
  Tags can also be built up in memory, copied between stores, and used to
  name files with a [`PathFormat`].
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod cdio;
mod device;
mod disc;
mod encoding;
mod error;
mod format;
mod id3;
mod rip;
pub mod tag;
mod toc;

pub use abort::KillSwitch;
pub use cdio::LibcdioInstance;
pub use device::{
	CdDevice,
	SectorBuf,
};
pub use disc::Disc;
pub use encoding::{
	decode_latin1,
	decode_utf16,
	decode_utf16_bom,
	decode_utf8,
	TextEncoding,
};
pub use error::RipSvcError;
pub use format::PathFormat;
pub use id3::{
	Id3Tags,
	Picture,
	skip_id3,
};
pub use rip::{
	opts::{
		RipOptions,
		RipOptionsTracks,
	},
	Ripper,
	wav::WavSink,
};
pub use toc::{
	lba_to_msf,
	msf_to_lba,
	parse_full_toc,
	Session,
	Track,
	TrackKind,
};



/// # Bytes Per Sample.
///
/// One 16-bit stereo sample.
pub const BYTES_PER_SAMPLE: u16 = 4;

/// # Samples per sector.
pub const SAMPLES_PER_SECTOR: u16 = 588;

/// # Bytes Per Sector.
///
/// This is the number of bytes per sector of _audio_ data.
pub const BYTES_PER_SECTOR: u16 = SAMPLES_PER_SECTOR * BYTES_PER_SAMPLE;

/// # Size of data block.
///
/// Data as in "audio data".
pub const CD_DATA_SIZE: u16 = BYTES_PER_SECTOR;

/// # Number of lead-in sectors.
///
/// All discs have a 2-second region at the start before any data. Different
/// contexts include or exclude this amount, so it's good to keep it handy.
pub const CD_LEADIN: u16 = 150;

/// # Lead-out Label.
///
/// This is used solely for the table of contents printout; e.g. 01 02 03 AA.
pub const CD_LEADOUT_LABEL: &str = "AA";

/// # Wave Spec.
pub(crate) const WAVE_SPEC: hound::WavSpec = hound::WavSpec {
	channels: 2,
	sample_rate: 44100,
	bits_per_sample: 16,
	sample_format: hound::SampleFormat::Int,
};
