/*!
# Rip Service: CLI
*/

use argyle::Argument;
use dactyl::traits::BytesToUnsigned;
use ripservice_core::{
	Disc,
	PathFormat,
	RipOptions,
	RipSvcError,
	Track,
};
use std::path::PathBuf;



#[derive(Debug)]
/// # Command.
pub(super) enum Command {
	/// # Disc Summary.
	Info(Option<PathBuf>),

	/// # Rip Tracks.
	Rip {
		/// # Device.
		dev: Option<PathBuf>,

		/// # Options.
		opts: RipOptions,

		/// # Output Path Format.
		format: PathFormat,

		/// # Raw Track List (Unvalidated).
		tracks: String,
	},

	/// # Print Tags.
	Print(Vec<PathBuf>),

	/// # Edit Tags.
	Tag {
		/// # File.
		file: PathBuf,

		/// # Clear First?
		clear: bool,

		/// # Copy Tags From.
		from: Option<PathBuf>,

		/// # Tags to Remove.
		remove: Vec<String>,

		/// # Tags to Add.
		add: Vec<(String, String)>,
	},
}



/// # Parse Options.
///
/// Return the command and whether or not `-v/--verbose` was set.
pub(super) fn parse() -> Result<(Command, bool), RipSvcError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut cmd = None;
	let mut verbose = false;
	let mut opts = RipOptions::default();
	let mut dev = None;
	let mut tracks = String::new();
	let mut clear = false;
	let mut format = PathFormat::default();
	let mut from = None;
	let mut remove = Vec::new();
	let mut add = Vec::new();
	let mut files = Vec::new();
	for arg in args {
		match arg {
			Argument::Command(s) => { cmd.replace(s); },

			Argument::Key("--clear") => { clear = true; },
			Argument::Key("-h" | "--help") => return Err(RipSvcError::PrintHelp),
			Argument::Key("--raw") => { opts = opts.with_raw(true); },
			Argument::Key("-v" | "--verbose") => { verbose = true; },
			Argument::Key("-V" | "--version") => return Err(RipSvcError::PrintVersion),

			Argument::KeyWithValue("-a" | "--add", s) => { add.push(parse_tag_pair(&s)?); },
			Argument::KeyWithValue("-d" | "--dev", s) => { dev.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("--from", s) => { from.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("-p" | "--path", s) => { format = s.parse()?; },
			Argument::KeyWithValue("-r" | "--remove", s) => { remove.push(s.trim().to_owned()); },
			Argument::KeyWithValue("--speed", s) => {
				let s = u16::btou(s.trim().as_bytes())
					.ok_or(RipSvcError::CliParse("--speed"))?;
				opts = opts.with_speed(Some(s));
			},
			Argument::KeyWithValue("-t" | "--track" | "--tracks", s) => {
				if ! tracks.is_empty() { tracks.push(','); }
				tracks.push_str(&s);
			},

			Argument::Other(s) => { files.push(PathBuf::from(s)); },
			Argument::InvalidUtf8(s) => { files.push(PathBuf::from(s)); },

			// Nothing else is expected.
			_ => {},
		}
	}

	let cmd = match cmd {
		Some("info") => Command::Info(dev),
		Some("rip") => Command::Rip { dev, opts, format, tracks },
		Some("print") =>
			if files.is_empty() { return Err(RipSvcError::Noop); }
			else { Command::Print(files) },
		Some("tag") => {
			let mut files = files.into_iter();
			let file = files.next().ok_or(RipSvcError::Noop)?;
			if let Some(extra) = files.next() {
				return Err(RipSvcError::CliArg(extra.to_string_lossy().into_owned()));
			}
			if ! clear && from.is_none() && remove.is_empty() && add.is_empty() {
				return Err(RipSvcError::Noop);
			}
			Command::Tag { file, clear, from, remove, add }
		},
		_ => return Err(RipSvcError::PrintHelp),
	};

	Ok((cmd, verbose))
}

/// # Parse Tag Pair.
///
/// Split a `NAME=VALUE` pair. The value may be empty; the name may not.
fn parse_tag_pair(src: &str) -> Result<(String, String), RipSvcError> {
	let (k, v) = src.split_once('=').ok_or(RipSvcError::CliParse("-a/--add"))?;
	let k = k.trim();
	if k.is_empty() { Err(RipSvcError::CliParse("-a/--add")) }
	else { Ok((k.to_owned(), v.to_owned())) }
}

/// # Parse Rip Tracks.
///
/// Resolve the `-t/--tracks` list against the disc, or select every audio
/// track if the list is empty.
pub(super) fn parse_rip_option_tracks(disc: &Disc, opts: RipOptions, tracks: &str)
-> Result<RipOptions, RipSvcError> {
	let audio: Vec<u8> = disc.tracks()
		.filter(|t| t.is_audio())
		.map(Track::number)
		.collect();
	select_tracks(parse_track_list(opts, tracks)?, &audio)
}

/// # Parse Track List.
///
/// Add each number or inclusive range from a comma-separated list to the
/// options. Tracks are numbered `1..=99`.
fn parse_track_list(mut opts: RipOptions, tracks: &str) -> Result<RipOptions, RipSvcError> {
	/// # Parse One.
	fn track(src: &str) -> Result<u8, RipSvcError> {
		let v = u8::btou(src.trim().as_bytes()).ok_or(RipSvcError::CliParse("-t/--tracks"))?;
		if (1..=99).contains(&v) { Ok(v) }
		else { Err(RipSvcError::NoTrack(v)) }
	}

	for v in tracks.split(',') {
		let v = v.trim();
		if v.is_empty() { continue; }

		// It might be a range.
		if let Some((a, b)) = v.split_once('-') {
			let a = track(a)?;
			let b = track(b)?;
			if a <= b {
				for idx in a..=b { opts = opts.with_track(idx); }
			}
			else { return Err(RipSvcError::CliParse("-t/--tracks")); }
		}
		// Otherwise it should be a single number.
		else { opts = opts.with_track(track(v)?); }
	}

	Ok(opts)
}

/// # Select Tracks.
///
/// Make sure every requested track is one of the disc's audio tracks, or
/// select all of them if none were requested.
fn select_tracks(mut opts: RipOptions, audio: &[u8]) -> Result<RipOptions, RipSvcError> {
	if opts.has_tracks() {
		for idx in opts.tracks() {
			if ! audio.contains(&idx) { return Err(RipSvcError::NoTrack(idx)); }
		}
	}
	// If no tracks were specified, DO IT ALL.
	else {
		for &idx in audio { opts = opts.with_track(idx); }
		if ! opts.has_tracks() { return Err(RipSvcError::Noop); }
	}

	Ok(opts)
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_parse_tag_pair() {
		assert_eq!(
			parse_tag_pair("TITLE=Hello=World"),
			Ok(("TITLE".to_owned(), "Hello=World".to_owned())),
			"Only the first equals sign splits.",
		);
		assert_eq!(parse_tag_pair("TITLE="), Ok(("TITLE".to_owned(), String::new())));
		assert!(parse_tag_pair("TITLE").is_err(), "Missing equals sign.");
		assert!(parse_tag_pair(" =Hello").is_err(), "Missing name.");
	}

	#[test]
	fn t_parse_track_list() {
		let parse = |src: &str| parse_track_list(RipOptions::default(), src)
			.map(|o| o.tracks().collect::<Vec<u8>>());

		assert_eq!(parse(""), Ok(Vec::new()));
		assert_eq!(parse("3"), Ok(vec![3]));
		assert_eq!(parse(" 5, 2 ,,9"), Ok(vec![2, 5, 9]), "Tracks should be sorted.");
		assert_eq!(parse("2-4"), Ok(vec![2, 3, 4]));
		assert_eq!(parse("4-4"), Ok(vec![4]));
		assert_eq!(parse("1-3,2,3-5"), Ok(vec![1, 2, 3, 4, 5]), "Duplicates should collapse.");
		assert_eq!(parse("98-99"), Ok(vec![98, 99]));

		// Zero and anything past 99 don't exist.
		assert_eq!(parse("0"), Err(RipSvcError::NoTrack(0)));
		assert_eq!(parse("0-2"), Err(RipSvcError::NoTrack(0)));
		assert_eq!(parse("100"), Err(RipSvcError::NoTrack(100)));
		assert_eq!(parse("98-100"), Err(RipSvcError::NoTrack(100)));
		assert_eq!(parse("300"), Err(RipSvcError::CliParse("-t/--tracks")), "Too big for a u8.");

		// Junk.
		for bad in ["a", "1-", "-1", "4-2", "1-2-3", "1.5"] {
			assert_eq!(parse(bad), Err(RipSvcError::CliParse("-t/--tracks")), "{bad:?} should fail.");
		}
	}

	#[test]
	fn t_select_tracks() {
		let audio = [1_u8, 2, 3, 5];
		let select = |src: &str| parse_track_list(RipOptions::default(), src)
			.and_then(|o| select_tracks(o, &audio))
			.map(|o| o.tracks().collect::<Vec<u8>>());

		assert_eq!(select(""), Ok(vec![1, 2, 3, 5]), "No list means every audio track.");
		assert_eq!(select("2-3"), Ok(vec![2, 3]));
		assert_eq!(select("3-5"), Err(RipSvcError::NoTrack(4)), "Track 4 is missing or data.");
		assert_eq!(select("6"), Err(RipSvcError::NoTrack(6)));

		assert_eq!(
			select_tracks(RipOptions::default(), &[]),
			Err(RipSvcError::Noop),
			"Discs without audio have nothing to rip.",
		);
	}
}
