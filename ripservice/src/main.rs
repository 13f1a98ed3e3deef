/*!
# Rip Service
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]



mod cli;
mod logger;

use cli::Command;
use dactyl::{
	NiceElapsed,
	traits::NiceInflection,
};
use fyi_msg::{
	fyi_ansi::{
		ansi,
		csi,
		dim,
	},
	Msg,
	Progless,
};
use oxford_join::JoinFmt;
use ripservice_core::{
	Disc,
	Id3Tags,
	KillSwitch,
	PathFormat,
	RipOptions,
	Ripper,
	RipSvcError,
	tag::{
		TagMode,
		TagStore,
	},
	WavSink,
};
use std::{
	fs::File,
	io::{
		BufWriter,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
	process::ExitCode,
	time::Instant,
};



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e @ (RipSvcError::PrintHelp | RipSvcError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<(), RipSvcError> {
	let (cmd, verbose) = cli::parse()?;
	logger::init(verbose);

	match cmd {
		Command::Info(dev) => {
			let disc = Disc::new(dev)?;
			eprintln!("{disc}");
			Ok(())
		},
		Command::Rip { dev, opts, format, tracks } => {
			let disc = Disc::new(dev)?;
			let opts = cli::parse_rip_option_tracks(&disc, opts, &tracks)?;
			eprintln!("{disc}");
			rip(&disc, &opts, &format)
		},
		Command::Print(files) => print_all(&files),
		Command::Tag { file, clear, from, remove, add } =>
			tag(&file, clear, from.as_deref(), &remove, &add),
	}
}

/// # Rip.
///
/// Rip each selected track to a `.wav` (or `.pcm`) file named after the
/// disc's tags for it. Incomplete files are removed.
fn rip(disc: &Disc, opts: &RipOptions, format: &PathFormat) -> Result<(), RipSvcError> {
	let now = Instant::now();
	let killed = KillSwitch::from(Progless::sigint_keepalive());
	let progress = Progless::default();
	let ripper = Ripper::new(disc, opts);
	let ext = if opts.raw() { "pcm" } else { "wav" };

	let mut saved = Vec::new();
	for num in opts.tracks() {
		let (Some(track), Some(tags)) = (disc.track(num), disc.tags(num)) else { continue; };
		let dst = PathBuf::from(format.format(&tags, Some(ext)));
		let dst_str = dst.to_string_lossy().into_owned();
		let write_err = || RipSvcError::Write(dst_str.clone());

		let res = create_new(&dst).and_then(|file| {
			let res =
				if opts.raw() {
					let mut sink = BufWriter::new(file);
					ripper.rip(track, &mut sink, &killed, Some(&progress))
						.and_then(|_| sink.flush().map_err(|_| write_err()))
				}
				else {
					WavSink::new(BufWriter::new(file)).and_then(|mut sink| {
						ripper.rip(track, &mut sink, &killed, Some(&progress))?;
						sink.finish()
					})
				};

			// Only clean up files we created.
			if res.is_err() { let _res = std::fs::remove_file(&dst); }
			res
		});

		progress.finish();
		if let Err(e) = res {
			if ! saved.is_empty() { summarize(&saved, now); }
			return Err(e);
		}

		log::debug!("Saved {dst_str}.");
		saved.push(dst_str);
	}

	summarize(&saved, now);
	Ok(())
}

/// # Create Output File.
///
/// Make any missing parent directories, then create the file. Existing
/// files are never overwritten.
fn create_new(dst: &Path) -> Result<File, RipSvcError> {
	let err = || RipSvcError::Write(dst.to_string_lossy().into_owned());
	if let Some(parent) = dst.parent().filter(|p| ! p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent).map_err(|_| err())?;
	}
	File::options()
		.write(true)
		.create_new(true)
		.open(dst)
		.map_err(|_| err())
}

/// # Rip Summary.
fn summarize(saved: &[String], now: Instant) {
	Msg::success(format!(
		concat!("Ripped {} in {}.", csi!(dim), " ({})"),
		saved.len().nice_inflect("track", "tracks"),
		NiceElapsed::from(now.elapsed()),
		JoinFmt::new(saved.iter(), ", "),
	)).eprint();
}

/// # Print All Tags.
///
/// Each failure is reported as it happens; the error returned at the end
/// only carries the count.
fn print_all(files: &[PathBuf]) -> Result<(), RipSvcError> {
	let mut failed = 0;
	for file in files {
		if let Err(e) = print(file) {
			Msg::error(format!("{}: {e}", file.display())).eprint();
			failed += 1;
		}
	}

	if failed == 0 { Ok(()) }
	else { Err(RipSvcError::Unreadable(failed)) }
}

/// # Print Tags.
fn print(file: &Path) -> Result<(), RipSvcError> {
	let tags = Id3Tags::open(file, TagMode::ReadOnly)?;

	let (major, revision) = tags.version().unwrap_or((4, 0));
	println!(
		concat!(ansi!((bold, 199) "{}"), dim!(" (ID3v2.{}.{})")),
		file.display(),
		major,
		revision,
	);

	let pairs = tags.pairs();
	let col_max: usize = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
	for (k, v) in pairs {
		println!(concat!("  ", csi!(dim), "{k:col_max$}", csi!(), "  {v}"), k=k, v=v, col_max=col_max);
	}
	for p in tags.pictures() {
		println!(
			dim!("  [picture: {}, {} bytes]"),
			if p.mime().is_empty() { "unknown" } else { p.mime() },
			p.data().len(),
		);
	}
	println!();

	Ok(())
}

/// # Edit Tags.
///
/// Copy (or clear), remove, then add, and save once at the end.
fn tag(
	file: &Path,
	clear: bool,
	from: Option<&Path>,
	remove: &[String],
	add: &[(String, String)],
) -> Result<(), RipSvcError> {
	let mut tags = Id3Tags::open_or_new(file)?;
	if let Some(src) = from {
		let src = Id3Tags::open(src, TagMode::ReadOnly)?;
		tags.copy_from(&src)?;
	}
	else if clear { tags.clear()?; }
	for k in remove { tags.remove(k)?; }
	for (k, v) in add { tags.add(k, v)?; }
	tags.save()?;

	Msg::success(format!("Updated {}.", file.display())).eprint();
	Ok(())
}
