/*!
# Rip Service: Disc
*/

use crate::{
	CD_LEADOUT_LABEL,
	CdDevice,
	LibcdioInstance,
	RipSvcError,
	Session,
	tag::{
		self,
		MemoryTags,
		TagStore,
	},
	Track,
	toc::parse_full_toc,
};
use dactyl::NoHash;
use fyi_msg::fyi_ansi::{
	csi,
	dim,
};
use std::{
	collections::HashMap,
	fmt,
	path::Path,
	sync::{
		Mutex,
		MutexGuard,
	},
};



#[derive(Debug)]
/// # Disc.
///
/// A loaded and parsed compact disc.
///
/// The device sits behind a mutex; every query (TOC, MCN, ISRC, sector read,
/// speed) goes through it, so a `Disc` can be shared across threads without
/// its device calls ever interleaving.
pub struct Disc<D: CdDevice = LibcdioInstance> {
	/// # Device.
	dev: Mutex<D>,

	/// # Media Catalog Number.
	mcn: String,

	/// # Sessions.
	sessions: Vec<Session>,

	/// # Track ISRCs (Lazy).
	isrcs: Mutex<HashMap<u8, Option<String>, NoHash>>,
}

impl<D: CdDevice> fmt::Display for Disc<D> {
	/// # Summarize the Disc.
	///
	/// This prints the disc identifiers and table of contents in a nice
	/// little table.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		/// # Divider.
		const DIVIDER: &str = dim!("----------------------------------------\n");

		// A few key/value pairs.
		let mut kv: Vec<(String, &str, String)> = Vec::new();
		if ! self.mcn.is_empty() {
			kv.push(("MCN:".to_owned(), csi!(bold, 199), self.mcn.clone()));
		}
		for s in &self.sessions {
			kv.push((
				if self.sessions.len() == 1 { "MusicBrainz:".to_owned() }
				else { format!("MusicBrainz #{}:", s.number()) },
				csi!(bold, blue),
				s.musicbrainz_id().to_owned(),
			));
		}

		let col_max: usize = kv.iter().map(|(k, _, _)| k.len()).max().unwrap_or(0);
		for (k, color, v) in kv {
			writeln!(
				f,
				concat!("{color}{k:col_max$}", csi!(), " {v}"),
				color=color,
				k=k,
				col_max=col_max,
				v=v,
			)?;
		}

		// Pull the ISRCs first; the cache may need the device.
		let isrcs: Vec<Option<String>> = self.tracks()
			.map(|t| if t.is_audio() { self.isrc(t.number()) } else { None })
			.collect();

		// Start the table of contents.
		write!(
			f,
			dim!("\n##   FIRST    LAST  LENGTH          {}\n"),
			if isrcs.iter().all(Option::is_none) { "" } else { "ISRC" },
		)?;
		f.write_str(DIVIDER)?;

		let mut isrcs = isrcs.into_iter();
		for s in &self.sessions {
			for t in s.tracks() {
				let isrc = isrcs.next().flatten().unwrap_or_default();
				if t.is_audio() {
					writeln!(
						f,
						"{:02}  {:>6}  {:>6}  {:>6}  {isrc:>12}",
						t.number(),
						t.sector_begin(),
						t.sector_end() - 1,
						t.sectors(),
					)?;
				}
				else {
					writeln!(
						f,
						dim!("{:02}  {:>6}  {:>6}  {:>6}    DATA TRACK"),
						t.number(),
						t.sector_begin(),
						t.sector_end() - 1,
						t.sectors(),
					)?;
				}
			}

			// The leadout.
			writeln!(
				f,
				concat!(csi!(dim), "{}  {:>6}                      LEAD-OUT", csi!()),
				CD_LEADOUT_LABEL,
				s.lead_out(),
			)?;
		}

		// Close it off!
		f.write_str(DIVIDER)?;
		writeln!(f)
	}
}

impl Disc<LibcdioInstance> {
	/// # New.
	///
	/// Open the optical drive (or the default one) and read the disc.
	///
	/// ## Errors
	///
	/// This will return an error if there's a problem communicating with the
	/// drive, or the table of contents doesn't make sense.
	pub fn new<P>(dev: Option<P>) -> Result<Self, RipSvcError>
	where P: AsRef<Path> {
		let cdio = LibcdioInstance::new(dev)?;
		Self::from_device(cdio)
	}
}

impl<D: CdDevice> Disc<D> {
	/// # From Device.
	///
	/// Read the MCN and table of contents from an already-open device.
	///
	/// ## Errors
	///
	/// Returns an error if the TOC cannot be read or parsed, or a session
	/// cannot be fingerprinted.
	pub fn from_device(mut dev: D) -> Result<Self, RipSvcError> {
		let mcn = dev.read_mcn().unwrap_or_default();
		let raw = dev.read_toc()?;
		let sessions = parse_full_toc(&raw)?;
		log::debug!(
			"Read TOC: {} session(s), {} track(s).",
			sessions.len(),
			sessions.iter().map(|s| s.tracks().len()).sum::<usize>(),
		);

		Ok(Self {
			dev: Mutex::new(dev),
			mcn,
			sessions,
			isrcs: Mutex::new(HashMap::with_hasher(NoHash::default())),
		})
	}
}

impl<D: CdDevice> Disc<D> {
	#[must_use]
	/// # Media Catalog Number.
	///
	/// This is empty if the disc doesn't have one.
	pub fn mcn(&self) -> &str { &self.mcn }

	#[must_use]
	/// # Sessions.
	pub fn sessions(&self) -> &[Session] { &self.sessions }

	/// # Tracks.
	///
	/// Every track from every session, in order.
	pub fn tracks(&self) -> impl Iterator<Item=&Track> {
		self.sessions.iter().flat_map(Session::tracks)
	}

	#[must_use]
	/// # Track.
	pub fn track(&self, number: u8) -> Option<&Track> {
		self.tracks().find(|t| t.number() == number)
	}

	#[must_use]
	/// # ISRC.
	///
	/// Fetch the ISRC for a track. Results, including misses, are cached so
	/// the drive is only asked once.
	pub fn isrc(&self, number: u8) -> Option<String> {
		if self.track(number).is_none() { return None; }

		let mut cache = self.isrcs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
		cache.entry(number)
			.or_insert_with(|| self.with_device(|d| d.read_isrc(number)))
			.clone()
	}

	#[must_use]
	/// # Track Tags.
	///
	/// Collect what the disc itself knows about a track: its number, the
	/// number of tracks in its session, the session's MusicBrainz ID, the
	/// MCN and ISRC (if any), and the encoder.
	///
	/// Returns `None` if the track doesn't exist.
	pub fn tags(&self, number: u8) -> Option<MemoryTags> {
		let track = self.track(number)?;
		let session = self.sessions.iter().find(|s| s.number() == track.session())?;

		let mut out = MemoryTags::new();
		let pairs = [
			(tag::ENCODER, concat!("ripservice ", env!("CARGO_PKG_VERSION")).to_owned()),
			(tag::MUSICBRAINZ_DISCID, session.musicbrainz_id().to_owned()),
			(tag::TRACKNUMBER, number.to_string()),
			(tag::TRACKTOTAL, session.tracks().len().to_string()),
			(tag::MCN, self.mcn.clone()),
			(tag::ISRC, self.isrc(number).unwrap_or_default()),
		];
		for (k, v) in pairs {
			if v.is_empty() { continue; }
			if let Err(e) = out.add(k, &v) {
				log::warn!("Track {number:02}: unable to tag {k} ({e}).");
			}
		}

		Some(out)
	}

	/// # With Device.
	///
	/// Run a callback with exclusive access to the device.
	pub(crate) fn with_device<F, T>(&self, cb: F) -> T
	where F: FnOnce(&mut D) -> T {
		let mut guard: MutexGuard<'_, D> = self.dev.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner);
		cb(&mut guard)
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		device::memory::MemoryDevice,
		toc::test_toc,
		TrackKind,
	};
	use std::sync::atomic::Ordering::SeqCst;

	/// # Simple Disc.
	fn disc() -> Disc<MemoryDevice> {
		let mut dev = MemoryDevice::new(test_toc(&[
			(&[(1, 0, 0), (2, 0, 300), (3, 0, 600)], 1000),
			(&[(4, 0x04, 12_400)], 20_000),
		]));
		dev.mcn.replace("0123456789012".to_owned());
		dev.isrcs.push((2, "USABC1234567".to_owned()));
		Disc::from_device(dev).expect("Disc failed.")
	}

	#[test]
	fn t_sync() {
		fn is_sync<T: Sync + Send>() {}
		is_sync::<Disc<MemoryDevice>>();
		is_sync::<Disc>();
	}

	#[test]
	fn t_disc() {
		let disc = disc();
		assert_eq!(disc.mcn(), "0123456789012");
		assert_eq!(disc.sessions().len(), 2);
		assert_eq!(disc.tracks().count(), 4);

		let t = disc.track(4).expect("Missing track 4.");
		assert_eq!(t.kind(), TrackKind::Data);
		assert_eq!(t.session(), 2);
		assert!(disc.track(5).is_none());

		for s in disc.sessions() {
			assert_eq!(
				s.tracks().last().map(Track::sector_end),
				Some(s.lead_out()),
				"The last track should end at the lead-out.",
			);
			assert!(! s.musicbrainz_id().is_empty(), "Missing fingerprint.");
		}
	}

	#[test]
	fn t_isrc() {
		let disc = disc();
		let reads = disc.with_device(|d| d.isrc_reads.clone());

		assert_eq!(disc.isrc(2).as_deref(), Some("USABC1234567"));
		assert_eq!(disc.isrc(2).as_deref(), Some("USABC1234567"));
		assert_eq!(disc.isrc(1), None);
		assert_eq!(disc.isrc(1), None);
		assert_eq!(reads.load(SeqCst), 2, "ISRCs should be cached.");

		// Tracks that don't exist never hit the drive.
		assert_eq!(disc.isrc(50), None);
		assert_eq!(reads.load(SeqCst), 2);
	}

	#[test]
	fn t_tags() {
		let disc = disc();
		let session = disc.sessions()[0].musicbrainz_id().to_owned();

		let tags = disc.tags(2).expect("Missing track 2.");
		assert_eq!(
			tags.pairs(),
			vec![
				(tag::ENCODER.to_owned(), concat!("ripservice ", env!("CARGO_PKG_VERSION")).to_owned()),
				(tag::MUSICBRAINZ_DISCID.to_owned(), session),
				(tag::TRACKNUMBER.to_owned(), "2".to_owned()),
				(tag::TRACKTOTAL.to_owned(), "3".to_owned()),
				(tag::MCN.to_owned(), "0123456789012".to_owned()),
				(tag::ISRC.to_owned(), "USABC1234567".to_owned()),
			],
		);

		// Track one has no ISRC; track four lives in the second session.
		let tags = disc.tags(1).expect("Missing track 1.");
		assert_eq!(tags.count(tag::ISRC), 0, "Missing ISRCs should be skipped.");
		let tags = disc.tags(4).expect("Missing track 4.");
		assert_eq!(tags.find(tag::TRACKTOTAL), vec!["1".to_owned()]);
		assert_eq!(
			tags.find(tag::MUSICBRAINZ_DISCID),
			vec![disc.sessions()[1].musicbrainz_id().to_owned()],
		);

		assert!(disc.tags(9).is_none(), "Track 9 doesn't exist.");
	}

	#[test]
	fn t_no_mcn() {
		let dev = MemoryDevice::new(test_toc(&[(&[(1, 0, 0)], 500)]));
		let disc = Disc::from_device(dev).expect("Disc failed.");
		assert_eq!(disc.mcn(), "", "Missing MCNs should be empty.");
	}

	#[test]
	fn t_bad_toc() {
		let dev = MemoryDevice::new(Vec::new());
		assert_eq!(Disc::from_device(dev).err(), Some(RipSvcError::Toc));

		let mut raw = test_toc(&[(&[(1, 0, 0)], 500)]);
		raw.truncate(10);
		let dev = MemoryDevice::new(raw);
		assert!(matches!(Disc::from_device(dev), Err(RipSvcError::MalformedToc(_))));
	}

	#[test]
	fn t_display() {
		let out = disc().to_string();
		assert!(out.contains("0123456789012"), "Missing MCN.");
		assert!(out.contains("USABC1234567"), "Missing ISRC.");
		assert!(out.contains("DATA TRACK"), "Missing data track.");
		assert_eq!(out.matches("LEAD-OUT").count(), 2, "Each session has a lead-out.");
	}
}
