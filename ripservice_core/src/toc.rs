/*!
# Rip Service: Table of Contents
*/

use crate::{
	CD_LEADIN,
	RipSvcError,
};
use std::ops::RangeInclusive;



/// # Descriptor Length.
const DESCRIPTOR_LEN: usize = 11;

/// # Point: First Track.
const POINT_FIRST: u8 = 0xA0;

/// # Point: Last Track.
const POINT_LAST: u8 = 0xA1;

/// # Point: Lead-out.
const POINT_LEADOUT: u8 = 0xA2;

/// # Control: Pre-emphasis.
const CONTROL_PRE_EMPHASIS: u8 = 0x01;

/// # Control: Copy Permitted.
const CONTROL_COPY: u8 = 0x02;

/// # Control: Data Track.
const CONTROL_DATA: u8 = 0x04;

/// # Control: Four Channels.
const CONTROL_FOUR_CHANNEL: u8 = 0x08;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Track Kind.
pub enum TrackKind {
	/// # Audio.
	Audio,

	/// # Data.
	Data,
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track.
///
/// One track of a disc. Sector positions exclude the lead-in.
pub struct Track {
	number: u8,
	session: u8,
	kind: TrackKind,
	sector_begin: u32,
	sector_end: u32,
	control: u8,
}

impl Track {
	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Session Number.
	pub const fn session(&self) -> u8 { self.session }

	#[must_use]
	/// # Kind.
	pub const fn kind(&self) -> TrackKind { self.kind }

	#[must_use]
	/// # Audio?
	pub const fn is_audio(&self) -> bool { matches!(self.kind, TrackKind::Audio) }

	#[must_use]
	/// # First Sector.
	pub const fn sector_begin(&self) -> u32 { self.sector_begin }

	#[must_use]
	/// # End Sector (Exclusive).
	pub const fn sector_end(&self) -> u32 { self.sector_end }

	#[must_use]
	/// # Sector Count.
	pub const fn sectors(&self) -> u32 { self.sector_end - self.sector_begin }

	#[must_use]
	/// # Sample Count.
	pub const fn samples(&self) -> u64 {
		self.sectors() as u64 * crate::SAMPLES_PER_SECTOR as u64
	}

	#[must_use]
	/// # Byte Count.
	pub const fn bytes(&self) -> u64 {
		self.sectors() as u64 * crate::CD_DATA_SIZE as u64
	}

	#[must_use]
	/// # Channels.
	pub const fn channels(&self) -> u8 {
		if CONTROL_FOUR_CHANNEL == self.control & CONTROL_FOUR_CHANNEL { 4 }
		else { 2 }
	}

	#[must_use]
	/// # Copy Permitted?
	pub const fn copy_permitted(&self) -> bool {
		CONTROL_COPY == self.control & CONTROL_COPY
	}

	#[must_use]
	/// # Pre-emphasis?
	pub const fn pre_emphasis(&self) -> bool {
		CONTROL_PRE_EMPHASIS == self.control & CONTROL_PRE_EMPHASIS
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Session.
///
/// A run of tracks and the lead-out that closes them.
pub struct Session {
	number: u8,
	lead_out: u32,
	tracks: Vec<Track>,
	musicbrainz: String,
}

impl Session {
	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Lead-out Sector.
	pub const fn lead_out(&self) -> u32 { self.lead_out }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[Track] { &self.tracks }

	#[must_use]
	/// # MusicBrainz Disc ID.
	pub fn musicbrainz_id(&self) -> &str { &self.musicbrainz }

	/// # Fingerprint.
	///
	/// Compute the MusicBrainz ID from the track offsets. Every track counts,
	/// data or not.
	fn fingerprint(&mut self) -> Result<(), RipSvcError> {
		let starts: Vec<u32> = self.tracks.iter()
			.map(|t| t.sector_begin + u32::from(CD_LEADIN))
			.collect();
		let toc = cdtoc::Toc::from_parts(starts, None, self.lead_out + u32::from(CD_LEADIN))?;
		self.musicbrainz = toc.musicbrainz_id().to_string();
		Ok(())
	}
}



/// # Parse Full TOC.
///
/// Decode a raw MMC full TOC into sessions and tracks, fingerprinting each
/// session along the way.
///
/// ## Errors
///
/// Returns an error if the buffer is truncated, references unknown
/// sessions, or describes tracks that don't add up.
pub fn parse_full_toc(raw: &[u8]) -> Result<Vec<Session>, RipSvcError> {
	let [a, b, first, last, rest @ ..] = raw else {
		return Err(RipSvcError::MalformedToc("buffer too short"));
	};

	// The length counts everything after itself.
	let len = usize::from(u16::from_be_bytes([*a, *b]));
	let body = len.checked_sub(2)
		.and_then(|len| rest.get(..len))
		.ok_or(RipSvcError::MalformedToc("buffer too short"))?;
	if body.len() % DESCRIPTOR_LEN != 0 {
		return Err(RipSvcError::MalformedToc("partial descriptor"));
	}
	if last < first { return Err(RipSvcError::MalformedToc("bad session range")); }
	let session_range: RangeInclusive<u8> = *first..=*last;

	let mut sessions: Vec<Partial> = session_range.clone().map(Partial::new).collect();
	let mut tracks: Vec<Track> = Vec::new();

	for d in body.chunks_exact(DESCRIPTOR_LEN) {
		let session = d[0];
		let adr = d[1] >> 4;
		let control = d[1] & 0x0F;
		let point = d[3];
		if adr != 1 { continue; }

		if ! session_range.contains(&session) {
			return Err(RipSvcError::MalformedToc("unknown session"));
		}
		let partial = &mut sessions[usize::from(session - first)];

		match point {
			1..=99 => {
				let sector_begin = msf_to_lba(d[8], d[9], d[10])
					.ok_or(RipSvcError::MalformedToc("track inside lead-in"))?;
				log::trace!("Track {point:02}: session {session}, sector {sector_begin}, control {control:#x}.");
				tracks.push(Track {
					number: point,
					session,
					kind:
						if CONTROL_DATA == control & CONTROL_DATA { TrackKind::Data }
						else { TrackKind::Audio },
					sector_begin,
					sector_end: 0,
					control,
				});
			},
			POINT_FIRST => { partial.first.replace(d[8]); },
			POINT_LAST => { partial.last.replace(d[8]); },
			POINT_LEADOUT => {
				let lead_out = msf_to_lba(d[8], d[9], d[10])
					.ok_or(RipSvcError::MalformedToc("lead-out inside lead-in"))?;
				partial.lead_out.replace(lead_out);
			},
			_ => {},
		}
	}

	tracks.sort_by_key(Track::number);
	if tracks.windows(2).any(|w| w[0].number == w[1].number) {
		return Err(RipSvcError::MalformedToc("duplicate track"));
	}

	sessions.into_iter()
		.map(|p| p.finish(&tracks))
		.collect()
}

/// # MSF to LBA.
///
/// Convert a minute/second/frame address to a sector, minus the lead-in.
/// Addresses inside the lead-in return `None`.
#[must_use]
pub const fn msf_to_lba(m: u8, s: u8, f: u8) -> Option<u32> {
	let abs = (m as u32 * 60 + s as u32) * 75 + f as u32;
	abs.checked_sub(CD_LEADIN as u32)
}

/// # LBA to MSF.
///
/// The inverse of [`msf_to_lba`]. Sectors too large for a one-byte minute
/// return `None`.
#[must_use]
pub fn lba_to_msf(lba: u32) -> Option<(u8, u8, u8)> {
	let abs = lba.checked_add(u32::from(CD_LEADIN))?;
	let m = u8::try_from(abs / (60 * 75)).ok()?;
	let s = ((abs / 75) % 60) as u8;
	let f = (abs % 75) as u8;
	Some((m, s, f))
}



#[derive(Debug)]
/// # Partial Session.
///
/// The session details collected while walking the descriptors.
struct Partial {
	number: u8,
	first: Option<u8>,
	last: Option<u8>,
	lead_out: Option<u32>,
}

impl Partial {
	/// # New.
	const fn new(number: u8) -> Self {
		Self { number, first: None, last: None, lead_out: None }
	}

	/// # Finish.
	///
	/// Gather this session's tracks, close their sector ranges, and
	/// fingerprint the result.
	fn finish(self, all: &[Track]) -> Result<Session, RipSvcError> {
		let lead_out = self.lead_out.ok_or(RipSvcError::MalformedToc("missing lead-out"))?;
		let mut tracks: Vec<Track> = all.iter()
			.filter(|t| t.session == self.number)
			.cloned()
			.collect();
		let (Some(first_track), Some(last_track)) = (tracks.first(), tracks.last()) else {
			return Err(RipSvcError::MalformedToc("empty session"));
		};

		if
			self.first.is_some_and(|n| n != first_track.number) ||
			self.last.is_some_and(|n| n != last_track.number)
		{
			return Err(RipSvcError::MalformedToc("track range mismatch"));
		}

		// Each track ends where the next begins; the last ends at the
		// lead-out.
		let ends: Vec<u32> = tracks.iter()
			.skip(1)
			.map(Track::sector_begin)
			.chain(std::iter::once(lead_out))
			.collect();
		for (t, end) in tracks.iter_mut().zip(ends) {
			if end <= t.sector_begin {
				return Err(RipSvcError::MalformedToc("track ends before it begins"));
			}
			t.sector_end = end;
		}

		let mut out = Session {
			number: self.number,
			lead_out,
			tracks,
			musicbrainz: String::new(),
		};
		out.fingerprint()?;
		log::debug!("Session {}: MusicBrainz ID {}.", out.number, out.musicbrainz);
		Ok(out)
	}
}



#[derive(Debug, Default)]
/// # Full TOC Writer.
///
/// Assemble a raw full TOC buffer from track and session details. Drivers
/// that can't hand over the raw table use this to synthesize one.
pub(crate) struct FullTocWriter {
	descriptors: Vec<[u8; DESCRIPTOR_LEN]>,
}

impl FullTocWriter {
	/// # Push Descriptor.
	fn push(&mut self, session: u8, control: u8, point: u8, pmsf: (u8, u8, u8)) {
		self.descriptors.push([
			session,
			(1 << 4) | (control & 0x0F),
			0,
			point,
			0, 0, 0, 0,
			pmsf.0, pmsf.1, pmsf.2,
		]);
	}

	/// # Push Track.
	///
	/// ## Errors
	///
	/// Returns an error if the sector is out of range.
	pub(crate) fn push_track(&mut self, session: u8, number: u8, control: u8, lba: u32)
	-> Result<(), RipSvcError> {
		let msf = lba_to_msf(lba).ok_or(RipSvcError::MalformedToc("sector out of range"))?;
		self.push(session, control, number, msf);
		Ok(())
	}

	/// # Push Session.
	///
	/// Add the first-track, last-track and lead-out descriptors.
	///
	/// ## Errors
	///
	/// Returns an error if the lead-out is out of range.
	pub(crate) fn push_session(&mut self, session: u8, first: u8, last: u8, lead_out: u32)
	-> Result<(), RipSvcError> {
		let msf = lba_to_msf(lead_out).ok_or(RipSvcError::MalformedToc("sector out of range"))?;
		self.push(session, 0, POINT_FIRST, (first, 0, 0));
		self.push(session, 0, POINT_LAST, (last, 0, 0));
		self.push(session, 0, POINT_LEADOUT, msf);
		Ok(())
	}

	/// # Finish.
	///
	/// ## Errors
	///
	/// Returns an error if there are no descriptors, or too many to fit.
	pub(crate) fn finish(self) -> Result<Vec<u8>, RipSvcError> {
		let first = self.descriptors.iter().map(|d| d[0]).min()
			.ok_or(RipSvcError::MalformedToc("no descriptors"))?;
		let last = self.descriptors.iter().map(|d| d[0]).max().unwrap_or(first);
		let len = u16::try_from(self.descriptors.len() * DESCRIPTOR_LEN + 2)
			.map_err(|_| RipSvcError::MalformedToc("too many descriptors"))?;

		let mut out = Vec::with_capacity(usize::from(len) + 2);
		out.extend_from_slice(&len.to_be_bytes());
		out.push(first);
		out.push(last);
		for d in self.descriptors { out.extend_from_slice(&d); }
		Ok(out)
	}
}



#[cfg(test)]
/// # Build a TOC.
///
/// Each session is a list of `(number, control, start)` tracks and a
/// lead-out.
pub(crate) fn test_toc(sessions: &[(&[(u8, u8, u32)], u32)]) -> Vec<u8> {
	let mut w = FullTocWriter::default();
	for (idx, (tracks, lead_out)) in sessions.iter().enumerate() {
		let session = idx as u8 + 1;
		for &(number, control, start) in *tracks {
			w.push_track(session, number, control, start).expect("Bad track.");
		}
		let first = tracks.first().map_or(0, |t| t.0);
		let last = tracks.last().map_or(0, |t| t.0);
		w.push_session(session, first, last, *lead_out).expect("Bad session.");
	}
	w.finish().expect("Bad TOC.")
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_msf() {
		assert_eq!(msf_to_lba(0, 2, 0), Some(0));
		assert_eq!(msf_to_lba(0, 1, 74), None, "Lead-in addresses have no LBA.");
		assert_eq!(msf_to_lba(1, 0, 0), Some(4350));
		for lba in [0, 1, 74, 75, 4350, 225_000, 359_849] {
			let (m, s, f) = lba_to_msf(lba).expect("MSF conversion failed.");
			assert_eq!(msf_to_lba(m, s, f), Some(lba), "Round trip failed for {lba}.");
		}
	}

	#[test]
	fn t_sector_ends() {
		let raw = test_toc(&[(&[(1, 0, 0), (2, 0, 300), (3, 0, 600)], 1000)]);
		let sessions = parse_full_toc(&raw).expect("Parse failed.");
		assert_eq!(sessions.len(), 1);

		let s = &sessions[0];
		assert_eq!(s.number(), 1);
		assert_eq!(s.lead_out(), 1000);
		let ranges: Vec<(u8, u32, u32)> = s.tracks().iter()
			.map(|t| (t.number(), t.sector_begin(), t.sector_end()))
			.collect();
		assert_eq!(ranges, vec![(1, 0, 300), (2, 300, 600), (3, 600, 1000)]);
		assert_eq!(s.tracks().last().map(Track::sector_end), Some(s.lead_out()));
		assert_eq!(s.tracks()[0].sectors(), 300);
		assert_eq!(s.tracks()[0].samples(), 300 * 588);
		assert_eq!(s.tracks()[0].bytes(), 300 * 2352);
	}

	#[test]
	fn t_control() {
		let raw = test_toc(&[
			(&[(1, 0x01, 0), (2, 0x02, 100), (3, 0x08, 200)], 300),
			(&[(4, 0x04, 11_700)], 20_000),
		]);
		let sessions = parse_full_toc(&raw).expect("Parse failed.");
		assert_eq!(sessions.len(), 2);

		let t = &sessions[0].tracks();
		assert!(t[0].pre_emphasis() && ! t[0].copy_permitted());
		assert!(t[1].copy_permitted() && ! t[1].pre_emphasis());
		assert_eq!(t[2].channels(), 4);
		assert_eq!(t[1].channels(), 2);
		assert!(t.iter().all(Track::is_audio));

		let t = &sessions[1].tracks()[0];
		assert_eq!(t.kind(), TrackKind::Data);
		assert_eq!(t.session(), 2);
		assert_eq!((t.sector_begin(), t.sector_end()), (11_700, 20_000));
	}

	#[test]
	fn t_fingerprint() {
		let raw = test_toc(&[(&[(1, 0, 0), (2, 0, 11_413), (3, 0, 25_024), (4, 0, 45_713)], 55_220)]);
		let sessions = parse_full_toc(&raw).expect("Parse failed.");
		let expected = cdtoc::Toc::from_cdtoc("4+96+2D2B+6256+B327+D84A")
			.expect("Bad CDTOC.")
			.musicbrainz_id()
			.to_string();
		assert_eq!(sessions[0].musicbrainz_id(), expected);
	}

	#[test]
	fn t_malformed() {
		assert_eq!(parse_full_toc(&[0, 2, 1]), Err(RipSvcError::MalformedToc("buffer too short")));

		// Length claims more than we have.
		let mut raw = test_toc(&[(&[(1, 0, 0)], 100)]);
		raw.pop();
		assert_eq!(parse_full_toc(&raw), Err(RipSvcError::MalformedToc("buffer too short")));

		// Missing lead-out.
		let mut w = FullTocWriter::default();
		w.push_track(1, 1, 0, 0).expect("Bad track.");
		let raw = w.finish().expect("Bad TOC.");
		assert_eq!(parse_full_toc(&raw), Err(RipSvcError::MalformedToc("missing lead-out")));

		// Empty session.
		let mut w = FullTocWriter::default();
		w.push_session(1, 1, 1, 100).expect("Bad session.");
		let raw = w.finish().expect("Bad TOC.");
		assert_eq!(parse_full_toc(&raw), Err(RipSvcError::MalformedToc("empty session")));

		// Unknown session.
		let mut raw = test_toc(&[(&[(1, 0, 0)], 100)]);
		raw[4] = 9;
		assert_eq!(parse_full_toc(&raw), Err(RipSvcError::MalformedToc("unknown session")));

		// Zero-length track.
		let raw = test_toc(&[(&[(1, 0, 0), (2, 0, 0)], 100)]);
		assert_eq!(
			parse_full_toc(&raw),
			Err(RipSvcError::MalformedToc("track ends before it begins")),
		);
	}
}
