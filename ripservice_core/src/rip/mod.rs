/*!
# Rip Service: Ripping
*/

pub(super) mod opts;
pub(super) mod wav;

use crate::{
	CD_DATA_SIZE,
	CdDevice,
	Disc,
	KillSwitch,
	LibcdioInstance,
	RipOptions,
	RipSvcError,
	Track,
};
use fyi_msg::{
	Msg,
	Progless,
};
use std::io::Write;



#[derive(Debug)]
/// # Ripper.
///
/// Stream a track's raw CDDA sectors from the drive to a sink, in order, one
/// sector at a time.
///
/// The device lock is only held for the duration of each individual read,
/// so other queries against the same [`Disc`] can slip in between sectors.
pub struct Ripper<'a, D: CdDevice = LibcdioInstance> {
	disc: &'a Disc<D>,
	opts: RipOptions,
}

impl<'a, D: CdDevice> Ripper<'a, D> {
	#[must_use]
	/// # New!
	pub const fn new(disc: &'a Disc<D>, opts: &RipOptions) -> Self {
		Self { disc, opts: *opts }
	}

	/// # Rip!
	///
	/// Rip `track` into `sink`, returning the number of sectors written.
	///
	/// The requested drive speed is applied first; drives are allowed to
	/// refuse. The kill switch is checked before each sector.
	///
	/// ## Errors
	///
	/// Returns [`RipSvcError::Killed`] if the kill switch is flipped,
	/// [`RipSvcError::SinkClosed`] if the sink stops accepting data, or any
	/// read error from the drive. Sectors written before the failure stay
	/// written.
	pub fn rip<W: Write>(
		&self,
		track: &Track,
		sink: &mut W,
		killed: &KillSwitch,
		progress: Option<&Progless>,
	) -> Result<u32, RipSvcError> {
		let num = track.number();
		if let Err(e) = self.disc.with_device(|d| d.set_speed(self.opts.speed())) {
			log::debug!("Track {num:02}: speed request ignored ({e}).");
		}

		if let Some(progress) = progress {
			let _res = progress.reset(track.sectors());
			set_progress_title(progress, num, "Ripping…");
		}

		log::debug!(
			"Track {num:02}: ripping sectors {}..{}.",
			track.sector_begin(),
			track.sector_end(),
		);

		let mut buf = [0_u8; CD_DATA_SIZE as usize];
		let mut written = 0;
		for lba in track.sector_begin()..track.sector_end() {
			if killed.killed() {
				log::debug!("Track {num:02}: aborted after {written} sector(s).");
				return Err(RipSvcError::Killed);
			}

			self.disc.with_device(|d| d.read_sector(lba, &mut buf))?;
			sink.write_all(&buf).map_err(|_| RipSvcError::SinkClosed)?;
			written += 1;

			if let Some(progress) = progress { progress.increment(); }
		}

		sink.flush().map_err(|_| RipSvcError::SinkClosed)?;
		log::trace!("Track {num:02}: {written} sector(s) written.");
		Ok(written)
	}
}

/// # Set Progress Title.
fn set_progress_title(progress: &Progless, idx: u8, msg: &str) {
	progress.set_title(Some(Msg::custom(
		format!("Track {idx:02}").as_str(),
		199,
		msg
	)));
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		device::memory::{
			MemoryDevice,
			sector_data,
		},
		toc::test_toc,
	};
	use std::{
		io,
		sync::atomic::Ordering::SeqCst,
	};

	/// # Sink That Fails After N Writes.
	struct Flaky {
		out: Vec<u8>,
		left: usize,
	}

	impl Write for Flaky {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			if self.left == 0 { return Ok(0); }
			self.left -= 1;
			self.out.extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> { Ok(()) }
	}

	/// # Disc.
	fn disc(sectors: u32) -> Disc<MemoryDevice> {
		let dev = MemoryDevice::new(test_toc(&[(&[(1, 0, 0), (2, 0, sectors)], sectors * 2)]));
		Disc::from_device(dev).expect("Disc failed.")
	}

	#[test]
	fn t_rip() {
		let disc = disc(3);
		let opts = RipOptions::default().with_speed(Some(4));
		let track = disc.track(2).expect("Missing track.").clone();

		let mut out = Vec::new();
		let written = Ripper::new(&disc, &opts)
			.rip(&track, &mut out, &KillSwitch::default(), None)
			.expect("Rip failed.");
		assert_eq!(written, 3);

		let expected: Vec<u8> = (3..6).flat_map(sector_data).collect();
		assert_eq!(out, expected, "Sectors should be written in order.");
		assert_eq!(disc.with_device(|d| d.speed), Some(Some(4)), "Speed should be applied.");
	}

	#[test]
	fn t_rip_sink_closed() {
		let disc = disc(2);
		let track = disc.track(1).expect("Missing track.").clone();
		let mut sink = Flaky { out: Vec::new(), left: 1 };

		let res = Ripper::new(&disc, &RipOptions::default())
			.rip(&track, &mut sink, &KillSwitch::default(), None);
		assert_eq!(res, Err(RipSvcError::SinkClosed));
		assert_eq!(sink.out, sector_data(0), "Exactly one sector should be written.");
	}

	#[test]
	fn t_rip_killed() {
		let disc = disc(5);
		let track = disc.track(1).expect("Missing track.").clone();
		let reads = disc.with_device(|d| d.reads.clone());
		let killed = KillSwitch::default();
		killed.kill();

		let mut out = Vec::new();
		let res = Ripper::new(&disc, &RipOptions::default())
			.rip(&track, &mut out, &killed, None);
		assert_eq!(res, Err(RipSvcError::Killed));
		assert!(out.is_empty(), "Nothing should be written.");
		assert_eq!(reads.load(SeqCst), 0, "Nothing should be read.");
	}

	/// # Sink That Flips the Kill Switch After N Writes.
	struct Quitter {
		out: Vec<u8>,
		left: usize,
		killed: KillSwitch,
	}

	impl Write for Quitter {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.out.extend_from_slice(buf);
			self.left = self.left.saturating_sub(1);
			if self.left == 0 { self.killed.kill(); }
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> { Ok(()) }
	}

	#[test]
	fn t_rip_killed_midway() {
		let disc = disc(8);
		let track = disc.track(2).expect("Missing track.").clone();
		let reads = disc.with_device(|d| d.reads.clone());
		let killed = KillSwitch::default();

		for k in [1_usize, 3, 7] {
			reads.store(0, SeqCst);
			let killed = KillSwitch::default();
			let mut sink = Quitter { out: Vec::new(), left: k, killed: killed.clone() };

			let res = Ripper::new(&disc, &RipOptions::default())
				.rip(&track, &mut sink, &killed, None);
			assert_eq!(res, Err(RipSvcError::Killed), "Rip should stop after {k} sector(s).");
			assert_eq!(
				sink.out.len(),
				k * usize::from(CD_DATA_SIZE),
				"Exactly {k} sector(s) should be written.",
			);
			let expected: Vec<u8> = (8..8 + k as u32).flat_map(sector_data).collect();
			assert_eq!(sink.out, expected, "Written sectors should be intact.");
			assert_eq!(reads.load(SeqCst), k, "No reads should follow the kill.");
		}

		// The kill switch doesn't matter once the last sector is written.
		let mut sink = Quitter { out: Vec::new(), left: 8, killed: killed.clone() };
		let res = Ripper::new(&disc, &RipOptions::default())
			.rip(&track, &mut sink, &killed, None);
		assert_eq!(res, Ok(8), "A kill after the final sector is too late.");
		assert!(killed.killed());
	}

	#[test]
	fn t_rip_read_error() {
		let mut dev = MemoryDevice::new(test_toc(&[(&[(1, 0, 0)], 4)]));
		dev.bad_sector.replace(2);
		let disc = Disc::from_device(dev).expect("Disc failed.");
		let track = disc.track(1).expect("Missing track.").clone();

		let mut out = Vec::new();
		let res = Ripper::new(&disc, &RipOptions::default())
			.rip(&track, &mut out, &KillSwitch::default(), None);
		assert_eq!(res, Err(RipSvcError::CdRead(2)));
		assert_eq!(out.len(), 2 * usize::from(CD_DATA_SIZE), "Earlier sectors stay written.");
	}
}
