/*!
# Rip Service: Ripping Options
*/



/// # FLAG: RAW PCM (instead of WAV).
const FLAG_RAW: u8 = 0b0000_0001;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = 0;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Rip Options.
///
/// This struct holds the rip-related options like drive speed, track
/// numbers, etc.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use ripservice_core::RipOptions;
///
/// let opts = RipOptions::default()
///     .with_speed(Some(8))
///     .with_track(3) // Order doesn't matter.
///     .with_track(2)
///     .with_track(15);
///
/// assert_eq!(opts.speed(), Some(8));
/// assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[2, 3, 15]);
/// assert!(! opts.raw());
/// ```
pub struct RipOptions {
	speed: Option<u16>,
	flags: u8,
	tracks: u128,
}

impl Default for RipOptions {
	fn default() -> Self {
		Self {
			speed: None,
			flags: FLAG_DEFAULT,
			tracks: 0,
		}
	}
}

/// ## Setters.
impl RipOptions {
	#[must_use]
	/// # Output Raw PCM.
	///
	/// When `true`, tracks will be saved in raw PCM format. When `false`,
	/// they'll be saved as WAV files.
	///
	/// The default is `false`.
	pub const fn with_raw(self, v: bool) -> Self {
		let flags =
			if v { self.flags | FLAG_RAW }
			else { self.flags & ! FLAG_RAW };

		Self {
			flags,
			..self
		}
	}

	#[must_use]
	/// # Drive Speed.
	///
	/// Request a particular read speed (as a multiple of 1x) before ripping,
	/// or `None` for the drive's maximum. Zero is treated as `None`.
	///
	/// Drives are free to ignore the request, and many do.
	///
	/// The default is `None`.
	pub const fn with_speed(self, speed: Option<u16>) -> Self {
		let speed = match speed {
			Some(0) | None => None,
			Some(s) => Some(s),
		};
		Self {
			speed,
			..self
		}
	}

	#[must_use]
	/// # Include Track.
	///
	/// Add a given track number to the to-rip list.
	pub const fn with_track(self, track: u8) -> Self {
		let tracks = self.tracks | track_idx_to_bits(track);
		Self {
			tracks,
			..self
		}
	}
}

/// # Getters.
impl RipOptions {
	#[must_use]
	/// # Has Any Tracks?
	pub const fn has_tracks(&self) -> bool { self.tracks != 0 }

	#[must_use]
	/// # Output Raw PCM?
	pub const fn raw(&self) -> bool { FLAG_RAW == self.flags & FLAG_RAW }

	#[must_use]
	/// # Drive Speed.
	pub const fn speed(&self) -> Option<u16> { self.speed }

	#[must_use]
	/// # Tracks.
	///
	/// Return an iterator over the included track numbers.
	pub const fn tracks(&self) -> RipOptionsTracks {
		RipOptionsTracks {
			set: self.tracks,
			pos: 1,
		}
	}
}



#[derive(Debug, Clone)]
/// # Rip Option Tracks.
///
/// This iterator converts the `u128` bitflag back into individual `u8`
/// track numbers.
pub struct RipOptionsTracks {
	set: u128,
	pos: u8,
}

impl Iterator for RipOptionsTracks {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		while self.pos < 100 {
			let idx = self.pos;
			self.pos += 1;
			if 0 != self.set & track_idx_to_bits(idx) {
				return Some(idx);
			}
		}
		None
	}

	/// # Size Hint.
	///
	/// There will never be more than 99 tracks.
	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, Some(100_usize.saturating_sub(usize::from(self.pos))))
	}
}



/// # Track Number to Bitflag.
///
/// Redbook audio CDs can only have a maximum of 99 tracks, so every possible
/// combination fits in a single `u128` bitflag. Aside from being `Copy`, this
/// saves us the trouble of having to sort/dedup a vector.
///
/// Out of range values (including zero) are silently ignored.
const fn track_idx_to_bits(idx: u8) -> u128 {
	if idx == 0 || 99 < idx { 0 }
	else { 2_u128.pow(idx as u32) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_rip_options_raw() {
		let mut opts = RipOptions::default();
		for v in [false, true, false, true] {
			opts = opts.with_raw(v);
			assert_eq!(opts.raw(), v, "Setting raw to {v} failed.");
		}
	}

	#[test]
	fn t_rip_options_speed() {
		assert_eq!(RipOptions::default().speed(), None);
		for v in [1, 4, 52] {
			let opts = RipOptions::default().with_speed(Some(v));
			assert_eq!(opts.speed(), Some(v));
		}
		assert_eq!(RipOptions::default().with_speed(Some(0)).speed(), None, "Zero means max.");
		assert_eq!(RipOptions::default().with_speed(Some(8)).with_speed(None).speed(), None);
	}

	#[test]
	fn t_rip_options_tracks() {
		let mut opts = RipOptions::default();
		assert!(! opts.has_tracks(), "The track list should be empty!");

		// Zero and 100 aren't tracks.
		opts = opts.with_track(0).with_track(100);
		assert!(! opts.has_tracks(), "Zero and 100 shouldn't count!");

		// Add all possible tracks.
		for idx in 0..=u8::MAX { opts = opts.with_track(idx); }
		assert!(opts.has_tracks(), "The track list should not be empty!");

		// Pull them back.
		let tracks = opts.tracks().collect::<Vec<u8>>();
		assert_eq!(tracks.len(), 99, "Expected 99 tracks.");
		for (real, expected) in tracks.into_iter().zip(1..=99_u8) {
			assert_eq!(real, expected, "Options track mismatch: {real} instead of {expected}.");
		}

		// Make sure this works with a somewhat random list.
		let expected = [1, 5, 15];
		opts = RipOptions::default();
		for idx in [15, 1, 5, 5] { opts = opts.with_track(idx); }
		assert_eq!(opts.tracks().collect::<Vec<u8>>(), expected, "Tracks should be sorted and unique.");
	}
}
