/*!
# Rip Service: `libcdio` Wrappers
*/

use crate::{
	CdDevice,
	RipSvcError,
	SectorBuf,
	toc::FullTocWriter,
};
use libcdio_sys::{
	cdio_track_enums_CDIO_CDROM_LEADOUT_TRACK,
	driver_id_t_DRIVER_DEVICE, // The equivalent of "use whatever's best".
	driver_return_code_t_DRIVER_OP_NOT_PERMITTED,
	driver_return_code_t_DRIVER_OP_SUCCESS,
	track_flag_t_CDIO_TRACK_FLAG_TRUE,
	track_format_t_TRACK_FORMAT_AUDIO,
	track_format_t_TRACK_FORMAT_ERROR,
};
use std::{
	ffi::{
		CStr,
		CString,
	},
	os::{
		raw::c_char,
		unix::ffi::OsStrExt,
	},
	path::Path,
	sync::Once,
};



static LIBCDIO_INIT: Once = Once::new();

/// # Gap Between CD-Extra Sessions.
///
/// Lead-out, lead-in and pregap separating the audio session from a trailing
/// data session.
const SESSION_GAP: u32 = 11_400;



#[derive(Debug)]
#[allow(dead_code)] // We just want to make sure dev lives as long as the ptr.
/// # CDIO Instance.
///
/// A connection to a physical optical drive.
pub struct LibcdioInstance {
	dev: Option<CString>,
	ptr: *mut libcdio_sys::CdIo_t,
}

#[allow(unsafe_code)]
// The handle is not tied to the thread that opened it; Disc wraps it in a
// mutex so only one thread touches it at a time.
unsafe impl Send for LibcdioInstance {}

impl Drop for LibcdioInstance {
	#[allow(unsafe_code)]
	fn drop(&mut self) {
		// Release the C memory!
		if ! self.ptr.is_null() {
			unsafe { libcdio_sys::cdio_destroy(self.ptr); }
		}
	}
}

impl LibcdioInstance {
	#[allow(unsafe_code)]
	/// # New!
	///
	/// Initialize a new instance, optionally connecting to a specific device.
	///
	/// ## Errors
	///
	/// This will return an error if initialization fails, or if the provided
	/// device path is obviously wrong.
	pub fn new<P>(dev: Option<P>) -> Result<Self, RipSvcError>
	where P: AsRef<Path> {
		// Make sure the library has been initialized.
		init();

		// Take a look at the desired device.
		let dev = {
			if let Some(dev) = dev {
				let dev = dev.as_ref();
				let original: String = dev.to_string_lossy().into_owned();
				if ! dev.exists() {
					return Err(RipSvcError::Device(original));
				}
				let dev = CString::new(dev.as_os_str().as_bytes())
					.map_err(|_| RipSvcError::Device(original))?;
				Some(dev)
			}
			else { None }
		};

		// Connect to it.
		let ptr = unsafe {
			libcdio_sys::cdio_open(
				dev.as_ref().map_or_else(std::ptr::null, |v| v.as_ptr()),
				driver_id_t_DRIVER_DEVICE,
			)
		};

		if ptr.is_null() {
			Err(RipSvcError::DeviceOpen(dev.map(|v| v.to_string_lossy().into_owned())))
		}
		else {
			log::debug!(
				"Opened {}.",
				dev.as_ref().map_or_else(|| "the default drive".into(), |v| v.to_string_lossy()),
			);
			Ok(Self { dev, ptr })
		}
	}
}

impl LibcdioInstance {
	#[allow(unsafe_code)]
	/// # Track Range.
	fn track_range(&self) -> Result<(u8, u8), RipSvcError> {
		let first = unsafe { libcdio_sys::cdio_get_first_track_num(self.ptr) };
		let num = unsafe { libcdio_sys::cdio_get_num_tracks(self.ptr) };

		// Zero and 0xFF are both failures.
		if first == 0 || num == 0 || first == u8::MAX || num == u8::MAX {
			return Err(RipSvcError::Toc);
		}
		let last = first.checked_add(num - 1)
			.filter(|&n| n <= 99)
			.ok_or(RipSvcError::Toc)?;
		Ok((first, last))
	}

	#[allow(unsafe_code)]
	/// # Track Start (sans lead-in).
	fn track_lsn(&self, idx: u8) -> Result<u32, RipSvcError> {
		let raw = unsafe { libcdio_sys::cdio_get_track_lsn(self.ptr, idx) };
		u32::try_from(raw).map_err(|_| RipSvcError::Toc)
	}

	/// # Leadout.
	fn leadout_lsn(&self) -> Result<u32, RipSvcError> {
		let idx = u8::try_from(cdio_track_enums_CDIO_CDROM_LEADOUT_TRACK)
			.unwrap_or(170);
		self.track_lsn(idx)
	}

	#[allow(unsafe_code)]
	#[allow(non_upper_case_globals)] // Not our globals.
	/// # Track Control Bits.
	///
	/// Reassemble the Q sub-channel control nibble from the various flag
	/// queries libcdio exposes.
	fn track_control(&self, idx: u8) -> Result<u8, RipSvcError> {
		let format = unsafe { libcdio_sys::cdio_get_track_format(self.ptr, idx) };
		let mut control = match format {
			track_format_t_TRACK_FORMAT_AUDIO => 0,
			track_format_t_TRACK_FORMAT_ERROR => return Err(RipSvcError::Toc),
			_ => 0x04,
		};

		if track_flag_t_CDIO_TRACK_FLAG_TRUE == unsafe {
			libcdio_sys::cdio_get_track_preemphasis(self.ptr, idx)
		} { control |= 0x01; }

		if track_flag_t_CDIO_TRACK_FLAG_TRUE == unsafe {
			libcdio_sys::cdio_get_track_copy_permit(self.ptr, idx)
		} { control |= 0x02; }

		if 4 == unsafe { libcdio_sys::cdio_get_track_channels(self.ptr, idx) } {
			control |= 0x08;
		}

		Ok(control)
	}
}

impl CdDevice for LibcdioInstance {
	#[allow(unsafe_code)]
	fn read_mcn(&mut self) -> Option<String> {
		let raw = unsafe { libcdio_sys::cdio_get_mcn(self.ptr) };
		if raw.is_null() { None }
		else {
			let out = c_char_to_string(raw);
			unsafe { libcdio_sys::cdio_free(raw.cast()); }
			out.filter(|v| v.bytes().any(|b| b != b'0'))
		}
	}

	/// # Read TOC.
	///
	/// libcdio doesn't hand over the raw full TOC, so one is rebuilt from
	/// the per-track queries. A trailing data track following audio is
	/// placed in its own session, CD-Extra style.
	fn read_toc(&mut self) -> Result<Vec<u8>, RipSvcError> {
		let (first, last) = self.track_range()?;
		let mut tracks = Vec::with_capacity(usize::from(last - first) + 1);
		for idx in first..=last {
			tracks.push((idx, self.track_control(idx)?, self.track_lsn(idx)?));
		}
		let leadout = self.leadout_lsn()?;

		// CD-Extra?
		let extra = match tracks.as_slice() {
			[.., (_, c1, s1), (_, c2, s2)] if
				0 == c1 & 0x04 &&
				0 != c2 & 0x04 &&
				s2.saturating_sub(SESSION_GAP) > *s1
			=> Some(s2 - SESSION_GAP),
			_ => None,
		};

		let mut w = FullTocWriter::default();
		if let Some(audio_leadout) = extra {
			let (data, audio) = tracks.split_last().ok_or(RipSvcError::Toc)?;
			for &(idx, control, lsn) in audio { w.push_track(1, idx, control, lsn)?; }
			w.push_session(1, first, last - 1, audio_leadout)?;
			w.push_track(2, data.0, data.1, data.2)?;
			w.push_session(2, last, last, leadout)?;
		}
		else {
			for &(idx, control, lsn) in &tracks { w.push_track(1, idx, control, lsn)?; }
			w.push_session(1, first, last, leadout)?;
		}

		w.finish()
	}

	#[allow(unsafe_code)]
	fn read_isrc(&mut self, track: u8) -> Option<String> {
		let raw = unsafe { libcdio_sys::cdio_get_track_isrc(self.ptr, track) };
		if raw.is_null() { None }
		else {
			let out = c_char_to_string(raw);
			unsafe { libcdio_sys::cdio_free(raw.cast()); }
			out
		}
	}

	#[allow(unsafe_code)]
	#[allow(non_upper_case_globals)] // Not our globals.
	/// # Read Sector.
	///
	/// Read a single audio sector to the provided buffer.
	fn read_sector(&mut self, lba: u32, buf: &mut SectorBuf) -> Result<(), RipSvcError> {
		let lsn = i32::try_from(lba).map_err(|_| RipSvcError::CdRead(lba))?;
		let res = unsafe {
			libcdio_sys::mmc_read_cd(
				self.ptr,
				buf.as_mut_ptr().cast(),
				lsn,
				1,      // Sector type: CDDA.
				0,      // No random data manipulation thank you kindly.
				0,      // No header syncing.
				0,      // No headers.
				1,      // YES audio block!
				0,      // No EDC.
				0,      // No C2.
				0,      // No subchannel.
				crate::CD_DATA_SIZE,
				1,      // One block at a time.
			)
		};
		match res {
			driver_return_code_t_DRIVER_OP_NOT_PERMITTED => Err(RipSvcError::CdReadUnsupported),
			driver_return_code_t_DRIVER_OP_SUCCESS => Ok(()),
			_ => Err(RipSvcError::CdRead(lba)),
		}
	}

	#[allow(unsafe_code)]
	#[allow(non_upper_case_globals)] // Not our globals.
	/// # Set Speed.
	///
	/// Zero asks the drive for its maximum.
	fn set_speed(&mut self, speed: Option<u16>) -> Result<(), RipSvcError> {
		let res = unsafe {
			libcdio_sys::cdio_set_speed(self.ptr, speed.map_or(0, i32::from))
		};
		if res == driver_return_code_t_DRIVER_OP_SUCCESS { Ok(()) }
		else { Err(RipSvcError::Speed) }
	}
}



#[allow(unsafe_code)]
/// # Initialize `libcdio`.
fn init() {
	LIBCDIO_INIT.call_once(|| unsafe { libcdio_sys::cdio_init(); });
}

#[allow(unsafe_code)]
/// # Pointer to String.
///
/// Convert C-string pointers to a string, unless they're null.
fn c_char_to_string(ptr: *const c_char) -> Option<String> {
	if ptr.is_null() { None }
	else {
		unsafe { CStr::from_ptr(ptr) }
			.to_str()
			.ok()
			.map(|s| s.trim().to_owned())
			.filter(|s| ! s.is_empty())
	}
}
