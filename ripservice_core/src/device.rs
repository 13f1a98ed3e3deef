/*!
# Rip Service: CD Devices
*/

use crate::{
	CD_DATA_SIZE,
	RipSvcError,
};



/// # Sector Buffer.
pub type SectorBuf = [u8; CD_DATA_SIZE as usize];



/// # CD Device.
///
/// The handful of queries the disc and ripper need from an optical drive.
/// Every method takes `&mut self`; the [`Disc`](crate::Disc) owning the
/// device serializes access to it.
pub trait CdDevice {
	/// # Media Catalog Number.
	///
	/// Return the disc's MCN, if it has one.
	fn read_mcn(&mut self) -> Option<String>;

	/// # Full Table of Contents.
	///
	/// Return the raw MMC full TOC (READ TOC format 2): a four-byte header
	/// (big-endian data length, first session, last session) followed by
	/// eleven-byte descriptors.
	///
	/// ## Errors
	///
	/// Returns an error if the table of contents cannot be read.
	fn read_toc(&mut self) -> Result<Vec<u8>, RipSvcError>;

	/// # Track ISRC.
	///
	/// Return the ISRC for the given track, if it has one.
	fn read_isrc(&mut self, track: u8) -> Option<String>;

	/// # Read Sector.
	///
	/// Read one raw CDDA sector (sans lead-in) into `buf`.
	///
	/// ## Errors
	///
	/// Returns an error if the sector cannot be read.
	fn read_sector(&mut self, lba: u32, buf: &mut SectorBuf) -> Result<(), RipSvcError>;

	/// # Set Read Speed.
	///
	/// Request a read speed (as a multiple of 1x), or the drive's maximum
	/// if `None`.
	///
	/// ## Errors
	///
	/// Returns an error if the drive refuses.
	fn set_speed(&mut self, speed: Option<u16>) -> Result<(), RipSvcError>;
}
