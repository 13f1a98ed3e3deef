/*!
# Rip Service: WAV Output
*/

use crate::{
	RipSvcError,
	WAVE_SPEC,
};
use hound::WavWriter;
use std::io::{
	Error,
	ErrorKind,
	Seek,
	Write,
};



/// # WAV Sink.
///
/// A [`Write`] adapter that turns a raw CDDA byte stream (little-endian
/// 16-bit stereo) into a WAV file.
///
/// Writes needn't line up with sample boundaries; a stray byte is held until
/// its partner arrives. Call [`WavSink::finish`] when done so the header
/// gets the final sizes.
pub struct WavSink<W: Write + Seek> {
	wav: WavWriter<W>,
	carry: Option<u8>,
}

impl<W: Write + Seek> std::fmt::Debug for WavSink<W> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WavSink")
			.field("carry", &self.carry)
			.finish_non_exhaustive()
	}
}

impl<W: Write + Seek> WavSink<W> {
	/// # New.
	///
	/// ## Errors
	///
	/// Returns an error if the header cannot be written.
	pub fn new(writer: W) -> Result<Self, RipSvcError> {
		let wav = WavWriter::new(writer, WAVE_SPEC)
			.map_err(|_| RipSvcError::Write("WAV stream".to_owned()))?;
		Ok(Self { wav, carry: None })
	}

	/// # Finish.
	///
	/// Write the final header values. A dangling half-sample is an error.
	///
	/// ## Errors
	///
	/// Returns an error if the stream ends mid-sample or the header cannot be
	/// updated.
	pub fn finish(self) -> Result<(), RipSvcError> {
		if self.carry.is_some() {
			return Err(RipSvcError::Write("WAV stream (partial sample)".to_owned()));
		}
		self.wav.finalize()
			.map_err(|_| RipSvcError::Write("WAV stream".to_owned()))
	}
}

impl<W: Write + Seek> Write for WavSink<W> {
	fn write(&mut self, mut buf: &[u8]) -> std::io::Result<usize> {
		let len = buf.len();
		if len == 0 { return Ok(0); }

		if let Some(lo) = self.carry.take() {
			let [hi, rest @ ..] = buf else { return Ok(0); };
			self.wav.write_sample(i16::from_le_bytes([lo, *hi])).map_err(hound_err)?;
			buf = rest;
		}

		let mut chunks = buf.chunks_exact(2);
		for pair in chunks.by_ref() {
			self.wav.write_sample(i16::from_le_bytes([pair[0], pair[1]])).map_err(hound_err)?;
		}
		if let [b] = chunks.remainder() { self.carry.replace(*b); }

		Ok(len)
	}

	fn flush(&mut self) -> std::io::Result<()> { self.wav.flush().map_err(hound_err) }
}

/// # Hound to IO Error.
fn hound_err(err: hound::Error) -> Error {
	match err {
		hound::Error::IoError(e) => e,
		e => Error::new(ErrorKind::Other, e),
	}
}
