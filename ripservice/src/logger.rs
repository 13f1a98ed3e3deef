/*!
# Rip Service: Logger
*/

use fyi_msg::Msg;
use log::{
	Level,
	LevelFilter,
	Log,
	Metadata,
	Record,
};



/// # Logger.
static LOGGER: Logger = Logger;



#[derive(Debug, Clone, Copy)]
/// # Logger.
///
/// Route `log` records from the library to STDERR as `fyi_msg` messages.
struct Logger;

impl Log for Logger {
	fn enabled(&self, metadata: &Metadata<'_>) -> bool {
		metadata.level() <= log::max_level()
	}

	fn log(&self, record: &Record<'_>) {
		if self.enabled(record.metadata()) {
			let msg = record.args().to_string();
			match record.level() {
				Level::Error => Msg::error(msg),
				Level::Warn => Msg::warning(msg),
				Level::Info => Msg::info(msg),
				Level::Debug => Msg::debug(msg),
				Level::Trace => Msg::custom("Trace", 8, &msg),
			}.eprint();
		}
	}

	fn flush(&self) {}
}



/// # Initialize.
///
/// Warnings and errors are always shown; `-v/--verbose` adds the debug
/// chatter.
pub(super) fn init(verbose: bool) {
	let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
	if log::set_logger(&LOGGER).is_ok() { log::set_max_level(level); }
}
