/*!
# Rip Service: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Release,
		},
	},
};



#[derive(Debug, Clone, Default)]
/// # Kill Switch.
///
/// This is a short-circuit for long-running operations across multiple
/// threads. Rips check it between sectors; a read already sent to the drive
/// is allowed to finish, but the next one is never issued.
///
/// The main program's CTRL-C intercept sets the value, allowing Rip Service
/// to tidy up before dying. Library users can hold on to a clone and call
/// [`KillSwitch::kill`] instead.
pub struct KillSwitch(Arc<AtomicBool>);

impl From<&'static Arc<AtomicBool>> for KillSwitch {
	#[inline]
	fn from(src: &'static Arc<AtomicBool>) -> Self { Self(Arc::clone(src)) }
}

impl KillSwitch {
	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }

	/// # Kill.
	///
	/// Flip the switch. This cannot be undone.
	pub fn kill(&self) { self.0.store(true, Release); }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_killswitch() {
		let a = KillSwitch::default();
		let b = a.clone();
		assert!(! b.killed(), "New switches should be alive.");
		a.kill();
		assert!(b.killed(), "Clones should share state.");
	}
}
