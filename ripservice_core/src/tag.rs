/*!
# Rip Service: Tags

This module holds the container-agnostic half of tagging: the tag name
constants, the open mode, the [`TagStore`] contract each container format
implements, and [`MemoryTags`], a store with no container at all.
*/

use crate::RipSvcError;
use std::ops::ControlFlow;



// The core names.
/// # Title.
pub const TITLE: &str = "TITLE";
/// # Album.
pub const ALBUM: &str = "ALBUM";
/// # Artist.
pub const ARTIST: &str = "ARTIST";
/// # Album Artist.
pub const ALBUMARTIST: &str = "ALBUMARTIST";
/// # Genre.
pub const GENRE: &str = "GENRE";
/// # Grouping.
pub const GROUPING: &str = "GROUPING";
/// # Date.
pub const DATE: &str = "DATE";
/// # Track Number.
pub const TRACKNUMBER: &str = "TRACKNUMBER";
/// # Track Total.
pub const TRACKTOTAL: &str = "TRACKTOTAL";
/// # Disc Number.
pub const DISCNUMBER: &str = "DISCNUMBER";
/// # Disc Total.
pub const DISCTOTAL: &str = "DISCTOTAL";
/// # ISRC.
pub const ISRC: &str = "ISRC";
/// # Media Catalog Number.
pub const MCN: &str = "MCN";
/// # Encoder.
pub const ENCODER: &str = "ENCODER";
/// # MusicBrainz Disc ID.
pub const MUSICBRAINZ_DISCID: &str = "MUSICBRAINZ_DISCID";

// Extended names.
/// # Subtitle.
pub const SUBTITLE: &str = "SUBTITLE";
/// # Original Album.
pub const ORIGINALALBUM: &str = "ORIGINALALBUM";
/// # Disc Subtitle.
pub const DISCSUBTITLE: &str = "DISCSUBTITLE";
/// # Conductor.
pub const CONDUCTOR: &str = "CONDUCTOR";
/// # Remixer.
pub const REMIXER: &str = "REMIXER";
/// # Original Artist.
pub const ORIGINALARTIST: &str = "ORIGINALARTIST";
/// # Lyricist.
pub const LYRICIST: &str = "LYRICIST";
/// # Original Lyricist.
pub const ORIGINALLYRICIST: &str = "ORIGINALLYRICIST";
/// # Composer.
pub const COMPOSER: &str = "COMPOSER";
/// # Encoded By.
pub const ENCODEDBY: &str = "ENCODEDBY";
/// # Beats Per Minute.
pub const BPM: &str = "BPM";
/// # Mood.
pub const MOOD: &str = "MOOD";
/// # Copyright.
pub const COPYRIGHT: &str = "COPYRIGHT";
/// # Produced (Notice).
pub const PRODUCED: &str = "PRODUCED";
/// # Label.
pub const LABEL: &str = "LABEL";
/// # Original Release Date.
pub const ORIGINALDATE: &str = "ORIGINALDATE";
/// # Album Sort Order.
pub const ALBUMSORT: &str = "ALBUMSORT";
/// # Artist Sort Order.
pub const ARTISTSORT: &str = "ARTISTSORT";
/// # Title Sort Order.
pub const TITLESORT: &str = "TITLESORT";
/// # Compilation.
pub const COMPILATION: &str = "COMPILATION";



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Tag Mode.
pub enum TagMode {
	#[default]
	/// # Read Only.
	ReadOnly,

	/// # Read and Write.
	ReadWrite,
}

impl TagMode {
	#[must_use]
	/// # Writable?
	pub const fn writable(self) -> bool { matches!(self, Self::ReadWrite) }
}



#[must_use]
/// # Valid Tag Name?
///
/// Tag names are non-empty runs of uppercase ASCII letters and underscores.
pub fn valid_name(name: &str) -> bool {
	! name.is_empty() && name.bytes().all(|b| matches!(b, b'A'..=b'Z' | b'_'))
}



/// # Tag Store.
///
/// An ordered multi-map of tag names to values, backed by some container
/// format on disk.
///
/// Implementors provide the raw operations; the `add`, `remove` and `clear`
/// entry points run the shared checks (writability, then name validity)
/// first, so implementations never see a bad request.
pub trait TagStore {
	/// # Mode.
	fn mode(&self) -> TagMode;

	/// # Add (Unchecked).
	///
	/// ## Errors
	///
	/// Returns an error if the name is unknown to the container, the value
	/// is invalid, or the tag already exists and cannot repeat.
	fn add_raw(&mut self, name: &str, value: &str) -> Result<(), RipSvcError>;

	/// # Remove (Unchecked).
	///
	/// ## Errors
	///
	/// Returns an error if the name is unknown to the container.
	fn remove_raw(&mut self, name: &str) -> Result<(), RipSvcError>;

	/// # Clear (Unchecked).
	fn clear_raw(&mut self);

	/// # Visit Each Pair.
	///
	/// Walk the name/value pairs in order, stopping early if the visitor
	/// breaks. Returns `true` if every pair was visited.
	fn each(&self, visitor: &mut dyn FnMut(&str, &str) -> ControlFlow<()>) -> bool;

	/// # Save (Unchecked).
	///
	/// ## Errors
	///
	/// Returns an error if the changes cannot be written.
	fn save_raw(&mut self) -> Result<(), RipSvcError>;

	/// # Add.
	///
	/// ## Errors
	///
	/// Returns an error if the store is read-only, the name is invalid, or
	/// the container rejects the pair. Nothing is changed on failure.
	fn add(&mut self, name: &str, value: &str) -> Result<(), RipSvcError> {
		check_writable(self.mode())?;
		check_name(name)?;
		self.add_raw(name, value)
	}

	/// # Remove.
	///
	/// Remove every value for `name`.
	///
	/// ## Errors
	///
	/// Returns an error if the store is read-only or the name is invalid.
	fn remove(&mut self, name: &str) -> Result<(), RipSvcError> {
		check_writable(self.mode())?;
		check_name(name)?;
		self.remove_raw(name)
	}

	/// # Clear.
	///
	/// ## Errors
	///
	/// Returns an error if the store is read-only.
	fn clear(&mut self) -> Result<(), RipSvcError> {
		check_writable(self.mode())?;
		self.clear_raw();
		Ok(())
	}

	/// # Save.
	///
	/// This is a no-op for read-only stores.
	///
	/// ## Errors
	///
	/// Returns an error if the changes cannot be written.
	fn save(&mut self) -> Result<(), RipSvcError> {
		if self.mode().writable() { self.save_raw() }
		else { Ok(()) }
	}

	/// # Copy From.
	///
	/// Replace this store's pairs with those of `src`, in order. Nothing is
	/// saved.
	///
	/// ## Errors
	///
	/// Returns an error if this store is read-only, or it rejects one of
	/// the pairs, in which case the pairs before it will have been copied.
	fn copy_from<S>(&mut self, src: &S) -> Result<(), RipSvcError>
	where Self: Sized, S: TagStore + ?Sized {
		check_writable(self.mode())?;
		let pairs = src.pairs();
		self.clear_raw();
		for (k, v) in pairs { self.add(&k, &v)?; }
		Ok(())
	}

	/// # Find.
	///
	/// Return every value for `name`, in order.
	fn find(&self, name: &str) -> Vec<String> {
		let mut out = Vec::new();
		self.each(&mut |k, v| {
			if k == name { out.push(v.to_owned()); }
			ControlFlow::Continue(())
		});
		out
	}

	/// # Count.
	fn count(&self, name: &str) -> usize {
		let mut out = 0;
		self.each(&mut |k, _| {
			if k == name { out += 1; }
			ControlFlow::Continue(())
		});
		out
	}

	/// # Pairs.
	///
	/// Collect every name/value pair, in order.
	fn pairs(&self) -> Vec<(String, String)> {
		let mut out = Vec::new();
		self.each(&mut |k, v| {
			out.push((k.to_owned(), v.to_owned()));
			ControlFlow::Continue(())
		});
		out
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # In-Memory Tags.
///
/// A detached, always-writable [`TagStore`] with no backing file. Any valid
/// name is accepted, and may repeat. Saving is a no-op.
///
/// ## Examples
///
/// ```
/// use ripservice_core::tag::{self, MemoryTags, TagStore};
///
/// let mut tags = MemoryTags::new();
/// tags.add(tag::TRACKNUMBER, "3").unwrap();
/// tags.add(tag::ARTIST, "Band").unwrap();
/// tags.add(tag::ARTIST, "Friend").unwrap();
/// assert_eq!(tags.count(tag::ARTIST), 2);
/// ```
pub struct MemoryTags(Vec<(String, String)>);

impl MemoryTags {
	#[must_use]
	/// # New.
	pub const fn new() -> Self { Self(Vec::new()) }

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.0.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl TagStore for MemoryTags {
	fn mode(&self) -> TagMode { TagMode::ReadWrite }

	fn add_raw(&mut self, name: &str, value: &str) -> Result<(), RipSvcError> {
		self.0.push((name.to_owned(), value.to_owned()));
		Ok(())
	}

	fn remove_raw(&mut self, name: &str) -> Result<(), RipSvcError> {
		self.0.retain(|(k, _)| k != name);
		Ok(())
	}

	fn clear_raw(&mut self) { self.0.clear(); }

	fn each(&self, visitor: &mut dyn FnMut(&str, &str) -> ControlFlow<()>) -> bool {
		self.0.iter().all(|(k, v)| visitor(k, v).is_continue())
	}

	fn save_raw(&mut self) -> Result<(), RipSvcError> { Ok(()) }
}



/// # Check Writable.
const fn check_writable(mode: TagMode) -> Result<(), RipSvcError> {
	if mode.writable() { Ok(()) }
	else { Err(RipSvcError::ReadOnly) }
}

/// # Check Name.
fn check_name(name: &str) -> Result<(), RipSvcError> {
	if valid_name(name) { Ok(()) }
	else { Err(RipSvcError::InvalidTagName(name.to_owned())) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[derive(Debug, Default)]
	/// # Vec-Backed Store.
	struct VecStore {
		mode: TagMode,
		pairs: Vec<(String, String)>,
		saves: usize,
	}

	impl TagStore for VecStore {
		fn mode(&self) -> TagMode { self.mode }
		fn add_raw(&mut self, name: &str, value: &str) -> Result<(), RipSvcError> {
			self.pairs.push((name.to_owned(), value.to_owned()));
			Ok(())
		}
		fn remove_raw(&mut self, name: &str) -> Result<(), RipSvcError> {
			self.pairs.retain(|(k, _)| k != name);
			Ok(())
		}
		fn clear_raw(&mut self) { self.pairs.clear(); }
		fn each(&self, visitor: &mut dyn FnMut(&str, &str) -> ControlFlow<()>) -> bool {
			self.pairs.iter().all(|(k, v)| visitor(k, v).is_continue())
		}
		fn save_raw(&mut self) -> Result<(), RipSvcError> {
			self.saves += 1;
			Ok(())
		}
	}

	#[test]
	fn t_valid_name() {
		for good in ["TITLE", "MUSICBRAINZ_DISCID", "_", "A"] {
			assert!(valid_name(good), "{good} should be valid.");
		}
		for bad in ["", "title", "TITLE1", "TITLE ", "ÉTÉ", "A-B"] {
			assert!(! valid_name(bad), "{bad:?} should be invalid.");
		}
	}

	#[test]
	fn t_store_checks() {
		let mut store = VecStore::default();
		assert_eq!(store.add(TITLE, "x"), Err(RipSvcError::ReadOnly));
		assert_eq!(store.remove(TITLE), Err(RipSvcError::ReadOnly));
		assert_eq!(store.clear(), Err(RipSvcError::ReadOnly));
		assert_eq!(store.save(), Ok(()), "Read-only saves are a no-op.");
		assert_eq!(store.saves, 0);

		store.mode = TagMode::ReadWrite;
		assert_eq!(
			store.add("title", "x"),
			Err(RipSvcError::InvalidTagName("title".to_owned())),
		);
		assert!(store.pairs.is_empty(), "Failed adds should not mutate.");

		store.add(ARTIST, "A").expect("Add failed.");
		store.add(TITLE, "B").expect("Add failed.");
		store.add(ARTIST, "C").expect("Add failed.");
		assert_eq!(store.find(ARTIST), vec!["A".to_owned(), "C".to_owned()]);
		assert_eq!(store.count(ARTIST), 2);
		assert_eq!(store.count(ALBUM), 0);
		assert_eq!(store.pairs().len(), 3);

		// Early exit.
		let mut seen = 0;
		let done = store.each(&mut |_, _| {
			seen += 1;
			if seen == 2 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
		});
		assert!(! done, "Iteration should report the early exit.");
		assert_eq!(seen, 2);

		store.save().expect("Save failed.");
		assert_eq!(store.saves, 1);
	}

	#[test]
	fn t_memory_tags() {
		let mut tags = MemoryTags::new();
		assert!(tags.is_empty());
		assert_eq!(tags.mode(), TagMode::ReadWrite, "Memory tags are always writable.");

		tags.add(TITLE, "A").expect("Add failed.");
		tags.add(TITLE, "B").expect("Repeats are allowed.");
		tags.add(ARTIST, "C").expect("Add failed.");
		assert_eq!(
			tags.add("Title", "x"),
			Err(RipSvcError::InvalidTagName("Title".to_owned())),
		);
		assert_eq!(tags.len(), 3);
		assert_eq!(tags.find(TITLE), vec!["A".to_owned(), "B".to_owned()]);

		tags.remove(TITLE).expect("Remove failed.");
		assert_eq!(tags.pairs(), vec![(ARTIST.to_owned(), "C".to_owned())]);
		tags.save().expect("Saves are a no-op.");
		tags.clear().expect("Clear failed.");
		assert!(tags.is_empty());
	}

	#[test]
	fn t_copy_from() {
		let mut src = MemoryTags::new();
		src.add(TRACKNUMBER, "3").expect("Add failed.");
		src.add(ARTIST, "A").expect("Add failed.");
		src.add(ARTIST, "B").expect("Add failed.");

		// Read-only destinations are untouched.
		let mut dst = VecStore {
			pairs: vec![(TITLE.to_owned(), "Old".to_owned())],
			..VecStore::default()
		};
		assert_eq!(dst.copy_from(&src), Err(RipSvcError::ReadOnly));
		assert_eq!(dst.pairs.len(), 1);

		// Otherwise the old pairs are replaced, in order.
		dst.mode = TagMode::ReadWrite;
		dst.copy_from(&src).expect("Copy failed.");
		assert_eq!(dst.pairs(), src.pairs());
		assert_eq!(dst.saves, 0, "Copies should not save.");

		// And back again.
		let mut other = MemoryTags::new();
		other.add(GENRE, "Rock").expect("Add failed.");
		other.copy_from(&dst).expect("Copy failed.");
		assert_eq!(other, src);
	}
}
