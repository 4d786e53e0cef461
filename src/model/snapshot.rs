/* src/model/snapshot.rs */

use std::collections::HashSet;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::CollectionEntry;

/// The complete desired collection state at one instant.
///
/// A snapshot always replaces the previous one; there is no merging. An
/// empty snapshot means "no configuration", either because the key was
/// never written, was deleted, or holds an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
	entries: Vec<CollectionEntry>,
}

/// Entries that appear or disappear between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
	/// Entries present in the new snapshot only.
	pub added: Vec<CollectionEntry>,
	/// Entries present in the previous snapshot only.
	pub removed: Vec<CollectionEntry>,
}

impl SnapshotDiff {
	/// Returns true when both snapshots hold the same set of entries.
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty()
	}
}

impl ConfigSnapshot {
	pub fn new(entries: Vec<CollectionEntry>) -> Self {
		Self { entries }
	}

	/// The "no configuration" snapshot.
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn entries(&self) -> &[CollectionEntry] {
		&self.entries
	}

	pub fn into_entries(self) -> Vec<CollectionEntry> {
		self.entries
	}

	/// Computes what a consumer holding `previous` must start and stop.
	///
	/// Order follows each snapshot's own order. Duplicate entries are
	/// treated as one.
	pub fn diff(&self, previous: &ConfigSnapshot) -> SnapshotDiff {
		let old: HashSet<&CollectionEntry> = previous.entries.iter().collect();
		let new: HashSet<&CollectionEntry> = self.entries.iter().collect();

		let mut seen = HashSet::new();
		let added = self
			.entries
			.iter()
			.filter(|e| !old.contains(e) && seen.insert(*e))
			.cloned()
			.collect();

		let mut seen = HashSet::new();
		let removed = previous
			.entries
			.iter()
			.filter(|e| !new.contains(e) && seen.insert(*e))
			.cloned()
			.collect();

		SnapshotDiff { added, removed }
	}
}

impl Deref for ConfigSnapshot {
	type Target = [CollectionEntry];

	fn deref(&self) -> &Self::Target {
		&self.entries
	}
}

impl From<Vec<CollectionEntry>> for ConfigSnapshot {
	fn from(entries: Vec<CollectionEntry>) -> Self {
		Self::new(entries)
	}
}

impl FromIterator<CollectionEntry> for ConfigSnapshot {
	fn from_iter<I: IntoIterator<Item = CollectionEntry>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

impl IntoIterator for ConfigSnapshot {
	type Item = CollectionEntry;
	type IntoIter = std::vec::IntoIter<CollectionEntry>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

impl<'a> IntoIterator for &'a ConfigSnapshot {
	type Item = &'a CollectionEntry;
	type IntoIter = std::slice::Iter<'a, CollectionEntry>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}
