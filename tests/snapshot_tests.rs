/* tests/snapshot_tests.rs */

use livekv::{CollectionEntry, ConfigSnapshot};

fn entry(source: &str, sink: &str) -> CollectionEntry {
	CollectionEntry::new(source, sink)
}

#[test]
fn test_diff_added_and_removed() {
	let old: ConfigSnapshot = vec![entry("a", "t1"), entry("b", "t2")].into();
	let new: ConfigSnapshot = vec![entry("b", "t2"), entry("c", "t3")].into();

	let diff = new.diff(&old);
	assert_eq!(diff.added, vec![entry("c", "t3")]);
	assert_eq!(diff.removed, vec![entry("a", "t1")]);
}

#[test]
fn test_diff_sink_change_replaces_entry() {
	let old: ConfigSnapshot = vec![entry("a", "t1")].into();
	let new: ConfigSnapshot = vec![entry("a", "t2")].into();

	let diff = new.diff(&old);
	assert_eq!(diff.added, vec![entry("a", "t2")]);
	assert_eq!(diff.removed, vec![entry("a", "t1")]);
}

#[test]
fn test_diff_against_empty() {
	let new: ConfigSnapshot = vec![entry("a", "t1"), entry("a", "t1")].into();

	let diff = new.diff(&ConfigSnapshot::empty());
	assert_eq!(diff.added, vec![entry("a", "t1")]);
	assert!(diff.removed.is_empty());

	let diff = ConfigSnapshot::empty().diff(&new);
	assert!(diff.added.is_empty());
	assert_eq!(diff.removed, vec![entry("a", "t1")]);
}

#[test]
fn test_diff_identical_is_empty() {
	let snapshot: ConfigSnapshot = vec![entry("a", "t1")].into_iter().collect();
	assert!(snapshot.diff(&snapshot.clone()).is_empty());
}

#[test]
fn test_into_entries_keeps_order() {
	let snapshot: ConfigSnapshot = vec![entry("b", "t2"), entry("a", "t1")].into();
	assert_eq!(snapshot.into_entries(), vec![entry("b", "t2"), entry("a", "t1")]);
}
