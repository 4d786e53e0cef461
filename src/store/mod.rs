/* src/store/mod.rs */

//!
//! Key-value store access.
//!
//! [`StoreClient`] is the connection wrapper the watcher talks to. The
//! actual store sits behind [`KvBackend`], so the same client works against
//! the in-process [`MemoryBackend`], the directory-backed `FileBackend`, or
//! any remote store adapter.

mod client;
mod error;
mod memory;

#[cfg(feature = "file")]
mod file;

pub use client::StoreClient;
pub use error::StoreError;
pub use memory::MemoryBackend;

#[cfg(feature = "file")]
pub use file::FileBackend;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::model::WatchEvent;

/// A lazy, possibly terminating sequence of change events for one key.
///
/// The end of the stream is not an error; it means the subscription has to
/// be re-established.
pub type WatchStream = Pin<Box<dyn Stream<Item = WatchEvent> + Send>>;

/// A stored value and its revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
	pub value: Vec<u8>,
	/// Changes whenever the value changes.
	pub revision: u64,
}

/// Where a new watch stream picks up.
///
/// A subscriber that already knows some state of the key passes it here, and
/// the backend first reports whatever changed since then. Nothing written
/// between a read and the following subscribe, or during a resubscribe
/// pause, is missed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatchFrom {
	/// Only changes made after the stream opens.
	#[default]
	Now,
	/// The subscriber last saw the key missing.
	Absent,
	/// The subscriber last saw the value at this revision.
	Revision(u64),
}

impl WatchFrom {
	/// Position of a subscriber that just read `current`.
	pub fn seen(current: Option<&Record>) -> Self {
		match current {
			Some(record) => Self::Revision(record.revision),
			None => Self::Absent,
		}
	}

	/// Position of a subscriber that just received `event`.
	pub fn after(event: &WatchEvent) -> Self {
		match event {
			WatchEvent::Put { revision, .. } => Self::Revision(*revision),
			WatchEvent::Delete { .. } => Self::Absent,
		}
	}

	/// The event that brings a subscriber at this position up to `current`,
	/// or `None` if it is not behind.
	pub fn catch_up(self, key: &str, current: Option<&Record>) -> Option<WatchEvent> {
		match (self, current) {
			(Self::Now, _) | (Self::Absent, None) => None,
			(Self::Revision(seen), Some(record)) if record.revision == seen => None,
			(_, Some(record)) => Some(WatchEvent::Put {
				key: key.to_string(),
				value: record.value.clone(),
				revision: record.revision,
			}),
			(Self::Revision(_), None) => Some(WatchEvent::Delete {
				key: key.to_string(),
			}),
		}
	}
}

/// Abstract key-value store that the client drives.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
	/// Opens the connection to `endpoint`.
	async fn dial(&self, endpoint: &str) -> Result<(), StoreError>;

	/// Reads the record under `key`, `None` if the key holds nothing.
	async fn get(&self, key: &str) -> Result<Option<Record>, StoreError>;

	/// Subscribes to changes of `key`.
	///
	/// Unless `from` is [`WatchFrom::Now`], the stream starts with the
	/// [`catch_up`](WatchFrom::catch_up) event for the key's value at
	/// subscribe time.
	async fn watch(&self, key: &str, from: WatchFrom) -> Result<WatchStream, StoreError>;
}
