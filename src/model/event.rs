/* src/model/event.rs */

/// A change notification emitted by a store's watch stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
	/// The key was created or overwritten.
	Put {
		key: String,
		value: Vec<u8>,
		revision: u64,
	},
	/// The key was deleted.
	Delete { key: String },
}

impl WatchEvent {
	/// Returns the key this event refers to.
	pub fn key(&self) -> &str {
		match self {
			Self::Put { key, .. } | Self::Delete { key } => key,
		}
	}

	/// Returns true for deletions.
	pub fn is_delete(&self) -> bool {
		matches!(self, Self::Delete { .. })
	}
}
