/* src/model/mod.rs */

mod entry;
mod event;
mod snapshot;

pub use entry::CollectionEntry;
pub use event::WatchEvent;
pub use snapshot::{ConfigSnapshot, SnapshotDiff};
