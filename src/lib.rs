/* src/lib.rs */

//!
//! Live collection configuration from a key-value store.
//!
//! One store key holds an ordered list of collection entries. This crate
//! loads it at startup, watches it, and hands every change to a single
//! consumer as a complete [`ConfigSnapshot`]:
//!
//! - **store**: [`StoreClient`] over a pluggable [`KvBackend`].
//! - **codec**: [`ConfigCodec`], payload bytes to snapshots.
//! - **watcher**: [`ConfigWatcher`], the load/watch/resubscribe loop.
//! - **sink**: [`PropagationSink`], a blocking single-slot hand-off.
//!
//! ## Feature Flags
//!
//! - `json` (default), `yaml`, `postcard`: payload formats.
//! - `validate`: reject entries with an empty source or sink.
//! - `glob`: compile entry sources as glob patterns.
//! - `file`: directory-backed store watched through `notify`.
//! - `full`: enables all features.
//!
//! ## Basic Usage
//!
//! See `demos/memory_watch.rs` for a complete example.

pub mod codec;
pub mod model;
pub mod sink;
pub mod store;
pub mod watcher;

pub use codec::{ConfigCodec, DecodeError};
pub use model::{CollectionEntry, ConfigSnapshot, SnapshotDiff, WatchEvent};
pub use sink::{PropagationSink, SinkError, SinkReceiver};
pub use store::{KvBackend, MemoryBackend, StoreClient, StoreError};
pub use watcher::{ConfigWatcher, WatchConfig, WatchError, WatchHandle, WatcherState, start};

#[cfg(feature = "file")]
pub use store::FileBackend;
