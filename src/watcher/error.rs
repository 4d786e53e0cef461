/* src/watcher/error.rs */

use thiserror::Error;

use crate::codec::DecodeError;
use crate::sink::SinkError;
use crate::store::StoreError;

/// Errors surfaced by the config watcher.
///
/// Only startup failures and a vanished consumer reach the caller; problems
/// with individual watch events are logged and skipped.
#[derive(Debug, Error)]
pub enum WatchError {
	#[error("store error: {0}")]
	Store(#[from] StoreError),

	#[error("invalid stored configuration: {0}")]
	Decode(#[from] DecodeError),

	#[error("sink error: {0}")]
	Sink(#[from] SinkError),

	#[error("builder error: {0}")]
	Builder(String),

	#[error("watcher was cancelled")]
	Cancelled,

	#[error("watcher task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
}
