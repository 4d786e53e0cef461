/* src/watcher/mod.rs */

//!
//! Configuration watcher.
//!
//! - [`ConfigWatcher`] - load once, then watch and hand off snapshots
//! - [`WatchHandle`] - control over a spawned watcher
//! - [`start`] - connect, load and spawn in one call

mod backoff;
mod config;
mod control;
mod error;
mod handle;
mod state;
mod stats;

pub use backoff::Backoff;
pub use config::{DEFAULT_KEY, WatchConfig};
pub use control::{ConfigWatcher, ConfigWatcherBuilder, STABLE_STREAM};
pub use error::WatchError;
pub use handle::WatchHandle;
pub use state::WatcherState;
pub use stats::WatchStats;

use std::sync::Arc;

use crate::model::ConfigSnapshot;
use crate::sink::{self, SinkReceiver};
use crate::store::{KvBackend, StoreClient};

/// A watcher brought up by [`start`].
#[derive(Debug)]
pub struct Started {
	/// Configuration present when the watcher started.
	pub initial: ConfigSnapshot,
	/// Handle to the running watcher.
	pub handle: WatchHandle,
	/// Where later snapshots arrive.
	pub receiver: SinkReceiver,
}

/// Connects to the store, loads the initial configuration and spawns the
/// watcher.
///
/// Fails if the store is unreachable, the initial read fails for any reason
/// other than a missing key, or the stored payload is malformed.
pub async fn start(config: WatchConfig, backend: impl KvBackend) -> Result<Started, WatchError> {
	let client = StoreClient::new(backend);
	client.connect(&config.endpoint, config.dial_timeout).await?;

	let stall_warning = config.stall_warning;
	let watcher = ConfigWatcher::builder()
		.client(Arc::new(client))
		.config(config)
		.build()?;

	let initial = watcher.load().await?;
	let (sink, receiver) = sink::channel(stall_warning);
	let handle = watcher.spawn(sink);

	Ok(Started {
		initial,
		handle,
		receiver,
	})
}
