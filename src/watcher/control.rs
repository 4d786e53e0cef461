/* src/watcher/control.rs */

//!
//! The watch loop: initial load, then watch, decode and hand off forever.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::{Backoff, WatchConfig, WatchError, WatchHandle, WatchStats, WatcherState};
use crate::codec::ConfigCodec;
use crate::model::{ConfigSnapshot, WatchEvent};
use crate::sink::PropagationSink;
use crate::store::{Record, StoreClient, StoreError, WatchFrom};

/// A watch stream that stays open this long counts as healthy even if the
/// key never changed.
pub const STABLE_STREAM: Duration = Duration::from_secs(1);

/// Projects one store key onto a stream of configuration snapshots.
///
/// The watcher keeps no copy of the last snapshot it delivered, only the
/// store revision it came from, so a reopened stream can catch up on what
/// changed while no stream was open. Whoever accepts from the sink holds the
/// current configuration; a skipped update leaves that copy in charge.
pub struct ConfigWatcher {
	client: Arc<StoreClient>,
	codec: ConfigCodec,
	key: String,
	read_timeout: Duration,
	backoff_initial: Duration,
	backoff_max: Duration,
	cancel: CancellationToken,
	state: watch::Sender<WatcherState>,
	stats: Arc<WatchStats>,
	position: ArcSwap<WatchFrom>,
}

/// Builder for [`ConfigWatcher`].
pub struct ConfigWatcherBuilder {
	client: Option<Arc<StoreClient>>,
	codec: Option<ConfigCodec>,
	config: WatchConfig,
	key: Option<String>,
	cancel: Option<CancellationToken>,
}

impl ConfigWatcherBuilder {
	pub fn new() -> Self {
		Self {
			client: None,
			codec: None,
			config: WatchConfig::default(),
			key: None,
			cancel: None,
		}
	}

	/// The connected store client to read from.
	pub fn client(mut self, client: Arc<StoreClient>) -> Self {
		self.client = Some(client);
		self
	}

	/// Overrides the codec picked from the config's `format`.
	pub fn codec(mut self, codec: ConfigCodec) -> Self {
		self.codec = Some(codec);
		self
	}

	pub fn config(mut self, config: WatchConfig) -> Self {
		self.config = config;
		self
	}

	/// Overrides the config's `key`.
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Token that stops loading and watching when cancelled.
	pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = Some(cancel);
		self
	}

	pub fn build(self) -> Result<ConfigWatcher, WatchError> {
		let client = self
			.client
			.ok_or_else(|| WatchError::Builder("client is required".to_string()))?;

		let codec = match self.codec {
			Some(codec) => codec,
			None => self.config.payload_format().map(ConfigCodec::new).ok_or_else(|| {
				WatchError::Builder(format!("unsupported payload format: {}", self.config.format))
			})?,
		};

		let key = self.key.unwrap_or(self.config.key);
		if key.is_empty() {
			return Err(WatchError::Builder("key must not be empty".to_string()));
		}
		if self.config.backoff_initial.is_zero() {
			return Err(WatchError::Builder(
				"backoff_initial must be greater than zero".to_string(),
			));
		}

		Ok(ConfigWatcher {
			client,
			codec,
			key,
			read_timeout: self.config.read_timeout,
			backoff_initial: self.config.backoff_initial,
			backoff_max: self.config.backoff_max,
			cancel: self.cancel.unwrap_or_default(),
			state: watch::Sender::new(WatcherState::Idle),
			stats: Arc::new(WatchStats::default()),
			position: ArcSwap::from_pointee(WatchFrom::Now),
		})
	}
}

impl Default for ConfigWatcherBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigWatcher {
	pub fn builder() -> ConfigWatcherBuilder {
		ConfigWatcherBuilder::new()
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns the current lifecycle state.
	pub fn state(&self) -> WatcherState {
		*self.state.borrow()
	}

	/// Subscribes to lifecycle changes.
	pub fn subscribe_state(&self) -> watch::Receiver<WatcherState> {
		self.state.subscribe()
	}

	pub fn stats(&self) -> Arc<WatchStats> {
		Arc::clone(&self.stats)
	}

	/// Returns a token that stops this watcher when cancelled.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Reads the initial configuration.
	///
	/// A missing key yields the empty snapshot. Any other store error, and a
	/// stored payload that does not decode, is returned to the caller.
	pub async fn load(&self) -> Result<ConfigSnapshot, WatchError> {
		self.set_state(WatcherState::Loading);

		let result = tokio::select! {
			_ = self.cancel.cancelled() => Err(WatchError::Cancelled),
			res = self.client.get_record(&self.key, self.read_timeout) => self.decode_initial(res),
		};

		if result.is_err() {
			self.set_state(WatcherState::Stopped);
		}
		result
	}

	fn decode_initial(&self, res: Result<Record, StoreError>) -> Result<ConfigSnapshot, WatchError> {
		match res {
			Ok(record) => match self.codec.decode(&record.value) {
				Ok(snapshot) => {
					info!(
						key = %self.key,
						entries = snapshot.len(),
						revision = record.revision,
						"loaded initial configuration"
					);
					self.position.store(Arc::new(WatchFrom::Revision(record.revision)));
					Ok(snapshot)
				}
				Err(e) => {
					error!(key = %self.key, error = %e, "stored configuration is malformed");
					Err(e.into())
				}
			},
			Err(StoreError::NotFound { .. }) => {
				warn!(key = %self.key, "no configuration stored yet, starting empty");
				self.position.store(Arc::new(WatchFrom::Absent));
				Ok(ConfigSnapshot::empty())
			}
			Err(e) => {
				error!(key = %self.key, error = %e, "failed to read initial configuration");
				Err(e.into())
			}
		}
	}

	/// Watches the key and delivers every resulting snapshot to `sink`.
	///
	/// Runs until the cancellation token fires (`Ok`) or the consumer side
	/// of the sink is dropped (`Err`). A closed watch stream is reopened
	/// after a backoff. The backoff resets once a stream has produced events
	/// or stayed open for [`STABLE_STREAM`].
	///
	/// After [`load`](Self::load), every stream resumes from the last
	/// revision seen, so a change made between two streams is still
	/// delivered.
	pub async fn run(&self, sink: PropagationSink) -> Result<(), WatchError> {
		let mut backoff = Backoff::new(self.backoff_initial, self.backoff_max);
		let mut position = **self.position.load();

		let result = 'watch: loop {
			let subscribed = tokio::select! {
				_ = self.cancel.cancelled() => break 'watch Ok(()),
				res = self.client.watch_from(&self.key, position) => res,
			};

			let mut stream = match subscribed {
				Ok(stream) => stream,
				Err(e) => {
					self.set_state(WatcherState::Resubscribing);
					let resubscriptions = self.stats.record_resubscription();
					error!(key = %self.key, error = %e, resubscriptions, "failed to open watch stream");
					if !self.pause(&mut backoff).await {
						break 'watch Ok(());
					}
					continue;
				}
			};

			self.set_state(WatcherState::Watching);
			let opened_at = Instant::now();
			let mut received = 0u64;

			loop {
				let next = tokio::select! {
					_ = self.cancel.cancelled() => break 'watch Ok(()),
					next = stream.next() => next,
				};
				let Some(event) = next else {
					break;
				};
				received += 1;
				self.stats.record_event();

				if event.key() != self.key {
					debug!(key = %self.key, event_key = event.key(), "ignoring event for another key");
					continue;
				}
				position = WatchFrom::after(&event);
				self.position.store(Arc::new(position));

				let Some(snapshot) = self.classify(event) else {
					continue;
				};

				let delivered = tokio::select! {
					_ = self.cancel.cancelled() => break 'watch Ok(()),
					res = sink.deliver(snapshot) => res,
				};
				match delivered {
					Ok(()) => self.stats.record_delivery(),
					Err(e) => {
						error!(key = %self.key, error = %e, "consumer dropped, stopping watcher");
						break 'watch Err(e.into());
					}
				}
			}

			self.set_state(WatcherState::Resubscribing);
			let resubscriptions = self.stats.record_resubscription();
			warn!(key = %self.key, received, resubscriptions, "watch stream closed, resubscribing");
			if received > 0 || opened_at.elapsed() >= STABLE_STREAM {
				backoff.reset();
			}
			if !self.pause(&mut backoff).await {
				break 'watch Ok(());
			}
		};

		self.set_state(WatcherState::Stopped);
		info!(key = %self.key, "config watcher stopped");
		result
	}

	/// Runs [`run`](Self::run) on a new task.
	pub fn spawn(self, sink: PropagationSink) -> WatchHandle {
		let cancel = self.cancel.clone();
		let state = self.subscribe_state();
		let stats = Arc::clone(&self.stats);
		let span = info_span!("config_watcher", key = %self.key);
		let task = tokio::spawn(async move { self.run(sink).await }.instrument(span));
		WatchHandle::new(cancel, state, stats, task)
	}

	/// Maps an event for the watched key to the snapshot to deliver, if any.
	fn classify(&self, event: WatchEvent) -> Option<ConfigSnapshot> {
		match event {
			WatchEvent::Delete { .. } => {
				self.stats.record_delete();
				warn!(key = %self.key, "watched key was deleted, propagating empty configuration");
				Some(ConfigSnapshot::empty())
			}
			WatchEvent::Put { value, .. } => match self.codec.decode(&value) {
				Ok(snapshot) => {
					info!(key = %self.key, entries = snapshot.len(), "received new configuration");
					Some(snapshot)
				}
				Err(e) => {
					self.stats.record_decode_failure();
					error!(key = %self.key, error = %e, "discarding malformed configuration update");
					None
				}
			},
		}
	}

	/// Sleeps for the next backoff delay. Returns false when cancelled.
	async fn pause(&self, backoff: &mut Backoff) -> bool {
		let delay = backoff.next_delay();
		let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
		debug!(key = %self.key, delay_ms, "waiting before resubscribing");
		tokio::select! {
			_ = self.cancel.cancelled() => false,
			_ = tokio::time::sleep(delay) => true,
		}
	}

	fn set_state(&self, state: WatcherState) {
		self.state.send_replace(state);
	}
}

impl std::fmt::Debug for ConfigWatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConfigWatcher")
			.field("client", &self.client)
			.field("codec", &self.codec)
			.field("key", &self.key)
			.field("state", &self.state())
			.finish_non_exhaustive()
	}
}
