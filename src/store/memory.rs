/* src/store/memory.rs */

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::warn;

use super::{KvBackend, Record, StoreError, WatchFrom, WatchStream};
use crate::model::WatchEvent;

/// Default watch channel capacity.
pub const DEFAULT_WATCH_CAPACITY: usize = 100;

/// In-process key-value store.
///
/// Reads are lock-free through an RCU map. Every put and delete fans out to
/// the open watch streams. Writes and subscribes are serialized, so events
/// reach every stream in revision order. Clones share the same data, so a test can keep a
/// handle while a [`StoreClient`](super::StoreClient) owns another.
///
/// The outage knobs ([`set_reachable`](Self::set_reachable),
/// [`set_latency`](Self::set_latency), [`close_watches`](Self::close_watches))
/// let callers reproduce what a remote store does to its clients.
#[derive(Clone)]
pub struct MemoryBackend {
	inner: Arc<Shared>,
}

struct Shared {
	writes: Mutex<()>,
	data: ArcSwap<HashMap<String, Record>>,
	revision: AtomicU64,
	events: ArcSwap<broadcast::Sender<WatchEvent>>,
	capacity: usize,
	reachable: AtomicBool,
	latency_ms: AtomicU64,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::with_watch_capacity(DEFAULT_WATCH_CAPACITY)
	}

	/// Creates a store whose watch streams buffer up to `capacity` events.
	///
	/// Note: a stream that falls further behind skips the oldest events.
	pub fn with_watch_capacity(capacity: usize) -> Self {
		Self {
			inner: Arc::new(Shared {
				writes: Mutex::new(()),
				data: ArcSwap::from_pointee(HashMap::new()),
				revision: AtomicU64::new(0),
				events: ArcSwap::from_pointee(broadcast::channel(capacity).0),
				capacity,
				reachable: AtomicBool::new(true),
				latency_ms: AtomicU64::new(0),
			}),
		}
	}

	/// Writes `value` under `key` and returns the new revision.
	pub fn put(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> u64 {
		let key = key.into();
		let value = value.into();

		let _writes = self.lock_writes();
		let revision = self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1;
		let record = Record {
			value: value.clone(),
			revision,
		};

		self.inner.data.rcu(|map| {
			let mut new_map = (**map).clone();
			new_map.insert(key.clone(), record.clone());
			new_map
		});

		let _ = self.inner.events.load().send(WatchEvent::Put {
			key,
			value,
			revision,
		});
		revision
	}

	/// Deletes `key`. Deleting a missing key emits no event.
	pub fn delete(&self, key: &str) -> Option<Record> {
		let _writes = self.lock_writes();
		let removed: RefCell<Option<Record>> = RefCell::new(None);

		self.inner.data.rcu(|map| {
			let mut new_map = (**map).clone();
			*removed.borrow_mut() = new_map.remove(key);
			new_map
		});

		let removed = removed.into_inner();
		if removed.is_some() {
			self.inner.revision.fetch_add(1, Ordering::SeqCst);
			let _ = self.inner.events.load().send(WatchEvent::Delete {
				key: key.to_string(),
			});
		}
		removed
	}

	/// Returns the record stored under `key`.
	pub fn record(&self, key: &str) -> Option<Record> {
		self.inner.data.load().get(key).cloned()
	}

	/// Returns the latest store revision.
	pub fn revision(&self) -> u64 {
		self.inner.revision.load(Ordering::SeqCst)
	}

	/// Ends every open watch stream, as a server-side stream reset would.
	pub fn close_watches(&self) {
		let _writes = self.lock_writes();
		self.inner
			.events
			.store(Arc::new(broadcast::channel(self.inner.capacity).0));
	}

	/// Number of watch streams currently open.
	pub fn watcher_count(&self) -> usize {
		self.inner.events.load().receiver_count()
	}

	/// Makes dial, get and watch fail as if the store were down.
	pub fn set_reachable(&self, reachable: bool) {
		self.inner.reachable.store(reachable, Ordering::SeqCst);
		if !reachable {
			self.close_watches();
		}
	}

	/// Delays every dial and get by `latency`.
	pub fn set_latency(&self, latency: Duration) {
		let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
		self.inner.latency_ms.store(ms, Ordering::SeqCst);
	}

	fn lock_writes(&self) -> MutexGuard<'_, ()> {
		// The guarded state lives outside the mutex, so a poisoned lock is still usable.
		self.inner.writes.lock().unwrap_or_else(PoisonError::into_inner)
	}

	async fn respond(&self, endpoint: &str) -> Result<(), StoreError> {
		let latency = self.inner.latency_ms.load(Ordering::SeqCst);
		if latency > 0 {
			tokio::time::sleep(Duration::from_millis(latency)).await;
		}
		if self.inner.reachable.load(Ordering::SeqCst) {
			Ok(())
		} else {
			Err(StoreError::Connection {
				endpoint: endpoint.to_string(),
				reason: "store unreachable".to_string(),
			})
		}
	}
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl KvBackend for MemoryBackend {
	async fn dial(&self, endpoint: &str) -> Result<(), StoreError> {
		self.respond(endpoint).await
	}

	async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
		self.respond("memory").await?;
		Ok(self.record(key))
	}

	async fn watch(&self, key: &str, from: WatchFrom) -> Result<WatchStream, StoreError> {
		if !self.inner.reachable.load(Ordering::SeqCst) {
			return Err(StoreError::Connection {
				endpoint: "memory".to_string(),
				reason: "store unreachable".to_string(),
			});
		}

		let (rx, first) = {
			let _writes = self.lock_writes();
			let rx = self.inner.events.load().subscribe();
			(rx, from.catch_up(key, self.record(key).as_ref()))
		};

		let key = key.to_string();
		let live = BroadcastStream::new(rx).filter_map(move |res| match res {
			Ok(event) if event.key() == key => Some(event),
			Ok(_) => None,
			Err(BroadcastStreamRecvError::Lagged(skipped)) => {
				warn!(key = %key, skipped, "watch stream lagged, events were skipped");
				None
			}
		});

		Ok(Box::pin(tokio_stream::iter(first).chain(live)))
	}
}

impl std::fmt::Debug for MemoryBackend {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryBackend")
			.field("keys", &self.inner.data.load().len())
			.field("revision", &self.revision())
			.field("watchers", &self.watcher_count())
			.finish()
	}
}
