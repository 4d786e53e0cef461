/* src/watcher/stats.rs */

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing what the watcher has done so far.
///
/// A steadily growing `resubscriptions` count points at an unstable store
/// connection.
#[derive(Debug, Default)]
pub struct WatchStats {
	events: AtomicU64,
	deliveries: AtomicU64,
	deletes: AtomicU64,
	decode_failures: AtomicU64,
	resubscriptions: AtomicU64,
}

impl WatchStats {
	/// Watch events received.
	pub fn events(&self) -> u64 {
		self.events.load(Ordering::Relaxed)
	}

	/// Snapshots accepted by the consumer.
	pub fn deliveries(&self) -> u64 {
		self.deliveries.load(Ordering::Relaxed)
	}

	/// Delete events seen.
	pub fn deletes(&self) -> u64 {
		self.deletes.load(Ordering::Relaxed)
	}

	/// Put events discarded because their payload did not decode.
	pub fn decode_failures(&self) -> u64 {
		self.decode_failures.load(Ordering::Relaxed)
	}

	/// Times the watch stream closed or could not be opened.
	pub fn resubscriptions(&self) -> u64 {
		self.resubscriptions.load(Ordering::Relaxed)
	}

	pub(crate) fn record_event(&self) {
		self.events.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_delivery(&self) {
		self.deliveries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_delete(&self) {
		self.deletes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_decode_failure(&self) {
		self.decode_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_resubscription(&self) -> u64 {
		self.resubscriptions.fetch_add(1, Ordering::Relaxed) + 1
	}
}
