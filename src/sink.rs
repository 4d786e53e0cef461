/* src/sink.rs */

//!
//! Single-slot hand-off between the watcher and its consumer.
//!
//! [`PropagationSink::deliver`] returns only after the consumer took the
//! snapshot through [`SinkReceiver::accept`]. Nothing is buffered beyond the
//! one snapshot in flight and nothing is dropped, so a consumer that stops
//! accepting stalls the watcher. The stall is reported with a warning every
//! `stall_warning` interval.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::warn;

use crate::model::ConfigSnapshot;

/// Default interval between warnings while a delivery waits on the consumer.
pub const DEFAULT_STALL_WARNING: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
	/// The consumer side was dropped; the snapshot was not accepted.
	#[error("consumer is gone, snapshot was not accepted")]
	Closed,
}

struct Handoff {
	snapshot: ConfigSnapshot,
	accepted: oneshot::Sender<()>,
}

/// Producer side of the hand-off, owned by the watcher.
#[derive(Debug)]
pub struct PropagationSink {
	tx: mpsc::Sender<Handoff>,
	stall_warning: Duration,
}

/// Consumer side of the hand-off.
#[derive(Debug)]
pub struct SinkReceiver {
	rx: mpsc::Receiver<Handoff>,
}

/// Creates a connected sink/receiver pair.
pub fn channel(stall_warning: Duration) -> (PropagationSink, SinkReceiver) {
	let (tx, rx) = mpsc::channel(1);
	(PropagationSink { tx, stall_warning }, SinkReceiver { rx })
}

impl PropagationSink {
	/// Hands `snapshot` to the consumer and waits until it is accepted.
	///
	/// Snapshots are accepted in the order they are delivered. Blocks for as
	/// long as the consumer does not call `accept`.
	pub async fn deliver(&self, snapshot: ConfigSnapshot) -> Result<(), SinkError> {
		let (accepted, mut ack) = oneshot::channel();
		self.tx
			.send(Handoff { snapshot, accepted })
			.await
			.map_err(|_| SinkError::Closed)?;

		let started = Instant::now();
		loop {
			match tokio::time::timeout(self.stall_warning, &mut ack).await {
				Ok(Ok(())) => return Ok(()),
				// Receiver dropped with the hand-off still queued.
				Ok(Err(_)) => return Err(SinkError::Closed),
				Err(_) => {
					let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
					warn!(waited_ms, "consumer has not accepted the pending configuration snapshot");
				}
			}
		}
	}

	/// Returns true once the consumer side is dropped.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

impl SinkReceiver {
	/// Waits for the next snapshot.
	///
	/// Returns `None` once the watcher side is gone and nothing is pending.
	pub async fn accept(&mut self) -> Option<ConfigSnapshot> {
		let Handoff { snapshot, accepted } = self.rx.recv().await?;
		let _ = accepted.send(());
		Some(snapshot)
	}

	/// Takes a snapshot if one is waiting, without blocking.
	pub fn try_accept(&mut self) -> Option<ConfigSnapshot> {
		let Handoff { snapshot, accepted } = self.rx.try_recv().ok()?;
		let _ = accepted.send(());
		Some(snapshot)
	}
}
