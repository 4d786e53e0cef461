/* src/watcher/handle.rs */

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{WatchError, WatchStats, WatcherState};

/// Handle to a watcher running on its own task.
///
/// Dropping the handle cancels the watcher.
pub struct WatchHandle {
	cancel: CancellationToken,
	state: watch::Receiver<WatcherState>,
	stats: Arc<WatchStats>,
	task: Option<JoinHandle<Result<(), WatchError>>>,
}

impl WatchHandle {
	pub(crate) fn new(
		cancel: CancellationToken,
		state: watch::Receiver<WatcherState>,
		stats: Arc<WatchStats>,
		task: JoinHandle<Result<(), WatchError>>,
	) -> Self {
		Self {
			cancel,
			state,
			stats,
			task: Some(task),
		}
	}

	/// Asks the watcher to stop. Use [`join`](Self::join) to wait for it.
	pub fn stop(&self) {
		self.cancel.cancel();
	}

	/// Returns the watcher's current state.
	pub fn state(&self) -> WatcherState {
		*self.state.borrow()
	}

	/// Waits until the watcher reaches `target`.
	///
	/// Returns false if the watcher task ended first.
	pub async fn wait_for_state(&self, target: WatcherState) -> bool {
		let mut rx = self.state.clone();
		rx.wait_for(|state| *state == target).await.is_ok()
	}

	pub fn stats(&self) -> &WatchStats {
		&self.stats
	}

	/// Returns true once the watcher task has exited.
	pub fn is_finished(&self) -> bool {
		self.task.as_ref().is_none_or(JoinHandle::is_finished)
	}

	/// Waits for the watcher task and returns how it ended.
	pub async fn join(mut self) -> Result<(), WatchError> {
		match self.task.take() {
			Some(task) => task.await?,
			None => Ok(()),
		}
	}
}

impl Drop for WatchHandle {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

impl std::fmt::Debug for WatchHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WatchHandle")
			.field("state", &self.state())
			.field("finished", &self.is_finished())
			.finish_non_exhaustive()
	}
}
