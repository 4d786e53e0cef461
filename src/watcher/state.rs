/* src/watcher/state.rs */

/// Lifecycle of a [`ConfigWatcher`](super::ConfigWatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WatcherState {
	/// Built, nothing read yet.
	#[default]
	Idle,
	/// Reading the initial configuration.
	Loading,
	/// A watch stream is open and being consumed.
	Watching,
	/// The watch stream ended or could not be opened; waiting to retry.
	Resubscribing,
	/// Cancelled, or the consumer went away.
	Stopped,
}
