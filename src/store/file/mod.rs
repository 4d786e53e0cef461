/* src/store/file/mod.rs */

//!
//! Directory-backed store for local development.
//!
//! The endpoint is a directory; every key names a file below it, so the key
//! `config/collectors` lives at `<root>/config/collectors`. A file's
//! revision is a hash of its content.

mod worker;

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::OnceLock;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::Stream;
use notify::{RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tokio::fs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use super::{KvBackend, Record, StoreError, WatchFrom, WatchStream};
use crate::model::WatchEvent;
use worker::process_events;

/// Default window in which filesystem events for a key are coalesced.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// A store that maps keys to files under a root directory.
#[derive(Debug)]
pub struct FileBackend {
	root: OnceLock<PathBuf>,
	debounce: Duration,
}

impl FileBackend {
	pub fn new() -> Self {
		Self::with_debounce(DEFAULT_DEBOUNCE)
	}

	/// Creates a backend that waits `debounce` after the last filesystem
	/// event before reporting a change.
	pub fn with_debounce(debounce: Duration) -> Self {
		Self {
			root: OnceLock::new(),
			debounce,
		}
	}

	fn root(&self) -> Result<&Path, StoreError> {
		self.root
			.get()
			.map(PathBuf::as_path)
			.ok_or(StoreError::NotInitialized)
	}

	/// Maps a key to its file, rejecting keys that leave the root.
	fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
		let root = self.root()?;
		let relative = Path::new(key);
		let escapes = relative
			.components()
			.any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
		if escapes || key.is_empty() {
			return Err(StoreError::SandboxViolation {
				key: key.to_string(),
			});
		}
		Ok(root.join(relative))
	}
}

impl Default for FileBackend {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl KvBackend for FileBackend {
	async fn dial(&self, endpoint: &str) -> Result<(), StoreError> {
		let unreachable = |reason: String| StoreError::Connection {
			endpoint: endpoint.to_string(),
			reason,
		};

		let root = fs::canonicalize(endpoint)
			.await
			.map_err(|e| unreachable(e.to_string()))?;
		let meta = fs::metadata(&root)
			.await
			.map_err(|e| unreachable(e.to_string()))?;
		if !meta.is_dir() {
			return Err(unreachable("not a directory".to_string()));
		}

		self.root
			.set(root)
			.map_err(|_| StoreError::AlreadyConnected {
				endpoint: endpoint.to_string(),
			})
	}

	async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
		let path = self.resolve(key)?;
		Ok(read_record(&path).await?)
	}

	async fn watch(&self, key: &str, from: WatchFrom) -> Result<WatchStream, StoreError> {
		let path = self.resolve(key)?;
		let parent = path
			.parent()
			.map(Path::to_path_buf)
			.ok_or_else(|| StoreError::Backend(format!("key has no parent directory: {key}")))?;

		if !fs::try_exists(&parent).await? {
			return Err(StoreError::Backend(format!(
				"directory does not exist: {}",
				parent.display()
			)));
		}

		let (raw_tx, raw_rx) = mpsc::channel(100);
		let mut watcher =
			notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
				let _ = raw_tx.blocking_send(res);
			})?;
		watcher.watch(&parent, RecursiveMode::NonRecursive)?;

		let (event_tx, event_rx) = mpsc::channel(16);
		let task = tokio::spawn(process_events(
			raw_rx,
			event_tx,
			key.to_string(),
			path,
			from,
			self.debounce,
		));

		Ok(Box::pin(FileWatchStream {
			_watcher: watcher,
			task,
			inner: ReceiverStream::new(event_rx),
		}))
	}
}

/// Reads the file at `path`, `None` if it does not exist.
pub(crate) async fn read_record(path: &Path) -> std::io::Result<Option<Record>> {
	match fs::read(path).await {
		Ok(value) => {
			let mut hasher = DefaultHasher::new();
			value.hash(&mut hasher);
			Ok(Some(Record {
				revision: hasher.finish(),
				value,
			}))
		}
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e),
	}
}

/// Watch stream that owns the filesystem watcher feeding it.
struct FileWatchStream {
	_watcher: RecommendedWatcher,
	task: JoinHandle<()>,
	inner: ReceiverStream<WatchEvent>,
}

impl Stream for FileWatchStream {
	type Item = WatchEvent;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.inner).poll_next(cx)
	}
}

impl Drop for FileWatchStream {
	fn drop(&mut self) {
		self.task.abort();
	}
}
