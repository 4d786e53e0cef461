/* src/store/file/worker.rs */

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use super::read_record;
use crate::model::WatchEvent;
use crate::store::{Record, WatchFrom};

/// Turns raw notify events for one file into debounced watch events.
///
/// Bursts (editors writing through a temp file and renaming it, truncate
/// followed by write) are collapsed: once `debounce` passes without a new
/// event, the file is read and reported as a put, or as a delete when it is
/// gone. A read that finds the content already reported emits nothing.
pub(crate) async fn process_events(
	mut raw_rx: mpsc::Receiver<notify::Result<notify::Event>>,
	event_tx: mpsc::Sender<WatchEvent>,
	key: String,
	path: PathBuf,
	from: WatchFrom,
	debounce: Duration,
) {
	// The notify watcher is already running, so this read cannot miss a write.
	let mut position = match read_current(&key, &path).await {
		Some(current) => {
			if let Some(event) = from.catch_up(&key, current.as_ref())
				&& event_tx.send(event).await.is_err()
			{
				return;
			}
			WatchFrom::seen(current.as_ref())
		}
		None if from == WatchFrom::Now => WatchFrom::Absent,
		None => from,
	};

	let mut last_seen: Option<Instant> = None;

	let tick_rate = if debounce < Duration::from_millis(50) {
		debounce.max(Duration::from_millis(1))
	} else {
		debounce / 5
	};
	let mut interval = tokio::time::interval(tick_rate);

	loop {
		tokio::select! {
			maybe_event = raw_rx.recv() => {
				match maybe_event {
					Some(Ok(event)) => {
						if is_relevant(&event, &path) {
							last_seen = Some(Instant::now());
						}
					}
					Some(Err(e)) => tracing::error!(key = %key, error = %e, "filesystem watch error"),
					None => break,
				}
			}
			_ = interval.tick() => {
				let due = last_seen.is_some_and(|t| t.elapsed() >= debounce);
				if !due {
					continue;
				}
				last_seen = None;
				let Some(current) = read_current(&key, &path).await else {
					continue;
				};
				let event = position.catch_up(&key, current.as_ref());
				position = WatchFrom::seen(current.as_ref());
				let Some(event) = event else {
					tracing::debug!(key = %key, "file content unchanged");
					continue;
				};
				if event_tx.send(event).await.is_err() {
					break;
				}
			}
		}
	}
}

fn is_relevant(event: &notify::Event, target: &Path) -> bool {
	use notify::EventKind as NK;
	if !matches!(event.kind, NK::Create(_) | NK::Modify(_) | NK::Remove(_)) {
		return false;
	}

	// The parent directory is watched, so match on the file name only.
	let name = target.file_name();
	event.paths.iter().any(|p| p.file_name() == name)
}

/// `Some(None)` when the file is gone, `None` when it could not be read.
async fn read_current(key: &str, path: &Path) -> Option<Option<Record>> {
	match read_record(path).await {
		Ok(current) => Some(current),
		Err(e) => {
			tracing::error!(key, error = %e, "failed to read changed file");
			None
		}
	}
}
