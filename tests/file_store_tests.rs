/* tests/file_store_tests.rs */

#![cfg(all(feature = "file", feature = "json"))]

use std::time::Duration;

use futures_util::StreamExt;
use livekv::store::{FileBackend, StoreClient, StoreError, WatchFrom};
use livekv::{CollectionEntry, SinkReceiver, WatchConfig, WatchEvent, WatcherState};

const KEY: &str = "config/collectors";

async fn connected(root: &std::path::Path) -> StoreClient {
	let client = StoreClient::new(FileBackend::with_debounce(Duration::from_millis(50)));
	client
		.connect(&root.to_string_lossy(), Duration::from_secs(1))
		.await
		.unwrap();
	client
}

async fn accept(receiver: &mut SinkReceiver) -> livekv::ConfigSnapshot {
	tokio::time::timeout(Duration::from_secs(5), receiver.accept())
		.await
		.expect("no snapshot delivered")
		.expect("watcher is gone")
}

#[tokio::test]
async fn test_dial_missing_directory() {
	let dir = tempfile::tempdir().unwrap();
	let client = StoreClient::new(FileBackend::new());

	let err = client
		.connect(&dir.path().join("missing").to_string_lossy(), Duration::from_secs(1))
		.await
		.unwrap_err();
	assert!(matches!(err, StoreError::Connection { .. }));
}

#[tokio::test]
async fn test_get_file_value() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	tokio::fs::create_dir(dir.path().join("config")).await?;
	let client = connected(dir.path()).await;

	assert!(matches!(
		client.get(KEY, Duration::from_secs(1)).await,
		Err(StoreError::NotFound { .. })
	));

	tokio::fs::write(dir.path().join(KEY), b"[]").await?;
	assert_eq!(client.get(KEY, Duration::from_secs(1)).await?, b"[]");
	Ok(())
}

#[tokio::test]
async fn test_key_cannot_escape_root() {
	let dir = tempfile::tempdir().unwrap();
	let client = connected(dir.path()).await;

	for key in ["../secrets", "/etc/passwd", ""] {
		assert!(
			matches!(
				client.get(key, Duration::from_secs(1)).await,
				Err(StoreError::SandboxViolation { .. })
			),
			"key {key:?} must be rejected"
		);
	}
}

#[tokio::test]
async fn test_file_live_reload() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	tokio::fs::create_dir(dir.path().join("config")).await?;
	let file = dir.path().join(KEY);
	tokio::fs::write(&file, br#"[{"source":"/var/log/a.log","sink":"topicA"}]"#).await?;

	let config = WatchConfig {
		endpoint: dir.path().to_string_lossy().into_owned(),
		..WatchConfig::default()
	};
	let started = livekv::start(config, FileBackend::with_debounce(Duration::from_millis(50))).await?;
	assert_eq!(
		started.initial.entries(),
		[CollectionEntry::new("/var/log/a.log", "topicA")]
	);
	let mut receiver = started.receiver;
	assert!(started.handle.wait_for_state(WatcherState::Watching).await);

	tokio::fs::write(&file, br#"[{"source":"/var/log/b.log","sink":"topicB"}]"#).await?;
	assert_eq!(
		accept(&mut receiver).await.entries(),
		[CollectionEntry::new("/var/log/b.log", "topicB")]
	);

	tokio::fs::remove_file(&file).await?;
	assert!(accept(&mut receiver).await.is_empty());
	Ok(())
}

#[tokio::test]
async fn test_watch_from_reports_missed_write() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	tokio::fs::create_dir(dir.path().join("config")).await?;
	let file = dir.path().join(KEY);
	tokio::fs::write(&file, b"[]").await?;
	let client = connected(dir.path()).await;

	let seen = client.get_record(KEY, Duration::from_secs(1)).await?;
	tokio::fs::write(&file, br#"[{"source":"a","sink":"t"}]"#).await?;

	let mut stream = client.watch_from(KEY, WatchFrom::Revision(seen.revision)).await?;
	match tokio::time::timeout(Duration::from_secs(5), stream.next()).await? {
		Some(WatchEvent::Put { value, .. }) => assert_eq!(value, br#"[{"source":"a","sink":"t"}]"#),
		other => panic!("expected put, got {:?}", other),
	}
	Ok(())
}

#[tokio::test]
async fn test_watch_from_current_content_reports_only_changes()
-> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	tokio::fs::create_dir(dir.path().join("config")).await?;
	let file = dir.path().join(KEY);
	tokio::fs::write(&file, b"[]").await?;
	let client = connected(dir.path()).await;

	let current = client.get_record(KEY, Duration::from_secs(1)).await?;
	let mut stream = client
		.watch_from(KEY, WatchFrom::seen(Some(&current)))
		.await?;

	tokio::fs::remove_file(&file).await?;
	let event = tokio::time::timeout(Duration::from_secs(5), stream.next()).await?;
	assert!(event.is_some_and(|e| e.is_delete()));
	Ok(())
}
