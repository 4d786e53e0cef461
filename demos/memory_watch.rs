/* demos/memory_watch.rs */

use std::time::Duration;

use livekv::{ConfigSnapshot, MemoryBackend, WatchConfig, WatcherState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	// 1. An in-process store standing in for the real one
	let store = MemoryBackend::new();
	let config = WatchConfig {
		endpoint: "memory".to_string(),
		..WatchConfig::default()
	};
	let key = config.key.clone();

	// 2. Connect, load (nothing stored yet) and start watching
	let started = livekv::start(config, store.clone()).await?;
	println!("Initial entries: {}", started.initial.len());
	let mut receiver = started.receiver;
	let handle = started.handle;

	// 3. Consumer applies each snapshot before asking for the next
	let consumer = tokio::spawn(async move {
		let mut current = ConfigSnapshot::empty();
		while let Some(next) = receiver.accept().await {
			let diff = next.diff(&current);
			println!("start {:?}, stop {:?}", diff.added, diff.removed);
			current = next;
		}
	});

	// 4. Change the store once the watch stream is open
	handle.wait_for_state(WatcherState::Watching).await;
	store.put(key.as_str(), br#"[{"source":"/var/log/a.log","sink":"topicA"}]"#.to_vec());
	tokio::time::sleep(Duration::from_millis(100)).await;
	store.put(
		key.as_str(),
		br#"[{"source":"/var/log/a.log","sink":"topicA"},{"source":"/var/log/b.log","sink":"topicB"}]"#.to_vec(),
	);
	tokio::time::sleep(Duration::from_millis(100)).await;
	store.put(key.as_str(), b"not-json".to_vec());
	store.delete(&key);
	tokio::time::sleep(Duration::from_millis(100)).await;

	// 5. Shut down
	handle.stop();
	handle.join().await?;
	consumer.await?;
	println!("Done.");
	Ok(())
}
