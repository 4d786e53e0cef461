/* demos/file_watch.rs */

use std::path::PathBuf;

use livekv::{FileBackend, WatchConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	// Root directory acting as the store; defaults to ./store
	let root = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("store"));
	tokio::fs::create_dir_all(root.join("config")).await?;

	let config = WatchConfig {
		endpoint: root.to_string_lossy().into_owned(),
		..WatchConfig::default()
	};
	println!(
		"Watching {} (edit or delete the file to see updates, Ctrl-C to quit)",
		root.join(&config.key).display()
	);

	let started = livekv::start(config, FileBackend::new()).await?;
	println!("Initial: {:?}", started.initial);

	let mut receiver = started.receiver;
	let handle = started.handle;

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => break,
			next = receiver.accept() => match next {
				Some(snapshot) => println!("Now collecting: {:?}", snapshot.entries()),
				None => break,
			},
		}
	}

	handle.stop();
	handle.join().await?;
	Ok(())
}
