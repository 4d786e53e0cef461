/* src/store/client.rs */

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, info};

use super::{KvBackend, Record, StoreError, WatchFrom, WatchStream};

/// Connection wrapper around a [`KvBackend`].
///
/// The client is created once, connected once, and then shared by `Arc`
/// with whoever needs to read the store. All methods take `&self`.
pub struct StoreClient {
	backend: Arc<dyn KvBackend>,
	endpoint: OnceLock<String>,
}

impl StoreClient {
	/// Creates an unconnected client over `backend`.
	pub fn new(backend: impl KvBackend) -> Self {
		Self {
			backend: Arc::new(backend),
			endpoint: OnceLock::new(),
		}
	}

	/// Connects to `endpoint`, giving up after `dial_timeout`.
	pub async fn connect(&self, endpoint: &str, dial_timeout: Duration) -> Result<(), StoreError> {
		if let Some(current) = self.endpoint.get() {
			return Err(StoreError::AlreadyConnected {
				endpoint: current.clone(),
			});
		}

		match tokio::time::timeout(dial_timeout, self.backend.dial(endpoint)).await {
			Ok(Ok(())) => {}
			Ok(Err(e @ StoreError::Connection { .. })) => return Err(e),
			Ok(Err(e)) => {
				return Err(StoreError::Connection {
					endpoint: endpoint.to_string(),
					reason: e.to_string(),
				});
			}
			Err(_) => {
				return Err(StoreError::Connection {
					endpoint: endpoint.to_string(),
					reason: format!("dial timed out after {dial_timeout:?}"),
				});
			}
		}

		self.endpoint
			.set(endpoint.to_string())
			.map_err(|_| StoreError::AlreadyConnected {
				endpoint: endpoint.to_string(),
			})?;

		info!(endpoint, "connected to store");
		Ok(())
	}

	/// Returns the endpoint once connected.
	pub fn endpoint(&self) -> Option<&str> {
		self.endpoint.get().map(String::as_str)
	}

	pub fn is_connected(&self) -> bool {
		self.endpoint.get().is_some()
	}

	/// Reads the raw value stored under `key`.
	pub async fn get(&self, key: &str, read_timeout: Duration) -> Result<Vec<u8>, StoreError> {
		self.get_record(key, read_timeout).await.map(|record| record.value)
	}

	/// Reads the value stored under `key` together with its revision.
	pub async fn get_record(&self, key: &str, read_timeout: Duration) -> Result<Record, StoreError> {
		self.ensure_connected()?;

		match tokio::time::timeout(read_timeout, self.backend.get(key)).await {
			Ok(Ok(Some(record))) => {
				debug!(key, bytes = record.value.len(), revision = record.revision, "read value from store");
				Ok(record)
			}
			Ok(Ok(None)) => Err(StoreError::NotFound {
				key: key.to_string(),
			}),
			Ok(Err(e)) => Err(e),
			Err(_) => Err(StoreError::Timeout {
				key: key.to_string(),
				timeout: read_timeout,
			}),
		}
	}

	/// Opens a watch stream on `key` for changes made from now on.
	pub async fn watch(&self, key: &str) -> Result<WatchStream, StoreError> {
		self.watch_from(key, WatchFrom::Now).await
	}

	/// Opens a watch stream on `key` that first catches up from `from`.
	pub async fn watch_from(&self, key: &str, from: WatchFrom) -> Result<WatchStream, StoreError> {
		self.ensure_connected()?;
		let stream = self.backend.watch(key, from).await?;
		debug!(key, ?from, "opened watch stream");
		Ok(stream)
	}

	fn ensure_connected(&self) -> Result<(), StoreError> {
		if self.is_connected() {
			Ok(())
		} else {
			Err(StoreError::NotInitialized)
		}
	}
}

impl std::fmt::Debug for StoreClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StoreClient")
			.field("endpoint", &self.endpoint.get())
			.finish_non_exhaustive()
	}
}
