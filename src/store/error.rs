/* src/store/error.rs */

use std::time::Duration;

/// Errors raised by the store client and its backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// The store could not be reached while connecting.
	#[error("cannot connect to store at {endpoint}: {reason}")]
	Connection { endpoint: String, reason: String },

	/// An operation was issued before `connect()`.
	#[error("store client is not connected, call connect() first")]
	NotInitialized,

	/// `connect()` was called on a client that is already connected.
	#[error("store client is already connected to {endpoint}")]
	AlreadyConnected { endpoint: String },

	/// No value is stored under the key.
	#[error("key not found: {key}")]
	NotFound { key: String },

	/// The store did not answer in time.
	#[error("reading {key} timed out after {timeout:?}")]
	Timeout { key: String, timeout: Duration },

	/// Backend-specific failure.
	#[error("backend error: {0}")]
	Backend(String),

	/// IO error from a local backend.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// A key resolved outside the backend's root directory.
	#[cfg(feature = "file")]
	#[error("key escapes the store root: {key}")]
	SandboxViolation { key: String },

	/// Filesystem notification error.
	#[cfg(feature = "file")]
	#[error("notify error: {0}")]
	Notify(#[from] notify::Error),
}
