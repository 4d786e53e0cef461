/* src/watcher/config.rs */

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::{AnyFormat, DecodeError, Format};
use crate::sink::DEFAULT_STALL_WARNING;

/// Key watched when none is configured.
pub const DEFAULT_KEY: &str = "config/collectors";

/// Settings for connecting to the store and running the watcher.
///
/// Durations are written as integer milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
	/// Store address handed to the backend's dial.
	pub endpoint: String,

	/// Key holding the collection entry list.
	pub key: String,

	/// Payload format, by extension (`json`, `yaml`, `bin`).
	pub format: String,

	#[serde(with = "millis")]
	pub dial_timeout: Duration,

	/// Bound on the initial read.
	#[serde(with = "millis")]
	pub read_timeout: Duration,

	/// First delay before resubscribing after the watch stream ends.
	#[serde(with = "millis")]
	pub backoff_initial: Duration,

	/// Upper bound for the resubscribe delay.
	#[serde(with = "millis")]
	pub backoff_max: Duration,

	/// Interval between warnings while the consumer does not accept.
	#[serde(with = "millis")]
	pub stall_warning: Duration,
}

impl Default for WatchConfig {
	fn default() -> Self {
		Self {
			endpoint: "127.0.0.1:2379".to_string(),
			key: DEFAULT_KEY.to_string(),
			format: "json".to_string(),
			dial_timeout: Duration::from_secs(5),
			read_timeout: Duration::from_secs(5),
			backoff_initial: Duration::from_millis(100),
			backoff_max: Duration::from_secs(5),
			stall_warning: DEFAULT_STALL_WARNING,
		}
	}
}

impl WatchConfig {
	/// Parses a config document in the given format.
	pub fn from_slice(format: AnyFormat, input: &[u8]) -> Result<Self, DecodeError> {
		format.parse(input)
	}

	/// Resolves [`format`](Self::format) to a compiled-in format.
	pub fn payload_format(&self) -> Option<AnyFormat> {
		AnyFormat::from_extension(&self.format)
	}
}

mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}
