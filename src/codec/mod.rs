/* src/codec/mod.rs */

//!
//! Payload decoding for collection entry lists.
//!
//! A [`Format`] turns raw bytes into serde values; [`ConfigCodec`] applies a
//! format to the stored payload and enforces the snapshot rules on top.

mod error;
pub mod format;

pub use error::{DecodeError, EncodeError};
pub use format::AnyFormat;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{CollectionEntry, ConfigSnapshot};

/// Abstract format parser that converts bytes into a structured object.
pub trait Format: Send + Sync {
	/// List of supported extensions or identifiers.
	fn extensions(&self) -> &'static [&'static str];

	/// Parse the raw bytes into the target type.
	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, DecodeError>;

	/// Serialize a value into this format.
	fn render<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodeError>;

	/// Returns true when `input` carries no document at all.
	///
	/// Text formats treat blank input and their null literal as absent.
	fn is_absent(&self, input: &[u8]) -> bool {
		input.trim_ascii().is_empty()
	}
}

/// Decodes stored payloads into [`ConfigSnapshot`]s.
#[derive(Debug, Clone, Copy)]
pub struct ConfigCodec {
	format: AnyFormat,
}

impl ConfigCodec {
	pub const fn new(format: AnyFormat) -> Self {
		Self { format }
	}

	#[cfg(feature = "json")]
	pub const fn json() -> Self {
		Self::new(AnyFormat::Json)
	}

	pub fn format(&self) -> AnyFormat {
		self.format
	}

	/// Decodes a payload into a snapshot.
	///
	/// Absent input decodes to the empty snapshot. Callers distinguish a
	/// deleted key from an empty payload before getting here.
	pub fn decode(&self, raw: &[u8]) -> Result<ConfigSnapshot, DecodeError> {
		if self.format.is_absent(raw) {
			return Ok(ConfigSnapshot::empty());
		}

		let entries: Vec<CollectionEntry> = self.format.parse(raw)?;

		#[cfg(any(feature = "validate", feature = "glob"))]
		for entry in &entries {
			entry.check()?;
		}

		Ok(ConfigSnapshot::new(entries))
	}

	/// Encodes a snapshot in the codec's format.
	pub fn encode(&self, snapshot: &ConfigSnapshot) -> Result<Vec<u8>, EncodeError> {
		self.format.render(&snapshot.entries())
	}
}

#[cfg(feature = "json")]
impl Default for ConfigCodec {
	fn default() -> Self {
		Self::json()
	}
}
