/* src/codec/format/yaml.rs */

use super::super::{DecodeError, EncodeError, Format};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// YAML format parser using `serde_yaml`.
pub struct Yaml;

impl Format for Yaml {
	fn extensions(&self) -> &'static [&'static str] {
		&["yaml", "yml"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, DecodeError> {
		serde_yaml::from_slice(input).map_err(|e| DecodeError::Parse(e.to_string()))
	}

	fn render<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
		serde_yaml::to_string(value)
			.map(String::into_bytes)
			.map_err(|e| EncodeError(e.to_string()))
	}

	fn is_absent(&self, input: &[u8]) -> bool {
		matches!(
			input.trim_ascii(),
			b"" | b"~" | b"null" | b"Null" | b"NULL" | b"---"
		)
	}
}
