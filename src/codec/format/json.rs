/* src/codec/format/json.rs */

use super::super::{DecodeError, EncodeError, Format};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// JSON format parser using `serde_json`.
pub struct Json;

impl Format for Json {
	fn extensions(&self) -> &'static [&'static str] {
		&["json"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, DecodeError> {
		serde_json::from_slice(input).map_err(|e| DecodeError::Parse(e.to_string()))
	}

	fn render<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
		serde_json::to_vec(value).map_err(|e| EncodeError(e.to_string()))
	}

	fn is_absent(&self, input: &[u8]) -> bool {
		let trimmed = input.trim_ascii();
		trimmed.is_empty() || trimmed == b"null"
	}
}
