/* src/codec/format/postcard.rs */

use super::super::{DecodeError, EncodeError, Format};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Postcard format parser using `postcard`.
pub struct Postcard;

impl Format for Postcard {
	fn extensions(&self) -> &'static [&'static str] {
		&["bin", "post"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, DecodeError> {
		let (value, rest) =
			postcard::take_from_bytes(input).map_err(|e| DecodeError::Parse(e.to_string()))?;
		if !rest.is_empty() {
			return Err(DecodeError::Parse(format!(
				"{} trailing bytes after payload",
				rest.len()
			)));
		}
		Ok(value)
	}

	fn render<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
		postcard::to_stdvec(value).map_err(|e| EncodeError(e.to_string()))
	}

	// Binary payloads are never trimmed.
	fn is_absent(&self, input: &[u8]) -> bool {
		input.is_empty()
	}
}
