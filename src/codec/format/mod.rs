/* src/codec/format/mod.rs */

use super::{DecodeError, EncodeError, Format};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::Json;

#[cfg(feature = "yaml")]
mod yaml;
#[cfg(feature = "yaml")]
pub use yaml::Yaml;

#[cfg(feature = "postcard")]
mod postcard;
#[cfg(feature = "postcard")]
pub use self::postcard::Postcard;

/// An enum wrapper for all supported formats, enabling dynamic dispatch-like behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyFormat {
	#[cfg(feature = "json")]
	Json,
	#[cfg(feature = "yaml")]
	Yaml,
	#[cfg(feature = "postcard")]
	Postcard,
}

impl AnyFormat {
	/// Picks the format registered for a file extension.
	pub fn from_extension(ext: &str) -> Option<Self> {
		let all = [
			#[cfg(feature = "json")]
			Self::Json,
			#[cfg(feature = "yaml")]
			Self::Yaml,
			#[cfg(feature = "postcard")]
			Self::Postcard,
		];
		all.into_iter().find(|f| f.extensions().contains(&ext))
	}
}

impl Format for AnyFormat {
	fn extensions(&self) -> &'static [&'static str] {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.extensions(),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.extensions(),
			#[cfg(feature = "postcard")]
			Self::Postcard => Postcard.extensions(),
			#[cfg(not(any(feature = "json", feature = "yaml", feature = "postcard")))]
			_ => unreachable!(),
		}
	}

	fn parse<T: DeserializeOwned>(&self, _input: &[u8]) -> Result<T, DecodeError> {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.parse(_input),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.parse(_input),
			#[cfg(feature = "postcard")]
			Self::Postcard => Postcard.parse(_input),
			#[cfg(not(any(feature = "json", feature = "yaml", feature = "postcard")))]
			_ => unreachable!(),
		}
	}

	fn render<T: Serialize>(&self, _value: &T) -> Result<Vec<u8>, EncodeError> {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.render(_value),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.render(_value),
			#[cfg(feature = "postcard")]
			Self::Postcard => Postcard.render(_value),
			#[cfg(not(any(feature = "json", feature = "yaml", feature = "postcard")))]
			_ => unreachable!(),
		}
	}

	fn is_absent(&self, input: &[u8]) -> bool {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.is_absent(input),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.is_absent(input),
			#[cfg(feature = "postcard")]
			Self::Postcard => Postcard.is_absent(input),
			#[cfg(not(any(feature = "json", feature = "yaml", feature = "postcard")))]
			_ => input.is_empty(),
		}
	}
}
