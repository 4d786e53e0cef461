/* src/codec/error.rs */

/// A payload could not be turned into a configuration snapshot.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
	/// The payload is not a well-formed list of collection entries.
	#[error("parse error: {0}")]
	Parse(String),

	/// An entry decoded but failed validation.
	#[cfg(feature = "validate")]
	#[error("validation failed: {0}")]
	Validation(#[from] validator::ValidationErrors),

	/// An entry's source is not a valid glob pattern.
	#[cfg(feature = "glob")]
	#[error("invalid source pattern: {0}")]
	Pattern(#[from] globset::Error),
}

/// A snapshot could not be serialized.
#[derive(Debug, thiserror::Error)]
#[error("encode error: {0}")]
pub struct EncodeError(pub String);
