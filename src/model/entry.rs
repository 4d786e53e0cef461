/* src/model/entry.rs */

use serde::{Deserialize, Serialize};

#[cfg(any(feature = "validate", feature = "glob"))]
use crate::codec::DecodeError;

/// One monitored target: where to collect from and where to forward to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "validate", derive(validator::Validate))]
pub struct CollectionEntry {
	/// Source path or glob pattern to collect from.
	#[serde(alias = "path")]
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	pub source: String,
	/// Sink or topic the collected data is forwarded to.
	#[serde(alias = "topic")]
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	pub sink: String,
}

impl CollectionEntry {
	pub fn new(source: impl Into<String>, sink: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			sink: sink.into(),
		}
	}

	/// Compiles `source` into a glob matcher.
	#[cfg(feature = "glob")]
	pub fn matcher(&self) -> Result<globset::GlobMatcher, globset::Error> {
		Ok(globset::Glob::new(&self.source)?.compile_matcher())
	}

	/// Runs the enabled entry checks after decoding.
	#[cfg(any(feature = "validate", feature = "glob"))]
	pub(crate) fn check(&self) -> Result<(), DecodeError> {
		#[cfg(feature = "validate")]
		validator::Validate::validate(self).map_err(DecodeError::Validation)?;

		#[cfg(feature = "glob")]
		self.matcher().map_err(DecodeError::Pattern)?;

		Ok(())
	}
}
