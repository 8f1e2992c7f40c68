//! Router configuration.
//!
//! Limits applied while compiling templates and defining route trees.
//! Supports loading from TOML; every field falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default bound on route group nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 10;

/// Default maximum template length in bytes.
pub const DEFAULT_MAX_TEMPLATE_LENGTH: usize = 1024;

/// Default maximum number of segments in a template.
pub const DEFAULT_MAX_TEMPLATE_SEGMENTS: usize = 32;

/// Configuration for compiling and registering routes.
///
/// # Example
///
/// ```
/// use waymark_urls::RouterConfig;
///
/// let config = RouterConfig::from_toml("max_nesting_depth = 4").unwrap();
/// assert_eq!(config.max_nesting_depth, 4);
/// assert_eq!(config.max_template_length, 1024);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Deepest allowed group nesting; the root group counts as level 1.
	pub max_nesting_depth: usize,

	/// Longest accepted template, in bytes.
	pub max_template_length: usize,

	/// Most segments a single template may have.
	pub max_template_segments: usize,

	/// Match literal segments with Unicode simple case folding, so `Ü` and
	/// `ü` are the same letter.
	pub case_insensitive: bool,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
			max_template_length: DEFAULT_MAX_TEMPLATE_LENGTH,
			max_template_segments: DEFAULT_MAX_TEMPLATE_SEGMENTS,
			case_insensitive: false,
		}
	}
}

impl RouterConfig {
	/// Sets the nesting bound.
	pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
		self.max_nesting_depth = depth;
		self
	}

	/// Sets whether literal segments ignore case.
	pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
		self.case_insensitive = case_insensitive;
		self
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError {
			path: path.as_ref().to_path_buf(),
			message: e.to_string(),
		})?;

		Self::from_toml(&content)
	}

	/// Parse configuration from TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|e| ConfigError::ParseError {
			message: e.to_string(),
		})
	}
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	/// The file could not be read.
	#[error("failed to read {}: {message}", .path.display())]
	IoError {
		/// File that failed.
		path: PathBuf,
		/// Underlying I/O error message.
		message: String,
	},

	/// The content is not valid TOML for the target type.
	#[error("failed to parse configuration: {message}")]
	ParseError {
		/// Parser message.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn test_default_limits() {
		let config = RouterConfig::default();
		assert_eq!(config.max_nesting_depth, 10);
		assert_eq!(config.max_template_length, 1024);
		assert_eq!(config.max_template_segments, 32);
		assert!(!config.case_insensitive);
	}

	#[rstest]
	fn test_from_toml_partial_overrides() {
		// Arrange
		let content = "case_insensitive = true\nmax_template_segments = 8\n";

		// Act
		let config = RouterConfig::from_toml(content).unwrap();

		// Assert
		assert!(config.case_insensitive);
		assert_eq!(config.max_template_segments, 8);
		assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
	}

	#[rstest]
	fn test_from_toml_rejects_wrong_type() {
		let result = RouterConfig::from_toml("max_nesting_depth = \"deep\"");
		assert!(matches!(result, Err(ConfigError::ParseError { .. })));
	}

	#[rstest]
	fn test_from_file_roundtrip() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "max_nesting_depth = 3").unwrap();

		// Act
		let config = RouterConfig::from_file(file.path()).unwrap();

		// Assert
		assert_eq!(config.max_nesting_depth, 3);
	}

	#[rstest]
	fn test_from_file_missing() {
		let result = RouterConfig::from_file("/nonexistent/waymark.toml");
		assert!(matches!(result, Err(ConfigError::IoError { .. })));
	}
}
