//! Route template compilation.
//!
//! Templates are made of literal segments and `:name` dynamic segments:
//! - `/about` - exact match
//! - `/users/:id` - one parameter
//! - `/users/:user/posts/:post` - several parameters, in declaration order
//!
//! A dynamic segment captures one or more characters other than `/`.
//! Every template accepts the path with or without a single trailing `/`;
//! the declared trailing `/` is only significant when building paths.

use crate::config::RouterConfig;
use crate::error::{RouterError, RouterResult};
use crate::params::RouteParams;
use std::fmt;

/// Path separator; every template must start with it.
pub const SEPARATOR: char = '/';

/// Marks a dynamic segment.
pub const PARAM_SENTINEL: char = ':';

/// Maximum allowed size for a compiled template regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// One segment of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Matched verbatim.
	Literal(String),
	/// Binds one non-empty run of non-separator characters to a name.
	Dynamic(String),
}

/// A compiled route template.
///
/// Created once when a template is registered and immutable afterwards.
/// Routers share patterns through `Arc`, and a [`MatchedRoute`] compares
/// patterns by identity.
///
/// [`MatchedRoute`]: crate::MatchedRoute
#[derive(Debug, Clone)]
pub struct CompiledPattern {
	/// The original template string.
	template: String,
	/// Parsed segments, without the leading separator.
	segments: Vec<Segment>,
	/// Parameter names in declaration order.
	param_names: Vec<String>,
	/// Whether the template was declared with a trailing separator.
	trailing_slash: bool,
	/// Compiled matcher.
	regex: regex::Regex,
}

impl CompiledPattern {
	/// Compiles a template with the default [`RouterConfig`].
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidTemplate`] if the template does not start
	/// with `/`, exceeds the configured limits, or declares an empty or
	/// repeated parameter name.
	pub fn compile(template: &str) -> RouterResult<Self> {
		Self::compile_with(template, &RouterConfig::default())
	}

	/// Compiles a template with explicit limits.
	pub fn compile_with(template: &str, config: &RouterConfig) -> RouterResult<Self> {
		let invalid = |reason: String| RouterError::InvalidTemplate {
			template: template.to_string(),
			reason,
		};

		if !template.starts_with(SEPARATOR) {
			return Err(invalid("route should start with slash".to_string()));
		}

		if template.len() > config.max_template_length {
			return Err(invalid(format!(
				"length {} exceeds maximum allowed length of {} bytes",
				template.len(),
				config.max_template_length
			)));
		}

		let (segments, trailing_slash) = Self::parse_segments(template);
		if segments.len() > config.max_template_segments {
			return Err(invalid(format!(
				"{} path segments, exceeding maximum of {}",
				segments.len(),
				config.max_template_segments
			)));
		}

		let mut param_names: Vec<String> = Vec::new();
		for segment in &segments {
			if let Segment::Dynamic(name) = segment {
				if name.is_empty() {
					return Err(invalid("dynamic segment without a name".to_string()));
				}
				if param_names.contains(name) {
					return Err(invalid(format!("parameter '{}' declared twice", name)));
				}
				param_names.push(name.clone());
			}
		}

		let regex = regex::RegexBuilder::new(&Self::compile_regex(&segments))
			.case_insensitive(config.case_insensitive)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| invalid(format!("failed to compile matcher: {}", e)))?;

		tracing::debug!(template, params = ?param_names, "compiled route template");

		Ok(Self {
			template: template.to_string(),
			segments,
			param_names,
			trailing_slash,
			regex,
		})
	}

	/// Splits a template (known to start with `/`) into segments.
	fn parse_segments(template: &str) -> (Vec<Segment>, bool) {
		let body = &template[SEPARATOR.len_utf8()..];
		let trailing_slash = body.ends_with(SEPARATOR);
		let body = body.strip_suffix(SEPARATOR).unwrap_or(body);

		if body.is_empty() {
			return (Vec::new(), trailing_slash);
		}

		let segments = body
			.split(SEPARATOR)
			.map(|raw| match raw.strip_prefix(PARAM_SENTINEL) {
				Some(name) => Segment::Dynamic(name.to_string()),
				None => Segment::Literal(raw.to_string()),
			})
			.collect();

		(segments, trailing_slash)
	}

	/// Builds the anchored matcher source for `segments`.
	fn compile_regex(segments: &[Segment]) -> String {
		let mut regex_str = String::from("^");
		for segment in segments {
			regex_str.push(SEPARATOR);
			match segment {
				Segment::Literal(text) => regex_str.push_str(&regex::escape(text)),
				Segment::Dynamic(_) => regex_str.push_str("([^/]+)"),
			}
		}
		regex_str.push_str("/?$");
		regex_str
	}

	/// Returns the original template string.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Returns the parsed segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the parameter names in declaration order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether the template declares any parameter.
	pub fn has_params(&self) -> bool {
		!self.param_names.is_empty()
	}

	/// Number of dynamic segments. Lower is more specific.
	pub fn specificity(&self) -> usize {
		self.param_names.len()
	}

	/// Returns whether the template was declared with a trailing `/`.
	pub fn has_trailing_slash(&self) -> bool {
		self.trailing_slash
	}

	/// Checks if this pattern would match the given pathname.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Attempts to match a pathname, returning the parameters on success.
	pub fn extract(&self, path: &str) -> Option<RouteParams> {
		let caps = self.regex.captures(path)?;
		Some(
			self.param_names
				.iter()
				.enumerate()
				.filter_map(|(index, name)| {
					caps.get(index + 1)
						.map(|m| (name.clone(), m.as_str().to_string()))
				})
				.collect(),
		)
	}
}

impl PartialEq for CompiledPattern {
	fn eq(&self, other: &Self) -> bool {
		self.template == other.template
	}
}

impl Eq for CompiledPattern {}

impl fmt::Display for CompiledPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.template)
	}
}
