//! Error types for route definition, path building and route resolution.

/// Error type for router operations.
///
/// Definition-time variants (`InvalidTemplate`, `NestingTooDeep`,
/// `InvalidRouteName`) indicate a broken route table and should stop
/// startup. `AmbiguityConflict` is raised while resolving a path but is
/// also a modeling defect of the route table.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// The template violates a definition-time invariant.
	#[error("invalid route template '{template}': {reason}")]
	InvalidTemplate {
		/// The offending template.
		template: String,
		/// Which invariant was violated.
		reason: String,
	},

	/// A path was built without every declared parameter.
	#[error("missing route params: route={template} missing={}", .missing.join(","))]
	MissingRouteParams {
		/// The template being built.
		template: String,
		/// Every declared name absent from the supplied params.
		missing: Vec<String>,
	},

	/// A path was built with parameters the template does not declare.
	#[error("unknown route params: route={template} unknown={}", .unknown.join(","))]
	UnknownRouteParam {
		/// The template being built.
		template: String,
		/// Every supplied name the template does not declare.
		unknown: Vec<String>,
	},

	/// A parameter value cannot be substituted into a single segment.
	#[error("invalid value for route param '{name}' in {template}: {value:?}")]
	InvalidRouteParam {
		/// The template being built.
		template: String,
		/// The parameter name.
		name: String,
		/// The rejected value.
		value: String,
	},

	/// A parameter value failed to parse into the requested type.
	#[error("failed to parse route param '{name}' ({value:?}) as {target}: {source_message}")]
	ParamParse {
		/// The parameter name.
		name: String,
		/// The raw value.
		value: String,
		/// The requested type name.
		target: &'static str,
		/// Message from the parser.
		source_message: String,
	},

	/// Several equally specific templates matched the same path.
	#[error(
		"multiple routes with same ambiguousness level matched pathname {path}: {}",
		.templates.join(", ")
	)]
	AmbiguityConflict {
		/// The resolved pathname.
		path: String,
		/// Every tied template.
		templates: Vec<String>,
	},

	/// A strict lookup found that the current route does not satisfy the filter.
	#[error("current route doesn't match provided filter(s): current={}", .current.as_deref().unwrap_or("<none>"))]
	RouteMismatch {
		/// Template of the current route, if any route is active.
		current: Option<String>,
	},

	/// Route groups are nested deeper than the configured bound.
	#[error("route '{name}' is nested {depth} levels deep (max {max})")]
	NestingTooDeep {
		/// Name path of the group that crossed the bound.
		name: String,
		/// Depth reached.
		depth: usize,
		/// Configured maximum.
		max: usize,
	},

	/// A route or group name is empty, contains the separator, or is duplicated.
	#[error("invalid route name '{name}': {reason}")]
	InvalidRouteName {
		/// The offending name path.
		name: String,
		/// Why it was rejected.
		reason: String,
	},

	/// No route is registered under the given name path.
	#[error("unknown route name: {0}")]
	UnknownRouteName(String),

	/// The search mapping could not be serialized.
	#[error("invalid query: {0}")]
	InvalidQuery(String),

	/// A location could not be parsed as a URL.
	#[error("invalid location '{href}': {reason}")]
	InvalidLocation {
		/// The rejected address.
		href: String,
		/// Parser message.
		reason: String,
	},
}

/// Convenience alias used across the crate.
pub type RouterResult<T> = Result<T, RouterError>;
