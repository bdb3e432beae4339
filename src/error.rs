//! Crate-level error types shared by the controller, the client, and the token stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for foreign failures (callbacks, transport builders).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Configuration cannot be turned into a working extension.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The API was used in a way that can never succeed.
	#[error(transparent)]
	Usage(#[from] UsageError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The instance answered with an error or an unusable body.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// The OAuth token endpoint refused to issue or refresh a token.
	#[error(transparent)]
	TokenCreate(#[from] TokenCreateError),
	/// Token store failure.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// The registered token updater rejected a token.
	#[error("Token updater failed.")]
	TokenUpdater {
		/// Failure returned by the callback.
		#[source]
		source: BoxError,
	},
}

/// Configuration failures raised while initializing the extension or building clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Neither OAuth credentials, basic credentials, nor a session were supplied.
	#[error("User credentials, a session, or OAuth credentials are required.")]
	MissingCredentials,
	/// A recognized setting carries a value that cannot be interpreted.
	#[error("Setting `{key}` is invalid: {reason}.")]
	InvalidSetting {
		/// Setting name as it appeared in the source mapping.
		key: String,
		/// Why the value was rejected.
		reason: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// The instance base URL or a derived endpoint cannot be parsed.
	#[error("Instance URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// API misuse that no amount of retrying will fix.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum UsageError {
	/// Default parameters were supplied in an unrecognized shape.
	#[error("Parameters must be a ParamsBuilder object: {reason}.")]
	InvalidParameters {
		/// Why the value was rejected.
		reason: String,
	},
	/// A token updater can only be registered in OAuth mode.
	#[error("Token updater can only be set if using OAuth.")]
	TokenUpdaterRequiresOAuth,
	/// The operation needs an OAuth client.
	#[error("Operation `{operation}` requires an OAuth client.")]
	OAuthOnly {
		/// Name of the rejected operation.
		operation: &'static str,
	},
	/// Both `instance` and `host` were configured.
	#[error("Arguments `instance` and `host` are mutually exclusive.")]
	InstanceHostConflict,
	/// Neither `instance` nor `host` was configured.
	#[error("An `instance` or `host` is required.")]
	MissingInstanceOrHost,
	/// A basic client needs a user/password pair or a session.
	#[error("A basic client requires a user and password or a session.")]
	MissingBasicCredentials,
	/// A session cannot be combined with user/password credentials.
	#[error("Provide either a user and password or a session, not both.")]
	SessionWithCredentials,
	/// An OAuth resource was requested before any token was set.
	#[error("A token must be set before creating a resource with an OAuth client.")]
	MissingToken,
	/// A resource base or API path is not a plain absolute path.
	#[error("Path `{path}` is invalid: {reason}.")]
	InvalidPath {
		/// Path as supplied.
		path: String,
		/// Rule the path broke.
		reason: &'static str,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the instance.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the instance.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		if e.is_builder() {
			ConfigError::http_client_build(e).into()
		} else {
			TransportError::from(e).into()
		}
	}
}

/// Failures derived from the instance's HTTP responses.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// The instance returned a non-success status.
	#[error("Instance returned HTTP {status}: {message}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// `error.message` from the body, or the canonical status reason.
		message: String,
		/// `error.detail` from the body, when present.
		detail: Option<String>,
	},
	/// The body could not be parsed.
	#[error("Instance returned a malformed body.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// A record was required but none matched.
	#[error("No records matched the request.")]
	NoResults,
	/// Exactly one record was required but several matched.
	#[error("Expected a single record but {count} matched.")]
	MultipleResults {
		/// Number of records returned.
		count: usize,
	},
	/// A record came back without the `sys_id` needed to address it.
	#[error("Record is missing its sys_id.")]
	MissingSysId,
	/// A record's `sys_id` cannot be used as a single path segment.
	#[error("Record sys_id `{sys_id}` is not a valid path segment.")]
	InvalidSysId {
		/// Value as returned by the instance.
		sys_id: String,
	},
}

/// Token endpoint refusal while issuing or refreshing a token.
#[derive(Debug, ThisError)]
#[error("Error creating user token: {description}.")]
pub struct TokenCreateError {
	/// HTTP status returned by the token endpoint, when one was received.
	pub status: Option<u16>,
	/// OAuth `error` code, e.g. `access_denied`.
	pub error: String,
	/// OAuth `error_description`, or a summary when the provider sent none.
	pub description: String,
	/// Delay requested through `Retry-After`, if any.
	pub retry_after: Option<Duration>,
}
