//! Crate-level error types shared across flows, stores, and the API client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical crate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Account-store failure surfaced by a reconciliation or callback pass.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Discord REST API failure that cannot be classified as "no result".
	#[error(transparent)]
	Api(#[from] ApiError),
}

/// Configuration and validation failures raised at startup or at call sites.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required credential is missing or empty. The host must not serve traffic
	/// with a partially configured provider.
	#[error("Required credential `{name}` is missing or empty.")]
	MissingCredential {
		/// Name of the offending setting.
		name: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint or redirect URL cannot be parsed.
	#[error("Endpoint or redirect URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The external session produced claims too incomplete to build a login context.
	#[error("External login data is incomplete.")]
	Login(#[from] crate::login::LoginContextBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Fatal Discord REST API failures.
///
/// Recoverable conditions (401/403, other non-success statuses, and exhausted rate
/// limits) resolve to an empty result instead of one of these variants.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Underlying HTTP transport reported a network failure.
	#[error("Network error occurred while calling the Discord API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Response body could not be deserialized into the requested type.
	#[error("Discord API returned a response body that could not be deserialized.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response body was expected to be text but was not valid UTF-8.
	#[error("Discord API returned a non-UTF-8 response body.")]
	BodyNotText(#[from] std::string::FromUtf8Error),
	/// Request endpoint could not be joined onto the API base address.
	#[error("Request endpoint is not a valid URL fragment.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ApiError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ApiError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
