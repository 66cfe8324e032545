//! Connector-level error types shared by the transport core and the resource sync layer.

// self
use crate::{_prelude::*, connector::IdentifierError, http::Response, rate_limit::RateLimitError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem, including request options that failed to build.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The network round trip itself failed; no response is available.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A successful response body could not be parsed into the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// The remote side reported a failure that an error-response option decoded.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Rate-limit headers were missing or malformed.
	#[error(transparent)]
	RateLimit(#[from] RateLimitError),
	/// Resource sync layer failure.
	#[error(transparent)]
	Sync(#[from] SyncError),

	/// Round trip and every response option succeeded, but the status is outside `[200, 300)`.
	#[error("unexpected status code: {status}")]
	UnexpectedStatus {
		/// Numeric HTTP status code.
		status: u16,
	},
}
impl Error {
	/// Returns the HTTP status code carried by the error, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::UnexpectedStatus { status } => Some(*status),
			Self::Decode(e) => Some(e.status),
			Self::Response(e) => Some(e.status()),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A request option could not serialize its body.
	#[error("Request body could not be encoded as JSON.")]
	Encoding {
		/// Serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// A request option supplied an invalid header name.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
		/// Underlying validation failure.
		#[source]
		source: http::header::InvalidHeaderName,
	},
	/// A request option supplied an invalid header value.
	#[error("Value for header `{name}` is invalid.")]
	InvalidHeaderValue {
		/// Header whose value failed validation.
		name: String,
		/// Underlying validation failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
	/// A target URL could not be assembled.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// URL text that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Platform configuration failed validation.
	#[error(transparent)]
	InvalidConfig(#[from] crate::connector::PlatformConfigError),
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

/// Transport-level failures (network, cancellation, deadlines).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP transport reported a failure.
	#[error("Network error occurred during the HTTP round trip.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request context was cancelled before the round trip completed.
	#[error("Request context was cancelled.")]
	Cancelled,
	/// The request context deadline elapsed before the round trip completed.
	#[error("Request context deadline elapsed.")]
	TimedOut,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response body could not be decoded into the caller's destination.
#[derive(Debug, ThisError)]
#[error("Response body with status {status} could not be decoded.")]
pub struct DecodeError {
	/// HTTP status code of the response being decoded.
	pub status: u16,
	/// Structured parsing failure, including the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}
impl DecodeError {
	/// Returns the JSON path at which decoding failed.
	pub fn path(&self) -> String {
		self.source.path().to_string()
	}
}

/// Failures reported by the remote side and classified by an error-response option.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// The error body was not JSON; the raw text is surfaced verbatim.
	#[error("{body}")]
	Raw {
		/// HTTP status code.
		status: u16,
		/// Raw response body text.
		body: String,
	},
	/// The error body claimed to be JSON but did not match the expected shape.
	#[error("Request failed with unknown error.")]
	Unknown {
		/// HTTP status code.
		status: u16,
	},
	/// The error body decoded into a message.
	#[error("Request failed with status {status}: {message}.")]
	Detailed {
		/// HTTP status code.
		status: u16,
		/// Human-readable message decoded from the body.
		message: String,
	},
}
impl ResponseError {
	/// HTTP status code tied to the failure.
	pub fn status(&self) -> u16 {
		match self {
			Self::Raw { status, .. } | Self::Unknown { status } | Self::Detailed { status, .. } =>
				*status,
		}
	}
}

/// Resource sync layer failures.
#[derive(Debug, ThisError)]
pub enum SyncError {
	/// A page token could not be interpreted.
	#[error("Page token `{token}` is invalid.")]
	InvalidPageToken {
		/// Offending token.
		token: String,
	},
	/// No syncer is registered for the requested resource type.
	#[error("Resource type `{resource_type}` is not supported.")]
	UnknownResourceType {
		/// Requested resource type identifier.
		resource_type: String,
	},
	/// A platform-provided identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
}

/// Failure returned by [`BaseHttpClient::execute`](crate::http::BaseHttpClient::execute).
///
/// `response` is `None` when the network round trip failed and `Some` when the round trip
/// succeeded but a response option or the final status check rejected it, so callers can still
/// inspect status and headers.
#[derive(Debug, ThisError)]
#[error("{error}")]
pub struct DoError {
	/// Response captured before the failure, if the round trip completed.
	pub response: Option<Response>,
	/// Classified failure.
	pub error: Error,
}
impl DoError {
	/// Failure raised before any response was available.
	pub fn without_response(error: impl Into<Error>) -> Self {
		Self { response: None, error: error.into() }
	}

	/// Failure raised after the round trip completed.
	pub fn with_response(response: Response, error: impl Into<Error>) -> Self {
		Self { response: Some(response), error: error.into() }
	}

	/// Splits the failure into its response and error.
	pub fn into_parts(self) -> (Option<Response>, Error) {
		(self.response, self.error)
	}
}
impl From<DoError> for Error {
	fn from(e: DoError) -> Self {
		e.error
	}
}
