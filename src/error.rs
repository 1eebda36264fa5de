//! Client-wide error taxonomy shared by the token authority, request procedure, and dispatcher.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse failure classes callers branch on when deciding to retry, re-authenticate, or stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The caller used the API incorrectly (not signed in, no further page, bad payload).
	CallerMisuse,
	/// Network or IO failure; safe to retry.
	Transport,
	/// The server answered with an unexpected status or rejected a grant.
	Server,
	/// The response body did not match the expected shape; retrying will not help.
	Decoding,
	/// The call was cancelled through its handle.
	UserCancelled,
	/// The task running the call panicked or its runtime shut down.
	Aborted,
	/// The token store backend failed.
	Storage,
	/// Local configuration or runtime problem.
	Configuration,
}

/// Canonical client error exposed by every public operation.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint answered unexpectedly; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Resource API answered with a status other than the one the call expects.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// Response body did not decode into the requested type.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Request payload could not be serialized.
	#[error("Request payload could not be serialized.")]
	Encode(#[source] serde_json::Error),

	/// Token endpoint rejected the grant (bad code, password, or refresh token).
	#[error("Token endpoint rejected the grant: {reason}.")]
	InvalidGrant {
		/// Server- or client-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or the application credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Server- or client-supplied reason string.
		reason: String,
	},
	/// An authenticated call was issued without stored credentials.
	#[error("No credentials are stored; sign in first.")]
	NotSignedIn,
	/// A follow-up page was requested from an exhausted listing.
	#[error("The listing has no further pages.")]
	NoMorePages,
	/// The call was cancelled by the user.
	#[error("Call was cancelled by the user.")]
	Cancelled,
	/// The task running the call ended without producing a result (panic or runtime
	/// shutdown).
	#[error("Call task ended without a result: {reason}.")]
	Aborted {
		/// What stopped the task.
		reason: String,
	},
}
impl Error {
	/// Maps the error onto its coarse [`ErrorKind`].
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Storage(_) => ErrorKind::Storage,
			Self::Config(_) => ErrorKind::Configuration,
			Self::Transient(
				TransientError::TokenResponseParse { .. }
				| TransientError::TokenResponseInvalid { .. },
			)
			| Self::Decode(_) => ErrorKind::Decoding,
			Self::Transient(_) | Self::Http(_) | Self::InvalidGrant { .. } | Self::InvalidClient { .. } =>
				ErrorKind::Server,
			Self::Transport(TransportError::BodyConsumed) => ErrorKind::CallerMisuse,
			Self::Transport(_) => ErrorKind::Transport,
			Self::Encode(_) | Self::NotSignedIn | Self::NoMorePages => ErrorKind::CallerMisuse,
			Self::Cancelled => ErrorKind::UserCancelled,
			Self::Aborted { .. } => ErrorKind::Aborted,
		}
	}

	/// Returns `true` for the 401 "Token has expired" answer that triggers a reactive refresh.
	pub fn is_token_expired(&self) -> bool {
		matches!(self, Self::Http(http) if http.is_token_expired())
	}

	/// Returns `true` when the call ended because its handle was cancelled.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

impl From<tokio::task::JoinError> for Error {
	fn from(e: tokio::task::JoinError) -> Self {
		if !e.is_panic() {
			return Self::Aborted { reason: "task was cancelled by runtime shutdown".into() };
		}

		let payload = e.into_panic();
		let message = payload
			.downcast_ref::<&str>()
			.map(|message| (*message).to_owned())
			.or_else(|| payload.downcast_ref::<String>().cloned());

		Self::Aborted {
			reason: match message {
				Some(message) => format!("task panicked: {message}"),
				None => "task panicked".into(),
			},
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
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
	/// An endpoint or resource path does not form a valid URL.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configuration failed validation.
	#[error(transparent)]
	InvalidConfig(#[from] crate::config::ConfigValidationError),
	/// Configuration document could not be parsed.
	#[error("Configuration document is malformed.")]
	Malformed {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
	/// No Tokio runtime was supplied or is running on the calling thread.
	#[error("No async runtime is available to run the call.")]
	MissingRuntime,
	/// The dedicated runtime of the blocking client could not be started.
	#[error("Blocking runtime could not be started.")]
	RuntimeBuild {
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Stored credentials carry no refresh token.
	#[error("Stored credentials are missing a refresh token.")]
	MissingRefreshToken,
	/// Authorization redirect carried no `code` parameter.
	#[error("Authorization redirect is missing the code parameter.")]
	MissingAuthorizationCode,
	/// Credential builder validation failed.
	#[error("Unable to build credentials.")]
	CredentialsBuild(#[from] crate::auth::CredentialsBuilderError),
	/// A query timestamp cannot be written as RFC 3339.
	#[error("Timestamp cannot be formatted as RFC 3339.")]
	InvalidTimestamp {
		/// Underlying formatting failure.
		#[source]
		source: time::error::Format,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidEndpoint { source }
	}
}
impl From<url::ParseError> for Error {
	fn from(source: url::ParseError) -> Self {
		ConfigError::from(source).into()
	}
}

/// Temporary token endpoint failures (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Server- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint answered with well-formed JSON the client cannot turn into credentials.
	#[error("Token endpoint returned an unusable token response: {reason}.")]
	TokenResponseInvalid {
		/// Which field was missing or out of range.
		reason: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// A streamed body was already sent once and cannot be replayed.
	#[error("Streamed request body was already consumed.")]
	BodyConsumed,
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

/// Resource API answered with an unexpected status.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{url} answered HTTP {status} (expected {expected}): {message}.")]
pub struct HttpError {
	/// Request URL.
	pub url: Url,
	/// Status the server returned.
	pub status: u16,
	/// Status the call expected.
	pub expected: u16,
	/// Server message, taken from the JSON `message` field or a preview of the body.
	pub message: String,
}
impl HttpError {
	/// Server message marking an access token that outlived its expiry.
	pub const TOKEN_EXPIRED: &str = "Token has expired";

	/// Returns `true` for a 401 whose message reports an expired access token.
	pub fn is_token_expired(&self) -> bool {
		self.status == 401 && self.message.contains(Self::TOKEN_EXPIRED)
	}
}

/// Response body did not match the type the caller asked for.
#[derive(Debug, ThisError)]
#[error("Response from {url} does not decode at `{path}`.", path = .source.path())]
pub struct DecodeError {
	/// Request URL.
	pub url: Url,
	/// Structured decoding failure including the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn http_error(status: u16, message: &str) -> HttpError {
		HttpError {
			url: Url::parse("https://api.mendeley.com/documents")
				.expect("Fixture URL should parse."),
			status,
			expected: 200,
			message: message.into(),
		}
	}

	#[test]
	fn token_expired_requires_401_and_message() {
		assert!(Error::from(http_error(401, "Token has expired")).is_token_expired());
		assert!(!Error::from(http_error(401, "Unauthorized")).is_token_expired());
		assert!(!Error::from(http_error(403, "Token has expired")).is_token_expired());
	}

	#[test]
	fn kinds_follow_taxonomy() {
		assert_eq!(Error::NotSignedIn.kind(), ErrorKind::CallerMisuse);
		assert_eq!(Error::NoMorePages.kind(), ErrorKind::CallerMisuse);
		assert_eq!(Error::Cancelled.kind(), ErrorKind::UserCancelled);
		assert_eq!(Error::Aborted { reason: "panicked".into() }.kind(), ErrorKind::Aborted);
		assert!(!Error::Aborted { reason: "panicked".into() }.is_cancelled());
		assert_eq!(Error::from(TransportError::BodyConsumed).kind(), ErrorKind::CallerMisuse);
		assert_eq!(
			Error::from(TransientError::TokenResponseInvalid { reason: "missing expires_in".into() })
				.kind(),
			ErrorKind::Decoding
		);
		assert_eq!(Error::from(http_error(500, "boom")).kind(), ErrorKind::Server);
		assert_eq!(
			Error::from(TransportError::Io(std::io::Error::other("reset"))).kind(),
			ErrorKind::Transport
		);

		let mut de = serde_json::Deserializer::from_str("{\"id\":1}");
		let source = serde_path_to_error::deserialize::<_, BTreeMap<String, String>>(&mut de)
			.expect_err("Numeric value should not decode as a string.");
		let decode = Error::from(DecodeError {
			url: Url::parse("https://api.mendeley.com/x").expect("Fixture URL should parse."),
			source,
		});

		assert_eq!(decode.kind(), ErrorKind::Decoding);
		assert!(decode.to_string().contains("id"));
	}
}
