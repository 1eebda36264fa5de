// std
use std::net::IpAddr;
// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	config::{CallPolicy, ClientConfig, DEFAULT_SCOPE, Endpoints},
	error::ConfigError,
};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigValidationError {
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The API base cannot carry path segments beneath it.
	#[error("The API base `{url}` cannot be used as a base URL.")]
	OpaqueApiBase {
		/// Offending URL.
		url: String,
	},
	/// Client identifier is required.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
	/// Scope is required.
	#[error("Scope cannot be empty.")]
	EmptyScope,
	/// GET requests need at least one attempt.
	#[error("GET attempt ceiling must be at least 1.")]
	ZeroGetAttempts,
	/// Upload chunks must hold at least one byte.
	#[error("Upload chunk size must be at least 1 byte.")]
	ZeroChunkSize,
	/// Expiry margin cannot be negative.
	#[error("Expiry margin cannot be negative.")]
	NegativeExpiryMargin,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	client: ClientCredentials,
	endpoints: Option<Endpoints>,
	scope: Option<String>,
	policy: CallPolicy,
}
impl ClientConfigBuilder {
	pub(super) fn new(client: ClientCredentials) -> Self {
		Self { client, endpoints: None, scope: None, policy: CallPolicy::default() }
	}

	/// Replaces the endpoint set (defaults to the public API).
	pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
		self.endpoints = Some(endpoints);

		self
	}

	/// Overrides the requested scope (defaults to `all`).
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Replaces the whole call policy.
	pub fn policy(mut self, policy: CallPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Overrides the proactive refresh margin.
	pub fn expiry_margin(mut self, margin: Duration) -> Self {
		self.policy.expiry_margin = margin;

		self
	}

	/// Overrides the GET attempt ceiling.
	pub fn get_attempts(mut self, attempts: u8) -> Self {
		self.policy.get_attempts = attempts;

		self
	}

	/// Overrides the upload chunk size.
	pub fn upload_chunk_size(mut self, bytes: usize) -> Self {
		self.policy.upload_chunk_size = bytes;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig> {
		let mut endpoints = match self.endpoints {
			Some(endpoints) => endpoints,
			None => Endpoints::mendeley()?,
		};

		endpoints.normalize();

		let config = ClientConfig {
			client: self.client,
			endpoints,
			scope: self.scope.unwrap_or_else(|| DEFAULT_SCOPE.into()),
			policy: self.policy,
		};

		config.validate().map_err(ConfigError::from)?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		if self.client.client_id.trim().is_empty() {
			return Err(ConfigValidationError::EmptyClientId);
		}
		if self.scope.trim().is_empty() {
			return Err(ConfigValidationError::EmptyScope);
		}
		if self.policy.get_attempts == 0 {
			return Err(ConfigValidationError::ZeroGetAttempts);
		}
		if self.policy.upload_chunk_size == 0 {
			return Err(ConfigValidationError::ZeroChunkSize);
		}
		if self.policy.expiry_margin.is_negative() {
			return Err(ConfigValidationError::NegativeExpiryMargin);
		}

		validate_endpoint("api_base", &self.endpoints.api_base)?;
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;

		if self.endpoints.api_base.cannot_be_a_base() {
			return Err(ConfigValidationError::OpaqueApiBase {
				url: self.endpoints.api_base.to_string(),
			});
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigValidationError> {
	if url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url)) {
		Ok(())
	} else {
		Err(ConfigValidationError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host_str() {
		Some("localhost") => true,
		Some(host) => host
			.trim_start_matches('[')
			.trim_end_matches(']')
			.parse::<IpAddr>()
			.is_ok_and(|ip| ip.is_loopback()),
		None => false,
	}
}
