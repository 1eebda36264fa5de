//! Client configuration: application credentials, endpoints, scope, and call policy.
//!
//! A [`ClientConfig`] is immutable once built. Use [`ClientConfig::builder`] for code-driven
//! setup or [`ClientConfig::from_json`] to load a validated configuration document.

/// Builder API and validation for client configuration.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::ClientCredentials, error::ConfigError};

/// Base URL of the public API.
pub const DEFAULT_API_BASE: &str = "https://api.mendeley.com/";
/// Authorization endpoint users are sent to for the authorization code grant.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://api.mendeley.com/oauth/authorize";
/// Token endpoint used for every grant.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.mendeley.com/oauth/token";
/// Scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "all";

/// Endpoint set the client talks to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
	/// Base URL resource paths are resolved against.
	pub api_base: Url,
	/// Authorization endpoint used to start the authorization code grant.
	pub authorization: Url,
	/// Token endpoint used for code, password, and refresh grants.
	pub token: Url,
}
impl Endpoints {
	/// Returns the public API endpoints.
	pub fn mendeley() -> Result<Self> {
		Ok(Self {
			api_base: Url::parse(DEFAULT_API_BASE)?,
			authorization: Url::parse(DEFAULT_AUTHORIZATION_ENDPOINT)?,
			token: Url::parse(DEFAULT_TOKEN_ENDPOINT)?,
		})
	}

	/// Resolves a resource path (e.g. `documents/abc`) against the API base.
	///
	/// A base without a trailing slash is treated as a directory, so `https://host/v1`
	/// resolves `documents` to `https://host/v1/documents`.
	pub fn resolve(&self, path: &str) -> Result<Url> {
		let path = path.trim_start_matches('/');

		if self.api_base.path().ends_with('/') {
			return Ok(self.api_base.join(path)?);
		}

		let mut base = self.api_base.clone();

		base.set_path(&format!("{}/", self.api_base.path()));

		Ok(base.join(path)?)
	}

	/// Appends the trailing slash [`Endpoints::resolve`] relies on when the base lacks one.
	pub fn normalize(&mut self) {
		if !self.api_base.path().ends_with('/') {
			let path = format!("{}/", self.api_base.path());

			self.api_base.set_path(&path);
		}
	}
}

/// Tunables applied to every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallPolicy {
	/// Refresh proactively when less than this much lifetime remains.
	#[serde(with = "seconds")]
	pub expiry_margin: Duration,
	/// Total attempts for GET requests failing at the transport layer.
	pub get_attempts: u8,
	/// Chunk size used for streamed upload bodies.
	pub upload_chunk_size: usize,
}
impl CallPolicy {
	/// Default proactive refresh margin (five minutes).
	pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::minutes(5);
	/// Default GET attempt ceiling.
	pub const DEFAULT_GET_ATTEMPTS: u8 = 3;
	/// Default upload chunk size (64 KiB).
	pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
}
impl Default for CallPolicy {
	fn default() -> Self {
		Self {
			expiry_margin: Self::DEFAULT_EXPIRY_MARGIN,
			get_attempts: Self::DEFAULT_GET_ATTEMPTS,
			upload_chunk_size: Self::DEFAULT_UPLOAD_CHUNK_SIZE,
		}
	}
}

/// Immutable, validated client configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
	/// Application credentials.
	pub client: ClientCredentials,
	/// Endpoint set.
	pub endpoints: Endpoints,
	/// OAuth scope requested by the password and authorization code grants.
	#[serde(default = "default_scope")]
	pub scope: String,
	/// Call policy.
	#[serde(default)]
	pub policy: CallPolicy,
}
impl ClientConfig {
	/// Creates a builder seeded with the application credentials.
	pub fn builder(client: ClientCredentials) -> ClientConfigBuilder {
		ClientConfigBuilder::new(client)
	}

	/// Parses and validates a JSON configuration document.
	pub fn from_json(raw: &str) -> Result<Self> {
		let mut config: Self =
			serde_json::from_str(raw).map_err(|source| ConfigError::Malformed { source })?;

		config.endpoints.normalize();
		config.validate().map_err(ConfigError::from)?;

		Ok(config)
	}

	/// Resolves a resource path against the configured API base.
	pub fn api_url(&self, path: &str) -> Result<Url> {
		self.endpoints.resolve(path)
	}
}

fn default_scope() -> String {
	DEFAULT_SCOPE.into()
}

mod seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(value.whole_seconds())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).map(Duration::seconds)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn from_json_applies_defaults_and_validates() {
		let config = ClientConfig::from_json(
			r#"{
				"client": {
					"client_id": "42",
					"client_secret": "shh",
					"redirect_uri": "https://app.example.com/callback"
				},
				"endpoints": {
					"api_base": "https://api.mendeley.com/",
					"authorization": "https://api.mendeley.com/oauth/authorize",
					"token": "https://api.mendeley.com/oauth/token"
				},
				"policy": { "expiry_margin": 60 }
			}"#,
		)
		.expect("Configuration document should load.");

		assert_eq!(config.scope, DEFAULT_SCOPE);
		assert_eq!(config.policy.expiry_margin, Duration::minutes(1));
		assert_eq!(config.policy.get_attempts, CallPolicy::DEFAULT_GET_ATTEMPTS);
		assert!(!format!("{config:?}").contains("shh"));

		let err = ClientConfig::from_json(
			r#"{
				"client": { "client_id": "42", "client_secret": "s", "redirect_uri": "https://a.b/c" },
				"endpoints": {
					"api_base": "http://api.example.com/",
					"authorization": "https://api.example.com/oauth/authorize",
					"token": "https://api.example.com/oauth/token"
				}
			}"#,
		)
		.expect_err("Plain HTTP API base should be rejected.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::InvalidConfig(ConfigValidationError::InsecureEndpoint {
				endpoint: "api_base",
				..
			}))
		));
	}

	#[test]
	fn resolve_joins_relative_paths() {
		let endpoints = Endpoints::mendeley().expect("Default endpoints should parse.");

		assert_eq!(
			endpoints.resolve("/documents/abc").expect("Path should resolve.").as_str(),
			"https://api.mendeley.com/documents/abc"
		);
		assert_eq!(
			endpoints.resolve("profiles/me").expect("Path should resolve.").as_str(),
			"https://api.mendeley.com/profiles/me"
		);
	}

	#[test]
	fn api_base_without_trailing_slash_keeps_its_last_segment() {
		let mut endpoints = Endpoints::mendeley().expect("Default endpoints should parse.");

		endpoints.api_base = Url::parse("https://proxy.example.com/v1").expect("Base should parse.");

		assert_eq!(
			endpoints.resolve("documents").expect("Path should resolve.").as_str(),
			"https://proxy.example.com/v1/documents"
		);
		assert_eq!(
			endpoints.resolve("/profiles/me").expect("Path should resolve.").as_str(),
			"https://proxy.example.com/v1/profiles/me"
		);

		endpoints.normalize();

		assert_eq!(endpoints.api_base.as_str(), "https://proxy.example.com/v1/");

		let config = ClientConfig::from_json(
			r#"{
				"client": { "client_id": "42", "client_secret": "s", "redirect_uri": "https://a.b/c" },
				"endpoints": {
					"api_base": "https://proxy.example.com/v1",
					"authorization": "https://proxy.example.com/oauth/authorize",
					"token": "https://proxy.example.com/oauth/token"
				}
			}"#,
		)
		.expect("Configuration document should load.");

		assert_eq!(config.endpoints.api_base.as_str(), "https://proxy.example.com/v1/");
		assert_eq!(
			config.api_url("folders").expect("Path should resolve.").as_str(),
			"https://proxy.example.com/v1/folders"
		);
	}
}
