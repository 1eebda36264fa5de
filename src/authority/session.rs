// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, config::ClientConfig, error::ConfigError};

const STATE_LEN: usize = 32;

/// Authorization code handshake metadata returned by
/// [`TokenAuthority::start_authorization`](crate::authority::TokenAuthority::start_authorization).
#[derive(Clone, Debug)]
pub struct AuthorizationSession {
	/// Opaque state value that must round-trip via the redirect.
	pub state: String,
	/// Redirect URI the server sends the user back to.
	pub redirect_uri: Url,
	/// Fully-formed authorize URL to open in the user's browser.
	pub authorize_url: Url,
}
impl AuthorizationSession {
	pub(super) fn new(config: &ClientConfig) -> Self {
		let state = random_string(STATE_LEN);
		let redirect_uri = config.client.redirect_uri.clone();
		let mut authorize_url = config.endpoints.authorization.clone();

		authorize_url
			.query_pairs_mut()
			.append_pair("response_type", "code")
			.append_pair("client_id", &config.client.client_id)
			.append_pair("redirect_uri", redirect_uri.as_str())
			.append_pair("scope", &config.scope)
			.append_pair("state", &state);

		Self { state, redirect_uri, authorize_url }
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::InvalidGrant { reason: "Authorization state mismatch.".into() })
		}
	}

	/// Returns `true` when `url` is a redirect back to this session's redirect URI.
	pub fn is_redirect(&self, url: &Url) -> bool {
		url.scheme() == self.redirect_uri.scheme()
			&& url.host_str() == self.redirect_uri.host_str()
			&& url.port_or_known_default() == self.redirect_uri.port_or_known_default()
			&& url.path() == self.redirect_uri.path()
	}

	/// Extracts the authorization code from the redirect URL.
	///
	/// A redirect carrying `error` fails with [`Error::InvalidGrant`]; a missing or
	/// mismatched `state` fails the same way.
	pub fn extract_code(&self, redirect: &Url) -> Result<String> {
		let mut code = None;
		let mut state = None;
		let mut error = None;
		let mut description = None;

		for (key, value) in redirect.query_pairs() {
			match key.as_ref() {
				"code" => code = Some(value.into_owned()),
				"state" => state = Some(value.into_owned()),
				"error" => error = Some(value.into_owned()),
				"error_description" => description = Some(value.into_owned()),
				_ => {},
			}
		}

		if let Some(error) = error {
			return Err(Error::InvalidGrant { reason: description.unwrap_or(error) });
		}

		self.validate_state(state.as_deref().unwrap_or_default())?;

		code.filter(|code| !code.is_empty())
			.ok_or_else(|| ConfigError::MissingAuthorizationCode.into())
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
