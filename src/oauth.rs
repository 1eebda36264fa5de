//! Token endpoint facade built on the `oauth2` crate.
//!
//! Every grant posts a form to the configured token endpoint with the client credentials
//! in the request body, then validates the JSON token response into [`Credentials`].

pub(crate) mod classify;

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, ResourceOwnerPassword,
	ResourceOwnerUsername, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	config::ClientConfig,
	error::{ConfigError, TransientError, TransportError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot, TokenHttpHandle},
	oauth::classify::{Grant, TokenErrorContext, TokenErrorKind},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type TokenRequestError = BasicRequestTokenError<HttpClientError<TransportError>>;

/// Performs the three token grants the client uses.
pub(crate) struct TokenFacade {
	oauth_client: ConfiguredBasicClient,
	transport: Arc<dyn HttpTransport>,
	redirect_uri: Url,
	scope: String,
}
impl TokenFacade {
	pub(crate) fn new(config: &ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(config.client.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client.client_secret.expose().to_owned()))
			.set_auth_uri(AuthUrl::from_url(config.endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(config.endpoints.token.clone()))
			.set_redirect_uri(RedirectUrl::from_url(config.client.redirect_uri.clone()))
			.set_auth_type(AuthType::RequestBody);

		Self {
			oauth_client,
			transport,
			redirect_uri: config.client.redirect_uri.clone(),
			scope: config.scope.clone(),
		}
	}

	/// `grant_type=authorization_code` with the registered redirect URI.
	pub(crate) async fn exchange_code(&self, code: &str) -> Result<Credentials> {
		let meta = ResponseMetadataSlot::default();
		let handle = TokenHttpHandle::new(self.transport.clone(), meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(Grant::AuthorizationCode, meta.take(), err))?;

		map_token_response(response, None)
	}

	/// `grant_type=password` requesting the configured scope.
	pub(crate) async fn exchange_password(
		&self,
		username: &str,
		password: &Secret,
	) -> Result<Credentials> {
		let meta = ResponseMetadataSlot::default();
		let handle = TokenHttpHandle::new(self.transport.clone(), meta.clone());
		let username = ResourceOwnerUsername::new(username.to_owned());
		let password = ResourceOwnerPassword::new(password.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_password(&username, &password)
			.add_scope(Scope::new(self.scope.clone()))
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(Grant::Password, meta.take(), err))?;

		map_token_response(response, None)
	}

	/// `grant_type=refresh_token`; keeps `refresh_token` when the response omits a new one.
	pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<Credentials> {
		let meta = ResponseMetadataSlot::default();
		let handle = TokenHttpHandle::new(self.transport.clone(), meta.clone());
		let secret = RefreshToken::new(refresh_token.to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&secret)
			.add_extra_param("redirect_uri", self.redirect_uri.as_str())
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(Grant::RefreshToken, meta.take(), err))?;

		map_token_response(response, Some(refresh_token))
	}
}

fn map_token_response(
	response: BasicTokenResponse,
	previous_refresh: Option<&str>,
) -> Result<Credentials> {
	let expires_in = response.expires_in().ok_or_else(|| invalid_response("missing expires_in"))?;
	let expires_in = i64::try_from(expires_in.as_secs())
		.map_err(|_| invalid_response("expires_in exceeds the supported range"))?;

	if expires_in <= 0 {
		return Err(invalid_response("expires_in must be positive").into());
	}

	let mut builder = Credentials::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(response.token_type().as_ref())
		.issued_at(OffsetDateTime::now_utc())
		.expires_in(Duration::seconds(expires_in));
	let refresh = response
		.refresh_token()
		.map(|token| token.secret().to_owned())
		.or_else(|| previous_refresh.map(ToOwned::to_owned));

	if let Some(refresh) = refresh {
		builder = builder.refresh_token(refresh);
	}

	builder.build().map_err(|e| invalid_response(&e.to_string()).into())
}

fn invalid_response(reason: &str) -> TransientError {
	TransientError::TokenResponseInvalid { reason: reason.to_owned() }
}

fn map_request_error(
	grant: Grant,
	meta: Option<ResponseMetadata>,
	err: TokenRequestError,
) -> Error {
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(grant, response, meta_ref),
		RequestTokenError::Request(error) => map_transport_error(grant, meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
				.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message: format!("{} grant failed: {message}", grant.as_str()),
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	grant: Grant,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let ctx = TokenErrorContext {
		http_status: meta_status(meta),
		oauth_error: Some(response.error().as_ref().to_owned()),
		error_description: response.error_description().cloned(),
	};
	let message = match response.error_description() {
		Some(description) => format!("{} grant failed: {description}", grant.as_str()),
		None => format!("{} grant failed: {}", grant.as_str(), response.error().as_ref()),
	};

	match ctx.classify() {
		TokenErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		TokenErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		TokenErrorKind::Transient => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_transport_error(
	grant: Grant,
	meta: Option<&ResponseMetadata>,
	err: HttpClientError<TransportError>,
) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => Error::Transport(*inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransientError::TokenEndpoint {
			message: format!("{} grant failed in the HTTP client: {message}", grant.as_str()),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
		_ => TransientError::TokenEndpoint {
			message: format!("{} grant failed in the HTTP client", grant.as_str()),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ErrorKind;

	fn token_response(json: &str) -> BasicTokenResponse {
		serde_json::from_str(json).expect("Token response fixture should deserialize.")
	}

	#[test]
	fn refresh_token_is_retained_when_omitted() {
		let credentials = map_token_response(
			token_response(r#"{"access_token":"new","token_type":"bearer","expires_in":3600}"#),
			Some("old-refresh"),
		)
		.expect("Token response should map.");

		assert_eq!(credentials.access_token.expose(), "new");
		assert_eq!(
			credentials.refresh_token.as_ref().map(Secret::expose),
			Some("old-refresh")
		);

		let rotated = map_token_response(
			token_response(
				r#"{"access_token":"new","token_type":"bearer","expires_in":3600,"refresh_token":"r2"}"#,
			),
			Some("old-refresh"),
		)
		.expect("Token response should map.");

		assert_eq!(rotated.refresh_token.as_ref().map(Secret::expose), Some("r2"));
	}

	#[test]
	fn expiry_is_mandatory_and_positive() {
		let missing = map_token_response(
			token_response(r#"{"access_token":"a","token_type":"bearer"}"#),
			None,
		);
		let zero = map_token_response(
			token_response(r#"{"access_token":"a","token_type":"bearer","expires_in":0}"#),
			None,
		);

		assert!(matches!(
			&missing,
			Err(Error::Transient(TransientError::TokenResponseInvalid { reason }))
				if reason.contains("expires_in")
		));
		assert!(matches!(
			zero,
			Err(Error::Transient(TransientError::TokenResponseInvalid { .. }))
		));
		assert_eq!(missing.err().map(|e| e.kind()), Some(ErrorKind::Decoding));
	}

	#[test]
	fn transport_failures_keep_their_class() {
		let err = map_transport_error(
			Grant::RefreshToken,
			None,
			HttpClientError::Reqwest(Box::new(TransportError::Io(std::io::Error::other("reset")))),
		);

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
