//! Authenticated call dispatcher.
//!
//! [`Client`] turns a [`RequestDescriptor`] into an authenticated call:
//!
//! 1. Fail with [`Error::NotSignedIn`] when the store holds no access token.
//! 2. Refresh first when the token is inside the expiry margin. A failed refresh is logged
//!    and the call still runs with the stored token.
//! 3. Execute the request with the current token.
//! 4. When the server answers 401 "Token has expired", refresh once and replay the request
//!    once with the new token. Requests with a streamed body are not replayed; the 401 is
//!    returned after the refresh.
//!
//! Every call runs on its own task and reports through a [`CallHandle`].

mod handle;

pub use handle::CallHandle;
pub(crate) use handle::spawn_call;

// crates.io
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	authority::TokenAuthority,
	codec::{self, Decoder},
	config::ClientConfig,
	error::ConfigError,
	http::HttpTransport,
	obs::{self, FlowKind},
	page::{Page, PageCursor},
	procedure::{RequestDescriptor, RequestProcedure, Response},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Entry point for authenticated API calls.
///
/// Cloning is cheap; clones share the token authority and the transport.
#[derive(Clone, Debug)]
pub struct Client {
	config: Arc<ClientConfig>,
	authority: TokenAuthority,
	procedure: RequestProcedure,
	runtime: Option<Handle>,
}
impl Client {
	/// Creates a client with the default reqwest transports.
	///
	/// API calls follow redirects; token exchanges go through a separate transport that does
	/// not.
	#[cfg(feature = "reqwest")]
	pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
		let api = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;
		let token = ReqwestTransport::for_token_endpoint().map_err(ConfigError::http_client_build)?;

		Self::with_transports(
			config,
			store,
			Arc::new(ReqwestTransport::with_client(api)),
			Arc::new(token),
		)
	}

	/// Creates a client that sends every request through `transport`.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		transport: Arc<dyn HttpTransport>,
	) -> Result<Self> {
		Self::with_transports(config, store, transport.clone(), transport)
	}

	/// Creates a client that sends API calls through `api` and token grants through `token`.
	///
	/// The configuration is validated again so hand-assembled values cannot bypass the
	/// builder's checks.
	pub fn with_transports(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		api: Arc<dyn HttpTransport>,
		token: Arc<dyn HttpTransport>,
	) -> Result<Self> {
		config.validate().map_err(ConfigError::from)?;

		let config = Arc::new(config);
		let procedure = RequestProcedure::new(api, &config.policy);
		let authority = TokenAuthority::new(config.clone(), store, token);

		Ok(Self { config, authority, procedure, runtime: Handle::try_current().ok() })
	}

	/// Spawns calls and refreshes on `runtime` instead of the runtime current at creation.
	pub fn with_runtime(mut self, runtime: Handle) -> Self {
		self.authority = self.authority.with_runtime(runtime.clone());
		self.runtime = Some(runtime);

		self
	}

	/// Configuration in use.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Token authority for sign-in, sign-out, and refresh.
	pub fn authority(&self) -> &TokenAuthority {
		&self.authority
	}

	/// Resolves a resource path against the API base.
	pub fn api_url(&self, path: &str) -> Result<Url> {
		self.config.api_url(path)
	}

	/// Issues an authenticated call.
	pub fn call<T>(&self, request: RequestDescriptor, decoder: Decoder<T>) -> CallHandle<Response<T>>
	where
		T: 'static + Send,
	{
		let client = self.clone();

		spawn_call(self.runtime(), FlowKind::Api, "call", async move {
			client.dispatch(&request, decoder).await
		})
	}

	/// Fetches the first page of a JSON listing.
	pub fn list<T>(&self, request: RequestDescriptor) -> CallHandle<Page<T>>
	where
		T: 'static + Send + DeserializeOwned,
	{
		let client = self.clone();

		spawn_call(self.runtime(), FlowKind::Api, "list", async move {
			client.fetch_page(&request).await
		})
	}

	/// Fetches the page after `page`.
	///
	/// An exhausted page fails with [`Error::NoMorePages`] without touching the network.
	pub fn next_page<T>(&self, page: &Page<T>) -> CallHandle<Page<T>>
	where
		T: 'static + Send + DeserializeOwned,
	{
		self.follow(&page.cursor, page.media_type.clone())
	}

	/// Fetches the page `cursor` points at, requesting `media_type`.
	pub fn follow<T>(&self, cursor: &PageCursor, media_type: Option<String>) -> CallHandle<Page<T>>
	where
		T: 'static + Send + DeserializeOwned,
	{
		let Some(link) = cursor.link() else {
			return CallHandle::ready(Err(Error::NoMorePages));
		};
		let mut request = RequestDescriptor::get(link.clone());

		if let Some(media_type) = media_type {
			request = request.accept(media_type);
		}

		self.list(request)
	}

	/// Follows cursors until the listing is exhausted and returns every item in server
	/// order.
	pub fn list_all<T>(&self, request: RequestDescriptor) -> CallHandle<Vec<T>>
	where
		T: 'static + Send + DeserializeOwned,
	{
		let client = self.clone();

		spawn_call(self.runtime(), FlowKind::Api, "list_all", async move {
			let mut request = request;
			let mut items = Vec::new();

			loop {
				let page = client.fetch_page::<T>(&request).await?;
				let next = request.follow(&page.cursor);

				items.extend(page.items);

				match next {
					Some(next) => request = next,
					None => break,
				}
			}

			Ok(items)
		})
	}

	pub(crate) fn runtime(&self) -> Option<Handle> {
		self.runtime.clone().or_else(|| self.authority.runtime())
	}

	async fn fetch_page<T>(&self, request: &RequestDescriptor) -> Result<Page<T>>
	where
		T: DeserializeOwned,
	{
		let response = self.dispatch(request, codec::json::<Vec<T>>).await?;

		Ok(response.into_page(request.accept.clone()))
	}

	async fn dispatch<T>(
		&self,
		request: &RequestDescriptor,
		decoder: Decoder<T>,
	) -> Result<Response<T>> {
		let record = self.authority.signed_in_record().await?.ok_or(Error::NotSignedIn)?;

		if record.will_expire_soon_at(OffsetDateTime::now_utc(), self.config.policy.expiry_margin)
			&& let Err(e) = self.authority.refresh_detached(record.access_token.clone()).await
		{
			obs::note_refresh_failure(&e);
		}

		let token = self.current_token().await?;

		match self.procedure.execute(request, Some(&token), decoder).await {
			Err(e) if e.is_token_expired() => {
				obs::note_token_expired(&request.url);

				if let Err(refresh_error) =
					self.authority.refresh_detached(Some(token.expose().to_owned())).await
				{
					obs::note_refresh_failure(&refresh_error);
				}
				// A streamed body was consumed by the first attempt.
				if !request.body.is_replayable() {
					return Err(e);
				}

				let token = self.current_token().await?;

				self.procedure.execute(request, Some(&token), decoder).await
			},
			result => result,
		}
	}

	async fn current_token(&self) -> Result<Secret> {
		self.authority
			.signed_in_record()
			.await?
			.and_then(|record| record.access_token)
			.map(Secret::new)
			.ok_or(Error::NotSignedIn)
	}
}
