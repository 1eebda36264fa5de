//! Blocking facade over [`Client`] for hosts without an async runtime.

// crates.io
use serde::de::DeserializeOwned;
use tokio::runtime::{Builder, Runtime};
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	authority::SignInGrant,
	client::Client,
	codec::Decoder,
	error::ConfigError,
	page::Page,
	procedure::{RequestDescriptor, Response},
};

/// Runs the same call pipeline as [`Client`] on a private current-thread runtime.
///
/// Every method blocks the calling thread until the call finishes. Do not use it from
/// inside an async context.
#[derive(Debug)]
pub struct BlockingClient {
	client: Client,
	runtime: Runtime,
}
impl BlockingClient {
	/// Wraps `client`, which is rebound to the private runtime.
	pub fn new(client: Client) -> Result<Self> {
		let runtime = Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|source| ConfigError::RuntimeBuild { source })?;
		let client = client.with_runtime(runtime.handle().clone());

		Ok(Self { client, runtime })
	}

	/// Async client sharing this client's authority and transport.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// See [`TokenAuthority::is_signed_in`](crate::authority::TokenAuthority::is_signed_in).
	pub fn is_signed_in(&self) -> bool {
		self.runtime.block_on(self.client.authority().is_signed_in())
	}

	/// See [`TokenAuthority::sign_in`](crate::authority::TokenAuthority::sign_in).
	pub fn sign_in(&self, grant: SignInGrant) -> Result<Credentials> {
		self.runtime.block_on(self.client.authority().sign_in(grant))
	}

	/// See [`TokenAuthority::sign_out`](crate::authority::TokenAuthority::sign_out).
	pub fn sign_out(&self) -> Result<()> {
		self.runtime.block_on(self.client.authority().sign_out())
	}

	/// See [`Client::call`].
	pub fn call<T>(&self, request: RequestDescriptor, decoder: Decoder<T>) -> Result<Response<T>>
	where
		T: 'static + Send,
	{
		self.runtime.block_on(self.client.call(request, decoder))
	}

	/// See [`Client::list`].
	pub fn list<T>(&self, request: RequestDescriptor) -> Result<Page<T>>
	where
		T: 'static + Send + DeserializeOwned,
	{
		self.runtime.block_on(self.client.list(request))
	}

	/// See [`Client::next_page`].
	pub fn next_page<T>(&self, page: &Page<T>) -> Result<Page<T>>
	where
		T: 'static + Send + DeserializeOwned,
	{
		self.runtime.block_on(self.client.next_page(page))
	}

	/// See [`Client::list_all`].
	pub fn list_all<T>(&self, request: RequestDescriptor) -> Result<Vec<T>>
	where
		T: 'static + Send + DeserializeOwned,
	{
		self.runtime.block_on(self.client.list_all(request))
	}
}
