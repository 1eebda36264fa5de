//! Plugs a hand-written [`HttpTransport`] into the client.
//!
//! The canned transport answers the token endpoint and `profiles/me` from memory, which
//! makes the whole sign-in and call pipeline observable without network access. Replace it
//! with a wrapper over your own HTTP stack to reuse an existing connection pool.

// std
use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use mendeley_client::{
	Client,
	auth::ClientCredentials,
	config::ClientConfig,
	error::TransportError,
	http::{ApiRequest, ApiResponse, HttpTransport, StatusCode, TransportFuture, header},
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::builder(ClientCredentials::new(
		"demo-client",
		"demo-secret",
		Url::parse("https://app.example.com/callback")?,
	))
	.build()?;
	let transport = Arc::new(CannedTransport::default());
	let client =
		Client::with_transport(config, Arc::new(MemoryStore::default()), transport.clone())?;

	client.authority().sign_in_with_password("demo@example.com", "demo-password").await?;

	let profile = client.profiles().me().await?;

	println!(
		"Profile {} fetched after {} transport round trips.",
		profile.payload.display_name.as_deref().unwrap_or("unknown"),
		transport.calls.load(Ordering::Relaxed)
	);

	let offline = Client::with_transport(
		client.config().clone(),
		Arc::new(MemoryStore::default()),
		Arc::new(OfflineTransport),
	)?;

	match offline.authority().sign_in_with_password("demo@example.com", "demo-password").await {
		Ok(_) => println!("Offline transport unexpectedly produced a token."),
		Err(e) => println!("Offline sign-in failed as a {:?} error: {e}.", e.kind()),
	}

	Ok(())
}

#[derive(Debug, Default)]
struct CannedTransport {
	calls: AtomicUsize,
}
impl HttpTransport for CannedTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		self.calls.fetch_add(1, Ordering::Relaxed);

		Box::pin(async move {
			let (status, body): (u16, &[u8]) = match request.uri().path() {
				"/oauth/token" => (
					200,
					b"{\"access_token\":\"canned-access\",\"refresh_token\":\"canned-refresh\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				),
				"/profiles/me" => (200, b"{\"id\":\"p1\",\"display_name\":\"Demo User\"}"),
				_ => (404, b"{\"message\":\"Not found\"}"),
			};
			let mut response = ApiResponse::new(body.to_vec());

			*response.status_mut() = StatusCode::from_u16(status)
				.map_err(|e| TransportError::Io(io::Error::other(e)))?;
			response
				.headers_mut()
				.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

			Ok(response)
		})
	}
}

struct OfflineTransport;
impl HttpTransport for OfflineTransport {
	fn execute(&self, _request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async {
			Err(TransportError::Io(io::Error::new(io::ErrorKind::NotConnected, "offline")))
		})
	}
}
