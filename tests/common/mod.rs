//! Scripted transport and fixtures shared by the integration tests.

#![allow(dead_code)]

pub use std::{collections::BTreeMap, io, sync::Arc};

pub use mendeley_client::{
	CallHandle, Client, Error, ErrorKind,
	auth::{ClientCredentials, CredentialRecord, Credentials},
	config::ClientConfig,
	error::{ConfigError, TransportError},
	http::{
		ApiRequest, ApiResponse, HeaderMap, HeaderName, HeaderValue, HttpTransport, Method,
		RequestBody, StatusCode, TransportFuture,
	},
	store::{MemoryStore, TokenStore},
	url::{Url, form_urlencoded},
};
pub use futures::StreamExt;
pub use parking_lot::Mutex;
pub use serde_json::json;
pub use time::{Duration, OffsetDateTime};
pub use tokio::sync::Notify;

/// Path of the token endpoint under the default endpoint set.
pub const TOKEN_PATH: &str = "/oauth/token";
pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const REDIRECT_URI: &str = "https://app.example.com/callback";

/// Scripted answer for one request.
pub enum Reply {
	Respond { status: u16, headers: Vec<(String, String)>, body: Vec<u8> },
	Fail(io::ErrorKind),
	Gated(Arc<Notify>, Box<Reply>),
}
impl Reply {
	pub fn json(status: u16, body: serde_json::Value) -> Self {
		Self::Respond {
			status,
			headers: vec![("content-type".into(), "application/json".into())],
			body: body.to_string().into_bytes(),
		}
	}

	pub fn empty(status: u16) -> Self {
		Self::Respond { status, headers: Vec::new(), body: Vec::new() }
	}

	pub fn bytes(status: u16, body: &[u8]) -> Self {
		Self::Respond { status, headers: Vec::new(), body: body.to_vec() }
	}

	pub fn token(access: &str, refresh: Option<&str>, expires_in: i64) -> Self {
		let mut body = json!({
			"access_token": access,
			"token_type": "bearer",
			"expires_in": expires_in,
		});

		if let Some(refresh) = refresh {
			body["refresh_token"] = json!(refresh);
		}

		Self::json(200, body)
	}

	pub fn token_expired() -> Self {
		Self::json(401, json!({ "message": "Token has expired" }))
	}

	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Self::Respond { headers, .. } = &mut self {
			headers.push((name.to_owned(), value.to_owned()));
		}

		self
	}

	pub fn gated(self, gate: &Arc<Notify>) -> Self {
		Self::Gated(gate.clone(), Box::new(self))
	}

	fn resolve(self) -> TransportFuture<'static> {
		Box::pin(async move {
			match self {
				Reply::Respond { status, headers, body } => {
					let mut response = ApiResponse::new(body);

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					for (name, value) in headers {
						response.headers_mut().append(
							HeaderName::from_bytes(name.as_bytes())
								.expect("Scripted header name should be valid."),
							HeaderValue::from_str(&value)
								.expect("Scripted header value should be valid."),
						);
					}

					Ok(response)
				},
				Reply::Fail(kind) =>
					Err(TransportError::Io(io::Error::new(kind, "Scripted transport failure."))),
				Reply::Gated(gate, reply) => {
					gate.notified().await;

					reply.resolve().await
				},
			}
		})
	}
}

/// Request as seen by the transport.
#[derive(Clone, Debug)]
pub struct Recorded {
	pub method: Method,
	pub url: Url,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
	pub chunk_sizes: Vec<usize>,
}
impl Recorded {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	pub fn form(&self) -> BTreeMap<String, String> {
		form_urlencoded::parse(&self.body).into_owned().collect()
	}
}

#[derive(Default)]
struct Script {
	routes: Vec<(Method, String, Vec<Reply>)>,
	requests: Vec<Recorded>,
}

/// Transport answering from per-route reply queues and recording every request.
///
/// Requests without a scripted reply get a 500 so tests fail loudly.
#[derive(Clone, Default)]
pub struct MockTransport {
	script: Arc<Mutex<Script>>,
}
impl MockTransport {
	pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
		let mut script = self.script.lock();

		match script.routes.iter_mut().find(|(m, p, _)| *m == method && p.as_str() == path) {
			Some((_, _, replies)) => replies.push(reply),
			None => script.routes.push((method, path.to_owned(), vec![reply])),
		}

		self
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.script.lock().requests.clone()
	}

	pub fn calls(&self, method: Method, path: &str) -> usize {
		self.script
			.lock()
			.requests
			.iter()
			.filter(|request| request.method == method && request.url.path() == path)
			.count()
	}

	pub fn last(&self, method: Method, path: &str) -> Recorded {
		self.script
			.lock()
			.requests
			.iter()
			.rev()
			.find(|request| request.method == method && request.url.path() == path)
			.cloned()
			.expect("A matching request should have been recorded.")
	}
}
impl HttpTransport for MockTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let (parts, body) = request.into_parts();
		let url = Url::parse(&parts.uri.to_string()).expect("Request URI should be absolute.");
		let reply = self
			.script
			.lock()
			.routes
			.iter_mut()
			.find(|(method, path, replies)| {
				*method == parts.method && path.as_str() == url.path() && !replies.is_empty()
			})
			.map(|(_, _, replies)| replies.remove(0))
			.unwrap_or_else(|| Reply::json(500, json!({ "message": "Unscripted request." })));

		Box::pin(async move {
			let (body, chunk_sizes) = match drain(body).await {
				Ok(drained) => drained,
				Err(e) => {
					self.script.lock().requests.push(Recorded {
						method: parts.method,
						url,
						headers: parts.headers,
						body: Vec::new(),
						chunk_sizes: Vec::new(),
					});

					return Err(e);
				},
			};

			self.script.lock().requests.push(Recorded {
				method: parts.method,
				url,
				headers: parts.headers,
				body,
				chunk_sizes,
			});

			reply.resolve().await
		})
	}
}

/// Reads a request body the way a wire transport would, pulling streamed chunks in order.
async fn drain(body: RequestBody) -> Result<(Vec<u8>, Vec<usize>), TransportError> {
	match body {
		RequestBody::Empty => Ok((Vec::new(), Vec::new())),
		RequestBody::Bytes(bytes) => Ok((bytes, Vec::new())),
		RequestBody::Chunked(chunked) => Ok((
			chunked.chunks().flatten().copied().collect(),
			chunked.chunks().map(<[u8]>::len).collect(),
		)),
		RequestBody::Stream(stream) => {
			let mut stream = stream.take().ok_or(TransportError::BodyConsumed)?;
			let mut bytes = Vec::new();
			let mut sizes = Vec::new();

			while let Some(chunk) = stream.next().await {
				let chunk = chunk?;

				sizes.push(chunk.len());
				bytes.extend_from_slice(&chunk);
			}

			Ok((bytes, sizes))
		},
	}
}

pub fn config() -> ClientConfig {
	ClientConfig::builder(ClientCredentials::new(
		CLIENT_ID,
		CLIENT_SECRET,
		Url::parse(REDIRECT_URI).expect("Redirect fixture should parse."),
	))
	.build()
	.expect("Config fixture should validate.")
}

pub fn record(access: &str, refresh: Option<&str>, expires_in: Duration) -> CredentialRecord {
	let mut builder = Credentials::builder()
		.access_token(access)
		.expires_at(OffsetDateTime::now_utc() + expires_in);

	if let Some(refresh) = refresh {
		builder = builder.refresh_token(refresh);
	}

	builder
		.build()
		.expect("Credential fixture should build.")
		.to_record()
		.expect("Credential fixture should flatten.")
}

pub fn client(transport: &MockTransport, store: &MemoryStore) -> Client {
	Client::with_transport(config(), Arc::new(store.clone()), Arc::new(transport.clone()))
		.expect("Client fixture should build.")
}

/// Polls `condition` until it holds, yielding to spawned tasks in between.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
	for _ in 0..400 {
		if condition() {
			return;
		}

		tokio::time::sleep(std::time::Duration::from_millis(5)).await;
	}

	panic!("Condition was not reached in time.");
}
