//! Request procedure: turns a [`RequestDescriptor`] into one HTTP exchange and a typed result.
//!
//! The procedure injects the bearer token and media-type headers, sends the body, checks
//! the status against the descriptor's expectation, parses `Date`, `Link`, and `Location`,
//! and decodes the body. GET requests that fail at the transport layer are retried up to
//! the configured ceiling; other verbs are sent exactly once.

/// Request descriptions consumed by the procedure.
pub mod descriptor;
/// Response header parsing.
pub mod headers;

pub use descriptor::RequestDescriptor;
pub use headers::ResponseHeaders;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	codec::Decoder,
	config::CallPolicy,
	error::{ConfigError, DecodeError, HttpError},
	http::{ApiRequest, ApiResponse, HttpTransport, RequestBody, header},
	obs,
	page::{Page, PageCursor},
};

const MESSAGE_PREVIEW_LIMIT: usize = 256;

/// Successful outcome of a call.
#[derive(Clone, Debug)]
pub struct Response<T> {
	/// Decoded payload.
	pub payload: T,
	/// Status the server returned (always the expected one).
	pub status: u16,
	/// Next-page cursor parsed from `Link`.
	pub cursor: PageCursor,
	/// Server `Date`, when present.
	pub server_date: Option<OffsetDateTime>,
	/// `Location` of a created resource, when present.
	pub location: Option<Url>,
}
impl<T> Response<T> {
	/// Transforms the payload, keeping the metadata.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
		Response {
			payload: f(self.payload),
			status: self.status,
			cursor: self.cursor,
			server_date: self.server_date,
			location: self.location,
		}
	}
}
impl<T> Response<Vec<T>> {
	/// Converts a listing response into a [`Page`].
	pub fn into_page(self, media_type: Option<String>) -> Page<T> {
		Page {
			items: self.payload,
			cursor: self.cursor,
			server_date: self.server_date,
			media_type,
		}
	}
}

/// Executes request descriptors over an [`HttpTransport`].
#[derive(Clone)]
pub struct RequestProcedure {
	transport: Arc<dyn HttpTransport>,
	get_attempts: u8,
}
impl RequestProcedure {
	/// Creates a procedure that honours `policy`'s GET attempt ceiling.
	pub fn new(transport: Arc<dyn HttpTransport>, policy: &CallPolicy) -> Self {
		Self { transport, get_attempts: policy.get_attempts.max(1) }
	}

	/// Runs `request`, optionally authenticated with `token`, decoding the body with `decoder`.
	pub async fn execute<T>(
		&self,
		request: &RequestDescriptor,
		token: Option<&Secret>,
		decoder: Decoder<T>,
	) -> Result<Response<T>> {
		let attempts =
			if request.is_get() && request.body.is_replayable() { self.get_attempts } else { 1 };
		let mut attempt = 1;
		let response = loop {
			match self.transport.execute(build_request(request, token)?).await {
				Ok(response) => break response,
				Err(e) if attempt < attempts => {
					obs::note_get_retry(attempt, &request.url, &e);

					attempt += 1;
				},
				Err(e) => return Err(e.into()),
			}
		};

		interpret(request, response, decoder)
	}
}
impl Debug for RequestProcedure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestProcedure").field("get_attempts", &self.get_attempts).finish()
	}
}

fn build_request(request: &RequestDescriptor, token: Option<&Secret>) -> Result<ApiRequest> {
	let mut builder =
		oauth2::http::Request::builder().method(request.method.clone()).uri(request.url.as_str());

	if let Some(token) = token {
		builder = builder.header(header::AUTHORIZATION, token.bearer());
	}
	if let Some(accept) = &request.accept {
		builder = builder.header(header::ACCEPT, accept.as_str());
	}
	if let Some(content_type) = &request.content_type {
		builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
	}
	if let RequestBody::Bytes(bytes) = &request.body {
		builder = builder.header(header::CONTENT_LENGTH, bytes.len());
	}

	for (name, value) in &request.headers {
		builder = builder.header(name, value.as_str());
	}

	builder.body(request.body.clone()).map_err(|e| ConfigError::from(e).into())
}

fn interpret<T>(
	request: &RequestDescriptor,
	response: ApiResponse,
	decoder: Decoder<T>,
) -> Result<Response<T>> {
	let (parts, body) = response.into_parts();

	if parts.status != request.expected_status {
		return Err(HttpError {
			url: request.url.clone(),
			status: parts.status.as_u16(),
			expected: request.expected_status.as_u16(),
			message: server_message(&body),
		}
		.into());
	}

	let headers = ResponseHeaders::parse(&parts.headers, &request.url);
	let payload =
		decoder(&body).map_err(|source| DecodeError { url: request.url.clone(), source })?;

	Ok(Response {
		payload,
		status: parts.status.as_u16(),
		cursor: headers.cursor,
		server_date: headers.server_date,
		location: headers.location,
	})
}

fn server_message(body: &[u8]) -> String {
	#[derive(Deserialize)]
	struct ErrorBody {
		message: Option<String>,
		error_description: Option<String>,
		error: Option<String>,
	}

	if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body)
		&& let Some(message) = parsed.message.or(parsed.error_description).or(parsed.error)
	{
		return message;
	}

	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.chars().count() <= MESSAGE_PREVIEW_LIMIT {
		return text.to_owned();
	}

	let mut preview: String = text.chars().take(MESSAGE_PREVIEW_LIMIT).collect();

	preview.push('…');

	preview
}
