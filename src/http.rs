//! Transport seam shared by token endpoint exchanges and resource API calls.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack. The default
//! [`ReqwestTransport`] covers production use; tests and hosts with their own stack
//! implement the trait directly. Token exchanges reach the same transport through
//! [`TokenHttpHandle`], an [`AsyncHttpClient`] adapter that also records
//! [`ResponseMetadata`] for error classification.

pub use oauth2::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};

// crates.io
use bytes::Bytes;
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http};
use time::format_description::well_known::Rfc2822;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
// self
use crate::{_prelude::*, error::TransportError};

/// Request handed to an [`HttpTransport`].
pub type ApiRequest = http::Request<RequestBody>;
/// Fully buffered response returned by an [`HttpTransport`].
pub type ApiResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Executes HTTP requests for the client.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// token authority and every in-flight call. A transport returns any HTTP status as a
/// successful response; only failures to obtain a response map to [`TransportError`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the whole response body.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Body attached to an outgoing request.
#[derive(Clone, Default)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Fully buffered bytes sent with a `Content-Length`.
	Bytes(Vec<u8>),
	/// Pre-split chunks sent with chunked transfer encoding.
	Chunked(ChunkedBody),
	/// Reader pulled chunk by chunk while the request is sent.
	Stream(StreamBody),
}
impl RequestBody {
	/// Length to advertise in `Content-Length`, or `None` for streamed bodies.
	pub fn content_length(&self) -> Option<usize> {
		match self {
			Self::Empty => Some(0),
			Self::Bytes(bytes) => Some(bytes.len()),
			Self::Chunked(_) | Self::Stream(_) => None,
		}
	}

	/// Returns `true` when the body is known to carry no bytes.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Empty => true,
			Self::Bytes(bytes) => bytes.is_empty(),
			Self::Chunked(chunked) => chunked.total_len() == 0,
			Self::Stream(_) => false,
		}
	}

	/// Returns `false` when sending the body consumes it, so the request cannot be resent.
	pub fn is_replayable(&self) -> bool {
		!matches!(self, Self::Stream(_))
	}
}
impl From<Vec<u8>> for RequestBody {
	fn from(bytes: Vec<u8>) -> Self {
		Self::Bytes(bytes)
	}
}
impl From<ChunkedBody> for RequestBody {
	fn from(chunked: ChunkedBody) -> Self {
		Self::Chunked(chunked)
	}
}
impl From<StreamBody> for RequestBody {
	fn from(stream: StreamBody) -> Self {
		Self::Stream(stream)
	}
}
impl Debug for RequestBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Empty => f.write_str("Empty"),
			Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
			Self::Chunked(chunked) => Debug::fmt(chunked, f),
			Self::Stream(stream) => Debug::fmt(stream, f),
		}
	}
}

/// In-memory upload payload split into fixed-size chunks.
///
/// Chunks are slices of one shared buffer, so cloning the body or handing it to a
/// transport never copies the payload.
#[derive(Clone)]
pub struct ChunkedBody {
	chunks: Arc<[Bytes]>,
	total: usize,
}
impl ChunkedBody {
	/// Copies `data` once and splits it into chunks of at most `chunk_size` bytes.
	pub fn from_bytes(data: &[u8], chunk_size: usize) -> Self {
		Self::from_shared(Bytes::copy_from_slice(data), chunk_size)
	}

	/// Splits an owned buffer into chunks of at most `chunk_size` bytes without copying it.
	pub fn from_shared(data: Bytes, chunk_size: usize) -> Self {
		let chunk_size = chunk_size.max(1);
		let chunks: Vec<Bytes> = (0..data.len())
			.step_by(chunk_size)
			.map(|start| data.slice(start..(start + chunk_size).min(data.len())))
			.collect();

		Self { chunks: chunks.into(), total: data.len() }
	}

	/// Iterates over the chunks in send order.
	pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
		self.chunks.iter().map(Bytes::as_ref)
	}

	/// Number of chunks.
	pub fn chunk_count(&self) -> usize {
		self.chunks.len()
	}

	/// Total payload size in bytes.
	pub fn total_len(&self) -> usize {
		self.total
	}
}
impl Debug for ChunkedBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Chunked({} bytes in {} chunks)", self.total, self.chunks.len())
	}
}

/// Reader behind a [`StreamBody`].
pub type UploadReader = Pin<Box<dyn AsyncRead + Send + Sync>>;
/// Chunk stream a transport pulls a [`StreamBody`] through.
pub type UploadStream = ReaderStream<UploadReader>;

/// Upload payload read lazily from an [`AsyncRead`] while the request is sent.
///
/// Each poll reads at most one chunk, so memory use stays bounded by the chunk size. The
/// reader is handed out once; a transport that finds it already taken must fail the
/// request instead of sending an empty body.
#[derive(Clone)]
pub struct StreamBody {
	stream: Arc<Mutex<Option<UploadStream>>>,
	chunk_size: usize,
}
impl StreamBody {
	/// Wraps `reader`, reading chunks of at most `chunk_size` bytes.
	pub fn new(reader: impl 'static + AsyncRead + Send + Sync, chunk_size: usize) -> Self {
		let chunk_size = chunk_size.max(1);
		let reader: UploadReader = Box::pin(reader);

		Self {
			stream: Arc::new(Mutex::new(Some(ReaderStream::with_capacity(reader, chunk_size)))),
			chunk_size,
		}
	}

	/// Takes the chunk stream; returns `None` once a transport already took it.
	pub fn take(&self) -> Option<UploadStream> {
		self.stream.lock().take()
	}

	/// Returns `true` after the stream was handed to a transport.
	pub fn is_consumed(&self) -> bool {
		self.stream.lock().is_none()
	}

	/// Upper bound of a single chunk.
	pub fn chunk_size(&self) -> usize {
		self.chunk_size
	}
}
impl Debug for StreamBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Stream({} byte chunks, consumed: {})", self.chunk_size, self.is_consumed())
	}
}

/// Captures metadata from the most recent token endpoint response for error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// [`AsyncHttpClient`] adapter that routes `oauth2` token requests through an [`HttpTransport`].
pub(crate) struct TokenHttpHandle {
	transport: Arc<dyn HttpTransport>,
	slot: ResponseMetadataSlot,
}
impl TokenHttpHandle {
	pub(crate) fn new(transport: Arc<dyn HttpTransport>, slot: ResponseMetadataSlot) -> Self {
		Self { transport, slot }
	}
}
impl<'c> AsyncHttpClient<'c> for TokenHttpHandle {
	type Error = HttpClientError<TransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let response =
				self.transport.execute(request.map(RequestBody::Bytes)).await.map_err(Box::new)?;
			let retry_after = parse_retry_after(response.headers());

			self.slot
				.store(ResponseMetadata { status: Some(response.status().as_u16()), retry_after });

			Ok(response)
		})
	}
}

/// Default transport backed by [`ReqwestClient`].
///
/// [`Client::new`](crate::Client::new) builds two of these: one that follows redirects for
/// API calls, because file downloads answer with a redirect to storage, and one for the
/// token endpoint built by [`ReqwestTransport::for_token_endpoint`], which must answer
/// directly instead of delegating to another URI.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a transport that never follows redirects, for token exchanges.
	pub fn for_token_endpoint() -> Result<Self, ReqwestError> {
		ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build().map(Self)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let (parts, body) = request.into_parts();
			let response = self
				.0
				.request(parts.method, parts.uri.to_string())
				.headers(parts.headers)
				.body(reqwest_body(body)?)
				.send()
				.await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut buffered = ApiResponse::new(response.bytes().await?.to_vec());

			*buffered.status_mut() = status;
			*buffered.headers_mut() = headers;

			Ok(buffered)
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_body(body: RequestBody) -> Result<reqwest::Body, TransportError> {
	Ok(match body {
		RequestBody::Empty => reqwest::Body::from(Vec::new()),
		RequestBody::Bytes(bytes) => reqwest::Body::from(bytes),
		RequestBody::Chunked(chunked) => reqwest::Body::wrap_stream(futures::stream::iter(
			chunked.chunks.to_vec().into_iter().map(Ok::<_, std::io::Error>),
		)),
		RequestBody::Stream(stream) =>
			reqwest::Body::wrap_stream(stream.take().ok_or(TransportError::BodyConsumed)?),
	})
}

pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(header::RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<i64>() {
		return Some(Duration::seconds(secs.max(0)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
