// self
use crate::{
	_prelude::*,
	codec,
	http::{HeaderName, Method, RequestBody, StatusCode, header},
	page::PageCursor,
};

/// Everything needed to issue one API request: verb, URL, media types, body, and the
/// status that counts as success.
///
/// Descriptors are plain data so the dispatcher can replay them after a token refresh.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL including query parameters.
	pub url: Url,
	/// Media type sent in `Accept`.
	pub accept: Option<String>,
	/// Media type sent in `Content-Type`.
	pub content_type: Option<String>,
	/// Request body.
	pub body: RequestBody,
	/// Status that marks the call as successful.
	pub expected_status: StatusCode,
	/// Additional headers (upload disposition, document link).
	pub headers: Vec<(HeaderName, String)>,
}
impl RequestDescriptor {
	fn new(method: Method, url: Url, expected_status: StatusCode) -> Self {
		Self {
			method,
			url,
			accept: None,
			content_type: None,
			body: RequestBody::Empty,
			expected_status,
			headers: Vec::new(),
		}
	}

	/// GET expecting 200.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url, StatusCode::OK)
	}

	/// POST with a body expecting 201 Created.
	pub fn post(url: Url, content_type: impl Into<String>, body: Vec<u8>) -> Self {
		Self::new(Method::POST, url, StatusCode::CREATED).with_body(content_type, body)
	}

	/// POST of a JSON payload expecting 201 Created.
	pub fn post_json<T>(url: Url, media_type: &str, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		Ok(Self::post(url, media_type, codec::encode_json(payload)?).accept(media_type))
	}

	/// POST without a body expecting 204 No Content.
	pub fn post_empty(url: Url) -> Self {
		Self::new(Method::POST, url, StatusCode::NO_CONTENT)
	}

	/// PATCH with a body expecting 200.
	pub fn patch(url: Url, content_type: impl Into<String>, body: Vec<u8>) -> Self {
		Self::new(Method::PATCH, url, StatusCode::OK).with_body(content_type, body)
	}

	/// PATCH of a JSON payload expecting 200.
	pub fn patch_json<T>(url: Url, media_type: &str, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		Ok(Self::patch(url, media_type, codec::encode_json(payload)?).accept(media_type))
	}

	/// DELETE expecting 204 No Content.
	pub fn delete(url: Url) -> Self {
		Self::new(Method::DELETE, url, StatusCode::NO_CONTENT)
	}

	/// Chunked file upload attached to `document`, expecting 201 Created.
	///
	/// `body` is a [`ChunkedBody`](crate::http::ChunkedBody) for in-memory data or a
	/// [`StreamBody`](crate::http::StreamBody) read while the request is sent.
	pub fn upload(
		url: Url,
		content_type: impl Into<String>,
		file_name: &str,
		document: &Url,
		body: impl Into<RequestBody>,
	) -> Self {
		let mut descriptor = Self::new(Method::POST, url, StatusCode::CREATED);

		descriptor.content_type = Some(content_type.into());
		descriptor.body = body.into();

		descriptor
			.header(
				header::CONTENT_DISPOSITION,
				format!("attachment; filename=\"{}\"", file_name.replace('"', "\\\"")),
			)
			.header(header::LINK, format!("<{document}>; rel=\"document\""))
	}

	/// Sets the `Accept` media type.
	pub fn accept(mut self, media_type: impl Into<String>) -> Self {
		self.accept = Some(media_type.into());

		self
	}

	/// Overrides the status that counts as success.
	pub fn expect(mut self, status: StatusCode) -> Self {
		self.expected_status = status;

		self
	}

	/// Adds an extra header.
	pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Returns `true` for GET requests, the only verb retried on transport failures.
	pub fn is_get(&self) -> bool {
		self.method == Method::GET
	}

	/// Builds the GET for the page `cursor` points at, keeping this listing's media type.
	pub fn follow(&self, cursor: &PageCursor) -> Option<Self> {
		let link = cursor.link()?.clone();
		let mut next = Self::get(link);

		next.accept = self.accept.clone();

		Some(next)
	}

	fn with_body(mut self, content_type: impl Into<String>, body: Vec<u8>) -> Self {
		self.content_type = Some(content_type.into());
		self.body = RequestBody::Bytes(body);

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::ChunkedBody;

	fn url(path: &str) -> Url {
		Url::parse("https://api.mendeley.com/")
			.and_then(|base| base.join(path))
			.expect("Fixture URL should parse.")
	}

	#[test]
	fn constructors_pick_expected_statuses() {
		assert_eq!(RequestDescriptor::get(url("documents")).expected_status, StatusCode::OK);
		assert_eq!(
			RequestDescriptor::post(url("documents"), "application/json", b"{}".to_vec())
				.expected_status,
			StatusCode::CREATED
		);
		assert_eq!(
			RequestDescriptor::post_empty(url("documents/1/trash")).expected_status,
			StatusCode::NO_CONTENT
		);
		assert_eq!(
			RequestDescriptor::patch(url("documents/1"), "application/json", Vec::new())
				.expected_status,
			StatusCode::OK
		);
		assert_eq!(
			RequestDescriptor::delete(url("documents/1")).expected_status,
			StatusCode::NO_CONTENT
		);
	}

	#[test]
	fn upload_sets_disposition_and_document_link() {
		let descriptor = RequestDescriptor::upload(
			url("files"),
			"application/pdf",
			"paper \"final\".pdf",
			&url("documents/abc"),
			ChunkedBody::from_bytes(b"%PDF-1.4", 4),
		);
		let find = |name: &HeaderName| {
			descriptor.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
		};

		assert_eq!(descriptor.expected_status, StatusCode::CREATED);
		assert_eq!(
			find(&header::CONTENT_DISPOSITION),
			Some("attachment; filename=\"paper \\\"final\\\".pdf\"")
		);
		assert_eq!(
			find(&header::LINK),
			Some("<https://api.mendeley.com/documents/abc>; rel=\"document\"")
		);
	}

	#[test]
	fn follow_reuses_media_type() {
		let listing = RequestDescriptor::get(url("documents")).accept("application/x-test");

		assert!(listing.follow(&PageCursor::exhausted()).is_none());

		let next = listing
			.follow(&PageCursor::next(url("documents?marker=2")))
			.expect("Cursor with link should produce a request.");

		assert!(next.is_get());
		assert_eq!(next.accept.as_deref(), Some("application/x-test"));
		assert_eq!(next.url.as_str(), "https://api.mendeley.com/documents?marker=2");
	}
}
