// crates.io
use tokio::io::AsyncRead;
// self
use crate::{
	_prelude::*,
	api::{self, media_type},
	client::{CallHandle, Client},
	codec,
	http::{ChunkedBody, RequestBody, StreamBody},
	model::{DocumentId, FileId, FileMeta},
	page::Page,
	procedure::{RequestDescriptor, Response},
};

/// Caller for `/files`.
#[derive(Clone, Copy, Debug)]
pub struct Files<'a> {
	client: &'a Client,
}
impl<'a> Files<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// First page of the files attached to `document`.
	pub fn list(&self, document: &DocumentId) -> CallHandle<Page<FileMeta>> {
		let request = self.client.api_url("files").map(|mut url| {
			url.query_pairs_mut().append_pair("document_id", document);

			RequestDescriptor::get(url).accept(media_type::FILE)
		});

		api::list(self.client, request)
	}

	/// Attaches `data` to `document` as `file_name`.
	pub fn upload(
		&self,
		document: &DocumentId,
		file_name: &str,
		content_type: &str,
		data: &[u8],
	) -> CallHandle<Response<FileMeta>> {
		let body = ChunkedBody::from_bytes(data, self.client.config().policy.upload_chunk_size);
		let request = self.upload_request(document, file_name, content_type, body);

		api::call(self.client, request, codec::json)
	}

	/// Streams the content of `reader` to `document` as `file_name`.
	///
	/// Chunks are read only as the transport sends them. The body cannot be replayed, so a
	/// `401 Token has expired` answer refreshes the token and is then returned to the
	/// caller instead of being retried.
	pub fn upload_reader(
		&self,
		document: &DocumentId,
		file_name: &str,
		content_type: &str,
		reader: impl 'static + AsyncRead + Send + Sync,
	) -> CallHandle<Response<FileMeta>> {
		let body = StreamBody::new(reader, self.client.config().policy.upload_chunk_size);
		let request = self.upload_request(document, file_name, content_type, body);

		api::call(self.client, request, codec::json)
	}

	/// Downloads the raw content of a file.
	pub fn download(&self, id: &FileId) -> CallHandle<Response<Vec<u8>>> {
		api::call(self.client, self.url(id).map(RequestDescriptor::get), codec::bytes)
	}

	/// Deletes a file.
	pub fn delete(&self, id: &FileId) -> CallHandle<Response<()>> {
		api::call(self.client, self.url(id).map(RequestDescriptor::delete), codec::empty)
	}

	fn url(&self, id: &FileId) -> Result<Url> {
		self.client.api_url(&format!("files/{id}"))
	}

	fn upload_request(
		&self,
		document: &DocumentId,
		file_name: &str,
		content_type: &str,
		body: impl Into<RequestBody>,
	) -> Result<RequestDescriptor> {
		let url = self.client.api_url("files")?;
		let document_url = self.client.api_url(&format!("documents/{document}"))?;

		Ok(RequestDescriptor::upload(url, content_type, file_name, &document_url, body)
			.accept(media_type::FILE))
	}
}
