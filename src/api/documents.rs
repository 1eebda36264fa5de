// crates.io
use time::{UtcOffset, format_description::well_known::Rfc3339};
// self
use crate::{
	_prelude::*,
	api::{self, media_type},
	client::{CallHandle, Client},
	codec,
	error::ConfigError,
	model::{Document, DocumentId, GroupId},
	page::Page,
	procedure::{RequestDescriptor, Response},
};

/// Amount of detail returned per document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentView {
	/// Bibliographic fields.
	Bib,
	/// Fields a desktop client needs.
	Client,
	/// Tags only.
	Tags,
	/// Patent fields.
	Patent,
	/// Everything.
	All,
}
impl DocumentView {
	/// Query value.
	pub const fn as_str(self) -> &'static str {
		match self {
			DocumentView::Bib => "bib",
			DocumentView::Client => "client",
			DocumentView::Tags => "tags",
			DocumentView::Patent => "patent",
			DocumentView::All => "all",
		}
	}
}

/// Listing sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentSort {
	/// Creation instant.
	Created,
	/// Last modification instant.
	LastModified,
	/// Title.
	Title,
}
impl DocumentSort {
	/// Query value.
	pub const fn as_str(self) -> &'static str {
		match self {
			DocumentSort::Created => "created",
			DocumentSort::LastModified => "last_modified",
			DocumentSort::Title => "title",
		}
	}
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
	/// Ascending.
	Asc,
	/// Descending.
	Desc,
}
impl SortOrder {
	/// Query value.
	pub const fn as_str(self) -> &'static str {
		match self {
			SortOrder::Asc => "asc",
			SortOrder::Desc => "desc",
		}
	}
}

/// Filters and ordering for document listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentQuery {
	/// Detail level.
	pub view: Option<DocumentView>,
	/// Restricts the listing to a group library.
	pub group_id: Option<GroupId>,
	/// Only documents modified after this instant.
	pub modified_since: Option<OffsetDateTime>,
	/// Page size.
	pub limit: Option<u32>,
	/// Sort key.
	pub sort: Option<DocumentSort>,
	/// Sort direction.
	pub order: Option<SortOrder>,
}
impl DocumentQuery {
	/// Sets the detail level.
	pub fn view(mut self, view: DocumentView) -> Self {
		self.view = Some(view);

		self
	}

	/// Restricts the listing to `group`.
	pub fn group(mut self, group: GroupId) -> Self {
		self.group_id = Some(group);

		self
	}

	/// Only returns documents modified after `instant`.
	pub fn modified_since(mut self, instant: OffsetDateTime) -> Self {
		self.modified_since = Some(instant);

		self
	}

	/// Sets the page size.
	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);

		self
	}

	/// Sets sort key and direction.
	pub fn sort(mut self, sort: DocumentSort, order: SortOrder) -> Self {
		self.sort = Some(sort);
		self.order = Some(order);

		self
	}

	fn apply(&self, url: &mut Url) -> Result<()> {
		let modified_since = self
			.modified_since
			.map(|instant| instant.to_offset(UtcOffset::UTC).format(&Rfc3339))
			.transpose()
			.map_err(|source| ConfigError::InvalidTimestamp { source })?;
		let mut pairs = url.query_pairs_mut();

		if let Some(view) = self.view {
			pairs.append_pair("view", view.as_str());
		}
		if let Some(group) = &self.group_id {
			pairs.append_pair("group_id", group);
		}
		if let Some(modified_since) = &modified_since {
			pairs.append_pair("modified_since", modified_since);
		}
		if let Some(limit) = self.limit {
			pairs.append_pair("limit", &limit.to_string());
		}
		if let Some(sort) = self.sort {
			pairs.append_pair("sort", sort.as_str());
		}
		if let Some(order) = self.order {
			pairs.append_pair("order", order.as_str());
		}

		drop(pairs);

		if url.query() == Some("") {
			url.set_query(None);
		}

		Ok(())
	}
}

/// Caller for `/documents`.
#[derive(Clone, Copy, Debug)]
pub struct Documents<'a> {
	client: &'a Client,
}
impl<'a> Documents<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// First page of the library listing.
	pub fn list(&self, query: &DocumentQuery) -> CallHandle<Page<Document>> {
		api::list(self.client, self.listing(query))
	}

	/// Every document matching `query`, following all pages.
	pub fn list_all(&self, query: &DocumentQuery) -> CallHandle<Vec<Document>> {
		api::list_all(self.client, self.listing(query))
	}

	/// One document.
	pub fn get(&self, id: &DocumentId) -> CallHandle<Response<Document>> {
		let request =
			self.url(id).map(|url| RequestDescriptor::get(url).accept(media_type::DOCUMENT));

		api::call(self.client, request, codec::json)
	}

	/// Creates a document; the server answers 201 with the stored record.
	pub fn create(&self, document: &Document) -> CallHandle<Response<Document>> {
		let request = self.client.api_url("documents").and_then(|url| {
			RequestDescriptor::post_json(url, media_type::DOCUMENT, document)
		});

		api::call(self.client, request, codec::json)
	}

	/// Updates the fields set in `changes`.
	pub fn update(&self, id: &DocumentId, changes: &Document) -> CallHandle<Response<Document>> {
		let request = self
			.url(id)
			.and_then(|url| RequestDescriptor::patch_json(url, media_type::DOCUMENT, changes));

		api::call(self.client, request, codec::json)
	}

	/// Deletes a document permanently.
	pub fn delete(&self, id: &DocumentId) -> CallHandle<Response<()>> {
		api::call(self.client, self.url(id).map(RequestDescriptor::delete), codec::empty)
	}

	/// Moves a document to the trash.
	pub fn trash(&self, id: &DocumentId) -> CallHandle<Response<()>> {
		let request = self
			.client
			.api_url(&format!("documents/{id}/trash"))
			.map(RequestDescriptor::post_empty);

		api::call(self.client, request, codec::empty)
	}

	fn url(&self, id: &DocumentId) -> Result<Url> {
		self.client.api_url(&format!("documents/{id}"))
	}

	fn listing(&self, query: &DocumentQuery) -> Result<RequestDescriptor> {
		let mut url = self.client.api_url("documents")?;

		query.apply(&mut url)?;

		Ok(RequestDescriptor::get(url).accept(media_type::DOCUMENT))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn query_encodes_every_filter() {
		let mut url =
			Url::parse("https://api.mendeley.com/documents").expect("Fixture URL should parse.");
		let query = DocumentQuery::default()
			.view(DocumentView::Bib)
			.group(GroupId::new("g1").expect("Group fixture should be valid."))
			.modified_since(time::macros::datetime!(2024-01-02 03:04:05 UTC))
			.limit(50)
			.sort(DocumentSort::LastModified, SortOrder::Desc);

		query.apply(&mut url).expect("Query should apply.");

		assert_eq!(
			url.query(),
			Some(
				"view=bib&group_id=g1&modified_since=2024-01-02T03%3A04%3A05Z&limit=50&sort=last_modified&order=desc"
			)
		);
	}

	#[test]
	fn empty_query_leaves_url_untouched() {
		let mut url =
			Url::parse("https://api.mendeley.com/documents").expect("Fixture URL should parse.");

		DocumentQuery::default().apply(&mut url).expect("Empty query should apply.");

		assert_eq!(url.as_str(), "https://api.mendeley.com/documents");
	}
}
