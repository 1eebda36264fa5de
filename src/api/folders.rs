// self
use crate::{
	_prelude::*,
	api::{self, media_type},
	client::{CallHandle, Client},
	codec,
	model::{DocumentId, Folder, FolderId, FolderMember},
	page::Page,
	procedure::{RequestDescriptor, Response},
};

/// Caller for `/folders`.
#[derive(Clone, Copy, Debug)]
pub struct Folders<'a> {
	client: &'a Client,
}
impl<'a> Folders<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// First page of the folder listing.
	pub fn list(&self) -> CallHandle<Page<Folder>> {
		let request = self
			.client
			.api_url("folders")
			.map(|url| RequestDescriptor::get(url).accept(media_type::FOLDER));

		api::list(self.client, request)
	}

	/// Creates a folder.
	pub fn create(&self, folder: &Folder) -> CallHandle<Response<Folder>> {
		let request = self
			.client
			.api_url("folders")
			.and_then(|url| RequestDescriptor::post_json(url, media_type::FOLDER, folder));

		api::call(self.client, request, codec::json)
	}

	/// Deletes a folder; its documents stay in the library.
	pub fn delete(&self, id: &FolderId) -> CallHandle<Response<()>> {
		let request = self.client.api_url(&format!("folders/{id}")).map(RequestDescriptor::delete);

		api::call(self.client, request, codec::empty)
	}

	/// Adds `document` to folder `id`.
	pub fn add_document(&self, id: &FolderId, document: &DocumentId) -> CallHandle<Response<()>> {
		let member = FolderMember { id: document.clone() };
		let request = self.members_url(id).and_then(|url| {
			RequestDescriptor::post_json(url, media_type::FOLDER_MEMBER, &member)
		});

		api::call(self.client, request, codec::empty)
	}

	/// First page of the documents filed in folder `id`.
	pub fn documents(&self, id: &FolderId) -> CallHandle<Page<FolderMember>> {
		let request = self
			.members_url(id)
			.map(|url| RequestDescriptor::get(url).accept(media_type::FOLDER_MEMBER));

		api::list(self.client, request)
	}

	fn members_url(&self, id: &FolderId) -> Result<Url> {
		self.client.api_url(&format!("folders/{id}/documents"))
	}
}
