//! Typed callers for the API's resources.
//!
//! Each caller borrows a [`Client`], builds a [`RequestDescriptor`] with the resource's
//! versioned media type, and dispatches it. Callers hold no state of their own.

/// Document resource callers.
pub mod documents;
/// File resource callers.
pub mod files;
/// Folder resource callers.
pub mod folders;
/// Profile resource callers.
pub mod profiles;

pub use documents::*;
pub use files::*;
pub use folders::*;
pub use profiles::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	client::{CallHandle, Client},
	codec::Decoder,
	page::Page,
	procedure::{RequestDescriptor, Response},
};

/// Versioned media types sent in `Accept` and `Content-Type`.
pub mod media_type {
	/// Document records.
	pub const DOCUMENT: &str = "application/vnd.mendeley-document.1+json";
	/// Folder records.
	pub const FOLDER: &str = "application/vnd.mendeley-folder.1+json";
	/// Folder membership entries.
	pub const FOLDER_MEMBER: &str = "application/vnd.mendeley-document.1+json";
	/// File metadata.
	pub const FILE: &str = "application/vnd.mendeley-file.1+json";
	/// User profiles.
	pub const PROFILE: &str = "application/vnd.mendeley-profiles.1+json";
}

impl Client {
	/// Document caller.
	pub fn documents(&self) -> Documents<'_> {
		Documents::new(self)
	}

	/// Folder caller.
	pub fn folders(&self) -> Folders<'_> {
		Folders::new(self)
	}

	/// File caller.
	pub fn files(&self) -> Files<'_> {
		Files::new(self)
	}

	/// Profile caller.
	pub fn profiles(&self) -> Profiles<'_> {
		Profiles::new(self)
	}
}

// Descriptor construction can fail locally (bad path, unserializable payload); those
// failures resolve the handle without spawning.
fn call<T>(
	client: &Client,
	request: Result<RequestDescriptor>,
	decoder: Decoder<T>,
) -> CallHandle<Response<T>>
where
	T: 'static + Send,
{
	match request {
		Ok(request) => client.call(request, decoder),
		Err(e) => CallHandle::ready(Err(e)),
	}
}

fn list<T>(client: &Client, request: Result<RequestDescriptor>) -> CallHandle<Page<T>>
where
	T: 'static + Send + DeserializeOwned,
{
	match request {
		Ok(request) => client.list(request),
		Err(e) => CallHandle::ready(Err(e)),
	}
}

fn list_all<T>(client: &Client, request: Result<RequestDescriptor>) -> CallHandle<Vec<T>>
where
	T: 'static + Send + DeserializeOwned,
{
	match request {
		Ok(request) => client.list_all(request),
		Err(e) => CallHandle::ready(Err(e)),
	}
}
