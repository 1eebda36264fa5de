// self
use crate::{
	_prelude::*,
	model::{DocumentId, FileId},
};

/// Metadata of a file attached to a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
	/// Server-assigned identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<FileId>,
	/// Document the file is attached to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub document_id: Option<DocumentId>,
	/// Content type recorded at upload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mime_type: Option<String>,
	/// Original file name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_name: Option<String>,
	/// SHA-1 of the content, as reported by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filehash: Option<String>,
	/// Size in bytes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<u64>,
	/// Upload instant.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub created: Option<OffsetDateTime>,
}
