// self
use crate::{
	_prelude::*,
	model::{DocumentId, GroupId, ProfileId},
};

/// Bibliographic record in a user or group library.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	/// Server-assigned identifier; unset on create.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<DocumentId>,
	/// Title.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Document type (`journal`, `book`, `conference_proceedings`, ...).
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Owner profile.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub profile_id: Option<ProfileId>,
	/// Group the document belongs to, for group libraries.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group_id: Option<GroupId>,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub created: Option<OffsetDateTime>,
	/// Last modification instant.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub last_modified: Option<OffsetDateTime>,
	/// Abstract.
	#[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
	pub abstract_text: Option<String>,
	/// Publication the document appeared in.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
	/// Publication year.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub year: Option<i32>,
	/// Authors in citation order.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authors: Option<Vec<Person>>,
	/// Editors in citation order.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub editors: Option<Vec<Person>>,
	/// External identifiers keyed by scheme (`doi`, `isbn`, `pmid`, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub identifiers: Option<BTreeMap<String, String>>,
	/// Author keywords.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub keywords: Option<Vec<String>>,
	/// User tags.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tags: Option<Vec<String>>,
	/// Related web pages.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub websites: Option<Vec<String>>,
	/// Volume.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub volume: Option<String>,
	/// Issue.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub issue: Option<String>,
	/// Page range.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pages: Option<String>,
	/// Publisher.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub publisher: Option<String>,
	/// Free-text notes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// Read flag.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub read: Option<bool>,
	/// Starred flag.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub starred: Option<bool>,
	/// Set when the signed-in user authored the document.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authored: Option<bool>,
	/// Set when the user confirmed imported metadata.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub confirmed: Option<bool>,
	/// Set when the document is hidden from the library view.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hidden: Option<bool>,
	/// Set when at least one file is attached.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_attached: Option<bool>,
}
impl Document {
	/// Minimal document for a create call.
	pub fn new(kind: impl Into<String>, title: impl Into<String>) -> Self {
		Self { kind: Some(kind.into()), title: Some(title.into()), ..Default::default() }
	}
}

/// Author or editor name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
	/// Given name(s).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
}
