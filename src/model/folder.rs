// self
use crate::{
	_prelude::*,
	model::{DocumentId, FolderId, GroupId},
};

/// Library folder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
	/// Server-assigned identifier; unset on create.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<FolderId>,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Parent folder, for nested folders.
	#[serde(default, rename = "parent_id", skip_serializing_if = "Option::is_none")]
	pub parent: Option<FolderId>,
	/// Group owning the folder, for group libraries.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group_id: Option<GroupId>,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub created: Option<OffsetDateTime>,
	/// Last modification instant.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub modified: Option<OffsetDateTime>,
}
impl Folder {
	/// Folder for a create call.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: Some(name.into()), ..Default::default() }
	}

	/// Nests the new folder under `parent`.
	pub fn with_parent(mut self, parent: FolderId) -> Self {
		self.parent = Some(parent);

		self
	}
}

/// Folder membership entry (`{"id": "<document id>"}`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMember {
	/// Member document.
	pub id: DocumentId,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn folders_round_trip_with_parent_and_timestamps() {
		let raw = r#"{"id":"f2","name":"Reading","parent_id":"f1","created":"2024-03-04T05:06:07Z"}"#;
		let folder: Folder = serde_json::from_str(raw).expect("Folder should decode.");

		assert_eq!(folder.parent, Some(FolderId::new("f1").expect("Fixture id is valid.")));
		assert_eq!(folder.group_id, None);

		let encoded = serde_json::to_value(&folder).expect("Folder should encode.");

		assert_eq!(encoded["parent_id"], "f1");
		assert!(encoded.get("group_id").is_none());
		assert_eq!(
			serde_json::from_value::<Folder>(encoded).expect("Encoded folder should decode."),
			folder
		);
	}
}
