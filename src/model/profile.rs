// self
use crate::{_prelude::*, model::ProfileId};

/// User profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	/// Profile identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<ProfileId>,
	/// Given name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Name shown to other users.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Account e-mail, only present on the signed-in user's own profile.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Public profile page.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link: Option<Url>,
	/// Academic status (`Student > Ph. D. Student`, `Professor`, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub academic_status: Option<String>,
	/// Research disciplines.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub disciplines: Option<Vec<Discipline>>,
	/// Account creation instant.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub created: Option<OffsetDateTime>,
}

/// Research discipline with optional subdisciplines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
	/// Discipline name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Subdisciplines.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subdisciplines: Option<Vec<String>>,
}
