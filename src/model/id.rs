//! Validated identifiers for API resources.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Resource kind (document, folder, file, group, profile).
		kind: &'static str,
	},
	/// The identifier contains a character that cannot appear in a path segment.
	#[error("{kind} identifier contains an invalid character {found:?}.")]
	InvalidCharacter {
		/// Resource kind (document, folder, file, group, profile).
		kind: &'static str,
		/// Offending character.
		found: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Resource kind (document, folder, file, group, profile).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { DocumentId, "Identifier of a document in the user's library.", "Document" }
def_id! { FolderId, "Identifier of a library folder.", "Folder" }
def_id! { FileId, "Identifier of a file attached to a document.", "File" }
def_id! { GroupId, "Identifier of a shared group.", "Group" }
def_id! { ProfileId, "Identifier of a user profile.", "Profile" }

// Identifiers are spliced into URL paths, so separators and query delimiters are refused.
fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) =
		view.chars().find(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
	{
		return Err(IdentifierError::InvalidCharacter { kind, found });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_path_breaking_input() {
		let id = DocumentId::new("9f3c2a1e-6d7b-4c1a-8e5f-0a1b2c3d4e5f")
			.expect("UUID identifier should be valid.");

		assert_eq!(id.as_ref(), "9f3c2a1e-6d7b-4c1a-8e5f-0a1b2c3d4e5f");
		assert_eq!(FolderId::new(""), Err(IdentifierError::Empty { kind: "Folder" }));
		assert_eq!(
			FileId::new("a/../b"),
			Err(IdentifierError::InvalidCharacter { kind: "File", found: '/' })
		);
		assert!(GroupId::new("with space").is_err());
		assert!(ProfileId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: DocumentId =
			serde_json::from_str("\"abc123\"").expect("Identifier should deserialize.");

		assert_eq!(serde_json::to_string(&id).expect("Identifier should serialize."), "\"abc123\"");
		assert!(serde_json::from_str::<DocumentId>("\"a?b\"").is_err());
	}
}
