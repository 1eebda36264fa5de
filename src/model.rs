//! Resource payloads exchanged with the API.
//!
//! Collection fields are `Option<Vec<_>>` or `Option<BTreeMap<_, _>>` so an absent field and
//! an empty collection survive a decode/encode cycle unchanged. Unset fields are omitted
//! when serializing, which keeps `PATCH` bodies limited to the fields the caller set.

/// Document payloads.
pub mod document;
/// File payloads.
pub mod file;
/// Folder payloads.
pub mod folder;
pub mod id;
/// Profile payloads.
pub mod profile;

pub use document::*;
pub use file::*;
pub use folder::*;
pub use id::*;
pub use profile::*;
