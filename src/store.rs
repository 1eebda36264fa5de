//! Storage contract and built-in stores for the signed-in user's credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialRecord};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the single credential record of one client.
///
/// The store is the only mutable state shared between concurrent calls. Implementations
/// must make `save` replace the whole record so readers never observe a half-written
/// token set.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the stored record, or `None` if nothing has been saved.
	fn load(&self) -> StoreFuture<'_, Option<CredentialRecord>>;

	/// Persists or replaces the record.
	fn save(&self, record: CredentialRecord) -> StoreFuture<'_, ()>;

	/// Removes the record. Clearing an empty store succeeds.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as _;
	// self
	use super::*;
	use crate::error::ErrorKind;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "keychain locked".into() };
		let client_error: Error = store_error.clone().into();

		assert_eq!(client_error.kind(), ErrorKind::Storage);
		assert!(client_error.to_string().contains("keychain locked"));

		let source =
			client_error.source().expect("Client error should expose the store error as source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
