//! Thread-safe in-memory [`TokenStore`] for tests, demos, and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::CredentialRecord,
	store::{StoreFuture, TokenStore},
};

/// Keeps the credential record in process memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<CredentialRecord>>>);
impl MemoryStore {
	/// Creates a store pre-populated with `record`.
	pub fn with_record(record: CredentialRecord) -> Self {
		Self(Arc::new(RwLock::new(Some(record))))
	}

	/// Returns a copy of the current record without going through the async contract.
	pub fn snapshot(&self) -> Option<CredentialRecord> {
		self.0.read().clone()
	}
}
impl TokenStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<CredentialRecord>> {
		let current = self.snapshot();

		Box::pin(async move { Ok(current) })
	}

	fn save(&self, record: CredentialRecord) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(record);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}
