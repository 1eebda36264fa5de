// self
use crate::{_prelude::*, auth::Credentials};

/// Receives sign-in outcomes, e.g. to update UI state or audit logs.
///
/// Callbacks run on the task that performed the sign-in and must not block.
pub trait SignInObserver
where
	Self: Send + Sync,
{
	/// Called after credentials were obtained and stored.
	fn on_signed_in(&self, credentials: &Credentials) {
		let _ = credentials;
	}

	/// Called when a sign-in grant failed; stored credentials are untouched.
	fn on_sign_in_failed(&self, error: &Error) {
		let _ = error;
	}
}
