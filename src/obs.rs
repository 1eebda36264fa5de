//! Optional observability helpers for sign-in, refresh, and API call flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `mendeley_client.flow` with the `flow` and `stage`
//!   fields, plus warnings for GET retries and swallowed refresh failures.
//! - Enable `metrics` to increment the `mendeley_client_flow_total` counter for every
//!   attempt/success/failure/cancellation, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization code exchange.
	AuthorizationCode,
	/// Resource owner password exchange.
	Password,
	/// Refresh token exchange.
	Refresh,
	/// Authenticated resource API call.
	Api,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Password => "password",
			FlowKind::Refresh => "refresh",
			FlowKind::Api => "api",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// The caller cancelled the flow.
	Cancelled,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
			FlowOutcome::Cancelled => "cancelled",
		}
	}

	/// Classifies a finished flow.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => FlowOutcome::Success,
			Err(Error::Cancelled) => FlowOutcome::Cancelled,
			Err(_) => FlowOutcome::Failure,
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcome_of_distinguishes_cancellation() {
		assert_eq!(FlowOutcome::of(&Ok::<_, Error>(())), FlowOutcome::Success);
		assert_eq!(FlowOutcome::of::<()>(&Err(Error::Cancelled)), FlowOutcome::Cancelled);
		assert_eq!(FlowOutcome::of::<()>(&Err(Error::NotSignedIn)), FlowOutcome::Failure);
		assert_eq!(FlowKind::Api.to_string(), "api");
	}
}
