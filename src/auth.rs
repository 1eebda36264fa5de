//! Credential models and redacted secret wrappers.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
