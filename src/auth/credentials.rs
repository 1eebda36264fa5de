//! Signed-in credentials, their flat persisted form, and the application's client credentials.
//!
//! [`Credentials`] is the validated in-memory value produced by a successful grant.
//! [`CredentialRecord`] is the layout token stores persist: every field is optional so a
//! missing `access_token` means "not signed in", and `expires_at` is an RFC 3339 string.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{_prelude::*, auth::Secret};

/// Errors produced by [`CredentialsBuilder`] and record conversions.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialsBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Stored expiry is not an RFC 3339 timestamp.
	#[error("Stored expiry `{raw}` is not an RFC 3339 timestamp.")]
	MalformedExpiry {
		/// Raw stored value.
		raw: String,
	},
	/// Expiry instant cannot be rendered as RFC 3339.
	#[error("Expiry instant cannot be formatted as RFC 3339.")]
	UnrepresentableExpiry,
}

/// Application identity registered with the API, immutable after construction.
#[derive(Clone, Deserialize)]
pub struct ClientCredentials {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret; never serialized.
	pub client_secret: Secret,
	/// Redirect URI registered for the application.
	pub redirect_uri: Url,
}
impl ClientCredentials {
	/// Creates client credentials from their parts.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Secret::new(client_secret),
			redirect_uri,
		}
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}

/// Tokens obtained from a successful grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	/// Bearer token presented on every API call.
	pub access_token: Secret,
	/// Refresh token, when the server issued one.
	pub refresh_token: Option<Secret>,
	/// Token type reported by the server (normally `bearer`).
	pub token_type: String,
	/// Instant after which the access token is no longer accepted.
	pub expires_at: OffsetDateTime,
}
impl Credentials {
	/// Returns a builder for credentials.
	pub fn builder() -> CredentialsBuilder {
		CredentialsBuilder::default()
	}

	/// Time left before expiry at `now` (negative once expired).
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at - now
	}

	/// Returns `true` if the access token has expired at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}

	/// Flattens the credentials into the persisted layout.
	pub fn to_record(&self) -> Result<CredentialRecord, CredentialsBuilderError> {
		let expires_at = self
			.expires_at
			.format(&Rfc3339)
			.map_err(|_| CredentialsBuilderError::UnrepresentableExpiry)?;

		Ok(CredentialRecord {
			access_token: Some(self.access_token.expose().to_owned()),
			refresh_token: self.refresh_token.as_ref().map(|secret| secret.expose().to_owned()),
			expires_at: Some(expires_at),
			token_type: Some(self.token_type.clone()),
		})
	}
}
impl TryFrom<&CredentialRecord> for Credentials {
	type Error = CredentialsBuilderError;

	fn try_from(record: &CredentialRecord) -> Result<Self, Self::Error> {
		let access_token = record
			.access_token
			.as_deref()
			.filter(|token| !token.is_empty())
			.ok_or(CredentialsBuilderError::MissingAccessToken)?;
		let raw = record.expires_at.as_deref().ok_or(CredentialsBuilderError::MissingExpiry)?;
		let expires_at = OffsetDateTime::parse(raw, &Rfc3339)
			.map_err(|_| CredentialsBuilderError::MalformedExpiry { raw: raw.to_owned() })?;
		let mut builder = Credentials::builder().access_token(access_token).expires_at(expires_at);

		if let Some(refresh) = record.refresh_token.as_deref().filter(|token| !token.is_empty()) {
			builder = builder.refresh_token(refresh);
		}
		if let Some(token_type) = record.token_type.as_deref() {
			builder = builder.token_type(token_type);
		}

		builder.build()
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Credentials`].
#[derive(Clone, Debug, Default)]
pub struct CredentialsBuilder {
	access_token: Option<Secret>,
	refresh_token: Option<Secret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialsBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(Secret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(Secret::new(token));

		self
	}

	/// Overrides the token type (defaults to `bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the instant `expires_in` is measured from (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces [`Credentials`].
	pub fn build(self) -> Result<Credentials, CredentialsBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(CredentialsBuilderError::MissingAccessToken)?;
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => self.issued_at.unwrap_or_else(OffsetDateTime::now_utc) + delta,
			(None, None) => return Err(CredentialsBuilderError::MissingExpiry),
		};

		Ok(Credentials {
			access_token,
			refresh_token: self.refresh_token,
			token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
			expires_at,
		})
	}
}

/// Flat credential layout persisted by token stores.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
	/// Bearer token; absence means "not signed in".
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<String>,
	/// Refresh token, if one was issued.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	/// Expiry instant as an RFC 3339 string.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<String>,
	/// Token type reported by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
}
impl CredentialRecord {
	/// Returns `true` when the record holds a non-empty access token.
	pub fn is_signed_in(&self) -> bool {
		self.access_token.as_deref().is_some_and(|token| !token.is_empty())
	}

	/// Parses the stored expiry, returning `None` when it is missing or malformed.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::parse(self.expires_at.as_deref()?, &Rfc3339).ok()
	}

	/// Decides whether the access token must be refreshed before use.
	///
	/// Returns `true` when there is no access token, when the expiry is missing or
	/// unparseable, or when less than `margin` remains before expiry at `now`.
	pub fn will_expire_soon_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		if !self.is_signed_in() {
			return true;
		}

		match self.expires_at() {
			Some(expires_at) => expires_at - now < margin,
			None => true,
		}
	}
}
impl Debug for CredentialRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialRecord")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("token_type", &self.token_type)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const MARGIN: Duration = Duration::minutes(5);

	fn record_expiring_at(expires_at: &str) -> CredentialRecord {
		CredentialRecord {
			access_token: Some("access".into()),
			refresh_token: Some("refresh".into()),
			expires_at: Some(expires_at.into()),
			token_type: Some("bearer".into()),
		}
	}

	#[test]
	fn will_expire_soon_covers_missing_and_margin_cases() {
		let now = macros::datetime!(2025-01-01 12:00 UTC);

		assert!(CredentialRecord::default().will_expire_soon_at(now, MARGIN));
		assert!(
			CredentialRecord { access_token: Some(String::new()), ..record_expiring_at("x") }
				.will_expire_soon_at(now, MARGIN)
		);
		assert!(record_expiring_at("not-a-date").will_expire_soon_at(now, MARGIN));
		assert!(
			CredentialRecord { expires_at: None, ..record_expiring_at("x") }
				.will_expire_soon_at(now, MARGIN)
		);
		assert!(record_expiring_at("2025-01-01T12:04:59Z").will_expire_soon_at(now, MARGIN));
		assert!(!record_expiring_at("2025-01-01T12:05:00Z").will_expire_soon_at(now, MARGIN));
		assert!(!record_expiring_at("2025-01-01T13:00:00Z").will_expire_soon_at(now, MARGIN));
	}

	#[test]
	fn builder_handles_relative_expiry_and_defaults() {
		let credentials = Credentials::builder()
			.access_token("secret")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Credentials builder should support relative expiry.");

		assert_eq!(credentials.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(credentials.token_type, "bearer");
		assert!(credentials.refresh_token.is_none());
		assert_eq!(
			Credentials::builder().expires_in(Duration::hours(1)).build(),
			Err(CredentialsBuilderError::MissingAccessToken)
		);
		assert_eq!(
			Credentials::builder().access_token("a").build(),
			Err(CredentialsBuilderError::MissingExpiry)
		);
	}

	#[test]
	fn record_conversion_preserves_fields() {
		let credentials = Credentials::builder()
			.access_token("access")
			.refresh_token("refresh")
			.expires_at(macros::datetime!(2025-03-04 05:06:07 UTC))
			.build()
			.expect("Credentials fixture should build.");
		let record = credentials.to_record().expect("Fixture expiry should format.");

		assert_eq!(record.expires_at.as_deref(), Some("2025-03-04T05:06:07Z"));

		let restored =
			Credentials::try_from(&record).expect("Record should convert back into credentials.");

		assert_eq!(restored, credentials);
		assert!(matches!(
			Credentials::try_from(&record_expiring_at("tomorrow")),
			Err(CredentialsBuilderError::MalformedExpiry { .. })
		));
	}

	#[test]
	fn record_omits_absent_fields_and_redacts() {
		let record = CredentialRecord { access_token: Some("access".into()), ..Default::default() };
		let json = serde_json::to_string(&record).expect("Record should serialize.");

		assert_eq!(json, "{\"access_token\":\"access\"}");
		assert!(!format!("{record:?}").contains("access\""));

		let empty: CredentialRecord =
			serde_json::from_str("{}").expect("Empty record should deserialize.");

		assert!(!empty.is_signed_in());
	}
}
