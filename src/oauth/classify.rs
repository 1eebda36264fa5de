//! Heuristics mapping token endpoint rejections onto the client's error taxonomy.
//!
//! Structured OAuth fields (`error`, `error_description`) win, then body text hints, and
//! finally the HTTP status. Network failures never reach this classifier.

/// Token grant a failure was raised for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Grant {
	AuthorizationCode,
	Password,
	RefreshToken,
}
impl Grant {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::AuthorizationCode => "authorization_code",
			Self::Password => "password",
			Self::RefreshToken => "refresh_token",
		}
	}
}

/// Canonical categories for token endpoint failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenErrorKind {
	InvalidGrant,
	InvalidClient,
	Transient,
}

/// Primitive facts about a failed token request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TokenErrorContext {
	pub(crate) http_status: Option<u16>,
	pub(crate) oauth_error: Option<String>,
	pub(crate) error_description: Option<String>,
}
impl TokenErrorContext {
	pub(crate) fn classify(&self) -> TokenErrorKind {
		self.oauth_error
			.as_deref()
			.and_then(match_exact_value)
			.or_else(|| self.error_description.as_deref().and_then(match_exact_value))
			.or_else(|| classify_body(self.error_description.as_deref()))
			.unwrap_or_else(|| classify_status(self.http_status))
	}
}

fn match_exact_value(value: &str) -> Option<TokenErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant")
		|| value.eq_ignore_ascii_case("access_denied")
		|| value.eq_ignore_ascii_case("invalid_scope")
	{
		Some(TokenErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(TokenErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(TokenErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<TokenErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") || text.contains("expired") =>
			Some(TokenErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(TokenErrorKind::InvalidClient),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(TokenErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> TokenErrorKind {
	match status {
		Some(400 | 404 | 410) => TokenErrorKind::InvalidGrant,
		Some(401 | 403) => TokenErrorKind::InvalidClient,
		_ => TokenErrorKind::Transient,
	}
}
