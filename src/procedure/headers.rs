// crates.io
use time::{
	PrimitiveDateTime, format_description::well_known::Rfc2822, macros::format_description,
};
// self
use crate::{
	_prelude::*,
	http::{HeaderMap, header},
	page::PageCursor,
};

/// Response headers the procedure surfaces alongside the payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
	/// Server `Date`.
	pub server_date: Option<OffsetDateTime>,
	/// Cursor built from `Link: <...>; rel="next"`.
	pub cursor: PageCursor,
	/// `Location` of a created resource, resolved against the request URL.
	pub location: Option<Url>,
}
impl ResponseHeaders {
	/// Extracts the headers of interest from `headers`.
	pub fn parse(headers: &HeaderMap, request_url: &Url) -> Self {
		Self {
			server_date: header_str(headers, header::DATE).and_then(parse_http_date),
			cursor: PageCursor::from_headers(headers, request_url),
			location: header_str(headers, header::LOCATION)
				.and_then(|raw| request_url.join(raw.trim()).ok()),
		}
	}
}

/// Parses an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`) falling back to RFC 2822.
pub fn parse_http_date(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();
	let imf = format_description!(
		"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
	);

	PrimitiveDateTime::parse(raw, imf)
		.map(PrimitiveDateTime::assume_utc)
		.or_else(|_| OffsetDateTime::parse(raw, &Rfc2822))
		.ok()
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
	headers.get(name)?.to_str().ok()
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::http::HeaderValue;

	#[test]
	fn parses_date_location_and_link() {
		let mut headers = HeaderMap::new();

		headers.insert(header::DATE, HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"));
		headers.insert(header::LOCATION, HeaderValue::from_static("/documents/new-id"));
		headers.insert(
			header::LINK,
			HeaderValue::from_static("<https://api.mendeley.com/documents?marker=x>; rel=\"next\""),
		);

		let parsed = ResponseHeaders::parse(
			&headers,
			&Url::parse("https://api.mendeley.com/documents").expect("Fixture URL should parse."),
		);

		assert_eq!(parsed.server_date, Some(macros::datetime!(1994-11-06 08:49:37 UTC)));
		assert_eq!(
			parsed.location.as_ref().map(Url::as_str),
			Some("https://api.mendeley.com/documents/new-id")
		);
		assert!(parsed.cursor.has_next());
	}

	#[test]
	fn malformed_date_is_dropped() {
		assert_eq!(parse_http_date("yesterday"), None);
		assert!(parse_http_date("Sun, 06 Nov 1994 08:49:37 +0000").is_some());
	}
}
