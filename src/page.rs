//! Cursor pagination driven by RFC 5988 `Link` headers.
//!
//! Listing endpoints return one page of items plus an optional `Link: <url>; rel="next"`
//! header. [`PageCursor`] keeps that link (or nothing); a cursor without a link is
//! exhausted and asking it for another page fails locally with
//! [`Error::NoMorePages`](crate::Error::NoMorePages).

// crates.io
use oauth2::http::{HeaderMap, header::LINK};
// self
use crate::_prelude::*;

/// Pagination state observable from a cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
	/// A further page can be requested.
	HasNext,
	/// The listing is complete.
	Exhausted,
}

/// Opaque pointer to the next page of a listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageCursor {
	link: Option<Url>,
}
impl PageCursor {
	/// A cursor with no further pages.
	pub const fn exhausted() -> Self {
		Self { link: None }
	}

	/// A cursor pointing at `link`.
	pub fn next(link: Url) -> Self {
		Self { link: Some(link) }
	}

	/// Builds a cursor from the `rel="next"` entry of the response's `Link` headers.
	///
	/// Relative targets resolve against `base`; unparseable or missing targets yield an
	/// exhausted cursor.
	pub fn from_headers(headers: &HeaderMap, base: &Url) -> Self {
		let link = headers
			.get_all(LINK)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.find_map(next_target)
			.filter(|target| !target.is_empty())
			.and_then(|target| base.join(target).ok());

		Self { link }
	}

	/// Current pagination state.
	pub fn state(&self) -> PageState {
		if self.link.is_some() { PageState::HasNext } else { PageState::Exhausted }
	}

	/// Returns `true` when a further page exists.
	pub fn has_next(&self) -> bool {
		self.link.is_some()
	}

	/// Returns `true` when the listing is complete.
	pub fn is_exhausted(&self) -> bool {
		self.link.is_none()
	}

	/// URL of the next page, if any.
	pub fn link(&self) -> Option<&Url> {
		self.link.as_ref()
	}
}

/// One page of a listing.
#[derive(Clone, Debug)]
pub struct Page<T> {
	/// Items in server order.
	pub items: Vec<T>,
	/// Cursor for the following page.
	pub cursor: PageCursor,
	/// Server `Date` header, when present.
	pub server_date: Option<OffsetDateTime>,
	/// Media type requested for the listing; follow-up pages reuse it.
	pub media_type: Option<String>,
}
impl<T> Page<T> {
	/// Returns `true` when a further page exists.
	pub fn has_next(&self) -> bool {
		self.cursor.has_next()
	}

	/// Number of items on this page.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns `true` when the page holds no items.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Consumes the page, returning its items.
	pub fn into_items(self) -> Vec<T> {
		self.items
	}
}
impl<T> IntoIterator for Page<T> {
	type IntoIter = std::vec::IntoIter<T>;
	type Item = T;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}

fn next_target(header: &str) -> Option<&str> {
	split_entries(header).into_iter().find_map(|entry| {
		let entry = entry.trim();
		let rest = entry.strip_prefix('<')?;
		let close = rest.find('>')?;
		let (target, params) = (&rest[..close], &rest[close + 1..]);
		let is_next = params.split(';').any(|param| {
			let Some((key, value)) = param.split_once('=') else {
				return false;
			};

			key.trim().eq_ignore_ascii_case("rel")
				&& value
					.trim()
					.trim_matches('"')
					.split_ascii_whitespace()
					.any(|rel| rel.eq_ignore_ascii_case("next"))
		});

		is_next.then_some(target.trim())
	})
}

// Splits on commas outside `<...>` targets and quoted parameter values.
fn split_entries(header: &str) -> Vec<&str> {
	let mut entries = Vec::new();
	let mut in_target = false;
	let mut in_quotes = false;
	let mut start = 0;

	for (idx, ch) in header.char_indices() {
		match ch {
			'<' if !in_quotes => in_target = true,
			'>' if !in_quotes => in_target = false,
			'"' if !in_target => in_quotes = !in_quotes,
			',' if !in_target && !in_quotes => {
				entries.push(&header[start..idx]);
				start = idx + 1;
			},
			_ => {},
		}
	}

	entries.push(&header[start..]);

	entries
}
