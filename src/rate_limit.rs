//! Rate-limit header extraction.
//!
//! Platforms advertise their budgets under a handful of header spellings. The first present
//! header of each family wins:
//!
//! - `limit`: `X-RateLimit-Limit`, `RateLimit-Limit`, `X-Rate-Limit-Limit`,
//!   `X-RateLimit-Requests-Limit`.
//! - `remaining`: `X-RateLimit-Remaining`, `RateLimit-Remaining`, `X-Rate-Limit-Remaining`,
//!   `X-RateLimit-Requests-Remaining`.
//! - `reset_at`: `X-RateLimit-Reset`, `RateLimit-Reset`, `X-Rate-Limit-Reset`,
//!   `X-RateLimit-Requests-Reset`, `Retry-After`.
//!
//! Reset values below `1_000_000_000` are seconds from now; larger values are Unix timestamps.
//! `Retry-After` may also carry an HTTP date.

// crates.io
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

const LIMIT_HEADERS: [&str; 4] =
	["x-ratelimit-limit", "ratelimit-limit", "x-rate-limit-limit", "x-ratelimit-requests-limit"];
const REMAINING_HEADERS: [&str; 4] = [
	"x-ratelimit-remaining",
	"ratelimit-remaining",
	"x-rate-limit-remaining",
	"x-ratelimit-requests-remaining",
];
const RESET_HEADERS: [&str; 5] = [
	"x-ratelimit-reset",
	"ratelimit-reset",
	"x-rate-limit-reset",
	"x-ratelimit-requests-reset",
	"retry-after",
];
const UNIX_TIMESTAMP_FLOOR: u64 = 1_000_000_000;

/// Errors raised while parsing rate-limit headers.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RateLimitError {
	/// The response carries no rate-limit headers at all.
	#[error("Response carries no rate-limit headers.")]
	Missing,
	/// Some rate-limit headers are present but one field is absent.
	#[error("Rate-limit {field} header is missing.")]
	MissingHeader {
		/// Field without a header (`limit`, `remaining`, or `reset`).
		field: &'static str,
	},
	/// A header value could not be parsed.
	#[error("Rate-limit header `{header}` has an invalid value: {value}.")]
	InvalidValue {
		/// Header name.
		header: &'static str,
		/// Raw header value.
		value: String,
	},
}

/// Structured quota data derived from response headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDescription {
	/// Requests allowed in the current window.
	pub limit: u64,
	/// Requests left in the current window.
	pub remaining: u64,
	/// Instant the window resets.
	pub reset_at: OffsetDateTime,
}

/// Parses rate-limit headers relative to the current time.
///
/// Returns `Ok(None)` when no rate-limit header is present.
pub fn extract_rate_limit_data(
	headers: &HeaderMap,
) -> Result<Option<RateLimitDescription>, RateLimitError> {
	extract_rate_limit_data_at(headers, OffsetDateTime::now_utc())
}

/// Parses rate-limit headers, resolving relative reset values against `now`.
pub fn extract_rate_limit_data_at(
	headers: &HeaderMap,
	now: OffsetDateTime,
) -> Result<Option<RateLimitDescription>, RateLimitError> {
	let limit = first_header(headers, &LIMIT_HEADERS);
	let remaining = first_header(headers, &REMAINING_HEADERS);
	let reset = first_header(headers, &RESET_HEADERS);

	if limit.is_none() && remaining.is_none() && reset.is_none() {
		return Ok(None);
	}

	let (limit_header, limit) = limit.ok_or(RateLimitError::MissingHeader { field: "limit" })?;
	let (remaining_header, remaining) =
		remaining.ok_or(RateLimitError::MissingHeader { field: "remaining" })?;
	let (reset_header, reset) = reset.ok_or(RateLimitError::MissingHeader { field: "reset" })?;

	Ok(Some(RateLimitDescription {
		limit: parse_count(limit_header, limit)?,
		remaining: parse_count(remaining_header, remaining)?,
		reset_at: parse_reset(reset_header, reset, now)?,
	}))
}

fn first_header<'a>(
	headers: &'a HeaderMap,
	names: &[&'static str],
) -> Option<(&'static str, &'a HeaderValue)> {
	names.iter().find_map(|name| headers.get(*name).map(|value| (*name, value)))
}

fn header_text<'a>(
	header: &'static str,
	value: &'a HeaderValue,
) -> Result<&'a str, RateLimitError> {
	value.to_str().map(str::trim).map_err(|_| RateLimitError::InvalidValue {
		header,
		value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
	})
}

fn invalid(header: &'static str, raw: &str) -> RateLimitError {
	RateLimitError::InvalidValue { header, value: raw.to_owned() }
}

fn parse_count(header: &'static str, value: &HeaderValue) -> Result<u64, RateLimitError> {
	let raw = header_text(header, value)?;

	raw.parse().map_err(|_| invalid(header, raw))
}

fn parse_reset(
	header: &'static str,
	value: &HeaderValue,
	now: OffsetDateTime,
) -> Result<OffsetDateTime, RateLimitError> {
	let raw = header_text(header, value)?;

	if let Ok(secs) = raw.parse::<u64>() {
		let secs = i64::try_from(secs).map_err(|_| invalid(header, raw))?;

		return if secs >= UNIX_TIMESTAMP_FLOOR as i64 {
			OffsetDateTime::from_unix_timestamp(secs).map_err(|_| invalid(header, raw))
		} else {
			now.checked_add(Duration::seconds(secs)).ok_or_else(|| invalid(header, raw))
		};
	}
	if header != "retry-after" {
		return Err(invalid(header, raw));
	}

	OffsetDateTime::parse(raw, &Rfc2822).map_err(|_| invalid(header, raw))
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	const NOW: OffsetDateTime = datetime!(2025-01-01 00:00:00 UTC);

	fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
		let mut map = HeaderMap::new();

		for (name, value) in pairs {
			let name = HeaderName::from_bytes(name.as_bytes())
				.expect("Test header name should be valid.");

			map.insert(name, HeaderValue::from_static(value));
		}

		map
	}

	#[test]
	fn parses_relative_reset() {
		let map = headers(&[
			("X-RateLimit-Limit", "100"),
			("X-RateLimit-Remaining", "7"),
			("X-RateLimit-Reset", "30"),
		]);
		let description = extract_rate_limit_data_at(&map, NOW)
			.expect("Well-formed headers should parse.")
			.expect("Headers are present.");

		assert_eq!(description.limit, 100);
		assert_eq!(description.remaining, 7);
		assert_eq!(description.reset_at, NOW + Duration::seconds(30));
	}

	#[test]
	fn parses_unix_timestamp_reset_and_alternate_spellings() {
		let map = headers(&[
			("RateLimit-Limit", "10"),
			("X-Rate-Limit-Remaining", "0"),
			("RateLimit-Reset", "1735689600"),
		]);
		let description = extract_rate_limit_data_at(&map, NOW)
			.expect("Well-formed headers should parse.")
			.expect("Headers are present.");

		assert_eq!(description.limit, 10);
		assert_eq!(description.remaining, 0);
		assert_eq!(description.reset_at, datetime!(2025-01-01 00:00:00 UTC));
	}

	#[test]
	fn retry_after_accepts_http_dates() {
		let map = headers(&[
			("X-RateLimit-Limit", "5"),
			("X-RateLimit-Remaining", "0"),
			("Retry-After", "Wed, 01 Jan 2025 00:05:00 +0000"),
		]);
		let description = extract_rate_limit_data_at(&map, NOW)
			.expect("HTTP dates should parse.")
			.expect("Headers are present.");

		assert_eq!(description.reset_at, datetime!(2025-01-01 00:05:00 UTC));
	}

	#[test]
	fn first_spelling_wins() {
		let map = headers(&[
			("X-RateLimit-Limit", "100"),
			("RateLimit-Limit", "200"),
			("X-RateLimit-Remaining", "1"),
			("X-RateLimit-Reset", "1"),
		]);
		let description = extract_rate_limit_data_at(&map, NOW)
			.expect("Well-formed headers should parse.")
			.expect("Headers are present.");

		assert_eq!(description.limit, 100);
	}

	#[test]
	fn absent_headers_yield_none() {
		assert_eq!(extract_rate_limit_data_at(&HeaderMap::new(), NOW), Ok(None));
	}

	#[test]
	fn partial_headers_are_rejected() {
		let map = headers(&[("X-RateLimit-Limit", "100"), ("X-RateLimit-Reset", "1")]);

		assert_eq!(
			extract_rate_limit_data_at(&map, NOW),
			Err(RateLimitError::MissingHeader { field: "remaining" })
		);
	}

	#[test]
	fn malformed_values_are_rejected() {
		let map = headers(&[
			("X-RateLimit-Limit", "lots"),
			("X-RateLimit-Remaining", "1"),
			("X-RateLimit-Reset", "1"),
		]);

		assert_eq!(
			extract_rate_limit_data_at(&map, NOW),
			Err(RateLimitError::InvalidValue { header: "x-ratelimit-limit", value: "lots".into() })
		);

		let map = headers(&[
			("X-RateLimit-Limit", "1"),
			("X-RateLimit-Remaining", "1"),
			("X-RateLimit-Reset", "soon"),
		]);

		assert!(matches!(
			extract_rate_limit_data_at(&map, NOW),
			Err(RateLimitError::InvalidValue { header: "x-ratelimit-reset", .. })
		));
	}
}
