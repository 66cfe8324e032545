//! Page tokens: the next 1-based page number rendered as a decimal string.

// self
use crate::error::SyncError;

/// Resolves a page token into a page number; an absent or empty token means the first page.
pub fn page_number(token: Option<&str>) -> Result<u32, SyncError> {
	match token.map(str::trim) {
		None | Some("") => Ok(1),
		Some(raw) => raw
			.parse::<u32>()
			.ok()
			.filter(|page| *page > 0)
			.ok_or_else(|| SyncError::InvalidPageToken { token: raw.to_owned() }),
	}
}

/// Token for the page after `page`, or `None` once `total` items have been covered.
pub fn next_page_token(page: u32, page_size: u32, total: u64) -> Option<String> {
	let covered = u64::from(page) * u64::from(page_size);

	(covered < total).then(|| (page + 1).to_string())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn tokens_parse_to_page_numbers() {
		assert_eq!(page_number(None).expect("Absent token is the first page."), 1);
		assert_eq!(page_number(Some("")).expect("Empty token is the first page."), 1);
		assert_eq!(page_number(Some("3")).expect("Numeric token should parse."), 3);
		assert!(matches!(page_number(Some("0")), Err(SyncError::InvalidPageToken { .. })));
		assert!(matches!(page_number(Some("next")), Err(SyncError::InvalidPageToken { .. })));
	}

	#[test]
	fn next_token_stops_at_total() {
		assert_eq!(next_page_token(1, 100, 250).as_deref(), Some("2"));
		assert_eq!(next_page_token(3, 100, 250), None);
		assert_eq!(next_page_token(1, 100, 100), None);
		assert_eq!(next_page_token(1, 100, 0), None);
	}
}
