//! Credentials and session tokens.

// self
use crate::_prelude::*;

/// Personal access token secret or session token.
///
/// Shared through an `Arc<str>` so the cached session can be handed to concurrent callers without
/// copying the token. Formatting never reveals the value; call [`Secret::expose`] at the point of
/// use.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct Secret(Arc<str>);
impl Secret {
	/// Wraps `value`.
	pub fn new(value: impl Into<Arc<str>>) -> Self {
		Self(value.into())
	}

	/// Raw value for request headers and sign-in bodies.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the secret is blank.
	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.0.is_empty() { f.write_str("Secret(<empty>)") } else { f.write_str("Secret(***)") }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_hides_the_value() {
		let secret = Secret::new("pat-secret");
		let clone = secret.clone();

		assert_eq!(format!("{secret:?}"), "Secret(***)");
		assert_eq!(format!("{:?}", Secret::new("")), "Secret(<empty>)");
		assert_eq!(clone.expose(), "pat-secret");
		assert!(Arc::ptr_eq(&secret.0, &clone.0));
	}

	#[test]
	fn blank_values_count_as_empty() {
		assert!(Secret::new("  ").is_empty());
		assert!(!Secret::from("x".to_owned()).is_empty());

		let secret: Secret = serde_json::from_str("\"pat\"").expect("Secret should deserialize.");

		assert_eq!(secret.expose(), "pat");
	}
}
