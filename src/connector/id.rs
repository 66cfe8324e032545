//! Validated identifiers for resource types and platform objects.
//!
//! Resource type ids are short lowercase slugs (`license`, `user`) because they double as routing
//! keys. Object ids come from the platform verbatim, so only emptiness, whitespace, and length are
//! checked.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const RESOURCE_TYPE_MAX_LEN: usize = 64;
const OBJECT_MAX_LEN: usize = 256;

macro_rules! identifier {
	($(#[$meta:meta])* $name:ident($kind:literal), $validate:path) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				$validate($kind, &value)?;

				Ok(Self(value))
			}

			/// String form of the identifier.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl PartialEq<str> for $name {
			fn eq(&self, other: &str) -> bool {
				self.0 == other
			}
		}
		impl PartialEq<&str> for $name {
			fn eq(&self, other: &&str) -> bool {
				self.0 == *other
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple($kind).field(&self.0).finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

/// Identifier validation failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains whitespace or control characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// A resource type slug carries a character outside `[a-z0-9_-]`.
	#[error("{kind} identifier contains invalid character `{character}`.")]
	InvalidCharacter {
		/// Kind of identifier.
		kind: &'static str,
		/// First offending character.
		character: char,
	},
	/// The identifier exceeded the allowed byte count.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted byte count.
		max: usize,
	},
}

identifier! {
	/// Resource type slug such as `license`.
	ResourceTypeId("ResourceType"), validate_resource_type
}
identifier! {
	/// Identifier of a single object within a resource type, as issued by the platform.
	ObjectId("Object"), validate_object
}

fn validate_resource_type(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	check_length(kind, value, RESOURCE_TYPE_MAX_LEN)?;

	match value.chars().find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-')) {
		Some(character) => Err(IdentifierError::InvalidCharacter { kind, character }),
		None => Ok(()),
	}
}

fn validate_object(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	check_length(kind, value, OBJECT_MAX_LEN)?;

	if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}

	Ok(())
}

fn check_length(kind: &'static str, value: &str, max: usize) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if value.len() > max {
		return Err(IdentifierError::TooLong { kind, max });
	}

	Ok(())
}
