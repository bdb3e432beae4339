//! Token persistence for the values handed to a [`TokenUpdater`](crate::auth::TokenUpdater).
//!
//! The updater runs synchronously inside the OAuth client, so the store contract is synchronous
//! too. [`MemoryStore`] serves tests and demos; [`FileStore`] keeps a JSON snapshot on disk.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::{_prelude::*, auth::Token};

const SESSION_KEY_MAX_LEN: usize = 128;

/// Storage backend contract for per-session OAuth tokens.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the token stored under `key`.
	fn save(&self, key: &SessionKey, token: Token) -> Result<(), StoreError>;

	/// Fetches the token stored under `key`, if present.
	fn fetch(&self, key: &SessionKey) -> Result<Option<Token>, StoreError>;

	/// Removes and returns the token stored under `key`.
	fn remove(&self, key: &SessionKey) -> Result<Option<Token>, StoreError>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Snapshot could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Error returned when a [`SessionKey`] fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SessionKeyError {
	/// The key was empty.
	#[error("Session key cannot be empty.")]
	Empty,
	/// The key contains whitespace characters.
	#[error("Session key contains whitespace.")]
	ContainsWhitespace,
	/// The key exceeded the allowed byte count.
	#[error("Session key exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted length.
		max: usize,
	},
}

/// Identifier of the user session a token belongs to.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey(String);
impl SessionKey {
	/// Creates a new key after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, SessionKeyError> {
		let view = value.as_ref();

		validate_key(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for SessionKey {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for SessionKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for SessionKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<SessionKey> for String {
	fn from(value: SessionKey) -> Self {
		value.0
	}
}
impl TryFrom<String> for SessionKey {
	type Error = SessionKeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_key(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for SessionKey {
	type Err = SessionKeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "SessionKey({})", self.0)
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_key(view: &str) -> Result<(), SessionKeyError> {
	if view.is_empty() {
		return Err(SessionKeyError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(SessionKeyError::ContainsWhitespace);
	}
	if view.len() > SESSION_KEY_MAX_LEN {
		return Err(SessionKeyError::TooLong { max: SESSION_KEY_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Store(_)));
		assert!(error.to_string().contains("disk unavailable"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn session_keys_validate() {
		assert_eq!(SessionKey::new(""), Err(SessionKeyError::Empty));
		assert_eq!(SessionKey::new(" user-1"), Err(SessionKeyError::ContainsWhitespace));
		assert_eq!(
			SessionKey::new(format!("user{}1", '\u{00A0}')),
			Err(SessionKeyError::ContainsWhitespace)
		);

		SessionKey::new("a".repeat(SESSION_KEY_MAX_LEN)).expect("Exact length should succeed.");

		assert_eq!(
			SessionKey::new("a".repeat(SESSION_KEY_MAX_LEN + 1)),
			Err(SessionKeyError::TooLong { max: SESSION_KEY_MAX_LEN })
		);
	}

	#[test]
	fn session_keys_deserialize_with_validation() {
		let key: SessionKey =
			serde_json::from_str("\"user-42\"").expect("Valid key should deserialize.");

		assert_eq!(key.as_ref(), "user-42");
		assert!(serde_json::from_str::<SessionKey>("\"with space\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<SessionKey, u8> = HashMap::from_iter([(
			SessionKey::new("user-42").expect("Key used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("user-42"), Some(&7));
	}
}
