//! Thread-safe in-memory [`TokenStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Token,
	store::{SessionKey, StoreError, TokenStore},
};

/// Keeps tokens in-process; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<SessionKey, Token>>>);
impl MemoryStore {
	/// Number of stored sessions.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no token is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenStore for MemoryStore {
	fn save(&self, key: &SessionKey, token: Token) -> Result<(), StoreError> {
		self.0.write().insert(key.clone(), token);

		Ok(())
	}

	fn fetch(&self, key: &SessionKey) -> Result<Option<Token>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn remove(&self, key: &SessionKey) -> Result<Option<Token>, StoreError> {
		Ok(self.0.write().remove(key))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet;

	#[test]
	fn save_fetch_remove() {
		let store = MemoryStore::default();
		let key = SessionKey::new("user-1").expect("Session key fixture should be valid.");
		let token = _preludet::mock_token();

		assert_eq!(store.fetch(&key), Ok(None));

		store.save(&key, token.clone()).expect("Saving into memory should succeed.");

		assert_eq!(store.fetch(&key), Ok(Some(token.clone())));
		assert_eq!(store.len(), 1);
		assert_eq!(store.remove(&key), Ok(Some(token)));
		assert!(store.is_empty());
	}

	#[test]
	fn clones_share_state() {
		let store = MemoryStore::default();
		let clone = store.clone();
		let key = SessionKey::new("user-2").expect("Session key fixture should be valid.");

		clone.save(&key, _preludet::mock_token()).expect("Saving into memory should succeed.");

		assert!(store.fetch(&key).expect("Fetch should succeed.").is_some());
	}
}
