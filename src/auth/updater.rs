//! Callback hook that receives refreshed OAuth tokens.

// self
use crate::{
	_prelude::*,
	auth::Token,
	error::BoxError,
	store::{SessionKey, TokenStore},
};

type UpdaterFn = dyn Fn(&Token) -> Result<(), BoxError> + Send + Sync;

/// Function invoked with every token the extension sets or the OAuth client refreshes.
///
/// Clones share the same underlying function; [`TokenUpdater::ptr_eq`] tells whether two handles
/// came from the same registration.
#[derive(Clone)]
pub struct TokenUpdater(Arc<UpdaterFn>);
impl TokenUpdater {
	/// Wraps a callback.
	pub fn new<F>(f: F) -> Self
	where
		F: 'static + Fn(&Token) -> Result<(), BoxError> + Send + Sync,
	{
		Self(Arc::new(f))
	}

	/// Builds an updater that saves every token into `store` under `key`.
	pub fn persist(store: Arc<dyn TokenStore>, key: SessionKey) -> Self {
		Self::new(move |token| store.save(&key, token.clone()).map_err(Into::into))
	}

	/// Invokes the callback, wrapping its failure in [`Error::TokenUpdater`].
	pub fn call(&self, token: &Token) -> Result<()> {
		(self.0)(token).map_err(|source| Error::TokenUpdater { source })
	}

	/// Returns `true` when both handles wrap the same callback.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}
impl Debug for TokenUpdater {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenUpdater(..)")
	}
}
