//! Authentication mode selection.

// self
use crate::{_prelude::*, config::SnowConfig, error::ConfigError};

/// How clients authenticate against the instance.
///
/// The mode is resolved once when the extension is initialized and never changes afterwards;
/// switching credentials requires a new [`Snow`](crate::snow::Snow).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
	/// HTTP basic credentials, or a caller-supplied session that authenticates itself.
	Basic,
	/// OAuth 2.0 bearer tokens obtained with the configured client id/secret.
	OAuth,
}
impl AuthMode {
	/// Picks the mode for `config`.
	///
	/// OAuth wins when both the client id and secret are set. Otherwise basic is selected when a
	/// session is supplied or both user and password are set. Anything else is a
	/// [`ConfigError::MissingCredentials`].
	pub fn resolve(config: &SnowConfig, has_session: bool) -> Result<Self, ConfigError> {
		if config.has_oauth_credentials() {
			Ok(Self::OAuth)
		} else if has_session || config.has_basic_credentials() {
			Ok(Self::Basic)
		} else {
			Err(ConfigError::MissingCredentials)
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Basic => "basic",
			Self::OAuth => "oauth",
		}
	}

	/// Returns `true` for [`AuthMode::OAuth`].
	pub const fn is_oauth(self) -> bool {
		matches!(self, Self::OAuth)
	}
}
impl Display for AuthMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(
		user: Option<&str>,
		password: Option<&str>,
		client_id: Option<&str>,
		client_secret: Option<&str>,
	) -> SnowConfig {
		let mut config = SnowConfig::default().with_instance("mock_instance");

		config.user = user.map(Into::into);
		config.password = password.map(Into::into);
		config.oauth_client_id = client_id.map(Into::into);
		config.oauth_client_secret = client_secret.map(Into::into);

		config
	}

	#[test]
	fn oauth_credentials_take_precedence() {
		let both = config(Some("u"), Some("p"), Some("id"), Some("secret"));

		assert_eq!(AuthMode::resolve(&both, false).expect("OAuth should resolve."), AuthMode::OAuth);
		assert_eq!(AuthMode::resolve(&both, true).expect("OAuth should resolve."), AuthMode::OAuth);
	}

	#[test]
	fn decision_table_covers_every_combination() {
		let values = [None, Some("x")];

		for user in values {
			for password in values {
				for client_id in values {
					for client_secret in values {
						for has_session in [false, true] {
							let cfg = config(user, password, client_id, client_secret);
							let outcome = AuthMode::resolve(&cfg, has_session);

							if client_id.is_some() && client_secret.is_some() {
								assert_eq!(outcome.ok(), Some(AuthMode::OAuth));
							} else if has_session || (user.is_some() && password.is_some()) {
								assert_eq!(outcome.ok(), Some(AuthMode::Basic));
							} else {
								assert!(matches!(outcome, Err(ConfigError::MissingCredentials)));
							}
						}
					}
				}
			}
		}
	}

	#[test]
	fn empty_strings_count_as_unset() {
		let blank = config(Some(""), Some(""), Some(""), Some("secret"));

		assert!(matches!(AuthMode::resolve(&blank, false), Err(ConfigError::MissingCredentials)));
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(AuthMode::Basic.to_string(), "basic");
		assert_eq!(AuthMode::OAuth.as_str(), "oauth");
		assert_eq!(serde_json::to_string(&AuthMode::OAuth).expect("Mode should serialize."), "\"oauth\"");
	}
}
