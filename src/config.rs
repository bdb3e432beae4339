//! Extension configuration: the recognized `SNOW_*` settings and their defaults.

// std
use std::env;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{ConfigError, UsageError},
};

/// Prefix shared by every recognized setting key.
pub const SETTING_PREFIX: &str = "SNOW_";

/// Flat configuration consumed by [`Snow`](crate::snow::Snow).
///
/// Every option defaults to unset except [`use_ssl`](Self::use_ssl), which defaults to `true`.
/// Empty strings are treated as unset wherever credentials are inspected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
	/// Instance name, addressed as `<instance>.service-now.com`.
	pub instance: Option<String>,
	/// Full host (optionally with a port), used instead of `instance`.
	pub host: Option<String>,
	/// Basic-auth user.
	pub user: Option<String>,
	/// Basic-auth password.
	pub password: Option<Secret>,
	/// OAuth client identifier.
	pub oauth_client_id: Option<String>,
	/// OAuth client secret.
	pub oauth_client_secret: Option<Secret>,
	/// Talk HTTPS (`true`) or plain HTTP (`false`).
	pub use_ssl: bool,
}
impl SnowConfig {
	/// Reads the recognized `SNOW_*` keys from a flat settings mapping.
	///
	/// Unrecognized keys are ignored and empty values count as unset. `SNOW_USE_SSL` accepts
	/// `true`/`false`, `1`/`0`, `yes`/`no`, and `on`/`off` in any case.
	pub fn from_settings<I, K, V>(settings: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let mut config = Self::default();

		for (key, value) in settings {
			let key = key.as_ref();
			let Some(name) = key.strip_prefix(SETTING_PREFIX) else {
				continue;
			};
			let value = value.into();

			if value.is_empty() {
				continue;
			}

			match name {
				"INSTANCE" => config.instance = Some(value),
				"HOST" => config.host = Some(value),
				"USER" => config.user = Some(value),
				"PASSWORD" => config.password = Some(Secret::new(value)),
				"OAUTH_CLIENT_ID" => config.oauth_client_id = Some(value),
				"OAUTH_CLIENT_SECRET" => config.oauth_client_secret = Some(Secret::new(value)),
				"USE_SSL" => config.use_ssl = parse_flag(key, &value)?,
				_ => {},
			}
		}

		Ok(config)
	}

	/// Reads the recognized `SNOW_*` keys from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_settings(env::vars())
	}

	/// Sets the instance name.
	pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
		self.instance = Some(instance.into());

		self
	}

	/// Sets the host.
	pub fn with_host(mut self, host: impl Into<String>) -> Self {
		self.host = Some(host.into());

		self
	}

	/// Sets basic-auth credentials.
	pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
		self.user = Some(user.into());
		self.password = Some(Secret::new(password));

		self
	}

	/// Sets OAuth client credentials.
	pub fn with_oauth_client(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.oauth_client_id = Some(client_id.into());
		self.oauth_client_secret = Some(Secret::new(client_secret));

		self
	}

	/// Toggles HTTPS.
	pub fn with_use_ssl(mut self, use_ssl: bool) -> Self {
		self.use_ssl = use_ssl;

		self
	}

	/// Returns `true` when both OAuth client id and secret are set.
	pub fn has_oauth_credentials(&self) -> bool {
		is_set(self.oauth_client_id.as_deref())
			&& is_set(self.oauth_client_secret.as_ref().map(Secret::expose))
	}

	/// Returns `true` when both user and password are set.
	pub fn has_basic_credentials(&self) -> bool {
		is_set(self.user.as_deref()) && is_set(self.password.as_ref().map(Secret::expose))
	}

	/// Returns `true` when either user or password is set.
	pub fn has_any_basic_credential(&self) -> bool {
		is_set(self.user.as_deref()) || is_set(self.password.as_ref().map(Secret::expose))
	}

	/// Base URL of the instance.
	///
	/// Exactly one of `instance` and `host` must be set.
	pub fn base_url(&self) -> Result<Url> {
		let scheme = if self.use_ssl { "https" } else { "http" };
		let authority = match (non_empty(self.instance.as_deref()), non_empty(self.host.as_deref())) {
			(Some(_), Some(_)) => return Err(UsageError::InstanceHostConflict.into()),
			(None, None) => return Err(UsageError::MissingInstanceOrHost.into()),
			(Some(instance), None) => format!("{instance}.service-now.com"),
			(None, Some(host)) => host.to_owned(),
		};
		let raw = format!("{scheme}://{authority}");

		Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { url: raw, source }.into())
	}
}
impl Default for SnowConfig {
	fn default() -> Self {
		Self {
			instance: None,
			host: None,
			user: None,
			password: None,
			oauth_client_id: None,
			oauth_client_secret: None,
			use_ssl: true,
		}
	}
}

fn is_set(value: Option<&str>) -> bool {
	non_empty(value).is_some()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.is_empty())
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		other => Err(ConfigError::InvalidSetting {
			key: key.to_owned(),
			reason: format!("expected a boolean, got `{other}`"),
		}),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_leave_everything_unset_but_ssl() {
		let config = SnowConfig::default();

		assert!(config.use_ssl);
		assert!(config.instance.is_none() && config.host.is_none());
		assert!(!config.has_basic_credentials());
		assert!(!config.has_oauth_credentials());
	}

	#[test]
	fn settings_mapping_is_read_by_key() {
		let config = SnowConfig::from_settings([
			("SNOW_INSTANCE", "mock_instance"),
			("SNOW_OAUTH_CLIENT_ID", "id"),
			("SNOW_OAUTH_CLIENT_SECRET", "secret"),
			("SNOW_USER", ""),
			("SNOW_USE_SSL", "No"),
			("SECRET_KEY", "ignored"),
		])
		.expect("Settings mapping should parse.");

		assert_eq!(config.instance.as_deref(), Some("mock_instance"));
		assert_eq!(config.oauth_client_id.as_deref(), Some("id"));
		assert_eq!(config.oauth_client_secret.as_ref().map(Secret::expose), Some("secret"));
		assert!(config.user.is_none());
		assert!(!config.use_ssl);
		assert!(config.has_oauth_credentials());
	}

	#[test]
	fn invalid_flag_is_a_config_error() {
		let err = SnowConfig::from_settings([("SNOW_USE_SSL", "maybe")])
			.expect_err("Non-boolean SNOW_USE_SSL should be rejected.");

		assert!(matches!(err, ConfigError::InvalidSetting { ref key, .. } if key == "SNOW_USE_SSL"));
	}

	#[test]
	fn deserializes_with_defaults() {
		let config: SnowConfig = serde_json::from_str(r#"{"host":"snow.example.com"}"#)
			.expect("Partial config should deserialize.");

		assert!(config.use_ssl);
		assert_eq!(config.host.as_deref(), Some("snow.example.com"));
	}

	#[test]
	fn base_url_follows_instance_or_host() {
		let instance = SnowConfig::default().with_instance("acme");

		assert_eq!(
			instance.base_url().expect("Instance URL should build.").as_str(),
			"https://acme.service-now.com/"
		);

		let host = SnowConfig::default().with_host("127.0.0.1:8080").with_use_ssl(false);

		assert_eq!(
			host.base_url().expect("Host URL should build.").as_str(),
			"http://127.0.0.1:8080/"
		);
	}

	#[test]
	fn base_url_requires_exactly_one_address() {
		let both = SnowConfig::default().with_instance("acme").with_host("acme.example.com");

		assert!(matches!(both.base_url(), Err(Error::Usage(UsageError::InstanceHostConflict))));
		assert!(matches!(
			SnowConfig::default().base_url(),
			Err(Error::Usage(UsageError::MissingInstanceOrHost))
		));
	}
}
