//! Client authenticating with HTTP basic credentials or a caller-supplied session.

// self
use crate::{
	_prelude::*,
	client::{
		Resource,
		transport::{Transport, TransportAuth},
	},
	config::SnowConfig,
	error::UsageError,
	params::ParamsBuilder,
};

/// Basic-auth client.
#[derive(Debug)]
pub struct BasicClient {
	transport: Arc<Transport>,
	parameters: ParamsBuilder,
}
impl BasicClient {
	/// Builds a client from the instance address and either user/password or `session`.
	///
	/// A supplied session must carry its own authentication (cookies, default headers) and is
	/// exclusive with user/password.
	pub fn new(config: &SnowConfig, session: Option<ReqwestClient>) -> Result<Self> {
		let base_url = config.base_url()?;
		let (session, auth) = match session {
			Some(_) if config.has_any_basic_credential() =>
				return Err(UsageError::SessionWithCredentials.into()),
			Some(session) => (session, TransportAuth::Session),
			None => {
				let (Some(user), Some(password)) = (&config.user, &config.password) else {
					return Err(UsageError::MissingBasicCredentials.into());
				};

				if !config.has_basic_credentials() {
					return Err(UsageError::MissingBasicCredentials.into());
				}

				(
					super::default_session()?,
					TransportAuth::Basic { user: user.clone(), password: password.clone() },
				)
			},
		};

		Ok(Self {
			transport: Arc::new(Transport { session, base_url, auth }),
			parameters: ParamsBuilder::default(),
		})
	}

	/// Builds a handle for `{base_path}{api_path}` seeded with the default parameters.
	pub fn resource(&self, base_path: &str, api_path: &str) -> Result<Resource> {
		Resource::new(base_path, api_path, self.parameters.clone(), Arc::clone(&self.transport))
	}

	/// Default parameters.
	pub fn parameters(&self) -> &ParamsBuilder {
		&self.parameters
	}

	/// Mutable access to the default parameters.
	pub fn parameters_mut(&mut self) -> &mut ParamsBuilder {
		&mut self.parameters
	}

	/// Underlying HTTP session.
	pub fn session(&self) -> &ReqwestClient {
		&self.transport.session
	}

	/// Instance base URL.
	pub fn base_url(&self) -> &Url {
		&self.transport.base_url
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet;

	#[test]
	fn credentials_or_session_are_required() {
		let bare = SnowConfig::default().with_instance(_preludet::MOCK_INSTANCE);

		assert!(matches!(
			BasicClient::new(&bare, None),
			Err(Error::Usage(UsageError::MissingBasicCredentials))
		));

		let client = BasicClient::new(&bare, Some(ReqwestClient::new()))
			.expect("Session-only basic client should build.");

		assert_eq!(client.base_url().as_str(), "https://mock_instance.service-now.com/");
	}

	#[test]
	fn session_and_credentials_are_exclusive() {
		assert!(matches!(
			BasicClient::new(&_preludet::basic_config(), Some(ReqwestClient::new())),
			Err(Error::Usage(UsageError::SessionWithCredentials))
		));
	}

	#[test]
	fn address_is_validated_at_construction() {
		let config = SnowConfig::default().with_credentials("user", "password");

		assert!(matches!(
			BasicClient::new(&config, None),
			Err(Error::Usage(UsageError::MissingInstanceOrHost))
		));
	}

	#[test]
	fn resources_copy_default_parameters() {
		let mut client = BasicClient::new(&_preludet::basic_config(), None)
			.expect("Basic client should build from fixture config.");

		client.parameters_mut().limit(7);

		let resource =
			client.resource("/api/now", "/table/incident").expect("Valid paths should be accepted.");

		assert_eq!(resource.parameters().get_limit(), Some(7));
		assert_eq!(resource.path(), "/api/now/table/incident");
	}
}
