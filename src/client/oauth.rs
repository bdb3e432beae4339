//! Client authenticating with bearer tokens issued by the instance.

// self
use crate::{
	_prelude::*,
	auth::{Secret, Token, TokenUpdater},
	client::{
		Resource,
		transport::{OAuthState, Transport, TransportAuth},
	},
	config::SnowConfig,
	error::{ConfigError, UsageError},
	http::TokenEndpointClient,
	oauth::TokenFacade,
	obs::{self, OpSpan, Operation, Outcome},
	params::ParamsBuilder,
};

/// OAuth client.
///
/// Requests carry the current token; an expired token is refreshed first and the result is
/// handed to the token updater.
#[derive(Debug)]
pub struct OAuthClient {
	transport: Arc<Transport>,
	state: Arc<OAuthState>,
	parameters: ParamsBuilder,
}
impl OAuthClient {
	/// Builds a client from the instance address and OAuth client credentials.
	pub fn new(config: &SnowConfig, token_updater: Option<TokenUpdater>) -> Result<Self> {
		let (Some(client_id), Some(client_secret)) =
			(&config.oauth_client_id, &config.oauth_client_secret)
		else {
			return Err(ConfigError::MissingCredentials.into());
		};

		if !config.has_oauth_credentials() {
			return Err(ConfigError::MissingCredentials.into());
		}

		let base_url = config.base_url()?;
		let session = super::default_session()?;
		let facade = TokenFacade::new(
			&base_url,
			client_id,
			client_secret,
			TokenEndpointClient::new(session.clone()),
		)?;
		let state = Arc::new(OAuthState::new(facade, token_updater));
		let auth = TransportAuth::OAuth(Arc::clone(&state));

		Ok(Self {
			transport: Arc::new(Transport { session, base_url, auth }),
			state,
			parameters: ParamsBuilder::default(),
		})
	}

	/// Replaces the current token.
	pub fn set_token(&self, token: Option<Token>) {
		*self.state.token.write() = token;
	}

	/// Current token.
	pub fn token(&self) -> Option<Token> {
		self.state.current()
	}

	/// Registered token updater.
	pub fn token_updater(&self) -> Option<&TokenUpdater> {
		self.state.updater.as_ref()
	}

	/// Requests a token for `user` with the password grant.
	///
	/// The token is returned, not installed; pass it to [`set_token`](Self::set_token) (or the
	/// controller's `set_token`) to start using it.
	pub async fn generate_token(&self, user: &str, password: &Secret) -> Result<Token> {
		const OP: Operation = Operation::TokenCreate;

		let span = OpSpan::new(OP, "generate_token");

		obs::record_outcome(OP, Outcome::Attempt);

		let result = span.instrument(self.state.facade.password(user, password)).await;

		obs::record_result(OP, &result);

		result
	}

	/// Builds a handle for `{base_path}{api_path}` seeded with the default parameters.
	///
	/// Fails with [`UsageError::MissingToken`] until a token has been set.
	pub fn resource(&self, base_path: &str, api_path: &str) -> Result<Resource> {
		if self.state.token.read().is_none() {
			return Err(UsageError::MissingToken.into());
		}

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
	fn requires_client_credentials() {
		let config = SnowConfig::default().with_instance(_preludet::MOCK_INSTANCE);

		assert!(matches!(
			OAuthClient::new(&config, None),
			Err(Error::Config(ConfigError::MissingCredentials))
		));
	}

	#[test]
	fn resource_requires_a_token() {
		let client = OAuthClient::new(&_preludet::oauth_config(), None)
			.expect("OAuth client should build from fixture config.");

		assert!(matches!(
			client.resource("/api/now", "/table/incident"),
			Err(Error::Usage(UsageError::MissingToken))
		));

		client.set_token(Some(_preludet::mock_token()));

		let resource = client
			.resource("/api/now", "/table/incident")
			.expect("Resource should build once a token is set.");

		assert_eq!(resource.api_path(), "/table/incident");
		assert_eq!(client.token(), Some(_preludet::mock_token()));
	}

	#[test]
	fn keeps_the_updater() {
		let (updater, _) = _preludet::recording_updater();
		let client = OAuthClient::new(&_preludet::oauth_config(), Some(updater.clone()))
			.expect("OAuth client should build from fixture config.");

		assert!(client.token_updater().is_some_and(|stored| stored.ptr_eq(&updater)));
	}
}
