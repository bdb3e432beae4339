//! Minimal ServiceNow Table API client used by the extension.
//!
//! [`SnowClient`] is a closed variant over the two ways of authenticating against an instance.
//! Both variants hand out [`Resource`] handles that share the client's transport and start from a
//! copy of the client's default [`ParamsBuilder`].

pub mod basic;
pub mod oauth;
pub mod query;
pub mod resource;
pub mod response;

mod transport;

pub use basic::BasicClient;
pub use oauth::OAuthClient;
pub use query::Query;
pub use resource::{GetRequest, Resource};
pub use response::Response;

// self
use crate::{
	_prelude::*,
	auth::{AuthMode, Secret, Token},
	error::{ConfigError, UsageError},
	params::ParamsBuilder,
};

/// Client attached to a context's connection holder.
#[derive(Debug)]
pub enum SnowClient {
	/// HTTP basic credentials or a pre-authenticated session.
	Basic(BasicClient),
	/// Bearer tokens issued by the instance's OAuth endpoint.
	OAuth(OAuthClient),
}
impl SnowClient {
	/// Authentication mode implemented by this client.
	pub fn auth_mode(&self) -> AuthMode {
		match self {
			Self::Basic(_) => AuthMode::Basic,
			Self::OAuth(_) => AuthMode::OAuth,
		}
	}

	/// Replaces the client's token; only OAuth clients carry one.
	pub fn set_token(&self, token: Option<Token>) -> Result<()> {
		match self {
			Self::Basic(_) => Err(UsageError::OAuthOnly { operation: "set_token" }.into()),
			Self::OAuth(client) => {
				client.set_token(token);

				Ok(())
			},
		}
	}

	/// Current token, always `None` for basic clients.
	pub fn token(&self) -> Option<Token> {
		match self {
			Self::Basic(_) => None,
			Self::OAuth(client) => client.token(),
		}
	}

	/// Requests a new token with the password grant.
	pub async fn generate_token(&self, user: &str, password: &Secret) -> Result<Token> {
		match self {
			Self::Basic(_) => Err(UsageError::OAuthOnly { operation: "generate_token" }.into()),
			Self::OAuth(client) => client.generate_token(user, password).await,
		}
	}

	/// Builds a handle for `{base_path}{api_path}`.
	pub fn resource(&self, base_path: &str, api_path: &str) -> Result<Resource> {
		match self {
			Self::Basic(client) => client.resource(base_path, api_path),
			Self::OAuth(client) => client.resource(base_path, api_path),
		}
	}

	/// Default parameters copied into every new or reset resource.
	pub fn parameters(&self) -> &ParamsBuilder {
		match self {
			Self::Basic(client) => client.parameters(),
			Self::OAuth(client) => client.parameters(),
		}
	}

	/// Mutable access to the default parameters.
	pub fn parameters_mut(&mut self) -> &mut ParamsBuilder {
		match self {
			Self::Basic(client) => client.parameters_mut(),
			Self::OAuth(client) => client.parameters_mut(),
		}
	}

	/// Replaces the default parameters.
	pub fn set_parameters(&mut self, parameters: ParamsBuilder) {
		*self.parameters_mut() = parameters;
	}

	/// Underlying HTTP session.
	pub fn session(&self) -> &ReqwestClient {
		match self {
			Self::Basic(client) => client.session(),
			Self::OAuth(client) => client.session(),
		}
	}
}
impl From<BasicClient> for SnowClient {
	fn from(client: BasicClient) -> Self {
		Self::Basic(client)
	}
}
impl From<OAuthClient> for SnowClient {
	fn from(client: OAuthClient) -> Self {
		Self::OAuth(client)
	}
}

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default session used when the application does not supply one.
///
/// Redirects are disabled so credentials never follow a redirect off the instance.
fn default_session() -> Result<ReqwestClient> {
	ReqwestClient::builder()
		.user_agent(USER_AGENT)
		.redirect(reqwest::redirect::Policy::none())
		.build()
		.map_err(|e| ConfigError::http_client_build(e).into())
}
