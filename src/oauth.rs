//! Token-endpoint facade for the instance's `oauth_token.do` endpoint.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, RefreshToken,
	RequestTokenError, ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenType},
};
// self
use crate::{
	_prelude::*,
	auth::{Secret, Token},
	error::{ConfigError, TokenCreateError, TransportError},
	http::{ResponseMetadata, TokenEndpointClient},
};

/// Path of the token endpoint relative to the instance base URL.
pub const TOKEN_PATH: &str = "oauth_token.do";
/// Lifespan assumed when the endpoint omits `expires_in` (the instance default).
pub const DEFAULT_TOKEN_LIFESPAN: Duration = Duration::minutes(30);

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

/// Issues and refreshes user tokens with the client credentials sent in the request body.
pub(crate) struct TokenFacade {
	oauth_client: ConfiguredBasicClient,
	http_client: TokenEndpointClient,
}
impl TokenFacade {
	pub(crate) fn new(
		base_url: &Url,
		client_id: &str,
		client_secret: &Secret,
		http_client: TokenEndpointClient,
	) -> Result<Self> {
		let endpoint = base_url.join(TOKEN_PATH).map_err(|source| ConfigError::InvalidUrl {
			url: format!("{base_url}{TOKEN_PATH}"),
			source,
		})?;
		let token_url = TokenUrl::from_url(endpoint);
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client })
	}

	/// Performs the resource-owner password grant.
	pub(crate) async fn password(&self, user: &str, password: &Secret) -> Result<Token> {
		let http_client = self.http_client.detached();
		let username = ResourceOwnerUsername::new(user.to_owned());
		let password = ResourceOwnerPassword::new(password.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_password(&username, &password)
			.request_async(&http_client)
			.await
			.map_err(|err| map_request_error(http_client.take_metadata(), err))?;

		map_token_response(response, None)
	}

	/// Exchanges `refresh_token` for a new token, keeping the old refresh secret when the
	/// endpoint does not rotate it.
	pub(crate) async fn refresh(&self, refresh_token: &Secret) -> Result<Token> {
		let http_client = self.http_client.detached();
		let secret = RefreshToken::new(refresh_token.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&secret)
			.request_async(&http_client)
			.await
			.map_err(|err| map_request_error(http_client.take_metadata(), err))?;

		map_token_response(response, Some(refresh_token))
	}
}
impl Debug for TokenFacade {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenFacade")
			.field("client_id", &self.oauth_client.client_id().as_str())
			.field("token_url", &self.oauth_client.token_uri().as_str())
			.finish()
	}
}

fn map_token_response(
	response: FacadeTokenResponse,
	previous_refresh: Option<&Secret>,
) -> Result<Token> {
	let mut builder = Token::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(token_type_label(response.token_type()));

	if let Some(expires_in) = response.expires_in() {
		let seconds = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);

		builder = builder.expires_in(Duration::seconds(seconds));
	} else {
		builder = builder.expires_in(DEFAULT_TOKEN_LIFESPAN);
	}
	if let Some(scopes) = response.scopes() {
		builder = builder.scope(scopes.iter().map(|scope| scope.as_str().to_owned()));
	}
	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	} else if let Some(previous) = previous_refresh {
		builder = builder.refresh_token(previous.expose());
	}

	builder.build().map_err(|e| {
		TokenCreateError {
			status: None,
			error: "invalid_token_response".into(),
			description: e.to_string(),
			retry_after: None,
		}
		.into()
	})
}

fn token_type_label(token_type: &BasicTokenType) -> String {
	match token_type {
		BasicTokenType::Bearer => "Bearer".into(),
		BasicTokenType::Mac => "MAC".into(),
		BasicTokenType::Extension(other) => other.clone(),
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let meta = meta.unwrap_or_default();
	let ResponseMetadata { status, retry_after } = meta;

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response(meta, response),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(error, _body) => TokenCreateError {
			status,
			error: "invalid_token_response".into(),
			description: format!("token endpoint returned malformed JSON at {}", error.path()),
			retry_after,
		}
		.into(),
		RequestTokenError::Other(description) => TokenCreateError {
			status,
			error: "unexpected_response".into(),
			description,
			retry_after,
		}
		.into(),
	}
}

fn map_server_response(meta: ResponseMetadata, response: BasicErrorResponse) -> Error {
	let error = response.error().as_ref().to_string();
	let description = response.error_description().cloned().unwrap_or_else(|| error.clone());

	TokenCreateError { status: meta.status, error, description, retry_after: meta.retry_after }
		.into()
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => Error::from(*inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			TransportError::Io(std::io::Error::other(message)).into(),
		_ => TransportError::Io(std::io::Error::other("unknown HTTP client failure")).into(),
	}
}
