//! Shared request pipeline: URL building, authentication, bearer refresh, response decoding.

// crates.io
use reqwest::{Method, header::ACCEPT};
// self
use crate::{
	_prelude::*,
	auth::{Secret, Token, TokenUpdater},
	client::Response,
	error::{ConfigError, UsageError},
	obs::{self, OpSpan, Operation, Outcome},
	oauth::TokenFacade,
};

/// Everything a [`Resource`](crate::client::Resource) needs to talk to the instance.
#[derive(Debug)]
pub(crate) struct Transport {
	pub(crate) session: ReqwestClient,
	pub(crate) base_url: Url,
	pub(crate) auth: TransportAuth,
}
impl Transport {
	/// Appends `path` to the base URL. The host never comes from `path`.
	pub(crate) fn url(&self, path: &str) -> Result<Url> {
		let raw = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));

		Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { url: raw, source }.into())
	}

	/// Sends one Table API request and decodes its `result` payload.
	pub(crate) async fn request(
		&self,
		stage: &'static str,
		method: Method,
		path: &str,
		query: &BTreeMap<String, String>,
		body: Option<&Value>,
	) -> Result<Response> {
		const OP: Operation = Operation::Request;

		let span = OpSpan::new(OP, stage).with_path(path);

		obs::record_outcome(OP, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.url(path)?;
				let mut request = self
					.session
					.request(method.clone(), url)
					.header(ACCEPT, "application/json")
					.query(query);

				if let Some(body) = body {
					request = request.json(body);
				}

				request = match &self.auth {
					TransportAuth::Basic { user, password } =>
						request.basic_auth(user, Some(password.expose())),
					TransportAuth::Session => request,
					TransportAuth::OAuth(state) => {
						let token = state.fresh_token().await?;

						request.bearer_auth(token.access_token.expose())
					},
				};

				let response = request.send().await?;

				Response::from_http(&method, response).await
			})
			.await;

		obs::record_result(OP, &result);

		result
	}
}

/// How requests are authenticated.
#[derive(Debug)]
pub(crate) enum TransportAuth {
	Basic { user: String, password: Secret },
	Session,
	OAuth(Arc<OAuthState>),
}

/// Token slot and refresh machinery of an OAuth client.
#[derive(Debug)]
pub(crate) struct OAuthState {
	pub(crate) facade: TokenFacade,
	pub(crate) token: RwLock<Option<Token>>,
	pub(crate) updater: Option<TokenUpdater>,
	refresh_guard: AsyncMutex<()>,
}
impl OAuthState {
	pub(crate) fn new(facade: TokenFacade, updater: Option<TokenUpdater>) -> Self {
		Self { facade, token: RwLock::new(None), updater, refresh_guard: AsyncMutex::new(()) }
	}

	pub(crate) fn current(&self) -> Option<Token> {
		self.token.read().clone()
	}

	/// Returns a usable token, refreshing an expired one first.
	///
	/// Only one refresh runs at a time; callers that queued behind it reuse its result.
	pub(crate) async fn fresh_token(&self) -> Result<Token> {
		let token = self.current().ok_or(UsageError::MissingToken)?;

		if !token.is_expired() {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;
		let token = self.current().ok_or(UsageError::MissingToken)?;

		if !token.is_expired() {
			return Ok(token);
		}

		// Without a refresh secret the instance gets the stale token and answers 401.
		let Some(refresh_token) = token.refresh_token.clone() else {
			return Ok(token);
		};

		self.refresh(&refresh_token).await
	}

	async fn refresh(&self, refresh_token: &Secret) -> Result<Token> {
		const OP: Operation = Operation::TokenRefresh;

		let span = OpSpan::new(OP, "refresh");

		obs::record_outcome(OP, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let refreshed = self.facade.refresh(refresh_token).await?;

				*self.token.write() = Some(refreshed.clone());

				obs::note_token_refreshed(&refreshed.fingerprint());

				if let Some(updater) = &self.updater {
					updater.call(&refreshed)?;
				}

				Ok(refreshed)
			})
			.await;

		obs::record_result(OP, &result);

		result
	}
}
