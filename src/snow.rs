//! Extension controller.
//!
//! [`Snow`] resolves the [`AuthMode`] once when it is built and keeps everything needed to open a
//! connection later. Every per-context operation takes the host's [`SnowContext`] explicitly; the
//! first one that needs a client builds the context's [`Connection`], and the rest reuse it.

// self
use crate::{
	_prelude::*,
	auth::{AuthMode, Secret, Token, TokenUpdater},
	client::{BasicClient, OAuthClient, Resource, SnowClient},
	config::SnowConfig,
	context::{Connection, SnowContext},
	error::UsageError,
	obs::{self, OpSpan, Operation, Outcome},
	params::ParamsBuilder,
};

/// Central controller shared by every context of an application.
#[derive(Clone)]
pub struct Snow {
	config: SnowConfig,
	mode: AuthMode,
	session: Option<ReqwestClient>,
	parameters: Option<ParamsBuilder>,
	token_updater: Option<TokenUpdater>,
}
impl Snow {
	/// Starts building a controller for `config`.
	pub fn builder(config: SnowConfig) -> SnowBuilder {
		SnowBuilder::new(config)
	}

	/// Builds a controller from `config`, an optional pre-authenticated session, and optional
	/// default parameters applied to every client it creates.
	///
	/// No client is constructed and no request is sent until a context first needs one.
	pub fn init_app(
		config: SnowConfig,
		session: Option<ReqwestClient>,
		parameters: Option<ParamsBuilder>,
	) -> Result<Self> {
		let mut builder = Self::builder(config);

		if let Some(session) = session {
			builder = builder.session(session);
		}
		if let Some(parameters) = parameters {
			builder = builder.parameters(parameters);
		}

		builder.build()
	}

	/// Authentication mode chosen at initialization.
	pub fn auth_mode(&self) -> AuthMode {
		self.mode
	}

	/// Configuration the controller was built from.
	pub fn config(&self) -> &SnowConfig {
		&self.config
	}

	/// Session handed to basic clients.
	pub fn session(&self) -> Option<&ReqwestClient> {
		self.session.as_ref()
	}

	/// Default parameters applied to new clients.
	pub fn parameters(&self) -> Option<&ParamsBuilder> {
		self.parameters.as_ref()
	}

	/// Registered token updater.
	pub fn token_updater(&self) -> Option<&TokenUpdater> {
		self.token_updater.as_ref()
	}

	/// Registers the callback that receives every token set or refreshed.
	///
	/// Clients already attached to a context keep the updater they were built with.
	pub fn set_token_updater(&mut self, token_updater: TokenUpdater) -> Result<(), UsageError> {
		if !self.mode.is_oauth() {
			return Err(UsageError::TokenUpdaterRequiresOAuth);
		}

		self.token_updater = Some(token_updater);

		Ok(())
	}

	/// Returns the context's connection, opening it on first use.
	pub fn connection<'c, C>(&self, ctx: &'c mut C) -> Result<&'c mut Connection>
	where
		C: ?Sized + SnowContext,
	{
		let slot = ctx.snow_slot();
		let connection = match slot.take() {
			Some(connection) => connection,
			None => self.open_connection()?,
		};

		Ok(slot.insert(connection))
	}

	/// Installs `token` on the context's client, then hands it to the token updater.
	pub fn set_token<C>(&self, ctx: &mut C, token: Token) -> Result<()>
	where
		C: ?Sized + SnowContext,
	{
		self.connection(ctx)?.client().set_token(Some(token.clone()))?;

		if let Some(updater) = &self.token_updater {
			updater.call(&token)?;
		}

		Ok(())
	}

	/// Current token of the context's client.
	pub fn token<C>(&self, ctx: &mut C) -> Result<Option<Token>>
	where
		C: ?Sized + SnowContext,
	{
		Ok(self.connection(ctx)?.client().token())
	}

	/// Requests a token for `user` through the context's OAuth client.
	///
	/// The token is returned without being installed.
	pub async fn generate_token<C>(
		&self,
		ctx: &mut C,
		user: &str,
		password: &Secret,
	) -> Result<Token>
	where
		C: ?Sized + SnowContext,
	{
		self.connection(ctx)?.client().generate_token(user, password).await
	}

	/// Returns the context's handle for `(base_path, api_path)`.
	///
	/// A cached handle is returned as-is, except that its parameters are reset to the client's
	/// defaults.
	pub fn resource<C>(
		&self,
		ctx: &mut C,
		base_path: &str,
		api_path: &str,
	) -> Result<Arc<Resource>>
	where
		C: ?Sized + SnowContext,
	{
		self.connection(ctx)?.resource(base_path, api_path)
	}

	fn open_connection(&self) -> Result<Connection> {
		const OP: Operation = Operation::Connect;

		OpSpan::new(OP, self.mode.as_str()).in_scope(|| {
			obs::record_outcome(OP, Outcome::Attempt);

			let result = self.build_client().map(Connection::new);

			obs::record_result(OP, &result);

			result
		})
	}

	fn build_client(&self) -> Result<SnowClient> {
		let mut client = match self.mode {
			AuthMode::Basic =>
				SnowClient::from(BasicClient::new(&self.config, self.session.clone())?),
			AuthMode::OAuth => {
				if self.token_updater.is_none() {
					obs::warn_missing_token_updater();
				}

				SnowClient::from(OAuthClient::new(&self.config, self.token_updater.clone())?)
			},
		};

		if let Some(parameters) = &self.parameters {
			client.set_parameters(parameters.clone());
		}

		Ok(client)
	}
}
impl Debug for Snow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Snow")
			.field("mode", &self.mode)
			.field("config", &self.config)
			.field("session_set", &self.session.is_some())
			.field("parameters", &self.parameters)
			.field("token_updater_set", &self.token_updater.is_some())
			.finish()
	}
}

/// Builder for [`Snow`].
#[derive(Debug)]
pub struct SnowBuilder {
	config: SnowConfig,
	session: Option<ReqwestClient>,
	parameters: Option<ParamsBuilder>,
	raw_parameters: Option<Value>,
	token_updater: Option<TokenUpdater>,
}
impl SnowBuilder {
	fn new(config: SnowConfig) -> Self {
		Self { config, session: None, parameters: None, raw_parameters: None, token_updater: None }
	}

	/// Supplies a session that basic clients use as-is.
	pub fn session(mut self, session: ReqwestClient) -> Self {
		self.session = Some(session);

		self
	}

	/// Default parameters applied to every client.
	pub fn parameters(mut self, parameters: ParamsBuilder) -> Self {
		self.parameters = Some(parameters);
		self.raw_parameters = None;

		self
	}

	/// Untyped default parameters, validated by [`build`](Self::build).
	pub fn raw_parameters(mut self, parameters: Value) -> Self {
		self.raw_parameters = Some(parameters);
		self.parameters = None;

		self
	}

	/// Callback receiving every token set or refreshed; OAuth only.
	pub fn token_updater(mut self, token_updater: TokenUpdater) -> Self {
		self.token_updater = Some(token_updater);

		self
	}

	/// Validates the inputs and resolves the authentication mode.
	pub fn build(self) -> Result<Snow> {
		let parameters = match self.raw_parameters {
			Some(raw) => Some(ParamsBuilder::try_from(raw)?),
			None => self.parameters,
		};
		let mode = AuthMode::resolve(&self.config, self.session.is_some())?;
		let mut snow = Snow {
			config: self.config,
			mode,
			session: self.session,
			parameters,
			token_updater: None,
		};

		if let Some(token_updater) = self.token_updater {
			snow.set_token_updater(token_updater)?;
		}

		Ok(snow)
	}
}
