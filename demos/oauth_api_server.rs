//! Small API server that authenticates users against the instance with the password grant and
//! proxies incident reads, keeping the user's token in a [`MemoryStore`].
//!
//! The instance is mocked with `httpmock`; the demo drives its own endpoints and exits.

// std
use std::{net::SocketAddr, sync::Arc};
// crates.io
use axum::{
	Json, Router,
	extract::{Path, Query as QueryParams, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
// self
use snow_context::{
	auth::{Secret, TokenUpdater},
	client::Query,
	config::SnowConfig,
	context::{AppContext, DEFAULT_BASE_PATH},
	error::{Error, ResponseError, TokenCreateError, UsageError},
	snow::Snow,
	store::{MemoryStore, SessionKey, StoreError, TokenStore},
};

#[derive(Clone)]
struct AppState {
	snow: Snow,
	store: MemoryStore,
	session: SessionKey,
}

#[derive(Deserialize)]
struct Credentials {
	username: Option<String>,
	password: Option<String>,
}

#[derive(Deserialize)]
struct ListParams {
	limit: Option<u32>,
}

struct ApiError(StatusCode, Value);
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		let status = match &e {
			Error::TokenCreate(TokenCreateError { status: Some(400), description, .. })
				if description == "access_denied" =>
				StatusCode::UNAUTHORIZED,
			Error::TokenCreate(TokenCreateError { status: Some(code), .. })
			| Error::Response(ResponseError::Status { status: code, .. }) =>
				StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY),
			Error::Usage(UsageError::MissingToken) => StatusCode::UNAUTHORIZED,
			Error::Response(ResponseError::NoResults) => StatusCode::NOT_FOUND,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		Self(status, json!({ "error": e.to_string() }))
	}
}
impl From<StoreError> for ApiError {
	fn from(e: StoreError) -> Self {
		Error::from(e).into()
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.0, Json(self.1)).into_response()
	}
}

async fn auth(
	State(app): State<AppState>,
	QueryParams(credentials): QueryParams<Credentials>,
) -> Result<Json<Value>, ApiError> {
	let (Some(username), Some(password)) = (credentials.username, credentials.password) else {
		return Err(ApiError(
			StatusCode::UNAUTHORIZED,
			json!({ "error": "you must provide a username and password" }),
		));
	};
	let mut ctx = AppContext::new();
	let token = app.snow.generate_token(&mut ctx, &username, &Secret::new(password)).await?;

	app.store.save(&app.session, token)?;

	Ok(Json(json!({ "result": "authentication successful!" })))
}

/// Opens a context whose client carries the session's token.
fn authenticated_context(app: &AppState) -> Result<AppContext, ApiError> {
	let Some(token) = app.store.fetch(&app.session)? else {
		return Err(ApiError(
			StatusCode::UNAUTHORIZED,
			json!({ "error": "you must be authenticated to access this resource" }),
		));
	};
	let mut ctx = AppContext::new();

	app.snow.set_token(&mut ctx, token)?;

	Ok(ctx)
}

async fn incident_list(
	State(app): State<AppState>,
	QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
	let mut ctx = authenticated_context(&app)?;
	let incidents = app.snow.resource(&mut ctx, DEFAULT_BASE_PATH, "/table/incident")?;
	let records =
		incidents.get(Query::all()).limit(params.limit.unwrap_or(10)).send().await?.all();

	Ok(Json(records))
}

async fn incident(
	State(app): State<AppState>,
	Path(number): Path<String>,
) -> Result<Json<Value>, ApiError> {
	let mut ctx = authenticated_context(&app)?;
	let incidents = app.snow.resource(&mut ctx, DEFAULT_BASE_PATH, "/table/incident")?;
	let record = incidents.get([("number", number)]).send().await?.one()?;

	Ok(Json(record))
}

async fn mock_instance() -> MockServer {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth_token.do");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "demo_access_token",
				"refresh_token": "demo_refresh_token",
				"token_type": "Bearer",
				"scope": "useraccount",
				"expires_in": 1799
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/now/table/incident")
				.header("authorization", "Bearer demo_access_token")
				.query_param("sysparm_query", "number=INC0010001");
			then.status(200).json_body(json!({
				"result": [{ "number": "INC0010001", "short_description": "Printer on fire" }]
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/now/table/incident")
				.header("authorization", "Bearer demo_access_token");
			then.status(200).json_body(json!({
				"result": [
					{ "number": "INC0010001", "short_description": "Printer on fire" },
					{ "number": "INC0010002", "short_description": "VPN down" }
				]
			}));
		})
		.await;

	server
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let instance = mock_instance().await;
	let config = SnowConfig::default()
		.with_host(instance.address().to_string())
		.with_use_ssl(false)
		.with_oauth_client("demo_client_id", "demo_client_secret");
	let store = MemoryStore::default();
	let session = SessionKey::new("demo-session")?;
	let snow = Snow::builder(config)
		.token_updater(TokenUpdater::persist(Arc::new(store.clone()), session.clone()))
		.build()?;
	let app = Router::new()
		.route("/auth", get(auth))
		.route("/incidents", get(incident_list))
		.route("/incidents/:number", get(incident))
		.with_state(AppState { snow, store, session });
	let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
	let base = format!("http://{}", listener.local_addr()?);

	tokio::spawn(async move { axum::serve(listener, app).await });

	let http = reqwest::Client::new();

	for path in [
		"/incidents",
		"/auth?username=admin&password=admin",
		"/incidents?limit=2",
		"/incidents/INC0010001",
	] {
		let response = http.get(format!("{base}{path}")).send().await?;
		let status = response.status();
		let body: Value = response.json().await?;

		println!("GET {path} -> {status}: {body}");
	}

	Ok(())
}
