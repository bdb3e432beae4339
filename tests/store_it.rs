// std
use std::time::{SystemTime, UNIX_EPOCH};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use snow_context::{
	_preludet::*,
	auth::TokenUpdater,
	client::Query,
	context::{AppContext, DEFAULT_BASE_PATH},
	snow::Snow,
	store::{FileStore, MemoryStore, SessionKey, TokenStore},
};

fn temp_store_path() -> std::path::PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System clock should be after the Unix epoch.")
		.as_nanos();

	std::env::temp_dir()
		.join(format!("snow-context-store-it-{}-{nanos}", std::process::id()))
		.join("tokens.json")
}

#[test]
fn set_token_persists_through_the_updater() {
	let store = Arc::new(MemoryStore::default());
	let key = SessionKey::new("user-7").expect("Session key fixture should be valid.");
	let snow = Snow::builder(oauth_config())
		.token_updater(TokenUpdater::persist(store.clone(), key.clone()))
		.build()
		.expect("OAuth controller should build.");
	let mut ctx = AppContext::new();

	snow.set_token(&mut ctx, mock_token()).expect("set_token should succeed.");

	assert_eq!(store.fetch(&key).expect("Fetch should succeed."), Some(mock_token()));
}

#[tokio::test]
async fn refreshed_tokens_land_in_the_file_store() {
	let server = MockServer::start_async().await;
	let _refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth_token.do");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "file_access_token",
				"token_type": "Bearer",
				"expires_in": 1800
			}));
		})
		.await;
	let _table = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/now/table/incident");
			then.status(200).json_body(json!({ "result": [] }));
		})
		.await;
	let path = temp_store_path();
	let store = Arc::new(FileStore::open(&path).expect("File store should open."));
	let key = SessionKey::new("user-8").expect("Session key fixture should be valid.");
	let snow = Snow::builder(against_mock(oauth_config(), server.address()))
		.token_updater(TokenUpdater::persist(store.clone(), key.clone()))
		.build()
		.expect("OAuth controller should build.");
	let mut ctx = AppContext::new();

	snow.set_token(&mut ctx, expired_token()).expect("set_token should succeed.");
	snow.resource(&mut ctx, DEFAULT_BASE_PATH, "/table/incident")
		.expect("Resource should build.")
		.get(Query::all())
		.send()
		.await
		.expect("Request should succeed after a refresh.");

	let reopened = FileStore::open(&path).expect("File store should reopen.");
	let stored = reopened
		.fetch(&key)
		.expect("Fetch should succeed.")
		.expect("Refreshed token should be persisted.");

	assert_eq!(stored.access_token.expose(), "file_access_token");
	// The endpoint did not rotate the refresh token, so the previous one is kept.
	assert_eq!(stored.refresh_token.as_ref().map(|s| s.expose()), Some("mock_refresh_token"));

	if let Some(dir) = path.parent() {
		let _ = std::fs::remove_dir_all(dir);
	}
}
