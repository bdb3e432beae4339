//! Lists and updates incidents with basic credentials against a mock instance, opening one
//! context per simulated request.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use snow_context::{
	client::Query,
	config::SnowConfig,
	context::{AppContext, DEFAULT_BASE_PATH},
	params::ParamsBuilder,
	snow::Snow,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let list_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/now/table/incident").query_param("sysparm_limit", "2");
			then.status(200).json_body(json!({
				"result": [
					{ "sys_id": "a1", "number": "INC0010001", "short_description": "Printer on fire" },
					{ "sys_id": "b2", "number": "INC0010002", "short_description": "VPN down" }
				]
			}));
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/now/table/incident")
				.query_param("sysparm_query", "number=INC0010002");
			then.status(200).json_body(json!({ "result": [{ "sys_id": "b2" }] }));
		})
		.await;
	let update_mock = server
		.mock_async(|when, then| {
			when.method(PUT).path("/api/now/table/incident/b2");
			then.status(200).json_body(json!({ "result": { "sys_id": "b2", "state": "6" } }));
		})
		.await;
	let config = SnowConfig::from_settings([
		("SNOW_HOST", server.address().to_string()),
		("SNOW_USER", "admin".to_owned()),
		("SNOW_PASSWORD", "admin".to_owned()),
		("SNOW_USE_SSL", "false".to_owned()),
	])?;
	let mut defaults = ParamsBuilder::new();

	defaults.exclude_reference_link(true);

	let snow = Snow::init_app(config, None, Some(defaults))?;

	println!("Auth mode: {}.", snow.auth_mode());

	// First "request".
	{
		let mut ctx = AppContext::new();
		let incidents = snow.resource(&mut ctx, DEFAULT_BASE_PATH, "/table/incident")?;

		for record in incidents.get(Query::all()).limit(2).send().await?.all() {
			println!("{} {}", record["number"], record["short_description"]);
		}
	}

	// Second "request" gets a brand new connection.
	{
		let mut ctx = AppContext::new();
		let incidents = snow.resource(&mut ctx, DEFAULT_BASE_PATH, "/table/incident")?;
		let resolved = incidents
			.update([("number", "INC0010002")], &json!({ "state": "6" }))
			.await?
			.one()?;

		println!("Resolved {} (state {}).", resolved["sys_id"], resolved["state"]);
	}

	list_mock.assert_async().await;
	lookup_mock.assert_async().await;
	update_mock.assert_async().await;

	Ok(())
}
