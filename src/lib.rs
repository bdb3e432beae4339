//! Context-scoped ServiceNow clients for web services.
//!
//! [`Snow`](snow::Snow) reads a [`SnowConfig`](config::SnowConfig), decides once whether to talk
//! to the instance with HTTP basic credentials or OAuth tokens, and lazily attaches one client plus
//! a cache of [`Resource`](client::Resource) handles to every application context the host passes
//! in. Refreshed OAuth tokens are handed to a [`TokenUpdater`](auth::TokenUpdater) so the
//! application can persist them.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod params;
pub mod snow;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Token, TokenUpdater},
		config::SnowConfig,
	};

	/// Instance name used by fixtures that never reach the network.
	pub const MOCK_INSTANCE: &str = "mock_instance";
	/// OAuth client identifier used across fixtures.
	pub const MOCK_CLIENT_ID: &str = "mock_client_id";
	/// OAuth client secret used across fixtures.
	pub const MOCK_CLIENT_SECRET: &str = "mock_client_secret";
	/// Basic-auth user used across fixtures.
	pub const MOCK_USER: &str = "mock_user";
	/// Basic-auth password used across fixtures.
	pub const MOCK_PASSWORD: &str = "mock_password";

	/// Configuration selecting OAuth mode against the `mock_instance` instance.
	pub fn oauth_config() -> SnowConfig {
		SnowConfig::default()
			.with_instance(MOCK_INSTANCE)
			.with_oauth_client(MOCK_CLIENT_ID, MOCK_CLIENT_SECRET)
	}

	/// Configuration selecting basic mode against the `mock_instance` instance.
	pub fn basic_config() -> SnowConfig {
		SnowConfig::default().with_instance(MOCK_INSTANCE).with_credentials(MOCK_USER, MOCK_PASSWORD)
	}

	/// Rewrites `config` so it targets a plain-HTTP mock server listening on `address`.
	pub fn against_mock(config: SnowConfig, address: impl Display) -> SnowConfig {
		let mut config = config.with_host(address.to_string()).with_use_ssl(false);

		config.instance = None;

		config
	}

	/// Token that stays valid for an hour and carries a refresh secret.
	pub fn mock_token() -> Token {
		Token::builder()
			.access_token("mock_access_token")
			.refresh_token("mock_refresh_token")
			.scope(["useraccount"])
			.expires_in(Duration::seconds(1234))
			.build()
			.expect("Mock token fixture should build.")
	}

	/// Token that expired a minute ago and therefore triggers a refresh on first use.
	pub fn expired_token() -> Token {
		Token::builder()
			.access_token("expired_access_token")
			.refresh_token("mock_refresh_token")
			.issued_at(OffsetDateTime::now_utc() - Duration::minutes(31))
			.expires_in(Duration::minutes(30))
			.build()
			.expect("Expired token fixture should build.")
	}

	/// Token updater that records every token it receives.
	pub fn recording_updater() -> (TokenUpdater, Arc<Mutex<Vec<Token>>>) {
		let seen = <Arc<Mutex<Vec<Token>>>>::default();
		let sink = Arc::clone(&seen);
		let updater = TokenUpdater::new(move |token: &Token| {
			sink.lock().push(token.clone());

			Ok(())
		});

		(updater, seen)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, MutexGuard, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {axum as _, snow_context as _, color_eyre as _, httpmock as _, tokio as _, tracing_subscriber as _};
