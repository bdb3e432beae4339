//! OAuth token records exchanged with the instance and handed to token updaters.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserializer, Serializer, de::Error as DeError};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Secret};

/// Errors produced by [`TokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when `issued_at + expires_in` falls outside the representable date range.
	#[error("Expiry of {seconds} seconds is out of range.")]
	ExpiryOutOfRange {
		/// Relative expiry that overflowed.
		seconds: i64,
	},
}

/// Token record in the shape the instance's token endpoint returns it.
///
/// Serializes to the familiar `access_token`/`refresh_token`/`token_type`/`scope`/`expires_in`/
/// `expires_at` mapping, with `expires_at` as fractional UNIX seconds, so applications can stash
/// it in a session and hand it back through [`Snow::set_token`](crate::snow::Snow::set_token).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Refresh token secret, if the endpoint issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<Secret>,
	/// Token type, normally `Bearer`.
	#[serde(default = "default_token_type")]
	pub token_type: String,
	/// Granted scopes.
	#[serde(default, deserialize_with = "scope_from_str_or_seq")]
	pub scope: Vec<String>,
	/// Lifetime in seconds reported by the endpoint.
	pub expires_in: i64,
	/// Expiry instant.
	#[serde(with = "unix_seconds")]
	pub expires_at: OffsetDateTime,
}
impl Token {
	/// Returns a builder for constructing tokens.
	pub fn builder() -> TokenBuilder {
		TokenBuilder::default()
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Short, non-reversible identifier of the access token for log correlation.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.access_token.expose().as_bytes());

		URL_SAFE_NO_PAD.encode(&digest[..9])
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_in", &self.expires_in)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Token`].
#[derive(Clone, Debug, Default)]
pub struct TokenBuilder {
	access_token: Option<Secret>,
	refresh_token: Option<Secret>,
	token_type: Option<String>,
	scope: Vec<String>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(Secret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(Secret::new(token));

		self
	}

	/// Overrides the token type (defaults to `Bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scopes.
	pub fn scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Sets the issued-at instant used to derive `expires_at` from `expires_in`.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`Token`].
	pub fn build(self) -> Result<Token, TokenBuilderError> {
		let access_token = self.access_token.ok_or(TokenBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let (expires_at, expires_in) = match (self.expires_at, self.expires_in) {
			(Some(instant), Some(delta)) => (instant, delta),
			(Some(instant), None) => (instant, instant - issued_at),
			(None, Some(delta)) => {
				let instant = issued_at.checked_add(delta).ok_or(
					TokenBuilderError::ExpiryOutOfRange { seconds: delta.whole_seconds() },
				)?;

				(instant, delta)
			},
			(None, None) => return Err(TokenBuilderError::MissingExpiry),
		};

		Ok(Token {
			access_token,
			refresh_token: self.refresh_token,
			token_type: self.token_type.unwrap_or_else(default_token_type),
			scope: self.scope,
			expires_in: expires_in.whole_seconds(),
			expires_at,
		})
	}
}

fn default_token_type() -> String {
	"Bearer".into()
}

fn scope_from_str_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Joined(String),
		List(Vec<String>),
	}

	Ok(match Raw::deserialize(deserializer)? {
		Raw::Joined(joined) => joined.split_whitespace().map(Into::into).collect(),
		Raw::List(list) => list,
	})
}

mod unix_seconds {
	// self
	use super::*;

	pub(super) fn serialize<S>(instant: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_f64(instant.unix_timestamp_nanos() as f64 / 1e9)
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let seconds = f64::deserialize(deserializer)?;

		if !seconds.is_finite() {
			return Err(D::Error::custom("expires_at must be a finite number"));
		}

		OffsetDateTime::from_unix_timestamp_nanos((seconds * 1e9) as i128).map_err(D::Error::custom)
	}
}
