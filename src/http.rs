//! `oauth2` adapter that sends token requests through the instance's reqwest session.
//!
//! `oauth2` is compiled without an HTTP backend. [`TokenEndpointClient`] fills that role and keeps
//! the status and `Retry-After` hint of the last token-endpoint reply, so a refused grant can be
//! reported with the HTTP status it arrived with.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::{
	StatusCode,
	header::{HeaderMap, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Status and throttling hint of a token-endpoint reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code of the reply.
	pub status: Option<u16>,
	/// `Retry-After` hint as a delay from now.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	fn capture(status: StatusCode, headers: &HeaderMap) -> Self {
		Self { status: Some(status.as_u16()), retry_after: parse_retry_after(headers) }
	}
}

/// [`AsyncHttpClient`] used by the token facade.
///
/// The session must not follow redirects; the session built by the client already disables them.
#[derive(Clone)]
pub struct TokenEndpointClient {
	session: ReqwestClient,
	last: Arc<Mutex<Option<ResponseMetadata>>>,
}
impl TokenEndpointClient {
	/// Wraps `session`.
	pub fn new(session: ReqwestClient) -> Self {
		Self { session, last: Default::default() }
	}

	/// Client sharing the session but recording into its own metadata slot.
	///
	/// Each grant uses a detached client so concurrent exchanges never read each other's reply.
	pub fn detached(&self) -> Self {
		Self::new(self.session.clone())
	}

	/// Removes and returns the metadata of the last reply.
	pub fn take_metadata(&self) -> Option<ResponseMetadata> {
		self.last.lock().take()
	}
}
impl Debug for TokenEndpointClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpointClient").field("last", &*self.last.lock()).finish()
	}
}
impl<'c> AsyncHttpClient<'c> for TokenEndpointClient {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.take_metadata();

			let request = reqwest::Request::try_from(request).map_err(Box::new)?;
			let reply = self.session.execute(request).await.map_err(Box::new)?;
			let status = reply.status();
			let headers = reply.headers().clone();

			*self.last.lock() = Some(ResponseMetadata::capture(status, &headers));

			let body = reply.bytes().await.map_err(Box::new)?;
			let mut response = HttpResponse::new(body.to_vec());

			*response.status_mut() = status;
			*response.headers_mut() = headers;

			Ok(response)
		})
	}
}

/// Reads `Retry-After` as either delay seconds or an HTTP date still in the future.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	match raw.parse::<i64>() {
		Ok(seconds) if seconds >= 0 => Some(Duration::seconds(seconds)),
		Ok(_) => None,
		Err(_) => OffsetDateTime::parse(raw, &Rfc2822)
			.ok()
			.map(|moment| moment - OffsetDateTime::now_utc())
			.filter(|delay| delay.is_positive()),
	}
}
