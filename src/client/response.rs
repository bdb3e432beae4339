//! Decoding of Table API responses.

// crates.io
use reqwest::{Method, StatusCode};
// self
use crate::{_prelude::*, error::ResponseError};

#[derive(Deserialize)]
struct Envelope {
	#[serde(default)]
	result: Value,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	#[serde(default)]
	error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	detail: Option<String>,
}

/// Records returned by one request.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
	status: u16,
	records: Vec<Value>,
}
impl Response {
	pub(crate) async fn from_http(method: &Method, response: reqwest::Response) -> Result<Self> {
		let status = response.status();
		let bytes = response.bytes().await?;

		Self::decode(method, status, &bytes)
	}

	pub(crate) fn decode(method: &Method, status: StatusCode, body: &[u8]) -> Result<Self> {
		let code = status.as_u16();

		// The Table API answers reads that match nothing with 404.
		if *method == Method::GET && status == StatusCode::NOT_FOUND {
			return Ok(Self { status: code, records: Vec::new() });
		}
		if !status.is_success() {
			let body = serde_json::from_slice::<ErrorEnvelope>(body)
				.ok()
				.and_then(|envelope| envelope.error);
			let (message, detail) = match body {
				Some(ErrorBody { message, detail }) => (message, detail),
				None => (None, None),
			};
			let message = message
				.or_else(|| status.canonical_reason().map(ToOwned::to_owned))
				.unwrap_or_else(|| "unknown error".into());

			return Err(ResponseError::Status { status: code, message, detail }.into());
		}
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self { status: code, records: Vec::new() });
		}

		let mut de = serde_json::Deserializer::from_slice(body);
		let envelope: Envelope = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ResponseError::Parse { source, status: code })?;
		let records = match envelope.result {
			Value::Null => Vec::new(),
			Value::Array(records) => records,
			record => vec![record],
		};

		Ok(Self { status: code, records })
	}

	/// HTTP status the instance answered with.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Borrowed view of every record.
	pub fn records(&self) -> &[Value] {
		&self.records
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns `true` when no record came back.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Every record.
	pub fn all(self) -> Vec<Value> {
		self.records
	}

	/// First record, or [`ResponseError::NoResults`].
	pub fn first(self) -> Result<Value> {
		self.first_or_none().ok_or_else(|| ResponseError::NoResults.into())
	}

	/// First record, if any.
	pub fn first_or_none(self) -> Option<Value> {
		self.records.into_iter().next()
	}

	/// The only record; zero or several records are errors.
	pub fn one(self) -> Result<Value> {
		self.one_or_none()?.ok_or_else(|| ResponseError::NoResults.into())
	}

	/// The only record, if any; several records are an error.
	pub fn one_or_none(self) -> Result<Option<Value>> {
		match self.records.len() {
			0 | 1 => Ok(self.records.into_iter().next()),
			count => Err(ResponseError::MultipleResults { count }.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn decode(method: Method, status: u16, body: &Value) -> Result<Response> {
		let status = StatusCode::from_u16(status).expect("Fixture status should be valid.");
		let body = serde_json::to_vec(body).expect("Fixture body should serialize.");

		Response::decode(&method, status, &body)
	}

	#[test]
	fn list_and_single_results() {
		let list = decode(Method::GET, 200, &json!({ "result": [{ "a": 1 }, { "a": 2 }] }))
			.expect("List result should decode.");

		assert_eq!(list.len(), 2);
		assert!(matches!(
			list.clone().one(),
			Err(Error::Response(ResponseError::MultipleResults { count: 2 }))
		));
		assert_eq!(list.first().expect("First record should exist."), json!({ "a": 1 }));

		let single = decode(Method::POST, 201, &json!({ "result": { "sys_id": "x" } }))
			.expect("Single result should decode.");

		assert_eq!(single.status(), 201);
		assert_eq!(single.one().expect("Exactly one record."), json!({ "sys_id": "x" }));
	}

	#[test]
	fn get_not_found_is_empty() {
		let response = decode(
			Method::GET,
			404,
			&json!({ "error": { "message": "No Record found" }, "status": "failure" }),
		)
		.expect("404 on GET should decode as empty.");

		assert!(response.is_empty());
		assert!(matches!(response.one_or_none(), Ok(None)));
	}

	#[test]
	fn errors_carry_message_and_detail() {
		let err = decode(
			Method::POST,
			403,
			&json!({ "error": { "message": "Operation Failed", "detail": "ACL rejected" } }),
		)
		.expect_err("403 should fail.");

		assert!(matches!(
			err,
			Error::Response(ResponseError::Status { status: 403, ref message, ref detail })
				if message == "Operation Failed" && detail.as_deref() == Some("ACL rejected")
		));

		let err = Response::decode(&Method::DELETE, StatusCode::BAD_GATEWAY, b"<html>")
			.expect_err("502 should fail.");

		assert!(matches!(
			err,
			Error::Response(ResponseError::Status { status: 502, ref message, detail: None })
				if message == "Bad Gateway"
		));
	}

	#[test]
	fn empty_and_malformed_bodies() {
		let empty = Response::decode(&Method::DELETE, StatusCode::NO_CONTENT, b"")
			.expect("204 should decode as empty.");

		assert!(empty.is_empty());

		let err = Response::decode(&Method::GET, StatusCode::OK, b"{\"result\": [")
			.expect_err("Truncated body should fail.");

		assert!(matches!(err, Error::Response(ResponseError::Parse { status: 200, .. })));
	}
}
