//! Table API handles bound to `{base_path}{api_path}`.

// crates.io
use reqwest::Method;
// self
use crate::{
	_prelude::*,
	client::{Query, Response, transport::Transport},
	error::{ResponseError, UsageError},
	params::ParamsBuilder,
};

/// Handle for one remote collection.
///
/// Parameters live behind a lock so every holder of the same `Arc<Resource>` sees changes made
/// through [`parameters`](Self::parameters) or [`set_parameters`](Self::set_parameters).
#[derive(Debug)]
pub struct Resource {
	base_path: String,
	api_path: String,
	parameters: Mutex<ParamsBuilder>,
	transport: Arc<Transport>,
}
impl Resource {
	pub(crate) fn new(
		base_path: &str,
		api_path: &str,
		parameters: ParamsBuilder,
		transport: Arc<Transport>,
	) -> Result<Self> {
		validate_path(base_path)?;
		validate_path(api_path)?;

		Ok(Self {
			base_path: base_path.to_owned(),
			api_path: api_path.to_owned(),
			parameters: Mutex::new(parameters),
			transport,
		})
	}

	/// Base path, e.g. `/api/now`.
	pub fn base_path(&self) -> &str {
		&self.base_path
	}

	/// API path, e.g. `/table/incident`.
	pub fn api_path(&self) -> &str {
		&self.api_path
	}

	/// Full request path.
	pub fn path(&self) -> String {
		format!("{}{}", self.base_path, self.api_path)
	}

	/// Locks the handle's parameters for inspection or in-place changes.
	pub fn parameters(&self) -> MutexGuard<'_, ParamsBuilder> {
		self.parameters.lock()
	}

	/// Replaces the handle's parameters.
	pub fn set_parameters(&self, parameters: ParamsBuilder) {
		*self.parameters.lock() = parameters;
	}

	/// Starts a read of the records matching `query`.
	pub fn get(&self, query: impl Into<Query>) -> GetRequest<'_> {
		GetRequest { resource: self, query: query.into(), parameters: self.parameters().clone() }
	}

	/// Inserts a record.
	pub async fn create(&self, payload: &Value) -> Result<Response> {
		let query = self.parameters().as_map();

		self.transport.request("create", Method::POST, &self.path(), &query, Some(payload)).await
	}

	/// Updates the single record matching `query` with `payload`.
	pub async fn update(&self, query: impl Into<Query>, payload: &Value) -> Result<Response> {
		let path = self.record_path(query.into()).await?;
		let query = self.parameters().as_map();

		self.transport.request("update", Method::PUT, &path, &query, Some(payload)).await
	}

	/// Deletes the single record matching `query`.
	pub async fn delete(&self, query: impl Into<Query>) -> Result<()> {
		let path = self.record_path(query.into()).await?;

		self.transport.request("delete", Method::DELETE, &path, &BTreeMap::new(), None).await?;

		Ok(())
	}

	async fn record_path(&self, query: Query) -> Result<String> {
		let record = self.get(query).send().await?.one()?;
		let sys_id =
			record.get("sys_id").and_then(Value::as_str).ok_or(ResponseError::MissingSysId)?;

		if sys_id.is_empty()
			|| !sys_id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
		{
			return Err(ResponseError::InvalidSysId { sys_id: sys_id.to_owned() }.into());
		}

		Ok(format!("{}/{sys_id}", self.path()))
	}
}

/// Read request returned by [`Resource::get`].
///
/// Starts from a snapshot of the handle's parameters; the setters below only affect this request.
#[derive(Debug)]
pub struct GetRequest<'a> {
	resource: &'a Resource,
	query: Query,
	parameters: ParamsBuilder,
}
impl GetRequest<'_> {
	/// Caps the number of records.
	pub fn limit(mut self, limit: u32) -> Self {
		self.parameters.limit(limit);

		self
	}

	/// Skips the first `offset` records.
	pub fn offset(mut self, offset: u32) -> Self {
		self.parameters.offset(offset);

		self
	}

	/// Restricts the returned fields.
	pub fn fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.parameters.fields(fields);

		self
	}

	/// Query pairs this request will send.
	pub fn query_pairs(&self) -> BTreeMap<String, String> {
		let mut parameters = self.parameters.clone();

		if !self.query.is_empty() {
			parameters.query(self.query.encode());
		}

		parameters.as_map()
	}

	/// Sends the request.
	pub async fn send(self) -> Result<Response> {
		let query = self.query_pairs();

		self.resource.transport.request("get", Method::GET, &self.resource.path(), &query, None).await
	}
}

/// Accepts `/segment[/segment...]` where segments use `[A-Za-z0-9._-]` only.
fn validate_path(path: &str) -> Result<(), UsageError> {
	let invalid = |reason| UsageError::InvalidPath { path: path.to_owned(), reason };
	let Some(rest) = path.strip_prefix('/') else {
		return Err(invalid("must start with `/`"));
	};

	if rest.is_empty() || rest.ends_with('/') {
		return Err(invalid("must not end with `/`"));
	}
	if rest.split('/').any(str::is_empty) {
		return Err(invalid("must not contain empty segments"));
	}
	if !rest.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-')) {
		return Err(invalid("may only contain letters, digits, `.`, `_`, `-` and `/`"));
	}

	Ok(())
}
