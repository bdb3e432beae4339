//! Per-context connection holder and the slot the host context carries it in.
//!
//! The host owns one [`SnowContext`] value per request (or per unit of work) and passes it to
//! every [`Snow`](crate::snow::Snow) operation. The connection lives and dies with that value;
//! nothing here is shared between contexts.

// self
use crate::{
	_prelude::*,
	client::{Resource, SnowClient},
};

/// Base path of the Table API.
pub const DEFAULT_BASE_PATH: &str = "/api/now";

/// Host-provided state that can carry a connection holder.
pub trait SnowContext {
	/// Slot holding this context's connection, `None` until first use.
	fn snow_slot(&mut self) -> &mut Option<Connection>;
}

/// Stock context for hosts that do not have their own request state type.
#[derive(Debug, Default)]
pub struct AppContext {
	snow: Option<Connection>,
}
impl AppContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the connection if one has been created.
	pub fn connection(&self) -> Option<&Connection> {
		self.snow.as_ref()
	}
}
impl SnowContext for AppContext {
	fn snow_slot(&mut self) -> &mut Option<Connection> {
		&mut self.snow
	}
}
impl SnowContext for Option<Connection> {
	fn snow_slot(&mut self) -> &mut Option<Connection> {
		self
	}
}

/// Cache key for a resource: its base and API paths, compared as a pair.
///
/// Displays as `snow__{base_path}.{api_path}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
	base_path: String,
	api_path: String,
}
impl ResourceId {
	/// Derives the identifier for `(base_path, api_path)`.
	pub fn new(base_path: &str, api_path: &str) -> Self {
		Self { base_path: base_path.to_owned(), api_path: api_path.to_owned() }
	}

	/// Base path half of the key.
	pub fn base_path(&self) -> &str {
		&self.base_path
	}

	/// API path half of the key.
	pub fn api_path(&self) -> &str {
		&self.api_path
	}
}
impl Display for ResourceId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "snow__{}.{}", self.base_path, self.api_path)
	}
}

/// One client plus the resource handles built through it in the owning context.
#[derive(Debug)]
pub struct Connection {
	client: SnowClient,
	resources: HashMap<ResourceId, Arc<Resource>>,
}
impl Connection {
	/// Wraps a freshly built client with an empty resource cache.
	pub fn new(client: SnowClient) -> Self {
		Self { client, resources: HashMap::new() }
	}

	/// The context's client.
	pub fn client(&self) -> &SnowClient {
		&self.client
	}

	/// Mutable access to the context's client.
	pub fn client_mut(&mut self) -> &mut SnowClient {
		&mut self.client
	}

	/// Cached resource handles.
	pub fn resources(&self) -> &HashMap<ResourceId, Arc<Resource>> {
		&self.resources
	}

	/// Returns the cached handle for `(base_path, api_path)` with its parameters reset to the
	/// client defaults, or builds and caches a new one.
	///
	/// Resetting discards anything a previous caller added to the handle's parameters; every
	/// holder of the returned `Arc` observes the reset.
	pub fn resource(&mut self, base_path: &str, api_path: &str) -> Result<Arc<Resource>> {
		let id = ResourceId::new(base_path, api_path);

		if let Some(resource) = self.resources.get(&id) {
			resource.set_parameters(self.client.parameters().clone());

			return Ok(Arc::clone(resource));
		}

		let resource = Arc::new(self.client.resource(base_path, api_path)?);

		self.resources.insert(id, Arc::clone(&resource));

		Ok(resource)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet, client::BasicClient};

	fn connection() -> Connection {
		Connection::new(
			BasicClient::new(&_preludet::basic_config(), None)
				.expect("Basic client should build from fixture config.")
				.into(),
		)
	}

	#[test]
	fn resource_ids_are_deterministic() {
		let a = ResourceId::new(DEFAULT_BASE_PATH, "/table/incident");

		assert_eq!(a, ResourceId::new("/api/now", "/table/incident"));
		assert_eq!(a.to_string(), "snow__/api/now./table/incident");
		assert_ne!(a, ResourceId::new(DEFAULT_BASE_PATH, "/table/problem"));
	}

	#[test]
	fn resource_ids_do_not_collide_on_the_separator() {
		let mut connection = connection();
		let dotted_base = connection
			.resource("/api/now.v2", "/table")
			.expect("Dotted base path should be accepted.");
		let dotted_api = connection
			.resource("/api/now", "/v2./table")
			.expect("Dotted API path should be accepted.");

		assert_eq!(
			ResourceId::new("/api/now.v2", "/table").to_string(),
			ResourceId::new("/api/now", "/v2./table").to_string()
		);
		assert_ne!(ResourceId::new("/api/now.v2", "/table"), ResourceId::new("/api/now", "/v2./table"));
		assert!(!Arc::ptr_eq(&dotted_base, &dotted_api));
		assert_eq!(dotted_base.path(), "/api/now.v2/table");
		assert_eq!(dotted_api.path(), "/api/now/v2./table");
		assert_eq!(connection.resources().len(), 2);
	}

	#[test]
	fn cache_hit_keeps_identity_and_resets_parameters() {
		let mut connection = connection();
		let first = connection
			.resource(DEFAULT_BASE_PATH, "/table/incident")
			.expect("First lookup should build the resource.");

		first.parameters().add_custom([("test", "test")]);

		assert_eq!(first.parameters().custom().get("test").map(String::as_str), Some("test"));

		let second = connection
			.resource(DEFAULT_BASE_PATH, "/table/incident")
			.expect("Second lookup should hit the cache.");

		assert!(Arc::ptr_eq(&first, &second));
		assert!(first.parameters().custom().is_empty());
		assert_eq!(connection.resources().len(), 1);
	}

	#[test]
	fn slot_starts_empty() {
		let mut ctx = AppContext::new();

		assert!(ctx.connection().is_none());

		*ctx.snow_slot() = Some(connection());

		assert!(ctx.connection().is_some());
	}
}
