//! Default query parameters (`sysparm_*`) carried by clients and resource handles.

// self
use crate::{_prelude::*, error::UsageError};

/// How reference and choice fields are rendered (`sysparm_display_value`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayValue {
	/// Display values only.
	True,
	/// Raw database values only.
	False,
	/// Both display and raw values.
	All,
}
impl DisplayValue {
	/// Returns the wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::True => "true",
			Self::False => "false",
			Self::All => "all",
		}
	}
}
impl From<bool> for DisplayValue {
	fn from(value: bool) -> Self {
		if value { Self::True } else { Self::False }
	}
}

/// Builder for the query parameters sent with every Table API request.
///
/// Setters take `&mut self` so they can be chained through the guard returned by
/// [`Resource::parameters`](crate::client::Resource::parameters).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamsBuilder {
	display_value: Option<DisplayValue>,
	query: Option<String>,
	limit: Option<u32>,
	offset: Option<u32>,
	fields: Vec<String>,
	exclude_reference_link: Option<bool>,
	suppress_pagination_header: Option<bool>,
	custom: BTreeMap<String, String>,
}
impl ParamsBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `sysparm_display_value`.
	pub fn display_value(&mut self, value: impl Into<DisplayValue>) -> &mut Self {
		self.display_value = Some(value.into());

		self
	}

	/// Sets `sysparm_query` to an encoded query string.
	pub fn query(&mut self, query: impl Into<String>) -> &mut Self {
		self.query = Some(query.into());

		self
	}

	/// Sets `sysparm_limit`.
	pub fn limit(&mut self, limit: u32) -> &mut Self {
		self.limit = Some(limit);

		self
	}

	/// Sets `sysparm_offset`.
	pub fn offset(&mut self, offset: u32) -> &mut Self {
		self.offset = Some(offset);

		self
	}

	/// Sets `sysparm_fields`.
	pub fn fields<I, S>(&mut self, fields: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields = fields.into_iter().map(Into::into).collect();

		self
	}

	/// Sets `sysparm_exclude_reference_link`.
	pub fn exclude_reference_link(&mut self, exclude: bool) -> &mut Self {
		self.exclude_reference_link = Some(exclude);

		self
	}

	/// Sets `sysparm_suppress_pagination_header`.
	pub fn suppress_pagination_header(&mut self, suppress: bool) -> &mut Self {
		self.suppress_pagination_header = Some(suppress);

		self
	}

	/// Adds arbitrary query pairs sent verbatim next to the `sysparm_*` ones.
	pub fn add_custom<I, K, V>(&mut self, pairs: I) -> &mut Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.custom.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));

		self
	}

	/// Returns the configured `sysparm_limit`.
	pub fn get_limit(&self) -> Option<u32> {
		self.limit
	}

	/// Returns the configured `sysparm_query`.
	pub fn get_query(&self) -> Option<&str> {
		self.query.as_deref()
	}

	/// Returns the custom pairs.
	pub fn custom(&self) -> &BTreeMap<String, String> {
		&self.custom
	}

	/// Renders every configured parameter as query pairs.
	///
	/// Custom pairs win over `sysparm_*` pairs with the same name.
	pub fn as_map(&self) -> BTreeMap<String, String> {
		let mut map = BTreeMap::new();

		if let Some(display_value) = self.display_value {
			map.insert("sysparm_display_value".into(), display_value.as_str().into());
		}
		if let Some(query) = &self.query {
			map.insert("sysparm_query".into(), query.clone());
		}
		if let Some(limit) = self.limit {
			map.insert("sysparm_limit".into(), limit.to_string());
		}
		if let Some(offset) = self.offset {
			map.insert("sysparm_offset".into(), offset.to_string());
		}
		if !self.fields.is_empty() {
			map.insert("sysparm_fields".into(), self.fields.join(","));
		}
		if let Some(exclude) = self.exclude_reference_link {
			map.insert("sysparm_exclude_reference_link".into(), exclude.to_string());
		}
		if let Some(suppress) = self.suppress_pagination_header {
			map.insert("sysparm_suppress_pagination_header".into(), suppress.to_string());
		}

		map.extend(self.custom.iter().map(|(k, v)| (k.clone(), v.clone())));

		map
	}
}
impl TryFrom<Value> for ParamsBuilder {
	type Error = UsageError;

	/// Validates an untyped parameters object, e.g. one read from a settings file.
	fn try_from(value: Value) -> Result<Self, Self::Error> {
		if !value.is_object() {
			return Err(UsageError::InvalidParameters {
				reason: format!("expected an object, got {}", json_kind(&value)),
			});
		}

		serde_path_to_error::deserialize(value)
			.map_err(|e| UsageError::InvalidParameters { reason: e.to_string() })
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn renders_sysparm_pairs() {
		let mut params = ParamsBuilder::new();

		params
			.display_value(DisplayValue::All)
			.query("active=true")
			.limit(10)
			.offset(20)
			.fields(["number", "short_description"])
			.exclude_reference_link(true);

		let map = params.as_map();

		assert_eq!(map.get("sysparm_display_value").map(String::as_str), Some("all"));
		assert_eq!(map.get("sysparm_query").map(String::as_str), Some("active=true"));
		assert_eq!(map.get("sysparm_limit").map(String::as_str), Some("10"));
		assert_eq!(map.get("sysparm_offset").map(String::as_str), Some("20"));
		assert_eq!(map.get("sysparm_fields").map(String::as_str), Some("number,short_description"));
		assert_eq!(map.get("sysparm_exclude_reference_link").map(String::as_str), Some("true"));
		assert!(!map.contains_key("sysparm_suppress_pagination_header"));
	}

	#[test]
	fn custom_pairs_are_included() {
		let mut params = ParamsBuilder::new();

		params.display_value(true).add_custom([("test", "test")]);

		let map = params.as_map();

		assert_eq!(map.get("test").map(String::as_str), Some("test"));
		assert_eq!(map.get("sysparm_display_value").map(String::as_str), Some("true"));
		assert!(ParamsBuilder::new().as_map().is_empty());
	}

	#[test]
	fn accepts_well_formed_objects() {
		let params = ParamsBuilder::try_from(json!({
			"display_value": "all",
			"limit": 5,
			"custom": { "test": "test" }
		}))
		.expect("Well-formed parameters should be accepted.");

		assert_eq!(params.get_limit(), Some(5));
		assert_eq!(params.custom().get("test").map(String::as_str), Some("test"));
	}

	#[test]
	fn rejects_every_malformed_shape() {
		let malformed = [
			json!({ "test": "test" }),
			json!({ "limit": "ten" }),
			json!({ "display_value": "sometimes" }),
			json!({ "custom": ["test"] }),
			json!("sysparm_limit=10"),
			json!([["test", "test"]]),
			json!(42),
			json!(null),
		];

		for value in malformed {
			let rendered = value.to_string();
			let err = ParamsBuilder::try_from(value)
				.expect_err("Malformed parameters should be rejected.");

			assert!(
				matches!(err, UsageError::InvalidParameters { .. }),
				"Unexpected error for {rendered}: {err:?}"
			);
		}
	}
}
