//! Record selectors for Table API reads.

// self
use crate::_prelude::*;

/// Selects the records a request applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
	/// Encoded query string, e.g. `active=true^priority=1`.
	Encoded(String),
	/// Field equality map, encoded as `k=v` pairs joined with `^`.
	Fields(BTreeMap<String, String>),
}
impl Query {
	/// Query matching every record.
	pub fn all() -> Self {
		Self::Fields(BTreeMap::new())
	}

	/// Builds a field equality query.
	pub fn fields<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self::Fields(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}

	/// Renders the `sysparm_query` value.
	pub fn encode(&self) -> String {
		match self {
			Self::Encoded(raw) => raw.clone(),
			Self::Fields(fields) =>
				fields.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("^"),
		}
	}

	/// Returns `true` when the query selects every record.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Encoded(raw) => raw.is_empty(),
			Self::Fields(fields) => fields.is_empty(),
		}
	}
}
impl Default for Query {
	fn default() -> Self {
		Self::all()
	}
}
impl From<&str> for Query {
	fn from(value: &str) -> Self {
		Self::Encoded(value.to_owned())
	}
}
impl From<String> for Query {
	fn from(value: String) -> Self {
		Self::Encoded(value)
	}
}
impl From<BTreeMap<String, String>> for Query {
	fn from(value: BTreeMap<String, String>) -> Self {
		Self::Fields(value)
	}
}
impl<K, V, const N: usize> From<[(K, V); N]> for Query
where
	K: Into<String>,
	V: Into<String>,
{
	fn from(value: [(K, V); N]) -> Self {
		Self::fields(value)
	}
}
