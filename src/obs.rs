//! Optional observability helpers.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `snow_context.op` with the `op`,
//!   `stage`, and `path` fields, plus the warning raised when OAuth runs without a token updater.
//! - Enable `metrics` to increment the `snow_context_operation_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Lazy construction of a context's connection holder.
	Connect,
	/// Table API request.
	Request,
	/// Password-grant token creation.
	TokenCreate,
	/// Refresh-grant token rotation.
	TokenRefresh,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Connect => "connect",
			Operation::Request => "request",
			Operation::TokenCreate => "token_create",
			Operation::TokenRefresh => "token_refresh",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the success/failure outcome matching `result`.
pub fn record_result<T, E>(op: Operation, result: &Result<T, E>) {
	match result {
		Ok(_) => record_outcome(op, Outcome::Success),
		Err(_) => record_outcome(op, Outcome::Failure),
	}
}
