// self
use crate::{_prelude::*, obs::Operation};

/// Future returned by [`OpSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`OpSpan::instrument`]; unchanged when tracing is off.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// `snow_context.op` span carrying the operation, its stage, and an optional request path.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Opens a span for `op` at `stage`. The `path` field starts empty.
	pub fn new(op: Operation, stage: &'static str) -> Self {
		#[cfg(not(feature = "tracing"))]
		let _ = (op, stage);

		Self {
			#[cfg(feature = "tracing")]
			span: tracing::info_span!(
				"snow_context.op",
				op = op.as_str(),
				stage,
				path = tracing::field::Empty,
			),
		}
	}

	/// Fills the `path` field with the instance path being called.
	pub fn with_path(self, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		self.span.record("path", path);
		#[cfg(not(feature = "tracing"))]
		let _ = path;

		self
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Attaches the span to `fut` so no guard lives across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Warns that refreshed OAuth tokens will not be persisted anywhere.
pub fn warn_missing_token_updater() {
	#[cfg(feature = "tracing")]
	tracing::warn!("No token updater has been set. Token refreshes will be ignored.");
}

/// Notes a token rotation without exposing the token itself.
pub fn note_token_refreshed(fingerprint: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(token = fingerprint, "Access token refreshed.");
	#[cfg(not(feature = "tracing"))]
	let _ = fingerprint;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn in_scope_returns_the_section_value() {
		let span = OpSpan::new(Operation::Connect, "basic");

		assert_eq!(span.in_scope(|| "connected"), "connected");
	}

	#[tokio::test]
	async fn instrument_keeps_future_output() {
		let span = OpSpan::new(Operation::Request, "get").with_path("/api/now/table/incident");

		assert_eq!(span.instrument(async { 42 }).await, 42);
	}
}
