// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, obs::OperationKind};

#[cfg(feature = "tracing")]
pub(crate) type Instrumented<F> = tracing::instrument::Instrumented<F>;
#[cfg(not(feature = "tracing"))]
pub(crate) type Instrumented<F> = F;

/// Wraps `fut` in an `analytics_connector.operation` span without holding a guard across awaits.
pub(crate) fn instrument<F>(kind: OperationKind, stage: &'static str, fut: F) -> Instrumented<F>
where
	F: Future,
{
	#[cfg(feature = "tracing")]
	{
		use tracing::Instrument;

		fut.instrument(tracing::info_span!(
			"analytics_connector.operation",
			operation = %kind,
			stage
		))
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, stage);

		fut
	}
}

pub(crate) fn finished(
	kind: OperationKind,
	stage: &'static str,
	elapsed: StdDuration,
	error: Option<&dyn Display>,
) {
	#[cfg(feature = "tracing")]
	match error {
		Some(error) => tracing::debug!(
			operation = %kind,
			stage,
			elapsed_ms = elapsed.as_millis() as u64,
			%error,
			"operation failed"
		),
		None => tracing::debug!(
			operation = %kind,
			stage,
			elapsed_ms = elapsed.as_millis() as u64,
			"operation finished"
		),
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, stage, elapsed, error);
	}
}
