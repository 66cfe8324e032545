// std
use std::time::Duration as StdDuration;
// self
use crate::obs::{OperationKind, Outcome};

pub(crate) fn record_outcome(kind: OperationKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"analytics_connector_operation_total",
		"operation" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

pub(crate) fn record_latency(kind: OperationKind, outcome: Outcome, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	metrics::histogram!(
		"analytics_connector_operation_duration_seconds",
		"operation" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.record(elapsed.as_secs_f64());
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome, elapsed);
	}
}
