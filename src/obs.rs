//! Optional observability for transport calls and sync operations.
//!
//! Every observed operation goes through [`observe`], which records an attempt, runs the future
//! inside an operation span, then records the outcome and latency.
//!
//! # Feature Flags
//!
//! - `tracing`: spans named `analytics_connector.operation` carrying `operation` and `stage`, and a
//!   `debug!` event with the elapsed time (plus the error on failure) when an operation finishes.
//! - `metrics`: counter `analytics_connector_operation_total` labeled by `operation` + `outcome`,
//!   and histogram `analytics_connector_operation_duration_seconds` labeled the same way.

mod metrics;
mod tracing;

pub(crate) use metrics::*;
pub(crate) use tracing::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Runs `fut` as one observed `kind` operation at `stage`.
pub(crate) async fn observe<F, T, E>(
	kind: OperationKind,
	stage: &'static str,
	fut: F,
) -> Result<T, E>
where
	F: Future<Output = Result<T, E>>,
	E: Display,
{
	record_outcome(kind, Outcome::Attempt);

	let started = Instant::now();
	let result = instrument(kind, stage, fut).await;
	let outcome = Outcome::of(&result);
	let elapsed = started.elapsed();

	record_outcome(kind, outcome);
	record_latency(kind, outcome, elapsed);
	finished(kind, stage, elapsed, result.as_ref().err().map(|e| e as &dyn Display));

	result
}

/// Operations observed by the connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Single HTTP round trip through the transport core.
	HttpCall,
	/// Platform sign-in.
	SignIn,
	/// Resource listing for a resource type.
	ListResources,
	/// Entitlement listing for a resource.
	ListEntitlements,
	/// Grant listing for a resource.
	ListGrants,
}
impl OperationKind {
	/// Stable label used in span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::HttpCall => "http_call",
			OperationKind::SignIn => "sign_in",
			OperationKind::ListResources => "list_resources",
			OperationKind::ListEntitlements => "list_entitlements",
			OperationKind::ListGrants => "list_grants",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// An operation started.
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

	/// Maps a result onto [`Outcome::Success`] or [`Outcome::Failure`].
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		match result {
			Ok(_) => Outcome::Success,
			Err(_) => Outcome::Failure,
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
