//! Cancellation and deadline context carried by every request.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::TransportError};

/// Execution context bound to a [`Request`](crate::http::Request).
///
/// Clones share one cancellation token, so cancelling any clone aborts every in-flight call that
/// was built from it. No deadline is imposed unless one is configured.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
	cancellation: CancellationToken,
	deadline: Option<Instant>,
}
impl RequestContext {
	/// Creates a context without a deadline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Bounds the context by `timeout`, measured from now.
	///
	/// An earlier deadline that is already set wins.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		match Instant::now().checked_add(timeout) {
			Some(deadline) => self.with_deadline(deadline),
			None => self,
		}
	}

	/// Bounds the context by an absolute deadline. An earlier deadline that is already set wins.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));

		self
	}

	/// Cancels the context and every clone of it.
	pub fn cancel(&self) {
		self.cancellation.cancel();
	}

	/// Returns true once the context has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.is_cancelled()
	}

	/// Configured deadline, if any.
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Drives `fut` to completion unless the context is cancelled or its deadline elapses first.
	///
	/// Errors produced by `fut` are wrapped as [`TransportError::Network`].
	pub async fn run<F, T, E>(&self, fut: F) -> Result<T, TransportError>
	where
		F: Future<Output = Result<T, E>>,
		E: 'static + Send + Sync + StdError,
	{
		if self.is_cancelled() {
			return Err(TransportError::Cancelled);
		}

		let guarded = async {
			tokio::select! {
				biased;
				_ = self.cancellation.cancelled() => Err(TransportError::Cancelled),
				result = fut => result.map_err(TransportError::network),
			}
		};

		match self.deadline {
			Some(deadline) => tokio::time::timeout_at(deadline, guarded)
				.await
				.map_err(|_| TransportError::TimedOut)?,
			None => guarded.await,
		}
	}
}
