//! Option-driven HTTP transport used for every platform call.
//!
//! The module splits the transport into four layers:
//!
//! - [`HttpTransport`] is the only dependency on an HTTP stack. It owns the connection pool and
//!   performs exactly one round trip per call, handing the body back as a [`PendingBody`] that can
//!   be drained once.
//! - [`RequestContext`] carries cancellation and an optional deadline for a call.
//! - [`RequestOption`] values fold into a [`Request`] through [`BaseHttpClient::new_request`].
//! - [`ResponseOption`] values fold over a [`WrapperResponse`] inside [`BaseHttpClient::execute`],
//!   after the body has been buffered and before the final status check.

pub mod client;
pub mod context;
pub mod request;
pub mod response;

pub use client::*;
pub use context::*;
pub use request::*;
pub use response::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use http::Version;
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpTransport`] implementations.
pub type TransportFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + 'a + Send>>;

/// Body of a completed round trip that has not been read yet.
///
/// Awaiting the future drains the body from the network; it can only be awaited once, which is
/// what lets [`BaseHttpClient::execute`] guarantee a single read per call.
pub type PendingBody<E> = TransportFuture<'static, Bytes, E>;

/// Abstraction over HTTP stacks capable of performing a single request/response exchange.
///
/// Implementations must be `Send + Sync + 'static` so one instance (and its connection pool) can
/// be shared by every [`BaseHttpClient`] clone and called concurrently. They must not retry,
/// follow extra policy, or read the body eagerly; [`BaseHttpClient`] takes care of buffering.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves once the response head is available.
	fn round_trip(
		&self,
		request: Request,
	) -> TransportFuture<'_, RawResponse<Self::TransportError>, Self::TransportError>;
}

/// Response head plus an undrained body, as produced by an [`HttpTransport`].
pub struct RawResponse<E> {
	/// HTTP status code.
	pub status: StatusCode,
	/// HTTP protocol version.
	pub version: Version,
	/// Response headers.
	pub headers: HeaderMap,
	/// Body that has not been read from the network yet.
	pub body: PendingBody<E>,
}
impl<E> Debug for RawResponse<E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RawResponse")
			.field("status", &self.status)
			.field("version", &self.version)
			.field("headers", &self.headers)
			.finish_non_exhaustive()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The wrapped client owns the connection pool; cloning the wrapper shares it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn round_trip(
		&self,
		request: Request,
	) -> TransportFuture<'_, RawResponse<Self::TransportError>, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let Request { method, url, headers, body, .. } = request;
			let mut outbound = reqwest::Request::new(method, url);

			*outbound.headers_mut() = headers;

			if let Some(body) = body {
				*outbound.body_mut() = Some(body.into());
			}

			let response = client.execute(outbound).await?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let body: PendingBody<ReqwestError> = Box::pin(response.bytes());

			Ok::<_, ReqwestError>(RawResponse { status, version, headers, body })
		})
	}
}
