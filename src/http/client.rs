//! Transport core: request construction and the buffered, option-folding round trip.

// self
use crate::{
	_prelude::*,
	error::DoError,
	http::{
		HttpTransport, RawResponse, Request, RequestContext, RequestOption, Response,
		ResponseOption,
	},
	obs::{self, OperationKind},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestHttpClient = BaseHttpClient<ReqwestTransport>;

/// HTTP client that composes request options, a single round trip, and response options.
///
/// The client holds no per-call state; clones share the injected transport (and with it the
/// connection pool), so concurrent calls are independent.
pub struct BaseHttpClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
}
impl<T> BaseHttpClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps a transport.
	pub fn new(transport: impl Into<Arc<T>>) -> Self {
		Self { transport: transport.into() }
	}

	/// Shared transport handle.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Builds a request bound to `context` by folding `options` left to right.
	///
	/// See [`Request::new`] for the folding rules.
	pub fn new_request(
		&self,
		context: &RequestContext,
		method: Method,
		url: &Url,
		options: &[&dyn RequestOption],
	) -> Result<Request> {
		Request::new(context, method, url, options)
	}

	/// Executes one round trip, buffers the body, and folds `options` over the response.
	///
	/// - Transport failures (including cancellation and deadlines) return a [`DoError`] without a
	///   response.
	/// - The first failing option stops the fold; its error is returned with the response.
	/// - When every option succeeds, statuses outside `[200, 300)` fail with
	///   [`Error::UnexpectedStatus`], again with the response attached.
	pub async fn execute(
		&self,
		request: Request,
		options: &mut [&mut dyn ResponseOption],
	) -> Result<Response, DoError> {
		obs::observe(OperationKind::HttpCall, "execute", self.round_trip(request, options)).await
	}

	async fn round_trip(
		&self,
		request: Request,
		options: &mut [&mut dyn ResponseOption],
	) -> Result<Response, DoError> {
		let context = request.context.clone();
		let RawResponse { status, version, headers, body } = context
			.run(self.transport.round_trip(request))
			.await
			.map_err(DoError::without_response)?;
		let body = context.run(body).await.map_err(DoError::without_response)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(status = status.as_u16(), bytes = body.len(), "buffered response body");

		let response = Response::new(status, version, headers, body);
		let wrapped = response.wrap();

		for option in options.iter_mut() {
			if let Err(e) = option.apply(&wrapped) {
				#[cfg(feature = "tracing")]
				tracing::debug!(status = wrapped.status_code, error = %e, "response option failed");

				return Err(DoError::with_response(response, e));
			}
		}

		if !response.is_success() {
			return Err(DoError::with_response(
				response,
				Error::UnexpectedStatus { status: status.as_u16() },
			));
		}

		Ok(response)
	}
}
#[cfg(feature = "reqwest")]
impl BaseHttpClient<ReqwestTransport> {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self::new(ReqwestTransport::with_client(client))
	}
}
#[cfg(feature = "reqwest")]
impl Default for BaseHttpClient<ReqwestTransport> {
	fn default() -> Self {
		Self::new(ReqwestTransport::default())
	}
}
impl<T> Clone for BaseHttpClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { transport: Arc::clone(&self.transport) }
	}
}
impl<T> Debug for BaseHttpClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BaseHttpClient").finish_non_exhaustive()
	}
}
