//! Buffered responses and the response options that fold over them.

// std
use std::{borrow::Cow, io::Cursor};
// crates.io
use http::{Version, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{DecodeError, ResponseError},
	rate_limit::{self, RateLimitDescription, RateLimitError},
};

/// Response returned to callers once the body has been drained from the network.
///
/// The body is held in memory, so it can be read any number of times without further I/O.
#[derive(Clone, Debug)]
pub struct Response {
	status: StatusCode,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
}
impl Response {
	/// Assembles a response from its parts.
	pub fn new(status: StatusCode, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self { status, version, headers, body }
	}

	/// HTTP status code.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// HTTP protocol version.
	pub fn version(&self) -> Version {
		self.version
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Buffered body bytes.
	pub fn body(&self) -> &Bytes {
		&self.body
	}

	/// Returns a fresh reader positioned at the start of the body.
	///
	/// Every call yields an independent view; reading one never consumes another.
	pub fn body_reader(&self) -> Cursor<Bytes> {
		Cursor::new(self.body.clone())
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Decodes the body as JSON.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		decode_json(self.status.as_u16(), &self.body)
	}

	/// Returns true for statuses in `[200, 300)`.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Snapshot handed to response options.
	pub fn wrap(&self) -> WrapperResponse {
		let status = match self.status.canonical_reason() {
			Some(reason) => format!("{} {reason}", self.status.as_str()),
			None => self.status.as_str().to_owned(),
		};

		WrapperResponse {
			headers: self.headers.clone(),
			body: self.body.clone(),
			status,
			status_code: self.status.as_u16(),
		}
	}
}

/// Captured, buffered view of a response that every [`ResponseOption`] reads.
#[derive(Clone, Debug)]
pub struct WrapperResponse {
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body bytes.
	pub body: Bytes,
	/// Status line, e.g. `429 Too Many Requests`.
	pub status: String,
	/// Numeric status code.
	pub status_code: u16,
}
impl WrapperResponse {
	/// Returns true for statuses in `[200, 300)`.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status_code)
	}

	/// Raw `Content-Type` header, if present and valid UTF-8.
	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
	}

	/// Returns true when the `Content-Type` header names a JSON media type.
	pub fn is_json(&self) -> bool {
		self.content_type().is_some_and(is_json_content_type)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Decodes the body as JSON.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		decode_json(self.status_code, &self.body)
	}
}

/// Deferred inspection of a [`WrapperResponse`].
///
/// Options run strictly in list order and the first error stops the fold. Plain closures taking a
/// [`WrapperResponse`] are options too.
pub trait ResponseOption
where
	Self: Send,
{
	/// Inspects the response, writing into caller-owned destinations as needed.
	fn apply(&mut self, response: &WrapperResponse) -> Result<()>;
}
impl<F> ResponseOption for F
where
	F: Send + FnMut(&WrapperResponse) -> Result<()>,
{
	fn apply(&mut self, response: &WrapperResponse) -> Result<()> {
		self(response)
	}
}

/// Decodes the body into a caller-supplied destination.
///
/// The destination is only written when decoding succeeds.
#[derive(Debug)]
pub struct JsonResponse<'a, T>(&'a mut T);
impl<'a, T> JsonResponse<'a, T> {
	/// Targets `destination`.
	pub fn new(destination: &'a mut T) -> Self {
		Self(destination)
	}
}
impl<T> ResponseOption for JsonResponse<'_, T>
where
	T: Send + DeserializeOwned,
{
	fn apply(&mut self, response: &WrapperResponse) -> Result<()> {
		*self.0 = response.json()?;

		Ok(())
	}
}

/// Error payload shape exposing a human-readable message.
pub trait RemoteError {
	/// Message reported by the remote side.
	fn message(&self) -> String;
}

/// Classifies non-2xx responses using a caller-supplied error shape.
///
/// - Successful statuses pass through untouched.
/// - Non-JSON bodies fail with [`ResponseError::Raw`] carrying the body text verbatim.
/// - JSON bodies that do not match `E` fail with [`ResponseError::Unknown`].
/// - JSON bodies that match fail with [`ResponseError::Detailed`], and the decoded value is
///   written to the destination.
///
/// Place this option before [`JsonResponse`] so error bodies are not decoded as payloads.
#[derive(Debug)]
pub struct ErrorResponse<'a, E>(&'a mut E);
impl<'a, E> ErrorResponse<'a, E> {
	/// Targets `destination`.
	pub fn new(destination: &'a mut E) -> Self {
		Self(destination)
	}
}
impl<E> ResponseOption for ErrorResponse<'_, E>
where
	E: Send + DeserializeOwned + RemoteError,
{
	fn apply(&mut self, response: &WrapperResponse) -> Result<()> {
		if response.is_success() {
			return Ok(());
		}

		let status = response.status_code;

		if !response.is_json() {
			return Err(ResponseError::Raw { status, body: response.text().into_owned() }.into());
		}

		let Ok(decoded) = response.json::<E>() else {
			return Err(ResponseError::Unknown { status }.into());
		};
		let message = decoded.message();

		*self.0 = decoded;

		Err(ResponseError::Detailed { status, message }.into())
	}
}

enum RateLimitSlot<'a> {
	Required(&'a mut RateLimitDescription),
	Observed(&'a mut Option<RateLimitDescription>),
}

/// Parses rate-limit headers into a caller-owned [`RateLimitDescription`].
pub struct RateLimitData<'a>(RateLimitSlot<'a>);
impl<'a> RateLimitData<'a> {
	/// Requires rate-limit headers; their absence fails with [`RateLimitError::Missing`].
	pub fn new(destination: &'a mut RateLimitDescription) -> Self {
		Self(RateLimitSlot::Required(destination))
	}

	/// Records rate-limit headers when present and leaves `destination` as `None` otherwise.
	///
	/// Malformed headers still fail.
	pub fn observe(destination: &'a mut Option<RateLimitDescription>) -> Self {
		Self(RateLimitSlot::Observed(destination))
	}
}
impl Debug for RateLimitData<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mode = match self.0 {
			RateLimitSlot::Required(_) => "required",
			RateLimitSlot::Observed(_) => "observed",
		};

		f.debug_tuple("RateLimitData").field(&mode).finish()
	}
}
impl ResponseOption for RateLimitData<'_> {
	fn apply(&mut self, response: &WrapperResponse) -> Result<()> {
		let extracted = rate_limit::extract_rate_limit_data(&response.headers)?;

		match (&mut self.0, extracted) {
			(RateLimitSlot::Required(destination), Some(description)) =>
				**destination = description,
			(RateLimitSlot::Required(_), None) => return Err(RateLimitError::Missing.into()),
			(RateLimitSlot::Observed(destination), description) => **destination = description,
		}

		Ok(())
	}
}

/// Returns true for `application/json` and `+json` media types, ignoring parameters and case.
pub fn is_json_content_type(value: &str) -> bool {
	let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

	essence == "application/json" || essence.ends_with("+json")
}

fn decode_json<T>(status: u16, body: &[u8]) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de).map_err(|source| DecodeError { status, source })
}
