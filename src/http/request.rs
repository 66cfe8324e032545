//! Request options and the [`Request`] value they fold into.

// crates.io
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
// self
use crate::{_prelude::*, connector::Secret, error::ConfigError, http::RequestContext};

const APPLICATION_JSON: &str = "application/json";

/// Body and headers contributed by a single [`RequestOption`].
#[derive(Clone, Debug, Default)]
pub struct RequestParts {
	/// Body supplied by the option, if any.
	pub body: Option<Bytes>,
	/// Headers supplied by the option.
	pub headers: HeaderMap,
}
impl RequestParts {
	/// Adds (or replaces) a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets the body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Some(body.into());

		self
	}
}

/// Deferred computation contributing a body and/or headers to an outbound request.
///
/// Options are stateless and may be reused across requests. When options are folded, later
/// header writes replace earlier ones with the same name and the last option that supplies a
/// body wins. Plain closures returning [`RequestParts`] are options too.
pub trait RequestOption
where
	Self: Send + Sync,
{
	/// Produces the option's body and headers.
	fn apply(&self) -> Result<RequestParts, ConfigError>;
}
impl<F> RequestOption for F
where
	F: Send + Sync + Fn() -> Result<RequestParts, ConfigError>,
{
	fn apply(&self) -> Result<RequestParts, ConfigError> {
		self()
	}
}

/// Serializes a value as the JSON request body and sets `Content-Type: application/json`.
#[derive(Clone, Debug)]
pub struct JsonBody<T>(pub T);
impl<T> RequestOption for JsonBody<T>
where
	T: Send + Sync + Serialize,
{
	fn apply(&self) -> Result<RequestParts, ConfigError> {
		let buffer =
			serde_json::to_vec(&self.0).map_err(|source| ConfigError::Encoding { source })?;
		let RequestParts { headers, .. } = ContentTypeJson.apply()?;

		Ok(RequestParts { body: Some(buffer.into()), headers })
	}
}

/// Sets `Accept: application/json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptJson;
impl RequestOption for AcceptJson {
	fn apply(&self) -> Result<RequestParts, ConfigError> {
		Ok(RequestParts::default().with_header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON)))
	}
}

/// Sets `Content-Type: application/json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentTypeJson;
impl RequestOption for ContentTypeJson {
	fn apply(&self) -> Result<RequestParts, ConfigError> {
		Ok(RequestParts::default()
			.with_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)))
	}
}

/// Sets an arbitrary header, validated when the option is applied.
#[derive(Clone, Debug)]
pub struct Header {
	name: String,
	value: String,
	sensitive: bool,
}
impl Header {
	/// Creates a header option.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { name: name.into(), value: value.into(), sensitive: false }
	}

	/// Creates a header option whose value is hidden from `Debug` output of the built request.
	pub fn sensitive(name: impl Into<String>, secret: &Secret) -> Self {
		Self { name: name.into(), value: secret.expose().to_owned(), sensitive: true }
	}
}
impl RequestOption for Header {
	fn apply(&self) -> Result<RequestParts, ConfigError> {
		let name = HeaderName::from_bytes(self.name.as_bytes()).map_err(|source| {
			ConfigError::InvalidHeaderName { name: self.name.clone(), source }
		})?;
		let mut value = HeaderValue::from_str(&self.value).map_err(|source| {
			ConfigError::InvalidHeaderValue { name: self.name.clone(), source }
		})?;

		value.set_sensitive(self.sensitive);

		Ok(RequestParts::default().with_header(name, value))
	}
}

/// Sets `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct BearerToken(pub Secret);
impl RequestOption for BearerToken {
	fn apply(&self) -> Result<RequestParts, ConfigError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0.expose())).map_err(
			|source| ConfigError::InvalidHeaderValue { name: AUTHORIZATION.to_string(), source },
		)?;

		value.set_sensitive(true);

		Ok(RequestParts::default().with_header(AUTHORIZATION, value))
	}
}

/// Outbound request assembled from a method, target, and folded [`RequestOption`]s.
#[derive(Clone, Debug)]
pub struct Request {
	/// Context the request is bound to.
	pub context: RequestContext,
	/// HTTP method.
	pub method: Method,
	/// Fully formed target.
	pub url: Url,
	/// Accumulated headers.
	pub headers: HeaderMap,
	/// Final body, if any option supplied one.
	pub body: Option<Bytes>,
}
impl Request {
	/// Folds `options` left to right and binds the result to `context`, `method`, and `url`.
	///
	/// The fold stops at the first failing option and no request is built.
	pub fn new(
		context: &RequestContext,
		method: Method,
		url: &Url,
		options: &[&dyn RequestOption],
	) -> Result<Self> {
		let mut body = None;
		let mut headers = HeaderMap::new();

		for option in options {
			let parts = option.apply()?;

			if parts.body.is_some() {
				body = parts.body;
			}

			for (name, value) in parts.headers.iter() {
				headers.insert(name.clone(), value.clone());
			}
		}

		Ok(Self { context: context.clone(), method, url: url.clone(), headers, body })
	}
}
