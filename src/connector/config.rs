//! Platform connection settings and their validating builder.

// std
use std::net::IpAddr;
// self
use crate::{_prelude::*, connector::Secret, error::ConfigError};

/// Default number of users requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Largest page size the platform accepts.
pub const MAX_PAGE_SIZE: u32 = 1_000;
/// REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "3.22";

/// Errors raised while validating [`PlatformConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum PlatformConfigError {
	/// Base URL was not provided.
	#[error("Missing platform base URL.")]
	MissingBaseUrl,
	/// Base URL must use HTTPS unless it points at a loopback host.
	#[error("The platform base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry path segments.
	#[error("The platform base URL cannot be used as a base: {url}.")]
	OpaqueBaseUrl {
		/// URL that failed validation.
		url: String,
	},
	/// API version must look like `3.22`.
	#[error("API version `{version}` is not of the form `<major>.<minor>`.")]
	InvalidApiVersion {
		/// Offending version.
		version: String,
	},
	/// Page size out of range.
	#[error("Page size {page_size} is outside 1..=1000.")]
	InvalidPageSize {
		/// Offending page size.
		page_size: u32,
	},
	/// Personal access token name is required.
	#[error("Missing personal access token name.")]
	MissingTokenName,
	/// Personal access token secret is required.
	#[error("Missing personal access token secret.")]
	MissingTokenSecret,
}

/// Validated connection settings for the analytics platform.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PlatformConfigBuilder")]
pub struct PlatformConfig {
	base_url: Url,
	site_content_url: String,
	api_version: String,
	page_size: u32,
	token_name: String,
	token_secret: Secret,
}
impl PlatformConfig {
	/// Starts a builder.
	pub fn builder() -> PlatformConfigBuilder {
		PlatformConfigBuilder::default()
	}

	/// Server base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Site content URL used at sign-in; empty for the default site.
	pub fn site_content_url(&self) -> &str {
		&self.site_content_url
	}

	/// REST API version.
	pub fn api_version(&self) -> &str {
		&self.api_version
	}

	/// Users requested per page.
	pub fn page_size(&self) -> u32 {
		self.page_size
	}

	/// Personal access token name.
	pub fn token_name(&self) -> &str {
		&self.token_name
	}

	/// Personal access token secret.
	pub fn token_secret(&self) -> &Secret {
		&self.token_secret
	}

	/// Builds `{base}/api/{version}/{segments..}`.
	pub fn api_url(&self, segments: &[&str]) -> Result<Url, ConfigError> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidUrl {
				url: self.base_url.to_string(),
				source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
			})?
			.pop_if_empty()
			.extend(["api", self.api_version.as_str()])
			.extend(segments);

		Ok(url)
	}
}
impl TryFrom<PlatformConfigBuilder> for PlatformConfig {
	type Error = PlatformConfigError;

	fn try_from(builder: PlatformConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

/// Builder for [`PlatformConfig`]; also the serde shape of the configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlatformConfigBuilder {
	/// Server base URL.
	pub base_url: Option<Url>,
	/// Site content URL; empty selects the server's default site.
	#[serde(default)]
	pub site_content_url: String,
	/// REST API version; defaults to [`DEFAULT_API_VERSION`].
	pub api_version: Option<String>,
	/// Users per page; defaults to [`DEFAULT_PAGE_SIZE`].
	pub page_size: Option<u32>,
	/// Personal access token name.
	pub token_name: Option<String>,
	/// Personal access token secret.
	pub token_secret: Option<Secret>,
}
impl PlatformConfigBuilder {
	/// Sets the server base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the site content URL; pass `""` for the default site.
	pub fn site_content_url(mut self, site: impl Into<String>) -> Self {
		self.site_content_url = site.into();

		self
	}

	/// Overrides the REST API version.
	pub fn api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = Some(version.into());

		self
	}

	/// Overrides the page size.
	pub fn page_size(mut self, page_size: u32) -> Self {
		self.page_size = Some(page_size);

		self
	}

	/// Sets the personal access token credentials.
	pub fn personal_access_token(mut self, name: impl Into<String>, secret: Secret) -> Self {
		self.token_name = Some(name.into());
		self.token_secret = Some(secret);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<PlatformConfig, PlatformConfigError> {
		let base_url = self.base_url.ok_or(PlatformConfigError::MissingBaseUrl)?;

		validate_base_url(&base_url)?;

		let api_version = self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());

		validate_api_version(&api_version)?;

		let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

		if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
			return Err(PlatformConfigError::InvalidPageSize { page_size });
		}

		let token_name = self
			.token_name
			.filter(|name| !name.trim().is_empty())
			.ok_or(PlatformConfigError::MissingTokenName)?;
		let token_secret = self
			.token_secret
			.filter(|secret| !secret.is_empty())
			.ok_or(PlatformConfigError::MissingTokenSecret)?;

		Ok(PlatformConfig {
			base_url,
			site_content_url: self.site_content_url.trim().to_owned(),
			api_version,
			page_size,
			token_name,
			token_secret,
		})
	}
}

fn validate_base_url(url: &Url) -> Result<(), PlatformConfigError> {
	if url.cannot_be_a_base() {
		return Err(PlatformConfigError::OpaqueBaseUrl { url: url.to_string() });
	}

	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(PlatformConfigError::InsecureBaseUrl { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

fn validate_api_version(version: &str) -> Result<(), PlatformConfigError> {
	let valid = version.split_once('.').is_some_and(|(major, minor)| {
		[major, minor]
			.iter()
			.all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
	});

	if valid {
		Ok(())
	} else {
		Err(PlatformConfigError::InvalidApiVersion { version: version.to_owned() })
	}
}
