//! Identity-governance connector for an analytics platform: license, user, and grant sync on top
//! of a composable, option-driven HTTP transport that drains every response body exactly once.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod connector;
pub mod error;
pub mod http;
pub mod obs;
pub mod rate_limit;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		connector::{Connector, PlatformClient, PlatformConfig, ReqwestConnector, Secret},
		http::ReqwestHttpClient,
	};

	/// Site content URL used by test configurations.
	pub const TEST_SITE: &str = "finance";
	/// Personal access token name used by test configurations.
	pub const TEST_TOKEN_NAME: &str = "sync-bot";
	/// Personal access token secret used by test configurations.
	pub const TEST_TOKEN_SECRET: &str = "pat-secret";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Platform configuration pointing at `base_url` with the test credentials.
	pub fn test_platform_config(base_url: &str, page_size: u32) -> PlatformConfig {
		PlatformConfig::builder()
			.base_url(Url::parse(base_url).expect("Mock server URL should parse."))
			.site_content_url(TEST_SITE)
			.page_size(page_size)
			.personal_access_token(TEST_TOKEN_NAME, Secret::new(TEST_TOKEN_SECRET))
			.build()
			.expect("Test platform configuration should validate.")
	}

	/// Constructs a [`Connector`] over the insecure test client, returning the shared platform
	/// client alongside it.
	pub fn build_reqwest_test_connector(
		base_url: &str,
		page_size: u32,
	) -> (ReqwestConnector, Arc<PlatformClient<crate::http::ReqwestTransport>>) {
		let client = Arc::new(PlatformClient::new(
			test_platform_config(base_url, page_size),
			test_reqwest_http_client(),
		));

		(Connector::new(Arc::clone(&client)), client)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use bytes::Bytes;
	pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
