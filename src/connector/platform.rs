//! Analytics platform REST client: sign-in, user listing, and rate-limit bookkeeping.

// crates.io
use serde::{
	Deserializer,
	de::{DeserializeOwned, Error as DeError},
};
// self
use crate::{
	_prelude::*,
	connector::{ObjectId, PlatformConfig, Secret, pagination},
	error::SyncError,
	http::{
		AcceptJson, BaseHttpClient, ErrorResponse, Header, HttpTransport, JsonBody, JsonResponse,
		RemoteError, Request, RequestContext, RequestOption, WrapperResponse,
	},
	obs::{self, OperationKind},
	rate_limit::{self, RateLimitDescription},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Header carrying the session token on authenticated calls.
pub const AUTH_HEADER: &str = "X-Tableau-Auth";

/// Platform client backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestPlatformClient = PlatformClient<ReqwestTransport>;

/// Signed-in session returned by the platform.
#[derive(Clone, Debug)]
pub struct Session {
	/// Session token sent in [`AUTH_HEADER`].
	pub token: Secret,
	/// Site the session is bound to.
	pub site_id: ObjectId,
	/// User that owns the personal access token.
	pub user_id: ObjectId,
}

/// User record as reported by the platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUser {
	/// Platform user identifier.
	pub id: String,
	/// Login name.
	pub name: String,
	/// Full display name.
	#[serde(default)]
	pub full_name: Option<String>,
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Site role, e.g. `Explorer` or `SiteAdministratorCreator`.
	pub site_role: String,
	/// Last sign-in as an RFC 3339 timestamp.
	#[serde(default)]
	pub last_login: Option<String>,
}

/// One page of users.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPage {
	/// Users on this page.
	pub users: Vec<PlatformUser>,
	/// 1-based page number.
	pub page_number: u32,
	/// Requested page size.
	pub page_size: u32,
	/// Users available across all pages.
	pub total_available: u64,
}
impl UserPage {
	/// Page token for the following page, if any.
	pub fn next_page_token(&self) -> Option<String> {
		pagination::next_page_token(self.page_number, self.page_size, self.total_available)
	}
}

/// Error payload returned by the platform: `{"error":{"summary","detail","code"}}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlatformErrorBody {
	/// Error details.
	pub error: PlatformErrorDetail,
}
impl RemoteError for PlatformErrorBody {
	fn message(&self) -> String {
		if self.error.detail.is_empty() {
			self.error.summary.clone()
		} else {
			self.error.detail.clone()
		}
	}
}

/// Inner error object.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlatformErrorDetail {
	/// Short summary.
	#[serde(default)]
	pub summary: String,
	/// Longer explanation.
	#[serde(default)]
	pub detail: String,
	/// Platform error code.
	#[serde(default)]
	pub code: String,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
	credentials: SignInCredentials<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInCredentials<'a> {
	personal_access_token_name: &'a str,
	personal_access_token_secret: &'a str,
	site: SiteRef<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteRef<'a> {
	content_url: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SignInEnvelope {
	credentials: IssuedCredentials,
}

#[derive(Debug, Default, Deserialize)]
struct IssuedCredentials {
	token: String,
	site: IdRef,
	user: IdRef,
}

#[derive(Debug, Default, Deserialize)]
struct IdRef {
	id: String,
}

#[derive(Debug, Default, Deserialize)]
struct UsersEnvelope {
	pagination: WirePagination,
	#[serde(default)]
	users: UserList,
}

#[derive(Debug, Default, Deserialize)]
struct UserList {
	#[serde(default)]
	user: Vec<PlatformUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePagination {
	#[serde(deserialize_with = "count")]
	page_number: u32,
	#[serde(deserialize_with = "count")]
	page_size: u32,
	#[serde(deserialize_with = "count")]
	total_available: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountRepr {
	Number(u64),
	Text(String),
}

// The platform renders pagination numbers as strings.
fn count<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: FromStr + TryFrom<u64>,
{
	let parsed = match CountRepr::deserialize(deserializer)? {
		CountRepr::Number(n) => T::try_from(n).map_err(|_| n.to_string()),
		CountRepr::Text(text) => text.trim().parse().map_err(|_| text),
	};

	parsed.map_err(|raw| D::Error::custom(format!("`{raw}` is not a valid count")))
}

#[derive(Debug, Default, Deserialize)]
struct UserEnvelope {
	user: PlatformUser,
}

/// REST client for the analytics platform.
///
/// The sign-in session is cached and shared; concurrent callers that find no session wait on a
/// single sign-in instead of issuing their own. A `401` on any call drops the cached session so
/// the next call signs in again.
pub struct PlatformClient<T>
where
	T: ?Sized + HttpTransport,
{
	http: BaseHttpClient<T>,
	config: PlatformConfig,
	session: RwLock<Option<Session>>,
	sign_in_gate: AsyncMutex<()>,
	last_rate_limit: Mutex<Option<RateLimitDescription>>,
}
impl<T> PlatformClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client over an existing transport core.
	pub fn new(config: PlatformConfig, http: BaseHttpClient<T>) -> Self {
		Self {
			http,
			config,
			session: RwLock::new(None),
			sign_in_gate: AsyncMutex::new(()),
			last_rate_limit: Mutex::new(None),
		}
	}

	/// Connection settings.
	pub fn config(&self) -> &PlatformConfig {
		&self.config
	}

	/// Underlying transport core.
	pub fn http(&self) -> &BaseHttpClient<T> {
		&self.http
	}

	/// Most recent complete set of rate-limit headers observed on any call, error responses
	/// included.
	pub fn last_rate_limit(&self) -> Option<RateLimitDescription> {
		*self.last_rate_limit.lock()
	}

	/// Drops the cached session.
	pub fn invalidate_session(&self) {
		*self.session.write() = None;
	}

	/// Returns the cached session, signing in first when none is cached.
	pub async fn session(&self, context: &RequestContext) -> Result<Session> {
		if let Some(session) = self.cached_session() {
			return Ok(session);
		}

		let _gate = self.sign_in_gate.lock().await;

		// Another caller may have signed in while this one waited.
		if let Some(session) = self.cached_session() {
			return Ok(session);
		}

		let session = self.sign_in(context).await?;

		*self.session.write() = Some(session.clone());

		Ok(session)
	}

	/// Fetches one page of users (1-based).
	pub async fn list_users(&self, context: &RequestContext, page_number: u32) -> Result<UserPage> {
		let session = self.session(context).await?;
		let page_size = self.config.page_size();
		let mut url = self.config.api_url(&["sites", &*session.site_id, "users"])?;

		url.query_pairs_mut()
			.append_pair("pageSize", &page_size.to_string())
			.append_pair("pageNumber", &page_number.to_string());

		let auth = Header::sensitive(AUTH_HEADER, &session.token);
		let request = self.http.new_request(context, Method::GET, &url, &[&AcceptJson, &auth])?;
		let envelope: UsersEnvelope = self.call(request).await?;

		Ok(UserPage {
			users: envelope.users.user,
			page_number: envelope.pagination.page_number,
			page_size: envelope.pagination.page_size,
			total_available: envelope.pagination.total_available,
		})
	}

	/// Fetches every user, following pages until the reported total is covered.
	pub async fn get_paginated_users(&self, context: &RequestContext) -> Result<Vec<PlatformUser>> {
		let mut users = Vec::new();
		let mut page_number = 1;

		loop {
			let page = self.list_users(context, page_number).await?;
			let next = page.next_page_token();
			let empty = page.users.is_empty();

			users.extend(page.users);

			match next {
				Some(token) if !empty =>
					page_number = pagination::page_number(Some(token.as_str()))?,
				_ => break,
			}
		}

		Ok(users)
	}

	/// Fetches a single user.
	pub async fn get_user(&self, context: &RequestContext, user_id: &str) -> Result<PlatformUser> {
		let session = self.session(context).await?;
		let url = self.config.api_url(&["sites", &*session.site_id, "users", user_id])?;
		let auth = Header::sensitive(AUTH_HEADER, &session.token);
		let request = self.http.new_request(context, Method::GET, &url, &[&AcceptJson, &auth])?;
		let envelope: UserEnvelope = self.call(request).await?;

		Ok(envelope.user)
	}

	fn cached_session(&self) -> Option<Session> {
		self.session.read().clone()
	}

	async fn sign_in(&self, context: &RequestContext) -> Result<Session> {
		obs::observe(OperationKind::SignIn, "sign_in", self.request_session(context)).await
	}

	async fn request_session(&self, context: &RequestContext) -> Result<Session> {
		let url = self.config.api_url(&["auth", "signin"])?;
		let body = JsonBody(SignInRequest {
			credentials: SignInCredentials {
				personal_access_token_name: self.config.token_name(),
				personal_access_token_secret: self.config.token_secret().expose(),
				site: SiteRef { content_url: self.config.site_content_url() },
			},
		});
		let options: [&dyn RequestOption; 2] = [&body, &AcceptJson];
		let request = self.http.new_request(context, Method::POST, &url, &options)?;
		let envelope: SignInEnvelope = self.call(request).await?;
		let IssuedCredentials { token, site, user } = envelope.credentials;
		let session = Session {
			token: Secret::new(token),
			site_id: ObjectId::new(site.id).map_err(SyncError::from)?,
			user_id: ObjectId::new(user.id).map_err(SyncError::from)?,
		};

		#[cfg(feature = "tracing")]
		tracing::debug!(site_id = %session.site_id, user_id = %session.user_id, "signed in");

		Ok(session)
	}

	async fn call<D>(&self, request: Request) -> Result<D>
	where
		D: Default + Send + DeserializeOwned,
	{
		let mut payload = D::default();
		let mut remote = PlatformErrorBody::default();
		let mut observed = None;
		// Quotas are bookkeeping here; partial or malformed headers count as unobserved.
		let mut observe_rate_limit = |response: &WrapperResponse| -> Result<()> {
			match rate_limit::extract_rate_limit_data(&response.headers) {
				Ok(description) => observed = description,
				Err(e) => {
					#[cfg(feature = "tracing")]
					tracing::debug!(error = %e, "ignoring unusable rate-limit headers");
					#[cfg(not(feature = "tracing"))]
					let _ = e;
				},
			}

			Ok(())
		};
		let result = self
			.http
			.execute(
				request,
				&mut [
					&mut observe_rate_limit,
					&mut ErrorResponse::new(&mut remote),
					&mut JsonResponse::new(&mut payload),
				],
			)
			.await;

		if observed.is_some() {
			*self.last_rate_limit.lock() = observed;
		}
		if let Err(e) = result {
			if e.response.as_ref().is_some_and(|r| r.status() == StatusCode::UNAUTHORIZED) {
				self.invalidate_session();
			}

			#[cfg(feature = "tracing")]
			tracing::debug!(code = %remote.error.code, error = %e.error, "platform call failed");

			return Err(e.into());
		}

		Ok(payload)
	}
}
impl<T> Debug for PlatformClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PlatformClient")
			.field("config", &self.config)
			.field("signed_in", &self.session.read().is_some())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn error_message_prefers_detail() {
		let body: PlatformErrorBody = serde_json::from_str(
			r#"{"error":{"summary":"Not Found","detail":"User 42 is gone.","code":"404002"}}"#,
		)
		.expect("Error fixture should decode.");

		assert_eq!(body.message(), "User 42 is gone.");

		let body: PlatformErrorBody =
			serde_json::from_str(r#"{"error":{"summary":"Forbidden"}}"#)
				.expect("Error fixture should decode.");

		assert_eq!(body.message(), "Forbidden");
	}

	#[test]
	fn pagination_numbers_accept_strings_and_numbers() {
		let envelope: UsersEnvelope = serde_json::from_str(
			r#"{"pagination":{"pageNumber":"2","pageSize":100,"totalAvailable":"250"},
			"users":{"user":[{"id":"u-1","name":"ana","siteRole":"Viewer"}]}}"#,
		)
		.expect("Users fixture should decode.");

		assert_eq!(envelope.pagination.page_number, 2);
		assert_eq!(envelope.pagination.page_size, 100);
		assert_eq!(envelope.pagination.total_available, 250);
		assert_eq!(envelope.users.user[0].site_role, "Viewer");
		assert!(
			serde_json::from_str::<WirePagination>(
				r#"{"pageNumber":"two","pageSize":"1","totalAvailable":"1"}"#
			)
			.is_err()
		);
	}

	#[test]
	fn empty_user_list_is_allowed() {
		let envelope: UsersEnvelope = serde_json::from_str(
			r#"{"pagination":{"pageNumber":"1","pageSize":"100","totalAvailable":"0"},"users":{}}"#,
		)
		.expect("Empty users fixture should decode.");

		assert!(envelope.users.user.is_empty());
	}

	#[test]
	fn next_page_token_follows_total() {
		let page = UserPage { users: Vec::new(), page_number: 1, page_size: 2, total_available: 3 };

		assert_eq!(page.next_page_token().as_deref(), Some("2"));
	}
}
