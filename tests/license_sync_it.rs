// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::{GET, MockServer, POST};
use serde_json::json;
// self
use analytics_connector::{
	_preludet::*,
	connector::{
		Resource, ResourceTraits,
		license::{EXPLORER, LICENSE_RESOURCE_TYPE, LICENSES, UNLICENSED},
		user::USER_RESOURCE_TYPE,
	},
	error::{ResponseError, SyncError},
	http::RequestContext,
};

const SESSION_TOKEN: &str = "session-token";
const SITE_ID: &str = "site-1";
const SIGN_IN_PATH: &str = "/api/3.22/auth/signin";
const USERS_PATH: &str = "/api/3.22/sites/site-1/users";

async fn mock_sign_in(server: &MockServer, delay: StdDuration) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(SIGN_IN_PATH).json_body(json!({
				"credentials": {
					"personalAccessTokenName": TEST_TOKEN_NAME,
					"personalAccessTokenSecret": TEST_TOKEN_SECRET,
					"site": { "contentUrl": TEST_SITE }
				}
			}));
			then.status(200).header("content-type", "application/json").delay(delay).json_body(
				json!({
					"credentials": {
						"token": SESSION_TOKEN,
						"site": { "id": SITE_ID, "contentUrl": TEST_SITE },
						"user": { "id": "admin-1" }
					}
				}),
			);
		})
		.await
}

async fn mock_users_page(
	server: &MockServer,
	page: u32,
	total: u64,
	users: serde_json::Value,
) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(USERS_PATH)
				.header("x-tableau-auth", SESSION_TOKEN)
				.query_param("pageSize", "2")
				.query_param("pageNumber", page.to_string());
			then.status(200)
				.header("content-type", "application/json")
				.header("x-ratelimit-limit", "500")
				.header("x-ratelimit-remaining", "498")
				.header("x-ratelimit-reset", "60")
				.json_body(json!({
					"pagination": {
						"pageNumber": page.to_string(),
						"pageSize": "2",
						"totalAvailable": total.to_string()
					},
					"users": { "user": users }
				}));
		})
		.await
}

fn license(connector_resources: &[Resource], name: &str) -> Resource {
	connector_resources
		.iter()
		.find(|resource| resource.display_name == name)
		.cloned()
		.expect("License should be listed.")
}

#[tokio::test]
async fn licenses_are_static_and_expose_one_member_entitlement() {
	let server = MockServer::start_async().await;
	let (connector, _) = build_reqwest_test_connector(&server.base_url(), 2);
	let context = RequestContext::new();
	let page = connector
		.list_resources(&context, LICENSE_RESOURCE_TYPE, None, None)
		.await
		.expect("License listing should succeed without network calls.");

	assert_eq!(page.items.len(), LICENSES.len());
	assert_eq!(page.next_token, None);

	for (resource, name) in page.items.iter().zip(LICENSES) {
		assert_eq!(resource.display_name, name);
		assert_eq!(&*resource.id.resource, name.to_lowercase());

		let entitlements = connector
			.list_entitlements(&context, resource, None)
			.await
			.expect("Entitlement listing should succeed.");

		assert_eq!(entitlements.items.len(), 1);
		assert_eq!(entitlements.items[0].slug, "member");
		assert_eq!(&*entitlements.items[0].grantable_to[0], USER_RESOURCE_TYPE);
	}

	let types = connector.resource_types().expect("Resource types should build.");

	assert_eq!(types.len(), 2);
}

#[tokio::test]
async fn license_grants_follow_roles_across_pages() {
	let server = MockServer::start_async().await;
	let sign_in = mock_sign_in(&server, StdDuration::ZERO).await;
	let first = mock_users_page(
		&server,
		1,
		3,
		json!([
			{ "id": "u-1", "name": "ana", "fullName": "Ana Lima", "siteRole": "ReadOnly" },
			{ "id": "u-2", "name": "bo", "siteRole": "Unlicensed" }
		]),
	)
	.await;
	let second = mock_users_page(
		&server,
		2,
		3,
		json!([{ "id": "u-3", "name": "cy", "siteRole": "ExplorerCanPublish" }]),
	)
	.await;
	let (connector, client) = build_reqwest_test_connector(&server.base_url(), 2);
	let context = RequestContext::new();
	let licenses = connector
		.list_resources(&context, LICENSE_RESOURCE_TYPE, None, None)
		.await
		.expect("License listing should succeed.")
		.items;
	let explorer = license(&licenses, EXPLORER);
	let grants = connector
		.list_grants(&context, &explorer, None)
		.await
		.expect("Explorer grants should be computed.");
	let principals =
		grants.items.iter().map(|grant| grant.principal.resource.to_string()).collect::<Vec<_>>();

	assert_eq!(principals, ["u-1", "u-3"]);
	assert!(grants.items.iter().all(|grant| grant.entitlement.id == "license:explorer:member"));

	let unlicensed = license(&licenses, UNLICENSED);
	let grants = connector
		.list_grants(&context, &unlicensed, None)
		.await
		.expect("Unlicensed grants should be computed.");

	assert_eq!(grants.items.len(), 1);
	assert_eq!(&*grants.items[0].principal.resource, "u-2");

	sign_in.assert_calls_async(1).await;
	first.assert_calls_async(2).await;
	second.assert_calls_async(2).await;

	let rate_limit = client.last_rate_limit().expect("Rate-limit headers should be recorded.");

	assert_eq!(rate_limit.limit, 500);
	assert_eq!(rate_limit.remaining, 498);
}

#[tokio::test]
async fn user_listing_pages_with_tokens() {
	let server = MockServer::start_async().await;

	mock_sign_in(&server, StdDuration::ZERO).await;
	mock_users_page(
		&server,
		1,
		3,
		json!([
			{ "id": "u-1", "name": "ana", "email": "ana@example.com", "siteRole": "Viewer" },
			{ "id": "u-2", "name": "bo", "siteRole": "Creator" }
		]),
	)
	.await;
	mock_users_page(&server, 2, 3, json!([{ "id": "u-3", "name": "cy", "siteRole": "Viewer" }]))
		.await;

	let (connector, _) = build_reqwest_test_connector(&server.base_url(), 2);
	let context = RequestContext::new();
	let first = connector
		.list_resources(&context, USER_RESOURCE_TYPE, None, None)
		.await
		.expect("First user page should load.");

	assert_eq!(first.items.len(), 2);
	assert_eq!(first.next_token.as_deref(), Some("2"));
	assert!(matches!(
		&first.items[0].traits,
		ResourceTraits::User { email: Some(email), .. } if email == "ana@example.com"
	));

	let second = connector
		.list_resources(&context, USER_RESOURCE_TYPE, None, first.next_token.as_deref())
		.await
		.expect("Second user page should load.");

	assert_eq!(second.items.len(), 1);
	assert_eq!(second.next_token, None);

	let err = connector
		.list_resources(&context, USER_RESOURCE_TYPE, None, Some("page-two"))
		.await
		.expect_err("Malformed tokens should be rejected.");

	assert!(matches!(err, Error::Sync(SyncError::InvalidPageToken { .. })));
}

#[tokio::test]
async fn concurrent_syncs_share_one_sign_in() {
	let server = MockServer::start_async().await;
	let sign_in = mock_sign_in(&server, StdDuration::from_millis(100)).await;

	mock_users_page(&server, 1, 1, json!([{ "id": "u-1", "name": "ana", "siteRole": "Viewer" }]))
		.await;

	let (connector, _) = build_reqwest_test_connector(&server.base_url(), 2);
	let context = RequestContext::new();
	let (a, b, c) = tokio::join!(
		connector.list_resources(&context, USER_RESOURCE_TYPE, None, None),
		connector.list_resources(&context, USER_RESOURCE_TYPE, None, None),
		connector.validate(&context),
	);

	a.expect("First concurrent listing should succeed.");
	b.expect("Second concurrent listing should succeed.");

	let session = c.expect("Validation should succeed.");

	assert_eq!(&*session.site_id, SITE_ID);

	sign_in.assert_calls_async(1).await;
}

#[tokio::test]
async fn unauthorized_calls_drop_the_session() {
	let server = MockServer::start_async().await;
	let sign_in = mock_sign_in(&server, StdDuration::ZERO).await;
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("{USERS_PATH}/u-9"));
			then.status(401).header("content-type", "application/json").json_body(json!({
				"error": {
					"summary": "Signin Error",
					"detail": "Session expired",
					"code": "401002"
				}
			}));
		})
		.await;
	let (connector, client) = build_reqwest_test_connector(&server.base_url(), 2);
	let context = RequestContext::new();

	for _ in 0..2 {
		let err = client
			.get_user(&context, "u-9")
			.await
			.expect_err("Expired sessions should be reported.");

		assert_eq!(err.to_string(), "Request failed with status 401: Session expired.");
		assert!(matches!(err, Error::Response(ResponseError::Detailed { status: 401, .. })));
	}

	sign_in.assert_calls_async(2).await;
	rejected.assert_calls_async(2).await;

	let err = connector
		.list_resources(&context, "workbook", None, None)
		.await
		.expect_err("Unknown resource types should be rejected.");

	assert!(matches!(err, Error::Sync(SyncError::UnknownResourceType { .. })));
}

#[tokio::test]
async fn throttled_responses_still_record_quotas() {
	let server = MockServer::start_async().await;

	mock_sign_in(&server, StdDuration::ZERO).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(USERS_PATH);
			then.status(429)
				.header("content-type", "application/json")
				.header("x-ratelimit-limit", "10")
				.header("x-ratelimit-remaining", "0")
				.header("x-ratelimit-reset", "30")
				.json_body(json!({
					"error": {
						"summary": "Too Many Requests",
						"detail": "slow down",
						"code": "429000"
					}
				}));
		})
		.await;

	let (_, client) = build_reqwest_test_connector(&server.base_url(), 2);
	let err = client
		.list_users(&RequestContext::new(), 1)
		.await
		.expect_err("Throttled calls should fail.");

	assert_eq!(err.to_string(), "Request failed with status 429: slow down.");
	assert!(matches!(err, Error::Response(ResponseError::Detailed { status: 429, .. })));

	let rate_limit = client.last_rate_limit().expect("Throttle quotas should be recorded.");

	assert_eq!(rate_limit.limit, 10);
	assert_eq!(rate_limit.remaining, 0);
}

#[tokio::test]
async fn partial_rate_limit_headers_do_not_fail_calls() {
	let server = MockServer::start_async().await;

	mock_sign_in(&server, StdDuration::ZERO).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(USERS_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.header("x-ratelimit-limit", "500")
				.header("x-ratelimit-remaining", "498")
				.json_body(json!({
					"pagination": { "pageNumber": "1", "pageSize": "2", "totalAvailable": "1" },
					"users": { "user": [{ "id": "u-1", "name": "ana", "siteRole": "Viewer" }] }
				}));
		})
		.await;

	let (_, client) = build_reqwest_test_connector(&server.base_url(), 2);
	let page = client
		.list_users(&RequestContext::new(), 1)
		.await
		.expect("Incomplete quota headers should not fail the call.");

	assert_eq!(page.users.len(), 1);
	assert_eq!(client.last_rate_limit(), None);
}
