//! User resources.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	connector::{
		Entitlement, Grant, IdentifierError, Page, PlatformClient, PlatformUser, Profile, Resource,
		ResourceId, ResourceSyncer, ResourceTrait, ResourceTraits, ResourceType, ResourceTypeId,
		SyncFuture, UserStatus, license::UNLICENSED, pagination,
	},
	error::SyncError,
	http::{HttpTransport, RequestContext},
};

/// Resource type identifier for users.
pub const USER_RESOURCE_TYPE: &str = "user";

/// User resource type descriptor.
pub fn user_resource_type() -> Result<ResourceType, IdentifierError> {
	Ok(ResourceType {
		id: ResourceTypeId::new(USER_RESOURCE_TYPE)?,
		display_name: "User".into(),
		traits: vec![ResourceTrait::User],
	})
}

/// Maps a platform user onto a user resource, optionally parented to `parent`.
///
/// Unlicensed users are reported as disabled; an unparsable `lastLogin` is dropped.
pub fn user_resource(
	user: &PlatformUser,
	parent: Option<&ResourceId>,
) -> Result<Resource, IdentifierError> {
	let display_name = user
		.full_name
		.as_deref()
		.map(str::trim)
		.filter(|name| !name.is_empty())
		.unwrap_or(&user.name)
		.to_owned();
	let (first_name, last_name) = match display_name.split_once(' ') {
		Some((first, last)) => (first.to_owned(), last.trim().to_owned()),
		None => (display_name.clone(), String::new()),
	};
	let mut profile = Profile::from([
		("first_name".to_owned(), first_name.into()),
		("last_name".to_owned(), last_name.into()),
		("login".to_owned(), user.name.clone().into()),
		("user_id".to_owned(), user.id.clone().into()),
		("site_role".to_owned(), user.site_role.clone().into()),
	]);

	if let Some(email) = &user.email {
		profile.insert("email".to_owned(), email.clone().into());
	}

	let status =
		if user.site_role == UNLICENSED { UserStatus::Disabled } else { UserStatus::Enabled };
	let last_login =
		user.last_login.as_deref().and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok());

	Ok(Resource {
		id: ResourceId::new(USER_RESOURCE_TYPE, &user.id)?,
		display_name,
		parent: parent.cloned(),
		traits: ResourceTraits::User {
			email: user.email.clone(),
			login: user.name.clone(),
			status,
			last_login,
			profile,
		},
	})
}

/// Syncs user resources page by page. Users expose no entitlements or grants of their own.
pub struct UserSyncer<T>
where
	T: ?Sized + HttpTransport,
{
	client: Arc<PlatformClient<T>>,
}
impl<T> UserSyncer<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a syncer sharing `client`.
	pub fn new(client: Arc<PlatformClient<T>>) -> Self {
		Self { client }
	}

	async fn list_page(
		&self,
		context: &RequestContext,
		token: Option<&str>,
	) -> Result<Page<Resource>> {
		let page_number = pagination::page_number(token)?;
		let page = self.client.list_users(context, page_number).await?;
		let items = page
			.users
			.iter()
			.map(|user| user_resource(user, None))
			.collect::<Result<Vec<_>, _>>()
			.map_err(SyncError::from)?;
		let next_token = if items.is_empty() { None } else { page.next_page_token() };

		Ok(Page { items, next_token })
	}
}
impl<T> ResourceSyncer for UserSyncer<T>
where
	T: ?Sized + HttpTransport,
{
	fn resource_type(&self) -> Result<ResourceType, IdentifierError> {
		user_resource_type()
	}

	fn list<'a>(
		&'a self,
		context: &'a RequestContext,
		_: Option<&'a ResourceId>,
		token: Option<&'a str>,
	) -> SyncFuture<'a, Resource> {
		Box::pin(self.list_page(context, token))
	}

	fn entitlements<'a>(
		&'a self,
		_: &'a RequestContext,
		_: &'a Resource,
		_: Option<&'a str>,
	) -> SyncFuture<'a, Entitlement> {
		Box::pin(std::future::ready(Ok::<_, Error>(Page::last(Vec::new()))))
	}

	fn grants<'a>(
		&'a self,
		_: &'a RequestContext,
		_: &'a Resource,
		_: Option<&'a str>,
	) -> SyncFuture<'a, Grant> {
		Box::pin(std::future::ready(Ok::<_, Error>(Page::last(Vec::new()))))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn maps_platform_fields() {
		let user = PlatformUser {
			id: "u-1".into(),
			name: "ana@example.com".into(),
			full_name: Some("Ana Lima Souza".into()),
			email: Some("ana@example.com".into()),
			site_role: "Explorer".into(),
			last_login: Some("2025-03-04T05:06:07Z".into()),
		};
		let parent = ResourceId::new("license", "explorer").expect("Fixture id should be valid.");
		let resource = user_resource(&user, Some(&parent)).expect("User resource should build.");

		assert_eq!(resource.id.to_string(), "user:u-1");
		assert_eq!(resource.display_name, "Ana Lima Souza");
		assert_eq!(resource.parent, Some(parent));
		assert_eq!(resource.traits.profile()["first_name"], "Ana");
		assert_eq!(resource.traits.profile()["last_name"], "Lima Souza");
		assert_eq!(resource.traits.profile()["site_role"], "Explorer");

		let ResourceTraits::User { status, last_login, login, .. } = resource.traits else {
			panic!("User resources carry the user trait.");
		};

		assert_eq!(status, UserStatus::Enabled);
		assert_eq!(last_login, Some(datetime!(2025-03-04 05:06:07 UTC)));
		assert_eq!(login, "ana@example.com");
	}

	#[test]
	fn falls_back_to_login_and_flags_unlicensed() {
		let user = PlatformUser {
			id: "u-2".into(),
			name: "bot".into(),
			full_name: Some("  ".into()),
			site_role: UNLICENSED.into(),
			last_login: Some("yesterday".into()),
			..Default::default()
		};
		let resource = user_resource(&user, None).expect("User resource should build.");

		assert_eq!(resource.display_name, "bot");
		assert!(!resource.traits.profile().contains_key("email"));

		let ResourceTraits::User { status, last_login, .. } = resource.traits else {
			panic!("User resources carry the user trait.");
		};

		assert_eq!(status, UserStatus::Disabled);
		assert_eq!(last_login, None);
	}
}
