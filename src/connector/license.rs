//! License resources and the static role-to-license table.
//!
//! The platform does not expose licenses as objects; every user carries a site role and each role
//! implies exactly one license. Licenses are therefore enumerated from a fixed list and grants are
//! derived by matching each user's site role against [`ROLES_PER_LICENSE`].

// std
use std::sync::LazyLock;
// self
use crate::{
	_prelude::*,
	connector::{
		Entitlement, Grant, IdentifierError, Page, PlatformClient, PlatformUser, Profile, Resource,
		ResourceId, ResourceSyncer, ResourceTrait, ResourceTraits, ResourceType, ResourceTypeId,
		SyncFuture, user,
	},
	error::SyncError,
	http::{HttpTransport, RequestContext},
};

/// Resource type identifier for licenses.
pub const LICENSE_RESOURCE_TYPE: &str = "license";
/// Slug of the single entitlement every license exposes.
pub const MEMBER_ENTITLEMENT: &str = "member";

/// `Creator` license and site role.
pub const CREATOR: &str = "Creator";
/// `Explorer` license and site role.
pub const EXPLORER: &str = "Explorer";
/// `Viewer` license and site role.
pub const VIEWER: &str = "Viewer";
/// `Unlicensed` pseudo-license and site role.
pub const UNLICENSED: &str = "Unlicensed";
/// Site administrator holding a creator license.
pub const SITE_ADMINISTRATOR_CREATOR: &str = "SiteAdministratorCreator";
/// Site administrator holding an explorer license.
pub const SITE_ADMINISTRATOR_EXPLORER: &str = "SiteAdministratorExplorer";
/// Explorer allowed to publish content.
pub const EXPLORER_CAN_PUBLISH: &str = "ExplorerCanPublish";
/// Legacy read-only role.
pub const READ_ONLY: &str = "ReadOnly";
/// Legacy site administrator role.
pub const SITE_ADMINISTRATOR: &str = "SiteAdministrator";

/// Licenses in listing order.
pub const LICENSES: [&str; 4] = [CREATOR, EXPLORER, VIEWER, UNLICENSED];

/// License name to the site roles it covers.
pub type RoleTable = HashMap<&'static str, &'static [&'static str]>;

/// Immutable role table shared by every license syncer.
pub static ROLES_PER_LICENSE: LazyLock<RoleTable> = LazyLock::new(|| {
	HashMap::from([
		(CREATOR, &[SITE_ADMINISTRATOR_CREATOR, CREATOR][..]),
		(
			EXPLORER,
			&[
				SITE_ADMINISTRATOR_EXPLORER,
				EXPLORER_CAN_PUBLISH,
				EXPLORER,
				READ_ONLY,
				SITE_ADMINISTRATOR,
			][..],
		),
		(VIEWER, &[VIEWER][..]),
		(UNLICENSED, &[UNLICENSED][..]),
	])
});

/// Returns true when `table` lists `role` under `license`; unknown licenses contain no roles.
pub fn license_contains_role(license: &str, role: &str, table: &RoleTable) -> bool {
	table.get(license).is_some_and(|roles| roles.contains(&role))
}

/// License resource type descriptor.
pub fn license_resource_type() -> Result<ResourceType, IdentifierError> {
	Ok(ResourceType {
		id: ResourceTypeId::new(LICENSE_RESOURCE_TYPE)?,
		display_name: "License".into(),
		traits: vec![ResourceTrait::Role],
	})
}

/// Builds the resource for `license`; its id is the lower-cased license name.
pub fn license_resource(license: &str) -> Result<Resource, IdentifierError> {
	let license_id = license.to_lowercase();
	let profile = Profile::from([
		("license_name".to_owned(), license.into()),
		("license_id".to_owned(), license_id.clone().into()),
	]);

	Ok(Resource {
		id: ResourceId::new(LICENSE_RESOURCE_TYPE, &license_id)?,
		display_name: license.to_owned(),
		parent: None,
		traits: ResourceTraits::Role { profile },
	})
}

/// The single `member` assignment entitlement of a license, grantable to users.
pub fn member_entitlement(resource: &Resource) -> Result<Entitlement, IdentifierError> {
	let name = &resource.display_name;

	Ok(Entitlement::assignment(resource, MEMBER_ENTITLEMENT)
		.with_display_name(format!("{name} License {MEMBER_ENTITLEMENT}"))
		.with_description(format!("Member of {name} License"))
		.grantable_to(ResourceTypeId::new(user::USER_RESOURCE_TYPE)?))
}

/// Grants `resource`'s member entitlement to every user whose site role the license covers.
///
/// User resources are built (and validated) for every user, parented to the license.
pub fn license_grants(
	resource: &Resource,
	users: &[PlatformUser],
	table: &RoleTable,
) -> Result<Vec<Grant>, IdentifierError> {
	let entitlement = member_entitlement(resource)?;
	let mut grants = Vec::new();

	for platform_user in users {
		let principal = user::user_resource(platform_user, Some(&resource.id))?;

		if license_contains_role(&resource.display_name, &platform_user.site_role, table) {
			grants.push(Grant::new(entitlement.clone(), principal.id));
		}
	}

	Ok(grants)
}

/// Syncs license resources, their member entitlements, and role-derived grants.
pub struct LicenseSyncer<T>
where
	T: ?Sized + HttpTransport,
{
	client: Arc<PlatformClient<T>>,
}
impl<T> LicenseSyncer<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a syncer sharing `client`.
	pub fn new(client: Arc<PlatformClient<T>>) -> Self {
		Self { client }
	}

	async fn grants_page(
		&self,
		context: &RequestContext,
		resource: &Resource,
	) -> Result<Page<Grant>> {
		let users = self.client.get_paginated_users(context).await?;
		let grants =
			license_grants(resource, &users, &ROLES_PER_LICENSE).map_err(SyncError::from)?;

		Ok(Page::last(grants))
	}
}
impl<T> ResourceSyncer for LicenseSyncer<T>
where
	T: ?Sized + HttpTransport,
{
	fn resource_type(&self) -> Result<ResourceType, IdentifierError> {
		license_resource_type()
	}

	fn list<'a>(
		&'a self,
		_: &'a RequestContext,
		_: Option<&'a ResourceId>,
		_: Option<&'a str>,
	) -> SyncFuture<'a, Resource> {
		let resources: Result<Page<Resource>> = LICENSES
			.iter()
			.map(|license| license_resource(license))
			.collect::<Result<Vec<_>, _>>()
			.map(Page::last)
			.map_err(|e| SyncError::from(e).into());

		Box::pin(std::future::ready(resources))
	}

	fn entitlements<'a>(
		&'a self,
		_: &'a RequestContext,
		resource: &'a Resource,
		_: Option<&'a str>,
	) -> SyncFuture<'a, Entitlement> {
		let entitlements: Result<Page<Entitlement>> = member_entitlement(resource)
			.map(|entitlement| Page::last(vec![entitlement]))
			.map_err(|e| SyncError::from(e).into());

		Box::pin(std::future::ready(entitlements))
	}

	fn grants<'a>(
		&'a self,
		context: &'a RequestContext,
		resource: &'a Resource,
		_: Option<&'a str>,
	) -> SyncFuture<'a, Grant> {
		Box::pin(self.grants_page(context, resource))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn platform_user(id: &str, role: &str) -> PlatformUser {
		PlatformUser {
			id: id.into(),
			name: format!("{id}@example.com"),
			site_role: role.into(),
			..Default::default()
		}
	}

	#[test]
	fn role_table_matches_licenses() {
		assert!(license_contains_role(EXPLORER, READ_ONLY, &ROLES_PER_LICENSE));
		assert!(license_contains_role(CREATOR, SITE_ADMINISTRATOR_CREATOR, &ROLES_PER_LICENSE));
		assert!(!license_contains_role(EXPLORER, UNLICENSED, &ROLES_PER_LICENSE));
		assert!(!license_contains_role("Enterprise", VIEWER, &ROLES_PER_LICENSE));
		assert_eq!(ROLES_PER_LICENSE.len(), LICENSES.len());
	}

	#[test]
	fn custom_tables_are_honored() {
		let table = RoleTable::from([(EXPLORER, &[READ_ONLY][..])]);

		assert!(license_contains_role(EXPLORER, READ_ONLY, &table));
		assert!(!license_contains_role(EXPLORER, EXPLORER, &table));
	}

	#[test]
	fn license_resources_use_lowercase_ids() {
		let resource = license_resource(CREATOR).expect("License resource should build.");

		assert_eq!(resource.id.to_string(), "license:creator");
		assert_eq!(resource.display_name, CREATOR);
		assert_eq!(resource.traits.profile()["license_name"], CREATOR);
		assert_eq!(resource.traits.profile()["license_id"], "creator");
	}

	#[test]
	fn member_entitlement_is_grantable_to_users() {
		let resource = license_resource(VIEWER).expect("License resource should build.");
		let entitlement = member_entitlement(&resource).expect("Entitlement should build.");

		assert_eq!(entitlement.id, "license:viewer:member");
		assert_eq!(entitlement.display_name, "Viewer License member");
		assert_eq!(entitlement.description, "Member of Viewer License");
		assert_eq!(entitlement.grantable_to.len(), 1);
		assert_eq!(&*entitlement.grantable_to[0], user::USER_RESOURCE_TYPE);
	}

	#[test]
	fn grants_follow_site_roles() {
		let explorer = license_resource(EXPLORER).expect("License resource should build.");
		let users = [
			platform_user("u-1", READ_ONLY),
			platform_user("u-2", UNLICENSED),
			platform_user("u-3", EXPLORER_CAN_PUBLISH),
		];
		let grants = license_grants(&explorer, &users, &ROLES_PER_LICENSE)
			.expect("Grants should build for valid users.");
		let principals =
			grants.iter().map(|g| g.principal.resource.to_string()).collect::<Vec<_>>();

		assert_eq!(principals, ["u-1", "u-3"]);
		assert_eq!(grants[0].id, "license:explorer:member:user:u-1");

		let unlicensed = license_resource(UNLICENSED).expect("License resource should build.");
		let grants = license_grants(&unlicensed, &users, &ROLES_PER_LICENSE)
			.expect("Grants should build for valid users.");

		assert_eq!(grants.len(), 1);
		assert_eq!(&*grants[0].principal.resource, "u-2");
	}

	#[test]
	fn invalid_user_ids_fail_grant_computation() {
		let viewer = license_resource(VIEWER).expect("License resource should build.");
		let users = [platform_user("", VIEWER)];

		assert!(license_grants(&viewer, &users, &ROLES_PER_LICENSE).is_err());
	}
}
