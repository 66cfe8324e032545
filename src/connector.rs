//! Resource sync layer: platform client, resource syncers, and the connector that routes to them.

pub mod config;
pub mod id;
pub mod license;
pub mod model;
pub mod pagination;
pub mod platform;
pub mod secret;
pub mod user;

pub use config::*;
pub use id::*;
pub use license::{LicenseSyncer, ROLES_PER_LICENSE, license_contains_role};
pub use model::*;
pub use platform::*;
pub use secret::*;
pub use user::UserSyncer;

// self
use crate::{
	_prelude::*,
	error::SyncError,
	http::{HttpTransport, RequestContext, TransportFuture},
	obs::{self, OperationKind},
};
#[cfg(feature = "reqwest")] use crate::http::{ReqwestHttpClient, ReqwestTransport};

/// Boxed future yielding one page of sync results.
pub type SyncFuture<'a, T> = TransportFuture<'a, Page<T>, Error>;

/// Per-resource-type sync operations.
///
/// Tokens are opaque to callers: pass `None` for the first page and the returned
/// [`Page::next_token`] for subsequent ones.
pub trait ResourceSyncer
where
	Self: Send + Sync,
{
	/// Resource type served by this syncer.
	fn resource_type(&self) -> Result<ResourceType, IdentifierError>;

	/// Lists resources, optionally scoped to `parent`.
	fn list<'a>(
		&'a self,
		context: &'a RequestContext,
		parent: Option<&'a ResourceId>,
		token: Option<&'a str>,
	) -> SyncFuture<'a, Resource>;

	/// Lists entitlements exposed by `resource`.
	fn entitlements<'a>(
		&'a self,
		context: &'a RequestContext,
		resource: &'a Resource,
		token: Option<&'a str>,
	) -> SyncFuture<'a, Entitlement>;

	/// Lists grants on `resource`.
	fn grants<'a>(
		&'a self,
		context: &'a RequestContext,
		resource: &'a Resource,
		token: Option<&'a str>,
	) -> SyncFuture<'a, Grant>;
}

/// Connector backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestConnector = Connector<ReqwestTransport>;

/// Connector routing sync calls to the user and license syncers.
pub struct Connector<T>
where
	T: ?Sized + HttpTransport,
{
	client: Arc<PlatformClient<T>>,
	syncers: Vec<Box<dyn ResourceSyncer>>,
}
impl<T> Connector<T>
where
	T: ?Sized + HttpTransport,
{
	/// Registers the user and license syncers over a shared platform client.
	pub fn new(client: Arc<PlatformClient<T>>) -> Self {
		let syncers: Vec<Box<dyn ResourceSyncer>> = vec![
			Box::new(UserSyncer::new(Arc::clone(&client))),
			Box::new(LicenseSyncer::new(Arc::clone(&client))),
		];

		Self { client, syncers }
	}

	/// Shared platform client.
	pub fn client(&self) -> &Arc<PlatformClient<T>> {
		&self.client
	}

	/// Resource types served by the registered syncers.
	pub fn resource_types(&self) -> Result<Vec<ResourceType>> {
		self.syncers
			.iter()
			.map(|syncer| syncer.resource_type().map_err(|e| SyncError::from(e).into()))
			.collect()
	}

	/// Looks up the syncer serving `resource_type`.
	pub fn syncer(&self, resource_type: &str) -> Result<&dyn ResourceSyncer, SyncError> {
		for syncer in &self.syncers {
			if &*syncer.resource_type()?.id == resource_type {
				return Ok(&**syncer);
			}
		}

		Err(SyncError::UnknownResourceType { resource_type: resource_type.to_owned() })
	}

	/// Checks the configured credentials by signing in.
	pub async fn validate(&self, context: &RequestContext) -> Result<Session> {
		self.client.session(context).await
	}

	/// Lists one page of resources of `resource_type`.
	pub async fn list_resources(
		&self,
		context: &RequestContext,
		resource_type: &str,
		parent: Option<&ResourceId>,
		token: Option<&str>,
	) -> Result<Page<Resource>> {
		let syncer = self.syncer(resource_type)?;

		let page = syncer.list(context, parent, token);

		obs::observe(OperationKind::ListResources, "list", page).await
	}

	/// Lists one page of entitlements on `resource`.
	pub async fn list_entitlements(
		&self,
		context: &RequestContext,
		resource: &Resource,
		token: Option<&str>,
	) -> Result<Page<Entitlement>> {
		let syncer = self.syncer(&resource.id.resource_type)?;

		let page = syncer.entitlements(context, resource, token);

		obs::observe(OperationKind::ListEntitlements, "entitlements", page).await
	}

	/// Lists one page of grants on `resource`.
	pub async fn list_grants(
		&self,
		context: &RequestContext,
		resource: &Resource,
		token: Option<&str>,
	) -> Result<Page<Grant>> {
		let syncer = self.syncer(&resource.id.resource_type)?;

		let page = syncer.grants(context, resource, token);

		obs::observe(OperationKind::ListGrants, "grants", page).await
	}
}
#[cfg(feature = "reqwest")]
impl Connector<ReqwestTransport> {
	/// Builds a connector over a default reqwest client.
	pub fn with_config(config: PlatformConfig) -> Self {
		Self::new(Arc::new(PlatformClient::new(config, ReqwestHttpClient::default())))
	}
}
impl<T> Debug for Connector<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("client", &self.client)
			.field("syncers", &self.syncers.len())
			.finish()
	}
}
