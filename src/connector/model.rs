//! Generic identity-governance primitives: resources, entitlements, grants, and pages.

// self
use crate::{
	_prelude::*,
	connector::{IdentifierError, ObjectId, ResourceTypeId},
};

/// Free-form profile attached to a resource.
pub type Profile = BTreeMap<String, serde_json::Value>;

/// Trait advertised by a resource type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrait {
	/// Human or service accounts.
	User,
	/// Role-like resources principals can be assigned to.
	Role,
}

/// Resource type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
	/// Stable identifier.
	pub id: ResourceTypeId,
	/// Human-readable name.
	pub display_name: String,
	/// Traits shared by every resource of this type.
	pub traits: Vec<ResourceTrait>,
}

/// Address of a resource: its type plus its object identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId {
	/// Resource type.
	pub resource_type: ResourceTypeId,
	/// Object identifier within the type.
	pub resource: ObjectId,
}
impl ResourceId {
	/// Validates both parts and builds the address.
	pub fn new(
		resource_type: impl Into<String>,
		resource: impl Into<String>,
	) -> Result<Self, IdentifierError> {
		Ok(Self {
			resource_type: ResourceTypeId::new(resource_type)?,
			resource: ObjectId::new(resource)?,
		})
	}
}
impl Display for ResourceId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}:{}", self.resource_type, self.resource)
	}
}

/// User account status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
	/// Account can sign in.
	#[default]
	Enabled,
	/// Account exists but holds no license.
	Disabled,
}

/// Trait-specific data carried by a resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceTraits {
	/// User trait.
	User {
		/// Primary email address, when known.
		email: Option<String>,
		/// Login name.
		login: String,
		/// Account status.
		status: UserStatus,
		/// Last sign-in, when known.
		last_login: Option<OffsetDateTime>,
		/// Free-form profile.
		profile: Profile,
	},
	/// Role trait.
	Role {
		/// Free-form profile.
		profile: Profile,
	},
}
impl ResourceTraits {
	/// Profile regardless of the trait kind.
	pub fn profile(&self) -> &Profile {
		match self {
			Self::User { profile, .. } | Self::Role { profile } => profile,
		}
	}
}

/// Addressable governance entity such as a user or license.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
	/// Address of the resource.
	pub id: ResourceId,
	/// Human-readable name.
	pub display_name: String,
	/// Parent resource, if any.
	pub parent: Option<ResourceId>,
	/// Trait-specific data.
	pub traits: ResourceTraits,
}

/// Why an entitlement exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
	/// Membership-style assignment.
	Assignment,
	/// Permission on the resource.
	Permission,
}

/// Assignable capability on a resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
	/// `{resource_type}:{resource}:{slug}`.
	pub id: String,
	/// Resource the entitlement belongs to.
	pub resource: ResourceId,
	/// Short name unique within the resource.
	pub slug: String,
	/// Human-readable name.
	pub display_name: String,
	/// Longer description.
	pub description: String,
	/// Entitlement purpose.
	pub purpose: EntitlementPurpose,
	/// Resource types whose members may receive grants.
	pub grantable_to: Vec<ResourceTypeId>,
}
impl Entitlement {
	/// Builds an assignment entitlement on `resource`.
	pub fn assignment(resource: &Resource, slug: impl Into<String>) -> Self {
		let slug = slug.into();

		Self {
			id: format!("{}:{slug}", resource.id),
			resource: resource.id.clone(),
			display_name: slug.clone(),
			description: String::new(),
			purpose: EntitlementPurpose::Assignment,
			grantable_to: Vec::new(),
			slug,
		}
	}

	/// Overrides the display name.
	pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
		self.display_name = display_name.into();

		self
	}

	/// Overrides the description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();

		self
	}

	/// Adds a resource type whose members may be granted this entitlement.
	pub fn grantable_to(mut self, resource_type: ResourceTypeId) -> Self {
		if !self.grantable_to.contains(&resource_type) {
			self.grantable_to.push(resource_type);
		}

		self
	}
}

/// Link between a principal and an entitlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
	/// `{entitlement_id}:{principal}`.
	pub id: String,
	/// Entitlement being granted.
	pub entitlement: Entitlement,
	/// Principal receiving the entitlement.
	pub principal: ResourceId,
}
impl Grant {
	/// Grants `entitlement` to `principal`.
	pub fn new(entitlement: Entitlement, principal: ResourceId) -> Self {
		Self { id: format!("{}:{principal}", entitlement.id), entitlement, principal }
	}
}

/// One page of sync results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
	/// Items on this page.
	pub items: Vec<T>,
	/// Token for the next page; `None` on the last page.
	pub next_token: Option<String>,
}
impl<T> Page<T> {
	/// Single page with no continuation.
	pub fn last(items: Vec<T>) -> Self {
		Self { items, next_token: None }
	}
}
