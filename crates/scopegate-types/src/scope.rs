//! Actor and scope model, plus the two collaborator traits the guard composes.
//!
//! - `ScopeResolver` turns a caller-requested scope into the authoritative one
//! - `AuthorizationPolicy` accepts or rejects an action against that scope
//!
//! A nil tenant or organization id in a [`ScopeFilter`] means "unconstrained",
//! never "denied".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use uuid::Uuid;

use crate::prelude::*;

// ActorRef //
//**********//
/// Who is performing an operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
	pub id: Uuid,
	#[serde(rename = "type")]
	pub typ: Box<str>,
}

impl ActorRef {
	pub fn new(id: Uuid, typ: impl Into<Box<str>>) -> Self {
		Self { id, typ: typ.into() }
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.typ.as_ref() == role
	}
}

impl std::fmt::Display for ActorRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.typ, self.id)
	}
}

// ScopeFilter //
//*************//
/// Where an operation is permitted to act
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeFilter {
	pub tenant_id: Uuid,
	pub org_id: Uuid,
	#[serde(skip_serializing_if = "HashMap::is_empty")]
	pub labels: HashMap<Box<str>, Uuid>,
}

impl ScopeFilter {
	pub fn new(tenant_id: Uuid, org_id: Uuid) -> Self {
		Self { tenant_id, org_id, labels: HashMap::new() }
	}

	pub fn tenant(tenant_id: Uuid) -> Self {
		Self::new(tenant_id, Uuid::nil())
	}

	pub fn with_label(mut self, key: impl Into<Box<str>>, value: Uuid) -> Self {
		self.labels.insert(key.into(), value);
		self
	}

	pub fn label(&self, key: &str) -> Option<Uuid> {
		self.labels.get(key).copied().filter(|id| !id.is_nil())
	}

	/// Tenant id, if constrained
	pub fn tenant_id(&self) -> Option<Uuid> {
		Some(self.tenant_id).filter(|id| !id.is_nil())
	}

	/// Organization id, if constrained
	pub fn org_id(&self) -> Option<Uuid> {
		Some(self.org_id).filter(|id| !id.is_nil())
	}

	/// No constraint at all
	pub fn is_empty(&self) -> bool {
		self.tenant_id.is_nil() && self.org_id.is_nil() && self.labels.values().all(Uuid::is_nil)
	}

	/// Apply an explicit per-call override on top of this scope.
	///
	/// Non-nil tenant/org values in `other` win. Labels merge key by key;
	/// nil label values in `other` are skipped.
	pub fn merge(&mut self, other: &ScopeFilter) {
		if !other.tenant_id.is_nil() {
			self.tenant_id = other.tenant_id;
		}
		if !other.org_id.is_nil() {
			self.org_id = other.org_id;
		}
		for (key, value) in &other.labels {
			if !value.is_nil() {
				self.labels.insert(key.clone(), *value);
			}
		}
	}

	pub fn merged(mut self, other: &ScopeFilter) -> Self {
		self.merge(other);
		self
	}
}

// PolicyAction //
//**************//
/// Permission tag required for an operation (e.g. "preferences.read")
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyAction(pub Box<str>);

impl PolicyAction {
	pub fn new(action: impl Into<Box<str>>) -> Self {
		Self(action.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<&str> for PolicyAction {
	fn from(action: &str) -> Self {
		Self(action.into())
	}
}

impl std::fmt::Display for PolicyAction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

// CrudOperation //
//***************//
/// Verb used at the transport boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudOperation {
	List,
	Read,
	Create,
	Update,
	Delete,
	CreateBatch,
	UpdateBatch,
	DeleteBatch,
}

impl CrudOperation {
	pub const ALL: [CrudOperation; 8] = [
		CrudOperation::List,
		CrudOperation::Read,
		CrudOperation::Create,
		CrudOperation::Update,
		CrudOperation::Delete,
		CrudOperation::CreateBatch,
		CrudOperation::UpdateBatch,
		CrudOperation::DeleteBatch,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			CrudOperation::List => "list",
			CrudOperation::Read => "read",
			CrudOperation::Create => "create",
			CrudOperation::Update => "update",
			CrudOperation::Delete => "delete",
			CrudOperation::CreateBatch => "create_batch",
			CrudOperation::UpdateBatch => "update_batch",
			CrudOperation::DeleteBatch => "delete_batch",
		}
	}

	pub fn is_read(&self) -> bool {
		matches!(self, CrudOperation::List | CrudOperation::Read)
	}
}

impl std::fmt::Display for CrudOperation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for CrudOperation {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		CrudOperation::ALL
			.into_iter()
			.find(|op| op.as_str() == s)
			.ok_or_else(|| Error::ValidationError(format!("Unknown operation: {}", s)))
	}
}

// PolicyCheck //
//*************//
/// The unit an `AuthorizationPolicy` evaluates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyCheck {
	pub actor: ActorRef,
	pub scope: ScopeFilter,
	pub action: PolicyAction,
	pub target_id: Option<Uuid>,
}

// Collaborators //
//***************//
/// Maps an actor and a requested scope to the authoritative scope
#[async_trait]
pub trait ScopeResolver: Debug + Send + Sync {
	async fn resolve_scope(
		&self,
		actor: &ActorRef,
		requested: &ScopeFilter,
	) -> SgResult<ScopeFilter>;
}

/// Accepts or rejects an action against a resolved scope.
///
/// Implementations signal a denial with [`Error::UnauthorizedScope`].
#[async_trait]
pub trait AuthorizationPolicy: Debug + Send + Sync {
	async fn authorize(&self, check: &PolicyCheck) -> SgResult<()>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_override_wins_on_non_nil() {
		let tenant = Uuid::new_v4();
		let org = Uuid::new_v4();
		let mut base = ScopeFilter::new(tenant, Uuid::nil()).with_label("module", Uuid::new_v4());

		let other_org = ScopeFilter::new(Uuid::nil(), org);
		base.merge(&other_org);

		assert_eq!(base.tenant_id, tenant);
		assert_eq!(base.org_id, org);
	}

	#[test]
	fn test_merge_labels_skip_nil() {
		let module = Uuid::new_v4();
		let team = Uuid::new_v4();
		let base = ScopeFilter::default().with_label("module", module);
		let other = ScopeFilter::default().with_label("module", Uuid::nil()).with_label("team", team);

		let merged = base.merged(&other);
		assert_eq!(merged.label("module"), Some(module));
		assert_eq!(merged.label("team"), Some(team));
	}

	#[test]
	fn test_nil_scope_is_unconstrained() {
		let scope = ScopeFilter::default();
		assert!(scope.is_empty());
		assert_eq!(scope.tenant_id(), None);
		assert_eq!(scope.org_id(), None);
	}

	#[test]
	fn test_crud_operation_parse() {
		assert_eq!("update_batch".parse::<CrudOperation>().ok(), Some(CrudOperation::UpdateBatch));
		assert!("patch".parse::<CrudOperation>().is_err());
		assert!(CrudOperation::List.is_read());
		assert!(!CrudOperation::DeleteBatch.is_read());
	}
}

// vim: ts=4
