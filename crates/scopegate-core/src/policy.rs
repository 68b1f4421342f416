//! Built-in scope resolver and authorization policy
//!
//! Deployments with their own membership store implement `ScopeResolver` and
//! `AuthorizationPolicy` directly; these cover the common role-table case.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::prelude::*;
use crate::roles;
use scopegate_types::scope::{AuthorizationPolicy, PolicyCheck, ScopeResolver};

// AssignmentScopeResolver //
//*************************//
/// Resolves scopes from per-actor assignments.
///
/// Assigned (non-nil) components are authoritative and replace whatever the
/// caller asked for; unassigned components keep the requested value.
/// Elevated actors pass through unchanged, unknown actors are denied.
#[derive(Debug, Default)]
pub struct AssignmentScopeResolver {
	assignments: RwLock<HashMap<Uuid, ScopeFilter>>,
	elevated_roles: Vec<Box<str>>,
}

impl AssignmentScopeResolver {
	pub fn new(elevated_roles: Vec<Box<str>>) -> Self {
		Self { assignments: RwLock::new(HashMap::new()), elevated_roles }
	}

	pub fn assign(&self, actor_id: Uuid, scope: ScopeFilter) {
		self.assignments.write().insert(actor_id, scope);
	}

	pub fn unassign(&self, actor_id: Uuid) -> Option<ScopeFilter> {
		self.assignments.write().remove(&actor_id)
	}
}

#[async_trait]
impl ScopeResolver for AssignmentScopeResolver {
	async fn resolve_scope(
		&self,
		actor: &ActorRef,
		requested: &ScopeFilter,
	) -> SgResult<ScopeFilter> {
		if roles::contains_role(&self.elevated_roles, &actor.typ) {
			return Ok(requested.clone());
		}

		let assignments = self.assignments.read();
		let Some(assigned) = assignments.get(&actor.id) else {
			debug!(actor = %actor, "no scope assignment");
			return Err(Error::PermissionDenied);
		};

		// Assigned tenant and org win; a requested org only applies when none is assigned
		Ok(requested.clone().merged(assigned))
	}
}

// RolePolicy //
//************//
/// Action → allowed roles table.
///
/// Elevated roles pass every check. Everyone else needs a rule for the action
/// and, unless disabled, a tenant-constrained scope. Unknown actions deny.
#[derive(Debug, Clone)]
pub struct RolePolicy {
	rules: HashMap<PolicyAction, Vec<Box<str>>>,
	elevated_roles: Vec<Box<str>>,
	require_tenant: bool,
}

impl RolePolicy {
	pub fn new() -> Self {
		Self {
			rules: HashMap::new(),
			elevated_roles: roles::to_owned_roles(roles::DEFAULT_ADMIN_ROLES),
			require_tenant: true,
		}
	}

	pub fn allow(mut self, action: impl Into<PolicyAction>, allowed: &[&str]) -> Self {
		self.rules.entry(action.into()).or_default().extend(roles::to_owned_roles(allowed));
		self
	}

	pub fn elevated(mut self, elevated: &[&str]) -> Self {
		self.elevated_roles = roles::to_owned_roles(elevated);
		self
	}

	pub fn require_tenant(mut self, require: bool) -> Self {
		self.require_tenant = require;
		self
	}
}

impl Default for RolePolicy {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl AuthorizationPolicy for RolePolicy {
	async fn authorize(&self, check: &PolicyCheck) -> SgResult<()> {
		let role = check.actor.typ.as_ref();
		if roles::contains_role(&self.elevated_roles, role) {
			return Ok(());
		}

		let allowed = self.rules.get(&check.action).is_some_and(|r| roles::contains_role(r, role));
		if !allowed {
			debug!(actor = %check.actor, action = %check.action, "role not allowed");
			return Err(Error::UnauthorizedScope);
		}

		if self.require_tenant && check.scope.tenant_id().is_none() {
			debug!(actor = %check.actor, action = %check.action, "unconstrained scope");
			return Err(Error::UnauthorizedScope);
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn check(role: &str, action: &str, scope: ScopeFilter) -> PolicyCheck {
		PolicyCheck {
			actor: ActorRef::new(Uuid::new_v4(), role),
			scope,
			action: action.into(),
			target_id: None,
		}
	}

	#[tokio::test]
	async fn test_assignment_replaces_requested_tenant() {
		let resolver = AssignmentScopeResolver::new(vec!["system_admin".into()]);
		let actor = ActorRef::new(Uuid::new_v4(), "member");
		let tenant = Uuid::new_v4();
		resolver.assign(actor.id, ScopeFilter::tenant(tenant));

		let org = Uuid::new_v4();
		let requested = ScopeFilter::new(Uuid::new_v4(), org);
		let resolved = resolver.resolve_scope(&actor, &requested).await.ok();

		assert_eq!(resolved, Some(ScopeFilter::new(tenant, org)));
	}

	#[tokio::test]
	async fn test_assigned_org_is_kept() {
		let resolver = AssignmentScopeResolver::default();
		let actor = ActorRef::new(Uuid::new_v4(), "member");
		let tenant = Uuid::new_v4();
		let org_a = Uuid::new_v4();
		resolver.assign(actor.id, ScopeFilter::new(tenant, org_a));

		let requested = ScopeFilter::new(tenant, Uuid::new_v4());
		let resolved = resolver.resolve_scope(&actor, &requested).await.ok();
		assert_eq!(resolved, Some(ScopeFilter::new(tenant, org_a)));

		let resolved = resolver.resolve_scope(&actor, &ScopeFilter::default()).await.ok();
		assert_eq!(resolved, Some(ScopeFilter::new(tenant, org_a)));
	}

	#[tokio::test]
	async fn test_elevated_passes_through() {
		let resolver = AssignmentScopeResolver::new(vec!["system_admin".into()]);
		let actor = ActorRef::new(Uuid::new_v4(), "system_admin");
		let requested = ScopeFilter::tenant(Uuid::new_v4());

		let resolved = resolver.resolve_scope(&actor, &requested).await.ok();
		assert_eq!(resolved, Some(requested));
	}

	#[tokio::test]
	async fn test_unknown_actor_denied() {
		let resolver = AssignmentScopeResolver::default();
		let actor = ActorRef::new(Uuid::new_v4(), "member");

		let res = resolver.resolve_scope(&actor, &ScopeFilter::default()).await;
		assert!(matches!(res, Err(Error::PermissionDenied)));

		resolver.assign(actor.id, ScopeFilter::default());
		assert!(resolver.unassign(actor.id).is_some());
	}

	#[tokio::test]
	async fn test_role_policy() {
		let tenant = ScopeFilter::tenant(Uuid::new_v4());
		let policy = RolePolicy::new()
			.allow("preferences.read", &["member", "support"])
			.allow("preferences.write", &["member"]);

		assert!(policy.authorize(&check("member", "preferences.write", tenant.clone())).await.is_ok());
		assert!(policy.authorize(&check("support", "preferences.read", tenant.clone())).await.is_ok());

		let res = policy.authorize(&check("support", "preferences.write", tenant.clone())).await;
		assert!(matches!(res, Err(Error::UnauthorizedScope)));

		let res = policy.authorize(&check("member", "users.delete", tenant)).await;
		assert!(matches!(res, Err(Error::UnauthorizedScope)));
	}

	#[tokio::test]
	async fn test_role_policy_requires_tenant() {
		let policy = RolePolicy::new().allow("preferences.read", &["member"]);

		let res = policy.authorize(&check("member", "preferences.read", ScopeFilter::default())).await;
		assert!(matches!(res, Err(Error::UnauthorizedScope)));

		// Elevated actors may act unconstrained
		let res = policy.authorize(&check("system_admin", "anything", ScopeFilter::default())).await;
		assert!(res.is_ok());

		let policy = policy.require_tenant(false);
		let res = policy.authorize(&check("member", "preferences.read", ScopeFilter::default())).await;
		assert!(res.is_ok());
	}

	#[tokio::test]
	async fn test_role_policy_elevated_roles() {
		let tenant = ScopeFilter::tenant(Uuid::new_v4());
		let policy = RolePolicy::new().elevated(&["operator"]);

		assert!(policy.authorize(&check("operator", "users.delete", ScopeFilter::default())).await.is_ok());
		let res = policy.authorize(&check("system_admin", "users.delete", tenant)).await;
		assert!(matches!(res, Err(Error::UnauthorizedScope)));
	}
}

// vim: ts=4
