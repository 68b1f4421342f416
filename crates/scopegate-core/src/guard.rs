//! Scope guard: scope resolution followed by authorization.
//!
//! Every command and query calls [`ScopeGuard::enforce`] before touching
//! storage. Resolution runs first so the policy always sees the final scope.
//! A missing resolver means identity resolution and a missing policy means
//! open authorization; callers treat that as "no guard configured".

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::prelude::*;
use scopegate_types::scope::{AuthorizationPolicy, PolicyCheck, ScopeResolver};

#[async_trait]
pub trait ScopeGuard: Send + Sync {
	/// Resolve `requested` for `actor` and authorize `action` against the result.
	///
	/// Resolver errors are returned unchanged. A policy denial is returned as
	/// [`Error::UnauthorizedScope`]; no scope is handed back in that case.
	async fn enforce(
		&self,
		actor: &ActorRef,
		requested: &ScopeFilter,
		action: &PolicyAction,
		target_id: Option<Uuid>,
	) -> SgResult<ScopeFilter>;
}

/// Guard composed from an optional resolver and an optional policy
#[derive(Debug, Clone, Default)]
pub struct Guard {
	resolver: Option<Arc<dyn ScopeResolver>>,
	policy: Option<Arc<dyn AuthorizationPolicy>>,
}

impl Guard {
	pub fn new(
		resolver: Option<Arc<dyn ScopeResolver>>,
		policy: Option<Arc<dyn AuthorizationPolicy>>,
	) -> Self {
		Self { resolver, policy }
	}

	pub fn with_resolver(mut self, resolver: Arc<dyn ScopeResolver>) -> Self {
		self.resolver = Some(resolver);
		self
	}

	pub fn with_policy(mut self, policy: Arc<dyn AuthorizationPolicy>) -> Self {
		self.policy = Some(policy);
		self
	}

	/// False when both stages are no-ops
	pub fn is_configured(&self) -> bool {
		self.resolver.is_some() || self.policy.is_some()
	}
}

#[async_trait]
impl ScopeGuard for Guard {
	async fn enforce(
		&self,
		actor: &ActorRef,
		requested: &ScopeFilter,
		action: &PolicyAction,
		target_id: Option<Uuid>,
	) -> SgResult<ScopeFilter> {
		debug!(actor = %actor, action = %action, tenant = %requested.tenant_id, "enforcing scope");

		let scope = match &self.resolver {
			Some(resolver) => resolver.resolve_scope(actor, requested).await?,
			None => requested.clone(),
		};

		if let Some(policy) = &self.policy {
			if !action.is_empty() {
				let check =
					PolicyCheck { actor: actor.clone(), scope, action: action.clone(), target_id };
				match policy.authorize(&check).await {
					Ok(()) => return Ok(check.scope),
					Err(err) if err.is_denial() => {
						warn!(
							actor = %actor,
							action = %action,
							tenant = %check.scope.tenant_id,
							org = %check.scope.org_id,
							"policy denied scope"
						);
						return Err(Error::UnauthorizedScope);
					}
					Err(err) => return Err(err),
				}
			}
		}

		Ok(scope)
	}
}

/// Guard that passes the requested scope through untouched.
///
/// For tests and trusted internal call sites only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopGuard;

#[async_trait]
impl ScopeGuard for NopGuard {
	async fn enforce(
		&self,
		_actor: &ActorRef,
		requested: &ScopeFilter,
		_action: &PolicyAction,
		_target_id: Option<Uuid>,
	) -> SgResult<ScopeFilter> {
		Ok(requested.clone())
	}
}


// vim: ts=4
