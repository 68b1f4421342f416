//! Transport guard adapter
//!
//! Turns a transport request (its `http::Extensions`) plus a CRUD verb into a
//! [`ScopeGuard::enforce`] call:
//!
//! 1. Resolve the actor: `ActorContext` first, then `AuthClaims`
//! 2. Derive the requested scope (pluggable extractor) and merge the per-call override
//! 3. Bypass: skip the guard, keep the scope, flag the result (trusted routes only)
//! 4. Map the verb to a `PolicyAction` (table, then default action)
//! 5. Enforce; denials become `ScopeDenied`, other failures `ScopeEnforcementFailed`

use axum::http::Extensions;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::guard::ScopeGuard;
use crate::prelude::*;
use scopegate_types::actor::{ActorContext, AuthClaims};

// ScopeExtractor //
//****************//
/// Derives the requested scope for a request
pub trait ScopeExtractor: Send + Sync {
	fn extract(&self, actor: &ActorContext, context: &Extensions) -> SgResult<ScopeFilter>;
}

impl<F> ScopeExtractor for F
where
	F: Fn(&ActorContext, &Extensions) -> SgResult<ScopeFilter> + Send + Sync,
{
	fn extract(&self, actor: &ActorContext, context: &Extensions) -> SgResult<ScopeFilter> {
		self(actor, context)
	}
}

/// Default extractor: the actor's own tenant and organization
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorScopeExtractor;

impl ScopeExtractor for ActorScopeExtractor {
	fn extract(&self, actor: &ActorContext, _context: &Extensions) -> SgResult<ScopeFilter> {
		Ok(actor.scope())
	}
}

// Input / output //
//****************//
/// Explicit opt-in to skip enforcement.
///
/// Only for trusted routes such as schema introspection. Disabled by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeBypass {
	pub enabled: bool,
	pub reason: Box<str>,
}

impl ScopeBypass {
	pub fn trusted(reason: impl Into<Box<str>>) -> Self {
		Self { enabled: true, reason: reason.into() }
	}
}

#[derive(Debug, Clone)]
pub struct GuardInput<'a> {
	/// Transport context; `None` fails with `Error::ContextMissing`
	pub context: Option<&'a Extensions>,
	pub operation: CrudOperation,
	pub target_id: Option<Uuid>,
	/// Per-call override merged onto the derived scope
	pub scope: ScopeFilter,
	pub bypass: ScopeBypass,
}

impl<'a> GuardInput<'a> {
	pub fn new(context: &'a Extensions, operation: CrudOperation) -> Self {
		Self {
			context: Some(context),
			operation,
			target_id: None,
			scope: ScopeFilter::default(),
			bypass: ScopeBypass::default(),
		}
	}

	pub fn target(mut self, target_id: Uuid) -> Self {
		self.target_id = Some(target_id);
		self
	}

	pub fn scope(mut self, scope: ScopeFilter) -> Self {
		self.scope = scope;
		self
	}

	pub fn bypass(mut self, reason: impl Into<Box<str>>) -> Self {
		self.bypass = ScopeBypass::trusted(reason);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardResult {
	pub actor: ActorContext,
	pub scope: ScopeFilter,
	pub operation: CrudOperation,
	pub bypassed: bool,
	pub bypass_reason: Option<Box<str>>,
}

// Configuration //
//***************//
/// Adapter configuration.
///
/// Zero values: an empty `policy_map` defers every verb to `default_action`;
/// no `scope_extractor` derives the scope from the actor context.
#[derive(Clone, Default)]
pub struct GuardAdapterConfig {
	pub policy_map: HashMap<CrudOperation, PolicyAction>,
	pub default_action: Option<PolicyAction>,
	pub scope_extractor: Option<Arc<dyn ScopeExtractor>>,
}

impl std::fmt::Debug for GuardAdapterConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GuardAdapterConfig")
			.field("policy_map", &self.policy_map)
			.field("default_action", &self.default_action)
			.field("scope_extractor", &self.scope_extractor.is_some())
			.finish()
	}
}

/// Standard verb table: list/read map to `read`, every mutation (batch included) to `write`
pub fn default_policy_map(
	read: impl Into<PolicyAction>,
	write: impl Into<PolicyAction>,
) -> HashMap<CrudOperation, PolicyAction> {
	let read = read.into();
	let write = write.into();
	CrudOperation::ALL
		.into_iter()
		.map(|op| (op, if op.is_read() { read.clone() } else { write.clone() }))
		.collect()
}

// GuardAdapter //
//**************//
pub struct GuardAdapter {
	guard: Arc<dyn ScopeGuard>,
	policy_map: HashMap<CrudOperation, PolicyAction>,
	default_action: Option<PolicyAction>,
	extractor: Arc<dyn ScopeExtractor>,
}

impl GuardAdapter {
	/// Fails with `Error::ScopePolicyMissing` when no verb can ever be mapped
	pub fn new(guard: Arc<dyn ScopeGuard>, config: GuardAdapterConfig) -> SgResult<Self> {
		let policy_map: HashMap<CrudOperation, PolicyAction> =
			config.policy_map.into_iter().filter(|(_, action)| !action.is_empty()).collect();
		let default_action = config.default_action.filter(|action| !action.is_empty());

		if policy_map.is_empty() && default_action.is_none() {
			return Err(Error::ScopePolicyMissing(
				"guard adapter needs a policy map or a default action".into(),
			));
		}

		Ok(Self {
			guard,
			policy_map,
			default_action,
			extractor: config.scope_extractor.unwrap_or_else(|| Arc::new(ActorScopeExtractor)),
		})
	}

	/// Policy action required for `operation`
	pub fn action_for(&self, operation: CrudOperation) -> SgResult<PolicyAction> {
		self.policy_map
			.get(&operation)
			.or(self.default_action.as_ref())
			.cloned()
			.ok_or_else(|| {
				Error::ScopePolicyMissing(format!("no policy action for operation '{}'", operation))
			})
	}

	pub async fn enforce(&self, input: GuardInput<'_>) -> SgResult<GuardResult> {
		let context = input.context.ok_or(Error::ContextMissing)?;
		let actor = resolve_actor(context).ok_or(Error::ActorContextMissing)?;

		let mut requested = self.extractor.extract(&actor, context)?;
		requested.merge(&input.scope);

		if input.bypass.enabled {
			if requested.is_empty() {
				requested = actor.scope();
			}
			warn!(
				actor = %actor.actor_id,
				operation = %input.operation,
				reason = %input.bypass.reason,
				"scope guard bypassed"
			);
			return Ok(GuardResult {
				actor,
				scope: requested,
				operation: input.operation,
				bypassed: true,
				bypass_reason: Some(input.bypass.reason),
			});
		}

		let action = self.action_for(input.operation)?;
		let actor_ref = actor.actor_ref();

		match self.guard.enforce(&actor_ref, &requested, &action, input.target_id).await {
			Ok(scope) => Ok(GuardResult {
				actor,
				scope,
				operation: input.operation,
				bypassed: false,
				bypass_reason: None,
			}),
			Err(err) if err.is_denial() => {
				warn!(
					actor = %actor_ref,
					operation = %input.operation,
					action = %action,
					"scope denied"
				);
				Err(Error::ScopeDenied(Box::new(err)))
			}
			Err(err) => {
				error!(
					actor = %actor_ref,
					operation = %input.operation,
					action = %action,
					error = %err,
					"scope enforcement failed"
				);
				Err(Error::ScopeEnforcementFailed(Box::new(err)))
			}
		}
	}
}

impl std::fmt::Debug for GuardAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GuardAdapter")
			.field("policy_map", &self.policy_map)
			.field("default_action", &self.default_action)
			.finish_non_exhaustive()
	}
}

/// First-class actor if attached, otherwise the claims-based fallback
pub fn resolve_actor(context: &Extensions) -> Option<ActorContext> {
	if let Some(actor) = context.get::<ActorContext>().filter(|a| !a.actor_id.is_nil()) {
		return Some(actor.clone());
	}
	context.get::<AuthClaims>().and_then(AuthClaims::to_actor_context)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_policy_map() {
		let map = default_policy_map("users.read", "users.write");
		assert_eq!(map.len(), CrudOperation::ALL.len());
		assert_eq!(map.get(&CrudOperation::List).map(PolicyAction::as_str), Some("users.read"));
		assert_eq!(
			map.get(&CrudOperation::DeleteBatch).map(PolicyAction::as_str),
			Some("users.write")
		);
	}

	#[test]
	fn test_new_requires_policy() {
		let res = GuardAdapter::new(Arc::new(crate::guard::NopGuard), GuardAdapterConfig::default());
		assert!(matches!(res, Err(Error::ScopePolicyMissing(_))));

		let config = GuardAdapterConfig {
			default_action: Some(PolicyAction::default()),
			..GuardAdapterConfig::default()
		};
		let res = GuardAdapter::new(Arc::new(crate::guard::NopGuard), config);
		assert!(matches!(res, Err(Error::ScopePolicyMissing(_))));
	}

	#[test]
	fn test_action_for_falls_back_to_default() {
		let mut policy_map = HashMap::new();
		policy_map.insert(CrudOperation::Read, PolicyAction::from("docs.read"));
		let config = GuardAdapterConfig {
			policy_map,
			default_action: Some("docs.any".into()),
			..GuardAdapterConfig::default()
		};
		let adapter = GuardAdapter::new(Arc::new(crate::guard::NopGuard), config);
		let adapter = adapter.ok();

		let read = adapter.as_ref().and_then(|a| a.action_for(CrudOperation::Read).ok());
		let update = adapter.as_ref().and_then(|a| a.action_for(CrudOperation::Update).ok());
		assert_eq!(read, Some("docs.read".into()));
		assert_eq!(update, Some("docs.any".into()));
	}

	#[test]
	fn test_action_for_unmapped_operation() {
		let mut policy_map = HashMap::new();
		policy_map.insert(CrudOperation::Read, PolicyAction::from("docs.read"));
		let config = GuardAdapterConfig { policy_map, ..GuardAdapterConfig::default() };
		let adapter = GuardAdapter::new(Arc::new(crate::guard::NopGuard), config);

		let res = adapter.map(|a| a.action_for(CrudOperation::Delete));
		assert!(matches!(res, Ok(Err(Error::ScopePolicyMissing(_)))));
	}

	#[test]
	fn test_resolve_actor_prefers_context() {
		let actor = ActorContext::new(Uuid::new_v4(), "member");
		let claims = AuthClaims { uid: Some(Uuid::new_v4()), ..AuthClaims::default() };

		let mut ext = Extensions::new();
		ext.insert(claims.clone());
		ext.insert(actor.clone());
		assert_eq!(resolve_actor(&ext).map(|a| a.actor_id), Some(actor.actor_id));

		let mut ext = Extensions::new();
		ext.insert(claims.clone());
		assert_eq!(resolve_actor(&ext).map(|a| a.actor_id), claims.uid);

		assert!(resolve_actor(&Extensions::new()).is_none());
	}
}

// vim: ts=4
