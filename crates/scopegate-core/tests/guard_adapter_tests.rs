//! Transport guard adapter integration tests
//!
//! Tests for:
//! 1. Bypass never reaches the guard and echoes its reason
//! 2. Denials and internal failures are classified apart
//! 3. Actor resolution (context first, claims fallback) and scope overrides
#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use axum::http::Extensions;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use scopegate_core::guard::{Guard, ScopeGuard};
use scopegate_core::guard_adapter::{
	GuardAdapter, GuardAdapterConfig, GuardInput, default_policy_map,
};
use scopegate_core::policy::{AssignmentScopeResolver, RolePolicy};
use scopegate_core::prelude::*;
use scopegate_types::actor::{ActorContext, AuthClaims};

/// Guard stub that records every call and returns a canned outcome
#[derive(Debug)]
enum Outcome {
	Echo,
	Deny,
	Fail,
}

#[derive(Debug)]
struct CountingGuard {
	calls: AtomicUsize,
	outcome: Outcome,
	last_action: parking_lot::Mutex<Option<PolicyAction>>,
}

impl CountingGuard {
	fn new(outcome: Outcome) -> Arc<Self> {
		Arc::new(Self { calls: AtomicUsize::new(0), outcome, last_action: parking_lot::Mutex::new(None) })
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ScopeGuard for CountingGuard {
	async fn enforce(
		&self,
		_actor: &ActorRef,
		requested: &ScopeFilter,
		action: &PolicyAction,
		_target_id: Option<Uuid>,
	) -> SgResult<ScopeFilter> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		*self.last_action.lock() = Some(action.clone());
		match self.outcome {
			Outcome::Echo => Ok(requested.clone()),
			Outcome::Deny => Err(Error::UnauthorizedScope),
			Outcome::Fail => Err(Error::DbError),
		}
	}
}

fn adapter(guard: Arc<dyn ScopeGuard>) -> GuardAdapter {
	GuardAdapter::new(
		guard,
		GuardAdapterConfig {
			policy_map: default_policy_map("preferences.read", "preferences.write"),
			..GuardAdapterConfig::default()
		},
	)
	.expect("adapter config is valid")
}

fn context_with(actor: ActorContext) -> Extensions {
	let mut ext = Extensions::new();
	ext.insert(actor);
	ext
}

#[tokio::test]
async fn test_bypass_skips_guard() {
	let guard = CountingGuard::new(Outcome::Deny);
	let adapter = adapter(guard.clone());
	let tenant = Uuid::new_v4();
	let ext = context_with(ActorContext::new(Uuid::new_v4(), "member").with_tenant(tenant));

	let result = adapter
		.enforce(GuardInput::new(&ext, CrudOperation::Read).bypass("schema introspection"))
		.await
		.expect("bypass must succeed");

	assert_eq!(guard.calls(), 0);
	assert!(result.bypassed);
	assert_eq!(result.bypass_reason.as_deref(), Some("schema introspection"));
	// Scope backfilled from the actor
	assert_eq!(result.scope.tenant_id, tenant);
}

#[tokio::test]
async fn test_bypass_keeps_explicit_scope() {
	let guard = CountingGuard::new(Outcome::Echo);
	let adapter = adapter(guard.clone());
	let ext = context_with(ActorContext::new(Uuid::new_v4(), "member").with_tenant(Uuid::new_v4()));
	let org = Uuid::new_v4();

	let result = adapter
		.enforce(
			GuardInput::new(&ext, CrudOperation::List)
				.scope(ScopeFilter::new(Uuid::nil(), org))
				.bypass("internal"),
		)
		.await
		.expect("bypass must succeed");

	assert_eq!(guard.calls(), 0);
	assert_eq!(result.scope.org_id, org);
}

#[tokio::test]
async fn test_denial_is_scope_denied() {
	let guard = CountingGuard::new(Outcome::Deny);
	let adapter = adapter(guard.clone());
	let ext = context_with(ActorContext::new(Uuid::new_v4(), "member"));

	let err = adapter.enforce(GuardInput::new(&ext, CrudOperation::Update)).await.unwrap_err();

	assert_eq!(guard.calls(), 1);
	assert_eq!(err.code(), "SCOPE_DENIED");
	assert!(matches!(err, Error::ScopeDenied(ref inner) if matches!(**inner, Error::UnauthorizedScope)));
	assert_eq!(
		guard.last_action.lock().as_ref().map(PolicyAction::as_str),
		Some("preferences.write")
	);
}

#[tokio::test]
async fn test_failure_is_enforcement_failed() {
	let adapter = adapter(CountingGuard::new(Outcome::Fail));
	let ext = context_with(ActorContext::new(Uuid::new_v4(), "member"));

	let err = adapter.enforce(GuardInput::new(&ext, CrudOperation::List)).await.unwrap_err();

	assert_eq!(err.code(), "SCOPE_ENFORCEMENT_FAILED");
	assert!(matches!(err, Error::ScopeEnforcementFailed(ref inner) if matches!(**inner, Error::DbError)));
}

#[tokio::test]
async fn test_missing_context_and_actor() {
	let guard = CountingGuard::new(Outcome::Echo);
	let adapter = adapter(guard.clone());

	let ext = Extensions::new();
	let input = GuardInput { context: None, ..GuardInput::new(&ext, CrudOperation::Read) };
	let err = adapter.enforce(input).await.unwrap_err();
	assert_eq!(err.code(), "CONTEXT_MISSING");

	let err = adapter.enforce(GuardInput::new(&ext, CrudOperation::Read)).await.unwrap_err();
	assert_eq!(err.code(), "ACTOR_CONTEXT_MISSING");

	// Claims without a usable id do not produce an actor
	let mut ext = Extensions::new();
	ext.insert(AuthClaims { sub: "alice".into(), ..AuthClaims::default() });
	let err = adapter.enforce(GuardInput::new(&ext, CrudOperation::Read)).await.unwrap_err();
	assert_eq!(err.code(), "ACTOR_CONTEXT_MISSING");

	assert_eq!(guard.calls(), 0);
}

#[tokio::test]
async fn test_claims_fallback() {
	let adapter = adapter(CountingGuard::new(Outcome::Echo));
	let uid = Uuid::new_v4();
	let tenant = Uuid::new_v4();
	let mut ext = Extensions::new();
	ext.insert(AuthClaims {
		sub: uid.to_string().into(),
		role: Some("member".into()),
		tenant_id: Some(tenant),
		..AuthClaims::default()
	});

	let result = adapter.enforce(GuardInput::new(&ext, CrudOperation::Read)).await.expect("enforce");

	assert_eq!(result.actor.actor_id, uid);
	assert_eq!(result.scope.tenant_id, tenant);
	assert!(!result.bypassed);
}

#[tokio::test]
async fn test_override_merges_onto_actor_scope() {
	let adapter = adapter(CountingGuard::new(Outcome::Echo));
	let tenant = Uuid::new_v4();
	let org = Uuid::new_v4();
	let module = Uuid::new_v4();
	let ext = context_with(
		ActorContext::new(Uuid::new_v4(), "member").with_tenant(tenant).with_organization(org),
	);

	let override_scope = ScopeFilter::default()
		.with_label("module", module)
		.with_label("ignored", Uuid::nil());
	let result = adapter
		.enforce(GuardInput::new(&ext, CrudOperation::List).scope(override_scope))
		.await
		.expect("enforce");

	assert_eq!(result.scope.tenant_id, tenant);
	assert_eq!(result.scope.org_id, org);
	assert_eq!(result.scope.label("module"), Some(module));
	assert!(!result.scope.labels.contains_key("ignored"));
}

#[tokio::test]
async fn test_construction_requires_policy() {
	let res = GuardAdapter::new(CountingGuard::new(Outcome::Echo), GuardAdapterConfig::default());
	assert!(matches!(res, Err(Error::ScopePolicyMissing(_))));

	let adapter = GuardAdapter::new(
		CountingGuard::new(Outcome::Echo),
		GuardAdapterConfig { default_action: Some("anything".into()), ..GuardAdapterConfig::default() },
	)
	.expect("default action is enough");
	assert_eq!(adapter.action_for(CrudOperation::CreateBatch).ok(), Some("anything".into()));
}

#[tokio::test]
async fn test_end_to_end_with_builtin_collaborators() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();

	let tenant = Uuid::new_v4();
	let member = ActorContext::new(Uuid::new_v4(), "member").with_tenant(Uuid::new_v4());
	let resolver = AssignmentScopeResolver::new(vec!["system_admin".into()]);
	resolver.assign(member.actor_id, ScopeFilter::tenant(tenant));

	let guard = Guard::new(
		Some(Arc::new(resolver)),
		Some(Arc::new(
			RolePolicy::new()
				.allow("preferences.read", &["member"])
				.allow("preferences.write", &["member"]),
		)),
	);
	let adapter = adapter(Arc::new(guard));
	let ext = context_with(member);

	// Assigned tenant replaces the one carried by the actor context
	let result = adapter.enforce(GuardInput::new(&ext, CrudOperation::Read)).await.expect("enforce");
	assert_eq!(result.scope.tenant_id, tenant);

	let ext = context_with(ActorContext::new(Uuid::new_v4(), "member"));
	let err = adapter.enforce(GuardInput::new(&ext, CrudOperation::Read)).await.unwrap_err();
	assert_eq!(err.code(), "SCOPE_DENIED");
}

// vim: ts=4
