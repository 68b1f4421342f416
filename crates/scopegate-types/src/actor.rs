//! Request-scoped actor information attached by authentication middleware.
//!
//! An [`ActorContext`] is the first-class actor. When only token claims are
//! available, [`AuthClaims::to_actor_context`] is the fallback path.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::scope::{ActorRef, ScopeFilter};

/// Context struct for an authenticated actor
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActorContext {
	pub actor_id: Uuid,
	pub subject: Box<str>,
	pub role: Box<str>,
	pub tenant_id: Uuid,
	pub organization_id: Uuid,
}

impl ActorContext {
	pub fn new(actor_id: Uuid, role: impl Into<Box<str>>) -> Self {
		Self { actor_id, subject: actor_id.to_string().into(), role: role.into(), ..Self::default() }
	}

	pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
		self.tenant_id = tenant_id;
		self
	}

	pub fn with_organization(mut self, organization_id: Uuid) -> Self {
		self.organization_id = organization_id;
		self
	}

	pub fn actor_ref(&self) -> ActorRef {
		ActorRef::new(self.actor_id, self.role.clone())
	}

	/// Scope derived from the actor's own tenant and organization
	pub fn scope(&self) -> ScopeFilter {
		ScopeFilter::new(self.tenant_id, self.organization_id)
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.role.as_ref() == role
	}
}

/// Role used for a decision: an explicit non-empty hint wins over the context's role
pub fn effective_role<'a>(actor: &'a ActorContext, role_hint: Option<&'a str>) -> &'a str {
	match role_hint {
		Some(hint) if !hint.is_empty() => hint,
		_ => &actor.role,
	}
}

/// Token claims attached to a request when no `ActorContext` was resolved
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthClaims {
	pub sub: Box<str>,
	pub uid: Option<Uuid>,
	pub role: Option<Box<str>>,
	pub tenant_id: Option<Uuid>,
	pub org_id: Option<Uuid>,
}

impl AuthClaims {
	/// Build an actor context from the claims.
	///
	/// The actor id comes from `uid`, or from `sub` when it is a UUID.
	/// Returns `None` when neither yields an id.
	pub fn to_actor_context(&self) -> Option<ActorContext> {
		let actor_id = self
			.uid
			.filter(|id| !id.is_nil())
			.or_else(|| Uuid::parse_str(&self.sub).ok().filter(|id| !id.is_nil()))?;

		Some(ActorContext {
			actor_id,
			subject: if self.sub.is_empty() { actor_id.to_string().into() } else { self.sub.clone() },
			role: self.role.clone().unwrap_or_default(),
			tenant_id: self.tenant_id.unwrap_or_default(),
			organization_id: self.org_id.unwrap_or_default(),
		})
	}
}


// vim: ts=4
