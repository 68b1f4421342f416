//! Preference commands and queries
//!
//! Every operation enforces the scope guard first and talks to the repository
//! with the resolved scope only. Restricted actors (support staff) are pinned
//! to their own user id on both the way in and the way out.

use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::resolver::{PreferenceSnapshot, ResolveInput, Resolver};
use crate::guard::ScopeGuard;
use crate::prelude::*;
use crate::roles;
use scopegate_types::actor::ActorContext;
use scopegate_types::preference_adapter::{
	ListPreferenceOptions, PreferenceIdentity, PreferenceLevel, PreferenceRecord,
	PreferenceRepository, UpsertPreference,
};

/// Preference index query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListPreferences {
	pub scope: ScopeFilter,
	pub level: Option<PreferenceLevel>,
	pub user_id: Option<Uuid>,
	pub keys: Vec<Box<str>>,
}

/// Create or replace one preference value
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPreference {
	pub level: PreferenceLevel,
	#[serde(default)]
	pub scope: ScopeFilter,
	pub user_id: Option<Uuid>,
	pub key: Box<str>,
	pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePreference {
	pub level: PreferenceLevel,
	#[serde(default)]
	pub scope: ScopeFilter,
	pub user_id: Option<Uuid>,
	pub key: Box<str>,
}

#[derive(Debug, Clone)]
pub struct PreferenceActions {
	pub read: PolicyAction,
	pub write: PolicyAction,
}

impl Default for PreferenceActions {
	fn default() -> Self {
		Self { read: "preferences.read".into(), write: "preferences.write".into() }
	}
}

pub struct PreferenceService {
	guard: Arc<dyn ScopeGuard>,
	repo: Arc<dyn PreferenceRepository>,
	resolver: Resolver,
	actions: PreferenceActions,
	restricted_roles: Vec<Box<str>>,
}

impl PreferenceService {
	pub fn new(
		guard: Arc<dyn ScopeGuard>,
		repo: Arc<dyn PreferenceRepository>,
		resolver: Resolver,
	) -> Self {
		Self {
			guard,
			repo,
			resolver,
			actions: PreferenceActions::default(),
			restricted_roles: roles::to_owned_roles(roles::DEFAULT_RESTRICTED_ROLES),
		}
	}

	pub fn with_actions(mut self, actions: PreferenceActions) -> Self {
		self.actions = actions;
		self
	}

	pub fn with_restricted_roles(mut self, restricted_roles: Vec<Box<str>>) -> Self {
		self.restricted_roles = restricted_roles;
		self
	}

	pub fn resolver(&self) -> &Resolver {
		&self.resolver
	}

	fn is_restricted(&self, actor: &ActorContext) -> bool {
		roles::contains_role(&self.restricted_roles, &actor.role)
	}

	/// List stored records visible to `actor`
	pub async fn index(
		&self,
		actor: &ActorContext,
		mut query: ListPreferences,
	) -> SgResult<Vec<PreferenceRecord>> {
		let restricted = self.is_restricted(actor);
		if restricted {
			query.user_id = Some(actor.actor_id);
		}

		let scope =
			self.guard.enforce(&actor.actor_ref(), &query.scope, &self.actions.read, None).await?;

		let opts = ListPreferenceOptions {
			level: query.level,
			tenant_id: scope.tenant_id(),
			org_id: scope.org_id(),
			user_id: query.user_id,
			keys: query.keys,
		};
		let mut records = self.repo.list_preferences(&opts).await?;

		if restricted {
			let before = records.len();
			records.retain(|r| r.user_id == actor.actor_id);
			if records.len() != before {
				debug!(
					actor = %actor.actor_id,
					dropped = before - records.len(),
					"dropped preference rows outside restricted identity"
				);
			}
		}
		Ok(records)
	}

	/// Effective preferences with provenance for the guarded scope
	pub async fn resolve(
		&self,
		actor: &ActorContext,
		mut input: ResolveInput,
	) -> SgResult<PreferenceSnapshot> {
		if self.is_restricted(actor) {
			input.user_id = Some(actor.actor_id);
		}

		input.scope =
			self.guard.enforce(&actor.actor_ref(), &input.scope, &self.actions.read, None).await?;
		self.resolver.resolve(&input).await
	}

	pub async fn upsert(&self, actor: &ActorContext, cmd: SetPreference) -> SgResult<PreferenceRecord> {
		let user_id = self.writable_user(actor, cmd.level, cmd.user_id)?;
		let scope =
			self.guard.enforce(&actor.actor_ref(), &cmd.scope, &self.actions.write, None).await?;
		let identity = PreferenceIdentity::new(cmd.level, &scope, user_id, &cmd.key)?;

		let record = self
			.repo
			.upsert_preference(UpsertPreference {
				identity,
				value: cmd.value,
				actor_id: actor.actor_id,
			})
			.await?;

		info!(
			actor = %actor.actor_id,
			level = %record.level,
			key = %record.key,
			version = record.version,
			tenant = %record.scope.tenant_id,
			"preference stored"
		);
		Ok(record)
	}

	pub async fn delete(&self, actor: &ActorContext, cmd: DeletePreference) -> SgResult<()> {
		let user_id = self.writable_user(actor, cmd.level, cmd.user_id)?;
		let scope =
			self.guard.enforce(&actor.actor_ref(), &cmd.scope, &self.actions.write, None).await?;
		let identity = PreferenceIdentity::new(cmd.level, &scope, user_id, &cmd.key)?;

		self.repo.delete_preference(&identity).await?;

		info!(
			actor = %actor.actor_id,
			level = %identity.level,
			key = %identity.key,
			tenant = %identity.tenant_id,
			"preference deleted"
		);
		Ok(())
	}

	/// Restricted actors may only write their own user-level values
	fn writable_user(
		&self,
		actor: &ActorContext,
		level: PreferenceLevel,
		user_id: Option<Uuid>,
	) -> SgResult<Option<Uuid>> {
		if !self.is_restricted(actor) {
			return Ok(user_id);
		}
		if level != PreferenceLevel::User || user_id.is_some_and(|id| id != actor.actor_id) {
			warn!(actor = %actor.actor_id, level = %level, "restricted actor write rejected");
			return Err(Error::PermissionDenied);
		}
		Ok(Some(actor.actor_id))
	}
}

impl std::fmt::Debug for PreferenceService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PreferenceService")
			.field("resolver", &self.resolver)
			.field("actions", &self.actions)
			.field("restricted_roles", &self.restricted_roles)
			.finish_non_exhaustive()
	}
}

// vim: ts=4
