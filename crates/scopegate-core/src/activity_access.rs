//! Row and field level access policy for audit-log (activity) reads
//!
//! `apply`/`apply_stats` narrow a query before it reaches storage, `sanitize`
//! filters and redacts the rows that come back. Everything here is pure: no
//! I/O, no shared state.
//!
//! Viewer classes, decided from the effective role (hint first):
//! - admin: keeps IP addresses; may query across tenants if `allow_cross_tenant`
//! - restricted: pinned to its own identity, payload data removed
//! - everyone else: pinned to its own tenant (and organization, if it has one)

use serde::Deserialize;
use uuid::Uuid;

use crate::prelude::*;
use crate::roles;
use scopegate_types::activity::{ActivityFilter, ActivityRecord, ActivityStatsFilter};
use scopegate_types::actor::{ActorContext, effective_role};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityAccessConfig {
	pub restricted_roles: Vec<Box<str>>,
	pub admin_roles: Vec<Box<str>>,
	pub allow_cross_tenant: bool,
	pub strip_ip: bool,
	pub strip_data_for_restricted: bool,
}

impl Default for ActivityAccessConfig {
	fn default() -> Self {
		Self {
			restricted_roles: roles::to_owned_roles(roles::DEFAULT_RESTRICTED_ROLES),
			admin_roles: roles::to_owned_roles(roles::DEFAULT_ADMIN_ROLES),
			allow_cross_tenant: false,
			strip_ip: true,
			strip_data_for_restricted: true,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Viewer {
	Admin,
	Restricted,
	Member,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityAccessPolicy {
	config: ActivityAccessConfig,
}

impl ActivityAccessPolicy {
	pub fn new(config: ActivityAccessConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &ActivityAccessConfig {
		&self.config
	}

	fn viewer(&self, actor: &ActorContext, role_hint: Option<&str>) -> Viewer {
		let role = effective_role(actor, role_hint);
		if roles::contains_role(&self.config.admin_roles, role) {
			Viewer::Admin
		} else if roles::contains_role(&self.config.restricted_roles, role) {
			Viewer::Restricted
		} else {
			Viewer::Member
		}
	}

	fn cross_tenant(&self, viewer: Viewer) -> bool {
		viewer == Viewer::Admin && self.config.allow_cross_tenant
	}

	/// Scope the viewer may query, given what it asked for.
	///
	/// Fails closed with `PermissionDenied` when a tenant-bound viewer has no tenant.
	fn narrow_scope(
		&self,
		actor: &ActorContext,
		viewer: Viewer,
		requested: &ScopeFilter,
	) -> SgResult<ScopeFilter> {
		if self.cross_tenant(viewer) {
			return Ok(requested.clone());
		}
		if actor.tenant_id.is_nil() {
			warn!(actor = %actor.actor_id, role = %actor.role, "activity query without tenant");
			return Err(Error::PermissionDenied);
		}

		let mut scope = requested.clone();
		scope.tenant_id = actor.tenant_id;
		if viewer != Viewer::Admin && !actor.organization_id.is_nil() {
			scope.org_id = actor.organization_id;
		}
		Ok(scope)
	}

	/// Narrow a list/feed query to what the viewer may see
	pub fn apply(
		&self,
		actor: &ActorContext,
		role_hint: Option<&str>,
		mut filter: ActivityFilter,
	) -> SgResult<ActivityFilter> {
		let viewer = self.viewer(actor, role_hint);
		filter.scope = self.narrow_scope(actor, viewer, &filter.scope)?;
		if viewer == Viewer::Restricted {
			filter.user_id = Some(actor.actor_id);
			filter.actor_id = Some(actor.actor_id);
		}
		Ok(filter)
	}

	/// Same narrowing for aggregate queries
	pub fn apply_stats(
		&self,
		actor: &ActorContext,
		role_hint: Option<&str>,
		mut filter: ActivityStatsFilter,
	) -> SgResult<ActivityStatsFilter> {
		let viewer = self.viewer(actor, role_hint);
		filter.scope = self.narrow_scope(actor, viewer, &filter.scope)?;
		if viewer == Viewer::Restricted {
			filter.user_id = Some(actor.actor_id);
			filter.actor_id = Some(actor.actor_id);
		}
		Ok(filter)
	}

	/// Drop rows outside the viewer's identity, tenant or organization and redact the rest
	pub fn sanitize(
		&self,
		actor: &ActorContext,
		role_hint: Option<&str>,
		records: Vec<ActivityRecord>,
	) -> Vec<ActivityRecord> {
		let viewer = self.viewer(actor, role_hint);
		let strip_ip = self.config.strip_ip && viewer != Viewer::Admin;
		let strip_data = self.config.strip_data_for_restricted && viewer == Viewer::Restricted;

		let total = records.len();
		let visible: Vec<ActivityRecord> = records
			.into_iter()
			.filter(|record| self.is_visible(actor, viewer, record))
			.map(|mut record| {
				if strip_ip {
					record.ip = None;
				}
				if strip_data {
					record.data = None;
				}
				record
			})
			.collect();

		if visible.len() != total {
			debug!(
				actor = %actor.actor_id,
				dropped = total - visible.len(),
				"dropped activity rows outside viewer scope"
			);
		}
		visible
	}

	fn is_visible(&self, actor: &ActorContext, viewer: Viewer, record: &ActivityRecord) -> bool {
		if !self.cross_tenant(viewer) && (actor.tenant_id.is_nil() || record.tenant_id != actor.tenant_id)
		{
			return false;
		}
		if viewer != Viewer::Admin
			&& !actor.organization_id.is_nil()
			&& record.org_id != actor.organization_id
		{
			return false;
		}
		if viewer == Viewer::Restricted {
			return involves(record, actor.actor_id);
		}
		true
	}
}

/// The row is about `id` or was performed by `id`
fn involves(record: &ActivityRecord, id: Uuid) -> bool {
	record.user_id == id || record.actor_id == id
}


// vim: ts=4
