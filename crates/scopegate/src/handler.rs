//! Preference HTTP handlers
//!
//! Every handler runs the request through the guard adapter first and hands
//! the guarded actor and scope to the preference service.

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::gate::Gate;
use crate::prelude::*;
use scopegate_core::extract::{OptionalRequestId, RequestExtensions};
use scopegate_core::guard_adapter::GuardInput;
use scopegate_core::preference::{
	DeletePreference, ListPreferences, PreferenceSnapshot, ResolveInput, SetPreference,
};
use scopegate_types::preference_adapter::{PreferenceLevel, PreferenceRecord};
use scopegate_types::types::ApiResponse;

/// Per-request scope override; unset components are left to the actor's context
fn scope_override(tenant_id: Option<Uuid>, org_id: Option<Uuid>) -> ScopeFilter {
	ScopeFilter::new(tenant_id.unwrap_or_default(), org_id.unwrap_or_default())
}

fn split_list(list: Option<&str>) -> Vec<Box<str>> {
	list.map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(Box::from).collect())
		.unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListPreferencesQuery {
	pub tenant_id: Option<Uuid>,
	pub org_id: Option<Uuid>,
	pub level: Option<PreferenceLevel>,
	pub user_id: Option<Uuid>,
	/// Comma separated
	pub keys: Option<String>,
}

/// GET /preferences - stored preference records visible to the caller
pub async fn list_preferences(
	State(gate): State<Gate>,
	RequestExtensions(ext): RequestExtensions,
	OptionalRequestId(req_id): OptionalRequestId,
	Query(query): Query<ListPreferencesQuery>,
) -> SgResult<(StatusCode, Json<ApiResponse<Vec<PreferenceRecord>>>)> {
	let guarded = gate
		.adapter
		.enforce(
			GuardInput::new(&ext, CrudOperation::List)
				.scope(scope_override(query.tenant_id, query.org_id)),
		)
		.await?;

	let records = gate
		.preferences
		.index(
			&guarded.actor,
			ListPreferences {
				scope: guarded.scope,
				level: query.level,
				user_id: query.user_id,
				keys: split_list(query.keys.as_deref()),
			},
		)
		.await?;

	let total = records.len();
	let response = ApiResponse::new(records).with_total(total).with_req_id(req_id);
	Ok((StatusCode::OK, Json(response)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectivePreferencesQuery {
	pub tenant_id: Option<Uuid>,
	pub org_id: Option<Uuid>,
	/// Defaults to the caller
	pub user_id: Option<Uuid>,
	/// Comma separated level names
	pub levels: Option<String>,
	/// Comma separated
	pub keys: Option<String>,
}

/// GET /preferences/effective - merged preferences with per-level provenance
pub async fn get_effective_preferences(
	State(gate): State<Gate>,
	RequestExtensions(ext): RequestExtensions,
	OptionalRequestId(req_id): OptionalRequestId,
	Query(query): Query<EffectivePreferencesQuery>,
) -> SgResult<(StatusCode, Json<ApiResponse<PreferenceSnapshot>>)> {
	let levels = split_list(query.levels.as_deref())
		.iter()
		.map(|level| level.parse::<PreferenceLevel>())
		.collect::<SgResult<Vec<_>>>()?;

	let guarded = gate
		.adapter
		.enforce(
			GuardInput::new(&ext, CrudOperation::Read)
				.scope(scope_override(query.tenant_id, query.org_id)),
		)
		.await?;

	let snapshot = gate
		.preferences
		.resolve(
			&guarded.actor,
			ResolveInput {
				user_id: query.user_id.or(Some(guarded.actor.actor_id)),
				scope: guarded.scope,
				levels,
				keys: split_list(query.keys.as_deref()),
				..ResolveInput::default()
			},
		)
		.await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(snapshot).with_req_id(req_id))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutPreferenceRequest {
	pub level: PreferenceLevel,
	pub value: serde_json::Value,
	pub user_id: Option<Uuid>,
	pub tenant_id: Option<Uuid>,
	pub org_id: Option<Uuid>,
}

/// PUT /preferences/{key} - create or replace a value at one level
pub async fn put_preference(
	State(gate): State<Gate>,
	RequestExtensions(ext): RequestExtensions,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(key): Path<String>,
	Json(req): Json<PutPreferenceRequest>,
) -> SgResult<(StatusCode, Json<ApiResponse<PreferenceRecord>>)> {
	let guarded = gate
		.adapter
		.enforce(
			GuardInput::new(&ext, CrudOperation::Update)
				.scope(scope_override(req.tenant_id, req.org_id)),
		)
		.await?;

	let record = gate
		.preferences
		.upsert(
			&guarded.actor,
			SetPreference {
				level: req.level,
				scope: guarded.scope,
				user_id: user_for(req.level, req.user_id, &guarded.actor),
				key: key.into(),
				value: req.value,
			},
		)
		.await?;

	let status = if record.version == 1 { StatusCode::CREATED } else { StatusCode::OK };
	Ok((status, Json(ApiResponse::new(record).with_req_id(req_id))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePreferenceQuery {
	pub level: PreferenceLevel,
	pub user_id: Option<Uuid>,
	pub tenant_id: Option<Uuid>,
	pub org_id: Option<Uuid>,
}

/// DELETE /preferences/{key}
pub async fn delete_preference(
	State(gate): State<Gate>,
	RequestExtensions(ext): RequestExtensions,
	Path(key): Path<String>,
	Query(query): Query<DeletePreferenceQuery>,
) -> SgResult<StatusCode> {
	let guarded = gate
		.adapter
		.enforce(
			GuardInput::new(&ext, CrudOperation::Delete)
				.scope(scope_override(query.tenant_id, query.org_id)),
		)
		.await?;

	gate.preferences
		.delete(
			&guarded.actor,
			DeletePreference {
				level: query.level,
				scope: guarded.scope,
				user_id: user_for(query.level, query.user_id, &guarded.actor),
				key: key.into(),
			},
		)
		.await?;

	Ok(StatusCode::NO_CONTENT)
}

/// User-level writes default to the caller
fn user_for(
	level: PreferenceLevel,
	user_id: Option<Uuid>,
	actor: &scopegate_types::actor::ActorContext,
) -> Option<Uuid> {
	match level {
		PreferenceLevel::User => user_id.or(Some(actor.actor_id)),
		_ => user_id,
	}
}

// vim: ts=4
