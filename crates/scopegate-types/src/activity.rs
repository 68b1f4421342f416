//! Audit-log (activity) rows and the filters used to query them.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::prelude::*;
use crate::scope::ScopeFilter;

/// One audit-log entry
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
	pub id: Uuid,
	/// User the activity is about
	pub user_id: Uuid,
	/// Actor who performed it
	pub actor_id: Uuid,
	pub tenant_id: Uuid,
	pub org_id: Uuid,
	pub verb: Box<str>,
	pub object_type: Box<str>,
	pub object_id: Option<Box<str>>,
	pub channel: Option<Box<str>>,
	pub ip: Option<Box<str>>,
	/// Free-form payload
	pub data: Option<serde_json::Value>,
	pub occurred_at: Timestamp,
}

/// List/feed query
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityFilter {
	pub user_id: Option<Uuid>,
	pub actor_id: Option<Uuid>,
	pub scope: ScopeFilter,
	pub verbs: Vec<Box<str>>,
	pub object_type: Option<Box<str>>,
	pub since: Option<Timestamp>,
	pub until: Option<Timestamp>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

/// Aggregate query
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityStatsFilter {
	pub user_id: Option<Uuid>,
	pub actor_id: Option<Uuid>,
	pub scope: ScopeFilter,
	pub verbs: Vec<Box<str>>,
	pub since: Option<Timestamp>,
	pub until: Option<Timestamp>,
	pub group_by: Option<Box<str>>,
}

// vim: ts=4
