//! Preference storage model and the repository trait backing it.
//!
//! Every level is stored independently. A record is identified by
//! `(level, tenant_id, org_id, user_id, lowercase(key))`; keys compare
//! case-insensitively but are stored as provided.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;
use uuid::Uuid;

use crate::prelude::*;
use crate::scope::ScopeFilter;

pub const MAX_KEY_LENGTH: usize = 255;

/// Override precedence, lowest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceLevel {
	System,
	Tenant,
	Org,
	User,
}

impl PreferenceLevel {
	/// Default resolution order, ascending precedence
	pub const ALL: [PreferenceLevel; 4] =
		[PreferenceLevel::System, PreferenceLevel::Tenant, PreferenceLevel::Org, PreferenceLevel::User];

	pub fn as_str(&self) -> &'static str {
		match self {
			PreferenceLevel::System => "system",
			PreferenceLevel::Tenant => "tenant",
			PreferenceLevel::Org => "org",
			PreferenceLevel::User => "user",
		}
	}

	/// The identity tuple `(tenant, org, user)` a record at this level is stored under.
	///
	/// Fields that do not belong to the level are cleared. Returns `None` when
	/// the level's identifying component (tenant, org or user id) is missing.
	pub fn identity_scope(
		&self,
		scope: &ScopeFilter,
		user_id: Option<Uuid>,
	) -> Option<(Uuid, Uuid, Uuid)> {
		let user_id = user_id.filter(|id| !id.is_nil());
		match self {
			PreferenceLevel::System => Some((Uuid::nil(), Uuid::nil(), Uuid::nil())),
			PreferenceLevel::Tenant => Some((scope.tenant_id()?, Uuid::nil(), Uuid::nil())),
			PreferenceLevel::Org => Some((scope.tenant_id, scope.org_id()?, Uuid::nil())),
			PreferenceLevel::User => Some((scope.tenant_id, scope.org_id, user_id?)),
		}
	}
}

impl std::fmt::Display for PreferenceLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for PreferenceLevel {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PreferenceLevel::ALL
			.into_iter()
			.find(|level| level.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| Error::ValidationError(format!("Unknown preference level: {}", s)))
	}
}

/// Stored preference value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
	pub id: Uuid,
	pub user_id: Uuid,
	pub scope: ScopeFilter,
	pub level: PreferenceLevel,
	pub key: Box<str>,
	pub value: serde_json::Value,
	pub version: u32,
	pub created_at: Timestamp,
	pub created_by: Uuid,
	pub updated_at: Timestamp,
	pub updated_by: Uuid,
}

impl PreferenceRecord {
	pub fn identity(&self) -> PreferenceIdentity {
		PreferenceIdentity {
			level: self.level,
			tenant_id: self.scope.tenant_id,
			org_id: self.scope.org_id,
			user_id: self.user_id,
			key: self.key.clone(),
		}
	}
}

/// Unique identity of a preference record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceIdentity {
	pub level: PreferenceLevel,
	pub tenant_id: Uuid,
	pub org_id: Uuid,
	pub user_id: Uuid,
	pub key: Box<str>,
}

impl PreferenceIdentity {
	/// Validate the key and normalize the scope to what `level` stores
	pub fn new(
		level: PreferenceLevel,
		scope: &ScopeFilter,
		user_id: Option<Uuid>,
		key: &str,
	) -> SgResult<Self> {
		validate_key(key)?;
		let (tenant_id, org_id, user_id) =
			level.identity_scope(scope, user_id).ok_or_else(|| {
				Error::ValidationError(format!(
					"Preference level '{}' requires its identifying scope",
					level
				))
			})?;
		Ok(Self { level, tenant_id, org_id, user_id, key: key.into() })
	}

	/// Lowercased key used for comparisons and the unique constraint
	pub fn key_lc(&self) -> String {
		self.key.to_lowercase()
	}

	pub fn scope(&self) -> ScopeFilter {
		ScopeFilter::new(self.tenant_id, self.org_id)
	}

	pub fn matches(&self, record: &PreferenceRecord) -> bool {
		self.level == record.level
			&& self.tenant_id == record.scope.tenant_id
			&& self.org_id == record.scope.org_id
			&& self.user_id == record.user_id
			&& self.key.to_lowercase() == record.key.to_lowercase()
	}
}

pub fn validate_key(key: &str) -> SgResult<()> {
	if key.trim().is_empty() {
		return Err(Error::ValidationError("Preference key must not be empty".into()));
	}
	if key.len() > MAX_KEY_LENGTH {
		return Err(Error::ValidationError(format!(
			"Preference key exceeds {} characters",
			MAX_KEY_LENGTH
		)));
	}
	Ok(())
}

/// Filter for `PreferenceRepository::list_preferences`.
///
/// `None` leaves a field unconstrained; `Some(Uuid::nil())` matches only
/// records stored without that component. `keys` compares case-insensitively;
/// an empty list matches every key.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListPreferenceOptions {
	pub level: Option<PreferenceLevel>,
	pub tenant_id: Option<Uuid>,
	pub org_id: Option<Uuid>,
	pub user_id: Option<Uuid>,
	pub keys: Vec<Box<str>>,
}

impl ListPreferenceOptions {
	/// Exact-match filter for one identity tuple
	pub fn exact(level: PreferenceLevel, (tenant_id, org_id, user_id): (Uuid, Uuid, Uuid)) -> Self {
		Self {
			level: Some(level),
			tenant_id: Some(tenant_id),
			org_id: Some(org_id),
			user_id: Some(user_id),
			keys: Vec::new(),
		}
	}

	pub fn with_keys(mut self, keys: &[Box<str>]) -> Self {
		self.keys = keys.to_vec();
		self
	}

	pub fn matches(&self, record: &PreferenceRecord) -> bool {
		self.level.is_none_or(|level| level == record.level)
			&& self.tenant_id.is_none_or(|id| id == record.scope.tenant_id)
			&& self.org_id.is_none_or(|id| id == record.scope.org_id)
			&& self.user_id.is_none_or(|id| id == record.user_id)
			&& (self.keys.is_empty()
				|| self.keys.iter().any(|key| key.to_lowercase() == record.key.to_lowercase()))
	}
}

/// Data for `PreferenceRepository::upsert_preference`
#[derive(Clone, Debug)]
pub struct UpsertPreference {
	pub identity: PreferenceIdentity,
	pub value: serde_json::Value,
	/// Recorded as `created_by` on insert and `updated_by` on every write
	pub actor_id: Uuid,
}

/// Storage collaborator for preference rows.
///
/// `upsert_preference` must be atomic per identity: a first write creates the
/// record at version 1, every later write replaces the value whole and bumps
/// the version by exactly one.
#[async_trait]
pub trait PreferenceRepository: Debug + Send + Sync {
	async fn list_preferences(
		&self,
		opts: &ListPreferenceOptions,
	) -> SgResult<Vec<PreferenceRecord>>;

	async fn upsert_preference(&self, data: UpsertPreference) -> SgResult<PreferenceRecord>;

	/// Returns `Error::NotFound` when no record has this identity
	async fn delete_preference(&self, identity: &PreferenceIdentity) -> SgResult<()>;
}


// vim: ts=4
