//! Gate configuration, loaded from JSON
//!
//! Every field has a default, so `{}` is a valid (if permissive) config:
//! read/write actions default to `preferences.read` / `preferences.write`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::activity_access::ActivityAccessConfig;
use crate::guard_adapter::default_policy_map;
use crate::preference::{PreferenceActions, PreferenceMap};
use crate::prelude::*;
use crate::roles;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GateConfig {
	pub policy: PolicyConfig,
	pub activity: ActivityAccessConfig,
	pub preferences: PreferenceConfig,
}

impl GateConfig {
	pub fn from_json_str(json: &str) -> SgResult<Self> {
		serde_json::from_str(json).map_err(|err| Error::ConfigError(err.to_string()))
	}

	pub fn from_file(path: impl AsRef<Path>) -> SgResult<Self> {
		let path = path.as_ref();
		let json = std::fs::read_to_string(path).map_err(|err| {
			Error::ConfigError(format!("cannot read {}: {}", path.display(), err))
		})?;
		let config = Self::from_json_str(&json)?;
		info!(path = %path.display(), "loaded gate config");
		Ok(config)
	}
}

// PolicyConfig //
//**************//
/// CRUD verb → policy action table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyConfig {
	pub read_action: Option<PolicyAction>,
	pub write_action: Option<PolicyAction>,
	/// Used for verbs the table does not cover
	pub default_action: Option<PolicyAction>,
	pub overrides: HashMap<CrudOperation, PolicyAction>,
}

impl PolicyConfig {
	/// Read verbs map to the read action, mutations to the write action; overrides win.
	///
	/// An unset read or write action falls back to the preference action, unless
	/// `default_action` is set: those verbs are then left out and the adapter
	/// resolves them through the default.
	pub fn policy_map(&self) -> HashMap<CrudOperation, PolicyAction> {
		let defaults = PreferenceActions::default();
		let deferred = self.default_action.is_some();
		let read = self.read_action.clone().or((!deferred).then_some(defaults.read));
		let write = self.write_action.clone().or((!deferred).then_some(defaults.write));

		let mut map: HashMap<CrudOperation, PolicyAction> =
			default_policy_map(read.clone().unwrap_or_default(), write.clone().unwrap_or_default())
				.into_iter()
				.filter(|(op, _)| if op.is_read() { read.is_some() } else { write.is_some() })
				.collect();
		map.extend(self.overrides.iter().map(|(op, action)| (*op, action.clone())));
		map
	}
}

// PreferenceConfig //
//******************//
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferenceConfig {
	/// System-level defaults seeded under every resolution
	pub defaults: PreferenceMap,
	pub restricted_roles: Vec<Box<str>>,
}

impl Default for PreferenceConfig {
	fn default() -> Self {
		Self {
			defaults: PreferenceMap::new(),
			restricted_roles: roles::to_owned_roles(roles::DEFAULT_RESTRICTED_ROLES),
		}
	}
}


// vim: ts=4
