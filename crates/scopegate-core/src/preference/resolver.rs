//! Layered preference resolution
//!
//! Values are read per level (system → tenant → org → user) and stacked in
//! ascending precedence. For each key the highest level that defines it wins
//! with its whole value; nested structures are never merged across levels.
//! Every resolved key carries a per-level trace of where its value came from.

use serde::Serialize;
use serde_with::skip_serializing_none;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::prelude::*;
use scopegate_types::preference_adapter::{
	ListPreferenceOptions, PreferenceLevel, PreferenceRepository,
};

pub type PreferenceMap = BTreeMap<String, serde_json::Value>;

/// Parameters for [`Resolver::resolve`]
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
	pub user_id: Option<Uuid>,
	pub scope: ScopeFilter,
	/// Levels to consult; empty means all of them
	pub levels: Vec<PreferenceLevel>,
	/// Keys to resolve; empty means every key found
	pub keys: Vec<Box<str>>,
	/// Caller defaults, layered over the configured defaults at system level
	pub base: PreferenceMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreferenceSnapshot {
	pub effective: PreferenceMap,
	pub traces: Vec<PreferenceTrace>,
}

impl PreferenceSnapshot {
	pub fn trace(&self, key: &str) -> Option<&PreferenceTrace> {
		let key = key.to_lowercase();
		self.traces.iter().find(|t| t.key.to_lowercase() == key)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceTrace {
	pub key: Box<str>,
	pub layers: Vec<PreferenceTraceLayer>,
}

impl PreferenceTrace {
	pub fn layer(&self, level: PreferenceLevel) -> Option<&PreferenceTraceLayer> {
		self.layers.iter().find(|l| l.level == level)
	}

	/// Level that supplied the effective value
	pub fn winner(&self) -> Option<PreferenceLevel> {
		self.layers.iter().rev().find(|l| l.found).map(|l| l.level)
	}
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceTraceLayer {
	pub level: PreferenceLevel,
	/// Scope values used to query this level
	pub tenant_id: Uuid,
	pub org_id: Uuid,
	pub user_id: Uuid,
	pub found: bool,
	pub value: Option<serde_json::Value>,
	/// Stored record that supplied the value; `None` for defaults
	pub record_id: Option<Uuid>,
}

#[derive(Debug)]
struct LayerEntry {
	key: Box<str>,
	value: serde_json::Value,
	record_id: Option<Uuid>,
}

#[derive(Debug)]
struct Layer {
	level: PreferenceLevel,
	tenant_id: Uuid,
	org_id: Uuid,
	user_id: Uuid,
	/// Keyed by lowercased key
	entries: BTreeMap<String, LayerEntry>,
}

/// Levels to consult, in ascending precedence.
///
/// Deduplicates, drops levels whose identifying scope is missing and falls
/// back to `[System]` if nothing survives.
pub fn level_order(
	requested: &[PreferenceLevel],
	scope: &ScopeFilter,
	user_id: Option<Uuid>,
) -> Vec<PreferenceLevel> {
	let mut levels =
		if requested.is_empty() { PreferenceLevel::ALL.to_vec() } else { requested.to_vec() };
	levels.sort();
	levels.dedup();
	levels.retain(|level| level.identity_scope(scope, user_id).is_some());
	if levels.is_empty() {
		levels.push(PreferenceLevel::System);
	}
	levels
}

#[derive(Debug, Clone)]
pub struct Resolver {
	repo: Arc<dyn PreferenceRepository>,
	defaults: PreferenceMap,
}

impl Resolver {
	pub fn new(repo: Arc<dyn PreferenceRepository>) -> Self {
		Self { repo, defaults: PreferenceMap::new() }
	}

	/// Defaults seeded at system level, below the caller's base map
	pub fn with_defaults(mut self, defaults: PreferenceMap) -> Self {
		self.defaults = defaults;
		self
	}

	pub fn defaults(&self) -> &PreferenceMap {
		&self.defaults
	}

	pub async fn resolve(&self, input: &ResolveInput) -> SgResult<PreferenceSnapshot> {
		let levels = level_order(&input.levels, &input.scope, input.user_id);
		let wanted: HashSet<String> = input.keys.iter().map(|k| k.to_lowercase()).collect();
		let is_wanted = |key: &str| wanted.is_empty() || wanted.contains(&key.to_lowercase());

		debug!(
			levels = ?levels,
			keys = input.keys.len(),
			tenant = %input.scope.tenant_id,
			"resolving preferences"
		);

		let mut layers = Vec::with_capacity(levels.len());
		for level in levels {
			let Some(ids) = level.identity_scope(&input.scope, input.user_id) else {
				continue;
			};
			let mut entries = BTreeMap::new();

			if level == PreferenceLevel::System {
				for (key, value) in self.defaults.iter().chain(input.base.iter()) {
					if is_wanted(key) {
						entries.insert(
							key.to_lowercase(),
							LayerEntry { key: key.as_str().into(), value: value.clone(), record_id: None },
						);
					}
				}
			}

			let opts = ListPreferenceOptions::exact(level, ids).with_keys(&input.keys);
			for record in self.repo.list_preferences(&opts).await? {
				if !is_wanted(&record.key) {
					continue;
				}
				entries.insert(
					record.key.to_lowercase(),
					LayerEntry { key: record.key, value: record.value, record_id: Some(record.id) },
				);
			}

			let (tenant_id, org_id, user_id) = ids;
			layers.push(Layer { level, tenant_id, org_id, user_id, entries });
		}

		let effective = merge_layers(&layers);
		let traces = build_traces(&layers, &input.keys);
		debug!(effective = effective.len(), traces = traces.len(), "preferences resolved");

		Ok(PreferenceSnapshot { effective, traces })
	}
}

/// Highest layer wins per key, whole value
fn merge_layers(layers: &[Layer]) -> PreferenceMap {
	let mut winners: BTreeMap<&str, &LayerEntry> = BTreeMap::new();
	for layer in layers {
		for (key_lc, entry) in &layer.entries {
			winners.insert(key_lc.as_str(), entry);
		}
	}
	winners.into_values().map(|entry| (entry.key.to_string(), entry.value.clone())).collect()
}

fn build_traces(layers: &[Layer], requested: &[Box<str>]) -> Vec<PreferenceTrace> {
	// (lowercased, displayed) keys in output order
	let keys: Vec<(String, Box<str>)> = if requested.is_empty() {
		let mut seen: BTreeMap<String, Box<str>> = BTreeMap::new();
		for layer in layers {
			for (key_lc, entry) in &layer.entries {
				seen.insert(key_lc.clone(), entry.key.clone());
			}
		}
		seen.into_iter().collect()
	} else {
		let mut seen = HashSet::new();
		requested
			.iter()
			.filter(|key| seen.insert(key.to_lowercase()))
			.map(|key| (key.to_lowercase(), key.clone()))
			.collect()
	};

	keys.into_iter()
		.map(|(key_lc, key)| PreferenceTrace {
			key,
			layers: layers
				.iter()
				.map(|layer| {
					let entry = layer.entries.get(&key_lc);
					PreferenceTraceLayer {
						level: layer.level,
						tenant_id: layer.tenant_id,
						org_id: layer.org_id,
						user_id: layer.user_id,
						found: entry.is_some(),
						value: entry.map(|e| e.value.clone()),
						record_id: entry.and_then(|e| e.record_id),
					}
				})
				.collect(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_level_order_default() {
		let scope = ScopeFilter::new(Uuid::new_v4(), Uuid::new_v4());
		let levels = level_order(&[], &scope, Some(Uuid::new_v4()));
		assert_eq!(levels, PreferenceLevel::ALL.to_vec());
	}

	#[test]
	fn test_level_order_drops_missing_components() {
		let scope = ScopeFilter::tenant(Uuid::new_v4());
		let levels = level_order(&[], &scope, None);
		assert_eq!(levels, vec![PreferenceLevel::System, PreferenceLevel::Tenant]);

		let levels = level_order(&[], &ScopeFilter::default(), None);
		assert_eq!(levels, vec![PreferenceLevel::System]);
	}

	#[test]
	fn test_level_order_custom_sorted_and_deduped() {
		let scope = ScopeFilter::tenant(Uuid::new_v4());
		let requested =
			[PreferenceLevel::User, PreferenceLevel::Tenant, PreferenceLevel::User];
		let levels = level_order(&requested, &scope, Some(Uuid::new_v4()));
		assert_eq!(levels, vec![PreferenceLevel::Tenant, PreferenceLevel::User]);
	}

	#[test]
	fn test_level_order_falls_back_to_system() {
		let levels = level_order(&[PreferenceLevel::Org], &ScopeFilter::default(), None);
		assert_eq!(levels, vec![PreferenceLevel::System]);
	}
}

// vim: ts=4
