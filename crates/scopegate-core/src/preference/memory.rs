//! In-memory preference repository
//!
//! Used by tests and single-process deployments. The lookup and the write of
//! an upsert happen under one lock, so concurrent upserts of the same identity
//! serialise instead of racing on create or on the version bump.

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::prelude::*;
use scopegate_types::preference_adapter::{
	ListPreferenceOptions, PreferenceIdentity, PreferenceRecord, PreferenceRepository,
	UpsertPreference,
};

#[derive(Debug, Default)]
pub struct MemoryPreferenceRepository {
	records: Mutex<Vec<PreferenceRecord>>,
}

impl MemoryPreferenceRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed with rows as-is, bypassing upsert bookkeeping
	pub fn with_records(records: Vec<PreferenceRecord>) -> Self {
		Self { records: Mutex::new(records) }
	}

	pub fn len(&self) -> usize {
		self.records.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.lock().is_empty()
	}
}

#[async_trait]
impl PreferenceRepository for MemoryPreferenceRepository {
	async fn list_preferences(
		&self,
		opts: &ListPreferenceOptions,
	) -> SgResult<Vec<PreferenceRecord>> {
		let mut records: Vec<PreferenceRecord> =
			self.records.lock().iter().filter(|r| opts.matches(r)).cloned().collect();
		records.sort_by(|a, b| {
			a.level.cmp(&b.level).then_with(|| a.key.to_lowercase().cmp(&b.key.to_lowercase()))
		});
		Ok(records)
	}

	async fn upsert_preference(&self, data: UpsertPreference) -> SgResult<PreferenceRecord> {
		let now = Timestamp::now();
		let mut records = self.records.lock();

		if let Some(record) = records.iter_mut().find(|r| data.identity.matches(r)) {
			record.value = data.value;
			record.version += 1;
			record.updated_at = now;
			record.updated_by = data.actor_id;
			return Ok(record.clone());
		}

		let identity = data.identity;
		let record = PreferenceRecord {
			id: Uuid::new_v4(),
			user_id: identity.user_id,
			scope: identity.scope(),
			level: identity.level,
			key: identity.key,
			value: data.value,
			version: 1,
			created_at: now,
			created_by: data.actor_id,
			updated_at: now,
			updated_by: data.actor_id,
		};
		records.push(record.clone());
		Ok(record)
	}

	async fn delete_preference(&self, identity: &PreferenceIdentity) -> SgResult<()> {
		let mut records = self.records.lock();
		let pos = records.iter().position(|r| identity.matches(r)).ok_or(Error::NotFound)?;
		records.remove(pos);
		Ok(())
	}
}

// vim: ts=4
