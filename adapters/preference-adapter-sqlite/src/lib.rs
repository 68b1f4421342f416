//! SQLite-backed preference repository for scopegate.
//!
//! Upserts are a single `INSERT … ON CONFLICT DO UPDATE … RETURNING`
//! statement against a unique `(level, tenant, org, user, lowercase key)`
//! constraint, so concurrent writers of one identity cannot both create a row
//! or lose a version bump.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use scopegate_types::preference_adapter::{
	ListPreferenceOptions, PreferenceIdentity, PreferenceRecord, PreferenceRepository,
	UpsertPreference,
};
use scopegate_types::prelude::*;

mod preference;
mod schema;

#[derive(Debug)]
pub struct PreferenceAdapterSqlite {
	db: SqlitePool,
}

impl PreferenceAdapterSqlite {
	/// Open (or create) the database file and make sure the schema exists
	pub async fn new(path: impl AsRef<Path>) -> SgResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DB: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DB: {:#?}", err))
			.or(Err(Error::DbError))?;

		debug!(path = %path.as_ref().display(), "preference database ready");
		Ok(Self { db })
	}
}

#[async_trait]
impl PreferenceRepository for PreferenceAdapterSqlite {
	async fn list_preferences(
		&self,
		opts: &ListPreferenceOptions,
	) -> SgResult<Vec<PreferenceRecord>> {
		preference::list(&self.db, opts).await
	}

	async fn upsert_preference(&self, data: UpsertPreference) -> SgResult<PreferenceRecord> {
		preference::upsert(&self.db, &data).await
	}

	async fn delete_preference(&self, identity: &PreferenceIdentity) -> SgResult<()> {
		preference::delete(&self.db, identity).await
	}
}

// vim: ts=4
