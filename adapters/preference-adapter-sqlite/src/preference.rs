//! Preference row queries

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use scopegate_types::preference_adapter::{
	ListPreferenceOptions, PreferenceIdentity, PreferenceLevel, PreferenceRecord,
	UpsertPreference,
};
use scopegate_types::prelude::*;
use scopegate_types::scope::ScopeFilter;

const COLUMNS: &str = "pref_id, level, tenant_id, org_id, user_id, key, value, version, \
	created_at, created_by, updated_at, updated_by";

fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

fn uuid_col(row: &SqliteRow, name: &str) -> SgResult<Uuid> {
	let s: &str = row.try_get(name).inspect_err(inspect).or(Err(Error::DbError))?;
	Uuid::parse_str(s)
		.inspect_err(|err| warn!("DB: bad uuid in {}: {}", name, err))
		.or(Err(Error::DbError))
}

fn read_record(row: &SqliteRow) -> SgResult<PreferenceRecord> {
	let level: &str = row.try_get("level").inspect_err(inspect).or(Err(Error::DbError))?;
	let level: PreferenceLevel = level.parse().or(Err(Error::DbError))?;
	let value: Option<&str> = row.try_get("value").inspect_err(inspect).or(Err(Error::DbError))?;
	let value = match value {
		Some(v) => serde_json::from_str(v).or(Err(Error::DbError))?,
		None => serde_json::Value::Null,
	};
	let version: i64 = row.try_get("version").inspect_err(inspect).or(Err(Error::DbError))?;

	Ok(PreferenceRecord {
		id: uuid_col(row, "pref_id")?,
		user_id: uuid_col(row, "user_id")?,
		scope: ScopeFilter::new(uuid_col(row, "tenant_id")?, uuid_col(row, "org_id")?),
		level,
		key: row.try_get::<&str, _>("key").inspect_err(inspect).or(Err(Error::DbError))?.into(),
		value,
		version: u32::try_from(version).or(Err(Error::DbError))?,
		created_at: Timestamp(row.try_get("created_at").inspect_err(inspect).or(Err(Error::DbError))?),
		created_by: uuid_col(row, "created_by")?,
		updated_at: Timestamp(row.try_get("updated_at").inspect_err(inspect).or(Err(Error::DbError))?),
		updated_by: uuid_col(row, "updated_by")?,
	})
}

pub(crate) async fn list(
	db: &SqlitePool,
	opts: &ListPreferenceOptions,
) -> SgResult<Vec<PreferenceRecord>> {
	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
		"SELECT {} FROM preferences WHERE 1=1",
		COLUMNS
	));
	if let Some(level) = opts.level {
		query.push(" AND level = ").push_bind(level.as_str());
	}
	if let Some(tenant_id) = opts.tenant_id {
		query.push(" AND tenant_id = ").push_bind(tenant_id.to_string());
	}
	if let Some(org_id) = opts.org_id {
		query.push(" AND org_id = ").push_bind(org_id.to_string());
	}
	if let Some(user_id) = opts.user_id {
		query.push(" AND user_id = ").push_bind(user_id.to_string());
	}
	if !opts.keys.is_empty() {
		query.push(" AND key_lc IN (");
		let mut keys = query.separated(", ");
		for key in &opts.keys {
			keys.push_bind(key.to_lowercase());
		}
		keys.push_unseparated(")");
	}
	query.push(" ORDER BY key_lc");

	let rows = query.build().fetch_all(db).await.inspect_err(inspect).or(Err(Error::DbError))?;
	let mut records = rows.iter().map(read_record).collect::<SgResult<Vec<_>>>()?;
	// Stable: keeps key order within a level
	records.sort_by_key(|r| r.level);
	Ok(records)
}

pub(crate) async fn upsert(db: &SqlitePool, data: &UpsertPreference) -> SgResult<PreferenceRecord> {
	let identity = &data.identity;
	let now = Timestamp::now();
	let sql = format!(
		"INSERT INTO preferences (pref_id, level, tenant_id, org_id, user_id, key, key_lc, value, \
			version, created_at, created_by, updated_at, updated_by) \
		VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?10, ?9, ?10) \
		ON CONFLICT(level, tenant_id, org_id, user_id, key_lc) DO UPDATE SET \
			value = excluded.value, \
			version = preferences.version + 1, \
			updated_at = excluded.updated_at, \
			updated_by = excluded.updated_by \
		RETURNING {}",
		COLUMNS
	);

	let row = sqlx::query(&sql)
		.bind(Uuid::new_v4().to_string())
		.bind(identity.level.as_str())
		.bind(identity.tenant_id.to_string())
		.bind(identity.org_id.to_string())
		.bind(identity.user_id.to_string())
		.bind(&*identity.key)
		.bind(identity.key_lc())
		.bind(data.value.to_string())
		.bind(now.0)
		.bind(data.actor_id.to_string())
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	read_record(&row)
}

pub(crate) async fn delete(db: &SqlitePool, identity: &PreferenceIdentity) -> SgResult<()> {
	let res = sqlx::query(
		"DELETE FROM preferences
		WHERE level = ?1 AND tenant_id = ?2 AND org_id = ?3 AND user_id = ?4 AND key_lc = ?5",
	)
	.bind(identity.level.as_str())
	.bind(identity.tenant_id.to_string())
	.bind(identity.org_id.to_string())
	.bind(identity.user_id.to_string())
	.bind(identity.key_lc())
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

// vim: ts=4
