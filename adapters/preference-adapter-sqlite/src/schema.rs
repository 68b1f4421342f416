//! Database schema initialization
//!
//! Identity columns are never NULL: components a level does not use are stored
//! as the nil UUID, so the unique constraint covers every level.

use sqlx::SqlitePool;

pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Preferences
	//*************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS preferences (
		pref_id text NOT NULL,
		level text NOT NULL,
		tenant_id text NOT NULL,
		org_id text NOT NULL,
		user_id text NOT NULL,
		key text NOT NULL,
		key_lc text NOT NULL,
		value text,
		version integer NOT NULL DEFAULT 1,
		created_at integer NOT NULL,
		created_by text NOT NULL,
		updated_at integer NOT NULL,
		updated_by text NOT NULL,
		PRIMARY KEY(pref_id),
		UNIQUE(level, tenant_id, org_id, user_id, key_lc)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_preferences_scope ON preferences(tenant_id, org_id, user_id)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
