//! SQLite schema and migration

use rusqlite::Connection;

use super::errors::{StoreError, StoreResult};

/// Value of `PRAGMA user_version` once migrated
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS job_templates (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  job_type INTEGER NOT NULL,
  default_parameters TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS jobs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  namespace TEXT NOT NULL DEFAULT '',
  name TEXT NOT NULL,
  job_type INTEGER NOT NULL,
  status INTEGER NOT NULL DEFAULT 0,
  progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
  owner TEXT NOT NULL DEFAULT '',
  template_id INTEGER REFERENCES job_templates(id) ON DELETE SET NULL,
  date_created_ms INTEGER NOT NULL,
  date_modified_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_created ON jobs(date_created_ms);
CREATE INDEX IF NOT EXISTS idx_jobs_modified ON jobs(date_modified_ms);
CREATE INDEX IF NOT EXISTS idx_jobs_template ON jobs(template_id);

CREATE TABLE IF NOT EXISTS job_parameters (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
  param_key TEXT NOT NULL,
  param_value TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_job_parameters_job ON job_parameters(job_id);

CREATE TABLE IF NOT EXISTS job_log_entries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
  date_created_ms INTEGER NOT NULL,
  message TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_job_log_entries_job ON job_log_entries(job_id, date_created_ms);
"#;

/// Create or upgrade the schema. Returns the version found before
/// migrating.
pub(crate) fn migrate(conn: &Connection) -> StoreResult<i64> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    let found: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(StoreError::Corrupt(format!(
            "database schema version {} is newer than supported version {}",
            found, SCHEMA_VERSION
        )));
    }
    if found < SCHEMA_VERSION {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(migrate(&conn).unwrap(), 0);
        assert_eq!(migrate(&conn).unwrap(), SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'job%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(migrate(&conn), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let enabled: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
