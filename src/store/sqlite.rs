//! SQLite-backed [`JobStore`]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::errors::{StoreError, StoreResult};
use super::query::{JobFilter, JobOrdering};
use super::schema;
use super::JobStore;
use crate::model::{
    Job, JobDetails, JobLogEntry, JobParameter, JobStatus, JobTemplate, JobType, NewJob,
    NewLogEntry, NewParameter, NewTemplate,
};

const TEMPLATE_COLUMNS: &str = "id, name, job_type, default_parameters";
const JOB_COLUMNS: &str = "id, namespace, name, job_type, status, progress, owner, template_id, \
                           date_created_ms, date_modified_ms";
const PARAMETER_COLUMNS: &str = "id, job_id, param_key, param_value";
const LOG_COLUMNS: &str = "id, job_id, date_created_ms, message";

/// A job store over a single SQLite connection
#[derive(Debug)]
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Open (creating if needed) the database file and migrate it
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )?;
        Self::from_connection(conn)
    }

    /// A private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Current `user_version` of the database
    pub fn schema_version(&self) -> StoreResult<i64> {
        let conn = self.lock()?;
        Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

fn from_ms(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {} out of range", ms)))
}

fn job_type(code: i64) -> StoreResult<JobType> {
    JobType::from_code(code).ok_or_else(|| StoreError::Corrupt(format!("job type {}", code)))
}

struct TemplateRow {
    id: i64,
    name: String,
    job_type: i64,
    default_parameters: String,
}

impl TemplateRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            job_type: row.get(2)?,
            default_parameters: row.get(3)?,
        })
    }
}

impl TryFrom<TemplateRow> for JobTemplate {
    type Error = StoreError;

    fn try_from(row: TemplateRow) -> StoreResult<Self> {
        let default_parameters: BTreeMap<String, String> =
            serde_json::from_str(&row.default_parameters)
                .map_err(|e| StoreError::Corrupt(format!("template {}: {}", row.id, e)))?;
        Ok(JobTemplate {
            id: row.id,
            name: row.name,
            job_type: job_type(row.job_type)?,
            default_parameters,
        })
    }
}

struct JobRow {
    id: i64,
    namespace: String,
    name: String,
    job_type: i64,
    status: i64,
    progress: i64,
    owner: String,
    template_id: Option<i64>,
    date_created_ms: i64,
    date_modified_ms: i64,
}

impl JobRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            namespace: row.get(1)?,
            name: row.get(2)?,
            job_type: row.get(3)?,
            status: row.get(4)?,
            progress: row.get(5)?,
            owner: row.get(6)?,
            template_id: row.get(7)?,
            date_created_ms: row.get(8)?,
            date_modified_ms: row.get(9)?,
        })
    }
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> StoreResult<Self> {
        let status = JobStatus::from_code(row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("job {} status {}", row.id, row.status)))?;
        let progress = u8::try_from(row.progress)
            .map_err(|_| StoreError::Corrupt(format!("job {} progress {}", row.id, row.progress)))?;
        Ok(Job {
            id: row.id,
            namespace: row.namespace,
            name: row.name,
            job_type: job_type(row.job_type)?,
            status,
            progress,
            owner: row.owner,
            template: row.template_id,
            date_created: from_ms(row.date_created_ms)?,
            date_modified: from_ms(row.date_modified_ms)?,
        })
    }
}

fn read_parameter(row: &Row<'_>) -> rusqlite::Result<JobParameter> {
    Ok(JobParameter {
        id: row.get(0)?,
        job: row.get(1)?,
        key: row.get(2)?,
        value: row.get(3)?,
    })
}

struct LogRow {
    id: i64,
    job_id: i64,
    date_created_ms: i64,
    message: String,
}

impl LogRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            job_id: row.get(1)?,
            date_created_ms: row.get(2)?,
            message: row.get(3)?,
        })
    }
}

impl TryFrom<LogRow> for JobLogEntry {
    type Error = StoreError;

    fn try_from(row: LogRow) -> StoreResult<Self> {
        Ok(JobLogEntry {
            id: row.id,
            job: row.job_id,
            date_created: from_ms(row.date_created_ms)?,
            message: row.message,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries shared by several operations
// ---------------------------------------------------------------------------

fn load_template(conn: &Connection, id: i64) -> StoreResult<Option<JobTemplate>> {
    let sql = format!("SELECT {} FROM job_templates WHERE id = ?1", TEMPLATE_COLUMNS);
    conn.query_row(&sql, params![id], TemplateRow::read)
        .optional()?
        .map(JobTemplate::try_from)
        .transpose()
}

fn load_job(conn: &Connection, id: i64) -> StoreResult<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS);
    conn.query_row(&sql, params![id], JobRow::read)
        .optional()?
        .map(Job::try_from)
        .transpose()
}

fn ensure_job(conn: &Connection, id: i64) -> StoreResult<()> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM jobs WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    found.map(|_| ()).ok_or(StoreError::NotFound)
}

fn load_parameters(conn: &Connection, job_id: i64) -> StoreResult<Vec<JobParameter>> {
    let sql = format!(
        "SELECT {} FROM job_parameters WHERE job_id = ?1 ORDER BY id ASC",
        PARAMETER_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![job_id], read_parameter)?;
    let parameters = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(parameters)
}

fn load_parameter(conn: &Connection, job_id: i64, id: i64) -> StoreResult<JobParameter> {
    let sql = format!(
        "SELECT {} FROM job_parameters WHERE id = ?1 AND job_id = ?2",
        PARAMETER_COLUMNS
    );
    conn.query_row(&sql, params![id, job_id], read_parameter)
        .optional()?
        .ok_or(StoreError::NotFound)
}

fn load_log_entries(conn: &Connection, job_id: i64) -> StoreResult<Vec<JobLogEntry>> {
    let sql = format!(
        "SELECT {} FROM job_log_entries WHERE job_id = ?1 ORDER BY date_created_ms ASC, id ASC",
        LOG_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![job_id], LogRow::read)?;
    let entries = rows
        .map(|row| JobLogEntry::try_from(row?))
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(entries)
}

fn load_log_entry(conn: &Connection, job_id: i64, id: i64) -> StoreResult<JobLogEntry> {
    let sql = format!(
        "SELECT {} FROM job_log_entries WHERE id = ?1 AND job_id = ?2",
        LOG_COLUMNS
    );
    conn.query_row(&sql, params![id, job_id], LogRow::read)
        .optional()?
        .ok_or(StoreError::NotFound)
        .and_then(JobLogEntry::try_from)
}

/// Resolve the referenced template and the job type it implies
fn resolve_template(
    conn: &Connection,
    job: &NewJob,
) -> StoreResult<(Option<JobTemplate>, JobType)> {
    let template = match job.template {
        Some(id) => Some(
            load_template(conn, id)?
                .ok_or(StoreError::InvalidReference { field: "template", id })?,
        ),
        None => None,
    };
    let job_type = job
        .job_type
        .or(template.as_ref().map(|t| t.job_type))
        .ok_or(StoreError::Invalid("job type is required without a template"))?;
    Ok((template, job_type))
}

fn encode_parameters(parameters: &BTreeMap<String, String>) -> StoreResult<String> {
    serde_json::to_string(parameters).map_err(|e| StoreError::Corrupt(e.to_string()))
}

impl JobStore for SqliteJobStore {
    // -- templates ----------------------------------------------------------

    fn list_templates(&self) -> StoreResult<Vec<JobTemplate>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM job_templates ORDER BY id ASC", TEMPLATE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], TemplateRow::read)?;
        let templates = rows
            .map(|row| JobTemplate::try_from(row?))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(templates)
    }

    fn create_template(&self, template: NewTemplate) -> StoreResult<JobTemplate> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO job_templates (name, job_type, default_parameters) VALUES (?1, ?2, ?3)",
            params![
                template.name,
                template.job_type.code(),
                encode_parameters(&template.default_parameters)?
            ],
        )?;
        load_template(&conn, conn.last_insert_rowid())?.ok_or(StoreError::NotFound)
    }

    fn get_template(&self, id: i64) -> StoreResult<JobTemplate> {
        let conn = self.lock()?;
        load_template(&conn, id)?.ok_or(StoreError::NotFound)
    }

    fn update_template(&self, id: i64, template: NewTemplate) -> StoreResult<JobTemplate> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE job_templates SET name = ?1, job_type = ?2, default_parameters = ?3 WHERE id = ?4",
            params![
                template.name,
                template.job_type.code(),
                encode_parameters(&template.default_parameters)?,
                id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        load_template(&conn, id)?.ok_or(StoreError::NotFound)
    }

    fn delete_template(&self, id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        match conn.execute("DELETE FROM job_templates WHERE id = ?1", params![id])? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    // -- jobs ---------------------------------------------------------------

    fn list_jobs(&self, filter: &JobFilter, ordering: &JobOrdering) -> StoreResult<Vec<Job>> {
        let conn = self.lock()?;
        let (where_sql, values) = filter.to_sql();
        let sql = format!(
            "SELECT {} FROM jobs{}{}",
            JOB_COLUMNS,
            where_sql,
            ordering.to_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), JobRow::read)?;
        let jobs = rows
            .map(|row| Job::try_from(row?))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(jobs)
    }

    fn create_job(&self, job: NewJob, now: DateTime<Utc>) -> StoreResult<Job> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let (template, job_type) = resolve_template(&tx, &job)?;
        let now_ms = now.timestamp_millis();
        tx.execute(
            "INSERT INTO jobs (namespace, name, job_type, status, progress, owner, template_id, \
             date_created_ms, date_modified_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                job.namespace,
                job.name,
                job_type.code(),
                job.status.code(),
                job.progress,
                job.owner,
                job.template,
                now_ms
            ],
        )?;
        let id = tx.last_insert_rowid();

        if let Some(template) = &template {
            let mut insert = tx.prepare(
                "INSERT INTO job_parameters (job_id, param_key, param_value) VALUES (?1, ?2, ?3)",
            )?;
            for (key, value) in &template.default_parameters {
                insert.execute(params![id, key, value])?;
            }
        }

        let created = load_job(&tx, id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_job(&self, id: i64) -> StoreResult<Job> {
        let conn = self.lock()?;
        load_job(&conn, id)?.ok_or(StoreError::NotFound)
    }

    fn job_details(&self, id: i64) -> StoreResult<JobDetails> {
        let conn = self.lock()?;
        let job = load_job(&conn, id)?.ok_or(StoreError::NotFound)?;
        Ok(JobDetails {
            parameters: load_parameters(&conn, id)?,
            logs: load_log_entries(&conn, id)?,
            job,
        })
    }

    fn update_job(&self, id: i64, job: NewJob, now: DateTime<Utc>) -> StoreResult<Job> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        ensure_job(&tx, id)?;
        let (_, job_type) = resolve_template(&tx, &job)?;
        tx.execute(
            "UPDATE jobs SET namespace = ?1, name = ?2, job_type = ?3, status = ?4, progress = ?5, \
             owner = ?6, template_id = ?7, date_modified_ms = ?8 WHERE id = ?9",
            params![
                job.namespace,
                job.name,
                job_type.code(),
                job.status.code(),
                job.progress,
                job.owner,
                job.template,
                now.timestamp_millis(),
                id
            ],
        )?;

        let updated = load_job(&tx, id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_job(&self, id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        match conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    // -- parameters ---------------------------------------------------------

    fn list_parameters(&self, job_id: i64) -> StoreResult<Vec<JobParameter>> {
        let conn = self.lock()?;
        ensure_job(&conn, job_id)?;
        load_parameters(&conn, job_id)
    }

    fn create_parameter(&self, job_id: i64, parameter: NewParameter) -> StoreResult<JobParameter> {
        let conn = self.lock()?;
        ensure_job(&conn, job_id)?;
        conn.execute(
            "INSERT INTO job_parameters (job_id, param_key, param_value) VALUES (?1, ?2, ?3)",
            params![job_id, parameter.key, parameter.value],
        )?;
        load_parameter(&conn, job_id, conn.last_insert_rowid())
    }

    fn get_parameter(&self, job_id: i64, id: i64) -> StoreResult<JobParameter> {
        let conn = self.lock()?;
        load_parameter(&conn, job_id, id)
    }

    fn update_parameter(
        &self,
        job_id: i64,
        id: i64,
        parameter: NewParameter,
    ) -> StoreResult<JobParameter> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE job_parameters SET param_key = ?1, param_value = ?2 WHERE id = ?3 AND job_id = ?4",
            params![parameter.key, parameter.value, id, job_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        load_parameter(&conn, job_id, id)
    }

    fn delete_parameter(&self, job_id: i64, id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        match conn.execute(
            "DELETE FROM job_parameters WHERE id = ?1 AND job_id = ?2",
            params![id, job_id],
        )? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    // -- log entries --------------------------------------------------------

    fn list_log_entries(&self, job_id: i64) -> StoreResult<Vec<JobLogEntry>> {
        let conn = self.lock()?;
        ensure_job(&conn, job_id)?;
        load_log_entries(&conn, job_id)
    }

    fn create_log_entry(
        &self,
        job_id: i64,
        entry: NewLogEntry,
        now: DateTime<Utc>,
    ) -> StoreResult<JobLogEntry> {
        let conn = self.lock()?;
        ensure_job(&conn, job_id)?;
        conn.execute(
            "INSERT INTO job_log_entries (job_id, date_created_ms, message) VALUES (?1, ?2, ?3)",
            params![job_id, now.timestamp_millis(), entry.message],
        )?;
        load_log_entry(&conn, job_id, conn.last_insert_rowid())
    }

    fn get_log_entry(&self, job_id: i64, id: i64) -> StoreResult<JobLogEntry> {
        let conn = self.lock()?;
        load_log_entry(&conn, job_id, id)
    }

    fn update_log_entry(
        &self,
        job_id: i64,
        id: i64,
        entry: NewLogEntry,
    ) -> StoreResult<JobLogEntry> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE job_log_entries SET message = ?1 WHERE id = ?2 AND job_id = ?3",
            params![entry.message, id, job_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        load_log_entry(&conn, job_id, id)
    }

    fn delete_log_entry(&self, job_id: i64, id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        match conn.execute(
            "DELETE FROM job_log_entries WHERE id = ?1 AND job_id = ?2",
            params![id, job_id],
        )? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }
}
