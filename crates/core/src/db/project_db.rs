use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::db::{CorpusBuildRecord, ExtractionRunRecord, RunStatus};

/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    #[error("Invalid run status '{0}' in database")]
    InvalidStatus(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed bookkeeping of extraction runs and corpus builds.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> DbResult<i32> {
        current_schema_version(&self.conn)
    }

    /// Insert an extraction run record and return its row id.
    pub fn insert_extraction_run(&self, record: &ExtractionRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO extraction_runs (binary, binary_hash, host, status, functions, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.binary,
                record.binary_hash,
                record.host,
                record.status.as_str(),
                record.functions,
                record.started_at,
                record.finished_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List extraction runs in insertion order, optionally filtered by binary.
    pub fn list_extraction_runs(&self, binary: Option<&str>) -> DbResult<Vec<ExtractionRunRecord>> {
        type Row = (String, Option<String>, String, String, i64, String, String);
        fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT binary, binary_hash, host, status, functions, started_at, finished_at
            FROM extraction_runs
            WHERE ?1 IS NULL OR binary = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![binary], map_run)?;

        let mut out = Vec::new();
        for row in rows {
            let (binary, binary_hash, host, status, functions, started_at, finished_at) = row?;
            let status = status.parse::<RunStatus>().map_err(|_| DbError::InvalidStatus(status))?;
            out.push(ExtractionRunRecord {
                binary,
                binary_hash,
                host,
                status,
                functions,
                started_at,
                finished_at,
            });
        }
        Ok(out)
    }

    /// Insert a corpus build record and return its row id.
    pub fn insert_corpus_build(&self, record: &CorpusBuildRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO corpus_builds (split, representation, pairs, dropped, src_path, tgt_path, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.split,
                record.representation,
                record.pairs,
                record.dropped,
                record.src_path,
                record.tgt_path,
                record.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List corpus builds in insertion order, optionally filtered by split.
    pub fn list_corpus_builds(&self, split: Option<&str>) -> DbResult<Vec<CorpusBuildRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT split, representation, pairs, dropped, src_path, tgt_path, created_at
            FROM corpus_builds
            WHERE ?1 IS NULL OR split = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![split], |row| {
            Ok(CorpusBuildRecord {
                split: row.get(0)?,
                representation: row.get(1)?,
                pairs: row.get(2)?,
                dropped: row.get(3)?,
                src_path: row.get(4)?,
                tgt_path: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// Version map:
/// - 0: no schema
/// - 1: extraction_runs
/// - 2: corpus_builds
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS extraction_runs (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                binary       TEXT NOT NULL,
                binary_hash  TEXT,
                host         TEXT NOT NULL,
                status       TEXT NOT NULL,
                functions    INTEGER NOT NULL DEFAULT 0,
                started_at   TEXT NOT NULL,
                finished_at  TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS corpus_builds (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                split          TEXT NOT NULL,
                representation TEXT NOT NULL,
                pairs          INTEGER NOT NULL,
                dropped        INTEGER NOT NULL,
                src_path       TEXT NOT NULL,
                tgt_path       TEXT NOT NULL,
                created_at     TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
