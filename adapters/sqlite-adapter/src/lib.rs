//! sqlite-adapter — SQLite implementation of the LinkRepository port.
//!
//! Purpose
//! - Durable, file-based storage for the redirector's single `links` table.
//! - Implements the `LinkRepository` trait from the `domain` crate.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - One connection behind a mutex; every operation holds the guard only for
//!   its own statement(s).
//! - The schema is created once, when the repository is opened.
//! - Stores timestamps as seconds since UNIX_EPOCH.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use domain::{Code, CoreError, Link, LinkRepository};
use rusqlite::{params, Connection};
use tracing::info;

/// SQLite-backed link repository.
pub struct SqliteRepo {
    conn: Mutex<Connection>,
}

impl SqliteRepo {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let conn = Connection::open(path.as_ref()).map_err(map_sqerr)?;
        init_schema(&conn)?;
        info!(path = %path.as_ref().display(), "sqlite repository ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Private in-memory database, mostly for tests.
    pub fn in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqerr)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Like [`SqliteRepo::new`], creating missing parent directories first.
    pub fn open_creating_dirs<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| CoreError::Repository(format!("create {}: {e}", dir.display())))?;
            }
        }
        Self::new(path)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))
    }
}

fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS links (
            code TEXT PRIMARY KEY,
            target TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            title TEXT,
            clicks INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .map_err(map_sqerr)
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Repository(format!("sqlite error: {e}"))
}

fn system_time_to_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

fn secs_to_system_time(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn row_to_link(row: &rusqlite::Row) -> Result<Link, CoreError> {
    let code: String = row.get(0).map_err(map_sqerr)?;
    let target: String = row.get(1).map_err(map_sqerr)?;
    let ts: i64 = row.get(2).map_err(map_sqerr)?;
    let title: Option<String> = row.get(3).map_err(map_sqerr)?;
    let clicks: i64 = row.get(4).map_err(map_sqerr)?;

    let code = Code::new(code).map_err(|e| CoreError::Repository(format!("bad code in db: {e}")))?;
    Ok(Link {
        code,
        target,
        created_at: secs_to_system_time(ts.max(0) as u64),
        title,
        clicks: clicks.max(0) as u64,
    })
}

impl LinkRepository for SqliteRepo {
    fn get(&self, code: &Code) -> Result<Option<Link>, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT code, target, created_at, title, clicks FROM links WHERE code = ?1")
            .map_err(map_sqerr)?;
        let mut rows = stmt.query(params![code.as_str()]).map_err(map_sqerr)?;
        match rows.next().map_err(map_sqerr)? {
            Some(row) => Ok(Some(row_to_link(row)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, link: Link) -> Result<(), CoreError> {
        let conn = self.lock()?;
        let res = conn.execute(
            "INSERT INTO links(code, target, created_at, title, clicks) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                link.code.as_str(),
                link.target,
                system_time_to_secs(link.created_at) as i64,
                link.title,
                link.clicks as i64,
            ],
        );
        match res {
            Ok(_) => Ok(()),
            // Only a primary-key clash means the code is taken.
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(CoreError::AlreadyExists)
            }
            Err(e) => Err(map_sqerr(e)),
        }
    }

    fn increment_clicks(&self, code: &Code) -> Result<(), CoreError> {
        let conn = self.lock()?;
        // Zero affected rows means the code is unknown; that is not an error.
        conn.execute(
            "UPDATE links SET clicks = clicks + 1 WHERE code = ?1",
            params![code.as_str()],
        )
        .map_err(map_sqerr)?;
        Ok(())
    }
}

impl SqliteRepo {
    /// Total number of stored links.
    pub fn count(&self) -> Result<u64, CoreError> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .map_err(map_sqerr)?;
        Ok(n.max(0) as u64)
    }
}
