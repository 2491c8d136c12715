//! Database connection and table management.
//!
//! A [`Database`] owns exactly one SQLite connection. Every operation locks
//! it for the duration of one logical call and releases it on return.

use crate::error::{DbError, Result};
use crate::record::Record;
use crate::schema::{quote_ident, TableName};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Path value that selects an ephemeral in-memory store.
pub const MEMORY_PATH: &str = ":memory:";

/// Main database handle.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open or create a database file at the specified path.
    ///
    /// `:memory:` opens an ephemeral store instead.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == MEMORY_PATH {
            return Self::open_in_memory();
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| DbError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::configure(&conn)?;

        info!("Opened SQLite store at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an ephemeral store that lives as long as this handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DbError::Unavailable(e.to_string()))?;
        Self::configure(&conn)?;
        debug!("Opened in-memory SQLite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    fn configure(conn: &Connection) -> Result<()> {
        // References are declared in the schema but never enforced.
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        Ok(())
    }

    /// Get the database path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with the connection held for its duration.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| DbError::Unavailable("connection lock poisoned".to_string()))?;
        f(&mut guard)
    }

    /// Create the three tables if they don't exist.
    pub fn initialize(&self) -> Result<()> {
        self.with_conn(|conn| {
            for table in TableName::ALL {
                conn.execute(&table.create_if_missing_sql(), [])?;
            }
            Ok(())
        })?;
        debug!("Schema ensured");
        Ok(())
    }

    /// Check if a table exists.
    pub fn table_exists(&self, table: TableName) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table.sql_name()],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Column names of a table as currently stored.
    pub fn columns(&self, table: TableName) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT name FROM pragma_table_info({})",
                quote_literal(table.sql_name())
            ))?;
            let names = stmt.query_map([], |row| row.get(0))?;
            Ok(names.collect::<std::result::Result<Vec<String>, _>>()?)
        })
    }

    /// Count rows in a table.
    pub fn count(&self, table: TableName) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(table.sql_name())),
                [],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// All identifiers in a table, ascending.
    pub fn ids(&self, table: TableName) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT id FROM {} WHERE id IS NOT NULL ORDER BY id",
                quote_ident(table.sql_name())
            ))?;
            let ids = stmt.query_map([], |row| row.get(0))?;
            Ok(ids.collect::<std::result::Result<Vec<i64>, _>>()?)
        })
    }

    /// Run a prepared SELECT and collect every row as a [`Record`].
    pub(crate) fn select(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Record>> {
        debug!(sql, "select");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let rows = stmt.query_map(params, |row| Record::from_row(row, &names))?;
            Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
        })
    }

    /// Get table statistics.
    pub fn stats(&self) -> Result<DatabaseStats> {
        let mut stats = DatabaseStats::default();
        for table in TableName::ALL {
            let count = if self.table_exists(table)? {
                self.count(table)?
            } else {
                0
            };
            match table {
                TableName::Targets => stats.targets = count,
                TableName::Candidates => stats.candidates = count,
                TableName::Interactions => stats.interactions = count,
            }
        }
        Ok(stats)
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Database statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DatabaseStats {
    pub targets: u64,
    pub candidates: u64,
    pub interactions: u64,
}
