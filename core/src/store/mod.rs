//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The rest of the core works on the in-memory Dataset it returns.

use crate::error::DashResult;
use rusqlite::{params, Connection};

mod account;

pub struct AccountStore {
    conn: Connection,
}

impl AccountStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> DashResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        log::debug!("Opened account store at {path}");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and demo runs).
    pub fn in_memory() -> DashResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection, e.g. one holding a table with a
    /// non-standard layout.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DashResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_accounts.sql"))?;
        Ok(())
    }

    /// Column names of `table` as declared, in declaration order.
    /// Empty when the table does not exist.
    pub fn table_columns(&self, table: &str) -> DashResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let names = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> DashResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Quote an SQL identifier; embedded quotes are doubled.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
