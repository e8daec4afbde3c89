//! Built-in SQLite driver
//!
//! Databases are opened read-only with `query_only` set; an inventory check
//! never writes. Accepted URL forms are `jdbc:sqlite:<path>`,
//! `sqlite:<path>`, `sqlite://<path>` and a bare path.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{OpenFlags, params_from_iter};

use crate::error::{Error, Result};
use crate::executor::{Connection, Connector, RawRow, SqlValue};

/// Registry identifier of the SQLite driver
pub const SQLITE_DRIVER: &str = "sqlite";
/// JDBC-style alias for the SQLite driver
pub const SQLITE_JDBC_DRIVER: &str = "org.sqlite.JDBC";

const BUSY_TIMEOUT_MS: u64 = 100;

/// Opens read-only SQLite connections
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

impl Connector for SqliteConnector {
    fn connect(
        &self,
        url: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<Box<dyn Connection>> {
        let path = database_path(url)?;
        tracing::debug!(
            path = %path.display(),
            properties = ?properties.keys().collect::<Vec<_>>(),
            "Opening sqlite database"
        );

        let open_error = |e: rusqlite::Error| {
            Error::connection(format!(
                "cannot open sqlite database {}: {}",
                path.display(),
                e
            ))
        };
        let conn = rusqlite::Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(open_error)?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(open_error)?;
        conn.pragma_update(None, "query_only", 1)
            .map_err(open_error)?;

        Ok(Box::new(SqliteConnection { conn }))
    }
}

struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn query(&mut self, sql: &str, params: &[String]) -> Result<Vec<RawRow>> {
        let query_error = |e: rusqlite::Error| Error::worker(format!("query failed: {}", e));

        let mut statement = self.conn.prepare(sql).map_err(query_error)?;
        let columns = statement.column_count();
        let mut rows = statement
            .query(params_from_iter(params.iter()))
            .map_err(query_error)?;

        let mut fetched = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let mut values = Vec::with_capacity(columns);
            for index in 0..columns {
                let value = match row.get_ref(index).map_err(query_error)? {
                    ValueRef::Null | ValueRef::Blob(_) => SqlValue::Null,
                    ValueRef::Integer(n) => SqlValue::Integer(n),
                    ValueRef::Real(x) => SqlValue::Real(x),
                    ValueRef::Text(bytes) => {
                        SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
                    }
                };
                values.push(value);
            }
            fetched.push(values);
        }
        Ok(fetched)
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::connection(format!("failed to close sqlite database: {}", e)))
    }
}

/// Extract the database file path from a driver URL
fn database_path(url: &str) -> Result<PathBuf> {
    let rest = url.strip_prefix("jdbc:").unwrap_or(url);
    let rest = rest
        .strip_prefix("sqlite://")
        .or_else(|| rest.strip_prefix("sqlite:"))
        .unwrap_or(rest);
    if rest.trim().is_empty() {
        return Err(Error::connection(format!(
            "sqlite URL '{}' does not name a database file",
            url
        )));
    }
    Ok(PathBuf::from(rest))
}
