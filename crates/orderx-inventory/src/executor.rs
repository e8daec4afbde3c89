//! Driver registry and single-statement query execution
//!
//! Drivers are looked up by identifier in a [`DriverRegistry`] that lives
//! only as long as the worker process handling the request. Each call to
//! [`execute`] opens a fresh connection, runs one statement for the whole
//! batch, and closes the connection whether or not the statement succeeded.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::LookupRequest;
use crate::sqlite::{SQLITE_DRIVER, SQLITE_JDBC_DRIVER, SqliteConnector};
use crate::template::{SqlTemplate, bind_parameters};

/// Where and how to connect to the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionDescriptor {
    /// Driver identifier, resolved through the [`DriverRegistry`]
    pub driver: String,
    /// Endpoint URL understood by the driver
    pub url: String,
    /// Driver properties (authentication method, config file, profile)
    pub properties: BTreeMap<String, String>,
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self {
            driver: SQLITE_DRIVER.to_string(),
            url: String::new(),
            properties: BTreeMap::new(),
        }
    }
}

/// A single cell of a fetched row
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// A fetched row; position 0 is the available amount, position 1 the key
pub type RawRow = Vec<SqlValue>;

/// An open connection to the data source
pub trait Connection {
    /// Bind `params` positionally, execute `sql` once and fetch every row
    fn query(&mut self, sql: &str, params: &[String]) -> Result<Vec<RawRow>>;

    /// Release the connection
    fn close(self: Box<Self>) -> Result<()>;
}

/// Opens connections for one driver
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        url: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<Box<dyn Connection>>;
}

/// Drivers available to a worker, keyed by identifier
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Connector>>,
}

impl DriverRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in SQLite driver under both of its names
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        let sqlite: Arc<dyn Connector> = Arc::new(SqliteConnector);
        registry.register(SQLITE_DRIVER, Arc::clone(&sqlite));
        registry.register(SQLITE_JDBC_DRIVER, sqlite);
        registry
    }

    /// Register (or replace) a driver
    pub fn register(&mut self, driver: impl Into<String>, connector: Arc<dyn Connector>) {
        self.drivers.insert(driver.into(), connector);
    }

    /// Whether a driver is registered under this identifier
    pub fn contains(&self, driver: &str) -> bool {
        self.drivers.contains_key(driver)
    }

    /// Open a new connection for the descriptor
    pub fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn Connection>> {
        let connector = self.drivers.get(&descriptor.driver).ok_or_else(|| {
            Error::connection(format!(
                "no driver registered for '{}'",
                descriptor.driver
            ))
        })?;
        connector.connect(&descriptor.url, &descriptor.properties)
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.drivers.keys().collect();
        names.sort();
        f.debug_struct("DriverRegistry")
            .field("drivers", &names)
            .finish()
    }
}

/// Run the batch lookup statement and return every fetched row
///
/// The template is expanded before any connection is attempted. The
/// connection is closed on every path; a failure to close is logged and
/// never replaces the query outcome.
pub fn execute(
    registry: &DriverRegistry,
    descriptor: &ConnectionDescriptor,
    template: &SqlTemplate,
    request: &LookupRequest,
) -> Result<Vec<RawRow>> {
    let sql = template.materialize(request.len());
    let params = bind_parameters(request);

    tracing::debug!(
        driver = %descriptor.driver,
        keys = request.len(),
        "Opening data source connection"
    );
    let mut connection = registry.connect(descriptor)?;

    let outcome = connection.query(&sql, &params);
    if let Err(e) = connection.close() {
        tracing::warn!(error = %e, "Failed to close data source connection");
    }

    match &outcome {
        Ok(rows) => tracing::debug!(rows = rows.len(), "Lookup statement returned"),
        Err(e) => tracing::debug!(error = %e, "Lookup statement failed"),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ErrorKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log {
        connects: usize,
        closes: usize,
        statements: Vec<(String, Vec<String>)>,
    }

    struct FakeConnector {
        log: Arc<Mutex<Log>>,
        rows: Vec<RawRow>,
        fail_query: bool,
    }

    struct FakeConnection {
        log: Arc<Mutex<Log>>,
        rows: Vec<RawRow>,
        fail_query: bool,
    }

    impl Connector for FakeConnector {
        fn connect(
            &self,
            _url: &str,
            _properties: &BTreeMap<String, String>,
        ) -> Result<Box<dyn Connection>> {
            self.log.lock().unwrap().connects += 1;
            Ok(Box::new(FakeConnection {
                log: Arc::clone(&self.log),
                rows: self.rows.clone(),
                fail_query: self.fail_query,
            }))
        }
    }

    impl Connection for FakeConnection {
        fn query(&mut self, sql: &str, params: &[String]) -> Result<Vec<RawRow>> {
            self.log
                .lock()
                .unwrap()
                .statements
                .push((sql.to_string(), params.to_vec()));
            if self.fail_query {
                return Err(Error::worker("query failed: disk I/O error"));
            }
            Ok(self.rows.clone())
        }

        fn close(self: Box<Self>) -> Result<()> {
            self.log.lock().unwrap().closes += 1;
            Ok(())
        }
    }

    fn setup(rows: Vec<RawRow>, fail_query: bool) -> (DriverRegistry, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut registry = DriverRegistry::new();
        registry.register(
            "fake",
            Arc::new(FakeConnector {
                log: Arc::clone(&log),
                rows,
                fail_query,
            }),
        );
        (registry, log)
    }

    fn descriptor(driver: &str) -> ConnectionDescriptor {
        ConnectionDescriptor {
            driver: driver.to_string(),
            url: "fake://inventory".to_string(),
            properties: BTreeMap::new(),
        }
    }

    fn request() -> LookupRequest {
        LookupRequest::new(
            vec!["A".to_string(), "B".to_string()],
            vec![1, 2],
            "US1 Business Unit",
        )
        .unwrap()
    }

    #[test]
    fn executes_one_statement_with_keys_then_scope() {
        let rows = vec![vec![SqlValue::Integer(5), SqlValue::Text("A".into())]];
        let (registry, log) = setup(rows.clone(), false);
        let template =
            SqlTemplate::parse("SELECT q, k FROM t WHERE k IN ({{keys}}) AND s = ?").unwrap();

        let fetched = execute(&registry, &descriptor("fake"), &template, &request()).unwrap();
        assert_eq!(fetched, rows);

        let log = log.lock().unwrap();
        assert_eq!(log.connects, 1);
        assert_eq!(log.closes, 1);
        assert_eq!(log.statements.len(), 1);
        let (sql, params) = &log.statements[0];
        assert_eq!(sql, "SELECT q, k FROM t WHERE k IN (?, ?) AND s = ?");
        assert_eq!(params, &vec!["A", "B", "US1 Business Unit"]);
    }

    #[test]
    fn closes_connection_when_query_fails() {
        let (registry, log) = setup(Vec::new(), true);
        let template =
            SqlTemplate::parse("SELECT q, k FROM t WHERE k IN ({{keys}}) AND s = ?").unwrap();

        let err = execute(&registry, &descriptor("fake"), &template, &request()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Worker);

        let log = log.lock().unwrap();
        assert_eq!(log.connects, 1);
        assert_eq!(log.closes, 1);
    }

    #[test]
    fn unknown_driver_is_a_connection_error() {
        let (registry, log) = setup(Vec::new(), false);
        let template = SqlTemplate::parse("SELECT 1 WHERE k IN ({{keys}}) AND s = ?").unwrap();

        let err = execute(&registry, &descriptor("oracle"), &template, &request()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(err.message(), "no driver registered for 'oracle'");
        assert_eq!(log.lock().unwrap().connects, 0);
    }

    #[test]
    fn builtin_registry_knows_sqlite_names() {
        let registry = DriverRegistry::with_builtin();
        assert!(registry.contains("sqlite"));
        assert!(registry.contains("org.sqlite.JDBC"));
        assert!(!registry.contains("com.simba.spark.jdbc.Driver"));
    }
}
