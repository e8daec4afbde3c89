//! Service configuration
//!
//! Settings come from a TOML file and are then overridden by `ORDERX_*`
//! environment variables:
//!
//! ```toml
//! [connection]
//! driver = "sqlite"
//! url = "jdbc:sqlite:/var/lib/orderx/inventory.db"
//!
//! [connection.properties]
//! "auth.method" = "api_key"
//!
//! [query]
//! template = "inventory_check.sql"
//!
//! [worker]
//! timeout_secs = 60
//! ```
//!
//! A relative template path is resolved against the directory holding the
//! config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::executor::ConnectionDescriptor;
use crate::supervisor::WorkerCommand;

/// Connection property naming the authentication method
pub const AUTH_METHOD: &str = "auth.method";
/// Connection property naming the credentials file
pub const AUTH_CONFIG_FILE: &str = "auth.config_file";
/// Connection property naming the credentials profile
pub const AUTH_PROFILE: &str = "auth.profile";

/// Worker budget used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Template used when none is configured
pub const DEFAULT_TEMPLATE: &str = "config/inventory_check.sql";

const REDACTED: &str = "<redacted>";

const ENV_DRIVER: &str = "ORDERX_DRIVER";
const ENV_URL: &str = "ORDERX_URL";
const ENV_AUTH_TYPE: &str = "ORDERX_AUTH_TYPE";
const ENV_AUTH_CONFIG_FILE: &str = "ORDERX_AUTH_CONFIG_FILE";
const ENV_AUTH_PROFILE: &str = "ORDERX_AUTH_PROFILE";
const ENV_QUERY_TEMPLATE: &str = "ORDERX_QUERY_TEMPLATE";
const ENV_WORKER_PROGRAM: &str = "ORDERX_WORKER_PROGRAM";
const ENV_WORKER_TIMEOUT_SECS: &str = "ORDERX_WORKER_TIMEOUT_SECS";

fn default_template() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// `[query]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySection {
    /// Path to the SQL template file
    #[serde(default = "default_template")]
    pub template: PathBuf,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

/// `[worker]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSection {
    /// Worker executable; located automatically when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,

    /// Per-call wall-clock budget in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            program: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Resolved service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub connection: ConnectionDescriptor,

    #[serde(default)]
    pub query: QuerySection,

    #[serde(default)]
    pub worker: WorkerSection,
}

impl InventoryConfig {
    /// Parse TOML content without resolving paths or validating
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("invalid configuration: {}", e)))
    }

    /// Read a config file, resolving a relative template path against the
    /// file's directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read configuration {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{} ({})", e.message(), path.display())))?;

        if config.query.template.is_relative() {
            if let Some(dir) = path.parent() {
                config.query.template = dir.join(&config.query.template);
            }
        }
        Ok(config)
    }

    /// Load `path` if it exists, apply overrides from `lookup`, and validate
    ///
    /// A missing file is not an error; the defaults plus overrides must then
    /// be enough to pass validation.
    pub fn resolve<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.is_file() {
            tracing::debug!(path = %path.display(), "Loading configuration");
            Self::load(path)?
        } else {
            tracing::debug!(path = %path.display(), "Configuration file not found, using defaults");
            Self::default()
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// [`resolve`](Self::resolve) against the process environment
    pub fn from_env(path: &Path) -> Result<Self> {
        Self::resolve(path, |name| std::env::var(name).ok())
    }

    /// Apply `ORDERX_*` overrides; unset names leave the value untouched
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(driver) = lookup(ENV_DRIVER) {
            self.connection.driver = driver;
        }
        if let Some(url) = lookup(ENV_URL) {
            self.connection.url = url;
        }
        for (name, property) in [
            (ENV_AUTH_TYPE, AUTH_METHOD),
            (ENV_AUTH_CONFIG_FILE, AUTH_CONFIG_FILE),
            (ENV_AUTH_PROFILE, AUTH_PROFILE),
        ] {
            if let Some(value) = lookup(name) {
                self.connection.properties.insert(property.to_string(), value);
            }
        }
        if let Some(template) = lookup(ENV_QUERY_TEMPLATE) {
            self.query.template = PathBuf::from(template);
        }
        if let Some(program) = lookup(ENV_WORKER_PROGRAM) {
            self.worker.program = Some(PathBuf::from(program));
        }
        if let Some(raw) = lookup(ENV_WORKER_TIMEOUT_SECS) {
            self.worker.timeout_secs = raw.trim().parse().map_err(|_| {
                Error::config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_WORKER_TIMEOUT_SECS, raw
                ))
            })?;
        }
        Ok(())
    }

    /// Reject settings no lookup could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.connection.driver.trim().is_empty() {
            return Err(Error::config("connection.driver must be set"));
        }
        if self.connection.url.trim().is_empty() {
            return Err(Error::config(format!(
                "connection.url must be set (or {})",
                ENV_URL
            )));
        }
        if self.worker.timeout_secs == 0 {
            return Err(Error::config("worker.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.worker.timeout_secs)
    }

    /// The configured worker program, or the located default
    pub fn worker_command(&self) -> WorkerCommand {
        match &self.worker.program {
            Some(program) => WorkerCommand::new(program),
            None => WorkerCommand::locate(),
        }
    }

    /// A copy safe to display, with every connection property value hidden
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for value in copy.connection.properties.values_mut() {
            *value = REDACTED.to_string();
        }
        copy
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("failed to render configuration: {}", e)))
    }
}
