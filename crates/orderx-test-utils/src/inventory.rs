//! [`InventoryFixture`] builder for lookup scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scope used by the worked example
pub const EXAMPLE_SCOPE: &str = "US1 Business Unit";

/// File name of the template written by [`InventoryFixture::new`]
pub const TEMPLATE_FILE: &str = "inventory_check.sql";

/// Template matching the fixture schema
pub const TEMPLATE: &str = "\
SELECT SUM(quantity) AS available_quantity, item_number
FROM inventory_onhand
WHERE item_number IN ({{keys}})
  AND business_unit = ?
GROUP BY item_number
";

const DATABASE_FILE: &str = "inventory.db";
const CONFIG_FILE: &str = "orderx.toml";

/// A temporary directory holding an inventory database, a template and
/// optionally a config file.
///
/// # Example
///
/// ```rust,no_run
/// use orderx_test_utils::InventoryFixture;
///
/// let fixture = InventoryFixture::new();
/// fixture.stock("AS6647431", "US1 Business Unit", 2500);
/// let config = fixture.write_config(None);
/// assert!(config.exists());
/// ```
pub struct InventoryFixture {
    temp_dir: TempDir,
}

impl Default for InventoryFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryFixture {
    /// Create an empty `inventory_onhand` table and the default template.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        let conn = fixture.open();
        conn.execute_batch(
            "CREATE TABLE inventory_onhand (
                item_number   TEXT NOT NULL,
                business_unit TEXT NOT NULL,
                quantity      INTEGER
            );",
        )
        .unwrap();
        fixture.write_template(TEMPLATE_FILE, TEMPLATE);
        fixture
    }

    /// Create the fixture seeded with the worked example: two of three
    /// requested items stocked in [`EXAMPLE_SCOPE`], plus noise in another
    /// business unit.
    pub fn with_example_stock() -> Self {
        let fixture = Self::new();
        // Split across two rows so the template's SUM is exercised.
        fixture.stock("AS6647431", EXAMPLE_SCOPE, 1500);
        fixture.stock("AS6647431", EXAMPLE_SCOPE, 1000);
        fixture.stock("AS6647432", EXAMPLE_SCOPE, 1000);
        fixture.stock("AS6647433", "UK1 Business Unit", 9000);
        fixture
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.root().join(DATABASE_FILE)
    }

    /// JDBC-style URL of the fixture database.
    pub fn url(&self) -> String {
        format!("jdbc:sqlite:{}", self.db_path().display())
    }

    pub fn template_path(&self) -> PathBuf {
        self.root().join(TEMPLATE_FILE)
    }

    /// Insert one on-hand row.
    pub fn stock(&self, item_number: &str, business_unit: &str, quantity: i64) -> &Self {
        self.open()
            .execute(
                "INSERT INTO inventory_onhand (item_number, business_unit, quantity) \
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![item_number, business_unit, quantity],
            )
            .unwrap();
        self
    }

    /// Write a template file next to the database and return its path.
    pub fn write_template(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    /// Render an `orderx.toml` pointing at the fixture database and template.
    pub fn config_toml(&self, worker_program: Option<&Path>) -> String {
        let mut config = format!(
            "[connection]\ndriver = \"sqlite\"\nurl = {:?}\n\n\
             [connection.properties]\n\"auth.method\" = \"api_key\"\n\n\
             [query]\ntemplate = {:?}\n\n[worker]\ntimeout_secs = 30\n",
            self.url(),
            TEMPLATE_FILE,
        );
        if let Some(program) = worker_program {
            config.push_str(&format!("program = {:?}\n", program.display().to_string()));
        }
        config
    }

    /// Write `orderx.toml` into the fixture root and return its path.
    pub fn write_config(&self, worker_program: Option<&Path>) -> PathBuf {
        let path = self.root().join(CONFIG_FILE);
        fs::write(&path, self.config_toml(worker_program)).unwrap();
        path
    }

    fn open(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(self.db_path()).unwrap()
    }
}
