//! SQL template loading and membership-clause expansion
//!
//! A template is a plain parameterized statement with exactly one
//! [`KEYS_TOKEN`] where the key list goes and a trailing `?` for the scope:
//!
//! ```sql
//! SELECT SUM(quantity) AS available_quantity, item_number
//! FROM inventory_onhand
//! WHERE item_number IN ({{keys}})
//!   AND business_unit = ?
//! GROUP BY item_number
//! ```
//!
//! The token expands to one positional placeholder per key, so the whole
//! batch runs as a single statement.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::request::LookupRequest;

/// Substitution token for the key membership clause
pub const KEYS_TOKEN: &str = "{{keys}}";

/// A parsed SQL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplate {
    text: String,
    source: Option<PathBuf>,
}

impl SqlTemplate {
    /// Parse template text, requiring exactly one [`KEYS_TOKEN`]
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        match text.matches(KEYS_TOKEN).count() {
            1 => Ok(Self { text, source: None }),
            0 => Err(Error::template(format!(
                "template does not contain the {} token",
                KEYS_TOKEN
            ))),
            n => Err(Error::template(format!(
                "template contains the {} token {} times, expected exactly once",
                KEYS_TOKEN, n
            ))),
        }
    }

    /// Read and parse a template file
    ///
    /// Templates are read on every call; nothing is cached.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::template(format!("cannot read template {}: {}", path.display(), e))
        })?;
        let mut template = Self::parse(text).map_err(|e| {
            Error::template(format!("{} ({})", e.message(), path.display()))
        })?;
        template.source = Some(path.to_path_buf());
        Ok(template)
    }

    /// The raw template text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The file this template was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Expand the membership token into `count` positional placeholders
    pub fn materialize(&self, count: usize) -> String {
        let placeholders = vec!["?"; count].join(", ");
        self.text.replacen(KEYS_TOKEN, &placeholders, 1)
    }
}

/// Parameters in bind order: every key, then the scope
pub fn bind_parameters(request: &LookupRequest) -> Vec<String> {
    let mut params = Vec::with_capacity(request.len() + 1);
    params.extend(request.keys().iter().cloned());
    params.push(request.scope().to_string());
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ErrorKind;
    use tempfile::TempDir;

    const TEMPLATE: &str = "SELECT SUM(quantity), item_number FROM stock \
                            WHERE item_number IN ({{keys}}) AND bu = ? GROUP BY item_number";

    #[test]
    fn materialize_expands_one_placeholder_per_key() {
        let template = SqlTemplate::parse(TEMPLATE).unwrap();
        assert_eq!(
            template.materialize(3),
            "SELECT SUM(quantity), item_number FROM stock \
             WHERE item_number IN (?, ?, ?) AND bu = ? GROUP BY item_number"
        );
        assert!(template.materialize(1).contains("IN (?) AND"));
    }

    #[test]
    fn missing_token_is_a_template_error() {
        let err = SqlTemplate::parse("SELECT 1 WHERE bu = ?").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);
        assert!(err.message().contains("does not contain"));
    }

    #[test]
    fn repeated_token_is_a_template_error() {
        let err = SqlTemplate::parse("SELECT {{keys}} WHERE x IN ({{keys}})").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);
        assert!(err.message().contains("2 times"));
    }

    #[test]
    fn load_reads_file_and_records_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("check.sql");
        std::fs::write(&path, TEMPLATE).unwrap();

        let template = SqlTemplate::load(&path).unwrap();
        assert_eq!(template.text(), TEMPLATE);
        assert_eq!(template.source(), Some(path.as_path()));
    }

    #[test]
    fn load_missing_file_is_a_template_error() {
        let temp = TempDir::new().unwrap();
        let err = SqlTemplate::load(&temp.path().join("absent.sql")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);
        assert!(err.message().starts_with("cannot read template"));
    }

    #[test]
    fn load_reports_path_when_token_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.sql");
        std::fs::write(&path, "SELECT 1").unwrap();

        let err = SqlTemplate::load(&path).unwrap_err();
        assert!(err.message().contains("bad.sql"));
    }

    #[test]
    fn bind_parameters_puts_scope_last() {
        let request = LookupRequest::new(
            vec!["A".to_string(), "B".to_string()],
            vec![1, 2],
            "US1 Business Unit",
        )
        .unwrap();
        assert_eq!(
            bind_parameters(&request),
            vec!["A", "B", "US1 Business Unit"]
        );
    }
}
