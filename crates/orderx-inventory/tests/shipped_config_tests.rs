//! The sample files under `config/` must work as shipped

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use orderx_inventory::config::DEFAULT_TEMPLATE;
use orderx_inventory::executor::execute;
use orderx_inventory::{
    ConnectionDescriptor, DriverRegistry, InventoryConfig, LookupRequest, SqlTemplate, aggregate,
};
use orderx_test_utils::InventoryFixture;
use orderx_test_utils::inventory::EXAMPLE_SCOPE;
use pretty_assertions::assert_eq;

/// Paths are relative to the workspace root, like [`DEFAULT_TEMPLATE`]
fn shipped(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(relative)
}

#[test]
fn shipped_template_loads() {
    let template = SqlTemplate::load(&shipped(DEFAULT_TEMPLATE)).unwrap();
    let sql = template.materialize(2);
    assert!(sql.contains("IN (?, ?)"), "{sql}");
    assert!(!sql.contains("{{keys}}"));
}

#[test]
fn shipped_template_answers_against_the_inventory_schema() {
    let fixture = InventoryFixture::with_example_stock();
    let template = SqlTemplate::load(&shipped(DEFAULT_TEMPLATE)).unwrap();
    let request = LookupRequest::new(
        vec!["AS6647431".into(), "AS6647433".into()],
        vec![2000, 1],
        EXAMPLE_SCOPE,
    )
    .unwrap();
    let descriptor = ConnectionDescriptor {
        driver: "sqlite".to_string(),
        url: fixture.url(),
        properties: BTreeMap::new(),
    };

    let rows = execute(&DriverRegistry::with_builtin(), &descriptor, &template, &request).unwrap();
    let verdicts: Vec<(String, u64, bool)> = aggregate(&request, &rows)
        .into_iter()
        .map(|r| (r.key, r.available_amount, r.satisfied))
        .collect();
    assert_eq!(
        verdicts,
        vec![
            ("AS6647431".to_string(), 2500, true),
            ("AS6647433".to_string(), 0, false),
        ]
    );
}

#[test]
fn example_config_parses_and_validates() {
    let content = std::fs::read_to_string(shipped("config/orderx.example.toml")).unwrap();
    let config = InventoryConfig::from_toml_str(&content).unwrap();

    config.validate().unwrap();
    assert_eq!(config.connection.driver, "sqlite");
    assert_eq!(config.connection.properties["auth.profile"], "DEFAULT");
    assert_eq!(config.query.template, PathBuf::from("inventory_check.sql"));
    assert_eq!(config.timeout().as_secs(), 60);
}

#[test]
fn example_config_template_resolves_to_shipped_file() {
    let config = InventoryConfig::load(&shipped("config/orderx.example.toml")).unwrap();
    let template = SqlTemplate::load(&config.query.template).unwrap();
    assert_eq!(
        template.text(),
        std::fs::read_to_string(shipped(DEFAULT_TEMPLATE)).unwrap()
    );
}
