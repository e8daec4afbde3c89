//! In-process tests of the worker pipeline with a spy driver

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use orderx_inventory::worker::{WorkerJob, serve};
use orderx_inventory::{
    Connection, ConnectionDescriptor, Connector, DriverRegistry, ErrorKind, LookupRequest,
    RawRow, Result, SqlValue,
};
use orderx_test_utils::InventoryFixture;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Default)]
struct Spy {
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
    rows: Vec<RawRow>,
    panic_on_connect: bool,
}

struct SpyConnection {
    closes: Arc<AtomicUsize>,
    rows: Vec<RawRow>,
}

impl Connector for Spy {
    fn connect(
        &self,
        _url: &str,
        _properties: &BTreeMap<String, String>,
    ) -> Result<Box<dyn Connection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_connect {
            panic!("driver blew up");
        }
        Ok(Box::new(SpyConnection {
            closes: Arc::clone(&self.closes),
            rows: self.rows.clone(),
        }))
    }
}

impl Connection for SpyConnection {
    fn query(&mut self, _sql: &str, _params: &[String]) -> Result<Vec<RawRow>> {
        Ok(self.rows.clone())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn registry_with(spy: Arc<Spy>) -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry.register("spy", spy);
    registry
}

fn job_line(fixture: &InventoryFixture, request: Value) -> String {
    let job = WorkerJob {
        run_id: Uuid::new_v4(),
        request,
        connection: ConnectionDescriptor {
            driver: "spy".to_string(),
            url: "spy://inventory".to_string(),
            properties: BTreeMap::new(),
        },
        template: fixture.template_path(),
    };
    serde_json::to_string(&job).unwrap()
}

#[test]
fn invalid_request_never_connects() {
    let fixture = InventoryFixture::new();
    let spy = Arc::new(Spy::default());
    let registry = registry_with(Arc::clone(&spy));

    let envelope = serve(
        &job_line(
            &fixture,
            json!({"keys": ["A", "B"], "required_amounts": [1], "scope": "bu"}),
        ),
        &registry,
    );

    assert_eq!(envelope.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(spy.connects.load(Ordering::SeqCst), 0);
}

#[test]
fn bad_template_never_connects() {
    let fixture = InventoryFixture::new();
    fixture.write_template(
        "inventory_check.sql",
        "SELECT quantity, item_number FROM inventory_onhand",
    );
    let spy = Arc::new(Spy::default());
    let registry = registry_with(Arc::clone(&spy));

    let envelope = serve(
        &job_line(
            &fixture,
            json!({"keys": ["A"], "required_amounts": [1], "scope": "bu"}),
        ),
        &registry,
    );

    assert_eq!(envelope.error_kind(), Some(ErrorKind::Template));
    assert_eq!(spy.connects.load(Ordering::SeqCst), 0);
}

#[test]
fn successful_lookup_opens_and_closes_once() {
    let fixture = InventoryFixture::new();
    let spy = Arc::new(Spy {
        rows: vec![
            vec![SqlValue::Integer(7), SqlValue::Text("A".into())],
            vec![SqlValue::Integer(3), SqlValue::Text("A".into())],
        ],
        ..Spy::default()
    });
    let registry = registry_with(Arc::clone(&spy));

    let envelope = serve(
        &job_line(
            &fixture,
            json!({"keys": ["A", "B"], "required_amounts": [3, 0], "scope": "bu"}),
        ),
        &registry,
    );

    let results = envelope.into_result().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].available_amount, 3);
    assert!(results[0].satisfied);
    assert_eq!(results[1].available_amount, 0);
    assert!(results[1].satisfied);
    assert_eq!(spy.connects.load(Ordering::SeqCst), 1);
    assert_eq!(spy.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn driver_panic_becomes_worker_error() {
    let fixture = InventoryFixture::new();
    let spy = Arc::new(Spy {
        panic_on_connect: true,
        ..Spy::default()
    });
    let registry = registry_with(spy);

    let envelope = serve(
        &job_line(
            &fixture,
            json!({"keys": ["A"], "required_amounts": [1], "scope": "bu"}),
        ),
        &registry,
    );

    assert_eq!(envelope.error_kind(), Some(ErrorKind::Worker));
    assert!(envelope.to_tool_output().contains("driver blew up"));
}

#[test]
fn sqlite_pipeline_answers_worked_example() {
    let fixture = InventoryFixture::with_example_stock();
    let job = WorkerJob::new(
        Uuid::new_v4(),
        &LookupRequest::new(
            vec!["AS6647431".into(), "AS6647432".into(), "AS6647433".into()],
            vec![2000, 2500, 4000],
            "US1 Business Unit",
        )
        .unwrap(),
        ConnectionDescriptor {
            driver: "org.sqlite.JDBC".to_string(),
            url: fixture.url(),
            properties: BTreeMap::new(),
        },
        fixture.template_path(),
    )
    .unwrap();

    let envelope = serve(
        &serde_json::to_string(&job).unwrap(),
        &DriverRegistry::with_builtin(),
    );

    let verdicts: Vec<(String, u64, bool)> = envelope
        .into_result()
        .unwrap()
        .into_iter()
        .map(|r| (r.key, r.available_amount, r.satisfied))
        .collect();
    assert_eq!(
        verdicts,
        vec![
            ("AS6647431".to_string(), 2500, true),
            ("AS6647432".to_string(), 1000, false),
            ("AS6647433".to_string(), 0, false),
        ]
    );
}
