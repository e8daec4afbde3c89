//! Isolated inventory lookups for the OrderX order-processing workflow
//!
//! This crate answers one question for the agent layer: given a batch of
//! item numbers, the quantity required for each, and a business unit, is
//! there enough stock? It does so without ever touching the data source from
//! the caller's process:
//!
//! ```text
//! [ caller / agent tool ]
//!        | InventoryCheck::check_availability
//!        v
//! [ Supervisor ] --- job (JSON line) ---> [ orderx-inventory-worker ]
//!        ^                                   | validate
//!        |                                   | materialize template
//!        |                                   | connect / execute / close
//!        |                                   | aggregate
//!        +---- one envelope (JSON line) -----+
//! ```
//!
//! The worker process owns the driver registry and the connection for
//! exactly one request. The supervisor enforces a hard wall-clock budget and
//! kills the worker when it is exceeded.
//!
//! # Modules
//!
//! - [`request`] - request validation
//! - [`template`] - SQL template loading and membership-clause expansion
//! - [`executor`] - driver registry and single-statement execution
//! - [`sqlite`] - the built-in SQLite driver
//! - [`aggregate`] - joining rows back onto the request
//! - [`envelope`] - results and the tagged response envelope
//! - [`worker`] - the pipeline run inside the isolated process
//! - [`supervisor`] - spawning, timing out and reaping worker processes
//! - [`config`] - `orderx.toml` and environment overrides
//! - [`tool`] - the caller-facing facade

pub mod aggregate;
pub mod config;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod request;
pub mod sqlite;
pub mod supervisor;
pub mod template;
pub mod tool;
pub mod worker;

pub use aggregate::aggregate;
pub use config::InventoryConfig;
pub use envelope::{ErrorDescriptor, ErrorKind, LookupResult, ResponseEnvelope};
pub use error::{Error, Result};
pub use executor::{Connection, ConnectionDescriptor, Connector, DriverRegistry, RawRow, SqlValue};
pub use request::LookupRequest;
pub use supervisor::{Supervisor, WorkerCommand};
pub use template::SqlTemplate;
pub use tool::InventoryCheck;
pub use worker::WorkerJob;
