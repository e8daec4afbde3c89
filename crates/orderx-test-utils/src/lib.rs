//! Shared test fixtures for the orderx workspace.
//!
//! Dev-dependency only, never published. Fixtures hand out plain paths and
//! strings so that any crate can use them without pulling in the types of
//! the crate under test.
//!
//! # Modules
//!
//! - [`inventory`] - [`InventoryFixture`]: a temporary SQLite inventory
//!   database with a matching SQL template and config file

pub mod inventory;

pub use inventory::InventoryFixture;
