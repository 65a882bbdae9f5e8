//! Database layer for MonkeLogger
//!
//! Handles SQLite database operations including:
//! - Schema creation and versioned migrations
//! - Connection pooling with scoped commit/rollback
//! - Parameterized reads and writes for themes, data types and data points

pub mod models;
pub mod schema;
pub mod pool;
pub mod migrations;
pub mod queries;

pub use pool::{ConnectionPool, PooledConnection};
pub use models::*;
