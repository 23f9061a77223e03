//! Database module for SafeCase Server
//!
//! PostgreSQL implementation of the core record store.

pub mod error;
pub mod postgres;

pub use error::DbError;
pub use postgres::{PoolSettings, PostgresRecordStore};
