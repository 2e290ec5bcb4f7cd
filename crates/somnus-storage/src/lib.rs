//! # somnus-storage
//!
//! SQLite persistence for the consolidation engine: WAL-mode pragmas, a single
//! serialized write connection, a round-robin read pool, `user_version`
//! migrations, and the event, memory and contradiction stores with
//! version compare-and-swap.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use somnus_core::errors::{SomnusError, StorageError};

/// Wrap a SQLite failure message as a storage error.
pub(crate) fn to_storage_err(message: String) -> SomnusError {
    SomnusError::StorageError(StorageError::Sqlite { message })
}
