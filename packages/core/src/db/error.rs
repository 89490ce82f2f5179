//! Persistence Gateway Errors
//!
//! Everything that can go wrong between the synthesis job and the Vicoo
//! database file: opening it, creating the schema, running a statement,
//! decoding a row and committing a graph batch. None of these are retried;
//! a failed tick simply waits for the next timer fire.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The database file could not be opened by libsql
    #[error("Cannot open Vicoo database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// A table, index or pragma from the schema bootstrap failed
    #[error("Schema bootstrap failed: {0}")]
    InitializationFailed(String),

    /// The data directory (default `~/.vicoo/data`) is not writable
    #[error("No write access to database location: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Cannot create database directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// A note, node or link statement failed (constraint, missing row)
    #[error("Statement failed: {context}")]
    SqlExecutionError { context: String },

    /// A stored row did not fit its typed record
    #[error("Cannot read {entity} row: {reason}")]
    RowMapping { entity: &'static str, reason: String },

    /// A note insert or graph batch could not be committed; nothing was written
    #[error("Transaction failed: {context}")]
    TransactionFailed { context: String },
}

impl DatabaseError {
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    /// Row decoding failure for `entity` (`"note"`, `"node"`, `"link"`)
    pub fn row_mapping(entity: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::RowMapping {
            entity,
            reason: reason.to_string(),
        }
    }

    pub fn transaction_failed(context: impl Into<String>) -> Self {
        Self::TransactionFailed {
            context: context.into(),
        }
    }
}
