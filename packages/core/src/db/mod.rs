//! Database Layer
//!
//! This module is Vicoo's persistence gateway:
//!
//! - `DatabaseService` - embedded libsql database, schema, query/execute/flush primitives
//! - `GraphStore` - typed façade for notes, tags, nodes and links
//! - `LibsqlStore` - `GraphStore` implementation over `DatabaseService`
//! - `FlushTask` - periodic checkpoint of the database file
//!
//! The database file is owned by a single process. All statement execution
//! is serialized by SQLite's single-writer lock; there is no additional
//! locking in this layer.

mod database;
mod error;
mod flush_task;
mod graph_store;
mod libsql_store;

pub use database::{DatabaseService, DATABASE_PATH_ENV};
pub use error::DatabaseError;
pub use flush_task::{FlushTask, DEFAULT_FLUSH_INTERVAL, FLUSH_INTERVAL_ENV};
pub use graph_store::GraphStore;
pub use libsql_store::LibsqlStore;
