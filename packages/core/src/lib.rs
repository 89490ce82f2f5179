//! Vicoo Core - Auto-Graph Pipeline
//!
//! This crate turns a user's notes into the "galaxy" knowledge graph shown by
//! the Vicoo clients.
//!
//! # Architecture
//!
//! - **Persistence Gateway**: One embedded libsql database file, typed records
//!   at the boundary, explicit flush
//! - **External Reasoning Client**: A local CLI tool invoked as a child process,
//!   always killed on timeout
//! - **Graph Synthesis Job**: Timer-driven, one run at a time, stub nodes for
//!   small corpora and full regeneration for larger ones
//!
//! # Modules
//!
//! - [`models`] - Data structures (Note, GraphNode, GraphLink, GraphSuggestions)
//! - [`db`] - Database layer with libsql integration
//! - [`services`] - Synthesis service, background processor, reasoning client

pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use db::{DatabaseError, DatabaseService, GraphStore, LibsqlStore};
pub use models::*;
pub use services::*;
