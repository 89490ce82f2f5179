//! GraphStore Trait - Typed Persistence Façade
//!
//! This module defines the `GraphStore` trait through which the graph
//! synthesis job reads notes and writes galaxy nodes and links. Every method
//! returns typed records; raw rows never cross this boundary.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so the job never blocks the runtime
//! 2. **Ownership Semantics**: Inserts take ownership of their inputs
//! 3. **Error Handling**: All failures are `DatabaseError` (storage errors)
//! 4. **Batch Writes**: A regeneration's nodes and links are written together
//!    through `apply_graph_batch`, so a crash mid-run cannot leave links without
//!    their nodes
//!
//! # Examples
//!
//! ```rust,no_run
//! use vicoo_core::db::{DatabaseService, GraphStore, LibsqlStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = DatabaseService::new(PathBuf::from("./data/vicoo.db")).await?;
//!     let store: Arc<dyn GraphStore> = Arc::new(LibsqlStore::new(db));
//!
//!     for note in store.unlinked_notes("dev_user_1", 10).await? {
//!         println!("unlinked: {}", note.title);
//!     }
//!     Ok(())
//! }
//! ```

use crate::db::DatabaseError;
use crate::models::{GraphLink, GraphNode, NewGraphLink, NewGraphNode, NewNote, Note};
use async_trait::async_trait;

/// Abstraction layer for note and graph persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the synthesis service holds one
/// behind an `Arc` and uses it from a spawned background task.
#[async_trait]
pub trait GraphStore: Send + Sync {
    //
    // NOTES (read by the synthesis job)
    //

    /// Notes of `user_id` that no node references, most recent first
    ///
    /// A note is unlinked when no node has `linked_note_id` equal to its id.
    async fn unlinked_notes(&self, user_id: &str, limit: usize) -> Result<Vec<Note>, DatabaseError>;

    /// All notes of `user_id`, most recent first
    async fn notes_for_user(&self, user_id: &str) -> Result<Vec<Note>, DatabaseError>;

    /// Number of notes owned by `user_id`
    async fn count_notes(&self, user_id: &str) -> Result<u64, DatabaseError>;

    /// Tag names attached to a note (unordered, possibly empty)
    async fn note_tags(&self, note_id: &str) -> Result<Vec<String>, DatabaseError>;

    /// Get a note by id
    async fn get_note(&self, id: &str) -> Result<Option<Note>, DatabaseError>;

    /// Find a note of `user_id` by exact title
    async fn find_note_by_title(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Note>, DatabaseError>;

    /// Insert a note and attach its tags
    ///
    /// Tags are unique by name: existing tags are reused, missing ones created.
    async fn create_note(&self, note: NewNote) -> Result<Note, DatabaseError>;

    //
    // GRAPH (written by the synthesis job)
    //

    /// Insert a single node
    async fn insert_node(&self, node: NewGraphNode) -> Result<(), DatabaseError>;

    /// Persist a regeneration's nodes and links in one transaction
    ///
    /// When `replace_existing` is true, every existing link and node is deleted
    /// first, inside the same transaction.
    async fn apply_graph_batch(
        &self,
        nodes: Vec<NewGraphNode>,
        links: Vec<NewGraphLink>,
        replace_existing: bool,
    ) -> Result<(), DatabaseError>;

    /// All nodes ordered by creation time
    async fn list_nodes(&self) -> Result<Vec<GraphNode>, DatabaseError>;

    /// All links ordered by creation time
    async fn list_links(&self) -> Result<Vec<GraphLink>, DatabaseError>;

    /// Nodes that reference no note (null or empty `linked_note_id`)
    async fn orphan_nodes(&self) -> Result<Vec<GraphNode>, DatabaseError>;

    /// Nodes whose `linked_note_id` equals `note_id`
    async fn nodes_linked_to(&self, note_id: &str) -> Result<Vec<GraphNode>, DatabaseError>;

    //
    // LIFECYCLE
    //

    /// Durably persist committed writes
    async fn flush(&self) -> Result<(), DatabaseError>;
}
