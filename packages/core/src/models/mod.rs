//! Data Models
//!
//! This module contains the typed records used throughout Vicoo's graph
//! pipeline:
//!
//! - `Note` / `NewNote` - Notes read by the synthesis job (written by the CRUD surface)
//! - `GraphNode` / `GraphLink` - Galaxy graph rows
//! - `GraphSuggestions` - Structured output of the external reasoning tool
//!
//! Rows are mapped into these types at the database boundary; nothing above
//! `db` handles untyped rows.

mod graph;
mod note;

pub use graph::{
    random_position, GraphLink, GraphNode, GraphSuggestions, LinkSuggestion, NewGraphLink,
    NewGraphNode, NodeSuggestion, DEFAULT_NODE_COLOR, LINK_TYPE_SOLID, NODE_ICON_CIRCLE,
    NODE_TYPE_PLANET,
};
pub use note::{NewNote, Note, TaggedNote, DEFAULT_CATEGORY, SNIPPET_LENGTH};
