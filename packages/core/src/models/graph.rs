//! Galaxy Graph Data Structures
//!
//! Persisted graph rows (`GraphNode`, `GraphLink`), their insert inputs, and the
//! suggestion payload returned by the external reasoning tool.
//!
//! Node positions are display-only: they are drawn uniformly from the galaxy
//! canvas (`[-400, 400) x [-300, 300)`) and carry no meaning.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Display type written for every generated node
pub const NODE_TYPE_PLANET: &str = "planet";

/// Icon written for every generated node
pub const NODE_ICON_CIRCLE: &str = "circle";

/// Display hint written for every generated link
pub const LINK_TYPE_SOLID: &str = "solid";

/// Fallback color when a suggestion arrives without one
pub const DEFAULT_NODE_COLOR: &str = "#FFD166";

const CANVAS_HALF_WIDTH: f64 = 400.0;
const CANVAS_HALF_HEIGHT: f64 = 300.0;

/// A persisted galaxy node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub color: String,
    pub icon: String,
    pub description: Option<String>,
    /// Weak reference to a note; may dangle after the note is deleted
    pub linked_note_id: Option<String>,
    pub created_at: Option<String>,
}

/// A persisted galaxy link between two node ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub created_at: Option<String>,
}

/// Input for inserting a node
#[derive(Debug, Clone, PartialEq)]
pub struct NewGraphNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub color: String,
    pub description: Option<String>,
    pub linked_note_id: Option<String>,
}

impl NewGraphNode {
    /// Create a node input with a fresh id and a random canvas position
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        let (x, y) = random_position();
        Self {
            id: Uuid::new_v4().to_string(),
            x,
            y,
            label: label.into(),
            color: color.into(),
            description: None,
            linked_note_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn linked_to(mut self, note_id: Option<String>) -> Self {
        self.linked_note_id = note_id;
        self
    }
}

/// Input for inserting a link between two already-identified nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGraphLink {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl NewGraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Uniform random position on the galaxy canvas
pub fn random_position() -> (f64, f64) {
    let mut rng = rand::thread_rng();
    (
        rng.gen_range(-CANVAS_HALF_WIDTH..CANVAS_HALF_WIDTH),
        rng.gen_range(-CANVAS_HALF_HEIGHT..CANVAS_HALF_HEIGHT),
    )
}

/// A node proposed by the reasoning tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSuggestion {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub color: String,
}

/// A link proposed by the reasoning tool, expressed with node labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSuggestion {
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
}

/// The structured result extracted from the reasoning tool's output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSuggestions {
    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<NodeSuggestion>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<LinkSuggestion>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl GraphSuggestions {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}
