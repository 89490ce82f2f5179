//! Note Data Structures
//!
//! Notes are owned by the CRUD surface; the graph synthesis pipeline only reads
//! them. `NewNote` exists for seeding and for tests that need a populated
//! corpus.
//!
//! # Examples
//!
//! ```rust
//! use vicoo_core::models::NewNote;
//!
//! let note = NewNote::new("dev_user_1", "React Best Practices", "- Use hooks")
//!     .with_category("code")
//!     .with_tags(["react", "frontend"]);
//!
//! assert_eq!(note.resolved_snippet(), "- Use hooks");
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of content characters used when a note has no explicit snippet
pub const SNIPPET_LENGTH: usize = 100;

/// Default category assigned by the CRUD surface
pub const DEFAULT_CATEGORY: &str = "idea";

/// A persisted note row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub snippet: Option<String>,
    pub published: bool,
    /// Creation time (RFC3339)
    pub timestamp: String,
    pub updated_at: String,
}

/// A note together with its tag names, as fed to prompt construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedNote {
    pub note: Note,
    pub tags: Vec<String>,
}

impl TaggedNote {
    pub fn new(note: Note, tags: Vec<String>) -> Self {
        Self { note, tags }
    }
}

/// Input for inserting a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub snippet: Option<String>,
    pub published: bool,
    pub color: Option<String>,
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl NewNote {
    /// Create a note input with a fresh id, the default category and the current time
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            category: DEFAULT_CATEGORY.to_string(),
            content: content.into(),
            snippet: None,
            published: false,
            color: None,
            tags: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Override the creation time (ordering of unlinked notes is most-recent first)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Explicit snippet, or the first 100 characters of content
    pub fn resolved_snippet(&self) -> String {
        match &self.snippet {
            Some(snippet) if !snippet.is_empty() => snippet.clone(),
            _ => self.content.chars().take(SNIPPET_LENGTH).collect(),
        }
    }

    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_defaults_to_content_prefix() {
        let content = "x".repeat(250);
        let note = NewNote::new("u", "t", content);
        assert_eq!(note.resolved_snippet().chars().count(), SNIPPET_LENGTH);
    }

    #[test]
    fn test_explicit_snippet_wins() {
        let note = NewNote::new("u", "t", "body").with_snippet("preview");
        assert_eq!(note.resolved_snippet(), "preview");
    }

    #[test]
    fn test_empty_snippet_falls_back_to_content() {
        let note = NewNote::new("u", "t", "body").with_snippet("");
        assert_eq!(note.resolved_snippet(), "body");
    }

    #[test]
    fn test_snippet_counts_characters_not_bytes() {
        let note = NewNote::new("u", "t", "知识".repeat(80));
        assert_eq!(note.resolved_snippet().chars().count(), SNIPPET_LENGTH);
    }
}
