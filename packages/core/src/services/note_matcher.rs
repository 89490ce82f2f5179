//! Node-to-Note Matching
//!
//! After a full regeneration each suggested node is associated, best effort,
//! with one of the notes it was derived from. The strategy is a trait so a
//! smarter matcher (embeddings, fuzzy titles) can replace the default.

use crate::models::Note;

/// Characters compared by `PrefixNoteMatcher`
pub const MATCH_PREFIX_CHARS: usize = 5;

/// Strategy for associating a generated node label with a source note
pub trait NoteMatcher: Send + Sync {
    /// The note `label` most plausibly came from, if any
    fn match_note<'a>(&self, label: &str, notes: &'a [Note]) -> Option<&'a Note>;
}

/// Case-insensitive prefix containment, checked in both directions
///
/// A note matches when its lowercased title contains the first five
/// characters of the lowercased label, or the lowercased label contains the
/// first five characters of the lowercased title. The first matching note in
/// `notes` order wins. Empty labels and titles never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixNoteMatcher;

impl NoteMatcher for PrefixNoteMatcher {
    fn match_note<'a>(&self, label: &str, notes: &'a [Note]) -> Option<&'a Note> {
        let label = label.to_lowercase();
        let label_prefix = prefix(&label);
        if label_prefix.is_empty() {
            return None;
        }

        notes.iter().find(|note| {
            let title = note.title.to_lowercase();
            let title_prefix = prefix(&title);
            !title_prefix.is_empty()
                && (title.contains(label_prefix) || label.contains(title_prefix))
        })
    }
}

fn prefix(s: &str) -> &str {
    match s.char_indices().nth(MATCH_PREFIX_CHARS) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, title: &str) -> Note {
        Note {
            id: id.to_string(),
            user_id: "dev_user_1".to_string(),
            title: title.to_string(),
            category: "idea".to_string(),
            content: String::new(),
            snippet: None,
            published: false,
            timestamp: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_label_prefix_found_in_title() {
        let notes = vec![note("n1", "Welcome to Vicoo"), note("n2", "React Best Practices")];
        let matched = PrefixNoteMatcher.match_note("React Hooks", &notes);
        assert_eq!(matched.map(|n| n.id.as_str()), Some("n2"));
    }

    #[test]
    fn test_title_prefix_found_in_label() {
        let notes = vec![note("n1", "Design System Ideas")];
        let matched = PrefixNoteMatcher.match_note("UI DESIGN tokens", &notes);
        assert_eq!(matched.map(|n| n.id.as_str()), Some("n1"));
    }

    #[test]
    fn test_first_match_wins() {
        let notes = vec![note("n1", "Rust ownership"), note("n2", "Rust traits")];
        let matched = PrefixNoteMatcher.match_note("Rust", &notes);
        assert_eq!(matched.map(|n| n.id.as_str()), Some("n1"));
    }

    #[test]
    fn test_no_match_and_empty_inputs() {
        let notes = vec![note("n1", "Project Planning Meeting"), note("n2", "")];
        assert!(PrefixNoteMatcher.match_note("Galaxy", &notes).is_none());
        assert!(PrefixNoteMatcher.match_note("", &notes).is_none());
    }
}
