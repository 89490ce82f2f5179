//! Knowledge Graph Prompt
//!
//! Builds the instruction text sent to the reasoning tool: the numbered note
//! corpus followed by the task and the JSON output contract that
//! `output_parser` expects back.

use crate::models::TaggedNote;
use std::fmt::Write;

/// Content characters included per note
pub const PROMPT_CONTENT_LIMIT: usize = 500;

/// Maximum node label length requested from the tool
pub const MAX_LABEL_CHARS: usize = 20;

/// Maximum node description length requested from the tool
pub const MAX_DESCRIPTION_CHARS: usize = 50;

const OUTPUT_CONTRACT: &str = r##"```json
{
  "nodes": [
    {
      "label": "Concept name",
      "description": "Short description of the concept",
      "color": "#RRGGBB"
    }
  ],
  "links": [
    {
      "source": "Source concept name",
      "target": "Target concept name",
      "reason": "Why the two concepts are related"
    }
  ]
}
```"##;

/// Compose the knowledge graph extraction prompt for `notes`
pub fn knowledge_graph_prompt(notes: &[TaggedNote]) -> String {
    let mut prompt = String::from(
        "You are a knowledge graph analyst. Analyze the notes below, extract the key \
         concepts they contain, and connect related concepts.\n\n## Notes:\n",
    );

    for (i, tagged) in notes.iter().enumerate() {
        if i > 0 {
            prompt.push('\n');
        }
        let _ = write!(prompt, "{}. Title: {}", i + 1, tagged.note.title);
        if !tagged.tags.is_empty() {
            let _ = write!(prompt, " [tags: {}]", tagged.tags.join(", "));
        }
        let _ = writeln!(
            prompt,
            "\n   Content: {}",
            truncate_content(&tagged.note.content, PROMPT_CONTENT_LIMIT)
        );
    }

    let _ = write!(
        prompt,
        "\n## Task:\n\
         1. Extract the key concepts from the notes as nodes\n\
         2. Identify relationships between concepts as links\n\
         3. Give every node a meaningful hex color code\n\n\
         ## Output format:\n\
         Return JSON with a `nodes` array and a `links` array:\n\n\
         {OUTPUT_CONTRACT}\n\n\
         Make sure that:\n\
         - Node labels are concise, at most {MAX_LABEL_CHARS} characters\n\
         - Descriptions are at most {MAX_DESCRIPTION_CHARS} characters\n\
         - Colors form a coherent palette\n\
         - Every link has a clear reason and uses labels from `nodes`\n\n\
         Return only the JSON, with no other text."
    );

    prompt
}

fn truncate_content(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    fn tagged(title: &str, content: &str, tags: &[&str]) -> TaggedNote {
        TaggedNote::new(
            Note {
                id: format!("id-{}", title),
                user_id: "dev_user_1".to_string(),
                title: title.to_string(),
                category: "idea".to_string(),
                content: content.to_string(),
                snippet: None,
                published: false,
                timestamp: "2025-01-01T00:00:00.000Z".to_string(),
                updated_at: "2025-01-01T00:00:00.000Z".to_string(),
            },
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn test_prompt_numbers_notes_and_lists_tags() {
        let prompt = knowledge_graph_prompt(&[
            tagged("React Best Practices", "Use hooks", &["react", "frontend"]),
            tagged("Design System Ideas", "Tokens", &[]),
        ]);

        assert!(prompt.contains("1. Title: React Best Practices [tags: react, frontend]"));
        assert!(prompt.contains("2. Title: Design System Ideas\n   Content: Tokens"));
        assert!(prompt.contains("\"nodes\""));
        assert!(prompt.contains("at most 20 characters"));
    }

    #[test]
    fn test_long_content_is_truncated_with_ellipsis() {
        let content = "é".repeat(PROMPT_CONTENT_LIMIT + 20);
        let prompt = knowledge_graph_prompt(&[tagged("Long", &content, &[])]);

        let expected = format!("Content: {}...", "é".repeat(PROMPT_CONTENT_LIMIT));
        assert!(prompt.contains(&expected));
        assert!(!prompt.contains(&"é".repeat(PROMPT_CONTENT_LIMIT + 1)));
    }

    #[test]
    fn test_short_content_is_not_marked_truncated() {
        assert_eq!(truncate_content("short", PROMPT_CONTENT_LIMIT), "short");
        let exact = "a".repeat(PROMPT_CONTENT_LIMIT);
        assert_eq!(truncate_content(&exact, PROMPT_CONTENT_LIMIT), exact);
    }
}
