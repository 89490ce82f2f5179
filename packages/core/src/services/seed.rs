//! Development Seed Data
//!
//! Populates an empty database with a development user and four sample notes
//! so the galaxy view and the synthesis job have something to work with.
//! A `seed_meta` marker makes the seed run at most once per database.

use crate::db::{DatabaseError, GraphStore, LibsqlStore};
use crate::models::NewNote;
use chrono::{Duration, Utc};

/// Marker row written to `seed_meta` after a successful seed
pub const DEV_SEED_MARKER: &str = "dev-sample-v1";

pub const DEV_SEED_USER_ID: &str = "dev_user_1";
pub const DEV_SEED_USER_NAME: &str = "Developer";
pub const DEV_SEED_USER_EMAIL: &str = "dev@vicoo.local";

struct SeedNote {
    title: &'static str,
    category: &'static str,
    snippet: &'static str,
    content: &'static str,
    published: bool,
    color: &'static str,
    tags: &'static [&'static str],
}

const DEV_SEED_NOTES: &[SeedNote] = &[
    SeedNote {
        title: "Welcome to Vicoo",
        category: "idea",
        snippet: "Your visual coordinator for knowledge management",
        content: "# Welcome to Vicoo\n\nThis is your new knowledge workspace. Start creating notes and exploring the galaxy view!",
        published: true,
        color: "#FFD166",
        tags: &["welcome", "intro"],
    },
    SeedNote {
        title: "React Best Practices",
        category: "code",
        snippet: "Key patterns for React development",
        content: "# React Best Practices\n\n- Use functional components with hooks\n- Keep state local when possible\n- Memoize expensive computations",
        published: true,
        color: "#118AB2",
        tags: &["react", "javascript", "frontend"],
    },
    SeedNote {
        title: "Design System Ideas",
        category: "design",
        snippet: "Neubrutalism-lite design concepts",
        content: "# Design System\n\n## Colors\n- Primary: #FFD166\n- Secondary: #0df259\n- Accent: #EF476F",
        published: false,
        color: "#EF476F",
        tags: &["design", "ui", "ideas"],
    },
    SeedNote {
        title: "Project Planning Meeting",
        category: "meeting",
        snippet: "Q1 planning discussion notes",
        content: "# Q1 Planning\n\n- Define MVP scope\n- Set milestone dates\n- Assign team responsibilities",
        published: true,
        color: "#0df259",
        tags: &["meeting", "planning"],
    },
];

/// Titles of the sample notes, in seed order
pub fn dev_seed_titles() -> Vec<&'static str> {
    DEV_SEED_NOTES.iter().map(|n| n.title).collect()
}

/// Seed the development user and sample notes
///
/// Returns `false` without writing anything when the marker already exists.
/// Notes whose title already exists for the user are left untouched.
pub async fn seed_development_data(store: &LibsqlStore) -> Result<bool, DatabaseError> {
    let db = store.database();

    let seeded = db
        .query_one(
            "SELECT key FROM seed_meta WHERE key = ?",
            [DEV_SEED_MARKER],
            |row| Ok(row.get::<String>(0)?),
        )
        .await?;
    if seeded.is_some() {
        tracing::info!("Seed marker '{}' already exists, skipping", DEV_SEED_MARKER);
        return Ok(false);
    }

    tracing::info!("Seeding development database");

    db.execute(
        "INSERT OR IGNORE INTO users (id, name, email) VALUES (?, ?, ?)",
        (DEV_SEED_USER_ID, DEV_SEED_USER_NAME, DEV_SEED_USER_EMAIL),
    )
    .await?;

    // Earlier entries get later timestamps so they sort first
    let now = Utc::now();
    for (i, seed) in DEV_SEED_NOTES.iter().enumerate() {
        if store
            .find_note_by_title(DEV_SEED_USER_ID, seed.title)
            .await?
            .is_some()
        {
            tracing::debug!("Seed note '{}' already exists", seed.title);
            continue;
        }

        let note = NewNote::new(DEV_SEED_USER_ID, seed.title, seed.content)
            .with_category(seed.category)
            .with_snippet(seed.snippet)
            .with_published(seed.published)
            .with_color(seed.color)
            .with_tags(seed.tags.iter().copied())
            .with_timestamp(now - Duration::seconds(i as i64));
        store.create_note(note).await?;
    }

    db.execute(
        "INSERT OR IGNORE INTO seed_meta (key) VALUES (?)",
        [DEV_SEED_MARKER],
    )
    .await?;
    store.flush().await?;

    tracing::info!("Development seed completed ({} notes)", DEV_SEED_NOTES.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseService;
    use tempfile::TempDir;

    async fn create_test_store() -> (LibsqlStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = DatabaseService::new(temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (LibsqlStore::new(db), temp_dir)
    }

    #[tokio::test]
    async fn test_seed_creates_notes_with_tags() {
        let (store, _temp_dir) = create_test_store().await;

        assert!(seed_development_data(&store).await.unwrap());

        let notes = store.notes_for_user(DEV_SEED_USER_ID).await.unwrap();
        let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, dev_seed_titles());

        let react = store
            .find_note_by_title(DEV_SEED_USER_ID, "React Best Practices")
            .await
            .unwrap()
            .unwrap();
        let mut tags = store.note_tags(&react.id).await.unwrap();
        tags.sort();
        assert_eq!(tags, vec!["frontend", "javascript", "react"]);
        assert_eq!(react.category, "code");
        assert_eq!(react.snippet.as_deref(), Some("Key patterns for React development"));
    }

    #[tokio::test]
    async fn test_seed_runs_once() {
        let (store, _temp_dir) = create_test_store().await;

        assert!(seed_development_data(&store).await.unwrap());
        assert!(!seed_development_data(&store).await.unwrap());

        assert_eq!(store.count_notes(DEV_SEED_USER_ID).await.unwrap(), 4);
    }
}
