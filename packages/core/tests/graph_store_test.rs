//! Integration tests for LibsqlStore
//!
//! Tests cover:
//! - Note insertion with tag reuse
//! - Unlinked note detection and ordering
//! - Graph batch writes, replacement and rollback
//! - Orphan node listing
//! - Persistence across reopen

use anyhow::Result;
use chrono::{Duration, Utc};
use vicoo_core::{
    db::{DatabaseService, GraphStore, LibsqlStore},
    models::{NewGraphLink, NewGraphNode, NewNote},
};
use tempfile::TempDir;

const USER: &str = "dev_user_1";

/// Test helper: Create a store over a fresh database file
async fn create_test_store() -> Result<(LibsqlStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db = DatabaseService::new(temp_dir.path().join("test.db")).await?;
    Ok((LibsqlStore::new(db), temp_dir))
}

// =========================================================================
// Notes and Tags
// =========================================================================

#[tokio::test]
async fn test_create_note_reuses_existing_tags() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let first = store
        .create_note(NewNote::new(USER, "React Hooks", "useState").with_tags(["react", "frontend"]))
        .await?;
    let second = store
        .create_note(
            NewNote::new(USER, "React Router", "routes").with_tags(["react", " ", "routing"]),
        )
        .await?;

    let mut first_tags = store.note_tags(&first.id).await?;
    first_tags.sort();
    assert_eq!(first_tags, vec!["frontend", "react"]);

    let mut second_tags = store.note_tags(&second.id).await?;
    second_tags.sort();
    assert_eq!(second_tags, vec!["react", "routing"]);

    let tag_count = store
        .database()
        .query_one("SELECT COUNT(*) FROM tags", (), |row| Ok(row.get::<i64>(0)?))
        .await?;
    assert_eq!(tag_count, Some(3), "'react' must be stored once");
    Ok(())
}

#[tokio::test]
async fn test_note_defaults_and_snippet() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;
    let content = "a".repeat(150);

    let note = store
        .create_note(NewNote::new(USER, "Defaults", content.clone()))
        .await?;

    assert_eq!(note.category, "idea");
    assert!(!note.published);
    assert_eq!(note.snippet.as_deref(), Some("a".repeat(100).as_str()));
    assert_eq!(note.content, content);
    assert_eq!(store.count_notes(USER).await?, 1);
    assert_eq!(store.count_notes("someone_else").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_find_note_by_title_is_user_scoped() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;
    store
        .create_note(NewNote::new("other_user", "Shared title", "x"))
        .await?;

    assert!(store.find_note_by_title(USER, "Shared title").await?.is_none());
    assert!(store
        .find_note_by_title("other_user", "Shared title")
        .await?
        .is_some());
    assert!(store.get_note("missing").await?.is_none());
    Ok(())
}

// =========================================================================
// Unlinked Notes
// =========================================================================

#[tokio::test]
async fn test_unlinked_notes_exclude_linked_and_respect_limit() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;
    let now = Utc::now();

    let mut notes = Vec::new();
    for i in 0..4 {
        let note = NewNote::new(USER, format!("Note {}", i), "body")
            .with_timestamp(now - Duration::minutes(i));
        notes.push(store.create_note(note).await?);
    }
    store
        .create_note(NewNote::new("other_user", "Not mine", "body"))
        .await?;

    store
        .insert_node(NewGraphNode::new("Linked", "#FFD166").linked_to(Some(notes[0].id.clone())))
        .await?;

    let unlinked = store.unlinked_notes(USER, 10).await?;
    let titles: Vec<&str> = unlinked.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Note 1", "Note 2", "Note 3"], "most recent first");

    let limited = store.unlinked_notes(USER, 2).await?;
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].title, "Note 1");
    Ok(())
}

#[tokio::test]
async fn test_dangling_link_target_does_not_link_note() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;
    let note = store.create_note(NewNote::new(USER, "Alone", "body")).await?;

    store
        .insert_node(
            NewGraphNode::new("Dangling", "#FFD166").linked_to(Some("deleted-note".to_string())),
        )
        .await?;

    let unlinked = store.unlinked_notes(USER, 10).await?;
    assert_eq!(unlinked.len(), 1);
    assert_eq!(unlinked[0].id, note.id);
    Ok(())
}

// =========================================================================
// Graph Batches
// =========================================================================

#[tokio::test]
async fn test_apply_graph_batch_writes_nodes_and_links() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let alpha = NewGraphNode::new("Alpha", "#06D6A0").with_description("first");
    let beta = NewGraphNode::new("Beta", "#118AB2");
    let link = NewGraphLink::new(alpha.id.clone(), beta.id.clone());
    let (alpha_id, beta_id) = (alpha.id.clone(), beta.id.clone());

    store.apply_graph_batch(vec![alpha, beta], vec![link], false).await?;
    store.flush().await?;

    let nodes = store.list_nodes().await?;
    assert_eq!(nodes.len(), 2);
    let stored_alpha = nodes.iter().find(|n| n.id == alpha_id).unwrap();
    assert_eq!(stored_alpha.label, "Alpha");
    assert_eq!(stored_alpha.color, "#06D6A0");
    assert_eq!(stored_alpha.description.as_deref(), Some("first"));
    assert_eq!(stored_alpha.node_type, "planet");
    assert!(stored_alpha.created_at.is_some());

    let links = store.list_links().await?;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].source, alpha_id);
    assert_eq!(links[0].target, beta_id);
    assert_eq!(links[0].link_type, "solid");
    Ok(())
}

#[tokio::test]
async fn test_apply_graph_batch_replace_clears_existing() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let old_a = NewGraphNode::new("Old A", "#FFD166");
    let old_b = NewGraphNode::new("Old B", "#FFD166");
    let old_link = NewGraphLink::new(old_a.id.clone(), old_b.id.clone());
    store
        .apply_graph_batch(vec![old_a, old_b], vec![old_link], false)
        .await?;

    let fresh = NewGraphNode::new("Fresh", "#8338EC");
    store.apply_graph_batch(vec![fresh], vec![], true).await?;

    let nodes = store.list_nodes().await?;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].label, "Fresh");
    assert!(store.list_links().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_batch_rolls_back() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let existing = NewGraphNode::new("Existing", "#FFD166");
    let duplicate_id = existing.id.clone();
    store.insert_node(existing).await?;

    let mut clash = NewGraphNode::new("Clash", "#FFD166");
    clash.id = duplicate_id;
    let first = NewGraphNode::new("Would be lost", "#FFD166");

    let result = store
        .apply_graph_batch(vec![first, clash], vec![], false)
        .await;
    assert!(result.is_err());

    let nodes = store.list_nodes().await?;
    assert_eq!(nodes.len(), 1, "earlier inserts of the batch must roll back");
    assert_eq!(nodes[0].label, "Existing");
    Ok(())
}

#[tokio::test]
async fn test_orphan_nodes_sorted_by_label() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;
    let note = store.create_note(NewNote::new(USER, "Note", "body")).await?;

    store.insert_node(NewGraphNode::new("Zeta", "#FFD166")).await?;
    store.insert_node(NewGraphNode::new("Alpha", "#FFD166")).await?;
    store
        .insert_node(NewGraphNode::new("Linked", "#FFD166").linked_to(Some(note.id.clone())))
        .await?;
    store
        .database()
        .execute(
            "INSERT INTO nodes (id, label, linked_note_id) VALUES (?, ?, '')",
            ("empty-link", "Middle"),
        )
        .await?;

    let orphans = store.orphan_nodes().await?;
    let labels: Vec<&str> = orphans.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["Alpha", "Middle", "Zeta"]);

    let linked = store.nodes_linked_to(&note.id).await?;
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].label, "Linked");
    Ok(())
}

// =========================================================================
// Durability
// =========================================================================

#[tokio::test]
async fn test_flushed_writes_survive_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("vicoo.db");

    {
        let store = LibsqlStore::new(DatabaseService::new(db_path.clone()).await?);
        store.create_note(NewNote::new(USER, "Persistent", "body")).await?;
        store.insert_node(NewGraphNode::new("Kept", "#FFD166")).await?;
        store.flush().await?;
    }

    let reopened = LibsqlStore::new(DatabaseService::new(db_path).await?);
    assert_eq!(reopened.count_notes(USER).await?, 1);
    assert_eq!(reopened.list_nodes().await?.len(), 1);
    Ok(())
}
