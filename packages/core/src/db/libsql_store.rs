//! LibsqlStore - GraphStore Implementation for the Embedded Database
//!
//! Thin wrapper around `DatabaseService` implementing the `GraphStore` trait.
//! All SQL for notes, tags, nodes and links lives here, together with the
//! `libsql::Row` → typed record conversions.

use crate::db::graph_store::GraphStore;
use crate::db::{DatabaseError, DatabaseService};
use crate::models::{
    GraphLink, GraphNode, NewGraphLink, NewGraphNode, NewNote, Note, DEFAULT_CATEGORY,
    DEFAULT_NODE_COLOR, LINK_TYPE_SOLID, NODE_ICON_CIRCLE, NODE_TYPE_PLANET,
};
use async_trait::async_trait;
use libsql::Row;
use uuid::Uuid;

const NOTE_COLUMNS: &str =
    "n.id, n.user_id, n.title, n.category, n.content, n.snippet, n.published, n.timestamp, n.updated_at";

const NODE_COLUMNS: &str =
    "id, x, y, label, type, color, icon, description, linked_note_id, created_at";

const INSERT_NODE_SQL: &str = "INSERT INTO nodes (id, x, y, label, type, color, icon, description, linked_note_id, created_at)
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))";

const INSERT_LINK_SQL: &str =
    "INSERT INTO links (id, source, target, type, created_at) VALUES (?, ?, ?, ?, datetime('now'))";

/// LibsqlStore implements GraphStore over `DatabaseService`
#[derive(Debug, Clone)]
pub struct LibsqlStore {
    db: DatabaseService,
}

impl LibsqlStore {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Underlying gateway, for callers that need raw primitives (seeding, tools)
    pub fn database(&self) -> &DatabaseService {
        &self.db
    }

    /// Convert a row selected with `NOTE_COLUMNS` into a `Note`
    fn row_to_note(row: &Row) -> Result<Note, DatabaseError> {
        let map = |e: libsql::Error| DatabaseError::row_mapping("note", e);

        let timestamp: Option<String> = row.get(7).map_err(map)?;
        let updated_at: Option<String> = row.get(8).map_err(map)?;

        Ok(Note {
            id: row.get(0).map_err(map)?,
            user_id: row.get(1).map_err(map)?,
            title: row.get(2).map_err(map)?,
            category: row
                .get::<Option<String>>(3)
                .map_err(map)?
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            content: row.get::<Option<String>>(4).map_err(map)?.unwrap_or_default(),
            snippet: row.get(5).map_err(map)?,
            published: row.get::<Option<i64>>(6).map_err(map)?.unwrap_or(0) != 0,
            updated_at: updated_at.or_else(|| timestamp.clone()).unwrap_or_default(),
            timestamp: timestamp.unwrap_or_default(),
        })
    }

    /// Convert a row selected with `NODE_COLUMNS` into a `GraphNode`
    fn row_to_node(row: &Row) -> Result<GraphNode, DatabaseError> {
        let map = |e: libsql::Error| DatabaseError::row_mapping("node", e);

        Ok(GraphNode {
            id: row.get(0).map_err(map)?,
            x: row.get::<Option<f64>>(1).map_err(map)?.unwrap_or(0.0),
            y: row.get::<Option<f64>>(2).map_err(map)?.unwrap_or(0.0),
            label: row.get(3).map_err(map)?,
            node_type: row
                .get::<Option<String>>(4)
                .map_err(map)?
                .unwrap_or_else(|| NODE_TYPE_PLANET.to_string()),
            color: row
                .get::<Option<String>>(5)
                .map_err(map)?
                .unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string()),
            icon: row
                .get::<Option<String>>(6)
                .map_err(map)?
                .unwrap_or_else(|| NODE_ICON_CIRCLE.to_string()),
            description: row.get(7).map_err(map)?,
            linked_note_id: row.get(8).map_err(map)?,
            created_at: row.get(9).map_err(map)?,
        })
    }

    fn row_to_link(row: &Row) -> Result<GraphLink, DatabaseError> {
        let map = |e: libsql::Error| DatabaseError::row_mapping("link", e);

        Ok(GraphLink {
            id: row.get(0).map_err(map)?,
            source: row.get(1).map_err(map)?,
            target: row.get(2).map_err(map)?,
            link_type: row
                .get::<Option<String>>(3)
                .map_err(map)?
                .unwrap_or_else(|| LINK_TYPE_SOLID.to_string()),
            created_at: row.get(4).map_err(map)?,
        })
    }

    async fn insert_node_on(
        conn: &libsql::Connection,
        node: &NewGraphNode,
    ) -> Result<(), DatabaseError> {
        conn.execute(
            INSERT_NODE_SQL,
            libsql::params![
                node.id.as_str(),
                node.x,
                node.y,
                node.label.as_str(),
                NODE_TYPE_PLANET,
                node.color.as_str(),
                NODE_ICON_CIRCLE,
                node.description.as_deref(),
                node.linked_note_id.as_deref()
            ],
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert node: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl GraphStore for LibsqlStore {
    async fn unlinked_notes(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Note>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes n
             WHERE n.user_id = ?
               AND NOT EXISTS (SELECT 1 FROM nodes node WHERE node.linked_note_id = n.id)
             ORDER BY n.timestamp DESC
             LIMIT ?"
        );
        self.db
            .query_all(&sql, (user_id, limit as i64), Self::row_to_note)
            .await
    }

    async fn notes_for_user(&self, user_id: &str) -> Result<Vec<Note>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes n WHERE n.user_id = ? ORDER BY n.timestamp DESC"
        );
        self.db.query_all(&sql, [user_id], Self::row_to_note).await
    }

    async fn count_notes(&self, user_id: &str) -> Result<u64, DatabaseError> {
        let count = self
            .db
            .query_one("SELECT COUNT(*) FROM notes WHERE user_id = ?", [user_id], |row| {
                Ok(row.get::<i64>(0)?)
            })
            .await?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }

    async fn note_tags(&self, note_id: &str) -> Result<Vec<String>, DatabaseError> {
        self.db
            .query_all(
                "SELECT t.name FROM tags t
                 JOIN note_tags nt ON t.id = nt.tag_id
                 WHERE nt.note_id = ?",
                [note_id],
                |row| Ok(row.get::<String>(0)?),
            )
            .await
    }

    async fn get_note(&self, id: &str) -> Result<Option<Note>, DatabaseError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes n WHERE n.id = ?");
        self.db.query_one(&sql, [id], Self::row_to_note).await
    }

    async fn find_note_by_title(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Note>, DatabaseError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes n WHERE n.title = ? AND n.user_id = ?");
        self.db
            .query_one(&sql, (title, user_id), Self::row_to_note)
            .await
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let tx = conn.transaction().await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to begin note insert: {}", e))
        })?;

        let timestamp = note.timestamp_rfc3339();
        let snippet = note.resolved_snippet();
        let published = i64::from(note.published);

        tx.execute(
            "INSERT INTO notes (id, user_id, title, category, snippet, content, published, color, timestamp, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                note.id.as_str(),
                note.user_id.as_str(),
                note.title.as_str(),
                note.category.as_str(),
                snippet.as_str(),
                note.content.as_str(),
                published,
                note.color.as_deref(),
                timestamp.as_str(),
                timestamp.as_str()
            ],
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert note: {}", e)))?;

        for tag in &note.tags {
            let name = tag.trim();
            if name.is_empty() {
                continue;
            }

            tx.execute(
                "INSERT OR IGNORE INTO tags (id, name) VALUES (?, ?)",
                (Uuid::new_v4().to_string(), name),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert tag: {}", e)))?;

            tx.execute(
                "INSERT OR IGNORE INTO note_tags (note_id, tag_id)
                 SELECT ?, id FROM tags WHERE name = ?",
                (note.id.as_str(), name),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to attach tag '{}': {}", name, e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to commit note insert: {}", e))
        })?;

        self.get_note(&note.id).await?.ok_or_else(|| {
            DatabaseError::sql_execution(format!("Note {} vanished after insert", note.id))
        })
    }

    async fn insert_node(&self, node: NewGraphNode) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        Self::insert_node_on(&conn, &node).await
    }

    async fn apply_graph_batch(
        &self,
        nodes: Vec<NewGraphNode>,
        links: Vec<NewGraphLink>,
        replace_existing: bool,
    ) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let tx = conn.transaction().await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to begin graph batch: {}", e))
        })?;

        if replace_existing {
            let links_removed = tx.execute("DELETE FROM links", ()).await.map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to clear links: {}", e))
            })?;
            let nodes_removed = tx.execute("DELETE FROM nodes", ()).await.map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to clear nodes: {}", e))
            })?;
            tracing::debug!(
                "Cleared {} nodes and {} links before regeneration",
                nodes_removed,
                links_removed
            );
        }

        for node in &nodes {
            Self::insert_node_on(&tx, node).await?;
        }

        for link in &links {
            tx.execute(
                INSERT_LINK_SQL,
                (
                    link.id.as_str(),
                    link.source.as_str(),
                    link.target.as_str(),
                    LINK_TYPE_SOLID,
                ),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert link: {}", e)))?;
        }

        tx.commit().await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to commit graph batch: {}", e))
        })
    }

    async fn list_nodes(&self) -> Result<Vec<GraphNode>, DatabaseError> {
        let sql = format!("SELECT {NODE_COLUMNS} FROM nodes ORDER BY created_at, rowid");
        self.db.query_all(&sql, (), Self::row_to_node).await
    }

    async fn list_links(&self) -> Result<Vec<GraphLink>, DatabaseError> {
        self.db
            .query_all(
                "SELECT id, source, target, type, created_at FROM links ORDER BY created_at, rowid",
                (),
                Self::row_to_link,
            )
            .await
    }

    async fn orphan_nodes(&self) -> Result<Vec<GraphNode>, DatabaseError> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM nodes
             WHERE linked_note_id IS NULL OR linked_note_id = ''
             ORDER BY label"
        );
        self.db.query_all(&sql, (), Self::row_to_node).await
    }

    async fn nodes_linked_to(&self, note_id: &str) -> Result<Vec<GraphNode>, DatabaseError> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE linked_note_id = ? ORDER BY created_at, rowid"
        );
        self.db.query_all(&sql, [note_id], Self::row_to_node).await
    }

    async fn flush(&self) -> Result<(), DatabaseError> {
        self.db.flush().await
    }
}
