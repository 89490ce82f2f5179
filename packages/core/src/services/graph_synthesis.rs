//! Graph Synthesis Service
//!
//! Turns notes into galaxy graph nodes and links. Each tick looks at the
//! configured user's unlinked notes and picks one of two paths:
//!
//! - **Full Regeneration** (at least `min_notes_to_generate` unlinked notes):
//!   every note of the user is sent to the reasoning tool in one prompt, and
//!   the suggested nodes and links are written in a single transaction
//! - **Incremental Stub Creation** (fewer unlinked notes, but some): one
//!   placeholder node per unlinked note, no reasoning call
//!
//! ## Run Exclusion
//!
//! At most one run is in flight. The in-progress flag is an `AtomicBool`
//! claimed with compare-and-swap and released by a guard on every exit path.
//! A tick that finds the flag set is skipped, never queued.
//!
//! ## Error Boundary
//!
//! `tick()` never returns an error: storage and reasoning failures are logged
//! and reported as `TickOutcome::Failed`. Only the manual trigger surfaces
//! structured errors to its caller.

use crate::db::GraphStore;
use crate::models::{
    NewGraphLink, NewGraphNode, Note, TaggedNote, DEFAULT_NODE_COLOR, SNIPPET_LENGTH,
};
use crate::services::auto_graph_config::{AutoGraphConfig, RetentionPolicy};
use crate::services::error::SynthesisError;
use crate::services::note_matcher::{NoteMatcher, PrefixNoteMatcher};
use crate::services::prompt::{knowledge_graph_prompt, MAX_LABEL_CHARS};
use crate::services::reasoning_client::ReasoningClient;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Colors assigned to stub nodes, indexed by the note id's first character
pub const STUB_PALETTE: [&str; 6] = [
    "#FFD166", "#06D6A0", "#118AB2", "#EF476F", "#073B4C", "#8338EC",
];

/// Counts reported by a full regeneration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    /// Notes included in the prompt
    pub notes_processed: usize,
    pub nodes_created: usize,
    pub links_created: usize,
    /// Suggested links whose source or target label was not a suggested node
    pub links_dropped: usize,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another run held the in-progress flag
    Skipped,
    /// No unlinked notes
    NothingToDo,
    Stubbed { nodes_created: usize },
    Regenerated(GenerationSummary),
    /// The run failed; the error was logged
    Failed(String),
}

/// Releases the in-progress flag when dropped
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Graph synthesis job for one user scope
///
/// Constructed once per process and shared behind an `Arc` by the
/// background processor and the manual trigger.
pub struct GraphSynthesisService {
    store: Arc<dyn GraphStore>,
    client: Arc<dyn ReasoningClient>,
    matcher: Arc<dyn NoteMatcher>,
    config: AutoGraphConfig,
    running: AtomicBool,
}

impl GraphSynthesisService {
    /// Create a service using the default prefix note matcher
    pub fn new(
        store: Arc<dyn GraphStore>,
        client: Arc<dyn ReasoningClient>,
        config: AutoGraphConfig,
    ) -> Self {
        Self {
            store,
            client,
            matcher: Arc::new(PrefixNoteMatcher),
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Replace the node-to-note matching strategy
    pub fn with_matcher(mut self, matcher: Arc<dyn NoteMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn config(&self) -> &AutoGraphConfig {
        &self.config
    }

    /// True while a tick or manual trigger is in flight
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                running: &self.running,
            })
    }

    /// Run one scheduled synthesis pass
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = self.try_begin() else {
            tracing::info!("Previous graph synthesis run still in progress, skipping");
            return TickOutcome::Skipped;
        };

        match self.run_tick().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Graph synthesis tick failed: {}", e);
                TickOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run_tick(&self) -> Result<TickOutcome, SynthesisError> {
        let unlinked = self
            .store
            .unlinked_notes(&self.config.user_id, self.config.batch_size)
            .await?;
        tracing::info!(
            "Found {} unlinked notes for user {}",
            unlinked.len(),
            self.config.user_id
        );

        if unlinked.len() >= self.config.min_notes_to_generate {
            let summary = self.full_regeneration().await?;
            if summary.nodes_created > 0 {
                tracing::info!(
                    "Auto-generated graph: {} nodes, {} links",
                    summary.nodes_created,
                    summary.links_created
                );
            }
            Ok(TickOutcome::Regenerated(summary))
        } else if !unlinked.is_empty() {
            tracing::info!(
                "{} unlinked notes below threshold {}, creating stub nodes",
                unlinked.len(),
                self.config.min_notes_to_generate
            );
            let nodes_created = self.create_stub_nodes(&unlinked).await?;
            Ok(TickOutcome::Stubbed { nodes_created })
        } else {
            Ok(TickOutcome::NothingToDo)
        }
    }

    /// Run a full regeneration on demand
    ///
    /// # Errors
    ///
    /// - `SynthesisError::AlreadyRunning` - a run is in flight
    /// - `SynthesisError::InsufficientNotes` - fewer unlinked notes than the threshold
    /// - `SynthesisError::Database` / `Reasoning` - the run itself failed
    pub async fn trigger_graph_generation(&self) -> Result<GenerationSummary, SynthesisError> {
        let _guard = self.try_begin().ok_or(SynthesisError::AlreadyRunning)?;

        let unlinked = self
            .store
            .unlinked_notes(&self.config.user_id, self.config.batch_size)
            .await?;
        if unlinked.len() < self.config.min_notes_to_generate {
            return Err(SynthesisError::insufficient_notes(
                unlinked.len(),
                self.config.min_notes_to_generate,
            ));
        }

        self.full_regeneration().await
    }

    async fn full_regeneration(&self) -> Result<GenerationSummary, SynthesisError> {
        let notes = self.store.notes_for_user(&self.config.user_id).await?;
        if notes.len() < self.config.min_notes_to_generate {
            tracing::info!(
                "Not enough notes ({}) to generate graph, need at least {}",
                notes.len(),
                self.config.min_notes_to_generate
            );
            return Ok(GenerationSummary::default());
        }

        tracing::info!("Starting full graph generation from {} notes", notes.len());

        let mut tagged = Vec::with_capacity(notes.len());
        for note in &notes {
            let tags = self.store.note_tags(&note.id).await?;
            tagged.push(TaggedNote::new(note.clone(), tags));
        }

        let prompt = knowledge_graph_prompt(&tagged);
        let suggestions = self
            .client
            .invoke(&prompt, &self.config.reasoning_options())
            .await?;

        let mut summary = GenerationSummary {
            notes_processed: notes.len(),
            ..Default::default()
        };

        if suggestions.nodes.is_empty() {
            tracing::info!("Reasoning tool returned no nodes");
            return Ok(summary);
        }

        let mut label_ids: HashMap<String, String> = HashMap::new();
        let mut nodes = Vec::with_capacity(suggestions.nodes.len());

        for suggestion in suggestions.nodes {
            if suggestion.label.trim().is_empty() {
                tracing::debug!("Skipping suggested node without a label");
                continue;
            }

            let color = if suggestion.color.trim().is_empty() {
                DEFAULT_NODE_COLOR.to_string()
            } else {
                suggestion.color
            };
            let linked_note_id = self
                .matcher
                .match_note(&suggestion.label, &notes)
                .map(|note| note.id.clone());

            let mut node =
                NewGraphNode::new(suggestion.label.clone(), color).linked_to(linked_note_id);
            if !suggestion.description.is_empty() {
                node = node.with_description(suggestion.description);
            }

            // Later duplicates of a label win the link resolution
            label_ids.insert(suggestion.label, node.id.clone());
            nodes.push(node);
        }

        let mut links = Vec::with_capacity(suggestions.links.len());
        for link in suggestions.links {
            match (label_ids.get(&link.source), label_ids.get(&link.target)) {
                (Some(source), Some(target)) => links.push(NewGraphLink::new(source, target)),
                _ => {
                    tracing::debug!(
                        "Dropping link '{}' -> '{}': unknown label",
                        link.source,
                        link.target
                    );
                    summary.links_dropped += 1;
                }
            }
        }

        summary.nodes_created = nodes.len();
        summary.links_created = links.len();

        let replace = self.config.retention == RetentionPolicy::ReplaceOnRegenerate;
        self.store.apply_graph_batch(nodes, links, replace).await?;
        self.store.flush().await?;

        tracing::info!(
            "Generated {} nodes and {} links ({} links dropped)",
            summary.nodes_created,
            summary.links_created,
            summary.links_dropped
        );
        Ok(summary)
    }

    /// Insert one stub node per note that is still unlinked
    ///
    /// A note's link status is re-read right before its insert, so a note
    /// linked since the unlinked query ran is left alone. A failed insert is
    /// logged and the remaining notes are still processed.
    async fn create_stub_nodes(&self, notes: &[Note]) -> Result<usize, SynthesisError> {
        let mut created = 0;

        for note in notes {
            if !self.store.nodes_linked_to(&note.id).await?.is_empty() {
                tracing::debug!("Note {} already has a node, skipping stub", note.id);
                continue;
            }

            match self.store.insert_node(stub_node(note)).await {
                Ok(()) => {
                    tracing::debug!("Created stub node for note: {}", note.title);
                    created += 1;
                }
                Err(e) => tracing::warn!("Failed to create stub node for note {}: {}", note.id, e),
            }
        }

        self.store.flush().await?;
        tracing::info!("Created {} stub nodes", created);
        Ok(created)
    }
}

/// Placeholder node for a note, built without any reasoning call
pub fn stub_node(note: &Note) -> NewGraphNode {
    let label = match note.title.char_indices().nth(MAX_LABEL_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &note.title[..byte_idx]),
        None => note.title.clone(),
    };

    let description: String = note
        .content
        .chars()
        .take(SNIPPET_LENGTH)
        .filter(|c| !matches!(c, '#' | '*' | '`'))
        .collect();

    NewGraphNode::new(label, stub_color(&note.id))
        .with_description(description)
        .linked_to(Some(note.id.clone()))
}

fn stub_color(note_id: &str) -> &'static str {
    let code = note_id.chars().next().map(u32::from).unwrap_or(0);
    STUB_PALETTE[code as usize % STUB_PALETTE.len()]
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "graph_synthesis_test.rs"]
mod graph_synthesis_test;
