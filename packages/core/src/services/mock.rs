//! Mock reasoning client for deterministic testing.
//!
//! Returns canned `GraphSuggestions` (or a canned failure) without spawning a
//! process, records every prompt it receives, and can optionally hold each
//! invocation until released so tests can observe a run in progress.
//!
//! ## Usage
//!
//! ```rust
//! use vicoo_core::models::{GraphSuggestions, NodeSuggestion};
//! use vicoo_core::services::mock::MockReasoningClient;
//! use vicoo_core::services::{ReasoningClient, ReasoningOptions};
//!
//! # tokio_test::block_on(async {
//! let client = MockReasoningClient::new().with_suggestions(GraphSuggestions {
//!     nodes: vec![NodeSuggestion {
//!         label: "React".to_string(),
//!         description: "UI library".to_string(),
//!         color: "#06D6A0".to_string(),
//!     }],
//!     links: vec![],
//! });
//!
//! let result = client.invoke("prompt", &ReasoningOptions::default()).await.unwrap();
//! assert_eq!(result.nodes.len(), 1);
//! assert_eq!(client.call_count(), 1);
//! # });
//! ```

use crate::models::GraphSuggestions;
use crate::services::error::ReasoningError;
use crate::services::reasoning_client::{ReasoningClient, ReasoningOptions};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Canned failure returned instead of suggestions
#[derive(Debug, Clone)]
pub enum MockFailure {
    Timeout,
    ToolFailed(String),
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    suggestions: GraphSuggestions,
    failure: Option<MockFailure>,
}

/// A recorded invocation
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub timeout: Duration,
    pub timestamp: std::time::Instant,
}

/// Mock `ReasoningClient` for tests.
#[derive(Clone, Default)]
pub struct MockReasoningClient {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockReasoningClient {
    /// Create a mock that returns empty suggestions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `suggestions` from every invocation.
    pub fn with_suggestions(mut self, suggestions: GraphSuggestions) -> Self {
        Arc::make_mut(&mut self.config).suggestions = suggestions;
        self
    }

    /// Fail every invocation.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self
    }

    /// Hold every invocation until `release` is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held invocation (current or future) complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Number of invocations received so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Copy of the call log.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningClient for MockReasoningClient {
    async fn invoke(
        &self,
        prompt: &str,
        options: &ReasoningOptions,
    ) -> Result<GraphSuggestions, ReasoningError> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(MockCall {
                prompt: prompt.to_string(),
                timeout: options.timeout,
                timestamp: std::time::Instant::now(),
            });
        }

        if let Some(gate) = &self.gate {
            // A closed semaphore means the test is done with this client
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match &self.config.failure {
            Some(MockFailure::Timeout) => Err(ReasoningError::timeout(options.timeout)),
            Some(MockFailure::ToolFailed(stderr)) => {
                Err(ReasoningError::tool_failed(Some(1), stderr.clone()))
            }
            None => Ok(self.config.suggestions.clone()),
        }
    }
}
