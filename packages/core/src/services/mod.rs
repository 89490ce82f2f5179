//! Business Services
//!
//! This module contains the graph pipeline services:
//!
//! - `GraphSynthesisService` - Turns notes into galaxy nodes and links
//! - `AutoGraphProcessor` - Background timer driving the synthesis service
//! - `CliReasoningClient` - External reasoning tool invoked as a child process
//! - `NoteMatcher` - Strategy associating generated nodes with notes
//! - `seed` - Development sample data
//! - `mock` - Deterministic `ReasoningClient` for tests
//!
//! Services coordinate between the database layer and the reasoning tool,
//! implementing the synthesis rules and the run exclusion.

pub mod auto_graph_config;
pub mod auto_graph_processor;
pub mod error;
pub mod graph_synthesis;
pub mod mock;
pub mod note_matcher;
pub mod output_parser;
pub mod prompt;
pub mod reasoning_client;
pub mod seed;

pub use auto_graph_config::{AutoGraphConfig, RetentionPolicy};
pub use auto_graph_processor::AutoGraphProcessor;
pub use error::{ReasoningError, SynthesisError};
pub use graph_synthesis::{GenerationSummary, GraphSynthesisService, TickOutcome};
pub use note_matcher::{NoteMatcher, PrefixNoteMatcher};
pub use output_parser::parse_reasoning_output;
pub use prompt::knowledge_graph_prompt;
pub use reasoning_client::{
    CliReasoningClient, ReasoningClient, ReasoningCommand, ReasoningOptions, ReasoningToolStatus,
};
pub use seed::seed_development_data;
