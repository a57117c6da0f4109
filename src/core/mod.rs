//! # Core Module
//!
//! The UI-agnostic media deduplication engine.
//!
//! ## Modules
//! - `scanner` - Enumerates candidate media under a source root
//! - `metadata` - Builds file records and recovers creation times
//! - `dedup` - Reduces records to one survivor per base name
//! - `copier` - Copies survivors into the destination
//! - `pipeline` - Orchestrates the full workflow
//! - `reporter` - Renders the final summary

pub mod copier;
pub mod dedup;
pub mod metadata;
pub mod pipeline;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use copier::{CopyReport, CopyStage, DestinationLayout};
pub use dedup::{AggregateStats, DedupReducer, SurvivorMap};
pub use metadata::FileRecord;
pub use pipeline::{Pipeline, PipelineResult, RunConfig};
pub use reporter::format_bytes;
pub use scanner::MediaKind;
