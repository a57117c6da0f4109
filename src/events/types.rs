//! Event type definitions for progress reporting.

use crate::core::dedup::AggregateStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the deduplication pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Reduction phase events
    Dedup(DedupEvent),
    /// Copy phase events
    Copy(CopyEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
    /// Low-priority diagnostics that never affect the outcome
    Diagnostic(DiagnosticEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A file was scanned
    Progress(StageProgress),
    /// A path failed to scan but scanning continues
    Error { path: PathBuf, message: String },
    /// All workers have exited
    Completed { processed: u64, failed: u64 },
}

/// Events during the reduction phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DedupEvent {
    /// The survivor map is final
    Completed { groups: usize, duplicates: u64 },
}

/// Events during the copy phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CopyEvent {
    /// Copying has started
    Started { total: usize },
    /// A survivor was copied
    Progress(StageProgress),
    /// A survivor failed to copy but copying continues
    Error { path: PathBuf, message: String },
    /// Every launched copy has finished
    Completed { copied: u64, failed: u64 },
}

/// Diagnostics that are informational only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiagnosticEvent {
    /// The metadata source could not produce a creation time
    MetadataUnavailable { path: PathBuf, message: String },
}

/// Progress within a single stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProgress {
    /// Items finished so far
    pub current: u64,
    /// Items known so far (grows while the source is still being walked)
    pub total: u64,
    /// Item that was just finished
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed
    Completed { summary: RunSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    /// Walking, scanning and reducing, all concurrently
    Scanning,
    /// Every record is reduced and the survivor map is final
    Resolved,
    Copying,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files scanned successfully
    pub processed: u64,
    /// Survivors after reduction
    pub unique: u64,
    /// Files that lost to a survivor
    pub duplicates: u64,
    /// Survivors copied (None in plan-only runs)
    pub copied: Option<u64>,
    /// Paths that failed to scan
    pub failed_scan: u64,
    /// Survivors that failed to copy
    pub failed_copy: u64,
    /// Size and type totals
    pub stats: AggregateStats,
    /// Scan worker count
    pub workers: usize,
    /// Copy concurrency bound
    pub copy_concurrency: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Total failures across both categories
    pub fn failed(&self) -> u64 {
        self.failed_scan + self.failed_copy
    }

    /// Whether the copy stage was skipped
    pub fn is_plan_only(&self) -> bool {
        self.copied.is_none()
    }
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning and resolving duplicates..."),
            PipelinePhase::Resolved => write!(f, "Duplicates resolved"),
            PipelinePhase::Copying => write!(f, "Copying files..."),
        }
    }
}
