//! Pipeline execution implementation.

use super::config::RunConfig;
use super::context::RunContext;
use super::workers::WorkerPool;
use crate::core::copier::{CopyReport, CopyStage};
use crate::core::dedup::{AggregateStats, DedupReducer, Reduction, SurvivorMap};
use crate::core::metadata::{ExifSourceFactory, MetadataExtractor, MetadataSourceFactory};
use crate::core::scanner::PathEnumerator;
use crate::error::MediaDedupError;
use crate::events::{
    null_sender, DedupEvent, Event, EventSender, PipelineEvent, PipelinePhase, RunSummary,
    ScanEvent,
};
use crossbeam_channel::{bounded, Sender};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// One survivor per duplicate group
    pub survivors: SurvivorMap,
    /// Totals over the reduced records
    pub stats: AggregateStats,
    /// Copy outcome (None in plan-only runs)
    pub copy: Option<CopyReport>,
    /// Counters and totals for display
    pub summary: RunSummary,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: RunConfig,
    metadata: Option<Box<dyn MetadataSourceFactory>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            metadata: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.source = source.into();
        self
    }

    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.config.destination = destination.into();
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn copy_concurrency(mut self, copy_concurrency: usize) -> Self {
        self.config.copy_concurrency = copy_concurrency;
        self
    }

    pub fn image_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.image_extensions = extensions;
        self
    }

    pub fn video_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.video_extensions = extensions;
        self
    }

    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_patterns = patterns;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    pub fn check_metadata(mut self, check: bool) -> Self {
        self.config.check_metadata = check;
        self
    }

    pub fn dedup(mut self, dedup: bool) -> Self {
        self.config.dedup = dedup;
        self
    }

    pub fn plan_only(mut self, plan_only: bool) -> Self {
        self.config.plan_only = plan_only;
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.config.flatten = flatten;
        self
    }

    /// Set how per-worker metadata sources are created
    pub fn metadata_source(mut self, factory: Box<dyn MetadataSourceFactory>) -> Self {
        self.metadata = Some(factory);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            metadata: self.metadata.unwrap_or_else(|| Box::new(ExifSourceFactory)),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The scan, reduce and copy pipeline
pub struct Pipeline {
    config: RunConfig,
    metadata: Box<dyn MetadataSourceFactory>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, MediaDedupError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, MediaDedupError> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.execute(events);
        if let Err(ref e) = result {
            tracing::error!("run aborted: {}", e);
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<PipelineResult, MediaDedupError> {
        let start_time = Instant::now();

        self.config.validate()?;
        let root = self.config.source_root()?;
        let filter = self.config.filter();
        let ctx = RunContext::new(events.clone());

        let extractor = MetadataExtractor::new(&root, filter.clone(), self.config.check_metadata);
        let pool = WorkerPool::new(extractor, self.config.workers, &*self.metadata)?;
        let enumerator = PathEnumerator::new(&root, self.config.recursive, filter);

        // Phase 1: Scanning, reduced as records arrive
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));
        events.send(Event::Scan(ScanEvent::Started { root: root.clone() }));
        tracing::info!(
            "scanning {} with {} workers",
            root.display(),
            pool.len()
        );

        let reduction = self.scan_and_reduce(&enumerator, pool, &ctx);

        let counts = ctx.counters.snapshot();
        events.send(Event::Scan(ScanEvent::Completed {
            processed: counts.processed,
            failed: counts.failed_scan,
        }));

        // Phase 2: The survivor map is final from here on
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Resolved,
        }));
        ctx.counters.record_unique(reduction.survivors.len() as u64);
        events.send(Event::Dedup(DedupEvent::Completed {
            groups: reduction.survivors.len(),
            duplicates: reduction.stats.duplicates(),
        }));

        // Phase 3: Copying
        let copy = if self.config.plan_only {
            None
        } else {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Copying,
            }));
            Some(CopyStage::from_config(&self.config).run(&reduction.survivors, &ctx)?)
        };

        let counts = ctx.counters.snapshot();
        let summary = RunSummary {
            processed: counts.processed,
            unique: counts.unique,
            duplicates: reduction.stats.duplicates(),
            copied: copy.map(|_| counts.copied),
            failed_scan: counts.failed_scan,
            failed_copy: counts.failed_copy,
            stats: reduction.stats,
            workers: self.config.workers,
            copy_concurrency: self.config.copy_concurrency,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(PipelineResult {
            survivors: reduction.survivors,
            stats: reduction.stats,
            copy,
            summary,
        })
    }

    /// Walker -> path queue -> workers -> results queue -> reducer.
    ///
    /// Returns once the walker and every worker have exited and the
    /// results queue is drained.
    fn scan_and_reduce(
        &self,
        enumerator: &PathEnumerator,
        pool: WorkerPool,
        ctx: &RunContext,
    ) -> Reduction {
        let (path_tx, path_rx) = bounded(self.config.path_queue_capacity);
        let (result_tx, result_rx) = bounded(self.config.result_queue_capacity);

        thread::scope(|scope| {
            scope.spawn(move || enumerate(enumerator, path_tx, ctx));
            pool.spawn(scope, path_rx, result_tx, ctx);
            DedupReducer::new(self.config.dedup).consume(&result_rx)
        })
    }
}

/// Feed the path queue, closing it when the walk ends
fn enumerate(enumerator: &PathEnumerator, paths: Sender<PathBuf>, ctx: &RunContext) {
    let walk = match enumerator.paths() {
        Ok(walk) => walk,
        Err(e) => {
            ctx.report_scan_error(&e);
            return;
        }
    };

    for path in walk {
        ctx.counters.record_discovered();
        if paths.send(path).is_err() {
            break;
        }
    }

    tracing::debug!("walk finished, {} paths", ctx.counters.discovered());
}
