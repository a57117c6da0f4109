//! # Pipeline Module
//!
//! Orchestrates a full run.
//!
//! ## Pipeline Stages
//! 1. **Enumerate** - one thread walks the source and fills a bounded path queue
//! 2. **Scan** - W workers stat each path and recover creation times
//! 3. **Reduce** - a single consumer folds records into survivors
//! 4. **Copy** - survivors are copied with their own concurrency bound
//!
//! ## Backpressure
//! The walker blocks when the path queue is full and workers block when
//! the results queue is full, so memory stays bounded by the two queue
//! capacities. Each queue closes once all of its producers have exited.

mod config;
mod context;
mod executor;
mod workers;

pub use config::{
    default_workers, parse_list, RunConfig, DEFAULT_COPY_CONCURRENCY, DEFAULT_EXCLUDE_PATTERNS,
    DEFAULT_IMAGE_EXTENSIONS, DEFAULT_PATH_QUEUE_CAPACITY, DEFAULT_RESULT_QUEUE_CAPACITY,
    DEFAULT_VIDEO_EXTENSIONS,
};
pub use context::{CounterSnapshot, RunContext, RunCounters};
pub use executor::{Pipeline, PipelineBuilder, PipelineResult};
pub use workers::WorkerPool;
