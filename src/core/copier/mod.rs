//! # Copier Module
//!
//! Materializes survivors into the destination directory.
//!
//! Copies run on a dedicated rayon pool sized by the copy concurrency,
//! independent of the scan worker count. A failed copy is counted and
//! reported, and every other copy carries on. The stage returns only
//! after every copy has finished.

use crate::core::dedup::SurvivorMap;
use crate::core::metadata::FileRecord;
use crate::core::pipeline::{RunConfig, RunContext};
use crate::error::{ConfigError, CopyError, MediaDedupError};
use crate::events::{CopyEvent, Event, StageProgress};
use filetime::FileTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// How survivors are laid out under the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationLayout {
    /// dest/<path relative to source root>
    #[default]
    PreserveTree,
    /// dest/<base name>
    Flatten,
}

/// Outcome of the copy stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyReport {
    pub total: u64,
    pub copied: u64,
    pub failed: u64,
    /// Most copies that were ever in flight at once
    pub peak_concurrency: u64,
}

/// Counts copies in flight and remembers the highest count
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicU64,
    peak: AtomicU64,
}

impl InFlight {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }

    fn peak(&self) -> u64 {
        self.peak.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Copies survivors with bounded concurrency
#[derive(Debug, Clone)]
pub struct CopyStage {
    destination: PathBuf,
    layout: DestinationLayout,
    concurrency: usize,
    restore_times: bool,
}

impl CopyStage {
    pub fn new(destination: impl Into<PathBuf>, layout: DestinationLayout, concurrency: usize) -> Self {
        Self {
            destination: destination.into(),
            layout,
            concurrency,
            restore_times: false,
        }
    }

    /// Build the stage described by a run configuration
    pub fn from_config(config: &RunConfig) -> Self {
        let layout = if config.flatten {
            DestinationLayout::Flatten
        } else {
            DestinationLayout::PreserveTree
        };
        Self::new(&config.destination, layout, config.copy_concurrency)
            .restore_times(config.check_metadata)
    }

    /// Set copied files' access and modification times to their creation time
    pub fn restore_times(mut self, restore: bool) -> Self {
        self.restore_times = restore;
        self
    }

    /// Where a survivor ends up
    pub fn destination_for(&self, record: &FileRecord) -> PathBuf {
        match self.layout {
            DestinationLayout::PreserveTree => self.destination.join(&record.relative_path),
            DestinationLayout::Flatten => match record.path.file_name() {
                Some(name) => self.destination.join(name),
                None => self.destination.join(&record.relative_path),
            },
        }
    }

    /// Copy every survivor.
    ///
    /// Fails only if the destination root cannot be created or the copy
    /// pool cannot be built; per-file failures are counted in `ctx`.
    pub fn run(&self, survivors: &SurvivorMap, ctx: &RunContext) -> Result<CopyReport, MediaDedupError> {
        fs::create_dir_all(&self.destination).map_err(|source| CopyError::CreateDestination {
            path: self.destination.clone(),
            source,
        })?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|i| format!("copy-{}", i))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;

        let records: Vec<&FileRecord> = survivors.records().collect();
        let total = records.len() as u64;
        let before = ctx.counters.snapshot();

        ctx.events.send(Event::Copy(CopyEvent::Started {
            total: records.len(),
        }));
        tracing::info!(
            "copying {} files to {} with {} threads",
            total,
            self.destination.display(),
            self.concurrency
        );

        let in_flight = InFlight::default();
        pool.install(|| {
            records.par_iter().for_each(|record| {
                let copied = {
                    let _slot = in_flight.enter();
                    self.copy_one(record)
                };
                match copied {
                    Ok(_) => {
                        let current = ctx.counters.record_copied();
                        ctx.events.send(Event::Copy(CopyEvent::Progress(StageProgress {
                            current,
                            total,
                            current_path: record.path.clone(),
                        })));
                    }
                    Err(e) => ctx.report_copy_error(&record.path, &e),
                }
            });
        });

        let after = ctx.counters.snapshot();
        let report = CopyReport {
            total,
            copied: after.copied - before.copied,
            failed: after.failed_copy - before.failed_copy,
            peak_concurrency: in_flight.peak(),
        };

        ctx.events.send(Event::Copy(CopyEvent::Completed {
            copied: report.copied,
            failed: report.failed,
        }));

        Ok(report)
    }

    /// Copy one survivor, returning where it was written
    fn copy_one(&self, record: &FileRecord) -> Result<PathBuf, CopyError> {
        let mut source = File::open(&record.path).map_err(|source| CopyError::Open {
            path: record.path.clone(),
            source,
        })?;

        let dest = self.destination_for(record);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| CopyError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut target = File::create(&dest).map_err(|source| CopyError::Create {
            path: dest.clone(),
            source,
        })?;

        io::copy(&mut source, &mut target).map_err(|source| CopyError::Copy {
            path: record.path.clone(),
            source,
        })?;
        drop(target);

        if self.restore_times {
            if let Some(created) = record.creation_time {
                restore_time(&dest, created);
            }
        }

        Ok(dest)
    }
}

/// Best effort; a file whose times cannot be set is still a successful copy
fn restore_time(path: &Path, created: chrono::NaiveDateTime) {
    let utc = created.and_utc();
    let time = FileTime::from_unix_time(utc.timestamp(), utc.timestamp_subsec_nanos());
    if let Err(e) = filetime::set_file_times(path, time, time) {
        tracing::debug!("could not set times on {}: {}", path.display(), e);
    }
}
