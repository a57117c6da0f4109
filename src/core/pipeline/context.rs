//! Per-run shared state: counters and the progress sink.

use crate::error::{CopyError, ScanError};
use crate::events::{CopyEvent, Event, EventSender, ScanEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters, safe to bump from any stage
#[derive(Debug, Default)]
pub struct RunCounters {
    discovered: AtomicU64,
    processed: AtomicU64,
    unique: AtomicU64,
    copied: AtomicU64,
    failed_scan: AtomicU64,
    failed_copy: AtomicU64,
}

/// Point-in-time copy of [`RunCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub discovered: u64,
    pub processed: u64,
    pub unique: u64,
    pub copied: u64,
    pub failed_scan: u64,
    pub failed_copy: u64,
}

impl RunCounters {
    /// Returns the new count
    pub fn record_discovered(&self) -> u64 {
        self.discovered.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the new count
    pub fn record_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the new count
    pub fn record_copied(&self) -> u64 {
        self.copied.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_scan_failure(&self) -> u64 {
        self.failed_scan.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_copy_failure(&self) -> u64 {
        self.failed_copy.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record the size of the final survivor map
    pub fn record_unique(&self, unique: u64) {
        self.unique.fetch_add(unique, Ordering::Relaxed);
    }

    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            discovered: self.discovered.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            unique: self.unique.load(Ordering::Relaxed),
            copied: self.copied.load(Ordering::Relaxed),
            failed_scan: self.failed_scan.load(Ordering::Relaxed),
            failed_copy: self.failed_copy.load(Ordering::Relaxed),
        }
    }
}

/// Everything a stage shares with its siblings during one run
pub struct RunContext {
    pub counters: RunCounters,
    pub events: EventSender,
}

impl RunContext {
    pub fn new(events: EventSender) -> Self {
        Self {
            counters: RunCounters::default(),
            events,
        }
    }

    /// Count a scan failure and surface it
    pub fn report_scan_error(&self, error: &ScanError) {
        self.counters.record_scan_failure();
        tracing::warn!("{}", error);
        self.events.send(Event::Scan(ScanEvent::Error {
            path: error.path().clone(),
            message: error.to_string(),
        }));
    }

    /// Count a copy failure and surface it
    pub fn report_copy_error(&self, source: &Path, error: &CopyError) {
        self.counters.record_copy_failure();
        tracing::warn!("{}", error);
        self.events.send(Event::Copy(CopyEvent::Error {
            path: source.to_path_buf(),
            message: error.to_string(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counters_are_exact_under_contention() {
        let counters = Arc::new(RunCounters::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counters = Arc::clone(&counters);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        counters.record_processed();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters.snapshot().processed, 8000);
    }

    #[test]
    fn scan_errors_are_counted_and_emitted() {
        let (sender, receiver) = EventChannel::new();
        let ctx = RunContext::new(sender);

        ctx.report_scan_error(&ScanError::NotAFile {
            path: PathBuf::from("/src/odd.jpg"),
        });

        assert_eq!(ctx.counters.snapshot().failed_scan, 1);
        match receiver.try_recv() {
            Some(Event::Scan(ScanEvent::Error { path, .. })) => {
                assert_eq!(path, PathBuf::from("/src/odd.jpg"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn separate_runs_do_not_share_counters() {
        let first = RunContext::new(crate::events::null_sender());
        let second = RunContext::new(crate::events::null_sender());
        first.counters.record_copied();
        assert_eq!(second.counters.snapshot().copied, 0);
    }
}
