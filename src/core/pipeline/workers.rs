//! Fixed-size pool of scan workers.

use super::context::RunContext;
use crate::core::metadata::{
    FileRecord, MetadataExtractor, MetadataSource, MetadataSourceFactory, NoMetadata,
};
use crate::error::ConfigError;
use crate::events::{DiagnosticEvent, Event, ScanEvent, StageProgress};
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::thread::Scope;

/// W executors, each with its own metadata source
pub struct WorkerPool {
    extractor: MetadataExtractor,
    sources: Vec<Box<dyn MetadataSource>>,
}

impl WorkerPool {
    /// Create `workers` metadata sources up front.
    ///
    /// Sources are only created through the factory when the extractor
    /// checks metadata. Any creation failure aborts the run.
    pub fn new(
        extractor: MetadataExtractor,
        workers: usize,
        factory: &dyn MetadataSourceFactory,
    ) -> Result<Self, ConfigError> {
        let sources = (0..workers)
            .map(|worker| {
                if extractor.checks_metadata() {
                    factory
                        .create()
                        .map_err(|reason| ConfigError::WorkerInit { worker, reason })
                } else {
                    Ok(Box::new(NoMetadata) as Box<dyn MetadataSource>)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { extractor, sources })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Start every executor inside `scope`.
    ///
    /// Each executor holds a clone of `results`; the queue disconnects
    /// only once the last executor has exited, which is what tells the
    /// reducer that no more records will arrive.
    pub fn spawn<'scope, 'env>(
        self,
        scope: &'scope Scope<'scope, 'env>,
        paths: Receiver<PathBuf>,
        results: Sender<FileRecord>,
        ctx: &'env RunContext,
    ) {
        for (id, source) in self.sources.into_iter().enumerate() {
            let extractor = self.extractor.clone();
            let paths = paths.clone();
            let results = results.clone();

            scope.spawn(move || run_worker(id, &extractor, source, &paths, &results, ctx));
        }
    }
}

fn run_worker(
    id: usize,
    extractor: &MetadataExtractor,
    mut source: Box<dyn MetadataSource>,
    paths: &Receiver<PathBuf>,
    results: &Sender<FileRecord>,
    ctx: &RunContext,
) {
    tracing::debug!("scan worker {} started", id);

    for path in paths.iter() {
        let extracted = match extractor.extract(&path, source.as_mut()) {
            Ok(extracted) => extracted,
            Err(e) => {
                ctx.report_scan_error(&e);
                continue;
            }
        };

        if let Some(message) = extracted.diagnostic {
            ctx.events
                .send(Event::Diagnostic(DiagnosticEvent::MetadataUnavailable {
                    path: path.clone(),
                    message,
                }));
        }

        if results.send(extracted.record).is_err() {
            tracing::debug!("results queue closed, worker {} stopping", id);
            break;
        }

        let current = ctx.counters.record_processed();
        ctx.events.send(Event::Scan(ScanEvent::Progress(StageProgress {
            current,
            total: ctx.counters.discovered(),
            current_path: path,
        })));
    }

    tracing::debug!("scan worker {} finished", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{ExifSourceFactory, MetadataLookup};
    use crate::core::scanner::MediaFilter;
    use crate::events::null_sender;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    struct FailingFactory;

    impl MetadataSourceFactory for FailingFactory {
        fn create(&self) -> Result<Box<dyn MetadataSource>, String> {
            Err("no tool".to_string())
        }
    }

    /// Counts creations so tests can check one source per worker
    struct CountingFactory(Arc<AtomicUsize>);

    impl MetadataSourceFactory for CountingFactory {
        fn create(&self) -> Result<Box<dyn MetadataSource>, String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(NoMetadata))
        }
    }

    struct NeverCalled;

    impl MetadataSource for NeverCalled {
        fn lookup(&mut self, path: &Path) -> MetadataLookup {
            panic!("lookup called for {} with metadata checking off", path.display())
        }
    }

    fn extractor(root: &Path, check_metadata: bool) -> MetadataExtractor {
        MetadataExtractor::new(root, MediaFilter::new(&[".jpg"], &[], &[]), check_metadata)
    }

    fn run_pool(pool: WorkerPool, paths: Vec<PathBuf>, ctx: &RunContext) -> Vec<FileRecord> {
        let (path_tx, path_rx) = crossbeam_channel::bounded(2);
        let (result_tx, result_rx) = crossbeam_channel::bounded(2);

        thread::scope(|scope| {
            scope.spawn(move || {
                for path in paths {
                    path_tx.send(path).unwrap();
                }
            });
            pool.spawn(scope, path_rx, result_tx, ctx);
            result_rx.iter().collect()
        })
    }

    #[test]
    fn each_worker_gets_its_own_source() {
        let dir = TempDir::new().unwrap();
        let created = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(
            extractor(dir.path(), true),
            3,
            &CountingFactory(Arc::clone(&created)),
        )
        .unwrap();

        assert_eq!(pool.len(), 3);
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn factory_is_skipped_when_metadata_is_off() {
        let dir = TempDir::new().unwrap();
        let pool = WorkerPool::new(extractor(dir.path(), false), 2, &FailingFactory).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn factory_failure_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let error = WorkerPool::new(extractor(dir.path(), true), 2, &FailingFactory)
            .err()
            .unwrap();
        assert!(matches!(error, ConfigError::WorkerInit { worker: 0, .. }));
    }

    #[test]
    fn failed_paths_do_not_stop_the_pool() {
        let dir = TempDir::new().unwrap();
        let mut paths: Vec<PathBuf> = (0..9)
            .map(|i| {
                let path = dir.path().join(format!("img{}.jpg", i));
                fs::write(&path, b"jpeg").unwrap();
                path
            })
            .collect();
        paths.insert(4, dir.path().join("missing.jpg"));

        let ctx = RunContext::new(null_sender());
        let pool = WorkerPool::new(extractor(dir.path(), true), 4, &ExifSourceFactory).unwrap();
        let records = run_pool(pool, paths, &ctx);

        let counts = ctx.counters.snapshot();
        assert_eq!(records.len(), 9);
        assert_eq!(counts.processed, 9);
        assert_eq!(counts.failed_scan, 1);
    }

    #[test]
    fn never_called_source_is_unused_without_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"x").unwrap();

        let pool = WorkerPool {
            extractor: extractor(dir.path(), false),
            sources: vec![Box::new(NeverCalled)],
        };
        let ctx = RunContext::new(null_sender());
        let records = run_pool(pool, vec![path], &ctx);
        assert_eq!(records.len(), 1);
        assert!(!records[0].has_metadata());
    }
}
