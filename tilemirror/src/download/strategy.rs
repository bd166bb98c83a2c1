//! Dispatch strategies.
//!
//! Both strategies run the same fetch-and-write per job and produce the same
//! [`DownloadReport`]; they differ only in how jobs are scheduled.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::fetcher::TileFetcher;
use super::job::DownloadJob;
use super::progress::{
    ProgressCallback, ProgressCounters, ProgressReporter, DEFAULT_POLL_INTERVAL,
};
use super::queue::JoinableQueue;
use super::report::DownloadReport;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 10;

/// Strategy for running a list of download jobs.
pub trait DispatchStrategy: Send + Sync {
    /// Run every job to completion.
    ///
    /// # Arguments
    ///
    /// * `jobs` - Jobs to run, each destination at most once
    /// * `fetcher` - Performs the fetch-and-write for one job
    /// * `on_progress` - Optional progress callback
    fn execute(
        &self,
        jobs: Vec<DownloadJob>,
        fetcher: &TileFetcher,
        on_progress: Option<ProgressCallback>,
    ) -> DownloadReport;
}

/// Runs jobs one at a time on the calling thread.
#[derive(Debug, Default)]
pub struct SequentialStrategy;

impl SequentialStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl DispatchStrategy for SequentialStrategy {
    fn execute(
        &self,
        jobs: Vec<DownloadJob>,
        fetcher: &TileFetcher,
        on_progress: Option<ProgressCallback>,
    ) -> DownloadReport {
        let total = jobs.len();
        let counters = ProgressCounters::new(total);
        let mut report = DownloadReport::new(total);

        for (i, job) in jobs.into_iter().enumerate() {
            let outcome = fetcher.fetch(&job);
            counters.record(&outcome);
            report.record(job, outcome);

            if let Some(ref cb) = on_progress {
                cb(counters.snapshot(total - i - 1));
            }
        }

        if total == 0 {
            if let Some(ref cb) = on_progress {
                cb(counters.snapshot(0));
            }
        }

        report.finish()
    }
}

/// Fixed pool of worker threads draining one shared FIFO queue.
///
/// The caller thread only enqueues and waits; it never fetches.
#[derive(Debug)]
pub struct ThreadPoolStrategy {
    /// Number of worker threads.
    pub workers: usize,
    /// How often progress is sampled.
    pub poll_interval: Duration,
}

impl ThreadPoolStrategy {
    /// Create a pool of `workers` threads (minimum 1).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set how often progress is sampled.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for ThreadPoolStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl DispatchStrategy for ThreadPoolStrategy {
    fn execute(
        &self,
        jobs: Vec<DownloadJob>,
        fetcher: &TileFetcher,
        on_progress: Option<ProgressCallback>,
    ) -> DownloadReport {
        let total = jobs.len();
        let queue: Arc<JoinableQueue<DownloadJob>> = Arc::new(JoinableQueue::new());
        let counters = Arc::new(ProgressCounters::new(total));
        let results = Arc::new(Mutex::new(DownloadReport::new(total)));

        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let queue = Arc::clone(&queue);
            let counters = Arc::clone(&counters);
            let results = Arc::clone(&results);
            let fetcher = fetcher.clone();

            let spawned = thread::Builder::new()
                .name(format!("tile-worker-{}", id))
                .spawn(move || {
                    while let Some(job) = queue.pop() {
                        let _done = TaskDone(&*queue);
                        let outcome = fetcher.fetch(&job);
                        counters.record(&outcome);
                        results.lock().record(job, outcome);
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => warn!(worker = id, error = %e, "Failed to spawn download worker"),
            }
        }

        if handles.is_empty() {
            warn!("No download workers available, running jobs sequentially");
            queue.close();
            return SequentialStrategy.execute(jobs, fetcher, on_progress);
        }
        debug!(workers = handles.len(), jobs = total, "Download workers started");

        queue.push_all(jobs);

        if let Some(ref cb) = on_progress {
            let reporter = ProgressReporter::start(
                Arc::clone(&queue),
                Arc::clone(&counters),
                Arc::clone(cb),
                self.poll_interval,
            );
            reporter.wait();
        }

        queue.join();
        queue.close();
        for handle in handles {
            handle.join().ok();
        }

        if let Some(ref cb) = on_progress {
            cb(counters.snapshot(0));
        }

        let report = std::mem::take(&mut *results.lock());
        report.finish()
    }
}

/// Marks a dequeued job finished when dropped, even during unwinding.
struct TaskDone<'a, T>(&'a JoinableQueue<T>);

impl<T> Drop for TaskDone<'_, T> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{FetchError, Fetched, HttpClient, MockHttpClient};
    use crate::tile::TileLocator;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn jobs(temp: &TempDir, count: u32) -> Vec<DownloadJob> {
        (0..count)
            .map(|y| {
                DownloadJob::new(
                    TileLocator::new(12, y % 3, y, "png"),
                    format!("http://t/12/{}/{}.png", y % 3, y),
                    temp.path().join(format!("std/12/{}/{}.png", y % 3, y)),
                )
            })
            .collect()
    }

    fn client_for(jobs: &[DownloadJob]) -> MockHttpClient {
        jobs.iter().fold(MockHttpClient::new(), |client, job| {
            client.with_body(&job.url, job.url.clone().into_bytes())
        })
    }

    #[test]
    fn test_thread_pool_min_workers() {
        assert_eq!(ThreadPoolStrategy::new(0).workers, 1);
        assert_eq!(ThreadPoolStrategy::default().workers, DEFAULT_WORKERS);
    }

    #[test]
    fn test_thread_pool_writes_every_job() {
        let temp = TempDir::new().unwrap();
        let jobs = jobs(&temp, 40);
        let fetcher = TileFetcher::new(Arc::new(client_for(&jobs)));

        let report = ThreadPoolStrategy::new(4).execute(jobs.clone(), &fetcher, None);

        assert_eq!(report.total, 40);
        assert_eq!(report.written, 40);
        assert_eq!(report.written_paths.len(), 40);
        for job in &jobs {
            // Each file holds exactly its own body
            assert_eq!(std::fs::read(&job.destination).unwrap(), job.url.as_bytes());
        }
    }

    #[test]
    fn test_thread_pool_counts_not_found_and_failures() {
        let temp = TempDir::new().unwrap();
        let jobs = jobs(&temp, 12);
        let mut client = client_for(&jobs[..8]);
        // jobs 8..10 are not served at all, 10..12 fail
        for job in &jobs[10..] {
            client = client.with_error(
                &job.url,
                FetchError::Transport {
                    url: job.url.clone(),
                    reason: "connection reset".to_string(),
                },
            );
        }
        let fetcher = TileFetcher::new(Arc::new(client));

        let report = ThreadPoolStrategy::new(3).execute(jobs.clone(), &fetcher, None);

        assert_eq!(report.written, 8);
        assert_eq!(report.not_found, 2);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.completed(), 12);
        assert!(!jobs[8].destination.exists());
        assert!(!jobs[11].destination.exists());
    }

    #[test]
    fn test_thread_pool_reports_progress_to_completion() {
        let temp = TempDir::new().unwrap();
        let jobs = jobs(&temp, 20);
        let fetcher = TileFetcher::new(Arc::new(client_for(&jobs)));
        let snapshots = Arc::new(Mutex::new(Vec::new()));

        let callback: ProgressCallback = {
            let snapshots = Arc::clone(&snapshots);
            Arc::new(move |s| snapshots.lock().push(s))
        };
        let strategy = ThreadPoolStrategy::new(2).with_poll_interval(Duration::from_millis(1));
        strategy.execute(jobs, &fetcher, Some(callback));

        let snapshots = snapshots.lock();
        let last = snapshots.last().copied().unwrap();
        assert_eq!(last.completed, 20);
        assert_eq!(last.queued, 0);
        assert_eq!(last.percent_complete(), 100.0);
    }

    #[test]
    fn test_thread_pool_empty_job_list() {
        let fetcher = TileFetcher::new(Arc::new(MockHttpClient::new()));
        let report = ThreadPoolStrategy::new(4).execute(Vec::new(), &fetcher, None);
        assert_eq!(report, DownloadReport::default());
    }

    #[test]
    fn test_sequential_matches_thread_pool() {
        let temp = TempDir::new().unwrap();
        let jobs = jobs(&temp, 6);
        let client = Arc::new(client_for(&jobs[..4]));
        let fetcher = TileFetcher::new(client.clone());

        let report = SequentialStrategy::new().execute(jobs.clone(), &fetcher, None);

        assert_eq!(report.written, 4);
        assert_eq!(report.not_found, 2);
        assert_eq!(client.request_count(), 6);
        let unique: HashSet<_> = report.written_paths.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    struct PanickingClient;

    impl HttpClient for PanickingClient {
        fn get(&self, _url: &str) -> Result<Fetched, FetchError> {
            panic!("client exploded");
        }
    }

    #[test]
    fn test_thread_pool_survives_panicking_client() {
        let temp = TempDir::new().unwrap();
        let jobs = jobs(&temp, 3);
        let (tx, rx) = std::sync::mpsc::channel();

        thread::spawn(move || {
            let fetcher = TileFetcher::new(Arc::new(PanickingClient));
            let report = ThreadPoolStrategy::new(2).execute(jobs, &fetcher, None);
            tx.send(report).ok();
        });

        let report = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("dispatch should return after client panics");
        assert_eq!(report.total, 3);
        assert_eq!(report.failure_count(), 3);
        assert_eq!(report.completed(), 3);
        assert!(report
            .failed
            .iter()
            .all(|f| f.reason == "download panicked: client exploded"));
    }

    #[test]
    fn test_task_done_guard_releases_join_on_unwind() {
        let queue: Arc<JoinableQueue<u32>> = Arc::new(JoinableQueue::new());
        queue.push(1).unwrap();

        let worker = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let _item = queue.pop();
                let _done = TaskDone(&*queue);
                panic!("worker died mid-job");
            })
        };
        assert!(worker.join().is_err());

        queue.join();
        assert_eq!(queue.unfinished(), 0);
    }
}
