//! Progress reporting for tile dispatch.
//!
//! Workers bump shared atomic counters; a reporter thread samples the queue
//! depth against the job total and hands snapshots to a callback. The
//! reporter is purely observational: an empty queue doesn't mean in-flight
//! jobs have finished. That guarantee only comes from the queue's join
//! barrier.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use super::job::DownloadOutcome;
use super::queue::JoinableQueue;

/// Default interval between progress samples.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Point-in-time view of a dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Jobs still waiting in the queue.
    pub queued: usize,
    /// Jobs with a recorded outcome.
    pub completed: usize,
    /// Jobs in the run.
    pub total: usize,
}

impl ProgressSnapshot {
    /// Share of jobs taken off the queue, 0-100.
    pub fn percent_dequeued(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let dequeued = self.total.saturating_sub(self.queued);
        (dequeued as f64 / self.total as f64) * 100.0
    }

    /// Share of jobs finished, 0-100.
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed.min(self.total) as f64 / self.total as f64) * 100.0
    }
}

/// Progress callback invoked with each snapshot.
pub type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Shared counters updated by workers.
#[derive(Debug)]
pub struct ProgressCounters {
    total: usize,
    completed: AtomicUsize,
    written: AtomicUsize,
    bytes: AtomicU64,
}

impl ProgressCounters {
    /// Counters for a run of `total` jobs.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            written: AtomicUsize::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    /// Count one finished job.
    pub fn record(&self, outcome: &DownloadOutcome) {
        if let DownloadOutcome::Written { bytes } = outcome {
            self.written.fetch_add(1, Ordering::SeqCst);
            self.bytes.fetch_add(*bytes, Ordering::SeqCst);
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }

    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }

    /// Snapshot given the current queue depth.
    pub fn snapshot(&self, queued: usize) -> ProgressSnapshot {
        ProgressSnapshot {
            queued,
            completed: self.completed(),
            total: self.total,
        }
    }
}

/// Background thread sampling queue depth until the queue is empty.
pub struct ProgressReporter {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl ProgressReporter {
    /// Start sampling `queue` every `poll_interval`.
    ///
    /// The thread exits on its own once the queue depth reaches zero, or
    /// when the reporter is stopped or dropped. If the thread can't be
    /// spawned, a warning is logged and no progress is reported.
    pub fn start<T: Send + 'static>(
        queue: Arc<JoinableQueue<T>>,
        counters: Arc<ProgressCounters>,
        callback: ProgressCallback,
        poll_interval: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let spawned = thread::Builder::new()
            .name("tile-progress".to_string())
            .spawn(move || loop {
                let queued = queue.len();
                callback(counters.snapshot(queued));
                if queued == 0 || stop_flag.load(Ordering::SeqCst) {
                    break;
                }
                thread::sleep(poll_interval);
            });

        match spawned {
            Ok(handle) => Self {
                handle: Some(handle),
                stop,
            },
            Err(e) => {
                warn!(error = %e, "Failed to spawn progress reporter, progress disabled");
                Self::inactive()
            }
        }
    }

    /// Whether a sampling thread is running.
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Reporter without a sampling thread; waiting on it returns at once.
    fn inactive() -> Self {
        Self {
            handle: None,
            stop: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Wait for the reporter to observe an empty queue.
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }

    /// Stop sampling immediately.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_snapshot_percentages() {
        let snapshot = ProgressSnapshot {
            queued: 25,
            completed: 50,
            total: 100,
        };
        assert_eq!(snapshot.percent_dequeued(), 75.0);
        assert_eq!(snapshot.percent_complete(), 50.0);
    }

    #[test]
    fn test_empty_run_is_complete() {
        let snapshot = ProgressSnapshot::default();
        assert_eq!(snapshot.percent_dequeued(), 100.0);
        assert_eq!(snapshot.percent_complete(), 100.0);
    }

    #[test]
    fn test_counters_record() {
        let counters = ProgressCounters::new(3);
        counters.record(&DownloadOutcome::Written { bytes: 100 });
        counters.record(&DownloadOutcome::NotFound);
        counters.record(&DownloadOutcome::Failed {
            reason: "boom".to_string(),
        });

        assert_eq!(counters.completed(), 3);
        assert_eq!(counters.written(), 1);
        assert_eq!(counters.bytes(), 100);
        assert_eq!(counters.snapshot(0).percent_complete(), 100.0);
    }

    #[test]
    fn test_reporter_stops_when_queue_drains() {
        let queue = Arc::new(JoinableQueue::new());
        queue.push_all(vec![1, 2, 3]);
        let counters = Arc::new(ProgressCounters::new(3));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let callback: ProgressCallback = {
            let seen = Arc::clone(&seen);
            Arc::new(move |snapshot| seen.lock().push(snapshot.queued))
        };
        let reporter = ProgressReporter::start(
            Arc::clone(&queue),
            Arc::clone(&counters),
            callback,
            Duration::from_millis(5),
        );

        while queue.pop().is_some() {
            thread::sleep(Duration::from_millis(10));
        }
        reporter.wait();

        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert_eq!(seen.last(), Some(&0));
    }

    #[test]
    fn test_reporter_stop_on_drop() {
        let queue: Arc<JoinableQueue<u32>> = Arc::new(JoinableQueue::new());
        queue.push(1).unwrap();
        let counters = Arc::new(ProgressCounters::new(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let callback: ProgressCallback = {
            let calls = Arc::clone(&calls);
            Arc::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        let reporter = ProgressReporter::start(queue, counters, callback, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        drop(reporter);

        assert!(calls.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_reporter_thread_is_named() {
        let queue: Arc<JoinableQueue<u32>> = Arc::new(JoinableQueue::new());
        let counters = Arc::new(ProgressCounters::new(0));
        let name = Arc::new(Mutex::new(None));

        let callback: ProgressCallback = {
            let name = Arc::clone(&name);
            Arc::new(move |_| *name.lock() = thread::current().name().map(str::to_string))
        };
        let reporter = ProgressReporter::start(queue, counters, callback, Duration::from_millis(5));
        assert!(reporter.is_active());
        reporter.wait();

        assert_eq!(name.lock().as_deref(), Some("tile-progress"));
    }

    #[test]
    fn test_inactive_reporter_returns_immediately() {
        let reporter = ProgressReporter::inactive();
        assert!(!reporter.is_active());
        reporter.wait();
        ProgressReporter::inactive().stop();
    }
}
