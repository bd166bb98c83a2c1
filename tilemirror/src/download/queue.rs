//! Joinable FIFO work queue.
//!
//! Completion is tracked separately from removal: an item counts as
//! unfinished from [`JoinableQueue::push`] until a consumer calls
//! [`JoinableQueue::task_done`] for it, so [`JoinableQueue::join`] can't
//! return while a dequeued item is still being processed.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    unfinished: usize,
    closed: bool,
}

/// Unbounded multi-producer multi-consumer queue with a join barrier.
#[derive(Debug)]
pub struct JoinableQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
    all_done: Condvar,
}

impl<T> JoinableQueue<T> {
    /// Create an empty, open queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                unfinished: 0,
                closed: false,
            }),
            available: Condvar::new(),
            all_done: Condvar::new(),
        }
    }

    /// Append an item.
    ///
    /// Returns the item back if the queue has been closed.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(item);
        }
        state.items.push_back(item);
        state.unfinished += 1;
        drop(state);
        self.available.notify_one();
        Ok(())
    }

    /// Append every item of `items`. Returns how many were accepted.
    pub fn push_all(&self, items: impl IntoIterator<Item = T>) -> usize {
        let mut state = self.state.lock();
        if state.closed {
            return 0;
        }
        let before = state.items.len();
        state.items.extend(items);
        let added = state.items.len() - before;
        state.unfinished += added;
        drop(state);
        self.available.notify_all();
        added
    }

    /// Take the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Mark one previously popped item as finished.
    pub fn task_done(&self) {
        let mut state = self.state.lock();
        state.unfinished = state.unfinished.saturating_sub(1);
        if state.unfinished == 0 {
            self.all_done.notify_all();
        }
    }

    /// Block until every accepted item has been marked finished.
    pub fn join(&self) {
        let mut state = self.state.lock();
        while state.unfinished > 0 {
            self.all_done.wait(&mut state);
        }
    }

    /// Stop accepting items and wake every blocked consumer.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_all();
    }

    /// Items waiting to be popped.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items accepted but not yet marked finished, queued or in flight.
    pub fn unfinished(&self) -> usize {
        self.state.lock().unfinished
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<T> Default for JoinableQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
