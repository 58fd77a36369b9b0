use futures::Stream;
use tokio::sync::Notify;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, ReportedError};

#[derive(Debug, Default)]
struct ErrorState {
    queue: VecDeque<ReportedError>,
    last: Option<ReportedError>,
}

/// Fixed-capacity ring of reported errors. When full, the oldest error makes room for the newest.
#[derive(Debug)]
pub struct ErrorBuffer {
    state: Mutex<ErrorState>,
    notify: Notify,
    capacity: usize,
}

impl ErrorBuffer {
    pub fn new(capacity: usize) -> Self {
        ErrorBuffer {
            state: Mutex::new(ErrorState {
                queue: VecDeque::with_capacity(capacity),
                last: None,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Record an error as the last error and push it onto the ring. Never blocks on readers.
    pub fn report(&self, error: Error) {
        let reported = ReportedError::new(error);
        tracing::warn!("{}", reported);
        {
            let mut state = self.lock();
            state.last = Some(reported.clone());
            if self.capacity == 0 {
                tracing::error!("Error buffer has no capacity, dropping error");
                return;
            }
            if state.queue.len() >= self.capacity {
                if let Some(evicted) = state.queue.pop_front() {
                    tracing::warn!("Error buffer full, evicted: {}", evicted);
                }
            }
            state.queue.push_back(reported);
        }
        self.notify.notify_waiters();
    }

    /// Take the most recently reported error. A second call returns `None` until another error is reported.
    pub fn pop_last_error(&self) -> Option<ReportedError> {
        self.lock().last.take()
    }

    pub fn has_errors(&self) -> bool {
        !self.lock().queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_errors()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pop the oldest buffered error.
    pub fn try_recv(&self) -> Option<ReportedError> {
        self.lock().queue.pop_front()
    }

    /// Wait for the oldest buffered error.
    pub async fn recv(&self) -> ReportedError {
        loop {
            let notified = self.notify.notified();
            if let Some(error) = self.try_recv() {
                return error;
            }
            notified.await;
        }
    }

    /// Take every buffered error, oldest first.
    pub fn drain(&self) -> Vec<ReportedError> {
        self.lock().queue.drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, ErrorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A cloneable reading handle on a client's error buffer.
#[derive(Debug, Clone)]
pub struct ErrorStream {
    buffer: Arc<ErrorBuffer>,
}

impl ErrorStream {
    pub(crate) fn new(buffer: Arc<ErrorBuffer>) -> Self {
        ErrorStream { buffer }
    }

    pub fn try_recv(&self) -> Option<ReportedError> {
        self.buffer.try_recv()
    }

    pub async fn recv(&self) -> ReportedError {
        self.buffer.recv().await
    }

    pub fn drain(&self) -> Vec<ReportedError> {
        self.buffer.drain()
    }

    /// Consume errors as they are reported. The stream never ends.
    pub fn into_stream(self) -> impl Stream<Item = ReportedError> {
        futures::stream::unfold(self, |errors| async move {
            let error = errors.recv().await;
            Some((error, errors))
        })
    }
}
