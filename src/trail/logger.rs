//! Asynchronous, drop-on-full trail logger.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, instrument, trace, warn};

use crate::game::LogEntry;
use crate::trail::sink::TrailSink;

/// Number of entries the queue holds before new entries are dropped.
pub const TRAIL_CAPACITY: usize = 100;

/// Outcome of [`AsyncLogger::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The entry was queued for the drain thread.
    Queued,
    /// The queue was full or the logger was stopping; the entry is lost.
    Dropped,
}

type SharedSink = Arc<Mutex<Box<dyn TrailSink>>>;

/// Hands trail entries to a background drain thread.
///
/// Submitting never waits: when the bounded queue is full the entry is
/// dropped and counted. The logger starts lazily on the first submission,
/// and after [`cleanup`](Self::cleanup) it can be started again.
pub struct AsyncLogger {
    sink: SharedSink,
    capacity: usize,
    lifecycle: Mutex<Option<JoinHandle<()>>>,
    sender: RwLock<Option<mpsc::Sender<LogEntry>>>,
    dropped: AtomicU64,
}

impl fmt::Debug for AsyncLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLogger")
            .field("capacity", &self.capacity)
            .field("running", &self.is_running())
            .field("dropped", &self.dropped())
            .finish()
    }
}

impl AsyncLogger {
    /// Creates a stopped logger with the default capacity.
    pub fn new(sink: impl TrailSink + 'static) -> Self {
        Self::with_capacity(sink, TRAIL_CAPACITY)
    }

    /// Creates a stopped logger with a custom queue capacity (at least 1).
    pub fn with_capacity(sink: impl TrailSink + 'static, capacity: usize) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
            capacity: capacity.max(1),
            lifecycle: Mutex::new(None),
            sender: RwLock::new(None),
            dropped: AtomicU64::new(0),
        }
    }

    /// Queue capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries dropped since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Whether the drain thread is accepting entries.
    pub fn is_running(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Starts the drain thread. Calling it while running does nothing.
    #[instrument(skip(self))]
    pub fn initialise(&self) {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        self.start(&mut lifecycle);
    }

    fn start(&self, lifecycle: &mut Option<JoinHandle<()>>) {
        if lifecycle.is_some() {
            debug!("Trail logger already running");
            return;
        }

        let (tx, rx) = mpsc::channel(self.capacity);
        let sink = Arc::clone(&self.sink);
        let spawned = thread::Builder::new()
            .name("trail-drain".to_string())
            .spawn(move || drain(rx, sink));

        match spawned {
            Ok(handle) => {
                *self.sender.write().unwrap_or_else(PoisonError::into_inner) = Some(tx);
                *lifecycle = Some(handle);
                info!(capacity = self.capacity, "Trail logger started");
            }
            Err(e) => warn!(error = %e, "Failed to spawn trail drain thread"),
        }
    }

    /// Queues an entry without waiting.
    ///
    /// Starts the logger if it is stopped and no other caller holds the
    /// lifecycle lock. The entry is dropped when the queue is full or no
    /// queue is open.
    #[instrument(skip(self, entry), fields(message = %entry.message()))]
    pub fn submit(&self, entry: LogEntry) -> Submission {
        if !self.is_running() {
            match self.lifecycle.try_lock() {
                Ok(mut lifecycle) => self.start(&mut lifecycle),
                Err(std::sync::TryLockError::Poisoned(poisoned)) => {
                    self.start(&mut poisoned.into_inner())
                }
                // Another caller is starting or stopping the logger.
                Err(std::sync::TryLockError::WouldBlock) => {}
            }
        }

        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = sender.as_ref() else {
            return self.drop_entry("logger is not running");
        };
        match tx.try_send(entry) {
            Ok(()) => {
                trace!("Trail entry queued");
                Submission::Queued
            }
            Err(TrySendError::Full(_)) => self.drop_entry("queue is full"),
            Err(TrySendError::Closed(_)) => self.drop_entry("queue is closed"),
        }
    }

    fn drop_entry(&self, reason: &str) -> Submission {
        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(reason, total, "Trail entry dropped");
        Submission::Dropped
    }

    /// Stops the drain thread after it has written every queued entry.
    ///
    /// Calling it while stopped does nothing.
    #[instrument(skip(self))]
    pub fn cleanup(&self) {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(handle) = lifecycle.take() else {
            debug!("Trail logger not running");
            return;
        };

        // Closing the channel ends the drain loop once the queue is empty.
        let sender = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        if handle.join().is_err() {
            warn!("Trail drain thread panicked");
        }
        info!(dropped = self.dropped(), "Trail logger stopped");
    }
}

fn drain(mut rx: mpsc::Receiver<LogEntry>, sink: SharedSink) {
    debug!("Trail drain started");
    while let Some(entry) = rx.blocking_recv() {
        let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
        match panic::catch_unwind(AssertUnwindSafe(|| sink.write(&entry))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to write trail entry"),
            Err(_) => warn!("Recovered from panic while writing trail entry"),
        }
    }
    debug!("Trail drain finished");
}
