//! Progress reporting for long planning runs
//!
//! Progress is measured in target levels gained. Emissions are rate limited
//! except at the start and the end of a run, and reporting never blocks the
//! planner: the bounded queue drops updates a slow consumer did not take.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::core::types::Level;

/// One progress report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Completed share in `[0, 1]`
    pub fraction: f64,
    pub levels_done: u32,
    pub levels_total: u32,
}

/// Receiver of progress reports
pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Sending half of a bounded progress queue
pub struct ProgressQueue {
    tx: Sender<Progress>,
}

impl ProgressQueue {
    /// Queue holding at most `capacity` pending reports
    pub fn bounded(capacity: usize) -> (Self, ProgressReceiver) {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        (Self { tx }, ProgressReceiver { rx })
    }
}

impl ProgressSink for ProgressQueue {
    fn report(&mut self, progress: Progress) {
        match self.tx.try_send(progress) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::trace!("progress queue full; update dropped"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Receiving half of a bounded progress queue
pub struct ProgressReceiver {
    rx: Receiver<Progress>,
}

impl ProgressReceiver {
    /// Take every pending report without waiting
    pub fn drain(&self) -> Vec<Progress> {
        self.rx.try_iter().collect()
    }
}

/// Tracks levels gained towards the targets and emits rate-limited reports
pub struct ProgressTracker<'a> {
    total: u32,
    done: u32,
    min_interval: Duration,
    last_emit: Option<Instant>,
    sink: Option<Box<dyn ProgressSink + 'a>>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(total: u32, min_interval: Duration) -> Self {
        Self {
            total,
            done: 0,
            min_interval,
            last_emit: None,
            sink: None,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn ProgressSink + 'a>) {
        self.sink = Some(sink);
    }

    pub fn levels_done(&self) -> u32 {
        self.done
    }

    /// Record a level change of a target skill; levels past the target do
    /// not count
    pub fn record(&mut self, from: Level, to: Level, target: Level) {
        let gained = to.min(target).saturating_sub(from.min(target));
        if gained == 0 {
            return;
        }
        self.done = (self.done + gained).min(self.total);
        self.emit(false);
    }

    /// Emit a report unless one was sent less than the minimum interval ago
    pub fn emit(&mut self, force: bool) {
        if self.total == 0 {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let now = Instant::now();
        if !force {
            if let Some(last) = self.last_emit {
                if now.duration_since(last) < self.min_interval {
                    return;
                }
            }
        }
        self.last_emit = Some(now);
        sink.report(Progress {
            fraction: self.done as f64 / self.total as f64,
            levels_done: self.done,
            levels_total: self.total,
        });
    }
}
