//! Render progress reporting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Receives completion fractions in [0, 1] during a render.
///
/// Called from worker threads, so implementations must be `Sync`. Any
/// `Fn(f64) + Sync` closure works.
pub trait ProgressSink: Sync {
    fn report(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Sync,
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Sink for headless renders that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}

/// Number of milestones between 0 and 1 (every 5%).
const STEPS: usize = 20;

/// Counts finished pixels and forwards each 5% milestone to a sink once,
/// in increasing order, logging an ETA as it goes.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    total: usize,
    done: AtomicUsize,
    last_step: AtomicUsize,
    reported: Mutex<usize>,
    started: Instant,
}

impl<'a> ProgressTracker<'a> {
    /// Start tracking `total` units of work. Reports 0 immediately.
    pub fn new(total: usize, sink: &'a dyn ProgressSink) -> Self {
        sink.report(0.0);
        Self {
            sink,
            total: total.max(1),
            done: AtomicUsize::new(0),
            last_step: AtomicUsize::new(0),
            reported: Mutex::new(0),
            started: Instant::now(),
        }
    }

    /// Record `count` finished units.
    pub fn advance(&self, count: usize) {
        let done = self.done.fetch_add(count, Ordering::Relaxed) + count;
        let step = done * STEPS / self.total;
        // The final milestone belongs to finish().
        if step == 0 || step >= STEPS || step <= self.last_step.load(Ordering::Relaxed) {
            return;
        }

        let mut reported = self.reported.lock().unwrap_or_else(PoisonError::into_inner);
        if step <= *reported {
            return;
        }
        *reported = step;
        self.last_step.store(step, Ordering::Relaxed);

        let fraction = step as f64 / STEPS as f64;
        let elapsed = self.started.elapsed().as_secs_f64();
        let eta = elapsed * (1.0 - fraction) / fraction;
        log::info!(
            "Rendered {:.0}% ({}/{} pixels), ETA {:.1}s",
            fraction * 100.0,
            done.min(self.total),
            self.total,
            eta
        );
        self.sink.report(fraction);
    }

    pub fn completed(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    /// Report completion and return the time since tracking started.
    pub fn finish(&self) -> Duration {
        let elapsed = self.started.elapsed();
        self.sink.report(1.0);
        log::info!("Render finished in {:.2}s", elapsed.as_secs_f64());
        elapsed
    }
}
