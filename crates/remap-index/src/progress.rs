use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Receives coarse progress reports from long running index builds.
///
/// `init` is called once with the total amount of work, then `step` with the amount done so
/// far. Builds poll `is_cancelled` between phases and between classes.
pub trait ProgressListener: Send + Sync {
    fn init(&self, total: usize, title: &str);

    fn step(&self, done: usize, message: &str);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Ignores every report. Used for headless builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressListener for NoopProgress {
    fn init(&self, _total: usize, _title: &str) {}

    fn step(&self, _done: usize, _message: &str) {}
}

/// Reports progress as `tracing` events under the `remap.progress` target.
#[derive(Debug, Default)]
pub struct TracingProgress {
    total: AtomicUsize,
    cancelled: AtomicBool,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the build stops at its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl ProgressListener for TracingProgress {
    fn init(&self, total: usize, title: &str) {
        self.total.store(total, Ordering::Relaxed);
        tracing::info!(target: "remap.progress", total, "{title}");
    }

    fn step(&self, done: usize, message: &str) {
        let total = self.total.load(Ordering::Relaxed);
        let percent = if total == 0 { 100 } else { done * 100 / total };
        tracing::debug!(target: "remap.progress", done, total, percent, "{message}");
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
