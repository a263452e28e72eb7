//! Assembler counters
//!
//! Atomic counters describing one assembler run. They feed the start and
//! summary log lines; the metrics document itself is built from the
//! UoWs' metrics contexts.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the pipeline assembler
///
/// All counters use relaxed ordering; values read mid-run may be slightly
/// stale.
#[derive(Debug, Default)]
pub struct AssemblerMetrics {
    /// UoWs handed to the assembler
    uows_received: AtomicU64,

    /// UoWs no rule accepted
    uows_unmatched: AtomicU64,

    /// Pipeline forks created
    forks_created: AtomicU64,

    /// Forks that left their pipeline successfully
    forks_completed: AtomicU64,

    /// Forks that left their pipeline with a fault
    forks_faulted: AtomicU64,

    /// Sink batches accepted
    batches_written: AtomicU64,

    /// Sink batches that faulted
    batches_failed: AtomicU64,

    /// Tasks that panicked or were cancelled
    tasks_aborted: AtomicU64,
}

impl AssemblerMetrics {
    #[inline]
    pub const fn new() -> Self {
        Self {
            uows_received: AtomicU64::new(0),
            uows_unmatched: AtomicU64::new(0),
            forks_created: AtomicU64::new(0),
            forks_completed: AtomicU64::new(0),
            forks_faulted: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            tasks_aborted: AtomicU64::new(0),
        }
    }

    /// Record a UoW and the number of pipelines it was forked into
    #[inline]
    pub fn record_received(&self, forks: usize) {
        self.uows_received.fetch_add(1, Ordering::Relaxed);
        if forks == 0 {
            self.uows_unmatched.fetch_add(1, Ordering::Relaxed);
        } else {
            self.forks_created.fetch_add(forks as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_completed(&self) {
        self.forks_completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_faulted(&self) {
        self.forks_faulted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_batch(&self, written: bool) {
        if written {
            self.batches_written.fetch_add(1, Ordering::Relaxed);
        } else {
            self.batches_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_aborted(&self) {
        self.tasks_aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uows_received: self.uows_received.load(Ordering::Relaxed),
            uows_unmatched: self.uows_unmatched.load(Ordering::Relaxed),
            forks_created: self.forks_created.load(Ordering::Relaxed),
            forks_completed: self.forks_completed.load(Ordering::Relaxed),
            forks_faulted: self.forks_faulted.load(Ordering::Relaxed),
            batches_written: self.batches_written.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            tasks_aborted: self.tasks_aborted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of assembler counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub uows_received: u64,
    pub uows_unmatched: u64,
    pub forks_created: u64,
    pub forks_completed: u64,
    pub forks_faulted: u64,
    pub batches_written: u64,
    pub batches_failed: u64,
    pub tasks_aborted: u64,
}

impl MetricsSnapshot {
    /// Share of received UoWs at least one rule accepted
    ///
    /// Returns None if no UoWs have been received.
    #[inline]
    pub fn match_rate(&self) -> Option<f64> {
        if self.uows_received == 0 {
            None
        } else {
            let matched = self.uows_received - self.uows_unmatched;
            Some(matched as f64 / self.uows_received as f64)
        }
    }

    /// Share of finished forks that faulted
    ///
    /// Returns None if no fork has finished.
    #[inline]
    pub fn fault_rate(&self) -> Option<f64> {
        let finished = self.forks_completed + self.forks_faulted;
        if finished == 0 {
            None
        } else {
            Some(self.forks_faulted as f64 / finished as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let snapshot = AssemblerMetrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_record_received() {
        let metrics = AssemblerMetrics::new();

        metrics.record_received(2);
        metrics.record_received(0);
        metrics.record_received(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.uows_received, 3);
        assert_eq!(snapshot.uows_unmatched, 1);
        assert_eq!(snapshot.forks_created, 3);
    }

    #[test]
    fn test_record_outcomes() {
        let metrics = AssemblerMetrics::new();

        metrics.record_completed();
        metrics.record_completed();
        metrics.record_faulted();
        metrics.record_batch(true);
        metrics.record_batch(false);
        metrics.record_aborted();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.forks_completed, 2);
        assert_eq!(snapshot.forks_faulted, 1);
        assert_eq!(snapshot.batches_written, 1);
        assert_eq!(snapshot.batches_failed, 1);
        assert_eq!(snapshot.tasks_aborted, 1);
    }

    #[test]
    fn test_snapshot_rates() {
        let snapshot = MetricsSnapshot {
            uows_received: 4,
            uows_unmatched: 1,
            forks_completed: 9,
            forks_faulted: 1,
            ..Default::default()
        };

        assert_eq!(snapshot.match_rate(), Some(0.75));
        assert_eq!(snapshot.fault_rate(), Some(0.1));
    }

    #[test]
    fn test_snapshot_rates_empty() {
        let snapshot = MetricsSnapshot::default();
        assert_eq!(snapshot.match_rate(), None);
        assert_eq!(snapshot.fault_rate(), None);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(AssemblerMetrics::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let m = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_received(2);
                    m.record_completed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.uows_received, 4000);
        assert_eq!(snapshot.forks_created, 8000);
        assert_eq!(snapshot.forks_completed, 4000);
    }
}
