//! Resolution counters for profiling.
//!
//! With the `tracing` feature the counters are relaxed atomics bumped from
//! the hot paths of the resolver. Without it [`EvalMetrics`] is a zero-sized
//! no-op, so call sites need no `cfg`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut q = engine.query("nrev([1,2,3], R)")?;
//! q.evaluate()?;
//! println!("{}", q.metrics());
//! ```

#[cfg(feature = "tracing")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected while a query runs.
#[cfg(feature = "tracing")]
pub struct EvalMetrics {
    /// User-defined predicate calls
    pub calls: AtomicU64,
    /// Re-entries into a user-defined predicate for another solution
    pub redos: AtomicU64,
    /// Clause head unifications that succeeded
    pub unifications: AtomicU64,
    /// Clause head unifications that failed
    pub unification_failures: AtomicU64,
    /// Clause alternatives abandoned
    pub backtracks: AtomicU64,
    /// Cuts that reached a clause boundary
    pub cuts: AtomicU64,
    /// Answers produced at the top level
    pub solutions: AtomicU64,
}

#[cfg(feature = "tracing")]
impl EvalMetrics {
    pub fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            redos: AtomicU64::new(0),
            unifications: AtomicU64::new(0),
            unification_failures: AtomicU64::new(0),
            backtracks: AtomicU64::new(0),
            cuts: AtomicU64::new(0),
            solutions: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_redo(&self) {
        self.redos.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unification(&self) {
        self.unifications.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unification_failure(&self) {
        self.unification_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_backtrack(&self) {
        self.backtracks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cut(&self) {
        self.cuts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_solution(&self) {
        self.solutions.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of every counter.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            calls: self.calls.load(Ordering::Relaxed),
            redos: self.redos.load(Ordering::Relaxed),
            unifications: self.unifications.load(Ordering::Relaxed),
            unification_failures: self.unification_failures.load(Ordering::Relaxed),
            backtracks: self.backtracks.load(Ordering::Relaxed),
            cuts: self.cuts.load(Ordering::Relaxed),
            solutions: self.solutions.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.redos.store(0, Ordering::Relaxed);
        self.unifications.store(0, Ordering::Relaxed);
        self.unification_failures.store(0, Ordering::Relaxed);
        self.backtracks.store(0, Ordering::Relaxed);
        self.cuts.store(0, Ordering::Relaxed);
        self.solutions.store(0, Ordering::Relaxed);
    }
}

#[cfg(feature = "tracing")]
impl Default for EvalMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsReport {
    pub calls: u64,
    pub redos: u64,
    pub unifications: u64,
    pub unification_failures: u64,
    pub backtracks: u64,
    pub cuts: u64,
    pub solutions: u64,
}

impl MetricsReport {
    /// Fraction of head unifications that matched.
    pub fn unification_success_rate(&self) -> f64 {
        let total = self.unifications + self.unification_failures;
        if total == 0 {
            1.0
        } else {
            self.unifications as f64 / total as f64
        }
    }
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Resolution Metrics ===")?;
        writeln!(f, "Calls:              {} ({} redos)", self.calls, self.redos)?;
        writeln!(
            f,
            "Head unifications:  {} ({} failures, {:.1}% success)",
            self.unifications,
            self.unification_failures,
            self.unification_success_rate() * 100.0
        )?;
        writeln!(f, "Backtracks:         {}", self.backtracks)?;
        writeln!(f, "Cuts:               {}", self.cuts)?;
        writeln!(f, "Solutions:          {}", self.solutions)?;
        Ok(())
    }
}

#[cfg(not(feature = "tracing"))]
pub struct EvalMetrics;

#[cfg(not(feature = "tracing"))]
impl EvalMetrics {
    #[inline]
    pub fn new() -> Self {
        EvalMetrics
    }
    #[inline]
    pub fn record_call(&self) {}
    #[inline]
    pub fn record_redo(&self) {}
    #[inline]
    pub fn record_unification(&self) {}
    #[inline]
    pub fn record_unification_failure(&self) {}
    #[inline]
    pub fn record_backtrack(&self) {}
    #[inline]
    pub fn record_cut(&self) {}
    #[inline]
    pub fn record_solution(&self) {}
    #[inline]
    pub fn report(&self) -> MetricsReport {
        MetricsReport::default()
    }
    #[inline]
    pub fn reset(&self) {}
}

#[cfg(not(feature = "tracing"))]
impl Default for EvalMetrics {
    fn default() -> Self {
        Self::new()
    }
}
