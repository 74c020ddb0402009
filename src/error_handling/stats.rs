//! Atomic scan statistics.
//!
//! Tracks per-source unavailability and overall scan outcomes so operators
//! can see degradation without reading every log line. Safe to share
//! across concurrent scans.

use std::sync::atomic::{AtomicUsize, Ordering};

use strum::IntoEnumIterator;

use crate::signal::SignalSource;

/// Lock-free counters for scan outcomes.
#[derive(Debug, Default)]
pub struct ScanStats {
    scans_completed: AtomicUsize,
    incidents_written: AtomicUsize,
    degraded_scans: AtomicUsize,
    unavailable_by_source: [AtomicUsize; SignalSource::COUNT],
}

impl ScanStats {
    /// Creates a zeroed statistics block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed scan; `degraded` means at least one collector
    /// was unavailable.
    pub fn record_scan(&self, degraded: bool) {
        self.scans_completed.fetch_add(1, Ordering::Relaxed);
        if degraded {
            self.degraded_scans.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a persisted incident.
    pub fn record_incident(&self) {
        self.incidents_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one unavailable outcome for a source.
    pub fn record_unavailable(&self, source: SignalSource) {
        self.unavailable_by_source[source.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Completed scan count.
    pub fn scans_completed(&self) -> usize {
        self.scans_completed.load(Ordering::Relaxed)
    }

    /// Persisted incident count.
    pub fn incidents_written(&self) -> usize {
        self.incidents_written.load(Ordering::Relaxed)
    }

    /// Scans where at least one collector degraded.
    pub fn degraded_scans(&self) -> usize {
        self.degraded_scans.load(Ordering::Relaxed)
    }

    /// Unavailability count for one source.
    pub fn unavailable_count(&self, source: SignalSource) -> usize {
        self.unavailable_by_source[source.index()].load(Ordering::Relaxed)
    }

    /// Logs a one-line-per-source summary at the end of a run. Quiet when
    /// nothing degraded.
    pub fn log_summary(&self) {
        let completed = self.scans_completed();
        if completed == 0 {
            return;
        }
        log::info!(
            "Scans: {} completed, {} degraded, {} incidents written",
            completed,
            self.degraded_scans(),
            self.incidents_written()
        );
        for source in SignalSource::iter() {
            let count = self.unavailable_count(source);
            if count > 0 {
                log::info!("  {} unavailable {} time(s)", source, count);
            }
        }
    }
}
