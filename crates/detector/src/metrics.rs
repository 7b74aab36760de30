// Metrics hooks for the `detector` crate.
//
// Callers install a global `DetectorMetrics` implementation via
// [`set_detector_metrics`]; every batch analysis then reports its latency and
// counts, and every streaming stop reports the check that tripped. This keeps
// instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::{DuplicateReport, LoopCheck};

/// Metrics observer for detection operations.
pub trait DetectorMetrics: Send + Sync {
    /// Record one finished batch analysis.
    ///
    /// `latency` is the wall-clock duration of the whole call, including
    /// fingerprinting and removal.
    fn record_analysis(&self, language_id: &str, latency: Duration, report: &DuplicateReport);

    /// Record a streaming stop. `line_index` is the 0-based index of the
    /// non-blank line that tripped `check` within its session.
    fn record_stop(&self, check: LoopCheck, line_index: usize);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn DetectorMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn DetectorMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn DetectorMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global detector metrics recorder.
///
/// This is typically called once during startup so every analyzer and
/// streaming filter shares the same metrics backend.
pub fn set_detector_metrics(recorder: Option<Arc<dyn DetectorMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
