use super::counters::CpuCounters;

/// Turns successive cumulative CPU counter readings into a utilization percentage.
///
/// The first observation only establishes a baseline and reports 0.0; every
/// later observation reports the share of non-idle time since the previous one.
/// Feed it exactly one reading per tick: observing the same reading twice
/// leaves a zero-length window and skews the next real tick.
#[derive(Debug, Default)]
pub struct CpuTracker {
    previous: Option<CpuCounters>,
}

impl CpuTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    pub fn observe(&mut self, current: CpuCounters) -> f64 {
        let percent = match self.previous.replace(current) {
            None => 0.0,
            Some(previous) => window_percent(&previous, &current),
        };
        tracing::trace!(percent, total = current.total(), "cpu window");
        percent
    }
}

fn window_percent(previous: &CpuCounters, current: &CpuCounters) -> f64 {
    let (prev_total, cur_total) = (previous.total(), current.total());
    if cur_total <= prev_total {
        // Counter reset or no elapsed CPU time.
        return 0.0;
    }
    let total_delta = cur_total - prev_total;
    let active_delta = current.active().saturating_sub(previous.active());
    (100.0 * active_delta as f64 / total_delta as f64).min(100.0)
}
