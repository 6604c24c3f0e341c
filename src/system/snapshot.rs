use chrono::{Local, NaiveDateTime, SubsecRound};

/// One tick's worth of host utilization.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Local wall-clock time, truncated to whole seconds.
    pub timestamp: NaiveDateTime,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}
