use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::report::{ReportError, Reporter};
use crate::system::counters::CounterSource;
use crate::system::error::SampleError;
use crate::system::sampler::Sampler;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// How often to tick and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickPlan {
    pub interval: Duration,
    /// `None` runs until the stop signal fires.
    pub count: Option<u64>,
}

impl Default for TickPlan {
    fn default() -> Self {
        TickPlan {
            interval: Duration::from_secs(1),
            count: None,
        }
    }
}

impl TickPlan {
    fn has_more(&self, done: u64) -> bool {
        self.count.is_none_or(|limit| done < limit)
    }
}

/// Run ticks until the plan is exhausted or `stop` resolves.
///
/// `stop` is only observed while sleeping between ticks; a tick that has
/// started always completes. Returns the number of ticks reported.
pub async fn run<S, W, F>(
    sampler: &mut Sampler<S>,
    reporter: &mut Reporter<W>,
    disk_path: &Path,
    plan: TickPlan,
    stop: F,
) -> Result<u64, SessionError>
where
    S: CounterSource,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(stop);
    let mut done = 0u64;

    while plan.has_more(done) {
        let snapshot = sampler.tick(disk_path)?;
        reporter.report(&snapshot)?;
        done += 1;

        if !plan.has_more(done) {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(plan.interval) => {}
            _ = &mut stop => {
                tracing::info!(ticks = done, "stop requested, ending session");
                break;
            }
        }
    }

    Ok(done)
}
