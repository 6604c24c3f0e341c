use std::path::Path;

use super::counters::{CounterSource, CpuCounters, ProcSource};
use super::cpu::CpuTracker;
use super::error::SampleError;
use super::snapshot::{Snapshot, local_now};

/// Produces one [`Snapshot`] per tick from a [`CounterSource`].
///
/// CPU and memory sources must be readable for a tick to succeed. Disk
/// failures and a malformed CPU line degrade to zeroed values instead.
pub struct Sampler<S = ProcSource> {
    source: S,
    cpu: CpuTracker,
}

impl Default for Sampler<ProcSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler<ProcSource> {
    pub fn new() -> Self {
        Self::with_source(ProcSource::new())
    }
}

impl<S: CounterSource> Sampler<S> {
    pub fn with_source(source: S) -> Self {
        Sampler {
            source,
            cpu: CpuTracker::new(),
        }
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    pub fn tick(&mut self, disk_path: &Path) -> Result<Snapshot, SampleError> {
        let _tick_span = tracing::debug_span!("sampler.tick").entered();

        let timestamp = local_now();

        let cpu_counters = match self.source.read_cpu_counters() {
            Ok(counters) => counters,
            Err(SampleError::Parse(reason)) => {
                tracing::warn!(%reason, "unreadable cpu line, using zeroed counters");
                CpuCounters::default()
            }
            Err(err) => return Err(err),
        };
        let cpu_percent = self.cpu.observe(cpu_counters);

        let memory_percent = self.source.read_memory_counters()?.used_percent();

        let disk_percent = match self.source.read_disk_counters(disk_path) {
            Ok(disk) => disk.used_percent(),
            Err(err) => {
                tracing::debug!(error = %err, "disk query failed, reporting 0%");
                0.0
            }
        };

        tracing::debug!(cpu_percent, memory_percent, disk_percent, "tick sampled");

        Ok(Snapshot {
            timestamp,
            cpu_percent,
            memory_percent,
            disk_percent,
        })
    }
}
