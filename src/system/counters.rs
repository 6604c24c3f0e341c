use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::error::SampleError;
use super::platform;

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";

/// Cumulative CPU time buckets from the aggregate `cpu` line, in USER_HZ ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuCounters {
    /// Saturates at `u64::MAX` rather than wrapping.
    pub fn total(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }

    /// Time spent doing work: everything except `idle` and `iowait`.
    pub fn active(&self) -> u64 {
        self.total()
            .saturating_sub(self.idle)
            .saturating_sub(self.iowait)
    }
}

/// Memory figures in kilobytes, as exposed by `/proc/meminfo`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
}

impl MemoryReading {
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let used = 100.0 * (1.0 - self.available as f64 / self.total as f64);
        used.clamp(0.0, 100.0)
    }
}

/// Capacity and free space of one mounted filesystem, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiskReading {
    pub capacity: u64,
    pub free: u64,
}

impl DiskReading {
    pub fn used_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        let used = 100.0 * (1.0 - self.free as f64 / self.capacity as f64);
        used.clamp(0.0, 100.0)
    }
}

/// Where the sampler gets its raw counters from.
pub trait CounterSource {
    fn read_cpu_counters(&mut self) -> Result<CpuCounters, SampleError>;
    fn read_memory_counters(&mut self) -> Result<MemoryReading, SampleError>;
    fn read_disk_counters(&mut self, path: &Path) -> Result<DiskReading, SampleError>;
}

/// Reads counters from procfs and `statvfs`.
#[derive(Clone, Debug)]
pub struct ProcSource {
    stat_path: PathBuf,
    meminfo_path: PathBuf,
}

impl Default for ProcSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcSource {
    pub fn new() -> Self {
        Self::with_paths(PROC_STAT, PROC_MEMINFO)
    }

    pub fn with_paths(stat_path: impl Into<PathBuf>, meminfo_path: impl Into<PathBuf>) -> Self {
        ProcSource {
            stat_path: stat_path.into(),
            meminfo_path: meminfo_path.into(),
        }
    }

    fn open(path: &Path) -> Result<BufReader<File>, SampleError> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| SampleError::unavailable(path, e))
    }
}

impl CounterSource for ProcSource {
    fn read_cpu_counters(&mut self) -> Result<CpuCounters, SampleError> {
        let mut reader = Self::open(&self.stat_path)?;
        // Only the first line (the aggregate "cpu" row) is of interest.
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| SampleError::unavailable(&self.stat_path, e))?;
        parse_cpu_line(&line)
    }

    fn read_memory_counters(&mut self) -> Result<MemoryReading, SampleError> {
        let reader = Self::open(&self.meminfo_path)?;
        let mut reading = MemoryReading::default();
        for line in reader.lines() {
            let line = line.map_err(|e| SampleError::unavailable(&self.meminfo_path, e))?;
            apply_meminfo_line(&mut reading, &line);
        }
        Ok(reading)
    }

    fn read_disk_counters(&mut self, path: &Path) -> Result<DiskReading, SampleError> {
        let space = platform::filesystem_space(path).map_err(|source| SampleError::DiskQuery {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(DiskReading {
            capacity: space.capacity,
            free: space.free,
        })
    }
}

/// Parse a `cpu user nice system idle iowait irq softirq steal ...` line.
///
/// Short lines (older kernels without `steal`) and unparseable fields read as 0.
/// Anything past `steal` is ignored.
pub fn parse_cpu_line(line: &str) -> Result<CpuCounters, SampleError> {
    let mut parts = line.split_whitespace();
    if parts.next().is_none() {
        return Err(SampleError::Parse("cpu line has no label".to_string()));
    }

    let mut fields = [0u64; 8];
    for (slot, raw) in fields.iter_mut().zip(parts) {
        *slot = raw.parse().unwrap_or(0);
    }
    let [user, nice, system, idle, iowait, irq, softirq, steal] = fields;

    Ok(CpuCounters {
        user,
        nice,
        system,
        idle,
        iowait,
        irq,
        softirq,
        steal,
    })
}

/// Parse the full contents of `/proc/meminfo`.
pub fn parse_meminfo(contents: &str) -> MemoryReading {
    let mut reading = MemoryReading::default();
    for line in contents.lines() {
        apply_meminfo_line(&mut reading, line);
    }
    reading
}

fn apply_meminfo_line(reading: &mut MemoryReading, line: &str) {
    let mut parts = line.split_whitespace();
    let (Some(key), value) = (parts.next(), parts.next()) else {
        return;
    };
    let slot = match key {
        "MemTotal:" => &mut reading.total,
        "MemFree:" => &mut reading.free,
        "MemAvailable:" => &mut reading.available,
        "Buffers:" => &mut reading.buffers,
        "Cached:" => &mut reading.cached,
        _ => return,
    };
    *slot = value.and_then(|v| v.parse().ok()).unwrap_or(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16318480 kB
MemFree:         1203944 kB
MemAvailable:    8159240 kB
Buffers:          402112 kB
Cached:          6512388 kB
SwapCached:         1024 kB
Active:          7312440 kB
HugePages_Total:       0
";

    #[test]
    fn parses_full_cpu_line() {
        let line = "cpu  4705 356 584 3699176 23060 0 277 12 0 0\n";
        let c = parse_cpu_line(line).unwrap();
        assert_eq!(
            c,
            CpuCounters {
                user: 4705,
                nice: 356,
                system: 584,
                idle: 3699176,
                iowait: 23060,
                irq: 0,
                softirq: 277,
                steal: 12,
            }
        );
        assert_eq!(c.total(), 4705 + 356 + 584 + 3699176 + 23060 + 277 + 12);
        assert_eq!(c.active(), 4705 + 356 + 584 + 277 + 12);
    }

    #[test]
    fn huge_counters_saturate_instead_of_overflowing() {
        let c = parse_cpu_line("cpu 18446744073709551615 1 0 0").unwrap();
        assert_eq!(c.user, u64::MAX);
        assert_eq!(c.total(), u64::MAX);
        assert_eq!(c.active(), u64::MAX);

        let all_max = parse_cpu_line(&format!("cpu{}", " 18446744073709551615".repeat(8))).unwrap();
        assert_eq!(all_max.total(), u64::MAX);
        assert_eq!(all_max.active(), 0);
    }

    #[test]
    fn short_cpu_line_defaults_missing_fields() {
        let c = parse_cpu_line("cpu 10 20 30 40").unwrap();
        assert_eq!(c.idle, 40);
        assert_eq!(c.iowait, 0);
        assert_eq!(c.steal, 0);
    }

    #[test]
    fn label_only_line_is_all_zero() {
        let c = parse_cpu_line("cpu").unwrap();
        assert_eq!(c, CpuCounters::default());
    }

    #[test]
    fn empty_cpu_line_is_parse_error() {
        assert!(matches!(parse_cpu_line(""), Err(SampleError::Parse(_))));
        assert!(matches!(parse_cpu_line("   \n"), Err(SampleError::Parse(_))));
    }

    #[test]
    fn non_numeric_cpu_field_reads_as_zero() {
        let c = parse_cpu_line("cpu 5 x 7").unwrap();
        assert_eq!((c.user, c.nice, c.system), (5, 0, 7));
    }

    #[test]
    fn meminfo_picks_known_keys_and_ignores_the_rest() {
        let m = parse_meminfo(MEMINFO);
        assert_eq!(
            m,
            MemoryReading {
                total: 16318480,
                free: 1203944,
                available: 8159240,
                buffers: 402112,
                cached: 6512388,
            }
        );
    }

    #[test]
    fn meminfo_missing_keys_default_to_zero() {
        let m = parse_meminfo("MemTotal: 1000 kB\nGarbage line\n\n");
        assert_eq!(m.total, 1000);
        assert_eq!(m.available, 0);
        assert!((m.used_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn memory_percent_is_zero_without_total() {
        let m = MemoryReading {
            available: 500,
            ..Default::default()
        };
        assert_eq!(m.used_percent(), 0.0);
    }

    #[test]
    fn memory_percent_from_available() {
        let m = MemoryReading {
            total: 1000,
            available: 250,
            ..Default::default()
        };
        assert!((m.used_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn disk_percent_handles_zero_capacity() {
        assert_eq!(DiskReading::default().used_percent(), 0.0);
        let d = DiskReading {
            capacity: 200,
            free: 50,
        };
        assert!((d.used_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn proc_source_reads_from_alternate_paths() {
        let dir = std::env::temp_dir().join(format!("sysmon_counters_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let stat = dir.join("stat");
        let meminfo = dir.join("meminfo");
        std::fs::write(&stat, "cpu  1 2 3 4 5 6 7 8\ncpu0 1 1 1 1 1 1 1 1\n").unwrap();
        std::fs::write(&meminfo, MEMINFO).unwrap();

        let mut source = ProcSource::with_paths(&stat, &meminfo);
        let cpu = source.read_cpu_counters().unwrap();
        assert_eq!(cpu.total(), 36);
        let mem = source.read_memory_counters().unwrap();
        assert_eq!(mem.total, 16318480);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_proc_files_are_unavailable() {
        let mut source = ProcSource::with_paths("/nonexistent/stat", "/nonexistent/meminfo");
        assert!(matches!(
            source.read_cpu_counters(),
            Err(SampleError::SourceUnavailable { .. })
        ));
        assert!(matches!(
            source.read_memory_counters(),
            Err(SampleError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn invalid_disk_path_is_disk_query_error() {
        let mut source = ProcSource::new();
        let err = source
            .read_disk_counters(Path::new("/nonexistent/sysmon/mount"))
            .unwrap_err();
        assert!(matches!(err, SampleError::DiskQuery { .. }));
    }
}
