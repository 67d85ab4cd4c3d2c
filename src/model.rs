//! Snapshot value types shared by the sampler, the dashboard and the JSON export.
//!
//! Field names on the wire are part of the export contract that external
//! NDJSON consumers parse, so every struct carries explicit serde renames.
//! Lists always serialize as arrays; an empty `gpus` list means "no GPU
//! visible", not an error.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in [`Sample::top`].
pub const TOP_CAP: usize = 64;
/// Maximum number of entries kept in [`Sample::throttled`].
pub const THROTTLED_CAP: usize = 32;
/// Maximum number of entries kept in [`Sample::cgroups`].
pub const CGROUP_CAP: usize = 16;

/// Aggregate and per-core CPU usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cpu {
    /// Percent, 0-100.
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "PerCore", default)]
    pub per_core: Vec<f64>,
    #[serde(rename = "Load1")]
    pub load1: f64,
    #[serde(rename = "Load5")]
    pub load5: f64,
    #[serde(rename = "Load15")]
    pub load15: f64,
}

/// RAM and swap usage in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(rename = "UsedBytes")]
    pub used_bytes: u64,
    #[serde(rename = "TotalBytes")]
    pub total_bytes: u64,
    #[serde(rename = "SwapUsed")]
    pub swap_used: u64,
    #[serde(rename = "SwapTotal")]
    pub swap_total: u64,
    #[serde(rename = "Cached")]
    pub cached: u64,
    #[serde(rename = "Buffers")]
    pub buffers: u64,
}

impl Memory {
    /// Used memory as a percentage of total, 0 when total is unknown.
    pub fn used_percent(&self) -> f64 {
        percent_of(self.used_bytes, self.total_bytes)
    }

    /// Used swap as a percentage of total swap, 0 when there is no swap.
    pub fn swap_percent(&self) -> f64 {
        percent_of(self.swap_used, self.swap_total)
    }
}

/// Disk and network throughput.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Io {
    #[serde(rename = "DiskReadMBs")]
    pub disk_read_mbs: f64,
    #[serde(rename = "DiskWriteMBs")]
    pub disk_write_mbs: f64,
    #[serde(rename = "NetRxMbps")]
    pub net_rx_mbps: f64,
    #[serde(rename = "NetTxMbps")]
    pub net_tx_mbps: f64,
    #[serde(rename = "PerDevice", default)]
    pub per_device: Vec<IoDevice>,
}

/// Per block device throughput.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoDevice {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ReadMBs")]
    pub read_mbs: f64,
    #[serde(rename = "WriteMBs")]
    pub write_mbs: f64,
}

/// One GPU as reported by the vendor probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gpu {
    #[serde(rename = "Name")]
    pub name: String,
    /// Utilization percent.
    #[serde(rename = "Util")]
    pub util: f64,
    #[serde(rename = "MemUsedMB")]
    pub mem_used_mb: f64,
    #[serde(rename = "MemTotalMB")]
    pub mem_total_mb: f64,
    #[serde(rename = "TempC")]
    pub temp_c: f64,
}

/// Power supply state. `percent == 0` means no battery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    #[serde(rename = "Percent")]
    pub percent: f64,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "SecondsRemaining")]
    pub seconds_remaining: i64,
}

impl Battery {
    pub fn is_present(&self) -> bool {
        self.percent > 0.0
    }
}

/// One row of the process tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "PID")]
    pub pid: u32,
    #[serde(rename = "Nice")]
    pub nice: i32,
    #[serde(rename = "CPU")]
    pub cpu: f64,
    #[serde(rename = "Memory")]
    pub memory: f64,
    #[serde(rename = "Command")]
    pub command: String,
    #[serde(rename = "FDCount")]
    pub fd_count: u32,
    #[serde(rename = "ReadKBs")]
    pub read_kbs: f64,
    #[serde(rename = "WriteKBs")]
    pub write_kbs: f64,
    #[serde(rename = "FDDiff")]
    pub fd_diff: i64,
}

impl Process {
    /// True when the scheduler priority was lowered (positive niceness).
    pub fn is_throttled(&self) -> bool {
        self.nice > 0
    }

    /// Combined read and write rate in KB/s.
    pub fn io_kbs(&self) -> f64 {
        self.read_kbs + self.write_kbs
    }

    /// Short command name used as the key for per-command statistics:
    /// first whitespace-separated token, reduced to its basename when it is
    /// an absolute path. Kernel thread names like `kworker/0:1` stay intact.
    pub fn command_name(&self) -> &str {
        let first = self.command.split_whitespace().next().unwrap_or("");
        if first.starts_with('/') {
            first.rsplit('/').next().unwrap_or(first)
        } else {
            first
        }
    }
}

/// Process ordering. Every key sorts descending; ties go to the lower PID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Cpu,
    Memory,
    Io,
    Fd,
}

impl SortKey {
    /// Next key in the cycle CPU -> Memory -> IO -> FD -> CPU.
    pub fn next(self) -> Self {
        match self {
            SortKey::Cpu => SortKey::Memory,
            SortKey::Memory => SortKey::Io,
            SortKey::Io => SortKey::Fd,
            SortKey::Fd => SortKey::Cpu,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortKey::Cpu => "CPU",
            SortKey::Memory => "MEM",
            SortKey::Io => "IO",
            SortKey::Fd => "FD",
        }
    }

    fn value(self, p: &Process) -> f64 {
        match self {
            SortKey::Cpu => p.cpu,
            SortKey::Memory => p.memory,
            SortKey::Io => p.io_kbs(),
            SortKey::Fd => f64::from(p.fd_count),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(SortKey::Cpu),
            "mem" | "memory" => Ok(SortKey::Memory),
            "io" => Ok(SortKey::Io),
            "fd" | "fds" => Ok(SortKey::Fd),
            other => Err(format!(
                "unknown sort key {:?} (expected cpu, mem, io or fd)",
                other
            )),
        }
    }
}

/// Sorts in place by `key`, descending, ties by ascending PID. Stable and
/// idempotent.
pub fn sort_processes(procs: &mut [Process], key: SortKey) {
    procs.sort_by(|a, b| {
        key.value(b)
            .total_cmp(&key.value(a))
            .then_with(|| a.pid.cmp(&b.pid))
    });
}

/// CPU attributed to one cgroup (innermost path segment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cgroup {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CPU")]
    pub cpu: f64,
}

/// Inotify limits and current usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inotify {
    #[serde(rename = "MaxUserWatches")]
    pub max_user_watches: u64,
    #[serde(rename = "MaxUserInstances")]
    pub max_user_instances: u64,
    #[serde(rename = "NrWatches")]
    pub nr_watches: u64,
}

impl Inotify {
    pub fn watch_percent(&self) -> f64 {
        percent_of(self.nr_watches, self.max_user_watches)
    }
}

/// Thermal sensor reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Temp {
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Temp")]
    pub temp: f64,
}

/// Full snapshot for one tick. Immutable once the sampler hands it out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Sampling interval, serialized as integer nanoseconds.
    #[serde(rename = "Interval", with = "duration_nanos")]
    pub interval: Duration,
    #[serde(rename = "CPU")]
    pub cpu: Cpu,
    #[serde(rename = "Memory")]
    pub memory: Memory,
    #[serde(rename = "IO")]
    pub io: Io,
    #[serde(rename = "GPUs", default)]
    pub gpus: Vec<Gpu>,
    #[serde(rename = "Battery")]
    pub battery: Battery,
    #[serde(rename = "Top", default)]
    pub top: Vec<Process>,
    #[serde(rename = "Throttled", default)]
    pub throttled: Vec<Process>,
    #[serde(rename = "Cgroups", default)]
    pub cgroups: Vec<Cgroup>,
    #[serde(rename = "Inotify")]
    pub inotify: Inotify,
    #[serde(rename = "Temps", default)]
    pub temps: Vec<Temp>,
}

impl Sample {
    /// Empty sample stamped with the current time, used before the first tick.
    pub fn zero() -> Self {
        Self {
            timestamp: Utc::now(),
            ..Self::default()
        }
    }

    /// Highest thermal reading across GPUs and thermal zones.
    pub fn max_temp(&self) -> Option<f64> {
        self.temps
            .iter()
            .map(|t| t.temp)
            .chain(self.gpus.iter().map(|g| g.temp_c))
            .reduce(f64::max)
    }
}

fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 * 100.0 / total as f64
}

/// Serializes a `Duration` as integer nanoseconds.
mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let nanos = i64::deserialize(d)?;
        Ok(Duration::from_nanos(nanos.max(0) as u64))
    }
}
