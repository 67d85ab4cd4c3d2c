//! System collector for gathering global counters from `/proc/`.

use crate::collector::procfs::parser::{
    DiskStats, GlobalStat, LoadAvg, MemInfo, NetDevStats, parse_diskstats, parse_global_stat,
    parse_loadavg, parse_meminfo, parse_net_dev, parse_u64, parse_uptime,
};
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::FileSystem;
use crate::model::Inotify;
use std::path::Path;

/// Collects system-wide counters from `/proc/`.
///
/// Readings are raw cumulative counters; rates are derived by the sampler.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    fn read(&self, rel: &str) -> Result<String, CollectError> {
        let path = format!("{}/{}", self.proc_path, rel);
        Ok(self.fs.read_to_string(Path::new(&path))?)
    }

    /// Collects memory information from `/proc/meminfo`.
    pub fn collect_meminfo(&self) -> Result<MemInfo, CollectError> {
        parse_meminfo(&self.read("meminfo")?).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects load average from `/proc/loadavg`.
    pub fn collect_loadavg(&self) -> Result<LoadAvg, CollectError> {
        parse_loadavg(&self.read("loadavg")?).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects aggregate and per-core CPU jiffies from `/proc/stat`.
    pub fn collect_cpu(&self) -> Result<GlobalStat, CollectError> {
        parse_global_stat(&self.read("stat")?).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects seconds since boot from `/proc/uptime`.
    pub fn collect_uptime(&self) -> Result<f64, CollectError> {
        parse_uptime(&self.read("uptime")?).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects disk counters from `/proc/diskstats`.
    pub fn collect_diskstats(&self) -> Result<Vec<DiskStats>, CollectError> {
        parse_diskstats(&self.read("diskstats")?).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects interface counters from `/proc/net/dev`.
    pub fn collect_net_dev(&self) -> Result<Vec<NetDevStats>, CollectError> {
        parse_net_dev(&self.read("net/dev")?).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects inotify limits and usage from `/proc/sys/fs/inotify/`.
    ///
    /// Each value is read independently; unreadable ones are 0.
    pub fn collect_inotify(&self) -> Inotify {
        let read = |name: &str| -> u64 {
            self.read(&format!("sys/fs/inotify/{}", name))
                .ok()
                .and_then(|s| parse_u64(&s).ok())
                .unwrap_or(0)
        };
        Inotify {
            max_user_watches: read("max_user_watches"),
            max_user_instances: read("max_user_instances"),
            nr_watches: read("nr_watches"),
        }
    }
}
