//! Process collector for gathering per-process readings from `/proc/[pid]/`.

use crate::collector::procfs::parser::{ProcIo, parse_pid_cgroup, parse_proc_io, parse_proc_stat};
use crate::collector::traits::FileSystem;
use std::path::Path;

/// Clock ticks per second (USER_HZ). Standard value for Linux.
const CLK_TCK: f64 = 100.0;

/// Longest command string kept, ellipsis included.
pub const COMMAND_MAX_CHARS: usize = 60;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// Process disappeared during collection.
    ProcessGone(u32),
    /// I/O error reading a source file.
    Io(std::io::Error),
    /// Parse error in a source file.
    Parse(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::ProcessGone(pid) => write!(f, "process {} disappeared", pid),
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Raw per-process reading for one tick, before any delta math.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReading {
    pub pid: u32,
    pub nice: i32,
    /// Lifetime-average CPU percent, as `ps` reports it.
    pub cpu_percent: f64,
    pub rss_bytes: u64,
    pub command: String,
    /// `None` when `/proc/[pid]/io` is unreadable (other users' processes).
    pub io: Option<ProcIo>,
    /// `None` when `/proc/[pid]/fd` cannot be listed.
    pub fd_count: Option<u32>,
}

/// Collects per-process readings from `/proc/[pid]/` files.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
    page_size: u64,
}

impl<F: FileSystem> ProcessCollector<F> {
    /// Creates a new process collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            page_size: 4096,
        }
    }

    /// Collects one process. `uptime` is seconds since boot, from `/proc/uptime`.
    pub fn collect_process(&self, pid: u32, uptime: f64) -> Result<ProcessReading, CollectError> {
        let proc_dir = format!("{}/{}", self.proc_path, pid);

        let stat_content = self
            .fs
            .read_to_string(Path::new(&format!("{}/stat", proc_dir)))
            .map_err(|_| CollectError::ProcessGone(pid))?;
        let stat = parse_proc_stat(&stat_content).map_err(|e| CollectError::Parse(e.message))?;

        if stat.comm.trim().is_empty() {
            return Err(CollectError::Parse(format!("pid {} has empty comm", pid)));
        }

        let cmdline = self
            .fs
            .read_to_string(Path::new(&format!("{}/cmdline", proc_dir)))
            .unwrap_or_default()
            .replace('\0', " ")
            .trim()
            .to_string();
        let command = if cmdline.is_empty() {
            stat.comm.clone()
        } else {
            cmdline
        };

        // Optional, may fail due to permissions.
        let io = self
            .fs
            .read_to_string(Path::new(&format!("{}/io", proc_dir)))
            .ok()
            .and_then(|content| parse_proc_io(&content).ok());

        let fd_count = self
            .fs
            .read_dir(Path::new(&format!("{}/fd", proc_dir)))
            .ok()
            .map(|entries| entries.len() as u32);

        let busy = (stat.utime + stat.stime) as f64 / CLK_TCK;
        let elapsed = uptime - stat.starttime as f64 / CLK_TCK;
        let cpu_percent = if elapsed > 0.0 {
            100.0 * busy / elapsed
        } else {
            0.0
        };

        Ok(ProcessReading {
            pid: stat.pid,
            nice: stat.nice,
            cpu_percent,
            rss_bytes: (stat.rss.max(0) as u64) * self.page_size,
            command: truncate_command(&command, COMMAND_MAX_CHARS),
            io,
            fd_count,
        })
    }

    /// Collects all processes.
    ///
    /// Processes that disappear or fail to parse during collection are skipped.
    pub fn collect_all_processes(&self, uptime: f64) -> Result<Vec<ProcessReading>, CollectError> {
        let entries = self.fs.read_dir(Path::new(&self.proc_path))?;

        let mut processes = Vec::new();
        for entry in entries {
            if let Some(name) = entry.file_name().and_then(|n| n.to_str())
                && let Ok(pid) = name.parse::<u32>()
            {
                match self.collect_process(pid, uptime) {
                    Ok(reading) => processes.push(reading),
                    Err(CollectError::ProcessGone(_)) => continue,
                    Err(e) => tracing::trace!(pid, error = %e, "skipping process"),
                }
            }
        }

        Ok(processes)
    }

    /// Resolves the innermost cgroup name of a process.
    pub fn cgroup_name(&self, pid: u32) -> Option<String> {
        let path = format!("{}/{}/cgroup", self.proc_path, pid);
        let content = self.fs.read_to_string(Path::new(&path)).ok()?;
        parse_pid_cgroup(&content)
    }
}

/// Truncates to at most `max` characters, replacing the tail with `…`.
pub fn truncate_command(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_collect_single_process() {
        let fs = MockFs::typical_host();
        let collector = ProcessCollector::new(fs, "/proc");

        let p = collector.collect_process(1, 10_000.0).unwrap();
        assert_eq!(p.pid, 1);
        assert_eq!(p.command, "/sbin/init splash");
        assert_eq!(p.nice, 0);
        assert_eq!(p.fd_count, Some(4));
        assert!(p.io.is_some());
    }

    #[test]
    fn test_lifetime_cpu_percent() {
        let fs = MockFs::new();
        // utime 300 + stime 100 = 4 s busy; started at 100 s, uptime 108 s => 50%
        fs.add_process(
            42,
            "42 (worker) R 1 42 42 0 -1 0 0 0 0 0 300 100 0 0 20 0 1 0 10000 0 256 0",
            "",
            "",
            "",
            0,
        );
        let collector = ProcessCollector::new(fs, "/proc");
        let p = collector.collect_process(42, 108.0).unwrap();
        assert!((p.cpu_percent - 50.0).abs() < 1e-9);
        assert_eq!(p.rss_bytes, 256 * 4096);
        // empty cmdline falls back to comm
        assert_eq!(p.command, "worker");
        assert_eq!(p.io, None);
    }

    #[test]
    fn test_cpu_percent_zero_when_no_elapsed_time() {
        let fs = MockFs::new();
        fs.add_process(
            5,
            "5 (fresh) R 1 5 5 0 -1 0 0 0 0 0 10 10 0 0 20 0 1 0 5000 0 1 0",
            "fresh",
            "",
            "",
            0,
        );
        let collector = ProcessCollector::new(fs, "/proc");
        assert_eq!(collector.collect_process(5, 50.0).unwrap().cpu_percent, 0.0);
    }

    #[test]
    fn test_collect_process_gone() {
        let fs = MockFs::new();
        fs.add_dir("/proc/9999");
        let collector = ProcessCollector::new(fs, "/proc");
        assert!(matches!(
            collector.collect_process(9999, 1.0),
            Err(CollectError::ProcessGone(9999))
        ));
    }

    #[test]
    fn test_empty_comm_skipped() {
        let fs = MockFs::new();
        fs.add_process(
            8,
            "8 () S 1 8 8 0 -1 0 0 0 0 0 1 1 0 0 20 0 1 0 1 0 1 0",
            "",
            "",
            "",
            0,
        );
        let collector = ProcessCollector::new(fs, "/proc");
        assert!(collector.collect_all_processes(100.0).unwrap().is_empty());
    }

    #[test]
    fn test_collect_all_processes() {
        let fs = MockFs::typical_host();
        let collector = ProcessCollector::new(fs, "/proc");
        let mut pids: Vec<u32> = collector
            .collect_all_processes(10_000.0)
            .unwrap()
            .iter()
            .map(|p| p.pid)
            .collect();
        pids.sort();
        assert_eq!(pids, vec![1, 1000, 1001, 2000]);
    }

    #[test]
    fn test_cgroup_name() {
        let fs = MockFs::typical_host();
        let collector = ProcessCollector::new(fs, "/proc");
        assert_eq!(collector.cgroup_name(1000).as_deref(), Some("nginx.service"));
        assert_eq!(collector.cgroup_name(1).as_deref(), None);
        assert_eq!(collector.cgroup_name(4242), None);
    }

    #[test]
    fn test_truncate_command() {
        assert_eq!(truncate_command("short", 60), "short");
        let long = "x".repeat(80);
        let t = truncate_command(&long, 60);
        assert_eq!(t.chars().count(), 60);
        assert!(t.ends_with('…'));
        // multi-byte characters are counted, not bytes
        let wide = "é".repeat(61);
        assert_eq!(truncate_command(&wide, 60).chars().count(), 60);
    }
}
