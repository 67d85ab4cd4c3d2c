//! Periodic producer of [`Sample`]s.
//!
//! A [`Sampler`] owns every delta baseline (CPU jiffies, disk/net byte
//! counters, per-PID I/O and fd counts), so independent samplers never
//! interfere. [`Sampler::sample`] reads the host once; [`Sampler::stream`]
//! runs the fast tick and the slow GPU/battery/thermal probe on two threads
//! and delivers samples over a bounded channel.
//!
//! Any source that fails degrades only its own field to zero/empty. A tick
//! never fails as a whole.

pub mod cancel;
pub mod cgroup;
pub mod rates;
pub mod slow;

use crate::collector::command::{CommandRunner, SystemCommands};
use crate::collector::procfs::parser::{CpuStat, ProcIo};
use crate::collector::procfs::{CollectError, ProcessCollector, SystemCollector};
use crate::collector::traits::{FileSystem, RealFs};
use crate::config::Config;
use crate::model::{
    CGROUP_CAP, Cgroup, Cpu, Io, IoDevice, Memory, Process, Sample, SortKey, THROTTLED_CAP,
    TOP_CAP, sort_processes,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub use cancel::CancelToken;
pub use cgroup::{CGROUP_CACHE_TICKS, CgroupCache};
pub use slow::{SLOW_PROBE_INTERVAL, SlowProbe, SlowReading};

/// Interval used when the configured one is zero.
pub const FALLBACK_INTERVAL: Duration = Duration::from_secs(1);

/// Previous-tick counters used to turn cumulative values into rates.
#[derive(Debug, Default)]
struct Baselines {
    cpu_total: Option<CpuStat>,
    cores: Vec<CpuStat>,
    /// Device name -> (read bytes, write bytes).
    disks: HashMap<String, (u64, u64)>,
    /// Interface name -> (rx bytes, tx bytes).
    nets: HashMap<String, (u64, u64)>,
    proc_io: HashMap<u32, ProcIo>,
    proc_fd: HashMap<u32, u32>,
}

/// Reads the host and produces one [`Sample`] per call.
pub struct Sampler<F: FileSystem + Clone + 'static = RealFs> {
    interval: Duration,
    system: SystemCollector<F>,
    processes: ProcessCollector<F>,
    slow: Arc<SlowProbe<F>>,
    baselines: Baselines,
    cgroups: CgroupCache,
}

impl Sampler<RealFs> {
    /// Sampler over the real `/proc` and `/sys` trees named in `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_sources(RealFs::new(), Arc::new(SystemCommands), config)
    }
}

impl<F: FileSystem + Clone + 'static> Sampler<F> {
    /// Sampler over arbitrary sources. A zero interval is treated as one second.
    pub fn with_sources(fs: F, runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        let interval = if config.interval.is_zero() {
            FALLBACK_INTERVAL
        } else {
            config.interval
        };
        Self {
            interval,
            system: SystemCollector::new(fs.clone(), config.proc_path.clone()),
            processes: ProcessCollector::new(fs.clone(), config.proc_path.clone()),
            slow: Arc::new(SlowProbe::new(
                fs,
                runner,
                config.sys_path.clone(),
                config.gpu,
                config.battery,
            )),
            baselines: Baselines::default(),
            cgroups: CgroupCache::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs the slow probes synchronously (one-shot mode has no probe thread).
    pub fn refresh_slow(&self) {
        self.slow.refresh();
    }

    /// Takes one sample. The first call has no baselines, so every rate and
    /// CPU percentage in it is 0.
    pub fn sample(&mut self) -> Sample {
        let secs = self.interval.as_secs_f64();

        let cpu = self.sample_cpu();
        let mem = degrade("meminfo", self.system.collect_meminfo());
        let memory = Memory {
            used_bytes: mem.used_kb() * 1024,
            total_bytes: mem.mem_total * 1024,
            swap_used: mem.swap_used_kb() * 1024,
            swap_total: mem.swap_total * 1024,
            cached: mem.cached * 1024,
            buffers: mem.buffers * 1024,
        };
        let io = self.sample_io(secs);

        if self.cgroups.tick() {
            debug!("cgroup cache invalidated");
        }
        let (top, throttled, cgroups) = self.sample_processes(secs, memory.total_bytes);

        let slow = self.slow.latest();

        Sample {
            timestamp: Utc::now(),
            interval: self.interval,
            cpu,
            memory,
            io,
            gpus: slow.gpus,
            battery: slow.battery,
            top,
            throttled,
            cgroups,
            inotify: self.system.collect_inotify(),
            temps: slow.temps,
        }
    }

    fn sample_cpu(&mut self) -> Cpu {
        let load = degrade("loadavg", self.system.collect_loadavg());
        let Some(stat) = optional("stat", self.system.collect_cpu()) else {
            return Cpu {
                load1: load.load1,
                load5: load.load5,
                load15: load.load15,
                ..Cpu::default()
            };
        };

        let total = self
            .baselines
            .cpu_total
            .as_ref()
            .map(|prev| rates::cpu_percent(prev, &stat.total))
            .unwrap_or(0.0);
        let per_core = stat
            .cores
            .iter()
            .enumerate()
            .map(|(i, cur)| {
                self.baselines
                    .cores
                    .get(i)
                    .map(|prev| rates::cpu_percent(prev, cur))
                    .unwrap_or(0.0)
            })
            .collect();

        self.baselines.cpu_total = Some(stat.total);
        self.baselines.cores = stat.cores;

        Cpu {
            total,
            per_core,
            load1: load.load1,
            load5: load.load5,
            load15: load.load15,
        }
    }

    fn sample_io(&mut self, secs: f64) -> Io {
        let mut io = Io::default();

        if let Some(disks) = optional("diskstats", self.system.collect_diskstats()) {
            let mut seen = HashMap::with_capacity(disks.len());
            let (mut read_total, mut write_total) = (0u64, 0u64);
            for disk in disks {
                if rates::is_virtual_disk(&disk.device) {
                    continue;
                }
                let read = disk.read_sectors.saturating_mul(512);
                let write = disk.write_sectors.saturating_mul(512);
                if let Some(&(prev_read, prev_write)) = self.baselines.disks.get(&disk.device) {
                    read_total += rates::counter_delta(prev_read, read);
                    write_total += rates::counter_delta(prev_write, write);
                    io.per_device.push(IoDevice {
                        name: disk.device.clone(),
                        read_mbs: rates::mb_per_sec(prev_read, read, secs),
                        write_mbs: rates::mb_per_sec(prev_write, write, secs),
                    });
                }
                seen.insert(disk.device, (read, write));
            }
            io.disk_read_mbs = rates::mb_per_sec(0, read_total, secs);
            io.disk_write_mbs = rates::mb_per_sec(0, write_total, secs);
            io.per_device.sort_by(|a, b| a.name.cmp(&b.name));
            self.baselines.disks = seen;
        }

        if let Some(ifaces) = optional("net/dev", self.system.collect_net_dev()) {
            let mut seen = HashMap::with_capacity(ifaces.len());
            let (mut rx_total, mut tx_total) = (0u64, 0u64);
            for iface in ifaces {
                if rates::is_virtual_iface(&iface.interface) {
                    continue;
                }
                if let Some(&(prev_rx, prev_tx)) = self.baselines.nets.get(&iface.interface) {
                    rx_total += rates::counter_delta(prev_rx, iface.rx_bytes);
                    tx_total += rates::counter_delta(prev_tx, iface.tx_bytes);
                }
                seen.insert(iface.interface, (iface.rx_bytes, iface.tx_bytes));
            }
            io.net_rx_mbps = rates::mbit_per_sec(0, rx_total, secs);
            io.net_tx_mbps = rates::mbit_per_sec(0, tx_total, secs);
            self.baselines.nets = seen;
        }

        io
    }

    fn sample_processes(
        &mut self,
        secs: f64,
        mem_total_bytes: u64,
    ) -> (Vec<Process>, Vec<Process>, Vec<Cgroup>) {
        let uptime = degrade("uptime", self.system.collect_uptime());
        let readings = degrade("processes", self.processes.collect_all_processes(uptime));

        let mut all = Vec::with_capacity(readings.len());
        let mut cgroup_cpu: HashMap<String, f64> = HashMap::new();
        let mut next_io = HashMap::with_capacity(readings.len());
        let mut next_fd = HashMap::with_capacity(readings.len());

        for r in readings {
            let (read_kbs, write_kbs) = match (r.io, self.baselines.proc_io.get(&r.pid)) {
                (Some(cur), Some(prev)) => (
                    rates::kb_per_sec(prev.read_bytes, cur.read_bytes, secs),
                    rates::kb_per_sec(prev.write_bytes, cur.write_bytes, secs),
                ),
                _ => (0.0, 0.0),
            };
            if let Some(cur) = r.io {
                next_io.insert(r.pid, cur);
            }

            let fd_count = r.fd_count.unwrap_or(0);
            let fd_diff = match (r.fd_count, self.baselines.proc_fd.get(&r.pid)) {
                (Some(cur), Some(&prev)) => i64::from(cur) - i64::from(prev),
                _ => 0,
            };
            if let Some(cur) = r.fd_count {
                next_fd.insert(r.pid, cur);
            }

            let memory = if mem_total_bytes > 0 {
                rates::finite(r.rss_bytes as f64 * 100.0 / mem_total_bytes as f64)
            } else {
                0.0
            };
            let cpu = rates::finite(r.cpu_percent);

            let processes = &self.processes;
            if let Some(name) = self.cgroups.resolve(r.pid, || processes.cgroup_name(r.pid)) {
                *cgroup_cpu.entry(name).or_insert(0.0) += cpu;
            }

            all.push(Process {
                pid: r.pid,
                nice: r.nice,
                cpu,
                memory,
                command: r.command,
                fd_count,
                read_kbs,
                write_kbs,
                fd_diff,
            });
        }

        self.baselines.proc_io = next_io;
        self.baselines.proc_fd = next_fd;

        let (top, throttled) = select_top(all);

        let mut cgroups: Vec<Cgroup> = cgroup_cpu
            .into_iter()
            .map(|(name, cpu)| Cgroup { name, cpu })
            .collect();
        cgroups.sort_by(|a, b| b.cpu.total_cmp(&a.cpu).then_with(|| a.name.cmp(&b.name)));
        cgroups.truncate(CGROUP_CAP);

        trace!(
            top = top.len(),
            throttled = throttled.len(),
            cgroups = cgroups.len(),
            "processes sampled"
        );
        (top, throttled, cgroups)
    }

    /// Starts the fast tick and slow probe threads.
    ///
    /// Each fast tick hands its sample to a one-slot channel with `try_send`;
    /// when the consumer has not taken the previous one, the new sample is
    /// dropped. Cancelling `token` (or dropping the returned stream) stops
    /// both threads and closes the channel.
    pub fn stream(mut self, token: CancelToken) -> SampleStream
    where
        F: Send + Sync,
    {
        let (tx, rx) = mpsc::sync_channel(1);

        let slow = Arc::clone(&self.slow);
        let slow_token = token.clone();
        let slow_handle = thread::Builder::new()
            .name("sysmoni-slow".to_string())
            .spawn(move || {
                loop {
                    slow.refresh();
                    if slow_token.wait_timeout(SLOW_PROBE_INTERVAL) {
                        break;
                    }
                }
                debug!("slow probe stopped");
            });

        let fast_token = token.clone();
        let fast_handle = thread::Builder::new()
            .name("sysmoni-sampler".to_string())
            .spawn(move || {
                let interval = self.interval;
                run_ticks(&fast_token, interval, || deliver(&tx, self.sample()));
                debug!("sampler stopped");
            });

        let mut handles = Vec::with_capacity(2);
        for handle in [slow_handle, fast_handle] {
            match handle {
                Ok(h) => handles.push(h),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to spawn sampler thread");
                    token.cancel();
                }
            }
        }

        SampleStream {
            rx,
            token,
            handles,
        }
    }
}

/// Sleeps `interval` between calls to `tick` until cancelled. The schedule
/// is anchored to the start time so slow ticks do not accumulate drift.
fn run_ticks(token: &CancelToken, interval: Duration, mut tick: impl FnMut() -> bool) {
    let mut next = Instant::now() + interval;
    loop {
        let wait = next.saturating_duration_since(Instant::now());
        if token.wait_timeout(wait) {
            return;
        }
        if !tick() {
            return;
        }
        next += interval;
        let now = Instant::now();
        if next < now {
            next = now + interval;
        }
    }
}

/// Offers a sample to the consumer. Returns `false` once the receiver is gone.
fn deliver(tx: &SyncSender<Sample>, sample: Sample) -> bool {
    match tx.try_send(sample) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            trace!("consumer busy, sample dropped");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

/// Sorts by CPU and applies the caps. `Throttled` is taken from the capped
/// `Top`, so it is always exactly its positive-niceness subset.
pub fn select_top(mut all: Vec<Process>) -> (Vec<Process>, Vec<Process>) {
    sort_processes(&mut all, SortKey::Cpu);
    all.truncate(TOP_CAP);
    let throttled = all
        .iter()
        .filter(|p| p.is_throttled())
        .take(THROTTLED_CAP)
        .cloned()
        .collect();
    (all, throttled)
}

fn optional<T>(source: &str, result: Result<T, CollectError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(source, error = %e, "source unavailable");
            None
        }
    }
}

fn degrade<T: Default>(source: &str, result: Result<T, CollectError>) -> T {
    optional(source, result).unwrap_or_default()
}

/// Receiving end of [`Sampler::stream`].
///
/// Dropping it cancels the token and joins both sampler threads.
pub struct SampleStream {
    rx: Receiver<Sample>,
    token: CancelToken,
    handles: Vec<JoinHandle<()>>,
}

impl SampleStream {
    /// Non-blocking receive. `Err(Disconnected)` once the sampler stopped.
    pub fn try_recv(&self) -> Result<Sample, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Sample, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Blocks until the next sample; `None` after cancellation.
    pub fn recv(&self) -> Option<Sample> {
        self.rx.recv().ok()
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Iterator for SampleStream {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        self.recv()
    }
}

impl Drop for SampleStream {
    fn drop(&mut self) {
        self.token.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
