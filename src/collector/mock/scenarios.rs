//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` and `/sys` states
//! for testing various system conditions.

use super::filesystem::MockFs;

/// Builds a `/proc/[pid]/stat` line with the fields the collector reads.
///
/// Field order after `(comm)`: state ppid pgrp session tty_nr tpgid flags
/// minflt cminflt majflt cmajflt utime stime cutime cstime priority nice
/// num_threads itrealvalue starttime vsize rss ...
#[allow(clippy::too_many_arguments)]
pub fn stat_line(
    pid: u32,
    comm: &str,
    state: char,
    utime: u64,
    stime: u64,
    nice: i32,
    starttime: u64,
    rss_pages: u64,
) -> String {
    format!(
        "{pid} ({comm}) {state} 1 {pid} {pid} 0 -1 4194560 100 0 0 0 {utime} {stime} 0 0 {prio} {nice} 1 0 {starttime} 104857600 {rss_pages} 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0",
        prio = 20 + nice,
    )
}

/// Builds `/proc/[pid]/io` content.
pub fn io_content(read_bytes: u64, write_bytes: u64) -> String {
    format!(
        "rchar: {r}\nwchar: {w}\nsyscr: 10\nsyscw: 10\nread_bytes: {r}\nwrite_bytes: {w}\ncancelled_write_bytes: 0\n",
        r = read_bytes,
        w = write_bytes,
    )
}

/// Builds one `/proc/diskstats` line.
pub fn diskstats_line(
    major: u32,
    minor: u32,
    device: &str,
    read_sectors: u64,
    write_sectors: u64,
) -> String {
    format!(
        "{major:>4} {minor:>7} {device} 1000 10 {read_sectors} 300 500 5 {write_sectors} 200 0 400 500 0 0 0 0\n"
    )
}

/// Builds one `/proc/net/dev` interface line.
pub fn net_dev_line(iface: &str, rx_bytes: u64, tx_bytes: u64) -> String {
    format!("{iface:>6}: {rx_bytes} 100 0 0 0 0 0 0 {tx_bytes} 100 0 0 0 0 0 0\n")
}

/// `/proc/net/dev` header lines.
pub const NET_DEV_HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

impl MockFs {
    /// Creates a typical laptop-class host.
    ///
    /// Includes four cores, a SATA disk, an NVMe disk, loop and optical
    /// devices that must be filtered, one physical NIC plus virtual ones,
    /// inotify limits, a battery and two thermal zones. No GPU is visible.
    ///
    /// Processes (uptime 10000 s):
    /// - PID 1 `/sbin/init splash`, root cgroup, ~0.08% CPU
    /// - PID 1000 nginx master in `nginx.service`, ~0.32% CPU
    /// - PID 1001 nginx worker in `nginx.service`, ~5.32% CPU
    /// - PID 2000 `rustc` at nice 10 in `session-2.scope`, 100% CPU
    pub fn typical_host() -> Self {
        let fs = Self::new();

        fs.add_file("/proc/uptime", "10000.00 38000.00\n");
        fs.add_file("/proc/loadavg", "0.50 0.40 0.30 2/300 4242\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16000000 kB
MemFree:         4000000 kB
MemAvailable:    8000000 kB
Buffers:          200000 kB
Cached:          3000000 kB
SwapCached:         1000 kB
SwapTotal:       2000000 kB
SwapFree:        1500000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0
ctxt 500000
btime 1700000000
",
        );

        let mut disks = String::new();
        disks.push_str(&diskstats_line(8, 0, "sda", 2000, 4000));
        disks.push_str(&diskstats_line(259, 0, "nvme0n1", 10000, 20000));
        disks.push_str(&diskstats_line(7, 0, "loop0", 500, 0));
        disks.push_str(&diskstats_line(11, 0, "sr0", 10, 0));
        fs.add_file("/proc/diskstats", disks);

        let mut net = String::from(NET_DEV_HEADER);
        net.push_str(&net_dev_line("lo", 5_000_000, 5_000_000));
        net.push_str(&net_dev_line("eth0", 100_000_000, 20_000_000));
        net.push_str(&net_dev_line("veth1a2b", 1_000, 1_000));
        net.push_str(&net_dev_line("docker0", 1_000, 1_000));
        fs.add_file("/proc/net/dev", net);

        fs.add_file("/proc/sys/fs/inotify/max_user_watches", "65536\n");
        fs.add_file("/proc/sys/fs/inotify/max_user_instances", "128\n");
        fs.add_file("/proc/sys/fs/inotify/nr_watches", "1024\n");

        fs.add_process(
            1,
            &stat_line(1, "systemd", 'S', 500, 300, 0, 100, 2000),
            "/sbin/init\0splash\0",
            &io_content(1_000_000, 500_000),
            "0::/\n",
            4,
        );
        fs.add_process(
            1000,
            &stat_line(1000, "nginx", 'S', 2000, 1000, 0, 50_000, 5000),
            "nginx: master process /usr/sbin/nginx\0",
            &io_content(10_000_000, 2_000_000),
            "0::/system.slice/nginx.service\n",
            12,
        );
        fs.add_process(
            1001,
            &stat_line(1001, "nginx", 'S', 40_000, 10_000, 0, 60_000, 25_000),
            "nginx: worker process\0",
            &io_content(50_000_000, 8_000_000),
            "0::/system.slice/nginx.service\n",
            30,
        );
        fs.add_process(
            2000,
            &stat_line(2000, "rustc", 'R', 450_000, 50_000, 10, 500_000, 250_000),
            "/usr/bin/rustc\0--edition\02024\0src/main.rs\0",
            &io_content(200_000_000, 90_000_000),
            "0::/user.slice/user-1000.slice/session-2.scope\n",
            8,
        );

        fs.add_file("/sys/class/power_supply/BAT0/capacity", "87\n");
        fs.add_file("/sys/class/power_supply/BAT0/status", "Discharging\n");
        fs.add_file("/sys/class/power_supply/BAT0/energy_now", "40000000\n");
        fs.add_file("/sys/class/power_supply/BAT0/power_now", "10000000\n");
        fs.add_file("/sys/class/power_supply/AC/online", "0\n");

        fs.add_file("/sys/class/thermal/thermal_zone0/temp", "45000\n");
        fs.add_file("/sys/class/thermal/thermal_zone0/type", "x86_pkg_temp\n");
        fs.add_file("/sys/class/thermal/thermal_zone1/temp", "38500\n");

        fs
    }

    /// `typical_host()` plus an AMD GPU exposed through sysfs.
    pub fn with_amd_gpu() -> Self {
        let fs = Self::typical_host();
        let dev = "/sys/class/drm/card0/device";
        fs.add_file(format!("{dev}/gpu_busy_percent"), "37\n");
        fs.add_file(format!("{dev}/mem_info_vram_used"), "1073741824\n");
        fs.add_file(format!("{dev}/mem_info_vram_total"), "8589934592\n");
        fs.add_file(format!("{dev}/hwmon/hwmon3/temp1_input"), "61000\n");
        fs.add_file("/sys/class/drm/card0-DP-1/status", "connected\n");
        fs
    }

    /// A host under pressure: hot CPU package, nearly exhausted memory and
    /// heavy swapping.
    pub fn overloaded_host() -> Self {
        let fs = Self::typical_host();
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16000000 kB
MemFree:          100000 kB
MemAvailable:     400000 kB
Buffers:           10000 kB
Cached:           200000 kB
SwapTotal:       2000000 kB
SwapFree:         200000 kB
",
        );
        fs.add_file("/sys/class/thermal/thermal_zone0/temp", "97000\n");
        fs
    }
}

#[cfg(test)]
mod tests {
    use crate::collector::mock::MockFs;
    use crate::collector::procfs::parser::{parse_diskstats, parse_net_dev, parse_proc_stat};
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    #[test]
    fn test_stat_line_roundtrips_through_parser() {
        let line = super::stat_line(2000, "rustc", 'R', 450_000, 50_000, 10, 500_000, 250_000);
        let stat = parse_proc_stat(&line).unwrap();
        assert_eq!(stat.pid, 2000);
        assert_eq!(stat.utime, 450_000);
        assert_eq!(stat.stime, 50_000);
        assert_eq!(stat.nice, 10);
        assert_eq!(stat.starttime, 500_000);
        assert_eq!(stat.rss, 250_000);
    }

    #[test]
    fn test_typical_host_files_parse() {
        let fs = MockFs::typical_host();
        let diskstats = fs.read_to_string(Path::new("/proc/diskstats")).unwrap();
        let disks = parse_diskstats(&diskstats).unwrap();
        assert_eq!(disks.len(), 4);
        let net = parse_net_dev(&fs.read_to_string(Path::new("/proc/net/dev")).unwrap()).unwrap();
        assert_eq!(net.len(), 4);
        assert_eq!(net[1].interface, "eth0");
    }

    #[test]
    fn test_amd_gpu_scenario_extends_typical() {
        let fs = MockFs::with_amd_gpu();
        assert!(fs.exists(Path::new("/proc/2000/stat")));
        assert!(fs.exists(Path::new("/sys/class/drm/card0/device/gpu_busy_percent")));
    }
}
