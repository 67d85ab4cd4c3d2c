//! Delta-to-rate conversions.
//!
//! All functions are total: counter regressions, zero intervals and
//! non-finite intermediates yield 0 instead of negative or NaN rates.

use crate::collector::procfs::parser::CpuStat;

const MIB: f64 = 1024.0 * 1024.0;
const KIB: f64 = 1024.0;

/// Block devices that never represent physical I/O.
const VIRTUAL_DISK_PREFIXES: [&str; 5] = ["loop", "ram", "zram", "fd", "sr"];
/// Interfaces excluded from network totals.
const VIRTUAL_IFACE_PREFIXES: [&str; 5] = ["lo", "veth", "docker", "br-", "virbr"];

pub fn finite(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Busy percentage between two jiffy readings, clamped to 0-100.
/// No progress in total jiffies means 0.
pub fn cpu_percent(prev: &CpuStat, cur: &CpuStat) -> f64 {
    let total = cur.total().saturating_sub(prev.total());
    if total == 0 {
        return 0.0;
    }
    let idle = cur.idle_all().saturating_sub(prev.idle_all());
    let busy = 100.0 * (1.0 - idle as f64 / total as f64);
    finite(busy).clamp(0.0, 100.0)
}

/// Counter increase, 0 on regression (reset or wrap).
pub fn counter_delta(prev: u64, cur: u64) -> u64 {
    cur.saturating_sub(prev)
}

fn per_second(delta: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    finite(delta as f64 / secs)
}

/// MiB per second.
pub fn mb_per_sec(prev: u64, cur: u64, secs: f64) -> f64 {
    per_second(counter_delta(prev, cur), secs) / MIB
}

/// KiB per second.
pub fn kb_per_sec(prev: u64, cur: u64, secs: f64) -> f64 {
    per_second(counter_delta(prev, cur), secs) / KIB
}

/// Megabits per second (decimal, as network links are rated).
pub fn mbit_per_sec(prev: u64, cur: u64, secs: f64) -> f64 {
    per_second(counter_delta(prev, cur), secs) * 8.0 / 1e6
}

pub fn is_virtual_disk(name: &str) -> bool {
    VIRTUAL_DISK_PREFIXES.iter().any(|p| name.starts_with(p))
}

pub fn is_virtual_iface(name: &str) -> bool {
    VIRTUAL_IFACE_PREFIXES.iter().any(|p| name.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu(busy: u64, idle: u64) -> CpuStat {
        CpuStat {
            user: busy,
            idle,
            ..CpuStat::default()
        }
    }

    #[test]
    fn test_cpu_percent() {
        let prev = cpu(100, 900);
        let cur = cpu(150, 950);
        assert!((cpu_percent(&prev, &cur) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_percent_no_progress_is_zero() {
        let s = cpu(100, 900);
        assert_eq!(cpu_percent(&s, &s), 0.0);
    }

    #[test]
    fn test_cpu_percent_counter_reset_clamped() {
        // idle went backwards while total moved: still within 0..=100
        let prev = cpu(100, 900);
        let cur = cpu(300, 800);
        let pct = cpu_percent(&prev, &cur);
        assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn test_disk_read_rate_scenario() {
        // 1,000,000 -> 3,000,000 bytes over one second
        let rate = mb_per_sec(1_000_000, 3_000_000, 1.0);
        assert!((rate - 1.907).abs() < 0.001, "rate = {}", rate);
        assert!((rate - 1.91).abs() < 0.01);
    }

    #[test]
    fn test_rates_zero_on_regression_or_zero_interval() {
        assert_eq!(mb_per_sec(5, 1, 1.0), 0.0);
        assert_eq!(kb_per_sec(1, 5000, 0.0), 0.0);
    }

    #[test]
    fn test_kb_and_mbit() {
        assert_eq!(kb_per_sec(0, 2048, 2.0), 1.0);
        assert_eq!(mbit_per_sec(0, 1_000_000, 1.0), 8.0);
    }

    #[test]
    fn test_device_filters() {
        assert!(is_virtual_disk("loop3"));
        assert!(is_virtual_disk("zram0"));
        assert!(is_virtual_disk("sr0"));
        assert!(!is_virtual_disk("sda"));
        assert!(!is_virtual_disk("nvme0n1"));
        assert!(is_virtual_iface("lo"));
        assert!(is_virtual_iface("br-3f2a"));
        assert!(is_virtual_iface("virbr0"));
        assert!(!is_virtual_iface("eth0"));
        assert!(!is_virtual_iface("wlp3s0"));
    }
}
