//! Session history derived from consumed samples.
//!
//! Everything here is accumulated by the dashboard across ticks and never
//! leaves the process: bounded sparkline buffers plus per-command counters
//! for the Analysis view.

use std::collections::{HashMap, VecDeque};

use crate::model::Sample;

/// Fixed-capacity FIFO buffer. Pushing into a full buffer evicts the oldest value.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
}

/// Min / average / max over a history buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl RingBuffer<f64> {
    /// Values oldest to newest, as a contiguous vector for rendering.
    pub fn to_vec(&self) -> Vec<f64> {
        self.items.iter().copied().collect()
    }

    /// `None` when the buffer is empty.
    pub fn summary(&self) -> Option<Summary> {
        if self.items.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in &self.items {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Some(Summary {
            min,
            avg: sum / self.items.len() as f64,
            max,
        })
    }
}

/// Number of entries shown in each Analysis ranking.
pub const RANKING_LEN: usize = 15;

/// Dashboard-side accumulated state.
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    pub cpu: RingBuffer<f64>,
    pub mem: RingBuffer<f64>,
    pub swap: RingBuffer<f64>,
    pub net_rx: RingBuffer<f64>,
    pub net_tx: RingBuffer<f64>,
    pub disk_read: RingBuffer<f64>,
    pub disk_write: RingBuffer<f64>,
    pub per_core: Vec<RingBuffer<f64>>,
    /// Cumulative CPU-seconds per command name. Only grows.
    pub cpu_seconds: HashMap<String, f64>,
    /// Number of samples in which a command appeared as throttled.
    pub throttle_counts: HashMap<String, u64>,
    /// Samples consumed so far.
    pub samples: u64,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cpu: RingBuffer::new(capacity),
            mem: RingBuffer::new(capacity),
            swap: RingBuffer::new(capacity),
            net_rx: RingBuffer::new(capacity),
            net_tx: RingBuffer::new(capacity),
            disk_read: RingBuffer::new(capacity),
            disk_write: RingBuffer::new(capacity),
            per_core: Vec::new(),
            cpu_seconds: HashMap::new(),
            throttle_counts: HashMap::new(),
            samples: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Folds one consumed sample into the history.
    pub fn record(&mut self, sample: &Sample) {
        self.samples += 1;
        self.cpu.push(sample.cpu.total);
        self.mem.push(sample.memory.used_percent());
        self.swap.push(sample.memory.swap_percent());
        self.net_rx.push(sample.io.net_rx_mbps);
        self.net_tx.push(sample.io.net_tx_mbps);
        self.disk_read.push(sample.io.disk_read_mbs);
        self.disk_write.push(sample.io.disk_write_mbs);

        // Core count can change (hotplug); new cores start with empty history.
        let cores = sample.cpu.per_core.len();
        if self.per_core.len() != cores {
            self.per_core.resize_with(cores, || RingBuffer::new(self.capacity));
        }
        for (buf, &pct) in self.per_core.iter_mut().zip(&sample.cpu.per_core) {
            buf.push(pct);
        }

        let secs = sample.interval.as_secs_f64();
        for p in &sample.top {
            let name = p.command_name();
            if name.is_empty() {
                continue;
            }
            *self.cpu_seconds.entry(name.to_string()).or_insert(0.0) += p.cpu / 100.0 * secs;
        }
        for p in &sample.throttled {
            let name = p.command_name();
            if name.is_empty() {
                continue;
            }
            *self.throttle_counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    /// Heaviest cumulative CPU consumers, descending, ties by name.
    pub fn top_consumers(&self, n: usize) -> Vec<(&str, f64)> {
        let mut v: Vec<(&str, f64)> = self
            .cpu_seconds
            .iter()
            .map(|(k, &s)| (k.as_str(), s))
            .collect();
        v.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        v.truncate(n);
        v
    }

    /// Most frequently throttled commands, descending, ties by name.
    pub fn top_throttled(&self, n: usize) -> Vec<(&str, u64)> {
        let mut v: Vec<(&str, u64)> = self
            .throttle_counts
            .iter()
            .map(|(k, &c)| (k.as_str(), c))
            .collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        v.truncate(n);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cpu, Process};
    use std::time::Duration;

    fn proc(pid: u32, nice: i32, cpu: f64, command: &str) -> Process {
        Process {
            pid,
            nice,
            cpu,
            command: command.to_string(),
            ..Process::default()
        }
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut buf = RingBuffer::new(3);
        for v in 1..=4 {
            buf.push(v);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(buf.last(), Some(&4));
    }

    #[test]
    fn test_ring_buffer_never_exceeds_capacity() {
        let mut buf = RingBuffer::new(60);
        for v in 0..1000 {
            buf.push(v as f64);
            assert!(buf.len() <= 60);
        }
        assert_eq!(buf.iter().next(), Some(&940.0));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut buf = RingBuffer::new(0);
        buf.push(1.0);
        buf.push(2.0);
        assert_eq!(buf.capacity(), 1);
        assert_eq!(buf.to_vec(), vec![2.0]);
    }

    #[test]
    fn test_summary() {
        let mut buf = RingBuffer::new(10);
        assert!(buf.summary().is_none());
        for v in [10.0, 30.0, 20.0] {
            buf.push(v);
        }
        let s = buf.summary().unwrap();
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 30.0);
        assert!((s.avg - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_accumulates_cpu_seconds_and_throttles() {
        let mut history = History::new(5);
        let rustc = proc(2000, 10, 100.0, "/usr/bin/rustc --edition 2024");
        let sample = Sample {
            interval: Duration::from_secs(2),
            cpu: Cpu {
                total: 40.0,
                per_core: vec![10.0, 70.0],
                ..Cpu::default()
            },
            top: vec![rustc.clone(), proc(1001, 0, 50.0, "nginx: worker process")],
            throttled: vec![rustc],
            ..Sample::default()
        };
        history.record(&sample);
        history.record(&sample);

        assert_eq!(history.samples, 2);
        assert_eq!(history.cpu.to_vec(), vec![40.0, 40.0]);
        assert_eq!(history.per_core.len(), 2);
        assert_eq!(history.per_core[1].to_vec(), vec![70.0, 70.0]);

        let top = history.top_consumers(15);
        assert_eq!(top[0], ("rustc", 4.0));
        assert_eq!(top[1], ("nginx:", 2.0));
        assert_eq!(history.top_throttled(15), vec![("rustc", 2)]);
    }

    #[test]
    fn test_rankings_are_capped_and_tie_broken_by_name() {
        let mut history = History::new(5);
        for name in ["b", "a", "c"] {
            history.throttle_counts.insert(name.to_string(), 1);
        }
        let ranked = history.top_throttled(2);
        assert_eq!(ranked, vec![("a", 1), ("b", 1)]);
    }

    #[test]
    fn test_core_count_change_resizes() {
        let mut history = History::new(3);
        let mut sample = Sample::default();
        sample.cpu.per_core = vec![1.0; 4];
        history.record(&sample);
        sample.cpu.per_core = vec![2.0; 2];
        history.record(&sample);
        assert_eq!(history.per_core.len(), 2);
        assert_eq!(history.per_core[0].to_vec(), vec![1.0, 2.0]);
    }
}
