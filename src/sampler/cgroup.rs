//! Per-PID cgroup name cache with periodic invalidation.

use std::collections::HashMap;

/// Ticks after which the whole cache is dropped.
pub const CGROUP_CACHE_TICKS: u32 = 60;

/// Caches resolved cgroup names by PID.
///
/// Only successful resolutions are cached; processes in the root cgroup or
/// with an unreadable `cgroup` file are retried every tick. The cache is
/// cleared once the tick counter exceeds [`CGROUP_CACHE_TICKS`], which bounds
/// its size and limits how long a recycled PID keeps a stale name.
#[derive(Debug, Default)]
pub struct CgroupCache {
    names: HashMap<u32, String>,
    ticks: u32,
}

impl CgroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the tick counter. Returns `true` when this tick cleared the cache.
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks > CGROUP_CACHE_TICKS {
            self.names.clear();
            self.ticks = 0;
            return true;
        }
        false
    }

    /// Returns the cached name for `pid`, calling `resolve` on a miss.
    pub fn resolve(
        &mut self,
        pid: u32,
        resolve: impl FnOnce() -> Option<String>,
    ) -> Option<String> {
        if let Some(name) = self.names.get(&pid) {
            return Some(name.clone());
        }
        let name = resolve()?;
        self.names.insert(pid, name.clone());
        Some(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
