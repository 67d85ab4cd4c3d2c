//! Slow probes (GPU, battery, thermal) and the cell holding their latest result.

use crate::collector::command::CommandRunner;
use crate::collector::gpu::probe_gpus;
use crate::collector::sysfs::{read_battery, read_thermal_zones};
use crate::collector::traits::FileSystem;
use crate::model::{Battery, Gpu, Temp};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How often the slow probes run while streaming.
pub const SLOW_PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Most recent slow-probe result. Defaults to "nothing visible".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlowReading {
    pub gpus: Vec<Gpu>,
    pub battery: Battery,
    pub temps: Vec<Temp>,
}

/// Runs the slow probes and publishes results into a shared cell.
///
/// Probing happens outside the lock; the lock only guards the swap of the
/// finished value, so readers never wait on a vendor tool.
pub struct SlowProbe<F: FileSystem> {
    fs: F,
    runner: Arc<dyn CommandRunner>,
    sys_path: String,
    gpu_enabled: bool,
    battery_enabled: bool,
    latest: Mutex<SlowReading>,
}

impl<F: FileSystem> SlowProbe<F> {
    pub fn new(
        fs: F,
        runner: Arc<dyn CommandRunner>,
        sys_path: impl Into<String>,
        gpu_enabled: bool,
        battery_enabled: bool,
    ) -> Self {
        Self {
            fs,
            runner,
            sys_path: sys_path.into(),
            gpu_enabled,
            battery_enabled,
            latest: Mutex::new(SlowReading::default()),
        }
    }

    /// Probes every enabled source.
    pub fn probe(&self) -> SlowReading {
        let gpus = if self.gpu_enabled {
            probe_gpus(&self.fs, self.runner.as_ref(), &self.sys_path)
        } else {
            Vec::new()
        };
        let battery = if self.battery_enabled {
            read_battery(&self.fs, &self.sys_path)
        } else {
            Battery::default()
        };
        SlowReading {
            gpus,
            battery,
            temps: read_thermal_zones(&self.fs, &self.sys_path),
        }
    }

    /// Probes and publishes the result.
    pub fn refresh(&self) {
        let reading = self.probe();
        tracing::trace!(
            gpus = reading.gpus.len(),
            zones = reading.temps.len(),
            "slow probe refreshed"
        );
        if let Ok(mut latest) = self.latest.lock() {
            *latest = reading;
        }
    }

    /// Clone of the last published reading.
    pub fn latest(&self) -> SlowReading {
        self.latest
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockCommands, MockFs};

    #[test]
    fn test_latest_is_empty_before_first_refresh() {
        let probe = SlowProbe::new(
            MockFs::typical_host(),
            Arc::new(MockCommands::new()),
            "/sys",
            true,
            true,
        );
        assert_eq!(probe.latest(), SlowReading::default());
        probe.refresh();
        let r = probe.latest();
        assert!(r.gpus.is_empty());
        assert_eq!(r.battery.percent, 87.0);
        assert_eq!(r.temps.len(), 2);
    }

    #[test]
    fn test_disabled_sources_not_probed() {
        let cmds = MockCommands::new();
        cmds.set_output("nvidia-smi", "RTX, 1, 2, 3, 4\n");
        let probe = SlowProbe::new(
            MockFs::typical_host(),
            Arc::new(cmds.clone()),
            "/sys",
            false,
            false,
        );
        let r = probe.probe();
        assert!(r.gpus.is_empty());
        assert!(!r.battery.is_present());
        assert_eq!(cmds.calls("nvidia-smi"), 0);
        // thermal zones are always read
        assert_eq!(r.temps.len(), 2);
    }

    #[test]
    fn test_gpu_reading_published() {
        let cmds = MockCommands::new();
        cmds.set_output("nvidia-smi", "RTX 4090, 99, 20000, 24564, 80\n");
        let probe = SlowProbe::new(MockFs::new(), Arc::new(cmds), "/sys", true, true);
        probe.refresh();
        assert_eq!(probe.latest().gpus[0].util, 99.0);
    }
}
