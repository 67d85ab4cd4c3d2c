//! Battery and thermal readings from `/sys/class`.

use crate::collector::gpu::parse_lenient_f64;
use crate::collector::traits::FileSystem;
use crate::model::{Battery, Temp};
use std::path::Path;

/// Reads the first `BAT*` supply with a readable `capacity`.
///
/// Returns `Battery::default()` (percent 0, i.e. absent) when none exists.
pub fn read_battery(fs: &dyn FileSystem, sys_path: &str) -> Battery {
    let supplies = format!("{}/class/power_supply", sys_path);

    for bat in fs.read_dir_prefixed(Path::new(&supplies), "BAT") {
        let Ok(capacity) = fs.read_to_string(&bat.join("capacity")) else {
            continue;
        };
        let read = |name: &str| -> Option<f64> {
            fs.read_to_string(&bat.join(name))
                .ok()
                .map(|s| parse_lenient_f64(&s))
        };
        let state = fs
            .read_to_string(&bat.join("status"))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        // energy_* in µWh with power_now in µW; older firmware exposes
        // charge_* in µAh with current_now in µA. Ratios are unit-free.
        let (now, full, rate) = match read("energy_now") {
            Some(now) => (Some(now), read("energy_full"), read("power_now")),
            None => (read("charge_now"), read("charge_full"), read("current_now")),
        };
        let seconds_remaining = estimate_seconds(&state, now, full, rate);

        return Battery {
            percent: parse_lenient_f64(&capacity),
            state,
            seconds_remaining,
        };
    }

    Battery::default()
}

fn estimate_seconds(state: &str, now: Option<f64>, full: Option<f64>, rate: Option<f64>) -> i64 {
    let (Some(now), Some(rate)) = (now, rate) else {
        return 0;
    };
    if rate <= 0.0 {
        return 0;
    }
    let hours = match state {
        "Discharging" => now / rate,
        "Charging" => match full {
            Some(full) if full > now => (full - now) / rate,
            _ => return 0,
        },
        _ => return 0,
    };
    (hours * 3600.0).round() as i64
}

/// Reads every `thermal_zone*` with a readable `temp`, in °C.
///
/// The zone label is the `type` file when present, otherwise the directory name.
pub fn read_thermal_zones(fs: &dyn FileSystem, sys_path: &str) -> Vec<Temp> {
    let thermal = format!("{}/class/thermal", sys_path);

    fs.read_dir_prefixed(Path::new(&thermal), "thermal_zone")
        .into_iter()
        .filter_map(|zone_dir| {
            let raw = fs.read_to_string(&zone_dir.join("temp")).ok()?;
            let zone = fs
                .read_to_string(&zone_dir.join("type"))
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .or_else(|| {
                    zone_dir
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(str::to_string)
                })?;
            Some(Temp {
                zone,
                temp: parse_lenient_f64(&raw) / 1000.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_battery_discharging() {
        let fs = MockFs::typical_host();
        let bat = read_battery(&fs, "/sys");
        assert_eq!(bat.percent, 87.0);
        assert_eq!(bat.state, "Discharging");
        // 40 Wh at 10 W
        assert_eq!(bat.seconds_remaining, 4 * 3600);
        assert!(bat.is_present());
    }

    #[test]
    fn test_battery_charging_uses_charge_files() {
        let fs = MockFs::new();
        let base = "/sys/class/power_supply/BAT1";
        fs.add_file(format!("{base}/capacity"), "50\n");
        fs.add_file(format!("{base}/status"), "Charging\n");
        fs.add_file(format!("{base}/charge_now"), "2000000\n");
        fs.add_file(format!("{base}/charge_full"), "4000000\n");
        fs.add_file(format!("{base}/current_now"), "1000000\n");
        let bat = read_battery(&fs, "/sys");
        assert_eq!(bat.state, "Charging");
        assert_eq!(bat.seconds_remaining, 2 * 3600);
    }

    #[test]
    fn test_battery_absent() {
        let bat = read_battery(&MockFs::new(), "/sys");
        assert_eq!(bat, Battery::default());
        assert!(!bat.is_present());
    }

    #[test]
    fn test_battery_full_has_no_estimate() {
        let fs = MockFs::new();
        let base = "/sys/class/power_supply/BAT0";
        fs.add_file(format!("{base}/capacity"), "100\n");
        fs.add_file(format!("{base}/status"), "Full\n");
        fs.add_file(format!("{base}/energy_now"), "50000000\n");
        fs.add_file(format!("{base}/power_now"), "0\n");
        assert_eq!(read_battery(&fs, "/sys").seconds_remaining, 0);
    }

    #[test]
    fn test_thermal_zones() {
        let fs = MockFs::typical_host();
        let temps = read_thermal_zones(&fs, "/sys");
        assert_eq!(
            temps,
            vec![
                Temp {
                    zone: "x86_pkg_temp".to_string(),
                    temp: 45.0
                },
                Temp {
                    zone: "thermal_zone1".to_string(),
                    temp: 38.5
                },
            ]
        );
    }

    #[test]
    fn test_no_thermal_zones() {
        assert!(read_thermal_zones(&MockFs::new(), "/sys").is_empty());
    }
}
