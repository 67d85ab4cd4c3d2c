//! GPU probing: `nvidia-smi` first, AMD sysfs counters as fallback.

use crate::collector::command::{COMMAND_TIMEOUT, CommandRunner};
use crate::collector::traits::FileSystem;
use crate::model::Gpu;
use std::path::Path;

const NVIDIA_SMI: &str = "nvidia-smi";
const NVIDIA_ARGS: [&str; 2] = [
    "--query-gpu=name,utilization.gpu,memory.used,memory.total,temperature.gpu",
    "--format=csv,noheader,nounits",
];

const MIB: f64 = 1024.0 * 1024.0;

/// Lenient float parse for vendor tool output: trims whitespace and a
/// trailing `%`; anything unparseable (`[N/A]`, empty) reads as 0.
pub fn parse_lenient_f64(s: &str) -> f64 {
    let s = s.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parses `nvidia-smi --format=csv,noheader,nounits` output.
/// Lines with fewer than five columns are skipped.
pub fn parse_nvidia_smi(output: &str) -> Vec<Gpu> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() < 5 {
                return None;
            }
            Some(Gpu {
                name: parts[0].trim().to_string(),
                util: parse_lenient_f64(parts[1]),
                mem_used_mb: parse_lenient_f64(parts[2]),
                mem_total_mb: parse_lenient_f64(parts[3]),
                temp_c: parse_lenient_f64(parts[4]),
            })
        })
        .collect()
}

/// Queries NVIDIA GPUs. Missing tool, failure and timeout all yield an empty list.
pub fn probe_nvidia(runner: &dyn CommandRunner) -> Vec<Gpu> {
    match runner.run(NVIDIA_SMI, &NVIDIA_ARGS, COMMAND_TIMEOUT) {
        Ok(out) => parse_nvidia_smi(&out),
        Err(e) => {
            tracing::trace!(error = %e, "nvidia-smi unavailable");
            Vec::new()
        }
    }
}

/// Reads AMD GPUs from `<sys>/class/drm/card*/device`.
///
/// Only cards exposing `gpu_busy_percent` are reported; connector entries
/// such as `card0-DP-1` have no device counters and are skipped.
pub fn probe_amd(fs: &dyn FileSystem, sys_path: &str) -> Vec<Gpu> {
    let drm = format!("{}/class/drm", sys_path);
    let mut gpus = Vec::new();

    for card in fs.read_dir_prefixed(Path::new(&drm), "card") {
        let dev = card.join("device");
        let Ok(busy) = fs.read_to_string(&dev.join("gpu_busy_percent")) else {
            continue;
        };
        let read = |name: &str| {
            fs.read_to_string(&dev.join(name))
                .map(|s| parse_lenient_f64(&s))
                .unwrap_or(0.0)
        };
        let temp_c = fs
            .read_dir_prefixed(&dev.join("hwmon"), "hwmon")
            .first()
            .and_then(|hw| fs.read_to_string(&hw.join("temp1_input")).ok())
            .map(|s| parse_lenient_f64(&s) / 1000.0)
            .unwrap_or(0.0);
        let name = card
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| format!("AMD {}", n))
            .unwrap_or_else(|| "AMD GPU".to_string());

        gpus.push(Gpu {
            name,
            util: parse_lenient_f64(&busy),
            mem_used_mb: read("mem_info_vram_used") / MIB,
            mem_total_mb: read("mem_info_vram_total") / MIB,
            temp_c,
        });
    }

    gpus
}

/// Probes all supported vendors, NVIDIA first.
pub fn probe_gpus(fs: &dyn FileSystem, runner: &dyn CommandRunner, sys_path: &str) -> Vec<Gpu> {
    let gpus = probe_nvidia(runner);
    if !gpus.is_empty() {
        return gpus;
    }
    probe_amd(fs, sys_path)
}
