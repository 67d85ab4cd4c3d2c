//! Startup options.
//!
//! [`Args`] is the clap command line (with environment overrides used by the
//! deployment layer); [`Config`] is the validated plain options bag the
//! sampler and dashboard are built from.

use crate::model::SortKey;
use clap::Parser;
use clap::builder::BoolishValueParser;
use std::path::PathBuf;
use std::time::Duration;

/// Default history capacity (samples per sparkline).
pub const DEFAULT_HISTORY: usize = 60;

/// Error type for invalid options.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidInterval(String),
    InvalidHistory(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidInterval(s) => write!(
                f,
                "invalid interval {:?} (use e.g. 500ms, 2s, 1m or a number of seconds)",
                s
            ),
            ConfigError::InvalidHistory(n) => {
                write!(f, "invalid history capacity {} (must be at least 1)", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Live resource dashboard for verifying process priority and OOM tuning.
#[derive(Parser, Debug, Clone)]
#[command(name = "sysmoni", version, about = "Live resource dashboard")]
pub struct Args {
    /// Refresh interval: 500ms, 2s, 1m, 1.5s or a bare number of seconds.
    #[arg(long, env = "SRPS_SYSMONI_INTERVAL", default_value = "1s", value_parser = parse_interval)]
    pub interval: Duration,

    /// Initial process sort key: cpu, mem, io or fd.
    #[arg(long, default_value = "cpu")]
    pub sort: SortKey,

    /// Initial case-insensitive substring filter on the command.
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Print one JSON sample and exit.
    #[arg(long, conflicts_with = "json_stream")]
    pub json: bool,

    /// Stream NDJSON samples to stdout until interrupted.
    #[arg(long)]
    pub json_stream: bool,

    /// Probe GPUs (nvidia-smi, AMD sysfs). `0` disables.
    #[arg(
        long,
        env = "SRPS_SYSMONI_GPU",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set
    )]
    pub gpu: bool,

    /// Read battery state. `0` disables.
    #[arg(
        long,
        env = "SRPS_SYSMONI_BATT",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set
    )]
    pub battery: bool,

    /// Append every dashboard sample as NDJSON to this file.
    #[arg(long, env = "SRPS_SYSMON_JSON_FILE", value_name = "PATH")]
    pub json_file: Option<PathBuf>,

    /// Samples kept per history sparkline.
    #[arg(long, default_value_t = DEFAULT_HISTORY)]
    pub history: usize,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc")]
    pub proc_path: String,

    /// Path to /sys filesystem.
    #[arg(long, default_value = "/sys")]
    pub sys_path: String,

    /// Write logs to this file (the dashboard owns the terminal).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Validated startup options.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub interval: Duration,
    pub sort: SortKey,
    pub filter: String,
    pub json: bool,
    pub json_stream: bool,
    pub gpu: bool,
    pub battery: bool,
    pub json_file: Option<PathBuf>,
    pub history: usize,
    pub proc_path: String,
    pub sys_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            sort: SortKey::Cpu,
            filter: String::new(),
            json: false,
            json_stream: false,
            gpu: true,
            battery: true,
            json_file: None,
            history: DEFAULT_HISTORY,
            proc_path: "/proc".to_string(),
            sys_path: "/sys".to_string(),
        }
    }
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.history == 0 {
            return Err(ConfigError::InvalidHistory(args.history));
        }
        Ok(Self {
            interval: args.interval,
            sort: args.sort,
            filter: args.filter.clone(),
            json: args.json,
            json_stream: args.json_stream,
            gpu: args.gpu,
            battery: args.battery,
            json_file: args.json_file.clone().filter(|p| !p.as_os_str().is_empty()),
            history: args.history,
            proc_path: args.proc_path.clone(),
            sys_path: args.sys_path.clone(),
        })
    }
}

/// Parses an interval.
///
/// Accepts a bare (possibly fractional) number of seconds or a sequence of
/// `<number><unit>` terms with units `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`
/// (e.g. `1m30s`). Negative values parse to zero; the sampler treats a
/// zero interval as one second.
pub fn parse_interval(s: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidInterval(s.to_string());
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let nanos = if let Ok(v) = body.parse::<f64>() {
        v * 1e9
    } else {
        let mut total = 0.0;
        let mut rest = body;
        while !rest.is_empty() {
            let num_end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or_else(invalid)?;
            if num_end == 0 {
                return Err(invalid());
            }
            let value: f64 = rest[..num_end].parse().map_err(|_| invalid())?;
            rest = &rest[num_end..];
            let unit_end = rest
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(rest.len());
            let scale = match &rest[..unit_end] {
                "ns" => 1.0,
                "us" | "µs" => 1e3,
                "ms" => 1e6,
                "s" => 1e9,
                "m" => 60e9,
                "h" => 3600e9,
                _ => return Err(invalid()),
            };
            total += value * scale;
            rest = &rest[unit_end..];
        }
        total
    };

    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    if negative || nanos <= 0.0 {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}
