//! sysmoni - Live resource dashboard.
//!
//! Usage:
//!   sysmoni                          # interactive dashboard, 1s interval
//!   sysmoni --interval 500ms         # faster refresh
//!   sysmoni --json                   # print one sample and exit
//!   sysmoni --json-stream            # NDJSON until interrupted
//!   sysmoni --json-file /tmp/s.ndjson --log-file /tmp/sysmoni.log

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Mutex;
use std::thread;

use clap::Parser;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use sysmoni::config::{Args, Config};
use sysmoni::model::Sample;
use sysmoni::sampler::{CancelToken, Sampler};
use sysmoni::sink::{SinkError, write_ndjson, write_pretty};
use sysmoni::tui::App;

/// Output mode chosen from flags and whether stdout is a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Once,
    Stream,
    Dashboard,
}

fn select_mode(config: &Config, stdout_is_tty: bool) -> Mode {
    if config.json_stream {
        Mode::Stream
    } else if config.json || !stdout_is_tty {
        Mode::Once
    } else {
        Mode::Dashboard
    }
}

/// Sets up tracing. The dashboard owns the terminal, so it only logs when a
/// log file is given; JSON modes log to stderr.
fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>, mode: Mode) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("sysmoni={}", level)
            .parse()
            .unwrap_or_else(|_| LevelFilter::from_level(level).into()),
    );

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            Err(e) => eprintln!("Warning: cannot open log file '{}': {}", path.display(), e),
        }
        return;
    }

    if mode != Mode::Dashboard {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }
}

fn run_once(config: &Config) -> Result<(), SinkError> {
    let mut sampler = Sampler::new(config);
    sampler.refresh_slow();
    // the first sample only primes the counters
    sampler.sample();
    thread::sleep(sampler.interval());
    let sample = sampler.sample();
    write_pretty(io::stdout().lock(), &sample)
}

/// Writes each sample as one NDJSON line. A failed write skips that sample;
/// only a closed reader ends the stream. Returns the number of lines written.
fn write_stream<W: Write>(mut out: W, samples: impl IntoIterator<Item = Sample>) -> u64 {
    let mut written = 0;
    for sample in samples {
        match write_ndjson(&mut out, &sample) {
            Ok(()) => written += 1,
            // reader went away (e.g. `| head`)
            Err(SinkError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => break,
            Err(e) => debug!(error = %e, "sample skipped"),
        }
    }
    written
}

fn run_stream(config: &Config) {
    let token = CancelToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        error!(error = %e, "failed to install signal handler");
    }

    let stream = Sampler::new(config).stream(token);
    let written = write_stream(io::stdout().lock(), stream);
    debug!(lines = written, "stream finished");
}

fn run_dashboard(config: &Config) -> io::Result<()> {
    let stream = Sampler::new(config).stream(CancelToken::new());
    App::new(config, stream).run()
}

fn main() {
    let args = Args::parse();

    let config = match Config::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mode = select_mode(&config, io::stdout().is_terminal());
    init_logging(args.verbose, args.quiet, args.log_file.as_deref(), mode);

    info!("sysmoni {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        interval = ?config.interval,
        sort = config.sort.name(),
        gpu = config.gpu,
        battery = config.battery,
        mode = ?mode,
        "config"
    );

    let result = match mode {
        Mode::Once => run_once(&config).map_err(|e| e.to_string()),
        Mode::Stream => {
            run_stream(&config);
            Ok(())
        }
        Mode::Dashboard => run_dashboard(&config).map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        error!(error = %e, "sysmoni failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_mode() {
        let mut config = Config::default();
        assert_eq!(select_mode(&config, true), Mode::Dashboard);
        assert_eq!(select_mode(&config, false), Mode::Once);
        config.json = true;
        assert_eq!(select_mode(&config, true), Mode::Once);
        config.json = false;
        config.json_stream = true;
        assert_eq!(select_mode(&config, false), Mode::Stream);
    }

    /// Fails the first `fail_first` writes with `kind`, then accepts.
    struct FlakyWriter {
        kind: io::ErrorKind,
        fail_first: usize,
        calls: usize,
        lines: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls <= self.fail_first {
                return Err(io::Error::new(self.kind, "write failed"));
            }
            self.lines.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer(kind: io::ErrorKind, fail_first: usize) -> FlakyWriter {
        FlakyWriter {
            kind,
            fail_first,
            calls: 0,
            lines: Vec::new(),
        }
    }

    #[test]
    fn test_stream_skips_failed_writes() {
        let mut out = writer(io::ErrorKind::Other, 1);
        let written = write_stream(&mut out, vec![Sample::default(); 3]);
        assert_eq!(written, 2);
        assert_eq!(out.lines.iter().filter(|&&b| b == b'\n').count(), 2);
    }

    #[test]
    fn test_stream_stops_on_broken_pipe() {
        let mut out = writer(io::ErrorKind::BrokenPipe, 1);
        let written = write_stream(&mut out, vec![Sample::default(); 3]);
        assert_eq!(written, 0);
        assert_eq!(out.calls, 1);
    }
}
