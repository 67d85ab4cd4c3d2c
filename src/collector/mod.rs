//! Host metric sources for Linux.
//!
//! This module reads raw counters from `/proc` and `/sys` and runs vendor
//! tools under a hard timeout. It holds no delta state: every call returns
//! what the kernel reports right now, and the sampler turns successive
//! readings into rates.
//!
//! # Architecture
//!
//! ```text
//!  ProcessCollector      SystemCollector       sysfs / gpu
//!  /proc/[pid]/*         /proc/stat, meminfo   power_supply, thermal,
//!                        diskstats, net/dev    drm, nvidia-smi
//!        │                      │                 │          │
//!        └──────────┬───────────┴─────────────────┘          │
//!             FileSystem (trait)                    CommandRunner (trait)
//!           ┌───────┴───────┐                      ┌─────────┴─────────┐
//!         RealFs          MockFs            SystemCommands       MockCommands
//! ```
//!
//! # Usage
//!
//! ```
//! use sysmoni::collector::{MockFs, SystemCollector};
//!
//! let collector = SystemCollector::new(MockFs::typical_host(), "/proc");
//! let load = collector.collect_loadavg().unwrap();
//! assert!(load.load1 > 0.0);
//! ```

pub mod command;
pub mod gpu;
pub mod mock;
pub mod procfs;
pub mod sysfs;
pub mod traits;

pub use command::{COMMAND_TIMEOUT, CommandError, CommandRunner, SystemCommands};
pub use mock::{MockCommands, MockFs};
pub use procfs::{CollectError, ProcessCollector, ProcessReading, SystemCollector};
pub use traits::{FileSystem, RealFs};
