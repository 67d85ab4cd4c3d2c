//! Mock filesystem and command runner for testing.
//!
//! This module provides `MockFs`, pre-built scenarios and `MockCommands` for
//! testing collectors and the sampler without a real Linux host.

mod commands;
mod filesystem;
mod scenarios;

pub use commands::MockCommands;
pub use filesystem::MockFs;
pub use scenarios::{NET_DEV_HEADER, diskstats_line, io_content, net_dev_line, stat_line};
