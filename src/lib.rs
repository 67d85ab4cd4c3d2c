//! sysmoni - live resource dashboard library.
//!
//! The sampler turns `/proc` and `/sys` readings into immutable [`model::Sample`]
//! records; the TUI and the JSON sinks consume them.

pub mod collector;
pub mod config;
pub mod fmt;
pub mod model;
pub mod sampler;
pub mod sink;
pub mod tui;
