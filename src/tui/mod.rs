//! Terminal dashboard for sysmoni.
//!
//! Renders live samples from a [`crate::sampler::SampleStream`] with ratatui:
//! gauges with sparkline history, a sortable and filterable process table,
//! throttled processes, optional hardware panels, a cumulative analysis view
//! and a host info view.

mod app;
mod event;
pub mod history;
mod input;
mod render;
pub mod state;
pub mod style;
mod widgets;

pub use app::App;
pub use state::{AppState, View};
