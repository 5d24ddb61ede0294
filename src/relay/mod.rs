//! News relay pipeline and polling loop.

mod service;
mod updater;

pub use service::{CycleReport, RelayService};
pub use updater::{RelayUpdater, DEFAULT_POLL_INTERVAL_SECS};
