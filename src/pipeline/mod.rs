// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod dispatcher;
mod progress;
mod reporter;
mod stats;

#[cfg(test)]
pub(crate) mod fakes;

pub use dispatcher::{Dispatcher, RoundRobin};
pub use progress::{DispatchProgress, TaskCounts};
pub use reporter::{Collaborators, Reporter, build_client};
pub use stats::{Stats, StatsSnapshot};
