mod accumulator;
mod task_group;

use derive_more::Display;

pub use accumulator::{Accumulator, Recorder, Tally};
pub use task_group::TaskGroup;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[display("task panicked: {_0}")]
    TaskPanicked(String),
    #[display("accumulator lost: {_0}")]
    AccumulatorLost(String),
}

impl std::error::Error for PipelineError {}
