//! Aggregation pipelines: stage definitions and their executor.
//!
//! A [PipelineDefinition] is an ordered list of [Stage]s. [run] scans the
//! source collection once and applies the stages in order: match stages
//! filter, project stages reshape each document and sort stages reorder the
//! whole set.

mod definition;
mod executor;
mod stage;

pub use definition::*;
pub use executor::*;
pub use stage::*;
