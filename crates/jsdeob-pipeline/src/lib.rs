//! Pipeline Driver and offload engine (§4.4, §5): runs recipes of built-in
//! passes and user transforms over a single owned AST, either directly
//! ([`PipelineDriver`]) or via a worker pool that keeps CPU-bound execution
//! off the async request path ([`offload::PipelineEngine`]).

pub mod driver;
pub mod error;
pub mod flatten;
pub mod offload;

pub use driver::{PipelineDriver, StepRunOutcome};
pub use error::{PipelineError, PipelineResult};
pub use flatten::{flatten, validate_recipe, FlatStep};
pub use offload::{EngineStatsSnapshot, PipelineEngine, PipelineEngineBuilder, PipelineEngineHandle};
