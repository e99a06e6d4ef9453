//! Error types for the Pipeline Driver (§7).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source does not parse as JavaScript/TypeScript; fails the whole run
    /// up-front (§7: "Within the driver, ParseError... fail the whole run").
    #[error("Parse error: {0}")]
    Parse(String),

    /// Bracket-nesting prefilter rejected the input before parsing.
    #[error(
        "code too deeply nested; simplify literals, constant-fold, or try eval-based unpacking externally"
    )]
    DeeplyNested,

    /// A single step (built-in or user transform) failed during execution.
    /// `TransformRuntimeError`s are caught by the driver and converted into
    /// this kind (§7).
    #[error("step failed: {0}")]
    StepFailure(String),

    /// The recipe itself is rejected at accept time (e.g. a step index or
    /// iteration count outside what the driver supports).
    #[error("unsupported recipe: {0}")]
    Unsupported(String),

    /// An internal invariant was violated (AST round-trip failure between
    /// the driver and the Transform Runtime). Not a fault in user input.
    #[error("internal pipeline error: {0}")]
    Internal(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
