//! Error types for AST services.
//!
//! Follows `otter-runtime`'s convention of one `thiserror`-derived enum
//! per component plus constructor helpers for variants with structured
//! payloads.

use thiserror::Error;

/// Errors that can occur while parsing, generating, or measuring JS/TS source.
#[derive(Error, Debug)]
pub enum AstError {
    /// Source does not parse as JavaScript/TypeScript.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Bracket-nesting prefilter or print-time recursion exceeded the cap.
    #[error(
        "code too deeply nested (max {max}, cap {cap}); simplify literals, constant-fold, or try eval-based unpacking externally"
    )]
    DeeplyNested { max: usize, cap: usize },

    /// Code generation (printing) failed.
    #[error("Codegen error: {0}")]
    Codegen(String),

    /// The AST round-tripped through JSON could not be deserialized back
    /// into a native `swc_ecma_ast::Program`.
    #[error("AST deserialization error: {0}")]
    InvalidAst(String),
}

impl AstError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn deeply_nested(max: usize, cap: usize) -> Self {
        Self::DeeplyNested { max, cap }
    }
}

pub type AstResult<T> = Result<T, AstError>;
