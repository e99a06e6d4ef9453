//! Beautify (§4.3.7): a pass that mutates no AST node at all. Its entire
//! effect is a side effect of going through [`jsdeob_ast::services::generate`]
//! with the standard printer config — the pipeline driver materializes code
//! from the resulting AST the same way it would for any other step.

use serde_json::Value;
use swc_ecma_ast::Program;

use crate::stats::Stats;

pub fn run(_program: &mut Program, _config: &Value) -> Value {
    Stats::new().finish()
}
