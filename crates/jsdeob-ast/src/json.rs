//! JSON wire form of a [`Program`](swc_ecma_ast::Program).
//!
//! SWC's AST types already derive `Serialize`/`Deserialize` with a `type`
//! discriminant field per node (the `serde-impl` feature), which happens to
//! line up closely with the ESTree shape most JS tooling expects. That
//! makes it the natural "Node: discriminant + named child slots" wire form
//! §3 describes, and it's what the Transform Runtime hands to embedded user
//! scripts — native passes never pay this conversion cost, only the user
//! transform boundary does.

use swc_ecma_ast::Program;

use crate::error::{AstError, AstResult};

pub fn program_to_json(program: &Program) -> AstResult<serde_json::Value> {
    serde_json::to_value(program).map_err(|e| AstError::InvalidAst(e.to_string()))
}

pub fn json_to_program(value: serde_json::Value) -> AstResult<Program> {
    serde_json::from_value(value).map_err(|e| AstError::InvalidAst(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parse;

    #[test]
    fn round_trips_through_json() {
        let ast = parse("var x = 1 + 2;").unwrap();
        let json = program_to_json(&ast.program).unwrap();
        assert_eq!(json["type"], "Script");
        let restored = json_to_program(json).unwrap();
        assert!(matches!(restored, Program::Script(_)));
    }
}
