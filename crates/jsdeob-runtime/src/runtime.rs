//! Public entry points for the Transform Runtime (§4.2): `run_transform`
//! and `validate`.

use boa_engine::{js_string, Source};
use serde_json::Value;

use jsdeob_ast::json::{json_to_program, program_to_json};
use jsdeob_ast::model::LogEntry;
use jsdeob_ast::services::{generate_program, parse};

use crate::capabilities::{self, Capabilities};
use crate::config::RuntimePolicy;
use crate::error::{RuntimeError, RuntimeResult};

/// Either a source string to parse fresh, or an already-parsed AST handed
/// in directly (§4.2: `inputIsAST`).
pub enum TransformInput<'a> {
    Source(&'a str),
    Ast(&'a Value),
}

pub struct TransformOutcome {
    pub code: Option<String>,
    pub ast: Option<Value>,
    pub stats: Value,
    pub logs: Vec<LogEntry>,
    pub modified: bool,
}

/// Runs `code` as a single user transform against `input` (§4.2). Returns
/// `code` xor `ast` depending on `return_ast`; on a thrown error inside the
/// transform, `stats`/`logs` collected so far are discarded — the caller
/// decides what to surface, per the contract.
pub fn run_transform(
    input: TransformInput,
    code: &str,
    config: &Value,
    return_ast: bool,
    policy: &RuntimePolicy,
) -> RuntimeResult<TransformOutcome> {
    let program_json = match input {
        TransformInput::Ast(json) => json.clone(),
        TransformInput::Source(source) => {
            let ast = parse(source).map_err(|e| RuntimeError::internal(e.to_string()))?;
            program_to_json(&ast.program).map_err(|e| RuntimeError::internal(e.to_string()))?
        }
    };

    let Capabilities { mut ctx, logs, modified } = capabilities::build(policy)?;

    let ast_js = boa_engine::JsValue::from_json(&program_json, &mut ctx)
        .map_err(|e| RuntimeError::internal(format!("failed to inject ast: {e}")))?;
    ctx.register_global_property(js_string!("ast"), ast_js, boa_engine::property::Attribute::all())
        .map_err(|e| RuntimeError::internal(format!("failed to bind ast: {e}")))?;

    let config_js = boa_engine::JsValue::from_json(config, &mut ctx)
        .map_err(|e| RuntimeError::internal(format!("failed to inject config: {e}")))?;
    ctx.register_global_property(js_string!("config"), config_js, boa_engine::property::Attribute::all())
        .map_err(|e| RuntimeError::internal(format!("failed to bind config: {e}")))?;

    ctx.eval(Source::from_bytes("globalThis.stats = {};"))
        .map_err(|e| RuntimeError::internal(format!("failed to seed stats: {e}")))?;

    let wrapped = format!("(function() {{\n{code}\n}})();");
    if let Err(e) = ctx.eval(Source::from_bytes(&wrapped)) {
        return Err(RuntimeError::runtime(e.to_string(), None));
    }

    // §4.2: a plugin authored as `module.exports = { enter(path) {...} }`
    // (or any object keyed by node-type names) is treated as a visitor and
    // run automatically.
    ctx.eval(Source::from_bytes(
        "if (globalThis.__looksLikeVisitor(globalThis.module.exports)) { globalThis.traverse(globalThis.module.exports); }",
    ))
    .map_err(|e| RuntimeError::internal(format!("module.exports visitor dispatch failed: {e}")))?;

    let stats_value = ctx
        .eval(Source::from_bytes("globalThis.stats"))
        .map_err(|e| RuntimeError::internal(format!("failed to read stats: {e}")))?
        .to_json(&mut ctx)
        .map_err(|e| RuntimeError::internal(format!("stats is not JSON-serializable: {e}")))?;

    let final_ast_json = ctx
        .eval(Source::from_bytes("globalThis.ast"))
        .map_err(|e| RuntimeError::internal(format!("failed to read ast: {e}")))?
        .to_json(&mut ctx)
        .map_err(|e| RuntimeError::internal(format!("ast became non-serializable: {e}")))?;

    let was_modified = modified.get();
    let collected_logs = logs.borrow().clone();

    if return_ast {
        return Ok(TransformOutcome {
            code: None,
            ast: Some(final_ast_json),
            stats: stats_value,
            logs: collected_logs,
            modified: was_modified,
        });
    }

    let program = json_to_program(final_ast_json)
        .map_err(|e| RuntimeError::internal(format!("mutated ast did not round-trip: {e}")))?;
    let printed = generate_program(&program)
        .map_err(|e| RuntimeError::internal(format!("failed to print mutated ast: {e}")))?;

    Ok(TransformOutcome {
        code: Some(printed),
        ast: None,
        stats: stats_value,
        logs: collected_logs,
        modified: was_modified,
    })
}

/// Parses `code` as a standalone program without executing it, by wrapping
/// it in an uncalled function expression — this exercises the full grammar
/// but the function body never runs, giving a pure syntax check.
pub fn validate(code: &str) -> RuntimeResult<()> {
    let mut ctx = boa_engine::Context::default();
    let wrapped = format!("(function() {{\n{code}\n}});");
    match ctx.eval(Source::from_bytes(&wrapped)) {
        Ok(_) => Ok(()),
        Err(e) => Err(RuntimeError::validation(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> RuntimePolicy {
        RuntimePolicy::default()
    }

    #[test]
    fn validate_accepts_well_formed_code() {
        assert!(validate("var x = 1 + 2; console.log(x);").is_ok());
    }

    #[test]
    fn validate_rejects_syntax_errors() {
        assert!(validate("function ( {").is_err());
    }

    #[test]
    fn validate_does_not_execute_the_transform() {
        // If this ever ran, it would panic via an intentional throw.
        assert!(validate("throw new Error('should never run');").is_ok());
    }

    #[test]
    fn run_transform_rewrites_code_via_traverse() {
        let code = r#"
            traverse({
                NumericLiteral(path) {
                    if (path.node.value === 1) {
                        path.replaceWith(t.numericLiteral({ value: 42 }));
                    }
                }
            });
        "#;
        let outcome = run_transform(
            TransformInput::Source("var x = 1;"),
            code,
            &json!({}),
            false,
            &policy(),
        )
        .unwrap();
        assert!(outcome.modified);
        assert!(outcome.code.unwrap().contains("42"));
    }

    #[test]
    fn run_transform_collects_console_logs() {
        let outcome = run_transform(
            TransformInput::Source("var x = 1;"),
            "console.log('hello', 1);",
            &json!({}),
            false,
            &policy(),
        )
        .unwrap();
        assert_eq!(outcome.logs.len(), 1);
        assert_eq!(outcome.logs[0].level, "log");
    }

    #[test]
    fn run_transform_reports_thrown_errors() {
        let result = run_transform(
            TransformInput::Source("var x = 1;"),
            "throw new Error('boom');",
            &json!({}),
            false,
            &policy(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn run_disabled_by_policy_logs_instead_of_evaluating() {
        let restricted = RuntimePolicy::new().allow_eval(false);
        let outcome = run_transform(
            TransformInput::Source("var x = 1;"),
            "var v = run('1 + 1'); stats.v = v;",
            &json!({}),
            false,
            &restricted,
        )
        .unwrap();
        assert_eq!(outcome.stats.get("v"), Some(&Value::Null));
    }
}
