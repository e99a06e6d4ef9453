//! The canonical built-in catalogue (§4.5: "Built-ins: enumerated in code
//! with stable slug ids"). `jsdeob-store` re-exposes this list verbatim for
//! `GET /api/transform/builtins`; `jsdeob-pipeline` uses [`dispatch`] to run
//! a step by id.

use jsdeob_ast::model::{ConfigHint, ConfigHintType, ConfigHints, TransformMeta};
use serde_json::Value;
use swc_ecma_ast::Program;

use crate::{
    beautify, bracket_to_dot, constant_folding, decode_strings, inline_values, opaque_predicate,
    simplify_literals, unused_code,
};

fn hint(ty: ConfigHintType, default: Option<Value>, description: &str) -> ConfigHint {
    ConfigHint {
        ty,
        default,
        description: description.to_string(),
    }
}

fn bool_hint(default: bool, description: &str) -> ConfigHint {
    hint(ConfigHintType::Boolean, Some(Value::from(default)), description)
}

fn schema(entries: &[(&str, ConfigHint)]) -> ConfigHints {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

pub const BUILTIN_IDS: &[&str] = &[
    "constantFolding",
    "opaquePredicateRemoval",
    "removeUnusedCode",
    "decodeStrings",
    "inlineArrayValues",
    "inlineStringArray",
    "simplifyLiterals",
    "beautify",
    "bracketToDot",
];

/// Stable metadata for every built-in, independent of any one run.
pub fn catalog() -> Vec<TransformMeta> {
    vec![
        TransformMeta {
            id: "constantFolding".into(),
            name: "Constant Folding".into(),
            description: "Folds binary expressions over numeric literals.".into(),
            category: "simplification".into(),
            config_schema: ConfigHints::default(),
            example_code: Some("var x = 1 + 2 + 3;".into()),
        },
        TransformMeta {
            id: "opaquePredicateRemoval".into(),
            name: "Opaque Predicate Removal".into(),
            description: "Resolves statically-determinable if/ternary/logical expressions.".into(),
            category: "dead-code".into(),
            config_schema: schema(&[
                ("removeDeadElse", bool_hint(true, "Remove the unreachable else branch")),
                ("removeDeadIf", bool_hint(true, "Remove an if whose test is always false")),
                ("foldTernary", bool_hint(true, "Fold conditional expressions")),
                ("foldLogical", bool_hint(true, "Fold &&/||/?? expressions")),
                ("unwrapBlocks", bool_hint(true, "Splice resolved bodies into the surrounding list")),
            ]),
            example_code: Some("if(!1){console.log('x')} else {console.log('y')}".into()),
        },
        TransformMeta {
            id: "removeUnusedCode".into(),
            name: "Unused Code Removal".into(),
            description: "Removes unreferenced top-level variables, functions, classes, and import bindings.".into(),
            category: "dead-code".into(),
            config_schema: schema(&[
                ("removeVariables", bool_hint(true, "Remove unreferenced var/let/const declarations")),
                ("removeFunctions", bool_hint(true, "Remove unreferenced function declarations")),
                ("removeClasses", bool_hint(true, "Remove unreferenced class declarations")),
                ("removeImports", bool_hint(true, "Prune unreferenced import specifiers")),
                ("maxPasses", hint(ConfigHintType::Number, Some(Value::from(10)), "Maximum re-crawl passes")),
            ]),
            example_code: Some("var unused=1; var used=2; console.log(used);".into()),
        },
        TransformMeta {
            id: "decodeStrings".into(),
            name: "String Decoding".into(),
            description: "Decodes hex/unicode escapes, fromCharCode, atob/base64, and literal string method chains.".into(),
            category: "string-decoding".into(),
            config_schema: schema(&[
                ("all", bool_hint(false, "Enable every sub-option")),
                ("hexEscapes", bool_hint(false, "Normalize \\xHH escapes")),
                ("unicodeEscapes", bool_hint(false, "Normalize \\uHHHH escapes")),
                ("fromCharCode", bool_hint(false, "Fold String.fromCharCode(...) of literals")),
                ("atob", bool_hint(false, "Decode atob(literal)")),
                ("base64", bool_hint(false, "Decode Buffer.from(literal, \"base64\")")),
                ("charAt", bool_hint(false, "Fold charAt/bracket-index on string literals")),
                ("splitReverseJoin", bool_hint(false, "Fold split().reverse().join() chains")),
                ("replace", bool_hint(false, "Fold .replace(literal, literal) on string literals")),
                ("maxStringLength", hint(ConfigHintType::Number, Some(Value::from(50_000)), "Cap on any folded string length")),
            ]),
            example_code: Some("atob(\"SGVsbG8=\")".into()),
        },
        TransformMeta {
            id: "inlineArrayValues".into(),
            name: "Inline Array/Object Values".into(),
            description: "Inlines references into never-mutated literal arrays and objects.".into(),
            category: "simplification".into(),
            config_schema: schema(&[
                ("removeArray", bool_hint(false, "Delete the declaration once every reference is inlined")),
            ]),
            example_code: Some("var a=[\"H\",\"i\"]; console.log(a[0]+a[1]);".into()),
        },
        TransformMeta {
            id: "inlineStringArray".into(),
            name: "Inline Obfuscated String Array".into(),
            description: "Inlines references into hex-named (_0x...) all-string arrays with foldable computed indices.".into(),
            category: "string-decoding".into(),
            config_schema: schema(&[
                ("removeArray", bool_hint(false, "Delete the declaration once every reference is inlined")),
                ("obfuscatedNamePattern", hint(ConfigHintType::String, Some(Value::from("^_0x[0-9a-fA-F]+$")), "Regex restricting eligible names")),
            ]),
            example_code: Some("var _0x1a2b=[\"foo\",\"bar\"]; console.log(_0x1a2b[2-1]);".into()),
        },
        TransformMeta {
            id: "simplifyLiterals".into(),
            name: "Literal Simplification".into(),
            description: "Simplifies boolean/void/typeof shorthand and division-by-zero patterns.".into(),
            category: "simplification".into(),
            config_schema: schema(&[
                ("convertToIdentifier", bool_hint(false, "Emit true/false/undefined as bare identifiers")),
            ]),
            example_code: Some("var x = !0;".into()),
        },
        TransformMeta {
            id: "beautify".into(),
            name: "Beautify".into(),
            description: "Reprints the AST with the standard printer; no node is mutated.".into(),
            category: "formatting".into(),
            config_schema: ConfigHints::default(),
            example_code: None,
        },
        TransformMeta {
            id: "bracketToDot".into(),
            name: "Bracket To Dot".into(),
            description: "Rewrites a[\"b\"] to a.b when the key is identifier-shaped.".into(),
            category: "utilities".into(),
            config_schema: ConfigHints::default(),
            example_code: Some("a[\"b\"];".into()),
        },
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("unknown built-in pass id: {0}")]
    UnknownId(String),
}

/// Runs a built-in pass by id, mutating `program` and returning its stats.
pub fn dispatch(id: &str, program: &mut Program, config: &Value) -> Result<Value, PassError> {
    match id {
        "constantFolding" => Ok(constant_folding::run(program, config)),
        "opaquePredicateRemoval" => Ok(opaque_predicate::run(program, config)),
        "removeUnusedCode" => Ok(unused_code::run(program, config)),
        "decodeStrings" => Ok(decode_strings::run(program, config)),
        "inlineArrayValues" => Ok(inline_values::run_array_values(program, config)),
        "inlineStringArray" => Ok(inline_values::run_string_array(program, config)),
        "simplifyLiterals" => Ok(simplify_literals::run(program, config)),
        "beautify" => Ok(beautify::run(program, config)),
        "bracketToDot" => Ok(bracket_to_dot::run(program, config)),
        other => Err(PassError::UnknownId(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_match_dispatch_table() {
        let ids: Vec<String> = catalog().into_iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), BUILTIN_IDS.len());
        for id in BUILTIN_IDS {
            assert!(ids.iter().any(|c| c == id), "missing catalog entry for {id}");
        }
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut ast = jsdeob_ast::services::parse("var x = 1;").unwrap();
        let result = dispatch("doesNotExist", &mut ast.program, &Value::Null);
        assert!(result.is_err());
    }
}
