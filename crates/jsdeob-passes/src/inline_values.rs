//! Inline Array/Object Values (§4.3.5): `inlineArrayValues` and its sibling
//! `inlineStringArray`.
//!
//! Both entry points share one core: find a top-level `var name = [...]` or
//! `var name = {...}` of literals that is never mutated, then replace every
//! `name[i]` / `name.key` / `name["key"]` reference with the literal it
//! resolves to. `inlineStringArray` narrows the core to all-string arrays
//! whose name matches an "obfuscated" pattern (default `_0x` hex idents)
//! and additionally folds computed index expressions through
//! [`evaluate`](crate::eval::evaluate) rather than requiring a bare numeric
//! literal, since obfuscators commonly compute the index (`arr[a - b]`).
//!
//! Scoped to top-level declarations only, matching `unused_code`'s scope
//! reduction — see `DESIGN.md`.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde_json::Value;
use swc_ecma_ast::{
    AssignTarget, Decl, Expr, Ident, Lit, MemberProp, Pat, Program, Prop, PropName, PropOrSpread,
    SimpleAssignTarget, Stmt, VarDecl,
};
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::eval::{evaluate, Const};
use crate::stats::Stats;

const MUTATOR_METHODS: &[&str] = &["push", "pop", "shift", "unshift", "splice", "reverse", "sort", "fill"];

struct Config {
    remove_array: bool,
    name_pattern: Option<Regex>,
    require_string_elements: bool,
}

impl Config {
    fn general(value: &Value) -> Self {
        Self {
            remove_array: value.get("removeArray").and_then(Value::as_bool).unwrap_or(false),
            name_pattern: value
                .get("namePattern")
                .and_then(Value::as_str)
                .and_then(|p| Regex::new(p).ok()),
            require_string_elements: false,
        }
    }

    fn obfuscated_string_array(value: &Value) -> Self {
        let pattern = value
            .get("obfuscatedNamePattern")
            .and_then(Value::as_str)
            .unwrap_or(r"^_0x[0-9a-fA-F]+$");
        Self {
            remove_array: value.get("removeArray").and_then(Value::as_bool).unwrap_or(false),
            name_pattern: Regex::new(pattern).ok(),
            require_string_elements: true,
        }
    }
}

enum Literalized {
    Array(Vec<Lit>),
    Object(HashMap<String, Lit>),
}

/// Collects candidate top-level bindings: an all-literal array or object
/// with a single declarator, subject to the config's name filter.
fn collect_candidates(stmts: &[Stmt], cfg: &Config) -> HashMap<String, Literalized> {
    let mut out = HashMap::new();
    for stmt in stmts {
        let Stmt::Decl(Decl::Var(decl)) = stmt else { continue };
        let VarDecl { decls, .. } = decl.as_ref();
        if decls.len() != 1 {
            continue;
        }
        let d = &decls[0];
        let Pat::Ident(binding) = &d.name else { continue };
        let name = binding.id.sym.to_string();
        if let Some(pattern) = &cfg.name_pattern {
            if !pattern.is_match(&name) {
                continue;
            }
        }
        let Some(init) = &d.init else { continue };
        match init.as_ref() {
            Expr::Array(arr) => {
                let mut elems = Vec::with_capacity(arr.elems.len());
                let mut ok = true;
                for elem in &arr.elems {
                    match elem {
                        Some(e) if e.spread.is_none() => match e.expr.as_ref() {
                            Expr::Lit(l) if !cfg.require_string_elements || matches!(l, Lit::Str(_)) => {
                                elems.push(l.clone());
                            }
                            _ => {
                                ok = false;
                                break;
                            }
                        },
                        _ => {
                            ok = false;
                            break;
                        }
                    }
                }
                if ok && !elems.is_empty() {
                    out.insert(name, Literalized::Array(elems));
                }
            }
            Expr::Object(obj) if !cfg.require_string_elements => {
                let mut props = HashMap::new();
                let mut ok = true;
                for prop in &obj.props {
                    let PropOrSpread::Prop(prop) = prop else {
                        ok = false;
                        break;
                    };
                    let Prop::KeyValue(kv) = prop.as_ref() else {
                        ok = false;
                        break;
                    };
                    let key = match &kv.key {
                        PropName::Ident(id) => id.sym.to_string(),
                        PropName::Str(s) => s.value.to_string_lossy().into_owned(),
                        _ => {
                            ok = false;
                            break;
                        }
                    };
                    let Expr::Lit(lit) = kv.value.as_ref() else {
                        ok = false;
                        break;
                    };
                    props.insert(key, lit.clone());
                }
                if ok && !props.is_empty() {
                    out.insert(name, Literalized::Object(props));
                }
            }
            _ => {}
        }
    }
    out
}

struct MutationDetector {
    mutated: HashSet<String>,
}

impl Visit for MutationDetector {
    fn visit_assign_expr(&mut self, assign: &swc_ecma_ast::AssignExpr) {
        match &assign.left {
            AssignTarget::Simple(SimpleAssignTarget::Ident(id)) => {
                self.mutated.insert(id.id.sym.to_string());
            }
            AssignTarget::Simple(SimpleAssignTarget::Member(m)) => {
                if let Expr::Ident(id) = m.obj.as_ref() {
                    self.mutated.insert(id.sym.to_string());
                }
            }
            _ => {}
        }
        assign.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, call: &swc_ecma_ast::CallExpr) {
        if let swc_ecma_ast::Callee::Expr(callee) = &call.callee {
            if let Expr::Member(m) = callee.as_ref() {
                if let (Expr::Ident(id), MemberProp::Ident(prop)) = (m.obj.as_ref(), &m.prop) {
                    if MUTATOR_METHODS.contains(&prop.sym.as_ref()) {
                        self.mutated.insert(id.sym.to_string());
                    }
                }
            }
        }
        call.visit_children_with(self);
    }

    fn visit_update_expr(&mut self, update: &swc_ecma_ast::UpdateExpr) {
        if let Expr::Member(m) = update.arg.as_ref() {
            if let Expr::Ident(id) = m.obj.as_ref() {
                self.mutated.insert(id.sym.to_string());
            }
        }
        update.visit_children_with(self);
    }
}

fn find_mutated(program: &Program) -> HashSet<String> {
    let mut detector = MutationDetector { mutated: HashSet::new() };
    program.visit_with(&mut detector);
    detector.mutated
}

struct IdentCounter {
    counts: HashMap<String, usize>,
}

impl Visit for IdentCounter {
    fn visit_ident(&mut self, ident: &Ident) {
        *self.counts.entry(ident.sym.to_string()).or_insert(0) += 1;
    }
}

fn count_idents(program: &Program) -> HashMap<String, usize> {
    let mut counter = IdentCounter { counts: HashMap::new() };
    program.visit_with(&mut counter);
    counter.counts
}

struct Inliner<'a> {
    candidates: &'a HashMap<String, Literalized>,
    stats: Stats,
}

impl VisitMut for Inliner<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let Expr::Member(member) = expr else { return };
        let Expr::Ident(obj) = member.obj.as_ref() else { return };
        let Some(literalized) = self.candidates.get(obj.sym.as_ref()) else { return };

        let replacement = match literalized {
            Literalized::Array(elems) => match &member.prop {
                MemberProp::Computed(c) => match evaluate(&c.expr) {
                    Some(Const::Num(n)) if n >= 0.0 && n.fract() == 0.0 => {
                        elems.get(n as usize).cloned()
                    }
                    _ => None,
                },
                _ => None,
            },
            Literalized::Object(props) => match &member.prop {
                MemberProp::Ident(id) => props.get(id.sym.as_ref()).cloned(),
                MemberProp::Computed(c) => match c.expr.as_ref() {
                    Expr::Lit(Lit::Str(s)) => s.value.as_str().and_then(|v| props.get(v)).cloned(),
                    _ => None,
                },
                _ => None,
            },
        };

        if let Some(lit) = replacement {
            self.stats.incr("valuesInlined");
            *expr = Expr::Lit(lit);
        }
    }
}

fn run_core(program: &mut Program, cfg: Config) -> Value {
    let mut stats = Stats::new();

    let mutated = find_mutated(program);
    let candidates: HashMap<String, Literalized> = match program {
        Program::Script(s) => collect_candidates(&s.body, &cfg),
        Program::Module(m) => {
            let stmts: Vec<Stmt> = m
                .body
                .iter()
                .filter_map(|item| item.as_stmt().cloned())
                .collect();
            collect_candidates(&stmts, &cfg)
        }
    }
    .into_iter()
    .filter(|(name, _)| !mutated.contains(name))
    .collect();

    if candidates.is_empty() {
        return stats.finish();
    }

    let mut inliner = Inliner { candidates: &candidates, stats };
    program.visit_mut_with(&mut inliner);
    stats = inliner.stats;

    if cfg.remove_array {
        let counts = count_idents(program);
        let removable: HashSet<String> = candidates
            .keys()
            .filter(|name| counts.get(*name).copied().unwrap_or(0) <= 1)
            .cloned()
            .collect();
        if !removable.is_empty() {
            let drop = |stmts: &mut Vec<Stmt>| {
                stmts.retain(|stmt| {
                    if let Stmt::Decl(Decl::Var(decl)) = stmt {
                        if decl.decls.len() == 1 {
                            if let Pat::Ident(binding) = &decl.decls[0].name {
                                if removable.contains(binding.id.sym.as_ref()) {
                                    return false;
                                }
                            }
                        }
                    }
                    true
                });
            };
            match program {
                Program::Script(s) => drop(&mut s.body),
                Program::Module(m) => {
                    m.body.retain(|item| match item {
                        swc_ecma_ast::ModuleItem::Stmt(Stmt::Decl(Decl::Var(decl)))
                            if decl.decls.len() == 1 =>
                        {
                            match &decl.decls[0].name {
                                Pat::Ident(binding) => !removable.contains(binding.id.sym.as_ref()),
                                _ => true,
                            }
                        }
                        _ => true,
                    });
                }
            }
            stats.add("declarationsRemoved", removable.len() as u64);
        }
    }

    stats.finish()
}

pub fn run_array_values(program: &mut Program, config: &Value) -> Value {
    run_core(program, Config::general(config))
}

pub fn run_string_array(program: &mut Program, config: &Value) -> Value {
    run_core(program, Config::obfuscated_string_array(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::services::{generate_program, parse};

    #[test]
    fn inlines_array_index_and_removes_declaration() {
        let mut ast = parse("var a=[\"H\",\"i\"]; console.log(a[0]+a[1]);").unwrap();
        run_array_values(&mut ast.program, &serde_json::json!({"removeArray": true}));
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("\"H\" + \"i\""));
        assert!(!code.contains("var a"));
    }

    #[test]
    fn keeps_declaration_without_remove_array() {
        let mut ast = parse("var a=[\"H\",\"i\"]; console.log(a[0]);").unwrap();
        run_array_values(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("var a"));
        assert!(code.contains("\"H\""));
    }

    #[test]
    fn mutation_disables_inlining() {
        let mut ast = parse("var a=[1,2]; a.push(3); console.log(a[0]);").unwrap();
        run_array_values(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("a[0]"));
    }

    #[test]
    fn inlines_object_dot_and_bracket_access() {
        let mut ast = parse("var o={x:1,y:2}; console.log(o.x, o[\"y\"]);").unwrap();
        run_array_values(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains('1'));
        assert!(code.contains('2'));
    }

    #[test]
    fn string_array_folds_computed_index_expression() {
        let mut ast = parse("var _0x1a2b=[\"foo\",\"bar\"]; console.log(_0x1a2b[2-1]);").unwrap();
        run_string_array(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("\"bar\""));
    }
}
