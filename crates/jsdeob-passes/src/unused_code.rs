//! Unused-Code Removal (`removeUnusedCode`, §4.3.3).
//!
//! A best-effort, whole-program reference count stands in for per-scope
//! `Binding.referencePaths` (§9's open question about `scope.crawl()`
//! timing: this implementation recomputes the count fresh at the start of
//! every pass and does not attempt to invalidate it mid-pass, matching the
//! spec's allowance that "correctness is still obtained across multiple
//! passes"). Only top-level declarations are considered for removal —
//! function-local unused bindings are out of scope for this pass (see
//! `DESIGN.md`).
//!
//! Runs up to `maxPasses` (default 10) times, re-counting references before
//! each pass, stopping as soon as a pass removes nothing.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use swc_ecma_ast::{
    ClassDecl, Decl, Expr, FnDecl, Ident, ImportDecl, ImportSpecifier, ModuleDecl, ModuleItem,
    Pat, Program, Stmt, VarDecl, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::stats::Stats;

#[derive(Clone)]
struct Config {
    remove_variables: bool,
    remove_functions: bool,
    remove_classes: bool,
    remove_imports: bool,
    max_passes: u64,
    preserve: Option<Regex>,
}

impl Config {
    fn from_json(value: &Value) -> Self {
        let b = |key: &str, default: bool| value.get(key).and_then(Value::as_bool).unwrap_or(default);
        let preserve = value
            .get("preserveNames")
            .and_then(Value::as_str)
            .and_then(|p| Regex::new(p).ok());
        Self {
            remove_variables: b("removeVariables", true),
            remove_functions: b("removeFunctions", true),
            remove_classes: b("removeClasses", true),
            remove_imports: b("removeImports", true),
            max_passes: value.get("maxPasses").and_then(Value::as_u64).unwrap_or(10),
            preserve,
        }
    }

    fn is_preserved(&self, name: &str) -> bool {
        self.preserve.as_ref().is_some_and(|re| re.is_match(name))
    }
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

/// A name declared exactly once (its own binding site) and never otherwise
/// mentioned is unreferenced. The declaration site itself contributes one
/// `Ident` node to the whole-program count.
fn is_unreferenced(counts: &HashMap<String, usize>, name: &str) -> bool {
    counts.get(name).copied().unwrap_or(0) <= 1
}

fn is_pure_expr(expr: &Expr) -> bool {
    match expr {
        Expr::Lit(_) | Expr::Ident(_) => true,
        Expr::Fn(_) | Expr::Class(_) | Expr::Arrow(_) => true,
        Expr::Paren(p) => is_pure_expr(&p.expr),
        Expr::Unary(u) => is_pure_expr(&u.arg),
        Expr::Bin(b) => is_pure_expr(&b.left) && is_pure_expr(&b.right),
        Expr::Cond(c) => is_pure_expr(&c.test) && is_pure_expr(&c.cons) && is_pure_expr(&c.alt),
        Expr::Tpl(t) => t.exprs.iter().all(|e| is_pure_expr(e)),
        Expr::Array(arr) => arr
            .elems
            .iter()
            .all(|e| e.as_ref().is_none_or(|e| is_pure_expr(&e.expr))),
        _ => false,
    }
}

fn var_decl_is_removable(cfg: &Config, decl: &VarDecl, counts: &HashMap<String, usize>) -> bool {
    if !cfg.remove_variables || decl.decls.len() != 1 {
        return false;
    }
    removable_declarator(cfg, &decl.decls[0], counts)
}

fn removable_declarator(cfg: &Config, d: &VarDeclarator, counts: &HashMap<String, usize>) -> bool {
    let Pat::Ident(binding) = &d.name else { return false };
    let name = binding.id.sym.as_ref();
    if cfg.is_preserved(name) || !is_unreferenced(counts, name) {
        return false;
    }
    match &d.init {
        None => true,
        Some(init) => is_pure_expr(init),
    }
}

fn fn_decl_is_removable(cfg: &Config, f: &FnDecl, counts: &HashMap<String, usize>) -> bool {
    cfg.remove_functions
        && !cfg.is_preserved(f.ident.sym.as_ref())
        && is_unreferenced(counts, f.ident.sym.as_ref())
}

fn class_decl_is_removable(cfg: &Config, c: &ClassDecl, counts: &HashMap<String, usize>) -> bool {
    cfg.remove_classes
        && !cfg.is_preserved(c.ident.sym.as_ref())
        && is_unreferenced(counts, c.ident.sym.as_ref())
}

fn prune_import(cfg: &Config, import: &mut ImportDecl, counts: &HashMap<String, usize>) -> bool {
    if !cfg.remove_imports {
        return false;
    }
    // Side-effect-only imports (`import 'x'`) are always kept.
    if import.specifiers.is_empty() {
        return false;
    }
    let before = import.specifiers.len();
    import.specifiers.retain(|spec| {
        let name = match spec {
            ImportSpecifier::Named(n) => n.local.sym.as_ref(),
            ImportSpecifier::Default(d) => d.local.sym.as_ref(),
            ImportSpecifier::Namespace(n) => n.local.sym.as_ref(),
        };
        cfg.is_preserved(name) || !is_unreferenced(counts, name)
    });
    import.specifiers.len() != before
}

/// Returns `true` if this statement should be dropped from its containing
/// list.
fn stmt_is_removable(cfg: &Config, stmt: &Stmt, counts: &HashMap<String, usize>) -> bool {
    match stmt {
        Stmt::Decl(Decl::Var(v)) => var_decl_is_removable(cfg, v, counts),
        Stmt::Decl(Decl::Fn(f)) => fn_decl_is_removable(cfg, f, counts),
        Stmt::Decl(Decl::Class(c)) => class_decl_is_removable(cfg, c, counts),
        _ => false,
    }
}

fn run_pass_stmts(cfg: &Config, stmts: &mut Vec<Stmt>, counts: &HashMap<String, usize>, stats: &mut Stats) -> bool {
    let before = stmts.len();
    stmts.retain(|s| {
        let drop = stmt_is_removable(cfg, s, counts);
        if drop {
            match s {
                Stmt::Decl(Decl::Var(_)) => stats.incr("variablesRemoved"),
                Stmt::Decl(Decl::Fn(_)) => stats.incr("functionsRemoved"),
                Stmt::Decl(Decl::Class(_)) => stats.incr("classesRemoved"),
                _ => {}
            }
        }
        !drop
    });
    before != stmts.len()
}

fn run_pass_module(cfg: &Config, items: &mut Vec<ModuleItem>, counts: &HashMap<String, usize>, stats: &mut Stats) -> bool {
    let mut changed = false;
    for item in items.iter_mut() {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item {
            if prune_import(cfg, import, counts) {
                changed = true;
                stats.incr("importsRemoved");
            }
        }
    }

    let before = items.len();
    items.retain(|item| match item {
        ModuleItem::Stmt(s) => {
            let drop = stmt_is_removable(cfg, s, counts);
            if drop {
                match s {
                    Stmt::Decl(Decl::Var(_)) => stats.incr("variablesRemoved"),
                    Stmt::Decl(Decl::Fn(_)) => stats.incr("functionsRemoved"),
                    Stmt::Decl(Decl::Class(_)) => stats.incr("classesRemoved"),
                    _ => {}
                }
            }
            !drop
        }
        _ => true,
    });
    if items.len() != before {
        changed = true;
    }
    changed
}

pub fn run(program: &mut Program, config: &Value) -> Value {
    let cfg = Config::from_json(config);
    let mut stats = Stats::new();

    for _ in 0..cfg.max_passes.max(1) {
        let counts = count_idents(program);
        let changed = match program {
            Program::Script(script) => run_pass_stmts(&cfg, &mut script.body, &counts, &mut stats),
            Program::Module(module) => run_pass_module(&cfg, &mut module.body, &counts, &mut stats),
        };
        if !changed {
            break;
        }
    }

    stats.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::services::{generate_program, parse};

    #[test]
    fn removes_unreferenced_pure_variable() {
        let mut ast = parse("var unused=1; var used=2; console.log(used);").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(!code.contains("unused"));
        assert!(code.contains("used = 2"));
    }

    #[test]
    fn keeps_side_effecting_initializer() {
        let mut ast = parse("var z = f();").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("var z"));
    }

    #[test]
    fn removes_chained_unused_vars_within_passes() {
        let mut ast = parse("var x = 1; var y = x;").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(!code.contains('x'));
        assert!(!code.contains('y'));
    }
}
