//! Dead-code removal / opaque-predicate elimination (`opaquePredicateRemoval`,
//! §4.3.2).
//!
//! Handles `IfStatement`, `ConditionalExpression`, and `LogicalExpression`
//! (`&&`, `||`, `??`) wherever [`evaluate`](crate::eval::evaluate) is
//! confident about the test. Two traversal hooks cooperate:
//!
//! - `visit_mut_stmts` runs over every statement *list* (program body,
//!   block body) and splices a resolved `if` directly into the
//!   surrounding list — this is the "parent accepts multiple statements"
//!   case from §9, so no wrapping block is needed.
//! - `visit_mut_stmt` runs over every lone-statement slot (a `for`/`while`
//!   body, the other arm of an `if` without braces, ...) and replaces a
//!   resolved `if` with a single statement, wrapping multi-statement or
//!   declaration-bearing bodies in a fresh block so `let`/`const` can't
//!   leak into the surrounding scope — the redesign flag in §9 this
//!   implementation is required to honor.

use serde_json::Value;
use swc_ecma_ast::{BinaryOp, BlockStmt, Expr, IfStmt, Program, Stmt};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::eval::evaluate;
use crate::stats::Stats;

#[derive(Debug, Clone, Copy)]
struct Config {
    remove_dead_else: bool,
    remove_dead_if: bool,
    fold_ternary: bool,
    fold_logical: bool,
    unwrap_blocks: bool,
}

impl Config {
    fn from_json(value: &Value) -> Self {
        let b = |key: &str, default: bool| {
            value.get(key).and_then(Value::as_bool).unwrap_or(default)
        };
        Self {
            remove_dead_else: b("removeDeadElse", true),
            remove_dead_if: b("removeDeadIf", true),
            fold_ternary: b("foldTernary", true),
            fold_logical: b("foldLogical", true),
            unwrap_blocks: b("unwrapBlocks", true),
        }
    }
}

struct Pass {
    config: Config,
    stats: Stats,
}

fn is_declaration(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Decl(_))
}

/// A statement resolved to "true" or "false" becomes either its body (as a
/// list of statements, for splicing into a surrounding list) or nothing.
fn resolved_branch(body: Option<Stmt>) -> Vec<Stmt> {
    match body {
        None => vec![],
        Some(Stmt::Block(BlockStmt { stmts, .. })) => stmts,
        Some(other) => vec![other],
    }
}

/// Same resolution, but collapsed back into a single statement for a
/// lone-statement slot. Wraps in a fresh block whenever the body is more
/// than one statement or contains a declaration.
fn resolved_branch_single(body: Option<Stmt>) -> Stmt {
    match body {
        None => Stmt::Empty(swc_ecma_ast::EmptyStmt { span: Default::default() }),
        Some(Stmt::Block(block)) => {
            if block.stmts.len() == 1 && !is_declaration(&block.stmts[0]) {
                block.stmts.into_iter().next().unwrap()
            } else {
                Stmt::Block(block)
            }
        }
        Some(other) => other,
    }
}

impl Pass {
    fn reduce_if(&mut self, if_stmt: &IfStmt) -> Option<(bool, Option<Stmt>)> {
        let test = evaluate(&if_stmt.test)?;
        let truthy = test.truthy();
        if truthy && !self.config.remove_dead_if {
            return None;
        }
        if !truthy && if_stmt.alt.is_some() && !self.config.remove_dead_else {
            return None;
        }
        if !truthy && if_stmt.alt.is_none() && !self.config.remove_dead_if {
            return None;
        }

        let branch = if truthy {
            self.stats.incr("ifStatementsRemoved");
            Some((*if_stmt.cons).clone())
        } else {
            self.stats.incr("elseBlocksRemoved");
            if_stmt.alt.as_ref().map(|alt| (**alt).clone())
        };
        Some((truthy, branch))
    }
}

impl VisitMut for Pass {
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        // Recurse into each statement's *children* directly rather than
        // dispatching through `visit_mut_stmt` (which would resolve a
        // top-level `Stmt::If` in place before the splice loop below runs,
        // leaving it wrapped in a block instead of spliced into the list).
        for stmt in stmts.iter_mut() {
            stmt.visit_mut_children_with(self);
        }

        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts.drain(..) {
            if let Stmt::If(if_stmt) = &stmt {
                if let Some((_, branch)) = self.reduce_if(if_stmt) {
                    if self.config.unwrap_blocks {
                        out.extend(resolved_branch(branch));
                    } else {
                        out.push(resolved_branch_single(branch));
                    }
                    continue;
                }
            }
            out.push(stmt);
        }
        *stmts = out;
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);

        if let Stmt::If(if_stmt) = stmt {
            if let Some((_, branch)) = self.reduce_if(if_stmt) {
                *stmt = resolved_branch_single(branch);
            }
        }
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        match expr {
            Expr::Cond(cond) if self.config.fold_ternary => {
                if let Some(test) = evaluate(&cond.test) {
                    self.stats.incr("ternariesFolded");
                    *expr = if test.truthy() {
                        (*cond.cons).clone()
                    } else {
                        (*cond.alt).clone()
                    };
                }
            }
            Expr::Bin(bin) if self.config.fold_logical => {
                let op = bin.op;
                if matches!(
                    op,
                    BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
                ) {
                    if let Some(left) = evaluate(&bin.left) {
                        let take_right = match op {
                            BinaryOp::LogicalAnd => left.truthy(),
                            BinaryOp::LogicalOr => !left.truthy(),
                            BinaryOp::NullishCoalescing => left.nullish(),
                            _ => unreachable!(),
                        };
                        self.stats.incr("logicalExpressionsFolded");
                        *expr = if take_right {
                            (*bin.right).clone()
                        } else {
                            (*bin.left).clone()
                        };
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(program: &mut Program, config: &Value) -> Value {
    let mut pass = Pass {
        config: Config::from_json(config),
        stats: Stats::new(),
    };
    program.visit_mut_with(&mut pass);
    pass.stats.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::services::{generate_program, parse};

    #[test]
    fn if_true_else_keeps_else_branch() {
        let mut ast = parse("if(!1){console.log('x')} else {console.log('y')}").unwrap();
        crate::simplify_literals::run(&mut ast.program, &Value::Null);
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("\"y\""));
        assert!(!code.contains("\"x\""));
    }

    #[test]
    fn if_false_without_else_is_removed() {
        let mut ast = parse("if(false){foo();}").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(!code.contains("foo"));
    }

    #[test]
    fn logical_and_short_circuits_on_true() {
        let mut ast = parse("var y = true && x;").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("var y = x"));
    }

    #[test]
    fn nullish_coalescing_keeps_non_nullish_left() {
        let mut ast = parse("var y = 1 ?? x;").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("var y = 1"));
    }

    #[test]
    fn true_if_with_multiple_statements_splices_into_the_enclosing_list() {
        let mut ast = parse("function f() { if (true) { foo(); bar(); } }").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("foo()"));
        assert!(code.contains("bar()"));
        assert!(!code.contains('{') || code.matches('{').count() == 1, "body should be spliced, not left wrapped in its own block: {code}");
    }
}
