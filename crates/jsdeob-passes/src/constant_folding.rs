//! Constant Folding (`constantFolding`, §4.3.1).
//!
//! Folds binary expressions where both operands are `NumericLiteral` for
//! `+ - * /`. Non-finite results abort the rewrite (`1/0` is left alone —
//! `simplifyLiterals` owns turning that into `Infinity`). The pipeline
//! driver threads the `iterations` count from the recipe step, so deeper
//! additive chains fold by repeated application rather than recursion here.

use serde_json::Value;
use swc_ecma_ast::{BinExpr, BinaryOp, Expr, Lit, Number, Program};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::stats::Stats;

struct Folder {
    stats: Stats,
}

impl VisitMut for Folder {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        if let Expr::Bin(bin) = expr {
            if let Some(folded) = try_fold(bin) {
                self.stats.incr("binaryExpressionsFolded");
                *expr = Expr::Lit(Lit::Num(Number {
                    span: bin.span,
                    value: folded,
                    raw: None,
                }));
            }
        }
    }
}

fn try_fold(bin: &BinExpr) -> Option<f64> {
    let left = as_number(&bin.left)?;
    let right = as_number(&bin.right)?;

    let result = match bin.op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        _ => return None,
    };

    if result.is_finite() { Some(result) } else { None }
}

fn as_number(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Lit(Lit::Num(n)) => Some(n.value),
        _ => None,
    }
}

pub fn run(program: &mut Program, _config: &Value) -> Value {
    let mut folder = Folder { stats: Stats::new() };
    program.visit_mut_with(&mut folder);
    folder.stats.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::services::{generate_program, parse};

    #[test]
    fn folds_additive_chain() {
        let mut ast = parse("var x = 1 + 2 + 3;").unwrap();
        run(&mut ast.program, &Value::Null);
        run(&mut ast.program, &Value::Null); // driver re-applies per iteration count
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("6"));
    }

    #[test]
    fn does_not_fold_division_by_zero() {
        let mut ast = parse("var x = 1 / 0;").unwrap();
        let stats = run(&mut ast.program, &Value::Null);
        assert_eq!(stats["binaryExpressionsFolded"], 0);
    }

    #[test]
    fn folds_hex_literals() {
        let mut ast = parse("var x = 0x10 + 0x20;").unwrap();
        run(&mut ast.program, &Value::Null);
        let code = generate_program(&ast.program).unwrap();
        assert!(code.contains("48"));
    }
}
