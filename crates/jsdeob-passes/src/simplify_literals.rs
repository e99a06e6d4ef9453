//! Literal Simplification (`simplifyLiterals`, §4.3.6).
//!
//! Idempotent rewrites of common obfuscation idioms: boolean/undefined
//! shorthand, `typeof` on literals, the `0/0`-family division patterns, and
//! dropping the preserved raw lexeme on hex/binary/octal numerics so the
//! printer re-emits them in decimal.

use serde_json::Value;
use swc_ecma_ast::{BinaryOp, Bool, Expr, Ident, Lit, Program, Str, UnaryExpr, UnaryOp};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::eval::evaluate;
use crate::stats::Stats;

struct Pass {
    convert_to_identifier: bool,
    stats: Stats,
}

fn span_of(expr: &Expr) -> swc_common::Span {
    // Best-effort span passthrough so downstream printing/position
    // reporting isn't totally synthetic; falls back to DUMMY_SP for
    // expression kinds that don't carry one directly.
    match expr {
        Expr::Lit(l) => match l {
            Lit::Num(n) => n.span,
            Lit::Str(s) => s.span,
            Lit::Bool(b) => b.span,
            Lit::Null(n) => n.span,
            _ => Default::default(),
        },
        Expr::Unary(u) => u.span,
        Expr::Bin(b) => b.span,
        _ => Default::default(),
    }
}

impl Pass {
    fn bool_expr(&self, value: bool, span: swc_common::Span) -> Expr {
        if self.convert_to_identifier {
            Expr::Ident(Ident::new_no_ctxt(
                if value { "true" } else { "false" }.into(),
                span,
            ))
        } else {
            Expr::Lit(Lit::Bool(Bool { span, value }))
        }
    }

    fn undefined_expr(&self, span: swc_common::Span) -> Expr {
        Expr::Ident(Ident::new_no_ctxt("undefined".into(), span))
    }

    fn ident_expr(&self, name: &str, span: swc_common::Span) -> Expr {
        Expr::Ident(Ident::new_no_ctxt(name.into(), span))
    }
}

fn typeof_string(arg: &Expr) -> Option<&'static str> {
    match arg {
        Expr::Lit(Lit::Str(_)) => Some("string"),
        Expr::Lit(Lit::Num(_)) => Some("number"),
        Expr::Lit(Lit::Bool(_)) => Some("boolean"),
        Expr::Lit(Lit::Null(_)) => Some("object"),
        Expr::Array(_) => Some("object"),
        Expr::Object(_) => Some("object"),
        Expr::Fn(_) | Expr::Arrow(_) => Some("function"),
        Expr::Ident(id) if id.sym.as_ref() == "undefined" => Some("undefined"),
        _ => None,
    }
}

/// JS-truthiness of `[]`/`{}` is always `true` regardless of contents.
fn is_always_truthy_object(expr: &Expr) -> bool {
    matches!(expr, Expr::Array(_) | Expr::Object(_))
}

impl VisitMut for Pass {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        let span = span_of(expr);

        match expr {
            Expr::Lit(Lit::Num(n)) if n.raw.is_some() => {
                n.raw = None;
                self.stats.incr("numericLiteralsNormalized");
            }
            Expr::Unary(UnaryExpr { op: UnaryOp::Bang, arg, .. }) => {
                if is_always_truthy_object(arg) {
                    self.stats.incr("booleanShorthandsSimplified");
                    *expr = self.bool_expr(false, span);
                } else if let Some(value) = evaluate(arg) {
                    self.stats.incr("booleanShorthandsSimplified");
                    *expr = self.bool_expr(!value.truthy(), span);
                }
            }
            Expr::Unary(UnaryExpr { op: UnaryOp::Void, arg, .. }) => {
                if evaluate(arg).is_some() {
                    self.stats.incr("voidExpressionsSimplified");
                    *expr = self.undefined_expr(span);
                }
            }
            Expr::Unary(UnaryExpr { op: UnaryOp::TypeOf, arg, .. }) => {
                if let Some(ty) = typeof_string(arg) {
                    self.stats.incr("typeofExpressionsSimplified");
                    *expr = Expr::Lit(Lit::Str(Str {
                        span,
                        value: ty.into(),
                        raw: None,
                    }));
                }
            }
            Expr::Bin(bin) if bin.op == BinaryOp::Div => {
                if let (Expr::Lit(Lit::Num(num)), Expr::Lit(Lit::Num(den))) =
                    (bin.left.as_ref(), bin.right.as_ref())
                {
                    if den.value == 0.0 {
                        self.stats.incr("divisionPatternsSimplified");
                        *expr = if num.value == 0.0 {
                            self.ident_expr("NaN", span)
                        } else if num.value > 0.0 {
                            self.ident_expr("Infinity", span)
                        } else {
                            Expr::Unary(UnaryExpr {
                                span,
                                op: UnaryOp::Minus,
                                arg: Box::new(self.ident_expr("Infinity", span)),
                            })
                        };
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(program: &mut Program, config: &Value) -> Value {
    let convert_to_identifier = config
        .get("convertToIdentifier")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut pass = Pass {
        convert_to_identifier,
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
    fn bang_zero_is_true() {
        let mut ast = parse("var x = !0;").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("true"));
    }

    #[test]
    fn bang_one_is_false() {
        let mut ast = parse("var x = !1;").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("false"));
    }

    #[test]
    fn void_zero_is_undefined() {
        let mut ast = parse("var x = void 0;").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("undefined"));
    }

    #[test]
    fn typeof_string_literal() {
        let mut ast = parse("var x = typeof 'x';").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("\"string\""));
    }

    #[test]
    fn typeof_null_is_object() {
        let mut ast = parse("var x = typeof null;").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("\"object\""));
    }

    #[test]
    fn zero_over_zero_is_nan() {
        let mut ast = parse("var x = 0 / 0;").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("NaN"));
    }
}
