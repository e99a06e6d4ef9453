//! Conservative constant evaluation shared by the opaque-predicate and
//! literal-simplification passes.
//!
//! Mirrors the semantics §9 specifies for `Path.evaluate()`: confident only
//! when the subtree has no free identifiers except `undefined`, `NaN`, and
//! `Infinity`, and only performs the operations named in §4.3.2/§4.3.6.
//! Any function call or other identifier lookup yields "not confident".

use swc_ecma_ast::{BinaryOp, Expr, Lit, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
}

impl Const {
    pub fn truthy(&self) -> bool {
        match self {
            Const::Num(n) => *n != 0.0 && !n.is_nan(),
            Const::Str(s) => !s.is_empty(),
            Const::Bool(b) => *b,
            Const::Null | Const::Undefined => false,
        }
    }

    pub fn nullish(&self) -> bool {
        matches!(self, Const::Null | Const::Undefined)
    }
}

/// A best-effort, conservative evaluator. Returns `None` ("not confident")
/// for anything beyond literals, `undefined`/`NaN`/`Infinity`, and the
/// small set of composed operators these passes care about.
pub fn evaluate(expr: &Expr) -> Option<Const> {
    match expr {
        Expr::Lit(lit) => eval_lit(lit),
        Expr::Ident(id) => match id.sym.as_ref() {
            "undefined" => Some(Const::Undefined),
            "NaN" => Some(Const::Num(f64::NAN)),
            "Infinity" => Some(Const::Num(f64::INFINITY)),
            _ => None,
        },
        Expr::Paren(p) => evaluate(&p.expr),
        Expr::Unary(u) => eval_unary(u.op, &u.arg),
        Expr::Bin(b) => eval_binary(b.op, &b.left, &b.right),
        Expr::Cond(c) => {
            let test = evaluate(&c.test)?;
            if test.truthy() {
                evaluate(&c.cons)
            } else {
                evaluate(&c.alt)
            }
        }
        _ => None,
    }
}

fn eval_lit(lit: &Lit) -> Option<Const> {
    match lit {
        Lit::Num(n) => Some(Const::Num(n.value)),
        Lit::Str(s) => Some(Const::Str(s.value.to_string_lossy().into_owned())),
        Lit::Bool(b) => Some(Const::Bool(b.value)),
        Lit::Null(_) => Some(Const::Null),
        _ => None,
    }
}

fn eval_unary(op: UnaryOp, arg: &Expr) -> Option<Const> {
    let value = evaluate(arg)?;
    match op {
        UnaryOp::Bang => Some(Const::Bool(!value.truthy())),
        UnaryOp::Minus => match value {
            Const::Num(n) => Some(Const::Num(-n)),
            _ => None,
        },
        UnaryOp::Plus => match value {
            Const::Num(n) => Some(Const::Num(n)),
            Const::Bool(b) => Some(Const::Num(if b { 1.0 } else { 0.0 })),
            _ => None,
        },
        UnaryOp::Void => Some(Const::Undefined),
        UnaryOp::TypeOf => None, // handled separately by simplify_literals (needs the raw expr)
        _ => None,
    }
}

fn eval_binary(op: BinaryOp, left: &Expr, right: &Expr) -> Option<Const> {
    // `??` and short-circuit `&&`/`||` need access to the unevaluated
    // right-hand side, which callers in opaque_predicate handle directly;
    // this function only covers the arithmetic/comparison subset that
    // yields a single scalar result regardless of branch.
    let l = evaluate(left)?;
    let r = evaluate(right)?;

    match (op, l, r) {
        (BinaryOp::Add, Const::Num(a), Const::Num(b)) => Some(Const::Num(a + b)),
        (BinaryOp::Sub, Const::Num(a), Const::Num(b)) => Some(Const::Num(a - b)),
        (BinaryOp::Mul, Const::Num(a), Const::Num(b)) => Some(Const::Num(a * b)),
        (BinaryOp::Div, Const::Num(a), Const::Num(b)) => Some(Const::Num(a / b)),
        (BinaryOp::Add, Const::Str(a), Const::Str(b)) => Some(Const::Str(a + b.as_str())),
        (BinaryOp::EqEqEq, a, b) => Some(Const::Bool(a == b)),
        (BinaryOp::NotEqEq, a, b) => Some(Const::Bool(a != b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_ecma_ast::Bool as AstBool;

    #[test]
    fn bang_zero_is_true() {
        let zero = Expr::Lit(Lit::Num(swc_ecma_ast::Number {
            span: Default::default(),
            value: 0.0,
            raw: None,
        }));
        let result = eval_unary(UnaryOp::Bang, &zero).unwrap();
        assert_eq!(result, Const::Bool(true));
    }

    #[test]
    fn literal_bool_truthy() {
        let b = Lit::Bool(AstBool {
            span: Default::default(),
            value: true,
        });
        assert!(eval_lit(&b).unwrap().truthy());
    }
}
