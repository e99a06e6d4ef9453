//! Bracket-to-dot (§4.3.8, category `"utilities"`): rewrite
//! `MemberExpression[computed=true]` with a string-literal property that
//! looks like an identifier into non-computed dot access.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use swc_ecma_ast::{Expr, IdentName, Lit, MemberProp, Program};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::stats::Stats;

static IDENT_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

struct Pass {
    stats: Stats,
}

impl VisitMut for Pass {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let Expr::Member(member) = expr else { return };
        let MemberProp::Computed(computed) = &member.prop else { return };
        let Expr::Lit(Lit::Str(s)) = computed.expr.as_ref() else { return };
        let Some(value_str) = s.value.as_str() else { return };
        if !IDENT_LIKE.is_match(value_str) {
            return;
        }

        let ident = IdentName::new(s.value.to_atom_lossy().into_owned(), computed.span);
        member.prop = MemberProp::Ident(ident);
        self.stats.incr("bracketAccessesConverted");
    }
}

pub fn run(program: &mut Program, _config: &Value) -> Value {
    let mut pass = Pass { stats: Stats::new() };
    program.visit_mut_with(&mut pass);
    pass.stats.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::services::{generate_program, parse};

    #[test]
    fn converts_identifier_like_key() {
        let mut ast = parse("a[\"b\"];").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("a.b"));
    }

    #[test]
    fn leaves_non_identifier_key_alone() {
        let mut ast = parse("a[\"0b\"];").unwrap();
        run(&mut ast.program, &Value::Null);
        assert!(generate_program(&ast.program).unwrap().contains("a[\"0b\"]"));
    }
}
