//! String Decoding (`decodeStrings`, §4.3.4).
//!
//! Each sub-transform is opt-in and defaults to `false` unless `all: true`
//! is set in the step config — these rewrites are the most likely to change
//! runtime behavior on inputs that don't actually match the obfuscation
//! idiom being targeted (e.g. a user-defined `atob` shadowing the global).
//! `maxStringLength` (default 50,000) bounds both the output of any single
//! fold and the recursion depth implied by chained calls, since a
//! `"x".repeat(1e9)`-shaped input would otherwise blow up memory.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use swc_ecma_ast::{Callee, Expr, Lit, MemberProp, Program, Str};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::eval::evaluate;
use crate::stats::Stats;

const DEFAULT_MAX_LEN: usize = 50_000;

struct Config {
    hex_escapes: bool,
    unicode_escapes: bool,
    from_char_code: bool,
    atob: bool,
    base64: bool,
    char_at: bool,
    split_reverse_join: bool,
    replace: bool,
    max_string_length: usize,
}

impl Config {
    fn from_json(value: &Value) -> Self {
        let all = value.get("all").and_then(Value::as_bool).unwrap_or(false);
        let b = |key: &str| value.get(key).and_then(Value::as_bool).unwrap_or(all);
        Self {
            hex_escapes: b("hexEscapes"),
            unicode_escapes: b("unicodeEscapes"),
            from_char_code: b("fromCharCode"),
            atob: b("atob"),
            base64: b("base64"),
            char_at: b("charAt"),
            split_reverse_join: b("splitReverseJoin"),
            replace: b("replace"),
            max_string_length: value
                .get("maxStringLength")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_MAX_LEN),
        }
    }
}

fn str_lit(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str(),
        _ => None,
    }
}

fn num_lit(expr: &Expr) -> Option<f64> {
    match evaluate(expr) {
        Some(crate::eval::Const::Num(n)) => Some(n),
        _ => None,
    }
}

fn member_call<'a>(expr: &'a Expr) -> Option<(&'a Expr, &'a str, &'a [swc_ecma_ast::ExprOrSpread])> {
    let Expr::Call(call) = expr else { return None };
    let Callee::Expr(callee) = &call.callee else { return None };
    let Expr::Member(member) = callee.as_ref() else { return None };
    let MemberProp::Ident(prop) = &member.prop else { return None };
    Some((&member.obj, prop.sym.as_ref(), &call.args))
}

fn ident_call<'a>(expr: &'a Expr) -> Option<(&'a str, &'a [swc_ecma_ast::ExprOrSpread])> {
    let Expr::Call(call) = expr else { return None };
    let Callee::Expr(callee) = &call.callee else { return None };
    let Expr::Ident(ident) = callee.as_ref() else { return None };
    Some((ident.sym.as_ref(), &call.args))
}

/// Resolves a sub-expression to a decoded string, tagging which sub-option
/// was responsible so the caller can bump the matching counter.
fn eval_str(expr: &Expr, cfg: &Config) -> Option<(String, &'static str)> {
    if let Some(s) = str_lit(expr) {
        return Some((s.to_string(), "literal"));
    }

    if cfg.from_char_code {
        if let Some(("fromCharCode", args)) = member_call(expr).map(|(obj, name, args)| {
            let is_string_global = matches!(obj, Expr::Ident(id) if id.sym.as_ref() == "String");
            (if is_string_global { name } else { "" }, args)
        }) {
            let mut out = String::new();
            for arg in args {
                let code = num_lit(&arg.expr)?;
                out.push(char::from_u32(code as u32)?);
            }
            return within_limit(out, cfg, "fromCharCodeDecoded");
        }
    }

    if cfg.atob {
        if let Some(("atob", args)) = ident_call(expr) {
            let (inner, _) = eval_str(&args.first()?.expr, cfg)?;
            let bytes = STANDARD.decode(inner.as_bytes()).ok()?;
            return within_limit(String::from_utf8_lossy(&bytes).into_owned(), cfg, "atobDecoded");
        }
    }

    if cfg.base64 {
        if let Some((obj, "from", args)) = member_call(expr) {
            if matches!(obj, Expr::Ident(id) if id.sym.as_ref() == "Buffer") {
                let (data, _) = eval_str(&args.first()?.expr, cfg)?;
                let encoding = str_lit(&args.get(1)?.expr)?;
                if encoding == "base64" {
                    let bytes = STANDARD.decode(data.as_bytes()).ok()?;
                    return within_limit(String::from_utf8_lossy(&bytes).into_owned(), cfg, "base64Decoded");
                }
            }
        }
    }

    if cfg.char_at {
        if let Some((obj, "charAt", args)) = member_call(expr) {
            let (base, _) = eval_str(obj, cfg)?;
            let idx = num_lit(&args.first()?.expr)? as usize;
            return within_limit(base.chars().nth(idx)?.to_string(), cfg, "charAtFolded");
        }
        if let Expr::Member(member) = expr {
            if let MemberProp::Computed(computed) = &member.prop {
                let (base, _) = eval_str(&member.obj, cfg)?;
                let idx = num_lit(&computed.expr)? as usize;
                return within_limit(base.chars().nth(idx)?.to_string(), cfg, "bracketIndexFolded");
            }
        }
    }

    if cfg.replace {
        if let Some((obj, "replace", args)) = member_call(expr) {
            let (base, _) = eval_str(obj, cfg)?;
            let (pattern, _) = eval_str(&args.first()?.expr, cfg)?;
            let (replacement, _) = eval_str(&args.get(1)?.expr, cfg)?;
            return within_limit(base.replacen(&pattern, &replacement, 1), cfg, "replaceFolded");
        }
    }

    if cfg.split_reverse_join {
        if let Some((reversed, "join", join_args)) = member_call(expr) {
            if let Some((split_call, "reverse", _)) = member_call(reversed) {
                if let Some((base, "split", split_args)) = member_call(split_call) {
                    let (base_str, _) = eval_str(base, cfg)?;
                    let (sep, _) = eval_str(&split_args.first()?.expr, cfg)?;
                    let (join_sep, _) = eval_str(&join_args.first()?.expr, cfg)?;
                    let mut parts: Vec<&str> = base_str.split(sep.as_str()).collect();
                    parts.reverse();
                    return within_limit(parts.join(&join_sep), cfg, "splitReverseJoinFolded");
                }
            }
        }
    }

    None
}

fn within_limit(s: String, cfg: &Config, tag: &'static str) -> Option<(String, &'static str)> {
    if s.len() > cfg.max_string_length {
        None
    } else {
        Some((s, tag))
    }
}

struct Pass {
    cfg: Config,
    stats: Stats,
}

impl VisitMut for Pass {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        if let Expr::Lit(Lit::Str(s)) = expr {
            if s.raw.is_some() && (self.cfg.hex_escapes || self.cfg.unicode_escapes) {
                s.raw = None;
                self.stats.incr("escapesNormalized");
            }
            return;
        }

        if matches!(expr, Expr::Call(_) | Expr::Member(_)) {
            if let Some((decoded, tag)) = eval_str(expr, &self.cfg) {
                if tag != "literal" {
                    self.stats.incr(tag);
                    *expr = Expr::Lit(Lit::Str(Str {
                        span: Default::default(),
                        value: decoded.into(),
                        raw: None,
                    }));
                }
            }
        }
    }
}

pub fn run(program: &mut Program, config: &Value) -> Value {
    let mut pass = Pass {
        cfg: Config::from_json(config),
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
    fn decodes_from_char_code() {
        let mut ast = parse("var x = String.fromCharCode(72, 105);").unwrap();
        run(&mut ast.program, &serde_json::json!({"all": true}));
        assert!(generate_program(&ast.program).unwrap().contains("\"Hi\""));
    }

    #[test]
    fn decodes_atob() {
        let mut ast = parse("var x = atob(\"aGk=\");").unwrap();
        run(&mut ast.program, &serde_json::json!({"all": true}));
        assert!(generate_program(&ast.program).unwrap().contains("\"hi\""));
    }

    #[test]
    fn decodes_buffer_from_base64() {
        let mut ast = parse("var x = Buffer.from(\"aGk=\", \"base64\");").unwrap();
        run(&mut ast.program, &serde_json::json!({"all": true}));
        assert!(generate_program(&ast.program).unwrap().contains("\"hi\""));
    }

    #[test]
    fn folds_char_at() {
        let mut ast = parse("var x = \"hello\".charAt(1);").unwrap();
        run(&mut ast.program, &serde_json::json!({"all": true}));
        assert!(generate_program(&ast.program).unwrap().contains("\"e\""));
    }

    #[test]
    fn respects_disabled_options() {
        let mut ast = parse("var x = atob(\"aGk=\");").unwrap();
        let stats = run(&mut ast.program, &Value::Null);
        assert_eq!(stats["changes"], 0);
        assert!(generate_program(&ast.program).unwrap().contains("atob"));
    }

    #[test]
    fn folds_split_reverse_join() {
        let mut ast = parse("var x = \"a,b,c\".split(\",\").reverse().join(\"-\");").unwrap();
        run(&mut ast.program, &serde_json::json!({"all": true}));
        assert!(generate_program(&ast.program).unwrap().contains("\"c-b-a\""));
    }
}
