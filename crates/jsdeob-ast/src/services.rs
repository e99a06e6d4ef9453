//! AST Services (§4.1): parse, generate, format.
//!
//! Thin façade over SWC's parser and printer, adapted from
//! `otter-runtime::transpiler`. Unlike that module, this one is not
//! transpiling TypeScript down to JavaScript — it parses source into an
//! owned [`Ast`] and prints an [`Ast`] back into source, preserving
//! whatever syntax was present (TS types, JSX, decorators) since the whole
//! point of this workbench is to mutate and re-emit obfuscated code, not to
//! strip it.

use std::panic::{self, AssertUnwindSafe};

use swc_common::{FileName, SourceMap, sync::Lrc};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_codegen::{Config as CodegenConfig, Emitter, text_writer::JsWriter};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax, lexer::Lexer};

use crate::error::{AstError, AstResult};
use crate::nesting::nesting_depth;

/// Hard cap on bracket-nesting depth (§3 invariant).
pub const MAX_NESTING_DEPTH: usize = 500;

/// An owned, parsed AST. Exclusively owned by whoever holds it for the
/// duration of a run (§3): the pipeline driver during a recipe run, or a
/// caller of the standalone services directly.
#[derive(Debug, Clone)]
pub struct Ast {
    pub program: Program,
}

impl Ast {
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    pub fn is_module(&self) -> bool {
        matches!(self.program, Program::Module(_))
    }
}

fn permissive_syntax() -> Syntax {
    // The most permissive grammar SWC offers: TypeScript syntax with TSX
    // enabled also accepts plain JS and JSX; legacy decorators are opt-in
    // via `decorators: true`. This matches §4.1's requirement to accept
    // "ECMAScript with non-standard extensions commonly used in obfuscated
    // code (JSX, TypeScript syntax, legacy decorators)".
    Syntax::Typescript(TsSyntax {
        tsx: true,
        decorators: true,
        dts: false,
        no_early_errors: true,
        disallow_ambiguous_jsx_like: false,
    })
}

fn plain_js_syntax() -> Syntax {
    Syntax::Es(EsSyntax {
        jsx: true,
        fn_bind: false,
        decorators: true,
        decorators_before_export: false,
        export_default_from: true,
        import_attributes: true,
        allow_super_outside_method: true,
        allow_return_outside_function: true,
        auto_accessors: false,
        explicit_resource_management: false,
    })
}

fn parse_with(
    cm: &Lrc<SourceMap>,
    source: &str,
    filename: &str,
    syntax: Syntax,
) -> AstResult<Program> {
    let fm = cm.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let lexer = Lexer::new(syntax, EsVersion::EsNext, StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);

    // Try module first (the common case for modern obfuscated bundles),
    // fall back to script. Each attempt gets a fresh parser because SWC's
    // parser consumes its input on error.
    let module_result = parser.parse_module();
    if let Ok(module) = module_result {
        return Ok(Program::Module(module));
    }

    let lexer = Lexer::new(syntax, EsVersion::EsNext, StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);
    parser
        .parse_script()
        .map(Program::Script)
        .map_err(|e| AstError::parse(format!("{:?}", e.kind())))
}

/// Parse `source` into an [`Ast`].
///
/// Guards against stack exhaustion on pathologically nested input by
/// running the parse on a dedicated thread with `catch_unwind`, per §4.1's
/// requirement to translate call-stack exhaustion into `DeeplyNested`.
/// Callers that have already run [`nesting_depth`] as a prefilter will
/// rarely hit this path; it exists as a backstop for nesting forms the
/// bracket-counting prefilter cannot see (e.g. deeply chained member
/// expressions without brackets).
pub fn parse(source: &str) -> AstResult<Ast> {
    if nesting_depth(source, MAX_NESTING_DEPTH) > MAX_NESTING_DEPTH {
        return Err(AstError::deeply_nested(
            nesting_depth(source, usize::MAX),
            MAX_NESTING_DEPTH,
        ));
    }

    let cm: Lrc<SourceMap> = Default::default();
    let owned = source.to_string();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        parse_with(&cm, &owned, "input.tsx", permissive_syntax())
            .or_else(|_| parse_with(&cm, &owned, "input.jsx", plain_js_syntax()))
    }));

    match result {
        Ok(Ok(program)) => Ok(Ast::new(program)),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(AstError::deeply_nested(usize::MAX, MAX_NESTING_DEPTH)),
    }
}

/// Print an [`Ast`] back to source.
pub fn generate(ast: &Ast) -> AstResult<String> {
    generate_program(&ast.program)
}

pub fn generate_program(program: &Program) -> AstResult<String> {
    let cm: Lrc<SourceMap> = Default::default();
    // Codegen needs *a* source map entry to anchor spans to, even for a
    // freshly built program with synthetic spans.
    let _fm = cm.new_source_file(Lrc::new(FileName::Custom("output.js".into())), String::new());

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut buf = Vec::new();
        {
            let writer = JsWriter::new(cm.clone(), "\n", &mut buf, None);
            let codegen_config = CodegenConfig::default()
                .with_target(EsVersion::EsNext)
                .with_ascii_only(false)
                .with_minify(false)
                .with_omit_last_semi(false);

            let mut emitter = Emitter {
                cfg: codegen_config,
                cm: cm.clone(),
                comments: None,
                wr: writer,
            };

            match program {
                Program::Module(m) => emitter.emit_module(m),
                Program::Script(s) => emitter.emit_script(s),
            }
            .map_err(|e| AstError::Codegen(e.to_string()))?;
        }
        String::from_utf8(buf).map_err(|e| AstError::Codegen(e.to_string()))
    }));

    match result {
        Ok(inner) => inner,
        Err(_) => Err(AstError::deeply_nested(usize::MAX, MAX_NESTING_DEPTH)),
    }
}

/// Parse then immediately regenerate, producing a canonical reprint of
/// `source`. Used by the pipeline driver to compute a stable diffing
/// baseline, and exposed directly as `format` in §4.1/§6.
pub fn format(source: &str) -> AstResult<String> {
    let ast = parse(source)?;
    generate(&ast)
}

/// Like [`parse`], but also returns the [`SourceMap`] the program's spans
/// were recorded against, for callers (scope analysis) that need to turn a
/// `BytePos` back into a line/column.
pub fn parse_with_source_map(source: &str) -> AstResult<(Lrc<SourceMap>, Program)> {
    if nesting_depth(source, MAX_NESTING_DEPTH) > MAX_NESTING_DEPTH {
        return Err(AstError::deeply_nested(
            nesting_depth(source, usize::MAX),
            MAX_NESTING_DEPTH,
        ));
    }

    let cm: Lrc<SourceMap> = Default::default();
    let owned = source.to_string();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        parse_with(&cm, &owned, "input.tsx", permissive_syntax())
            .or_else(|_| parse_with(&cm, &owned, "input.jsx", plain_js_syntax()))
    }));

    match result {
        Ok(Ok(program)) => Ok((cm, program)),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(AstError::deeply_nested(usize::MAX, MAX_NESTING_DEPTH)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_generates_simple_script() {
        let ast = parse("var x = 1 + 2;").unwrap();
        let code = generate(&ast).unwrap();
        assert!(code.contains("var x"));
    }

    #[test]
    fn parses_jsx() {
        let ast = parse("const el = <div className=\"a\">hi</div>;").unwrap();
        assert!(generate(&ast).is_ok());
    }

    #[test]
    fn parses_typescript_annotations() {
        let ast = parse("function add(a: number, b: number): number { return a + b; }").unwrap();
        let code = generate(&ast).unwrap();
        assert!(code.contains("function add"));
    }

    #[test]
    fn format_is_idempotent() {
        let once = format("var   x=1;").unwrap();
        let twice = format(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_deeply_nested_input() {
        let deeply_nested: String = "[".repeat(600) + "]".repeat(600).as_str();
        let err = parse(&deeply_nested).unwrap_err();
        assert!(matches!(err, AstError::DeeplyNested { .. }));
    }
}
