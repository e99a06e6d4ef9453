//! Scope analysis (§6 `POST /api/transform/analyze-scope`): walks a parsed
//! program building the binding/reference map a host UI uses to highlight
//! a name's declaration and every read/write site.
//!
//! Two passes over the same tree, mirroring how a real scope-crawl works:
//! the first records each scope's declarations (functions and blocks open
//! a scope; `var` hoists to the nearest function/program scope, `let`/
//! `const`/function params are scoped to where they appear), the second
//! walks again resolving every identifier *use* to the nearest enclosing
//! scope that declares it and recording the use's location.

use std::collections::BTreeMap;

use serde::Serialize;
use swc_common::{sync::Lrc, SourceMap, Span};
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, ClassDecl, FnDecl, FnExpr, Function, Ident, ImportSpecifier, Pat,
    Program, VarDeclKind,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::error::AstResult;
use crate::services::parse_with_source_map;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindingInfo {
    pub kind: String,
    pub constant: bool,
    pub references: Vec<Loc>,
    pub loc: Loc,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopeInfo {
    #[serde(rename = "type")]
    pub scope_type: String,
    pub loc: Loc,
    pub bindings: BTreeMap<String, BindingInfo>,
}

struct ScopeNode {
    scope_type: &'static str,
    span: Span,
    loc: Loc,
    parent: Option<usize>,
    /// `true` for function/program scopes, which `var` hoists to.
    is_hoist_target: bool,
    bindings: BTreeMap<String, (String, bool, Loc)>,
}

struct DeclCollector<'a> {
    cm: &'a Lrc<SourceMap>,
    scopes: Vec<ScopeNode>,
    current: usize,
}

impl<'a> DeclCollector<'a> {
    fn loc(&self, span: Span) -> Loc {
        let pos = self.cm.lookup_char_pos(span.lo);
        Loc { line: pos.line, column: pos.col_display }
    }

    fn push_scope(&mut self, scope_type: &'static str, span: Span, is_hoist_target: bool) -> usize {
        let parent = if self.scopes.is_empty() { None } else { Some(self.current) };
        let loc = self.loc(span);
        let node = ScopeNode { scope_type, span, loc, parent, is_hoist_target, bindings: BTreeMap::new() };
        self.scopes.push(node);
        self.scopes.len() - 1
    }

    fn hoist_target(&self, mut idx: usize) -> usize {
        while !self.scopes[idx].is_hoist_target {
            match self.scopes[idx].parent {
                Some(p) => idx = p,
                None => break,
            }
        }
        idx
    }

    fn declare(&mut self, name: &str, kind: &str, span: Span, hoisted: bool) {
        let loc = self.loc(span);
        let target = if hoisted { self.hoist_target(self.current) } else { self.current };
        self.scopes[target].bindings.entry(name.to_string()).or_insert((kind.to_string(), kind == "const", loc));
    }

    fn declare_pat(&mut self, pat: &Pat, kind: &str, hoisted: bool) {
        for ident in pat_idents(pat) {
            self.declare(ident.sym.as_ref(), kind, ident.span, hoisted);
        }
    }
}

fn pat_idents(pat: &Pat) -> Vec<&Ident> {
    let mut out = Vec::new();
    collect_pat_idents(pat, &mut out);
    out
}

fn collect_pat_idents<'p>(pat: &'p Pat, out: &mut Vec<&'p Ident>) {
    match pat {
        Pat::Ident(binding) => out.push(&binding.id),
        Pat::Array(arr) => {
            for elem in arr.elems.iter().flatten() {
                collect_pat_idents(elem, out);
            }
        }
        Pat::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    swc_ecma_ast::ObjectPatProp::KeyValue(kv) => collect_pat_idents(&kv.value, out),
                    swc_ecma_ast::ObjectPatProp::Assign(a) => out.push(&a.key.id),
                    swc_ecma_ast::ObjectPatProp::Rest(r) => collect_pat_idents(&r.arg, out),
                }
            }
        }
        Pat::Assign(a) => collect_pat_idents(&a.left, out),
        Pat::Rest(r) => collect_pat_idents(&r.arg, out),
        Pat::Expr(_) | Pat::Invalid(_) => {}
    }
}

impl<'a> Visit for DeclCollector<'a> {
    fn visit_program(&mut self, program: &Program) {
        let span = program_span(program);
        self.current = self.push_scope("program", span, true);
        program.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.declare(node.ident.sym.as_ref(), "function", node.ident.span, true);
        self.visit_function(&node.function);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        self.visit_function(&node.function);
    }

    fn visit_function(&mut self, node: &Function) {
        let parent = self.current;
        self.current = self.push_scope("function", node.span, true);
        for param in &node.params {
            self.declare_pat(&param.pat, "param", false);
        }
        if let Some(body) = &node.body {
            body.visit_children_with(self);
        }
        self.current = parent;
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let parent = self.current;
        self.current = self.push_scope("function", node.span, true);
        for param in &node.params {
            self.declare_pat(param, "param", false);
        }
        node.body.visit_children_with(self);
        self.current = parent;
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        let parent = self.current;
        self.current = self.push_scope("block", node.span, false);
        node.visit_children_with(self);
        self.current = parent;
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.declare(node.ident.sym.as_ref(), "class", node.ident.span, true);
        node.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, node: &swc_ecma_ast::VarDecl) {
        let kind = match node.kind {
            VarDeclKind::Var => "var",
            VarDeclKind::Let => "let",
            VarDeclKind::Const => "const",
        };
        let hoisted = matches!(node.kind, VarDeclKind::Var);
        for declarator in &node.decls {
            self.declare_pat(&declarator.name, kind, hoisted);
        }
        node.visit_children_with(self);
    }

    fn visit_import_specifier(&mut self, node: &ImportSpecifier) {
        let ident = match node {
            ImportSpecifier::Named(n) => &n.local,
            ImportSpecifier::Default(d) => &d.local,
            ImportSpecifier::Namespace(n) => &n.local,
        };
        self.declare(ident.sym.as_ref(), "import", ident.span, true);
    }
}

fn program_span(program: &Program) -> Span {
    match program {
        Program::Module(m) => m.span,
        Program::Script(s) => s.span,
    }
}

struct RefWalker<'a> {
    cm: &'a Lrc<SourceMap>,
    scopes: &'a mut Vec<ScopeNode>,
    refs: Vec<Vec<(String, Loc)>>,
    current: usize,
}

impl<'a> RefWalker<'a> {
    fn loc(&self, span: Span) -> Loc {
        let pos = self.cm.lookup_char_pos(span.lo);
        Loc { line: pos.line, column: pos.col_display }
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if self.scopes[i].bindings.contains_key(name) {
                return Some(i);
            }
            idx = self.scopes[i].parent;
        }
        None
    }
}

impl<'a> Visit for RefWalker<'a> {
    fn visit_ident(&mut self, node: &Ident) {
        let name = node.sym.to_string();
        if let Some(scope_idx) = self.resolve(&name) {
            let loc = self.loc(node.span);
            self.refs[scope_idx].push((name, loc));
        }
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        let child = find_child_scope(self.scopes, self.current, node.span);
        let parent = self.current;
        if let Some(child) = child {
            self.current = child;
        }
        node.visit_children_with(self);
        self.current = parent;
    }

    fn visit_function(&mut self, node: &Function) {
        let child = find_child_scope(self.scopes, self.current, node.span);
        let parent = self.current;
        if let Some(child) = child {
            self.current = child;
        }
        if let Some(body) = &node.body {
            body.visit_children_with(self);
        }
        self.current = parent;
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let child = find_child_scope(self.scopes, self.current, node.span);
        let parent = self.current;
        if let Some(child) = child {
            self.current = child;
        }
        node.body.visit_children_with(self);
        self.current = parent;
    }
}

/// Both passes visit the same tree in the same order, so a scope created
/// during declaration collection can be recovered here by matching the
/// exact span it was opened with.
fn find_child_scope(scopes: &[ScopeNode], parent: usize, span: Span) -> Option<usize> {
    scopes
        .iter()
        .position(|s| s.parent == Some(parent) && s.span == span)
}

/// Runs scope analysis over `source`, returning one [`ScopeInfo`] per
/// function/block/program scope in declaration order.
pub fn analyze_scope(source: &str) -> AstResult<Vec<ScopeInfo>> {
    let (cm, program) = parse_with_source_map(source)?;

    let mut collector = DeclCollector { cm: &cm, scopes: Vec::new(), current: 0 };
    collector.visit_program(&program);
    let DeclCollector { scopes, .. } = collector;

    let mut scopes = scopes;
    let scope_count = scopes.len();
    let mut walker = RefWalker { cm: &cm, scopes: &mut scopes, refs: vec![Vec::new(); scope_count], current: 0 };
    walker.visit_program(&program);
    let refs = walker.refs;

    Ok(scopes
        .into_iter()
        .enumerate()
        .map(|(idx, scope)| {
            let mut bindings: BTreeMap<String, BindingInfo> = scope
                .bindings
                .into_iter()
                .map(|(name, (kind, constant, loc))| (name, BindingInfo { kind, constant, references: Vec::new(), loc }))
                .collect();
            for (name, loc) in &refs[idx] {
                if let Some(binding) = bindings.get_mut(name) {
                    binding.references.push(*loc);
                }
            }
            ScopeInfo { scope_type: scope.scope_type.to_string(), loc: scope.loc, bindings }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_program_scope_binding_with_references() {
        let scopes = analyze_scope("var x = 1; console.log(x);").unwrap();
        let program_scope = &scopes[0];
        assert_eq!(program_scope.scope_type, "program");
        let binding = &program_scope.bindings["x"];
        assert_eq!(binding.kind, "var");
        assert!(!binding.references.is_empty());
    }

    #[test]
    fn const_binding_is_marked_constant() {
        let scopes = analyze_scope("const y = 2;").unwrap();
        assert!(scopes[0].bindings["y"].constant);
    }

    #[test]
    fn function_params_scope_to_the_function() {
        let scopes = analyze_scope("function f(a) { return a + 1; }").unwrap();
        let fn_scope = scopes.iter().find(|s| s.scope_type == "function").unwrap();
        assert!(fn_scope.bindings.contains_key("a"));
    }
}
