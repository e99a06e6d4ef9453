//! Assembles one transform invocation's capability surface (§4.2) on top of
//! a fresh boa `Context`: the bootstrap library (`t`/`types`/`traverse`),
//! the captured `console`, the `parser`/`generate` AST-services bridge, the
//! policy-gated `run()` escape hatch, and the `module`/`exports` shim.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use boa_engine::object::ObjectInitializer;
use boa_engine::property::Attribute;
use boa_engine::{js_string, Context, JsArgs, JsResult, JsValue, NativeFunction, Source};

use jsdeob_ast::json::{json_to_program, program_to_json};
use jsdeob_ast::model::LogEntry;
use jsdeob_ast::services::{generate_program, parse};

use crate::apis::console::{self, LogBuffer};
use crate::config::RuntimePolicy;
use crate::error::{RuntimeError, RuntimeResult};

const BOOTSTRAP_JS: &str = include_str!("bootstrap.js");

/// A ready-to-use host environment for one transform execution. Not reused
/// across invocations — each call to [`build`] starts from a clean `ast`
/// binding, fresh `logs`, and a fresh `modified` flag (§4.2: "execute one
/// user-authored transform against a shared AST").
pub struct Capabilities {
    pub ctx: Context,
    pub logs: LogBuffer,
    pub modified: Rc<Cell<bool>>,
}

pub fn build(policy: &RuntimePolicy) -> RuntimeResult<Capabilities> {
    let mut ctx = Context::default();

    ctx.eval(Source::from_bytes(BOOTSTRAP_JS))
        .map_err(|e| RuntimeError::internal(format!("bootstrap script failed to load: {e}")))?;

    let logs: LogBuffer = Rc::new(RefCell::new(Vec::new()));
    console::install(&mut ctx, logs.clone(), policy.max_log_entries);

    let modified = Rc::new(Cell::new(false));
    install_mark_modified(&mut ctx, modified.clone())?;
    install_parser(&mut ctx)?;
    install_generate(&mut ctx)?;
    install_run(&mut ctx, policy.allow_eval, logs.clone())?;
    install_module_exports(&mut ctx)?;

    Ok(Capabilities { ctx, logs, modified })
}

fn to_global_function(ctx: &mut Context, name: &str, function: NativeFunction) -> RuntimeResult<()> {
    let realm = ctx.realm().clone();
    let js_function = function.to_js_function(&realm);
    ctx.register_global_property(js_string!(name), js_function, Attribute::all())
        .map_err(|e| RuntimeError::internal(format!("failed to register `{name}`: {e}")))?;
    Ok(())
}

/// `traverse` in `bootstrap.js` calls this on every run so `modified`
/// reflects "the transform called traverse at least once" (§4.2), not
/// "the transform changed anything" — a no-op visitor still counts, tracking
/// call-sites rather than diffing state.
fn install_mark_modified(ctx: &mut Context, modified: Rc<Cell<bool>>) -> RuntimeResult<()> {
    // SAFETY: closure only sets a Cell<bool>, never re-enters the context.
    let f = unsafe {
        NativeFunction::from_closure(move |_this, _args, _ctx| -> JsResult<JsValue> {
            modified.set(true);
            Ok(JsValue::undefined())
        })
    };
    to_global_function(ctx, "__markModified", f)
}

fn js_err(message: impl std::fmt::Display) -> boa_engine::JsError {
    boa_engine::JsNativeError::typ().with_message(message.to_string()).into()
}

fn install_parser(ctx: &mut Context) -> RuntimeResult<()> {
    // SAFETY: closure only touches its own arguments/context, no captured
    // shared state.
    let parse_fn = unsafe {
        NativeFunction::from_closure(|_this, args, ctx| -> JsResult<JsValue> {
            let code = args.get_or_undefined(0).to_string(ctx)?.to_std_string_escaped();
            let ast = parse(&code).map_err(js_err)?;
            let json = program_to_json(&ast.program).map_err(js_err)?;
            JsValue::from_json(&json, ctx)
        })
    };
    let realm = ctx.realm().clone();
    let parse_js = parse_fn.to_js_function(&realm);
    let parser = ObjectInitializer::new(ctx)
        .property(js_string!("parse"), parse_js, Attribute::all())
        .build();
    ctx.register_global_property(js_string!("parser"), parser, Attribute::all())
        .map_err(|e| RuntimeError::internal(format!("failed to register `parser`: {e}")))?;
    Ok(())
}

fn install_generate(ctx: &mut Context) -> RuntimeResult<()> {
    // SAFETY: closure only touches its own arguments/context.
    let generate_fn = unsafe {
        NativeFunction::from_closure(|_this, args, ctx| -> JsResult<JsValue> {
            let node_json = args.get_or_undefined(0).to_json(ctx)?;
            let program = json_to_program(node_json).map_err(js_err)?;
            let code = generate_program(&program).map_err(js_err)?;
            let result = ObjectInitializer::new(ctx)
                .property(js_string!("code"), js_string!(code), Attribute::all())
                .build();
            Ok(result.into())
        })
    };
    to_global_function(ctx, "generate", generate_fn)
}

/// Installs the `run(codeString)` escape hatch (§4.2). When `allow_eval` is
/// false the binding still exists but logs an error and returns `undefined`
/// — an explicit host policy switch, not a missing capability (§9).
fn install_run(ctx: &mut Context, allow_eval: bool, logs: LogBuffer) -> RuntimeResult<()> {
    // SAFETY: closure only touches the captured LogBuffer and its own
    // context argument, never stores a `Context` reference past the call.
    let run_fn = unsafe {
        NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
            if !allow_eval {
                logs.borrow_mut().push(LogEntry {
                    level: "error".to_string(),
                    args: vec!["run() is disabled by host policy".to_string()],
                });
                return Ok(JsValue::undefined());
            }
            let code = args.get_or_undefined(0).to_string(ctx)?.to_std_string_escaped();
            match ctx.eval(Source::from_bytes(&code)) {
                Ok(value) => Ok(value),
                Err(e) => {
                    logs.borrow_mut().push(LogEntry {
                        level: "error".to_string(),
                        args: vec![e.to_string()],
                    });
                    Ok(JsValue::undefined())
                }
            }
        })
    };
    to_global_function(ctx, "run", run_fn)
}

fn install_module_exports(ctx: &mut Context) -> RuntimeResult<()> {
    ctx.eval(Source::from_bytes(
        "globalThis.module = { exports: {} }; globalThis.exports = globalThis.module.exports;",
    ))
    .map_err(|e| RuntimeError::internal(format!("failed to seed module/exports: {e}")))?;
    Ok(())
}
