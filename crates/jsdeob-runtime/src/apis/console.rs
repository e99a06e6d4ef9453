//! The captured `console` capability (§4.2): `log|warn|error|info` each
//! append a `{type, args}` entry to the invocation's `logs` buffer instead
//! of going through `tracing` — these are data returned to the caller, not
//! operational logs (see `jsdeob-server`'s ambient logging, which is a
//! separate concern).

use std::cell::RefCell;
use std::rc::Rc;

use boa_engine::object::ObjectInitializer;
use boa_engine::property::Attribute;
use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction};

use jsdeob_ast::model::LogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl ConsoleLevel {
    fn as_str(self) -> &'static str {
        match self {
            ConsoleLevel::Log => "log",
            ConsoleLevel::Info => "info",
            ConsoleLevel::Warn => "warn",
            ConsoleLevel::Error => "error",
        }
    }
}

pub type LogBuffer = Rc<RefCell<Vec<LogEntry>>>;

fn push_entry(buffer: &LogBuffer, max_entries: usize, level: ConsoleLevel, args: &[JsValue], ctx: &mut Context) {
    let mut logs = buffer.borrow_mut();
    if logs.len() >= max_entries {
        return;
    }
    let rendered: Vec<String> = args
        .iter()
        .map(|v| v.to_string(ctx).map(|s| s.to_std_string_escaped()).unwrap_or_else(|_| "<unprintable>".into()))
        .collect();
    logs.push(LogEntry {
        level: level.as_str().to_string(),
        args: rendered,
    });
}

fn console_method(level: ConsoleLevel, buffer: LogBuffer, max_entries: usize) -> NativeFunction {
    // SAFETY: the closure only touches the captured `Rc<RefCell<_>>`, never
    // holds a borrow across a re-entrant call back into JS.
    unsafe {
        NativeFunction::from_closure(move |_this, args, ctx| -> JsResult<JsValue> {
            push_entry(&buffer, max_entries, level, args, ctx);
            Ok(JsValue::undefined())
        })
    }
}

/// Installs `console.{log,info,warn,error}` on the context's global object,
/// all writing into `buffer`.
pub fn install(ctx: &mut Context, buffer: LogBuffer, max_entries: usize) {
    let console = ObjectInitializer::new(ctx)
        .function(console_method(ConsoleLevel::Log, buffer.clone(), max_entries), js_string!("log"), 0)
        .function(console_method(ConsoleLevel::Info, buffer.clone(), max_entries), js_string!("info"), 0)
        .function(console_method(ConsoleLevel::Warn, buffer.clone(), max_entries), js_string!("warn"), 0)
        .function(console_method(ConsoleLevel::Error, buffer, max_entries), js_string!("error"), 0)
        .build();

    let _ = ctx.register_global_property(js_string!("console"), console, Attribute::all());
}
