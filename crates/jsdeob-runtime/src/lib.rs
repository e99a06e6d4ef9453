//! Transform Runtime (§4.2): sandboxed execution of a single user-authored
//! de-obfuscation transform against a shared AST.
//!
//! Built on an embedded [`boa_engine`] interpreter rather than a
//! host-process JavaScript engine: the transform's lexical environment is
//! assembled fresh per invocation in [`capabilities`] from a small,
//! explicit whitelist (`ast`, `traverse`, `t`/`types`, `config`, `stats`,
//! `console`, `parser`, `generate`, `run`, `module`/`exports`) — there is no
//! implicit access to host globals beyond that set.

pub mod apis;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod runtime;

pub use config::RuntimePolicy;
pub use error::{RuntimeError, RuntimeResult};
pub use runtime::{run_transform, validate, TransformInput, TransformOutcome};
