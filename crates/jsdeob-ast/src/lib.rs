//! jsdeob-ast — AST Services (§4.1) and the shared data model (§3) for the
//! JS de-obfuscation workbench.
//!
//! This is the leaf crate in the dependency order from §2: everything else
//! in the workspace depends on it for the `Ast` type, the JSON wire form,
//! and the recipe/step/transform records.

pub mod error;
pub mod json;
pub mod model;
pub mod nesting;
pub mod scope;
pub mod services;

pub use error::{AstError, AstResult};
pub use model::{
    ConfigHint, ConfigHintType, ConfigHints, LogEntry, LoopStep, Project, PluginBlob, Recipe,
    RecipeStep, RunReport, StepResult, Transform, TransformKind, TransformMeta, TransformStep,
    AST_SENTINEL, MAX_ITERATIONS,
};
pub use nesting::nesting_depth;
pub use scope::{analyze_scope, BindingInfo, Loc, ScopeInfo};
pub use services::{
    format, generate, generate_program, parse, parse_with_source_map, Ast, MAX_NESTING_DEPTH,
};

pub mod prelude {
    pub use crate::error::{AstError, AstResult};
    pub use crate::model::*;
    pub use crate::services::{format, generate, generate_program, parse, Ast};
}
