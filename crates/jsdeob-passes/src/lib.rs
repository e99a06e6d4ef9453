//! Built-in passes (§4.3): pure `(Program, config) -> stats` functions over
//! the shared [`jsdeob_ast`] AST, plus the catalogue and id dispatcher that
//! `jsdeob-pipeline` and `jsdeob-store` build on.

pub mod beautify;
pub mod bracket_to_dot;
pub mod catalog;
pub mod constant_folding;
pub mod decode_strings;
pub mod eval;
pub mod inline_values;
pub mod opaque_predicate;
pub mod simplify_literals;
pub mod stats;
pub mod unused_code;

pub use catalog::{catalog, dispatch, PassError, BUILTIN_IDS};
