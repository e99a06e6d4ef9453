//! Shared data-model types (§3): recipes, step results, transforms, and the
//! persisted entities (`Project`, `PluginBlob`).
//!
//! These are plain serde-serializable records — the "explicit records"
//! redesign §9 calls for in place of the original's duck-typed objects.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of transform a [`Transform`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Builtin,
    Plugin,
    Script,
    Inline,
}

/// A reference to a transform plus whatever the recipe step needs to run
/// it. `code` is `None` for built-ins, whose source is resolved internally
/// by `jsdeob-passes`/`jsdeob-store`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub id: String,
    pub kind: TransformKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub config_hints: ConfigHints,
}

fn is_loop_discriminant(value: &serde_json::Value) -> bool {
    value.get("type").and_then(|t| t.as_str()) == Some("loop")
}

/// One parameter's inferred or declared type/default/description (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigHint {
    #[serde(rename = "type")]
    pub ty: ConfigHintType,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigHintType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

/// `paramName -> hint` mapping (§4.7 output).
pub type ConfigHints = BTreeMap<String, ConfigHint>;

/// One transform invocation in a recipe: the transform's `id`, its `type`
/// (the transform *kind* — `"builtin"`, `"plugin"`, `"script"`, or
/// `"inline"`), its source (`code`, `None` for built-ins), the config to
/// run it with, whether it's enabled, and how many times to repeat it.
///
/// Wire shape (§6): `{ id, type, code?, config, enabled, iterations }` —
/// flat, with no nested transform object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransformKind,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopStep {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub children: Vec<TransformStep>,
}

fn default_true() -> bool {
    true
}

fn default_iterations() -> u32 {
    1
}

/// Maximum iterations permitted on any single step or loop (§3 invariant).
pub const MAX_ITERATIONS: u32 = 10_000;

/// A single recipe entry: either a transform step or a (non-nested) loop
/// of transform steps. `"loop"` is the sole reserved `type` discriminant
/// value — every other `type` names a transform kind (§6).
#[derive(Debug, Clone)]
pub enum RecipeStep {
    Transform(TransformStep),
    Loop(LoopStep),
}

impl Serialize for RecipeStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            RecipeStep::Transform(t) => t.serialize(serializer),
            RecipeStep::Loop(l) => {
                #[derive(Serialize)]
                #[serde(rename_all = "camelCase")]
                struct Wire<'a> {
                    #[serde(rename = "type")]
                    kind: &'static str,
                    iterations: u32,
                    enabled: bool,
                    children: &'a [TransformStep],
                }
                Wire { kind: "loop", iterations: l.iterations, enabled: l.enabled, children: &l.children }
                    .serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for RecipeStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if is_loop_discriminant(&value) {
            LoopStep::deserialize(value).map(RecipeStep::Loop).map_err(serde::de::Error::custom)
        } else {
            TransformStep::deserialize(value).map(RecipeStep::Transform).map_err(serde::de::Error::custom)
        }
    }
}

/// An ordered pipeline of recipe steps. Serializes as a bare JSON array
/// (§6: "Recipe wire format: a JSON array where each element is...").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe {
    pub steps: Vec<RecipeStep>,
}

/// The sentinel placed in [`StepResult::code`] for middle steps whose code
/// was not materialized (§4.4).
pub const AST_SENTINEL: &str = "[AST]";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub index: usize,
    pub transform_id: String,
    pub success: bool,
    pub skipped: bool,
    #[serde(default)]
    pub stats: serde_json::Value,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    pub duration_ms: u64,
    pub code_size: usize,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub level: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    #[serde(default)]
    pub final_code: Option<String>,
    #[serde(default)]
    pub failed_at: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
    pub results: Vec<StepResult>,
}

/// A saved plugin or script blob (§3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginBlob {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub config: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
}

impl PluginBlob {
    pub fn new_plugin(name: String, description: String, code: String, config: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            code,
            config,
            created_at: now,
            updated_at: now,
            category: Some("user-saved".to_string()),
        }
    }

    pub fn new_script(name: String, description: String, code: String, config: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: format!("script-{}", Uuid::new_v4()),
            name,
            description,
            code,
            config,
            created_at: now,
            updated_at: now,
            category: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub input_code: String,
    #[serde(default)]
    pub output_code: Option<String>,
    pub recipe: Recipe,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, description: Option<String>, input_code: String, recipe: Recipe) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            input_code,
            output_code: None,
            recipe,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Metadata describing a built-in or folder plugin transform (§4.5, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformMeta {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub config_schema: ConfigHints,
    #[serde(default)]
    pub example_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_step_round_trips_through_json() {
        let step = RecipeStep::Transform(TransformStep {
            id: "constantFolding".into(),
            kind: TransformKind::Builtin,
            code: None,
            config: serde_json::json!({}),
            enabled: true,
            iterations: 1,
        });

        let json = serde_json::to_string(&step).unwrap();
        let back: RecipeStep = serde_json::from_str(&json).unwrap();
        match back {
            RecipeStep::Transform(t) => assert_eq!(t.id, "constantFolding"),
            _ => panic!("expected transform step"),
        }
    }

    #[test]
    fn transform_step_serializes_flat_with_kind_as_type() {
        let step = RecipeStep::Transform(TransformStep {
            id: "constantFolding".into(),
            kind: TransformKind::Builtin,
            code: None,
            config: serde_json::json!({}),
            enabled: true,
            iterations: 1,
        });
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["id"], "constantFolding");
        assert_eq!(json["type"], "builtin");
        assert_eq!(json["enabled"], true);
        assert!(json.get("transform").is_none());
    }

    #[test]
    fn loop_step_defaults_enabled_and_iterations() {
        let json = serde_json::json!({
            "type": "loop",
            "children": []
        });
        let step: RecipeStep = serde_json::from_value(json).unwrap();
        match step {
            RecipeStep::Loop(l) => {
                assert!(l.enabled);
                assert_eq!(l.iterations, 1);
            }
            _ => panic!("expected loop step"),
        }
    }

    #[test]
    fn recipe_serializes_as_bare_array() {
        let recipe = Recipe {
            steps: vec![RecipeStep::Transform(TransformStep {
                id: "constantFolding".into(),
                kind: TransformKind::Builtin,
                code: None,
                config: serde_json::json!({}),
                enabled: true,
                iterations: 1,
            })],
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 1);

        let parsed: Recipe = serde_json::from_value(serde_json::json!([{
            "id": "constantFolding",
            "type": "builtin",
            "config": {},
            "enabled": true,
            "iterations": 1
        }]))
        .unwrap();
        assert_eq!(parsed.steps.len(), 1);
    }
}
