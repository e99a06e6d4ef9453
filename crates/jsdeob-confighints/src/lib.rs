//! Config-Hint Parser (§4.7): extracts typed parameter metadata from a
//! declarative comment block in a transform's source, falling back to a
//! heuristic scanner over common `config.X` idioms when that block is
//! absent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use jsdeob_ast::model::{ConfigHint, ConfigHintType, ConfigHints};

const MARKER: &str = "config parameters:";

static BULLET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//\s*-\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*:\s*(.*)$").unwrap());
static TRAILING_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(default:\s*(.*)\)\s*$").unwrap());
static TRAILING_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\s*([A-Za-z]+)\s*$").unwrap());
static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-+]?\d+(\.\d+)?").unwrap());

static HEURISTIC_OR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"config\.([A-Za-z_$][A-Za-z0-9_$]*)\s*(?:\|\||\?\?)\s*([^;,)\n]+)").unwrap());
static HEURISTIC_NOT_FALSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"config\.([A-Za-z_$][A-Za-z0-9_$]*)\s*!==\s*false").unwrap());
static HEURISTIC_IS_TRUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"config\.([A-Za-z_$][A-Za-z0-9_$]*)\s*===\s*true").unwrap());

/// Extracts config hints from a transform's source: the declarative
/// `// CONFIG PARAMETERS:` block when present, otherwise the heuristic
/// scanner (§9: "two-tier... the heuristic scanner is used only when the
/// block is absent").
pub fn extract(source: &str) -> ConfigHints {
    let declarative = parse_declarative_block(source);
    if !declarative.is_empty() {
        return declarative;
    }
    scan_heuristics(source)
}

fn parse_declarative_block(source: &str) -> ConfigHints {
    let lines: Vec<&str> = source.lines().collect();
    let marker_index = lines.iter().position(|line| {
        let trimmed = line.trim();
        trimmed.len() >= 2
            && trimmed.starts_with("//")
            && trimmed[2..].trim().to_lowercase() == MARKER
    });

    let Some(start) = marker_index else {
        return ConfigHints::new();
    };

    let mut hints = ConfigHints::new();
    for line in &lines[start + 1..] {
        let trimmed = line.trim();
        if trimmed.is_empty() || !trimmed.starts_with("//") {
            break;
        }
        let Some(captures) = BULLET_LINE.captures(trimmed) else {
            break;
        };
        let name = captures[1].to_string();
        let rest = captures[2].trim().to_string();
        hints.insert(name, parse_bullet_rest(&rest));
    }
    hints
}

fn parse_bullet_rest(rest: &str) -> ConfigHint {
    let mut remaining = rest.to_string();

    let raw_default = TRAILING_DEFAULT.captures(&remaining).map(|c| c[1].trim().to_string());
    if raw_default.is_some() {
        remaining = TRAILING_DEFAULT.replace(&remaining, "").trim().to_string();
    }

    let raw_type = TRAILING_TYPE.captures(&remaining).map(|c| c[1].to_string());
    if raw_type.is_some() {
        remaining = TRAILING_TYPE.replace(&remaining, "").trim().to_string();
    }

    let ty = raw_type.as_deref().map(normalize_type).unwrap_or(ConfigHintType::String);
    let default = raw_default.map(|raw| parse_default(&raw, ty));

    ConfigHint { ty, default, description: remaining }
}

fn normalize_type(raw: &str) -> ConfigHintType {
    match raw.to_lowercase().as_str() {
        "string" | "str" => ConfigHintType::String,
        "number" | "num" | "int" | "integer" | "float" => ConfigHintType::Number,
        "boolean" | "bool" => ConfigHintType::Boolean,
        "array" | "list" => ConfigHintType::Array,
        "object" | "obj" => ConfigHintType::Object,
        _ => ConfigHintType::String,
    }
}

fn parse_default(raw: &str, ty: ConfigHintType) -> Value {
    match ty {
        ConfigHintType::Boolean => Value::Bool(raw.eq_ignore_ascii_case("true")),
        ConfigHintType::Number => {
            let parsed = LEADING_FLOAT
                .find(raw)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            serde_json::Number::from_f64(parsed).map(Value::Number).unwrap_or(Value::from(0))
        }
        ConfigHintType::Array => {
            serde_json::from_str::<Value>(raw).ok().filter(Value::is_array).unwrap_or_else(|| Value::Array(Vec::new()))
        }
        ConfigHintType::Object => serde_json::from_str::<Value>(raw)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default())),
        ConfigHintType::String => Value::String(strip_matched_quotes(raw).to_string()),
    }
}

fn strip_matched_quotes(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn scan_heuristics(source: &str) -> ConfigHints {
    let mut hints = ConfigHints::new();

    for captures in HEURISTIC_OR.captures_iter(source) {
        let name = captures[1].to_string();
        let literal = captures[2].trim();
        if let Some(hint) = infer_from_literal(literal) {
            hints.entry(name).or_insert(hint);
        }
    }
    for captures in HEURISTIC_NOT_FALSE.captures_iter(source) {
        hints.entry(captures[1].to_string()).or_insert(ConfigHint {
            ty: ConfigHintType::Boolean,
            default: Some(Value::Bool(true)),
            description: String::new(),
        });
    }
    for captures in HEURISTIC_IS_TRUE.captures_iter(source) {
        hints.entry(captures[1].to_string()).or_insert(ConfigHint {
            ty: ConfigHintType::Boolean,
            default: Some(Value::Bool(false)),
            description: String::new(),
        });
    }

    hints
}

fn infer_from_literal(literal: &str) -> Option<ConfigHint> {
    let trimmed = literal.trim();
    let (ty, default) = if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        (ConfigHintType::Boolean, Value::Bool(trimmed.eq_ignore_ascii_case("true")))
    } else if trimmed == "[]" {
        (ConfigHintType::Array, Value::Array(Vec::new()))
    } else if trimmed == "{}" {
        (ConfigHintType::Object, Value::Object(Default::default()))
    } else if (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
        || (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2)
    {
        (ConfigHintType::String, Value::String(strip_matched_quotes(trimmed).to_string()))
    } else if let Some(m) = LEADING_FLOAT.find(trimmed) {
        if m.as_str().len() == trimmed.len() {
            let n = trimmed.parse::<f64>().ok()?;
            (ConfigHintType::Number, serde_json::Number::from_f64(n).map(Value::Number)?)
        } else {
            return None;
        }
    } else {
        return None;
    };
    Some(ConfigHint { ty, default: Some(default), description: String::new() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_declarative_block() {
        let source = r#"
// CONFIG PARAMETERS:
// - removeArray: delete the source array after inlining - Boolean (default: true)
// - maxDepth: how deep to recurse - Number (default: 3)
// - label: a tag for logging - String (default: "demo")
function run(config) {}
"#;
        let hints = extract(source);
        assert_eq!(hints.len(), 3);

        let remove_array = &hints["removeArray"];
        assert_eq!(remove_array.ty, ConfigHintType::Boolean);
        assert_eq!(remove_array.default, Some(Value::Bool(true)));
        assert_eq!(remove_array.description, "delete the source array after inlining");

        let max_depth = &hints["maxDepth"];
        assert_eq!(max_depth.ty, ConfigHintType::Number);
        assert_eq!(max_depth.default, Some(Value::from(3.0)));

        let label = &hints["label"];
        assert_eq!(label.ty, ConfigHintType::String);
        assert_eq!(label.default, Some(Value::String("demo".to_string())));
    }

    #[test]
    fn missing_type_defaults_to_string() {
        let source = "// CONFIG PARAMETERS:\n// - name: just a label\n";
        let hints = extract(source);
        assert_eq!(hints["name"].ty, ConfigHintType::String);
        assert_eq!(hints["name"].default, None);
    }

    #[test]
    fn block_stops_at_blank_line() {
        let source = "// CONFIG PARAMETERS:\n// - a: first - Boolean (default: true)\n\n// - b: ignored because it comes after a blank line\n";
        let hints = extract(source);
        assert_eq!(hints.len(), 1);
        assert!(hints.contains_key("a"));
    }

    #[test]
    fn falls_back_to_heuristics_when_no_block_present() {
        let source = "function run(config) { const n = config.limit || 10; if (config.verbose !== false) log(); }";
        let hints = extract(source);
        assert_eq!(hints["limit"].ty, ConfigHintType::Number);
        assert_eq!(hints["limit"].default, Some(Value::from(10.0)));
        assert_eq!(hints["verbose"].ty, ConfigHintType::Boolean);
        assert_eq!(hints["verbose"].default, Some(Value::Bool(true)));
    }

    #[test]
    fn heuristic_is_true_form_defaults_false() {
        let source = "const strict = config.strict === true;";
        let hints = extract(source);
        assert_eq!(hints["strict"].default, Some(Value::Bool(false)));
    }

    #[test]
    fn declarative_block_is_authoritative_over_heuristics() {
        let source = "// CONFIG PARAMETERS:\n// - limit: cap - Number (default: 5)\nconst n = config.limit || 10;\n";
        let hints = extract(source);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints["limit"].default, Some(Value::from(5.0)));
    }
}
