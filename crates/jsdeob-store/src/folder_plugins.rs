//! Folder-plugin discovery (§4.5): each subdirectory of `plugins/` is a
//! category; every `.js` file in it (not prefixed `DEMO`) is one plugin.

use std::path::Path;

use jsdeob_ast::model::{Transform, TransformKind, TransformMeta};

use crate::error::StoreResult;

/// A discovered folder plugin, carrying both its [`TransformMeta`] (for
/// catalogue listings) and the full [`Transform`] record (for running it).
#[derive(Debug, Clone)]
pub struct FolderPlugin {
    pub meta: TransformMeta,
    pub transform: Transform,
    pub folder: String,
}

/// Scans `plugins_dir` for category subdirectories and the `.js` files
/// inside them. Missing `plugins_dir` is not an error: it yields no
/// plugins, matching a fresh install with no folder plugins configured.
pub fn discover(plugins_dir: &Path) -> StoreResult<Vec<FolderPlugin>> {
    let mut out = Vec::new();
    if !plugins_dir.is_dir() {
        return Ok(out);
    }

    let mut category_dirs: Vec<_> = std::fs::read_dir(plugins_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    category_dirs.sort_by_key(|e| e.file_name());

    for category_entry in category_dirs {
        let folder = category_entry.file_name().to_string_lossy().to_string();
        let mut files: Vec<_> = std::fs::read_dir(category_entry.path())?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("js"))
            .collect();
        files.sort_by_key(|e| e.file_name());

        for file_entry in files {
            let path = file_entry.path();
            let basename = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();
            if basename.starts_with("DEMO") {
                continue;
            }
            let code = std::fs::read_to_string(&path)?;
            let id = format!("{folder}-{basename}");
            let name = kebab_to_title_case(&basename);
            let config_hints = jsdeob_confighints::extract(&code);
            let description = header_description(&code).unwrap_or_default();

            let meta = TransformMeta {
                id: id.clone(),
                name: name.clone(),
                description: description.clone(),
                category: folder.clone(),
                config_schema: config_hints.clone(),
                example_code: None,
            };
            let transform = Transform {
                id,
                kind: TransformKind::Plugin,
                name,
                description,
                code: Some(code),
                config: serde_json::json!({}),
                config_hints,
            };
            out.push(FolderPlugin { meta, transform, folder: folder.clone() });
        }
    }

    Ok(out)
}

fn kebab_to_title_case(basename: &str) -> String {
    basename
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pulls the description line out of a canonical `/** Name \n description
/// \n Category: folder */` header comment, if present (§4.5).
fn header_description(code: &str) -> Option<String> {
    let start = code.find("/**")?;
    let end = code[start..].find("*/")? + start;
    let body = &code[start + 3..end];
    let lines: Vec<&str> = body
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty() && !l.to_lowercase().starts_with("category:"))
        .collect();
    lines.get(1).map(|s| s.to_string())
}

/// Sanitizes a user-supplied folder name to `[A-Za-z0-9_-]+` lowercase
/// (§4.5).
pub fn sanitize_folder_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    let lowered = cleaned.to_lowercase();
    if lowered.is_empty() { "general".to_string() } else { lowered }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discovers_non_demo_js_files_by_category() {
        let dir = TempDir::new().unwrap();
        let category = dir.path().join("renaming");
        std::fs::create_dir_all(&category).unwrap();
        std::fs::write(category.join("strip-comments.js"), "function run(ast, config) {}").unwrap();
        std::fs::write(category.join("DEMO-sample.js"), "function run() {}").unwrap();

        let plugins = discover(dir.path()).unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].meta.id, "renaming-strip-comments");
        assert_eq!(plugins[0].meta.name, "Strip Comments");
        assert_eq!(plugins[0].folder, "renaming");
    }

    #[test]
    fn missing_plugins_dir_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        let plugins = discover(&dir.path().join("does-not-exist")).unwrap();
        assert!(plugins.is_empty());
    }

    #[test]
    fn sanitizes_folder_names() {
        assert_eq!(sanitize_folder_name("My Folder!"), "my-folder-");
        assert_eq!(sanitize_folder_name(""), "general");
    }
}
