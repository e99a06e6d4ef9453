//! Canonical source text for `GET /api/transform/builtin-source/{id}` (§6).
//!
//! Built-in passes are implemented natively in `jsdeob-passes`, not as
//! user-facing JS functions, so there is no literal function body to
//! return. Each entry below is the pass's documented contract rendered as
//! the same canonical-function-text shape a folder plugin would have, for
//! display/reference in the host UI only — it is never executed.

macro_rules! source_entry {
    ($id:literal, $name:literal, $doc:literal) => {
        concat!(
            "/**\n * ",
            $name,
            "\n * ",
            $doc,
            "\n */\nfunction ",
            $id,
            "(ast, config) {\n  // implemented natively; this is a reference summary only\n}\n"
        )
    };
}

pub fn source_for(id: &str) -> Option<&'static str> {
    let text = match id {
        "constantFolding" => source_entry!(
            "constantFolding",
            "Constant Folding",
            "Folds binary expressions over numeric literals; skips non-finite results."
        ),
        "opaquePredicateRemoval" => source_entry!(
            "opaquePredicateRemoval",
            "Opaque Predicate Removal",
            "Resolves statically-determinable if/ternary/logical expressions."
        ),
        "removeUnusedCode" => source_entry!(
            "removeUnusedCode",
            "Unused Code Removal",
            "Removes unreferenced top-level declarations across repeated crawl passes."
        ),
        "decodeStrings" => source_entry!(
            "decodeStrings",
            "String Decoding",
            "Decodes escapes, fromCharCode, atob/base64, and literal string method chains."
        ),
        "inlineArrayValues" => source_entry!(
            "inlineArrayValues",
            "Inline Array/Object Values",
            "Inlines references into never-mutated literal arrays and objects."
        ),
        "inlineStringArray" => source_entry!(
            "inlineStringArray",
            "Inline Obfuscated String Array",
            "Inlines references into hex-named all-string arrays with foldable indices."
        ),
        "simplifyLiterals" => source_entry!(
            "simplifyLiterals",
            "Literal Simplification",
            "Simplifies boolean/void/typeof shorthand and division-by-zero patterns."
        ),
        "beautify" => source_entry!("beautify", "Beautify", "Reprints the AST with the standard printer."),
        "bracketToDot" => source_entry!(
            "bracketToDot",
            "Bracket To Dot",
            "Rewrites a[\"b\"] to a.b when the key is identifier-shaped."
        ),
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_id_has_source_text() {
        for id in jsdeob_passes::catalog::BUILTIN_IDS {
            assert!(source_for(id).is_some(), "missing source text for {id}");
        }
    }

    #[test]
    fn unknown_id_returns_none() {
        assert!(source_for("doesNotExist").is_none());
    }
}
