//! Naming conventions: feature guesses and test suite names from paths.

use crate::domain::ModuleId;

const FEATURE_KEYWORDS: [&str; 4] = ["service", "handler", "controller", "api"];

/// (language, path fragment, feature) conventions.
const LANGUAGE_FEATURES: &[(&[&str], &str, &str)] = &[
    (&["go"], "cmd/", "CLI Commands"),
    (&["go"], "pkg/", "Core Libraries"),
    (&["go"], "internal/", "Internal APIs"),
    (&["javascript", "typescript"], "components", "UI Components"),
    (&["javascript", "typescript"], "services", "Business Services"),
    (&["javascript", "typescript"], "utils", "Utility Functions"),
    (&["python"], "models", "Data Models"),
    (&["python"], "views", "View Layer"),
    (&["python"], "serializers", "Data Serialization"),
];

const FALLBACK_FEATURE: &str = "Core Functionality";

/// Guesses which product features a module belongs to.
///
/// Path segments naming a service, handler, controller or API become
/// features, followed by the language's directory conventions.
#[must_use]
pub fn affected_features(path: &ModuleId, language: &str) -> Vec<String> {
    let path = path.as_str();
    let mut features: Vec<String> = path
        .split('/')
        .filter(|part| FEATURE_KEYWORDS.iter().any(|k| part.contains(k)))
        .map(title_case)
        .collect();

    features.extend(
        LANGUAGE_FEATURES
            .iter()
            .filter(|(langs, fragment, _)| langs.contains(&language) && path.contains(fragment))
            .map(|(_, _, feature)| (*feature).to_string()),
    );

    if features.is_empty() {
        features.push(FALLBACK_FEATURE.to_string());
    }
    features
}

/// Conventional test suite name for a module.
#[must_use]
pub fn test_suite_name(path: &ModuleId, language: &str) -> String {
    let path = path.as_str();
    match language {
        "go" => format!("{}_test", path.rsplit('/').next().unwrap_or(path)),
        "javascript" | "typescript" => format!("{}.test.js", path.replace('/', ".")),
        "python" => format!("test_{}.py", path.replace('/', "_")),
        "java" => format!("{}Test.java", title_case(&path.replace('/', ""))),
        _ => format!("{path}_test"),
    }
}

/// Upper-cases the first letter of every word. Letters, digits and `_`
/// continue a word; anything else separates words.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}
