//! Config validation: unknown-key detection with Levenshtein suggestions.
//!
//! The raw TOML is walked before serde deserialization and every key that
//! does not map to a config field produces a warning with a "did you mean?"
//! hint. Warnings never break a config.

use std::collections::HashSet;

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Valid dotted key paths for `PulseConfig`.
///
/// Must be kept in step with the structs in `pulse_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        "server",
        "server.addr",
        "server.cors_origins",
        "storage",
        "storage.path",
        "storage.in_memory",
        "llm",
        "llm.api_key",
        "llm.model",
        "llm.endpoint",
        "llm.timeout_secs",
        "feedback",
        "feedback.cache_capacity",
        "progress",
        "progress.default_window_days",
        "auth",
        "auth.tokens",
    ]
    .into_iter()
    .collect()
}

/// Collect dotted key paths of every table entry (arrays are not descended)
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(k, dist)| (*dist, *k))
        .map(|(k, _)| k.to_string())
}

/// Warn about keys that do not correspond to any config field
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are reported by serde
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_typo_gets_suggestion() {
        let warnings = validate_unknown_keys("[llm]\ntimeout_sec = 5\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "llm.timeout_sec");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("llm.timeout_secs"));
    }

    #[test]
    fn test_known_keys_produce_no_warnings() {
        let raw = r#"
            [server]
            addr = "0.0.0.0:1"
            [[auth.tokens]]
            token = "a"
            user_id = "b"
        "#;
        assert!(validate_unknown_keys(raw).is_empty());
    }
}
