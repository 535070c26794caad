//! Output formatting for CLI commands

use serde::Serialize;

/// Format output as pretty JSON or as `key: value` lines based on --json flag
pub fn format_output<T: Serialize>(data: &T, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
    }

    match serde_json::to_value(data) {
        Ok(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, plain(value)))
            .collect::<Vec<_>>()
            .join("\n"),
        Ok(other) => plain(&other),
        Err(_) => String::new(),
    }
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
