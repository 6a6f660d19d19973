//! Editor session settings, as the host passes them in (camelCase JSON)

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Quiet time before the document is serialized for saving
    pub debounce_ms: u64,

    /// Link urls as they are typed
    pub autolink: bool,

    /// Markdown-style autoformat triggers
    pub shortcuts: bool,

    /// Undo levels kept
    pub history_levels: usize,
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 700,
            autolink: true,
            shortcuts: true,
            history_levels: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{ "debounceMs": 250 }"#).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert!(config.autolink);
        assert_eq!(config.history_levels, 100);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(EditorConfig::default()).unwrap();
        assert_eq!(json["historyLevels"], 100);
        assert_eq!(json["shortcuts"], true);
    }
}
