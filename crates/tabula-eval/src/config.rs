//! Engine configuration

use serde::{Deserialize, Serialize};

/// Default bound on nested script evaluations
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings shared by every evaluation of one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of nested script evaluations
    pub max_depth: usize,
    /// Locale tag used by `format` when the script passes none
    pub default_locale: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_locale: None,
        }
    }
}

impl EngineConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: EngineConfig = serde_json::from_str(r#"{"default_locale":"fr"}"#).unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.default_locale.as_deref(), Some("fr"));

        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
