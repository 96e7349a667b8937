use chatbase_core::{ChatbaseError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

mod env_substitution;

pub use env_substitution::substitute_env_vars;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub api: ApiSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub chatbot_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_sources: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

impl ExportConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ChatbaseError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_yaml::from_str(yaml)
            .map_err(|e| ChatbaseError::Config(format!("Failed to parse YAML: {}", e)))?;

        substitute_env_vars(&mut value)?;

        let config: ExportConfig = serde_json::from_value(value)
            .map_err(|e| ChatbaseError::Config(format!("Invalid configuration: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api.api_key.is_empty() {
            return Err(ChatbaseError::Config("API key cannot be empty".into()));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ChatbaseError::Config(
                "Base URL must start with http:// or https://".into(),
            ));
        }
        if self.export.chatbot_id.is_empty() {
            return Err(ChatbaseError::Config("Chatbot id cannot be empty".into()));
        }

        let start = parse_date("start_date", &self.export.start_date)?;
        let end = parse_date("end_date", &self.export.end_date)?;
        if start > end {
            return Err(ChatbaseError::Config(
                "start_date must not be after end_date".into(),
            ));
        }

        Ok(())
    }

    pub fn default_config_path() -> PathBuf {
        env::var("CHATBASE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("chatbase.yaml"))
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| ChatbaseError::Config(format!("{} must be YYYY-MM-DD: {}", field, e)))
}

fn default_base_url() -> String {
    "https://www.chatbase.co/api/v1/get-conversations".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
api:
  api_key: test-key
export:
  chatbot_id: bot-123
  filtered_sources: "Widget or Iframe"
  start_date: "2025-11-04"
  end_date: "2025-11-04"
"#;

    #[test]
    fn test_parse_config() {
        let config = ExportConfig::from_str(SAMPLE).unwrap();
        assert_eq!(config.api.api_key, "test-key");
        assert_eq!(
            config.api.base_url,
            "https://www.chatbase.co/api/v1/get-conversations"
        );
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.export.chatbot_id, "bot-123");
        assert_eq!(
            config.export.filtered_sources.as_deref(),
            Some("Widget or Iframe")
        );
    }

    #[test]
    fn test_source_filter_is_optional() {
        let yaml = r#"
api:
  api_key: test-key
export:
  chatbot_id: bot-123
  start_date: "2025-11-04"
  end_date: "2025-11-05"
"#;
        let config = ExportConfig::from_str(yaml).unwrap();
        assert!(config.export.filtered_sources.is_none());
    }

    #[test]
    fn test_env_substitution_in_config() {
        std::env::set_var("CHATBASE_TEST_KEY", "from-env");
        let yaml = r#"
api:
  api_key: ${CHATBASE_TEST_KEY}
export:
  chatbot_id: bot-123
  start_date: "2025-11-04"
  end_date: "2025-11-05"
"#;
        let config = ExportConfig::from_str(yaml).unwrap();
        assert_eq!(config.api.api_key, "from-env");
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let yaml = r#"
api:
  api_key: ${CHATBASE_DEFINITELY_UNSET}
export:
  chatbot_id: bot-123
  start_date: "2025-11-04"
  end_date: "2025-11-05"
"#;
        let err = ExportConfig::from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("CHATBASE_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_validation_rejects_bad_dates() {
        let yaml = r#"
api:
  api_key: test-key
export:
  chatbot_id: bot-123
  start_date: "04-11-2025"
  end_date: "2025-11-05"
"#;
        assert!(ExportConfig::from_str(yaml).is_err());
    }

    #[test]
    fn test_validation_rejects_inverted_range() {
        let yaml = r#"
api:
  api_key: test-key
export:
  chatbot_id: bot-123
  start_date: "2025-11-06"
  end_date: "2025-11-05"
"#;
        assert!(ExportConfig::from_str(yaml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_chatbot_id() {
        let yaml = r#"
api:
  api_key: test-key
export:
  chatbot_id: ""
  start_date: "2025-11-04"
  end_date: "2025-11-05"
"#;
        assert!(ExportConfig::from_str(yaml).is_err());
    }

    #[test]
    fn test_from_yaml_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chatbase.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ExportConfig::from_yaml(&path).unwrap();
        assert_eq!(config.export.chatbot_id, "bot-123");
    }
}
