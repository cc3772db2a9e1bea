//! YAML configuration for the toolkit.
//!
//! Two files, two concerns: `rag.yaml` names the hosted endpoint/model pairs,
//! `data.yaml` holds the EDGAR contact identity and the download plan.
//!
//! ```yaml
//! # rag.yaml
//! emb_endpoint_name: "rag-emb-endpoint"
//! emb_model_name: "rag-emb-model"
//! llm_endpoint_name: "rag-llm-endpoint"
//! llm_model_name: "rag-llm-model"
//! ```
//!
//! ```yaml
//! # data.yaml
//! email: "admin@example.com"
//! tickers: ["AAPL", "MSFT"]
//! amount: 1
//! after: 2019-01-01
//! ```

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

/// Names of the two hosted deployments: the embedding endpoint/model pair and
/// the generation endpoint/model pair. Endpoint configs are not listed here;
/// they share their endpoint's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub emb_endpoint_name: String,
    pub emb_model_name: String,
    pub llm_endpoint_name: String,
    pub llm_model_name: String,
}

impl RagConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RagConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("emb_endpoint_name", &self.emb_endpoint_name),
            ("emb_model_name", &self.emb_model_name),
            ("llm_endpoint_name", &self.llm_endpoint_name),
            ("llm_model_name", &self.llm_model_name),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Contact identity and download plan for the EDGAR ingest step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Company string for the SEC `User-Agent` header.
    #[serde(default = "default_company")]
    pub company: String,
    /// Contact email for the SEC `User-Agent` header. Required; EDGAR
    /// rejects anonymous traffic.
    pub email: String,
    pub tickers: Vec<String>,
    /// Filings to fetch per ticker, newest first.
    pub amount: usize,
    #[serde(default)]
    pub after: Option<NaiveDate>,
    #[serde(default)]
    pub before: Option<NaiveDate>,
}

fn default_company() -> String {
    "RAG".to_string()
}

impl DataConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: DataConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.company.trim().is_empty() {
            return Err(ConfigError::Validation(
                "company must not be empty".to_string(),
            ));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(ConfigError::Validation(
                "email must be a contact address".to_string(),
            ));
        }
        if self.tickers.is_empty() {
            return Err(ConfigError::Validation(
                "tickers must list at least one symbol".to_string(),
            ));
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "tickers must not contain empty symbols".to_string(),
            ));
        }
        if self.amount == 0 {
            return Err(ConfigError::Validation(
                "amount must be >= 1".to_string(),
            ));
        }
        if let (Some(after), Some(before)) = (self.after, self.before) {
            if after > before {
                return Err(ConfigError::Validation(
                    "after must not be later than before".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn rag_config_parses() {
        let yaml = r#"
emb_endpoint_name: "rag-emb-endpoint"
emb_model_name: "rag-emb-model"
llm_endpoint_name: "rag-llm-endpoint"
llm_model_name: "rag-llm-model"
"#;
        let config = RagConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.emb_endpoint_name, "rag-emb-endpoint");
        assert_eq!(config.llm_model_name, "rag-llm-model");
    }

    #[test]
    fn rag_config_loads_from_file() {
        let yaml = r#"
emb_endpoint_name: "e"
emb_model_name: "m"
llm_endpoint_name: "le"
llm_model_name: "lm"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = RagConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.emb_endpoint_name, "e");
    }

    #[test]
    fn rag_config_rejects_blank_names() {
        let yaml = r#"
emb_endpoint_name: "  "
emb_model_name: "m"
llm_endpoint_name: "le"
llm_model_name: "lm"
"#;
        let err = RagConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("emb_endpoint_name"));
    }

    #[test]
    fn rag_config_rejects_missing_fields() {
        let result = RagConfig::from_yaml("emb_endpoint_name: \"e\"\n");
        assert!(matches!(result, Err(ConfigError::YamlParse(_))));
    }

    #[test]
    fn data_config_fills_defaults() {
        let yaml = r#"
email: "admin@example.com"
tickers: ["AAPL"]
amount: 1
"#;
        let config = DataConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.company, "RAG");
        assert_eq!(config.after, None);
        assert_eq!(config.before, None);
    }

    #[test]
    fn data_config_parses_date_window() {
        let yaml = r#"
email: "admin@example.com"
tickers: ["AAPL", "MSFT"]
amount: 3
after: 2019-01-01
before: 2023-12-31
"#;
        let config = DataConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.after, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(config.before, NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn data_config_requires_an_email_address() {
        let yaml = r#"
email: "not-an-address"
tickers: ["AAPL"]
amount: 1
"#;
        let err = DataConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn data_config_rejects_empty_ticker_list() {
        let yaml = r#"
email: "admin@example.com"
tickers: []
amount: 1
"#;
        let err = DataConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("tickers"));
    }

    #[test]
    fn data_config_rejects_zero_amount() {
        let yaml = r#"
email: "admin@example.com"
tickers: ["AAPL"]
amount: 0
"#;
        let err = DataConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn data_config_rejects_inverted_date_window() {
        let yaml = r#"
email: "admin@example.com"
tickers: ["AAPL"]
amount: 1
after: 2023-01-01
before: 2019-01-01
"#;
        let err = DataConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("after"));
    }
}
