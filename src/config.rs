// Runtime configuration, read from the environment (and `.env` via dotenv).
//
// **Environment Variables:**
// - `GOOGLE_SERVICE_ACCOUNT_KEY` - Path to service account JSON file
// - `GOOGLE_SERVICE_ACCOUNT_JSON` - Service account JSON content (alternative)
// - `SHEETS_API_BASE_URL` - Sheets API root (default: public v4 endpoint)
// - `SHEETS_DRY_RUN` - `true` to use the in-memory spreadsheet instead of the API
// - `DEFAULT_PIVOT_SHEET_NAME` - Title for sheets created to hold pivot tables
// - `RUST_LOG` - Log filter (logs are written to stderr)

use crate::core::sheets::pivot_table_compiler::DEFAULT_DESTINATION_SHEET_NAME;
use crate::infra::google_sheets::DEFAULT_BASE_URL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    KeyFile(String),
    InlineJson(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub credentials: Option<Credentials>,
    pub base_url: String,
    pub dry_run: bool,
    pub default_pivot_sheet_name: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Neither GOOGLE_SERVICE_ACCOUNT_KEY nor GOOGLE_SERVICE_ACCOUNT_JSON is set (set SHEETS_DRY_RUN=true to run without Google access)")]
    MissingCredentials,
    #[error("{name} must be true or false, got '{value}'")]
    InvalidBool { name: String, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let dry_run = match non_empty("SHEETS_DRY_RUN") {
            Some(value) => value
                .trim()
                .parse::<bool>()
                .map_err(|_| ConfigError::InvalidBool {
                    name: "SHEETS_DRY_RUN".to_string(),
                    value,
                })?,
            None => false,
        };

        let credentials = if let Some(path) = non_empty("GOOGLE_SERVICE_ACCOUNT_KEY") {
            Some(Credentials::KeyFile(path))
        } else {
            non_empty("GOOGLE_SERVICE_ACCOUNT_JSON").map(Credentials::InlineJson)
        };

        if credentials.is_none() && !dry_run {
            return Err(ConfigError::MissingCredentials);
        }

        Ok(Self {
            credentials,
            base_url: non_empty("SHEETS_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            dry_run,
            default_pivot_sheet_name: non_empty("DEFAULT_PIVOT_SHEET_NAME")
                .unwrap_or_else(|| DEFAULT_DESTINATION_SHEET_NAME.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn key_file_takes_precedence() {
        let config = config(&[
            ("GOOGLE_SERVICE_ACCOUNT_KEY", "/keys/sa.json"),
            ("GOOGLE_SERVICE_ACCOUNT_JSON", "{}"),
        ])
        .unwrap();
        assert_eq!(config.credentials, Some(Credentials::KeyFile("/keys/sa.json".into())));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_pivot_sheet_name, "Pivot Table");
        assert!(!config.dry_run);
    }

    #[test]
    fn inline_json_and_overrides() {
        let config = config(&[
            ("GOOGLE_SERVICE_ACCOUNT_JSON", "{\"client_email\": \"x\"}"),
            ("SHEETS_API_BASE_URL", "http://localhost:8080/v4"),
            ("DEFAULT_PIVOT_SHEET_NAME", "Report"),
        ])
        .unwrap();
        assert!(matches!(config.credentials, Some(Credentials::InlineJson(_))));
        assert_eq!(config.base_url, "http://localhost:8080/v4");
        assert_eq!(config.default_pivot_sheet_name, "Report");
    }

    #[test]
    fn credentials_required_unless_dry_run() {
        assert_eq!(config(&[]), Err(ConfigError::MissingCredentials));
        assert_eq!(
            config(&[("GOOGLE_SERVICE_ACCOUNT_KEY", "  ")]),
            Err(ConfigError::MissingCredentials)
        );

        let config = config(&[("SHEETS_DRY_RUN", "true")]).unwrap();
        assert!(config.dry_run);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn dry_run_must_be_a_bool() {
        let err = config(&[("SHEETS_DRY_RUN", "yes")]).unwrap_err();
        assert!(err.to_string().contains("SHEETS_DRY_RUN"));
    }
}
