use std::path::PathBuf;

use crate::errors::AppError;

/// Deployment environment. Controls whether internal error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("development") | Some("dev") | Some("test") => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenWeather API key. Validated when the weather client is built.
    pub api_key: String,
    /// Base URL for both `/geo/1.0` and `/data/2.5` endpoint families.
    pub api_base_url: String,
    pub port: u16,
    pub environment: Environment,
    /// JSON file holding the search history.
    pub history_file: PathBuf,
    /// Built single-page app served for non-API routes.
    pub client_dist_dir: PathBuf,
    pub http_timeout_secs: u64,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::Configuration(format!("PORT must be a valid u16, got '{}'", raw)))?,
            None => 3001,
        };

        let http_timeout_secs = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::Configuration(format!("HTTP_TIMEOUT_SECS must be a whole number, got '{}'", raw))
            })?,
            None => 10,
        };

        let environment = Environment::parse(lookup("APP_ENV").or_else(|| lookup("NODE_ENV")).as_deref());

        Ok(Self {
            api_key: lookup("API_KEY").unwrap_or_default(),
            api_base_url: lookup("API_BASE_URL").unwrap_or_default(),
            port,
            environment,
            history_file: lookup("HISTORY_FILE")
                .unwrap_or_else(|| "./db/searchHistory.json".to_string())
                .into(),
            client_dist_dir: lookup("CLIENT_DIST_DIR")
                .unwrap_or_else(|| "../client/dist".to_string())
                .into(),
            http_timeout_secs,
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    pub fn expose_error_detail(&self) -> bool {
        self.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[
            ("API_KEY", "secret"),
            ("API_BASE_URL", "https://api.openweathermap.org"),
        ])
        .unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.expose_error_detail());
        assert_eq!(config.history_file, PathBuf::from("./db/searchHistory.json"));
        assert_eq!(config.client_dist_dir, PathBuf::from("../client/dist"));
        assert_eq!(config.http_timeout_secs, 10);
        assert!(!config.log_json);
    }

    #[test]
    fn test_missing_api_key_is_left_for_the_client_to_reject() {
        let config = config_from(&[]).unwrap();
        assert!(config.api_key.is_empty());
        assert!(config.api_base_url.is_empty());
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_environment_parsing() {
        let dev = config_from(&[("APP_ENV", "development")]).unwrap();
        assert!(dev.expose_error_detail());

        let node_env = config_from(&[("NODE_ENV", "Dev")]).unwrap();
        assert_eq!(node_env.environment, Environment::Development);

        // APP_ENV wins over NODE_ENV
        let both = config_from(&[("APP_ENV", "production"), ("NODE_ENV", "development")]).unwrap();
        assert_eq!(both.environment, Environment::Production);

        let unknown = config_from(&[("APP_ENV", "staging")]).unwrap();
        assert_eq!(unknown.environment, Environment::Production);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("PORT", ""), ("HTTP_TIMEOUT_SECS", "  "), ("APP_ENV", "")]).unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("HISTORY_FILE", "/tmp/history.json"),
            ("CLIENT_DIST_DIR", "./public"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.history_file, PathBuf::from("/tmp/history.json"));
        assert_eq!(config.client_dist_dir, PathBuf::from("./public"));
        assert_eq!(config.http_timeout_secs, 3);
        assert!(config.log_json);
    }
}
